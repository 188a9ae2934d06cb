// Derived statistics - KPI aggregation and distribution shares
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::metrics::{Kpi, KpiIndicators, KpiSet, Slice, SliceShare, TimePoint};

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HourlyTotals {
    pub sales: u64,
    pub orders: u64,
    pub visitors: u64,
}

impl HourlyTotals {
    pub fn from_points(points: &[TimePoint]) -> Self {
        points.iter().fold(Self::default(), |acc, p| Self {
            sales: acc.sales + p.sales,
            orders: acc.orders + p.orders,
            visitors: acc.visitors + p.visitors,
        })
    }

    /// Orders per visitor as a percentage, one decimal.
    pub fn conversion_rate(&self) -> EngineResult<f64> {
        if self.visitors == 0 {
            return Err(EngineError::DivisionHazard("conversion rate"));
        }
        Ok(round1(self.orders as f64 / self.visitors as f64 * 100.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedStatistics {
    pub kpis: KpiSet,
    pub traffic_shares: Vec<SliceShare>,
}

pub fn compute_kpis(points: &[TimePoint], indicators: &KpiIndicators) -> EngineResult<KpiSet> {
    let totals = HourlyTotals::from_points(points);
    let conversion_rate = totals.conversion_rate()?;

    Ok(KpiSet {
        revenue: Kpi::new(
            "Total Revenue",
            totals.sales as f64,
            indicators.revenue_change,
        )
        .with_prefix("$"),
        orders: Kpi::new(
            "Total Orders",
            totals.orders as f64,
            indicators.orders_change,
        ),
        conversion_rate: Kpi::new(
            "Conversion Rate",
            conversion_rate,
            indicators.conversion_change,
        )
        .with_suffix("%"),
        active_customers: Kpi::new(
            "Active Customers",
            indicators.active_customers as f64,
            indicators.customers_change,
        ),
    })
}

/// Each slice's share of the set total, one decimal, in set order.
pub fn distribution_shares(slices: &[Slice]) -> EngineResult<Vec<SliceShare>> {
    let total: u64 = slices.iter().map(|s| s.value).sum();
    if total == 0 {
        return Err(EngineError::DivisionHazard("distribution share"));
    }
    Ok(slices
        .iter()
        .map(|s| SliceShare {
            name: s.name,
            percent: round1(s.value as f64 / total as f64 * 100.0),
        })
        .collect())
}

pub fn derive_statistics(
    hourly: &[TimePoint],
    traffic: &[Slice],
    indicators: &KpiIndicators,
) -> EngineResult<DerivedStatistics> {
    Ok(DerivedStatistics {
        kpis: compute_kpis(hourly, indicators)?,
        traffic_shares: distribution_shares(traffic)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{TRAFFIC_SPECS, Trend};
    use chrono::{Duration, TimeZone, Utc};

    fn points(rows: &[(u64, u64, u64)]) -> Vec<TimePoint> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, &(sales, orders, visitors))| {
                TimePoint::new(start + Duration::hours(i as i64), sales, orders, visitors)
            })
            .collect()
    }

    fn indicators() -> KpiIndicators {
        KpiIndicators {
            revenue_change: 12.3,
            orders_change: -1.5,
            conversion_change: 0.0,
            customers_change: 4.2,
            active_customers: 1_337,
        }
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(13.04), 13.0);
        assert_eq!(round1(13.06), 13.1);
        assert_eq!(round1(-2.26), -2.3);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_kpis_sum_hourly_points() {
        let pts = points(&[(4_000, 30, 200), (5_500, 45, 300), (11_999, 109, 699)]);
        let kpis = compute_kpis(&pts, &indicators()).unwrap();

        assert_eq!(kpis.revenue.value, 21_499.0);
        assert_eq!(kpis.revenue.unit_prefix, "$");
        assert_eq!(kpis.orders.value, 184.0);
        // 184 / 1199 * 100 = 15.346...
        assert_eq!(kpis.conversion_rate.value, 15.3);
        assert_eq!(kpis.conversion_rate.unit_suffix, "%");
        assert_eq!(kpis.active_customers.value, 1_337.0);
    }

    #[test]
    fn test_change_indicators_pass_through() {
        let pts = points(&[(4_000, 30, 200)]);
        let kpis = compute_kpis(&pts, &indicators()).unwrap();

        assert_eq!(kpis.revenue.percent_change, 12.3);
        assert_eq!(kpis.orders.percent_change, -1.5);
        assert_eq!(kpis.orders.trend, Trend::Down);
        assert_eq!(kpis.conversion_rate.trend, Trend::Up);
        assert_eq!(kpis.active_customers.percent_change, 4.2);

        let labels: Vec<&str> = kpis.iter().map(|k| k.label).collect();
        assert_eq!(
            labels,
            ["Total Revenue", "Total Orders", "Conversion Rate", "Active Customers"]
        );
    }

    #[test]
    fn test_zero_visitors_is_a_division_hazard() {
        let pts = points(&[(4_000, 30, 0), (4_000, 30, 0)]);
        let err = compute_kpis(&pts, &indicators()).unwrap_err();
        assert_eq!(err, EngineError::DivisionHazard("conversion rate"));

        assert!(compute_kpis(&[], &indicators()).is_err());
    }

    #[test]
    fn test_distribution_shares() {
        let slices: Vec<Slice> = TRAFFIC_SPECS
            .iter()
            .zip([3_000, 4_000, 2_000, 500, 500])
            .map(|(spec, value)| Slice::from_spec(spec, value))
            .collect();

        let shares = distribution_shares(&slices).unwrap();
        let percents: Vec<f64> = shares.iter().map(|s| s.percent).collect();
        assert_eq!(percents, [30.0, 40.0, 20.0, 5.0, 5.0]);
        assert_eq!(shares[1].name, "Organic");
    }

    #[test]
    fn test_distribution_shares_of_empty_set() {
        assert_eq!(
            distribution_shares(&[]).unwrap_err(),
            EngineError::DivisionHazard("distribution share")
        );
    }
}
