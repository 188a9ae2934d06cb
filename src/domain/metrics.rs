// Metric domain models
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

pub const HOURS_PER_SERIES: usize = 24;
pub const HOUR_MS: i64 = 60 * 60 * 1000;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Half-open `[low, high)` range for non-negative quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    pub low: u64,
    pub high: u64,
}

impl ValueRange {
    pub const fn new(low: u64, high: u64) -> Self {
        Self { low, high }
    }

    pub fn is_valid(&self) -> bool {
        self.low < self.high
    }
}

/// Half-open `[low, high)` range for signed percentage deltas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaRange {
    pub low: f64,
    pub high: f64,
}

impl DeltaRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low < self.high
    }
}

/// Opaque style reference handed through to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColorToken(&'static str);

impl ColorToken {
    pub const fn new(token: &'static str) -> Self {
        Self(token)
    }
}

/// Reference entry for a named slice: its stable color and sampling range.
#[derive(Debug, Clone, Copy)]
pub struct SliceSpec {
    pub name: &'static str,
    pub color: ColorToken,
    pub range: ValueRange,
}

impl SliceSpec {
    const fn new(name: &'static str, color: &'static str, low: u64, high: u64) -> Self {
        Self {
            name,
            color: ColorToken::new(color),
            range: ValueRange::new(low, high),
        }
    }
}

pub const CATEGORY_SPECS: [SliceSpec; 6] = [
    SliceSpec::new("Electronics", "#8b5cf6", 25_000, 30_000),
    SliceSpec::new("Clothing", "#ec4899", 18_000, 22_000),
    SliceSpec::new("Food & Beverage", "#f59e0b", 15_000, 18_000),
    SliceSpec::new("Home & Garden", "#10b981", 12_000, 15_000),
    SliceSpec::new("Sports", "#3b82f6", 8_000, 10_000),
    SliceSpec::new("Books", "#ef4444", 5_000, 7_000),
];

pub const TRAFFIC_SPECS: [SliceSpec; 5] = [
    SliceSpec::new("Direct", "#8b5cf6", 2_500, 3_500),
    SliceSpec::new("Organic", "#10b981", 3_500, 4_500),
    SliceSpec::new("Social", "#ec4899", 1_500, 2_300),
    SliceSpec::new("Referral", "#f59e0b", 1_000, 1_600),
    SliceSpec::new("Email", "#3b82f6", 800, 1_300),
];

/// Hour marker in the `H:00` form used on the sales trend axis. The hour is
/// taken in UTC, not the viewer's local zone.
pub fn hour_label(time: &DateTime<Utc>) -> String {
    format!("{}:00", time.hour())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePoint {
    pub label: String,
    pub time_ms: i64,
    pub sales: u64,
    pub orders: u64,
    pub visitors: u64,
}

impl TimePoint {
    pub fn new(time: DateTime<Utc>, sales: u64, orders: u64, visitors: u64) -> Self {
        Self {
            label: hour_label(&time),
            time_ms: time.timestamp_millis(),
            sales,
            orders,
            visitors,
        }
    }
}

/// Monthly revenue and profit. Profit is sampled independently and may exceed revenue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthPoint {
    pub label: &'static str,
    pub revenue: u64,
    pub profit: u64,
}

impl MonthPoint {
    pub fn new(label: &'static str, revenue: u64, profit: u64) -> Self {
        Self {
            label,
            revenue,
            profit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: &'static str,
    pub value: u64,
    pub color: ColorToken,
}

impl Slice {
    pub fn from_spec(spec: &SliceSpec, value: u64) -> Self {
        Self {
            name: spec.name,
            value,
            color: spec.color,
        }
    }
}

pub type CategorySlice = Slice;
pub type TrafficSlice = Slice;

/// Percentage a slice contributes to its set's total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceShare {
    pub name: &'static str,
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub label: &'static str,
    pub value: f64,
    pub percent_change: f64,
    pub trend: Trend,
    pub unit_prefix: &'static str,
    pub unit_suffix: &'static str,
}

impl Kpi {
    pub fn new(label: &'static str, value: f64, percent_change: f64) -> Self {
        let trend = if percent_change >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        };
        Self {
            label,
            value,
            percent_change,
            trend,
            unit_prefix: "",
            unit_suffix: "",
        }
    }

    pub fn with_prefix(mut self, prefix: &'static str) -> Self {
        self.unit_prefix = prefix;
        self
    }

    pub fn with_suffix(mut self, suffix: &'static str) -> Self {
        self.unit_suffix = suffix;
        self
    }
}

/// One KPI per tracked metric, in stat-card order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub revenue: Kpi,
    pub orders: Kpi,
    pub conversion_rate: Kpi,
    pub active_customers: Kpi,
}

impl KpiSet {
    pub fn iter(&self) -> impl Iterator<Item = &Kpi> {
        [
            &self.revenue,
            &self.orders,
            &self.conversion_rate,
            &self.active_customers,
        ]
        .into_iter()
    }
}

/// Independently sampled inputs for the KPI set: change deltas and active customers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiIndicators {
    pub revenue_change: f64,
    pub orders_change: f64,
    pub conversion_change: f64,
    pub customers_change: f64,
    pub active_customers: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_hour_label() {
        let time = Utc.with_ymd_and_hms(2026, 3, 14, 9, 41, 7).unwrap();
        assert_eq!(hour_label(&time), "9:00");

        let midnight = Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(hour_label(&midnight), "0:00");

        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap();
        assert_eq!(hour_label(&local.with_timezone(&Utc)), "4:00");
    }

    #[test]
    fn test_kpi_trend_follows_change_sign() {
        assert_eq!(Kpi::new("Total Orders", 1.0, 0.0).trend, Trend::Up);
        assert_eq!(Kpi::new("Total Orders", 1.0, 3.4).trend, Trend::Up);
        assert_eq!(Kpi::new("Total Orders", 1.0, -0.1).trend, Trend::Down);
    }

    #[test]
    fn test_reference_sets_are_unique_and_valid() {
        for specs in [&CATEGORY_SPECS[..], &TRAFFIC_SPECS[..]] {
            for (i, spec) in specs.iter().enumerate() {
                assert!(spec.range.is_valid(), "{} has an empty range", spec.name);
                assert!(specs[i + 1..].iter().all(|other| other.name != spec.name));
            }
        }
    }

    #[test]
    fn test_ranges() {
        assert!(ValueRange::new(0, 1).is_valid());
        assert!(!ValueRange::new(5, 5).is_valid());
        assert!(DeltaRange::new(-5.0, 15.0).is_valid());
        assert!(!DeltaRange::new(2.0, -2.0).is_valid());
        assert!(!DeltaRange::new(f64::NAN, 1.0).is_valid());
    }
}
