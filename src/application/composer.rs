// Snapshot composer - assembles one tick's outputs and checks every invariant
use crate::application::statistics::{DerivedStatistics, HourlyTotals};
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::metrics::{
    CATEGORY_SPECS, HOUR_MS, HOURS_PER_SERIES, MONTH_LABELS, MonthPoint, Slice, SliceSpec,
    TRAFFIC_SPECS, TimePoint, hour_label,
};
use crate::domain::snapshot::Snapshot;
use chrono::{DateTime, Utc};

macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(EngineError::InvariantViolation(format!($($arg)+)));
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotHeader {
    pub generation: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    pub hourly: Vec<TimePoint>,
    pub monthly: Vec<MonthPoint>,
    pub categories: Vec<Slice>,
    pub traffic: Vec<Slice>,
}

pub fn compose(
    header: SnapshotHeader,
    observations: Observations,
    derived: DerivedStatistics,
) -> EngineResult<Snapshot> {
    check_hourly(&observations.hourly, header.generated_at)?;
    check_monthly(&observations.monthly)?;
    check_slices("category", &observations.categories, &CATEGORY_SPECS)?;
    check_slices("traffic", &observations.traffic, &TRAFFIC_SPECS)?;
    check_derived(&observations, &derived)?;

    Ok(Snapshot::new(
        header.generation,
        header.generated_at,
        observations.hourly,
        observations.monthly,
        observations.categories,
        observations.traffic,
        derived.traffic_shares,
        derived.kpis,
    ))
}

fn check_hourly(points: &[TimePoint], generated_at: DateTime<Utc>) -> EngineResult<()> {
    invariant!(
        points.len() == HOURS_PER_SERIES,
        "expected {} hourly points, got {}",
        HOURS_PER_SERIES,
        points.len()
    );

    for pair in points.windows(2) {
        invariant!(
            pair[1].time_ms - pair[0].time_ms == HOUR_MS,
            "hourly points {} and {} are not one hour apart",
            pair[0].label,
            pair[1].label
        );
    }

    for point in points {
        let time = DateTime::<Utc>::from_timestamp_millis(point.time_ms).ok_or_else(|| {
            EngineError::InvariantViolation(format!("timestamp {} out of range", point.time_ms))
        })?;
        invariant!(
            point.label == hour_label(&time),
            "label {} does not match its timestamp",
            point.label
        );
    }

    let last = points.last().map(|p| p.time_ms);
    invariant!(
        last == Some(generated_at.timestamp_millis()),
        "hourly series does not end at the generation instant"
    );
    Ok(())
}

fn check_monthly(points: &[MonthPoint]) -> EngineResult<()> {
    let labels: Vec<&str> = points.iter().map(|p| p.label).collect();
    invariant!(
        labels == MONTH_LABELS,
        "monthly labels {:?} are not Jan..Dec",
        labels
    );
    Ok(())
}

/// Names must be exactly the reference set, in reference order.
fn check_slices(set: &str, slices: &[Slice], specs: &[SliceSpec]) -> EngineResult<()> {
    invariant!(!slices.is_empty(), "{} set is empty", set);

    let names: Vec<&str> = slices.iter().map(|s| s.name).collect();
    let expected: Vec<&str> = specs.iter().map(|s| s.name).collect();
    invariant!(
        names == expected,
        "{} names {:?} differ from {:?}",
        set,
        names,
        expected
    );
    Ok(())
}

fn check_derived(observations: &Observations, derived: &DerivedStatistics) -> EngineResult<()> {
    let totals = HourlyTotals::from_points(&observations.hourly);
    let kpis = &derived.kpis;

    invariant!(totals.visitors > 0, "visitor total is zero");
    invariant!(
        kpis.revenue.value == totals.sales as f64,
        "revenue KPI {} != sales total {}",
        kpis.revenue.value,
        totals.sales
    );
    invariant!(
        kpis.orders.value == totals.orders as f64,
        "orders KPI {} != orders total {}",
        kpis.orders.value,
        totals.orders
    );

    let conversion = totals.conversion_rate()?;
    invariant!(
        kpis.conversion_rate.value == conversion,
        "conversion KPI {} != {}",
        kpis.conversion_rate.value,
        conversion
    );

    let share_names: Vec<&str> = derived.traffic_shares.iter().map(|s| s.name).collect();
    let traffic_names: Vec<&str> = observations.traffic.iter().map(|s| s.name).collect();
    invariant!(
        share_names == traffic_names,
        "traffic shares do not line up with traffic sources"
    );
    Ok(())
}
