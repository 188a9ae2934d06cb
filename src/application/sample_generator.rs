// Random sample generator - bounded uniform draws for every sample kind
use crate::application::sample_source::{RawSamples, SampleKind, SampleSource};
use crate::application::statistics::round1;
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::metrics::{
    CATEGORY_SPECS, DeltaRange, HOURS_PER_SERIES, KpiIndicators, MONTH_LABELS, MonthPoint, Slice,
    SliceSpec, TRAFFIC_SPECS, TimePoint, ValueRange,
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const HOURLY_SALES: ValueRange = ValueRange::new(4_000, 12_000);
pub const HOURLY_ORDERS: ValueRange = ValueRange::new(30, 110);
pub const HOURLY_VISITORS: ValueRange = ValueRange::new(200, 700);

pub const MONTHLY_REVENUE: ValueRange = ValueRange::new(80_000, 130_000);
pub const MONTHLY_PROFIT: ValueRange = ValueRange::new(40_000, 70_000);

pub const REVENUE_CHANGE: DeltaRange = DeltaRange::new(-5.0, 15.0);
pub const ORDERS_CHANGE: DeltaRange = DeltaRange::new(-3.0, 12.0);
pub const CONVERSION_CHANGE: DeltaRange = DeltaRange::new(-2.0, 8.0);
pub const CUSTOMERS_CHANGE: DeltaRange = DeltaRange::new(-2.0, 10.0);
pub const ACTIVE_CUSTOMERS: ValueRange = ValueRange::new(1_200, 1_400);

pub struct RandomSampleGenerator {
    rng: StdRng,
}

impl RandomSampleGenerator {
    /// Seeded when `seed` is set, otherwise drawn from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self {
                rng: StdRng::from_entropy(),
            },
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn draw(&mut self, name: &'static str, range: ValueRange) -> EngineResult<u64> {
        if !range.is_valid() {
            return Err(EngineError::InvalidRange {
                name,
                low: range.low.to_string(),
                high: range.high.to_string(),
            });
        }
        Ok(self.rng.gen_range(range.low..range.high))
    }

    fn draw_delta(&mut self, name: &'static str, range: DeltaRange) -> EngineResult<f64> {
        if !range.is_valid() {
            return Err(EngineError::InvalidRange {
                name,
                low: range.low.to_string(),
                high: range.high.to_string(),
            });
        }
        Ok(round1(self.rng.gen_range(range.low..range.high)))
    }

    /// One point per hour, oldest first, the last one stamped at `now`.
    fn hourly(&mut self, now: DateTime<Utc>) -> EngineResult<Vec<TimePoint>> {
        (0..HOURS_PER_SERIES)
            .rev()
            .map(|hours_ago| -> EngineResult<TimePoint> {
                let time = now - Duration::hours(hours_ago as i64);
                Ok(TimePoint::new(
                    time,
                    self.draw("sales", HOURLY_SALES)?,
                    self.draw("orders", HOURLY_ORDERS)?,
                    self.draw("visitors", HOURLY_VISITORS)?,
                ))
            })
            .collect()
    }

    fn monthly(&mut self) -> EngineResult<Vec<MonthPoint>> {
        MONTH_LABELS
            .iter()
            .map(|&label| -> EngineResult<MonthPoint> {
                Ok(MonthPoint::new(
                    label,
                    self.draw("revenue", MONTHLY_REVENUE)?,
                    self.draw("profit", MONTHLY_PROFIT)?,
                ))
            })
            .collect()
    }

    fn slices(&mut self, specs: &[SliceSpec]) -> EngineResult<Vec<Slice>> {
        specs
            .iter()
            .map(|spec| -> EngineResult<Slice> {
                Ok(Slice::from_spec(spec, self.draw(spec.name, spec.range)?))
            })
            .collect()
    }

    fn indicators(&mut self) -> EngineResult<KpiIndicators> {
        Ok(KpiIndicators {
            revenue_change: self.draw_delta("revenue change", REVENUE_CHANGE)?,
            orders_change: self.draw_delta("orders change", ORDERS_CHANGE)?,
            conversion_change: self.draw_delta("conversion change", CONVERSION_CHANGE)?,
            customers_change: self.draw_delta("customers change", CUSTOMERS_CHANGE)?,
            active_customers: self.draw("active customers", ACTIVE_CUSTOMERS)?,
        })
    }
}

impl SampleSource for RandomSampleGenerator {
    fn generate(&mut self, kind: SampleKind, now: DateTime<Utc>) -> EngineResult<RawSamples> {
        Ok(match kind {
            SampleKind::Hourly => RawSamples::Hourly(self.hourly(now)?),
            SampleKind::Monthly => RawSamples::Monthly(self.monthly()?),
            SampleKind::Categorical => RawSamples::Categorical(self.slices(&CATEGORY_SPECS)?),
            SampleKind::Traffic => RawSamples::Traffic(self.slices(&TRAFFIC_SPECS)?),
            SampleKind::Indicators => RawSamples::Indicators(self.indicators()?),
        })
    }
}
