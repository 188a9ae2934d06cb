// Snapshot engine - one generate -> compute -> compose pass
use crate::application::clock::Clock;
use crate::application::composer::{Observations, SnapshotHeader, compose};
use crate::application::sample_source::{SampleKind, SampleSource};
use crate::application::statistics::derive_statistics;
use crate::domain::error::EngineResult;
use crate::domain::snapshot::Snapshot;
use std::sync::Arc;

pub struct SnapshotEngine {
    source: Box<dyn SampleSource>,
    clock: Arc<dyn Clock>,
}

impl SnapshotEngine {
    pub fn new(source: Box<dyn SampleSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    /// Build the snapshot for `generation`. Any failure leaves nothing behind.
    pub fn produce(&mut self, generation: u64) -> EngineResult<Snapshot> {
        let now = self.clock.now();

        let hourly = self.source.generate(SampleKind::Hourly, now)?.into_hourly()?;
        let monthly = self.source.generate(SampleKind::Monthly, now)?.into_monthly()?;
        let categories = self
            .source
            .generate(SampleKind::Categorical, now)?
            .into_categorical()?;
        let traffic = self.source.generate(SampleKind::Traffic, now)?.into_traffic()?;
        let indicators = self
            .source
            .generate(SampleKind::Indicators, now)?
            .into_indicators()?;

        let derived = derive_statistics(&hourly, &traffic, &indicators)?;

        tracing::debug!(
            generation,
            revenue = derived.kpis.revenue.value,
            conversion = derived.kpis.conversion_rate.value,
            "composing snapshot"
        );

        compose(
            SnapshotHeader {
                generation,
                generated_at: now,
            },
            Observations {
                hourly,
                monthly,
                categories,
                traffic,
            },
            derived,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::FixedClock;
    use crate::application::sample_generator::RandomSampleGenerator;
    use crate::application::statistics::round1;
    use crate::domain::metrics::{CATEGORY_SPECS, MONTH_LABELS, TRAFFIC_SPECS};
    use chrono::{TimeZone, Utc};

    fn engine(seed: u64) -> SnapshotEngine {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 16, 23, 59, 59).unwrap());
        SnapshotEngine::new(
            Box::new(RandomSampleGenerator::seeded(seed)),
            Arc::new(clock),
        )
    }

    #[test]
    fn test_every_snapshot_holds_its_invariants() {
        let mut engine = engine(2026);

        for generation in 1..=25 {
            let s = engine.produce(generation).unwrap();
            let points = s.time_series();

            let sales: u64 = points.iter().map(|p| p.sales).sum();
            let orders: u64 = points.iter().map(|p| p.orders).sum();
            let visitors: u64 = points.iter().map(|p| p.visitors).sum();
            assert!(visitors > 0);
            assert_eq!(s.kpis().revenue.value, sales as f64);
            assert_eq!(s.kpis().orders.value, orders as f64);
            assert_eq!(
                s.kpis().conversion_rate.value,
                round1(orders as f64 / visitors as f64 * 100.0)
            );

            assert_eq!(points.len(), 24);
            assert!(points.windows(2).all(|w| w[0].time_ms < w[1].time_ms));
            assert_eq!(points[23].label, "23:00");
            assert_eq!(points[23].time_ms, s.generated_at().timestamp_millis());

            let months: Vec<&str> = s.monthly().iter().map(|m| m.label).collect();
            assert_eq!(months, MONTH_LABELS);

            let categories: Vec<&str> = s.categories().iter().map(|c| c.name).collect();
            let expected: Vec<&str> = CATEGORY_SPECS.iter().map(|c| c.name).collect();
            assert_eq!(categories, expected);

            let traffic: Vec<&str> = s.traffic().iter().map(|t| t.name).collect();
            let expected: Vec<&str> = TRAFFIC_SPECS.iter().map(|t| t.name).collect();
            assert_eq!(traffic, expected);
        }
    }

    #[test]
    fn test_generation_is_carried_through() {
        let mut engine = engine(1);
        assert_eq!(engine.produce(7).unwrap().generation(), 7);
    }

    #[test]
    fn test_snapshot_serializes_for_the_renderer() {
        let snapshot = engine(8).produce(1).unwrap();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["generation"], 1);
        assert_eq!(json["timeSeries"].as_array().unwrap().len(), 24);
        assert_eq!(json["kpis"]["revenue"]["unitPrefix"], "$");
        assert_eq!(json["kpis"]["conversionRate"]["unitSuffix"], "%");
        assert_eq!(json["categories"][0]["color"], "#8b5cf6");
        assert!(json["trafficShares"][0]["percent"].is_number());
    }
}
