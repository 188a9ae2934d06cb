// Snapshot domain model - one immutable bundle per refresh tick
use super::metrics::{CategorySlice, KpiSet, MonthPoint, SliceShare, TimePoint, TrafficSlice};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Fields are private: a Snapshot only comes out of the composer, already checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    generation: u64,
    generated_at: DateTime<Utc>,
    time_series: Vec<TimePoint>,
    monthly: Vec<MonthPoint>,
    categories: Vec<CategorySlice>,
    traffic: Vec<TrafficSlice>,
    traffic_shares: Vec<SliceShare>,
    kpis: KpiSet,
}

impl Snapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        generation: u64,
        generated_at: DateTime<Utc>,
        time_series: Vec<TimePoint>,
        monthly: Vec<MonthPoint>,
        categories: Vec<CategorySlice>,
        traffic: Vec<TrafficSlice>,
        traffic_shares: Vec<SliceShare>,
        kpis: KpiSet,
    ) -> Self {
        Self {
            generation,
            generated_at,
            time_series,
            monthly,
            categories,
            traffic,
            traffic_shares,
            kpis,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn time_series(&self) -> &[TimePoint] {
        &self.time_series
    }

    pub fn monthly(&self) -> &[MonthPoint] {
        &self.monthly
    }

    pub fn categories(&self) -> &[CategorySlice] {
        &self.categories
    }

    pub fn traffic(&self) -> &[TrafficSlice] {
        &self.traffic
    }

    pub fn traffic_shares(&self) -> &[SliceShare] {
        &self.traffic_shares
    }

    pub fn kpis(&self) -> &KpiSet {
        &self.kpis
    }
}
