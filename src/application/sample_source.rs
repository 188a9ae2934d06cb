// Sample source trait for raw observation generation
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::metrics::{KpiIndicators, MonthPoint, Slice, TimePoint};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Hourly,
    Monthly,
    Categorical,
    Traffic,
    Indicators,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawSamples {
    Hourly(Vec<TimePoint>),
    Monthly(Vec<MonthPoint>),
    Categorical(Vec<Slice>),
    Traffic(Vec<Slice>),
    Indicators(KpiIndicators),
}

impl RawSamples {
    pub fn kind(&self) -> SampleKind {
        match self {
            RawSamples::Hourly(_) => SampleKind::Hourly,
            RawSamples::Monthly(_) => SampleKind::Monthly,
            RawSamples::Categorical(_) => SampleKind::Categorical,
            RawSamples::Traffic(_) => SampleKind::Traffic,
            RawSamples::Indicators(_) => SampleKind::Indicators,
        }
    }

    pub fn into_hourly(self) -> EngineResult<Vec<TimePoint>> {
        match self {
            RawSamples::Hourly(points) => Ok(points),
            other => Err(mismatch(SampleKind::Hourly, other.kind())),
        }
    }

    pub fn into_monthly(self) -> EngineResult<Vec<MonthPoint>> {
        match self {
            RawSamples::Monthly(points) => Ok(points),
            other => Err(mismatch(SampleKind::Monthly, other.kind())),
        }
    }

    pub fn into_categorical(self) -> EngineResult<Vec<Slice>> {
        match self {
            RawSamples::Categorical(slices) => Ok(slices),
            other => Err(mismatch(SampleKind::Categorical, other.kind())),
        }
    }

    pub fn into_traffic(self) -> EngineResult<Vec<Slice>> {
        match self {
            RawSamples::Traffic(slices) => Ok(slices),
            other => Err(mismatch(SampleKind::Traffic, other.kind())),
        }
    }

    pub fn into_indicators(self) -> EngineResult<KpiIndicators> {
        match self {
            RawSamples::Indicators(indicators) => Ok(indicators),
            other => Err(mismatch(SampleKind::Indicators, other.kind())),
        }
    }
}

fn mismatch(expected: SampleKind, got: SampleKind) -> EngineError {
    EngineError::Sampling(format!("expected {:?} samples, got {:?}", expected, got))
}

pub trait SampleSource: Send {
    /// Produce one raw data set of the requested kind.
    /// `now` anchors the hourly series; the other kinds ignore it.
    fn generate(&mut self, kind: SampleKind, now: DateTime<Utc>) -> EngineResult<RawSamples>;
}
