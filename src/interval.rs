use std::convert::TryFrom;

use chrono::NaiveTime;
use thiserror::Error;

use crate::color;
use crate::models::{IntervalConfig, LightState, TimeStamp};

#[derive(Debug, Error)]
pub enum IntervalError {
    #[error("degenerate interval: {start} does not precede {end}")]
    Degenerate { start: NaiveTime, end: NaiveTime },
}

/// A time range of one day with the given start and end light configurations
///
/// Combined with a query time, an interval deterministically resolves to
/// exactly one [LightState] by linear interpolation between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    start: TimeStamp,
    end: TimeStamp,
}

impl Interval {
    /// Build an interval, rejecting zero and negative durations
    pub fn new(start: TimeStamp, end: TimeStamp) -> Result<Self, IntervalError> {
        if end.time <= start.time {
            return Err(IntervalError::Degenerate {
                start: start.time,
                end: end.time,
            });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> &TimeStamp {
        &self.start
    }

    pub fn end(&self) -> &TimeStamp {
        &self.end
    }

    /// Resolve the target light state at the given time of day
    ///
    /// The blend weight is the fraction of the interval elapsed at `time`.
    /// It is not clamped: querying outside the interval extrapolates the same
    /// linear ramp, and it is the caller's job to only query while the
    /// interval is active.
    pub fn light_state_at(&self, time: NaiveTime) -> LightState {
        let duration = self.end.time - self.start.time;
        let elapsed = time - self.start.time;
        let progress = elapsed.num_milliseconds() as f64 / duration.num_milliseconds() as f64;

        let color_temperature = blend(self.start.color, self.end.color, progress);
        let brightness = blend(self.start.brightness, self.end.brightness, progress);
        let (x, y) = color::color_temperature_to_xy(color_temperature);

        LightState {
            color_temperature,
            xy: [x, y],
            brightness,
        }
    }
}

impl TryFrom<IntervalConfig> for Interval {
    type Error = IntervalError;

    fn try_from(config: IntervalConfig) -> Result<Self, Self::Error> {
        Self::new(config.start, config.end)
    }
}

/// Linear blend between two targets, dropping the fractional part of the step
fn blend(start: i32, end: i32, progress: f64) -> i32 {
    start + (f64::from(end - start) * progress) as i32
}
