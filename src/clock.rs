use chrono::NaiveTime;

/// Time source for the update loop
///
/// The interval math only ever sees the wall clock through this trait, so
/// tests can simulate elapsed time without real delays.
pub trait Clock: Send + Sync + 'static {
    /// Current local time of day
    fn time_of_day(&self) -> NaiveTime;
}

/// The system's local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}
