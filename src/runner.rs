use std::time::Duration;

use thiserror::Error;
use tokio::{
    select,
    sync::{mpsc, oneshot},
};

use crate::clock::{Clock, SystemClock};
use crate::interval::Interval;
use crate::models::LightState;

/// Cadence at which the target light state is recomputed
const UPDATE_TICK: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("light state consumer hung up")]
    ConsumerClosed,
}

impl From<mpsc::error::SendError<LightState>> for RunnerError {
    fn from(_: mpsc::error::SendError<LightState>) -> Self {
        Self::ConsumerClosed
    }
}

/// Update loop for one interval
///
/// The runner exclusively owns its interval and the "last published" state,
/// and is the single producer on the output channel. It resolves the target
/// light state once per tick, publishes it whenever it changed, and returns
/// once the interval's end time has passed or a stop was requested through
/// the [RunnerHandle].
pub struct IntervalRunner<C = SystemClock> {
    interval: Interval,
    clock: C,
    tx: mpsc::Sender<LightState>,
    handle_rx: mpsc::Receiver<RunnerMessage>,
    current: Option<LightState>,
}

impl<C: Clock> IntervalRunner<C> {
    pub fn new(
        interval: Interval,
        clock: C,
        tx: mpsc::Sender<LightState>,
    ) -> (Self, RunnerHandle) {
        let (handle_tx, handle_rx) = mpsc::channel(1);

        (
            Self {
                interval,
                clock,
                tx,
                handle_rx,
                current: None,
            },
            RunnerHandle { tx: handle_tx },
        )
    }

    async fn publish(&mut self, state: LightState) -> Result<(), RunnerError> {
        self.tx.send(state).await?;
        self.current = Some(state);
        Ok(())
    }

    #[instrument]
    pub async fn run(mut self) -> Result<(), RunnerError> {
        info!(
            start = %self.interval.start().time.format("%H:%M"),
            end = %self.interval.end().time.format("%H:%M"),
            "managing lights for interval"
        );

        // The consumer relies on us for the correct light state from now on,
        // so send out the initial state unconditionally
        let state = self.interval.light_state_at(self.clock.time_of_day());
        self.publish(state).await?;

        loop {
            // Only send a new light state if it changed
            let state = self.interval.light_state_at(self.clock.time_of_day());
            if self.current != Some(state) {
                debug!(state = ?state, "light state updated");
                self.publish(state).await?;
            }

            // Sleep until the next update, unless a stop request comes in
            select! {
                _ = tokio::time::sleep(UPDATE_TICK) => {}
                message = self.handle_rx.recv() => {
                    match message {
                        Some(RunnerMessage::Stop(tx)) => {
                            debug!("stop requested, retiring interval");
                            tx.send(()).ok();
                        }
                        None => {
                            // All handles dropped: the supervisor retired us
                            debug!("runner handle dropped, retiring interval");
                        }
                    }

                    break;
                }
            }

            // Check if the interval ended
            if self.clock.time_of_day() > self.interval.end().time {
                debug!("interval ended");
                break;
            }
        }

        Ok(())
    }
}

impl<C> std::fmt::Debug for IntervalRunner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntervalRunner")
            .field("interval", &self.interval)
            .finish()
    }
}

#[derive(Debug)]
enum RunnerMessage {
    Stop(oneshot::Sender<()>),
}

/// Control handle for a spawned [IntervalRunner]
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    tx: mpsc::Sender<RunnerMessage>,
}

#[derive(Debug, Error)]
pub enum RunnerHandleError {
    #[error("the corresponding runner is no longer running")]
    Dropped,
}

impl<T> From<mpsc::error::SendError<T>> for RunnerHandleError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::Dropped
    }
}

impl From<oneshot::error::RecvError> for RunnerHandleError {
    fn from(_: oneshot::error::RecvError) -> Self {
        Self::Dropped
    }
}

impl RunnerHandle {
    /// Retire the runner before its interval ends
    ///
    /// Resolves once the runner acknowledged the request; no state is
    /// published after that point.
    pub async fn stop(&self) -> Result<(), RunnerHandleError> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(RunnerMessage::Stop(tx)).await?;
        Ok(rx.await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::models::TimeStamp;

    /// Clock driven by tokio's paused test time
    ///
    /// Under `start_paused`, the runner's sleeps auto-advance the virtual
    /// clock, which this reads back as a time of day.
    struct PausedClock {
        base: NaiveTime,
        started: tokio::time::Instant,
    }

    impl PausedClock {
        fn at(base: &str) -> Self {
            Self {
                base: NaiveTime::parse_from_str(base, "%H:%M").unwrap(),
                started: tokio::time::Instant::now(),
            }
        }
    }

    impl Clock for PausedClock {
        fn time_of_day(&self) -> NaiveTime {
            self.base + chrono::Duration::from_std(self.started.elapsed()).unwrap()
        }
    }

    fn stamp(time: &str, color: i32, brightness: i32) -> TimeStamp {
        TimeStamp {
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            color,
            brightness,
        }
    }

    fn morning_ramp() -> Interval {
        Interval::new(stamp("08:00", 2700, 10), stamp("09:00", 5000, 100)).unwrap()
    }

    async fn collect(mut rx: mpsc::Receiver<LightState>) -> Vec<LightState> {
        let mut states = Vec::new();
        while let Some(state) = rx.recv().await {
            states.push(state);
        }
        states
    }

    #[tokio::test(start_paused = true)]
    async fn past_interval_publishes_once_and_ends() {
        let (tx, rx) = mpsc::channel(4);
        let (runner, _handle) = IntervalRunner::new(morning_ramp(), PausedClock::at("10:00"), tx);

        let task = tokio::spawn(runner.run());
        let states = collect(rx).await;
        task.await.unwrap().unwrap();

        // The initial baseline is always emitted, then the first end check
        // terminates the loop
        assert_eq!(states.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_states_are_published_once() {
        let flat = Interval::new(stamp("08:00", 3000, 50), stamp("09:00", 3000, 50)).unwrap();
        let (tx, rx) = mpsc::channel(4);
        let (runner, _handle) = IntervalRunner::new(flat, PausedClock::at("08:30"), tx);

        let task = tokio::spawn(runner.run());
        let states = collect(rx).await;
        task.await.unwrap().unwrap();

        assert_eq!(states.len(), 1);
        assert_eq!(states[0].color_temperature, 3000);
        assert_eq!(states[0].brightness, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn every_change_is_published_in_time_order() {
        let (tx, rx) = mpsc::channel(4);
        let (runner, _handle) = IntervalRunner::new(morning_ramp(), PausedClock::at("08:00"), tx);

        let task = tokio::spawn(runner.run());
        let states = collect(rx).await;
        task.await.unwrap().unwrap();

        // One baseline publish, then one change per minute up to the end of
        // the interval
        assert_eq!(states.len(), 61);
        assert_eq!(states[0].color_temperature, 2700);
        assert_eq!(states[0].brightness, 10);
        assert_eq!(states[60].color_temperature, 5000);
        assert_eq!(states[60].brightness, 100);

        for pair in states.windows(2) {
            assert!(pair[0].color_temperature < pair[1].color_temperature);
            assert!(pair[0].brightness <= pair[1].brightness);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_retires_the_runner_early() {
        let (tx, mut rx) = mpsc::channel(4);
        let (runner, handle) = IntervalRunner::new(morning_ramp(), PausedClock::at("08:00"), tx);

        let task = tokio::spawn(runner.run());
        rx.recv().await.unwrap();

        handle.stop().await.unwrap();
        task.await.unwrap().unwrap();

        // The stream closes without further publications
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_retires_the_runner() {
        let (tx, mut rx) = mpsc::channel(4);
        let (runner, handle) = IntervalRunner::new(morning_ramp(), PausedClock::at("08:00"), tx);
        drop(handle);

        let task = tokio::spawn(runner.run());
        rx.recv().await.unwrap();

        task.await.unwrap().unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn hung_up_consumer_fails_the_runner() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let (runner, _handle) = IntervalRunner::new(morning_ramp(), PausedClock::at("08:00"), tx);

        assert!(matches!(
            runner.run().await,
            Err(RunnerError::ConsumerClosed)
        ));
    }
}
