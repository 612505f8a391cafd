//! `circadian` is the Rust crate implementing the core features of the
//! `circadiand` smart-lighting daemon. It computes a continuously updating
//! target light state (color temperature, chromaticity, brightness) for a
//! configured time-of-day interval, and publishes every change of that state
//! onto a stream consumed by a downstream lighting driver.

#[macro_use]
extern crate tracing;

pub mod clock;
pub mod color;
pub mod interval;
pub mod models;
pub mod runner;
pub mod serde;
