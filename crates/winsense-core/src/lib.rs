//! Hardware-independent core library for winsense
//!
//! This crate contains the platform-agnostic logic of the battery powered
//! window sensor node: node configuration, the window contact and battery
//! sensors, the message model and transport trait used to reach the gateway,
//! the status LED, the edge-or-timeout wake primitive and the reporter that
//! ties them into one sense/report/sleep cycle.
//!
//! It is `#![no_std]` so it compiles on both the ESP32-S3 target and desktop
//! hosts (for the simulator and tests).

#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod indicator;
pub mod protocol;
pub mod reporter;
pub mod sensors;
pub mod wake;

pub use config::{AnalogReference, ConfigError, NodeConfig};
pub use reporter::{CycleReport, NodeHardware, ReporterError, SendOutcomes, SensorReporter};
