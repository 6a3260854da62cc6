//! ESP32-S3 firmware-specific modules for winsense
//!
//! This crate contains the hardware-specific code that cannot compile on
//! desktop targets: the ADC adapter for the battery divider, the ESP-NOW link
//! to the gateway, build-time device settings and the embassy delay used by
//! the reporter.

#![no_std]

pub mod battery_adc;
pub mod espnow_link;
pub mod settings;
pub mod timing;
