//! Node configuration
//!
//! Every build-time constant of the node lives in [`NodeConfig`] and is handed
//! to the reporter at construction. Firmware builds fill in per-device values
//! (node id, gateway address) from `.env` at build time.

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::protocol::MAX_PAYLOAD_SIZE;
use crate::sensors::BatteryCalibration;

/// Network identity of this node
pub const DEFAULT_NODE_ID: u8 = 21;
/// The gateway
pub const DEFAULT_PARENT_NODE_ID: u8 = 0;

pub const DEFAULT_SKETCH_NAME: &str = "WindowSensor 1";
pub const DEFAULT_SKETCH_VERSION: &str = "1.0";

pub const DEFAULT_WINDOW_CHILD_ID: u8 = 1;
pub const DEFAULT_VOLTAGE_CHILD_ID: u8 = 2;

/// Minutes between periodic reports
pub const DEFAULT_SLEEP_MINUTES: u32 = 2;
/// Longest interval whose length still fits in `u32` milliseconds (~49.7 days)
pub const MAX_SLEEP_MINUTES: u32 = u32::MAX / MS_PER_MINUTE;

const MS_PER_MINUTE: u32 = 60 * 1000;

/// 1 MΩ / 470 kΩ divider read against the 1.1 V internal reference by a 10-bit ADC
pub const DEFAULT_VOLTS_PER_BIT: f32 = 0.003_363_075;
/// Battery voltage reported as 100 %
pub const DEFAULT_MAX_VOLTAGE: f32 = 3.0;
/// Battery voltage reported as 0 %
pub const DEFAULT_MIN_VOLTAGE: f32 = 1.8;

pub const DEFAULT_STARTUP_PULSE_MS: u32 = 500;
pub const DEFAULT_SUCCESS_PULSE_MS: u32 = 100;

/// Reference voltage the battery ADC is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalogReference {
    /// Supply voltage
    Default,
    /// Internal band-gap reference (~1.1 V)
    Internal,
    /// Voltage applied to the external reference pin
    External,
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("max voltage {max} V must be above min voltage {min} V")]
    VoltageBounds { min: f32, max: f32 },
    #[error("volts per bit must be positive, got {0}")]
    VoltsPerBit(f32),
    #[error("window and voltage sensors share child id {0}")]
    DuplicateChildId(u8),
    #[error("sleep interval must be at least one minute")]
    ZeroSleepInterval,
    #[error("sleep interval of {0} minutes exceeds the 71582 minute limit")]
    SleepIntervalTooLong(u32),
    #[error("{field} does not fit in a 25 byte payload")]
    TooLong { field: &'static str },
}

/// Build-time configuration of a window sensor node
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct NodeConfig<'a> {
    pub node_id: u8,
    pub parent_node_id: u8,
    pub sketch_name: &'a str,
    pub sketch_version: &'a str,
    pub window_child_id: u8,
    pub voltage_child_id: u8,
    pub sleep_minutes: u32,
    pub volts_per_bit: f32,
    pub max_voltage: f32,
    pub min_voltage: f32,
    pub analog_reference: AnalogReference,
    pub startup_pulse_ms: u32,
    pub success_pulse_ms: u32,
}

impl Default for NodeConfig<'static> {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID,
            parent_node_id: DEFAULT_PARENT_NODE_ID,
            sketch_name: DEFAULT_SKETCH_NAME,
            sketch_version: DEFAULT_SKETCH_VERSION,
            window_child_id: DEFAULT_WINDOW_CHILD_ID,
            voltage_child_id: DEFAULT_VOLTAGE_CHILD_ID,
            sleep_minutes: DEFAULT_SLEEP_MINUTES,
            volts_per_bit: DEFAULT_VOLTS_PER_BIT,
            max_voltage: DEFAULT_MAX_VOLTAGE,
            min_voltage: DEFAULT_MIN_VOLTAGE,
            analog_reference: AnalogReference::Internal,
            startup_pulse_ms: DEFAULT_STARTUP_PULSE_MS,
            success_pulse_ms: DEFAULT_SUCCESS_PULSE_MS,
        }
    }
}

impl<'a> NodeConfig<'a> {
    /// Sleep interval between periodic reports, in milliseconds
    pub const fn sleep_interval_ms(&self) -> u32 {
        self.sleep_minutes.saturating_mul(MS_PER_MINUTE)
    }

    /// Divider calibration and percent bounds for the battery monitor
    pub const fn battery_calibration(&self) -> BatteryCalibration {
        BatteryCalibration {
            volts_per_bit: self.volts_per_bit,
            min_voltage: self.min_voltage,
            max_voltage: self.max_voltage,
        }
    }

    /// Reject configurations the reporter cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_voltage > self.min_voltage) {
            return Err(ConfigError::VoltageBounds {
                min: self.min_voltage,
                max: self.max_voltage,
            });
        }

        if !(self.volts_per_bit > 0.0) {
            return Err(ConfigError::VoltsPerBit(self.volts_per_bit));
        }

        if self.window_child_id == self.voltage_child_id {
            return Err(ConfigError::DuplicateChildId(self.window_child_id));
        }

        if self.sleep_minutes == 0 {
            return Err(ConfigError::ZeroSleepInterval);
        }

        if self.sleep_minutes > MAX_SLEEP_MINUTES {
            return Err(ConfigError::SleepIntervalTooLong(self.sleep_minutes));
        }

        if self.sketch_name.len() > MAX_PAYLOAD_SIZE {
            return Err(ConfigError::TooLong {
                field: "sketch name",
            });
        }

        if self.sketch_version.len() > MAX_PAYLOAD_SIZE {
            return Err(ConfigError::TooLong {
                field: "sketch version",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NodeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.node_id, 21);
        assert_eq!(config.window_child_id, 1);
        assert_eq!(config.voltage_child_id, 2);
    }

    #[test]
    fn test_sleep_interval_is_minutes_in_ms() {
        let config = NodeConfig::default();
        assert_eq!(config.sleep_interval_ms(), 120_000);
    }

    #[test]
    fn test_inverted_voltage_bounds_rejected() {
        let config = NodeConfig {
            max_voltage: 1.8,
            min_voltage: 3.0,
            ..NodeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::VoltageBounds { .. })
        ));
    }

    #[test]
    fn test_duplicate_child_ids_rejected() {
        let config = NodeConfig {
            voltage_child_id: 1,
            ..NodeConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::DuplicateChildId(1)));
    }

    #[test]
    fn test_zero_sleep_and_bad_calibration_rejected() {
        let config = NodeConfig {
            sleep_minutes: 0,
            ..NodeConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroSleepInterval));

        let config = NodeConfig {
            volts_per_bit: 0.0,
            ..NodeConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::VoltsPerBit(0.0)));
    }

    #[test]
    fn test_sleep_interval_beyond_u32_ms_rejected() {
        let config = NodeConfig {
            sleep_minutes: 100_000,
            ..NodeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SleepIntervalTooLong(100_000))
        );

        let config = NodeConfig {
            sleep_minutes: MAX_SLEEP_MINUTES,
            ..NodeConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.sleep_interval_ms(), 71_582 * 60_000);
    }

    #[test]
    fn test_oversized_sketch_name_rejected() {
        let config = NodeConfig {
            sketch_name: "A window sensor with a very long name",
            ..NodeConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooLong {
                field: "sketch name"
            })
        );
    }
}
