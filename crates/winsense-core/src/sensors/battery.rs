use log::error;
use serde::{Deserialize, Serialize};

use super::{AnalogInput, Sensor, SensorError};
use crate::config::AnalogReference;

/// Divider calibration and the voltage bounds mapped to 0 % and 100 %.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryCalibration {
    pub volts_per_bit: f32,
    pub min_voltage: f32,
    pub max_voltage: f32,
}

impl BatteryCalibration {
    pub fn to_volts(&self, raw: u16) -> f32 {
        raw as f32 * self.volts_per_bit
    }

    pub fn percent(&self, volts: f32) -> u8 {
        battery_percent(volts, self.min_voltage, self.max_voltage)
    }
}

/// Linear battery level between `min` (0 %) and `max` (100 %).
///
/// Rounded to the nearest whole percent and clamped to 0..=100. Returns 0 for
/// an empty or inverted range and for NaN input.
pub fn battery_percent(volts: f32, min: f32, max: f32) -> u8 {
    let span = max - min;
    if !(span > 0.0) {
        return 0;
    }

    let ratio = (volts - min) / span;
    if !(ratio > 0.0) {
        return 0;
    }
    if ratio >= 1.0 {
        return 100;
    }

    // ratio is in (0, 1) here, so adding 0.5 before truncating rounds
    (ratio * 100.0 + 0.5) as u8
}

/// One battery measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySample {
    pub raw: u16,
    pub volts: f32,
    pub percent: u8,
}

/// Battery voltage divider on an analog input.
pub struct BatteryMonitor<A> {
    adc: A,
    calibration: BatteryCalibration,
}

impl<A: AnalogInput> BatteryMonitor<A> {
    pub fn new(adc: A, calibration: BatteryCalibration) -> Self {
        Self { adc, calibration }
    }

    pub fn set_reference(&mut self, reference: AnalogReference) -> Result<(), SensorError> {
        self.adc.set_reference(reference)
    }

    pub fn calibration(&self) -> BatteryCalibration {
        self.calibration
    }
}

impl<A: AnalogInput> Sensor for BatteryMonitor<A> {
    type Readings = BatterySample;

    async fn read(&mut self) -> Result<BatterySample, SensorError> {
        let raw = self.adc.read_raw().map_err(|e| {
            error!("Battery ADC read failed: {}", e);
            e
        })?;

        let volts = self.calibration.to_volts(raw);
        let percent = self.calibration.percent(volts);

        Ok(BatterySample {
            raw,
            volts,
            percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;

    struct FixedAdc {
        raw: Option<u16>,
        reference: Option<AnalogReference>,
    }

    impl AnalogInput for FixedAdc {
        fn set_reference(&mut self, reference: AnalogReference) -> Result<(), SensorError> {
            self.reference = Some(reference);
            Ok(())
        }

        fn read_raw(&mut self) -> Result<u16, SensorError> {
            self.raw.ok_or(SensorError::AdcRead { sensor: "battery" })
        }
    }

    fn monitor(raw: Option<u16>) -> BatteryMonitor<FixedAdc> {
        let adc = FixedAdc {
            raw,
            reference: None,
        };
        BatteryMonitor::new(adc, NodeConfig::default().battery_calibration())
    }

    #[test]
    fn test_reading_near_empty_battery() {
        // 536 counts on the 1 MΩ / 470 kΩ divider is just above the 1.8 V floor
        let sample = embassy_futures::block_on(monitor(Some(536)).read()).unwrap();
        assert_eq!(sample.raw, 536);
        assert!((sample.volts - 1.803).abs() < 0.001, "volts {}", sample.volts);
        assert_eq!(sample.percent, 0);
    }

    #[test]
    fn test_percent_uses_fresh_voltage() {
        // 2.4 V is halfway between 1.8 V and 3.0 V
        let raw = (2.4 / 0.003_363_075_f32) as u16 + 1;
        let sample = embassy_futures::block_on(monitor(Some(raw)).read()).unwrap();
        assert_eq!(sample.percent, 50);
    }

    #[test]
    fn test_percent_bounds_and_rounding() {
        assert_eq!(battery_percent(1.8, 1.8, 3.0), 0);
        assert_eq!(battery_percent(3.0, 1.8, 3.0), 100);
        assert_eq!(battery_percent(2.4, 1.8, 3.0), 50);
        assert_eq!(battery_percent(2.1, 1.8, 3.0), 25);
        // 25.83 rounds up, 9.17 rounds down
        assert_eq!(battery_percent(2.11, 1.8, 3.0), 26);
        assert_eq!(battery_percent(1.91, 1.8, 3.0), 9);
    }

    #[test]
    fn test_percent_clamps_outside_bounds() {
        assert_eq!(battery_percent(0.0, 1.8, 3.0), 0);
        assert_eq!(battery_percent(1.2, 1.8, 3.0), 0);
        assert_eq!(battery_percent(3.6, 1.8, 3.0), 100);
        assert_eq!(battery_percent(f32::NAN, 1.8, 3.0), 0);
        assert_eq!(battery_percent(2.5, 3.0, 3.0), 0);
    }

    #[test]
    fn test_percent_is_monotonic_over_range() {
        let mut previous = 0;
        for step in 0..=1200 {
            let volts = 1.8 + step as f32 * 0.001;
            let percent = battery_percent(volts, 1.8, 3.0);
            assert!(percent >= previous, "{} V gave {} after {}", volts, percent, previous);
            assert!(percent <= 100);
            previous = percent;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn test_reference_is_forwarded_to_adc() {
        let mut monitor = monitor(Some(0));
        monitor.set_reference(AnalogReference::Internal).unwrap();
        assert_eq!(monitor.adc.reference, Some(AnalogReference::Internal));
    }

    #[test]
    fn test_adc_failure_is_reported() {
        let result = embassy_futures::block_on(monitor(None).read());
        assert_eq!(result, Err(SensorError::AdcRead { sensor: "battery" }));
    }
}
