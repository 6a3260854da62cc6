//! Battery divider on ADC1
//!
//! The ESP32-S3 ADC always converts against its internal reference; the
//! attenuation chosen when the pin is enabled sets the full-scale range and
//! cannot be changed afterwards.

use esp_hal::Blocking;
use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO1};
use log::{error, info};

use winsense_core::AnalogReference;
use winsense_core::sensors::{AnalogInput, SensorError};

pub struct EspBatteryAdc {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    pin: AdcPin<GPIO1<'static>, ADC1<'static>>,
}

impl EspBatteryAdc {
    /// Enable GPIO1 (ADC1 channel 0) at 2.5 dB attenuation.
    pub fn new(adc1: ADC1<'static>, pin: GPIO1<'static>) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(pin, Attenuation::_2p5dB);
        let adc = Adc::new(adc1, config);

        Self { adc, pin }
    }
}

impl AnalogInput for EspBatteryAdc {
    fn set_reference(&mut self, reference: AnalogReference) -> Result<(), SensorError> {
        match reference {
            AnalogReference::Internal => {
                info!("Battery ADC on internal reference, 2.5 dB attenuation");
                Ok(())
            }
            other => Err(SensorError::UnsupportedReference(other)),
        }
    }

    fn read_raw(&mut self) -> Result<u16, SensorError> {
        nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|e| {
            error!("ADC1 oneshot read failed: {:?}", e);
            SensorError::AdcRead { sensor: "battery" }
        })
    }
}
