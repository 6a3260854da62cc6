//! Status LED

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use log::error;
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("status LED pin could not be driven {0}")]
    Pin(&'static str),
}

/// LED on a push-pull output, pulsed to signal startup and successful reports.
pub struct StatusLed<O, D> {
    pin: O,
    delay: D,
}

impl<O: OutputPin, D: DelayNs> StatusLed<O, D> {
    pub fn new(pin: O, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn off(&mut self) -> Result<(), IndicatorError> {
        self.pin.set_low().map_err(|e| {
            error!("Status LED set_low failed: {:?}", e);
            IndicatorError::Pin("low")
        })
    }

    /// Drive the LED high for `duration_ms`, then low again.
    pub async fn pulse(&mut self, duration_ms: u32) -> Result<(), IndicatorError> {
        self.pin.set_high().map_err(|e| {
            error!("Status LED set_high failed: {:?}", e);
            IndicatorError::Pin("high")
        })?;

        self.delay.delay_ms(duration_ms).await;

        self.off()
    }
}
