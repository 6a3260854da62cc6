mod battery;
mod window;

pub use battery::*;
pub use window::*;

use thiserror_no_std::Error;

use crate::config::AnalogReference;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: digital pin read failed")]
    PinRead { sensor: &'static str },
    #[error("{sensor}: ADC conversion failed")]
    AdcRead { sensor: &'static str },
    #[error("analog reference {0:?} is not supported by this ADC")]
    UnsupportedReference(AnalogReference),
}

/// Trait for sensors that produce typed readings.
pub trait Sensor {
    /// The type of readings this sensor produces.
    type Readings;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> impl Future<Output = Result<Self::Readings, SensorError>>;
}

/// One analog input channel.
///
/// embedded-hal 1.0 has no ADC abstraction, so platforms implement this for
/// whatever pin/converter pair feeds the battery divider.
pub trait AnalogInput {
    /// Select the reference voltage conversions are made against.
    fn set_reference(&mut self, reference: AnalogReference) -> Result<(), SensorError>;

    /// Take one conversion and return the raw count.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}
