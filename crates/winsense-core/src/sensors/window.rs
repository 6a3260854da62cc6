use embedded_hal::digital::InputPin;
use log::error;
use serde::{Deserialize, Serialize};

use super::{Sensor, SensorError};

/// State of the window contact. A high input means open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowState {
    Open,
    Closed,
}

impl WindowState {
    pub const fn from_level(high: bool) -> Self {
        if high { Self::Open } else { Self::Closed }
    }

    /// Tripped payload sent to the gateway
    pub const fn payload(self) -> &'static str {
        match self {
            Self::Open => "1",
            Self::Closed => "0",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Reed/door contact on an interrupt-capable digital input.
pub struct WindowContact<P> {
    pin: P,
}

impl<P: InputPin> WindowContact<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// The contact pin, for arming an edge wait on it.
    pub fn pin_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}

impl<P: InputPin> Sensor for WindowContact<P> {
    type Readings = WindowState;

    async fn read(&mut self) -> Result<WindowState, SensorError> {
        let high = self.pin.is_high().map_err(|e| {
            error!("Window contact read failed: {:?}", e);
            SensorError::PinRead {
                sensor: "window contact",
            }
        })?;

        Ok(WindowState::from_level(high))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct FixedPin(Option<bool>);

    impl ErrorType for FixedPin {
        type Error = ErrorKind;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.0.ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.0.map(|high| !high).ok_or(ErrorKind::Other)
        }
    }

    #[test]
    fn test_high_reads_open_and_sends_one() {
        let mut contact = WindowContact::new(FixedPin(Some(true)));
        let state = embassy_futures::block_on(contact.read()).unwrap();
        assert_eq!(state, WindowState::Open);
        assert_eq!(state.payload(), "1");
    }

    #[test]
    fn test_low_reads_closed_and_sends_zero() {
        let mut contact = WindowContact::new(FixedPin(Some(false)));
        let state = embassy_futures::block_on(contact.read()).unwrap();
        assert_eq!(state, WindowState::Closed);
        assert_eq!(state.payload(), "0");
    }

    #[test]
    fn test_pin_failure_is_reported() {
        let mut contact = WindowContact::new(FixedPin(None));
        let result = embassy_futures::block_on(contact.read());
        assert_eq!(
            result,
            Err(SensorError::PinRead {
                sensor: "window contact"
            })
        );
    }
}
