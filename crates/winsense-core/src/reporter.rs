//! Sense, report, sleep
//!
//! [`SensorReporter`] owns the node's hardware and transport and runs the
//! reporting cycle: read the window contact and battery, send three reports,
//! pulse the status LED if all of them were accepted, then wait for the sleep
//! interval or a window change. A failed read or send is logged and recorded
//! in the [`CycleReport`]; the cycle always runs through to the wait.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use log::{error, info, warn};
use thiserror_no_std::Error;

use crate::config::{ConfigError, NodeConfig};
use crate::indicator::{IndicatorError, StatusLed};
use crate::protocol::{Message, SensorKind, Transport, TransportError, ValueKind};
use crate::sensors::{
    AnalogInput, BatteryMonitor, BatterySample, Sensor, SensorError, WindowContact, WindowState,
};
use crate::wake::{EdgeOrTimeout, WakeReason};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ReporterError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("indicator error: {0}")]
    Indicator(#[from] IndicatorError),
}

/// Pins and timing source the reporter runs on
pub struct NodeHardware<P, A, L, D> {
    /// Window contact input, interrupt capable
    pub window_pin: P,
    /// Battery divider analog input
    pub battery_adc: A,
    /// Status LED output
    pub status_led: L,
    pub delay: D,
}

/// Whether each of the cycle's three reports was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendOutcomes {
    pub window: bool,
    pub voltage: bool,
    pub percent: bool,
}

impl SendOutcomes {
    pub const fn all_succeeded(&self) -> bool {
        self.window && self.voltage && self.percent
    }
}

/// Everything one cycle observed and did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub cycle: u32,
    /// `None` if the contact could not be read
    pub window: Option<WindowState>,
    /// `None` if the ADC could not be read
    pub battery: Option<BatterySample>,
    pub outcomes: SendOutcomes,
    pub indicator_pulsed: bool,
    pub wake: WakeReason,
}

pub struct SensorReporter<'a, P, A, L, D, T> {
    config: NodeConfig<'a>,
    window: WindowContact<P>,
    battery: BatteryMonitor<A>,
    led: StatusLed<L, D>,
    wake: EdgeOrTimeout<D>,
    transport: T,
    cycle: u32,
}

impl<'a, P, A, L, D, T> SensorReporter<'a, P, A, L, D, T>
where
    P: InputPin + Wait,
    A: AnalogInput,
    L: OutputPin,
    D: DelayNs + Clone,
    T: Transport,
{
    /// Validate `config` and take ownership of the hardware and transport.
    pub fn new(
        config: NodeConfig<'a>,
        hardware: NodeHardware<P, A, L, D>,
        transport: T,
    ) -> Result<Self, ReporterError> {
        config.validate()?;

        let NodeHardware {
            window_pin,
            battery_adc,
            status_led,
            delay,
        } = hardware;

        Ok(Self {
            battery: BatteryMonitor::new(battery_adc, config.battery_calibration()),
            window: WindowContact::new(window_pin),
            led: StatusLed::new(status_led, delay.clone()),
            wake: EdgeOrTimeout::new(delay),
            transport,
            config,
            cycle: 0,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One-time hardware setup: ADC reference, LED off, startup pulse.
    pub async fn init(&mut self) -> Result<(), ReporterError> {
        self.battery.set_reference(self.config.analog_reference)?;
        self.led.off()?;
        self.led.pulse(self.config.startup_pulse_ms).await?;

        info!(
            "Node {} initialized (parent {}, reporting every {} min)",
            self.config.node_id, self.config.parent_node_id, self.config.sleep_minutes
        );
        Ok(())
    }

    /// Announce the sketch and register both child sensors.
    ///
    /// Returns `true` if all four messages were accepted. Failures are logged
    /// and otherwise ignored; the node reports either way.
    pub async fn present(&mut self) -> bool {
        let mut accepted = true;

        if let Err(e) = self
            .transport
            .send_sketch_info(self.config.sketch_name, self.config.sketch_version)
            .await
        {
            warn!("Sketch info not accepted: {}", e);
            accepted = false;
        }

        let children = [
            (self.config.window_child_id, SensorKind::Door),
            (self.config.voltage_child_id, SensorKind::Multimeter),
        ];
        for (child_id, kind) in children {
            if let Err(e) = self.transport.present(child_id, kind).await {
                warn!("Presentation of child {} ({:?}) failed: {}", child_id, kind, e);
                accepted = false;
            }
        }

        accepted
    }

    /// Run one sense/report/sleep cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle = self.cycle.wrapping_add(1);

        let window = self.window.read().await.ok();
        let battery = self.battery.read().await.ok();

        #[cfg(feature = "diagnostics")]
        log_readings(window, battery.as_ref());

        let mut outcomes = SendOutcomes::default();

        if let Some(state) = window {
            let message = Message::set_text(
                self.config.window_child_id,
                ValueKind::Tripped,
                state.payload(),
            );
            outcomes.window = self.deliver("window state", message).await;
        }

        if let Some(sample) = battery {
            let message =
                Message::set_float(self.config.voltage_child_id, ValueKind::Voltage, sample.volts);
            outcomes.voltage = self.deliver("battery voltage", message).await;

            outcomes.percent = match self.transport.send_battery_level(sample.percent).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Battery level report failed: {}", e);
                    false
                }
            };
        }

        let mut indicator_pulsed = false;
        if outcomes.all_succeeded() {
            match self.led.pulse(self.config.success_pulse_ms).await {
                Ok(()) => indicator_pulsed = true,
                Err(e) => error!("Success pulse failed: {}", e),
            }
        }

        let wake = self
            .wake
            .wait(self.window.pin_mut(), self.config.sleep_interval_ms())
            .await;

        CycleReport {
            cycle: self.cycle,
            window,
            battery,
            outcomes,
            indicator_pulsed,
            wake,
        }
    }

    /// Initialize, present, then report forever.
    pub async fn run(&mut self) {
        if let Err(e) = self.init().await {
            error!("Initialization incomplete: {}", e);
        }

        if !self.present().await {
            warn!("Presentation incomplete, reporting anyway");
        }

        loop {
            let report = self.run_cycle().await;
            if !report.outcomes.all_succeeded() {
                warn!("Cycle {}: {:?}", report.cycle, report.outcomes);
            }
        }
    }

    async fn deliver(&mut self, what: &str, message: Result<Message, TransportError>) -> bool {
        let result = match message {
            Ok(message) => self.transport.send(&message).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("{} report failed: {}", what, e);
                false
            }
        }
    }
}

#[cfg(feature = "diagnostics")]
fn log_readings(window: Option<WindowState>, battery: Option<&BatterySample>) {
    if let Some(state) = window {
        info!("Window state: {}", state.label());
    }

    if let Some(sample) = battery {
        info!("Battery voltage: {:.3} V", sample.volts);
        info!("Battery percent: {} %", sample.percent);
    }
}
