//! Desktop simulator for the winsense window sensor node.
//!
//! Runs the winsense-core reporter against simulated hardware: a window
//! contact that opens and closes on a fixed script, a battery that slowly
//! drains, and a gateway that drops every few messages. Time is compressed so
//! a two minute sleep passes in a fraction of a second.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info winsense-simulator [CYCLES]
//! ```
//!
//! `CYCLES` defaults to 12.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use log::{error, info, warn};

use winsense_core::protocol::{Message, Transport, TransportError};
use winsense_core::sensors::{AnalogInput, SensorError};
use winsense_core::wake::WakeReason;
use winsense_core::{AnalogReference, NodeConfig, NodeHardware, SensorReporter};

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// Simulated milliseconds per real millisecond.
const TIME_SCALE: u64 = 1000;

/// Cycles run when no count is given on the command line.
const DEFAULT_CYCLES: u32 = 12;

/// Cycles during whose sleep the window changes state.
const WINDOW_TOGGLE_CYCLES: &[u32] = &[2, 3, 7, 10];

/// The gateway drops every Nth message it receives.
const GATEWAY_DROP_EVERY: u32 = 7;

/// ADC counts of a fresh pair of cells (~3.0 V on the default divider).
const BATTERY_FULL_RAW: u16 = 892;
/// ADC counts lost per reading.
const BATTERY_DRAIN_PER_READ: u16 = 23;
/// ADC counts below which the simulated cells stop sagging (~1.6 V).
const BATTERY_FLOOR_RAW: u16 = 476;

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// Compressed-time delay.
#[derive(Clone)]
struct SimDelay;

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64 / TIME_SCALE));
    }
}

/// Window contact driven by [`WINDOW_TOGGLE_CYCLES`].
///
/// The reporter arms an edge wait once per cycle; `sleeps` counts those waits
/// so the pin knows whether this sleep is scripted to end with a toggle.
struct SimWindowPin {
    open: Rc<Cell<bool>>,
    sleeps: u32,
}

impl SimWindowPin {
    fn new(open: Rc<Cell<bool>>) -> Self {
        Self { open, sleeps: 0 }
    }

    async fn edge(&mut self) -> Result<(), ErrorKind> {
        self.sleeps += 1;

        if WINDOW_TOGGLE_CYCLES.contains(&self.sleeps) {
            // Somewhere in the middle of the sleep interval
            std::thread::sleep(Duration::from_millis(30));
            let now_open = !self.open.get();
            self.open.set(now_open);
            info!(
                "[world] window {}",
                if now_open { "opened" } else { "closed" }
            );
            Ok(())
        } else {
            core::future::pending().await
        }
    }
}

impl ErrorType for SimWindowPin {
    type Error = ErrorKind;
}

impl InputPin for SimWindowPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.open.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.open.get())
    }
}

impl Wait for SimWindowPin {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        if self.open.get() { Ok(()) } else { self.edge().await }
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        if self.open.get() { self.edge().await } else { Ok(()) }
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.edge().await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.edge().await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.edge().await
    }
}

/// Battery divider whose reading sags a little on every conversion.
struct SimBatteryAdc {
    raw: u16,
}

impl AnalogInput for SimBatteryAdc {
    fn set_reference(&mut self, reference: AnalogReference) -> Result<(), SensorError> {
        match reference {
            AnalogReference::Internal | AnalogReference::Default => {
                info!("[adc] reference set to {:?}", reference);
                Ok(())
            }
            AnalogReference::External => Err(SensorError::UnsupportedReference(reference)),
        }
    }

    fn read_raw(&mut self) -> Result<u16, SensorError> {
        let raw = self.raw;
        self.raw = self
            .raw
            .saturating_sub(BATTERY_DRAIN_PER_READ)
            .max(BATTERY_FLOOR_RAW);
        Ok(raw)
    }
}

/// Status LED that logs its transitions.
struct SimLed;

impl ErrorType for SimLed {
    type Error = ErrorKind;
}

impl OutputPin for SimLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        log::debug!("[led] off");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        info!("[led] on");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Simulated gateway
// ---------------------------------------------------------------------------

/// Gateway that logs every message and drops every [`GATEWAY_DROP_EVERY`]th.
struct SimGateway {
    node_id: u8,
    received: u32,
    dropped: u32,
}

impl SimGateway {
    fn new(node_id: u8) -> Self {
        Self {
            node_id,
            received: 0,
            dropped: 0,
        }
    }
}

impl Transport for SimGateway {
    async fn send(&mut self, message: &Message) -> Result<(), TransportError> {
        self.received += 1;

        if self.received % GATEWAY_DROP_EVERY == 0 {
            self.dropped += 1;
            warn!(
                "[gateway] dropped node {} child {} {:?}",
                self.node_id, message.child_id, message.kind
            );
            return Err(TransportError::NotAcknowledged);
        }

        info!(
            "[gateway] node {} child {} cmd {} type {} {:?}",
            self.node_id,
            message.child_id,
            message.kind.command_code(),
            message.kind.type_code(),
            message.payload
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    let cycles = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u32>() {
            Ok(cycles) => cycles,
            Err(e) => {
                error!("Invalid cycle count {:?}: {}", arg, e);
                std::process::exit(2);
            }
        },
        None => DEFAULT_CYCLES,
    };

    let config = NodeConfig::default();
    info!("Starting winsense simulator");
    info!(
        "Node {} -> parent {}, {} cycles, time x{}",
        config.node_id, config.parent_node_id, cycles, TIME_SCALE
    );

    let window_open = Rc::new(Cell::new(false));
    let hardware = NodeHardware {
        window_pin: SimWindowPin::new(window_open.clone()),
        battery_adc: SimBatteryAdc {
            raw: BATTERY_FULL_RAW,
        },
        status_led: SimLed,
        delay: SimDelay,
    };
    let gateway = SimGateway::new(config.node_id);

    let mut reporter = match SensorReporter::new(config, hardware, gateway) {
        Ok(reporter) => reporter,
        Err(e) => {
            error!("Cannot start node: {}", e);
            std::process::exit(1);
        }
    };

    let mut pulses = 0;
    let mut early_wakes = 0;

    embassy_futures::block_on(async {
        if let Err(e) = reporter.init().await {
            error!("Initialization incomplete: {}", e);
        }

        if !reporter.present().await {
            warn!("Presentation incomplete, reporting anyway");
        }

        for _ in 0..cycles {
            let report = reporter.run_cycle().await;

            if report.indicator_pulsed {
                pulses += 1;
            }
            if report.wake == WakeReason::Interrupt {
                early_wakes += 1;
            }

            info!(
                "Cycle {}: {:?}, woke by {:?}",
                report.cycle, report.outcomes, report.wake
            );
        }
    });

    let gateway = reporter.transport();
    info!(
        "Simulator exiting: {} messages, {} dropped, {} success pulses, {} early wakes",
        gateway.received, gateway.dropped, pulses, early_wakes
    );
}
