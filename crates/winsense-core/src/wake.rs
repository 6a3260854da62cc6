//! Wait for the sleep interval to elapse or the window contact to change.

use embassy_futures::select::{Either, select};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use log::{debug, warn};

/// What ended a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The sleep interval elapsed
    Timer,
    /// The monitored input changed level
    Interrupt,
}

/// Races a timeout against an edge on a monitored input.
pub struct EdgeOrTimeout<D> {
    delay: D,
}

impl<D: DelayNs> EdgeOrTimeout<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Block until `timeout_ms` elapses or `pin` sees a rising or falling edge.
    ///
    /// If the edge wait cannot be armed the call degrades to a plain timed
    /// wait and reports [`WakeReason::Timer`].
    pub async fn wait<P: Wait>(&mut self, pin: &mut P, timeout_ms: u32) -> WakeReason {
        let outcome = select(pin.wait_for_any_edge(), self.delay.delay_ms(timeout_ms)).await;

        match outcome {
            Either::First(Ok(())) => {
                debug!("Woken by input edge");
                WakeReason::Interrupt
            }
            Either::First(Err(e)) => {
                warn!("Edge wait failed ({:?}), sleeping for the full interval", e);
                self.delay.delay_ms(timeout_ms).await;
                WakeReason::Timer
            }
            Either::Second(()) => {
                debug!("Woken by timer after {} ms", timeout_ms);
                WakeReason::Timer
            }
        }
    }
}
