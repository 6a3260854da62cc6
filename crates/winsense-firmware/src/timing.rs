use embedded_hal_async::delay::DelayNs;

/// Async delay backed by the embassy time driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyDelay;

impl DelayNs for EmbassyDelay {
    async fn delay_ns(&mut self, ns: u32) {
        embassy_time::Timer::after_nanos(ns as u64).await;
    }

    async fn delay_us(&mut self, us: u32) {
        embassy_time::Timer::after_micros(us as u64).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        embassy_time::Timer::after_millis(ms as u64).await;
    }
}
