//! Monotonic time source with a cooperative wait.
use embassy_time::{Duration, Instant, Timer};

#[allow(async_fn_in_trait)]
pub trait Clock {
    fn now(&self) -> Instant;

    /// Suspends the calling task until `deadline`. Returns at once if it already passed.
    async fn wait_until(&mut self, deadline: Instant);

    async fn delay(&mut self, duration: Duration) {
        let deadline = self.now() + duration;
        self.wait_until(deadline).await;
    }
}

/// [`Clock`] backed by the embassy time driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn wait_until(&mut self, deadline: Instant) {
        Timer::at(deadline).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embassy_clock_waits_for_deadline() {
        let mut clock = EmbassyClock;
        let start = clock.now();
        embassy_futures::block_on(clock.delay(Duration::from_millis(5)));
        assert!(clock.now() >= start + Duration::from_millis(5));
    }
}
