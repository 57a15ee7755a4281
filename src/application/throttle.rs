use crate::config::ThrottleConfig;
use crate::domain::ports::Throttle;
use std::sync::Arc;
use std::time::Duration;

/// Paces a stream of work units: after every `batch_size` admitted units the
/// next admission waits out `cooldown` first.
///
/// Work is never dropped, only delayed. The pause happens when the unit after
/// a full batch asks to start, so a batch that ends the stream costs no wait.
pub struct BatchThrottler {
    batch_size: usize,
    cooldown: Duration,
    throttle: Arc<dyn Throttle>,
    admitted: u64,
    cooldowns: u64,
}

impl BatchThrottler {
    pub fn new(batch_size: usize, cooldown: Duration, throttle: Arc<dyn Throttle>) -> Self {
        Self {
            batch_size,
            cooldown,
            throttle,
            admitted: 0,
            cooldowns: 0,
        }
    }

    pub fn from_config(config: &ThrottleConfig, throttle: Arc<dyn Throttle>) -> Self {
        Self::new(config.batch_size, config.cooldown(), throttle)
    }

    fn enabled(&self) -> bool {
        self.batch_size > 0 && !self.cooldown.is_zero()
    }

    /// Admits one work unit, pausing first if the previous batch just filled up.
    pub async fn admit(&mut self) {
        if self.enabled() && self.admitted > 0 && self.admitted % self.batch_size as u64 == 0 {
            tracing::debug!(
                admitted = self.admitted,
                cooldown_secs = self.cooldown.as_secs(),
                "Batch complete, cooling down"
            );
            self.throttle.pause(self.cooldown).await;
            self.cooldowns += 1;
        }
        self.admitted += 1;
    }

    pub fn admitted(&self) -> u64 {
        self.admitted
    }

    pub fn cooldowns(&self) -> u64 {
        self.cooldowns
    }
}
