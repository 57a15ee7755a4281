use crate::domain::ports::Throttle;
use async_trait::async_trait;
use std::time::Duration;

/// Cooldown backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepThrottle;

#[async_trait]
impl Throttle for SleepThrottle {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Returns immediately. For tests and dry local runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopThrottle;

#[async_trait]
impl Throttle for NoopThrottle {
    async fn pause(&self, _duration: Duration) {}
}
