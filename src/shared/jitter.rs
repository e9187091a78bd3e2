use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;

/// Draws a uniformly random delay in `[0, max)` to stagger reconnect-triggered
/// drains across devices. Each call reseeds from the OS random source.
///
/// Never applied to capture or any other user-facing path.
#[derive(Debug, Clone)]
pub struct JitterScheduler {
    max: Duration,
}

impl JitterScheduler {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    pub fn from_max_ms(max_ms: u64) -> Self {
        Self::new(Duration::from_millis(max_ms))
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn delay(&self) -> Duration {
        self.sample(&mut OsRng)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        let max_ms = self.max.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(0..max_ms))
    }
}
