//! Human-like delays for outbound delivery.

use std::time::Duration;

use rand::Rng;

/// Delay parameters of a delivery cycle, in milliseconds.
///
/// Ranges are inclusive `(min, max)` pairs sampled uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Pause before showing the typing indicator.
    pub think_ms: (u64, u64),
    /// Typing time per character of the reply.
    pub typing_per_char_ms: u64,
    /// Lower bound of the typing time.
    pub typing_min_ms: u64,
    /// Upper bound of the per-character typing time.
    pub typing_max_ms: u64,
    /// Pause after a delivery attempt before the next dequeue.
    pub cooldown_ms: (u64, u64),
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            think_ms: (2_000, 5_000),
            typing_per_char_ms: 50,
            typing_min_ms: 3_000,
            typing_max_ms: 10_000,
            cooldown_ms: (1_000, 3_000),
        }
    }
}

impl PacingPolicy {
    /// A policy with no delays at all.
    pub fn instant() -> Self {
        Self {
            think_ms: (0, 0),
            typing_per_char_ms: 0,
            typing_min_ms: 0,
            typing_max_ms: 0,
            cooldown_ms: (0, 0),
        }
    }

    /// Random pause before typing starts.
    pub fn think_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        sample(rng, self.think_ms)
    }

    /// Simulated typing time for `text`.
    ///
    /// `max(typing_min, min(chars * per_char, typing_max))`
    pub fn typing_delay(&self, text: &str) -> Duration {
        let chars = text.chars().count() as u64;
        let ms = chars
            .saturating_mul(self.typing_per_char_ms)
            .min(self.typing_max_ms)
            .max(self.typing_min_ms);
        Duration::from_millis(ms)
    }

    /// Random pause between two delivery cycles.
    pub fn cooldown_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        sample(rng, self.cooldown_ms)
    }

    /// Shortest possible think + typing time for `text`.
    pub fn min_cycle(&self, text: &str) -> Duration {
        Duration::from_millis(self.think_ms.0.min(self.think_ms.1)) + self.typing_delay(text)
    }

    /// Longest possible think + typing time for `text`.
    pub fn max_cycle(&self, text: &str) -> Duration {
        Duration::from_millis(self.think_ms.0.max(self.think_ms.1)) + self.typing_delay(text)
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (a, b): (u64, u64)) -> Duration {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    Duration::from_millis(rng.gen_range(lo..=hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_typing_delay_bounds() {
        let policy = PacingPolicy::default();

        assert_eq!(policy.typing_delay(""), Duration::from_millis(3_000));
        assert_eq!(policy.typing_delay("short"), Duration::from_millis(3_000));
        assert_eq!(
            policy.typing_delay(&"a".repeat(100)),
            Duration::from_millis(5_000)
        );
        assert_eq!(
            policy.typing_delay(&"a".repeat(1_000)),
            Duration::from_millis(10_000)
        );
    }

    #[test]
    fn test_typing_delay_counts_chars_not_bytes() {
        let policy = PacingPolicy::default();
        // 80 two-byte characters
        assert_eq!(
            policy.typing_delay(&"é".repeat(80)),
            Duration::from_millis(4_000)
        );
    }

    #[test]
    fn test_random_delays_stay_in_range() {
        let policy = PacingPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1_000 {
            let think = policy.think_delay(&mut rng);
            assert!(think >= Duration::from_millis(2_000) && think <= Duration::from_millis(5_000));

            let cooldown = policy.cooldown_delay(&mut rng);
            assert!(
                cooldown >= Duration::from_millis(1_000) && cooldown <= Duration::from_millis(3_000)
            );
        }
    }

    #[test]
    fn test_cycle_bounds_between_5_and_15_seconds() {
        let policy = PacingPolicy::default();

        for text in ["ok".to_string(), "x".repeat(120), "y".repeat(5_000)] {
            assert!(policy.min_cycle(&text) >= Duration::from_secs(5));
            assert!(policy.max_cycle(&text) <= Duration::from_secs(15));
        }
    }

    #[test]
    fn test_instant_policy() {
        let policy = PacingPolicy::instant();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(policy.think_delay(&mut rng), Duration::ZERO);
        assert_eq!(policy.typing_delay("hello"), Duration::ZERO);
        assert_eq!(policy.cooldown_delay(&mut rng), Duration::ZERO);
    }

    #[test]
    fn test_reversed_range_is_tolerated() {
        let policy = PacingPolicy {
            think_ms: (500, 100),
            ..PacingPolicy::instant()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let d = policy.think_delay(&mut rng);
        assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(500));
    }
}
