use std::{
    collections::HashMap,
    net::IpAddr,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use folio_ratelimit_contracts::{RateLimitDecision, RateLimitService};

/// Fixed-window rate limiter backed by a process-local map.
///
/// Counters live only in memory and are keyed by client origin; an entry
/// resets once its window elapses. The map is swept opportunistically so
/// long-gone origins do not accumulate.
#[derive(Debug)]
pub struct MemoryRateLimiter {
    config: MemoryRateLimiterConfig,
    state: Mutex<HashMap<IpAddr, Window>>,
}

#[derive(Debug, Clone, Copy)]
pub struct MemoryRateLimiterConfig {
    pub quota: u64,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u64,
}

const SWEEP_THRESHOLD: usize = 1024;

impl MemoryRateLimiter {
    pub fn new(config: MemoryRateLimiterConfig) -> Self {
        Self {
            config,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Counts a request from `origin` at `now` and decides whether it is
    /// admitted. Holding the map lock for the full update makes the check
    /// atomic per origin.
    fn check_at(&self, origin: IpAddr, now: Instant) -> RateLimitDecision {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if state.len() > SWEEP_THRESHOLD {
            let window = self.config.window;
            state.retain(|_, w| now < w.started + window);
        }

        let window = state.entry(origin).or_insert(Window {
            started: now,
            count: 0,
        });
        if now >= window.started + self.config.window {
            window.started = now;
            window.count = 0;
        }
        window.count += 1;

        if window.count <= self.config.quota {
            RateLimitDecision::Allowed {
                remaining: self.config.quota - window.count,
            }
        } else {
            RateLimitDecision::Limited {
                retry_after: window.started + self.config.window - now,
            }
        }
    }
}

impl RateLimitService for MemoryRateLimiter {
    async fn check(&self, origin: IpAddr) -> anyhow::Result<RateLimitDecision> {
        Ok(self.check_at(origin, Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    fn limiter(quota: u64) -> MemoryRateLimiter {
        MemoryRateLimiter::new(MemoryRateLimiterConfig {
            quota,
            window: WINDOW,
        })
    }

    fn origin(n: u8) -> IpAddr {
        [203, 0, 113, n].into()
    }

    #[test]
    fn quota_exhausted() {
        let sut = limiter(5);
        let now = Instant::now();

        for i in 0..5 {
            assert_eq!(
                sut.check_at(origin(1), now),
                RateLimitDecision::Allowed { remaining: 4 - i },
            );
        }

        assert_eq!(
            sut.check_at(origin(1), now),
            RateLimitDecision::Limited {
                retry_after: WINDOW,
            },
        );
    }

    #[test]
    fn retry_after_shrinks_within_window() {
        let sut = limiter(1);
        let now = Instant::now();

        sut.check_at(origin(1), now);

        assert_eq!(
            sut.check_at(origin(1), now + Duration::from_secs(60)),
            RateLimitDecision::Limited {
                retry_after: WINDOW - Duration::from_secs(60),
            },
        );
    }

    #[test]
    fn window_elapse_resets_counter() {
        let sut = limiter(2);
        let now = Instant::now();

        sut.check_at(origin(1), now);
        sut.check_at(origin(1), now);
        assert!(matches!(
            sut.check_at(origin(1), now),
            RateLimitDecision::Limited { .. }
        ));

        assert_eq!(
            sut.check_at(origin(1), now + WINDOW),
            RateLimitDecision::Allowed { remaining: 1 },
        );
    }

    #[test]
    fn origins_are_independent() {
        let sut = limiter(1);
        let now = Instant::now();

        assert!(matches!(
            sut.check_at(origin(1), now),
            RateLimitDecision::Allowed { .. }
        ));
        assert!(matches!(
            sut.check_at(origin(1), now),
            RateLimitDecision::Limited { .. }
        ));
        assert!(matches!(
            sut.check_at(origin(2), now),
            RateLimitDecision::Allowed { .. }
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_checks_admit_exactly_the_quota() {
        let sut = Arc::new(limiter(5));

        let handles = (0..20)
            .map(|_| {
                let sut = Arc::clone(&sut);
                tokio::spawn(async move { sut.check(origin(1)).await.unwrap() })
            })
            .collect::<Vec<_>>();

        let mut allowed = 0;
        for handle in handles {
            if matches!(
                handle.await.unwrap(),
                RateLimitDecision::Allowed { .. }
            ) {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 5);
    }
}
