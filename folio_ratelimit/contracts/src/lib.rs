use std::{future::Future, net::IpAddr, time::Duration};

/// Admission control for contact form submissions, keyed by client origin.
///
/// The check both counts the request and decides whether it is admitted, so
/// callers must invoke it exactly once per inbound request, before any
/// validation or email work.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    fn check(
        &self,
        origin: IpAddr,
    ) -> impl Future<Output = anyhow::Result<RateLimitDecision>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request is within the quota.
    Allowed { remaining: u64 },
    /// The origin exhausted its quota for the current window.
    Limited { retry_after: Duration },
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_check(mut self, origin: IpAddr, decision: RateLimitDecision) -> Self {
        self.expect_check()
            .once()
            .with(mockall::predicate::eq(origin))
            .return_once(move |_| Box::pin(std::future::ready(Ok(decision))));
        self
    }
}
