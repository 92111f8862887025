//! Rotten Tomatoes request throttle.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Default number of calls allowed per window.
const DEFAULT_MAX_CALLS: usize = 5;

/// Default window length.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Sliding-window throttle: at most `max_calls` requests per `interval`.
///
/// Keeps the timestamps of the requests cleared within the current
/// window; once the window is full, callers sleep until the oldest entry
/// expires.
#[derive(Debug)]
pub struct RequestThrottler {
    /// Calls allowed per window.
    max_calls: usize,
    /// Window length.
    interval: Duration,
    /// Timestamps of cleared requests, oldest first.
    ticks: VecDeque<Instant>,
    /// When `wait_at_most` last gave up.
    last_expired_max_wait: Option<Instant>,
}

impl RequestThrottler {
    /// Creates a throttle allowing `max_calls` requests per `interval`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `max_calls` is zero or
    /// `interval` is zero.
    pub fn new(max_calls: usize, interval: Duration) -> Result<Self> {
        if max_calls < 1 {
            return Err(Error::InvalidParameter(format!(
                "max_calls must be >= 1, was {max_calls}"
            )));
        }
        if interval.is_zero() {
            return Err(Error::InvalidParameter(String::from(
                "interval must be greater than zero",
            )));
        }
        Ok(Self {
            max_calls,
            interval,
            ticks: VecDeque::with_capacity(max_calls),
            last_expired_max_wait: None,
        })
    }

    /// Creates a throttle with the default limits (5 calls per second).
    pub(crate) fn default_limits() -> Self {
        Self {
            max_calls: DEFAULT_MAX_CALLS,
            interval: DEFAULT_INTERVAL,
            ticks: VecDeque::with_capacity(DEFAULT_MAX_CALLS),
            last_expired_max_wait: None,
        }
    }

    /// Calls allowed per window.
    #[must_use]
    pub const fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Window length.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// When [`Self::wait_at_most`] last gave up, if ever.
    #[must_use]
    pub const fn last_expired_max_wait(&self) -> Option<Instant> {
        self.last_expired_max_wait
    }

    /// Tries to clear a request now.
    ///
    /// Returns `None` if the request was cleared, or how long to wait
    /// before trying again.
    pub fn try_start_request(&mut self) -> Option<Duration> {
        self.try_start_request_at(Instant::now())
    }

    fn try_start_request_at(&mut self, now: Instant) -> Option<Duration> {
        while self
            .ticks
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.interval)
        {
            self.ticks.pop_front();
        }

        if self.ticks.len() < self.max_calls {
            self.ticks.push_back(now);
            return None;
        }

        let oldest = self.ticks.front().copied().unwrap_or(now);
        Some(
            self.interval
                .saturating_sub(now.saturating_duration_since(oldest))
                .max(Duration::from_millis(1)),
        )
    }

    /// Waits until the next request is allowed.
    pub async fn wait(&mut self) {
        while let Some(delay) = self.try_start_request() {
            tracing::debug!(delay_ms = delay.as_millis(), "Request throttled");
            tokio::time::sleep(delay).await;
        }
    }

    /// Waits until the next request is allowed, giving up once the total
    /// sleep would exceed `max_wait`. A zero `max_wait` means no cap.
    ///
    /// Returns `false` if the request was not cleared.
    pub async fn wait_at_most(&mut self, max_wait: Duration) -> bool {
        let mut total = Duration::ZERO;
        while let Some(delay) = self.try_start_request() {
            total = total.saturating_add(delay);
            if !max_wait.is_zero() && total > max_wait {
                self.last_expired_max_wait = Some(Instant::now());
                tracing::warn!(
                    max_wait_ms = max_wait.as_millis(),
                    "Throttle wait exceeded the limit"
                );
                return false;
            }
            tokio::time::sleep(delay).await;
        }
        true
    }
}
