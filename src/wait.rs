//! Async bridge from the poll-based protocol to Rust futures.
//!
//! [`wait_ready`] polls a runtime future on an interval until it reports
//! Ready, so callers on a tokio runtime can `.await` readiness instead of
//! writing their own poll loop. It only waits; completing the future and
//! retrieving its payload remains the caller's synchronous call.

use std::time::Duration;

use tokio::time::sleep;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::handle::FutureHandle;
use crate::proto::future::FutureState;
use crate::status::{NativeResult, ResultStatus};

/// Pacing of a [`wait_ready`] poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between consecutive polls.
    pub interval: Duration,
    /// Give up after this many polls. `None` polls until Ready.
    pub max_polls: Option<u32>,
}

impl PollOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_polls: None,
        }
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

/// Poll `future` until it reports Ready, sleeping between polls.
///
/// Returns the status of the poll that observed Ready. If the poll budget
/// runs out first, fails with the future-pending error; the future itself
/// stays live and can still be polled, waited on again, or cancelled.
/// Any poll error is returned as-is.
pub async fn wait_ready(
    client: &Client,
    future: FutureHandle,
    options: PollOptions,
) -> Result<ResultStatus> {
    let mut polls = 0u32;
    loop {
        let (status, poll) = client.poll_future(future)?;
        if poll.state == FutureState::Ready {
            return Ok(status);
        }
        polls += 1;
        if let Some(max) = options.max_polls {
            if polls >= max {
                tracing::debug!(%future, polls, "poll budget exhausted while pending");
                return Err(Error::FuturePending(ResultStatus::from_native(
                    NativeResult::FUTURE_PENDING,
                )));
            }
        }
        sleep(options.interval).await;
    }
}
