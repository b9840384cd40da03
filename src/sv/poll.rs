//! Fixed-interval polling with optional bounds.

use std::{future::Future, ops::ControlFlow};

use tokio::time::{self, Instant};

use crate::prelude::*;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
  pub interval: Duration,
  /// Wall time after which the wait gives up.
  pub timeout: Option<Duration>,
  pub max_attempts: Option<u32>,
}

impl Default for PollOptions {
  fn default() -> Self {
    Self { interval: DEFAULT_INTERVAL, timeout: None, max_attempts: None }
  }
}

impl PollOptions {
  pub fn every(interval: Duration) -> Self {
    Self { interval, ..Self::default() }
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn max_attempts(mut self, attempts: u32) -> Self {
    self.max_attempts = Some(attempts);
    self
  }
}

/// Runs `probe` until it breaks, sleeping `interval` between attempts.
///
/// The probe receives the 1-based attempt number. Without a timeout or
/// attempt limit this waits forever; dropping the future cancels it.
pub async fn until<T, F, Fut>(options: &PollOptions, mut probe: F) -> Result<T>
where
  F: FnMut(u32) -> Fut,
  Fut: Future<Output = Result<ControlFlow<T>>>,
{
  let started = Instant::now();
  let mut attempts = 0;

  loop {
    attempts += 1;

    if let ControlFlow::Break(value) = probe(attempts).await? {
      return Ok(value);
    }

    let elapsed = started.elapsed();
    let out_of_attempts =
      options.max_attempts.is_some_and(|max| attempts >= max);
    let out_of_time = options.timeout.is_some_and(|limit| elapsed >= limit);

    if out_of_attempts || out_of_time {
      debug!(attempts, ?elapsed, "polling gave up");
      return Err(Error::Deadline { attempts, elapsed });
    }

    let pause = match options.timeout {
      Some(limit) => options.interval.min(limit - elapsed),
      None => options.interval,
    };
    trace!(attempts, ?pause, "not ready yet");
    time::sleep(pause).await;
  }
}
