// Data-fetching screens.
// Each screen loads its own collections, keeps them locally and re-fetches
// everything after a mutation. Nothing is shared or cached between screens.

pub mod analytics;
pub mod applications;
pub mod candidate_dashboard;
pub mod candidate_profile;
pub mod candidates;
pub mod hr_dashboard;
pub mod job_search;
pub mod jobs;
pub mod manager_dashboard;

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, warn};

use crate::errors::{ClientError, ClientResult};

/// Local copy of something fetched from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// No response has arrived yet.
    Loading,
    Ready(T),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T: Default> Loadable<T> {
    /// Stores a fetch result. A failure is logged and keeps the previous data;
    /// a failed first load settles to an empty value so the screen stops loading.
    pub fn settle(&mut self, context: &str, result: ClientResult<T>) -> ClientResult<()> {
        match result {
            Ok(value) => {
                *self = Loadable::Ready(value);
                Ok(())
            }
            Err(e) => {
                log_failure(context, &e);
                if matches!(self, Loadable::Loading) {
                    *self = Loadable::Ready(T::default());
                }
                Err(e)
            }
        }
    }
}

impl<T> Loadable<T> {
    pub fn get(&self) -> Option<&T> {
        match self {
            Loadable::Loading => None,
            Loadable::Ready(value) => Some(value),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }
}

pub fn log_failure(context: &str, err: &ClientError) {
    error!("Error {context}: {err}");
}

/// Logs a failed mutation and passes it on for the caller's alert.
pub fn mutation_failed<T>(context: &str, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(e) = &result {
        log_failure(context, e);
    }
    result
}

/// Outcome of the re-fetch that follows a mutation the backend accepted. A
/// failed re-fetch is already logged by `settle` and keeps the previous data;
/// it is not reported as a failed mutation.
pub fn refetched(result: ClientResult<()>) -> ClientResult<()> {
    if result.is_err() {
        warn!("Change saved but the screen could not be refreshed");
    }
    Ok(())
}

/// Fixed-period refresh timer. The first tick fires one full period after
/// creation; dropping the poller stops it.
pub struct Poller {
    interval: Interval,
}

impl Poller {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

pub(crate) const LOADING: &str = "Loading...";
