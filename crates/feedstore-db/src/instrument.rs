//! Deadline-bounded query execution and boundary logging.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use feedstore_core::logging::SLOW_QUERY_MS;
use feedstore_core::{Error, Result};

/// A point in time by which a group of queries must finish.
///
/// Queries that serve one request (a page and its count) share a deadline,
/// so the request as a whole stays within the configured timeout.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// A deadline `budget` from now.
    pub(crate) fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    fn budget_ms(&self) -> u64 {
        self.budget.as_millis() as u64
    }
}

/// Run a query future under `timeout`.
///
/// Backend failures are tagged with `op`; an elapsed deadline becomes
/// [`Error::Timeout`]. Dropping the returned future cancels the query.
pub(crate) async fn bounded<T, F>(
    component: &'static str,
    op: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    bounded_until(component, op, Deadline::after(timeout), fut).await
}

/// Run a query future that must finish by `deadline`.
///
/// A timeout reports the deadline's whole budget, not the time left when
/// this query started.
pub(crate) async fn bounded_until<T, F>(
    component: &'static str,
    op: &'static str,
    deadline: Deadline,
    fut: F,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let start = Instant::now();
    let outcome = tokio::time::timeout_at(deadline.at, fut).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(value)) => {
            if duration_ms > SLOW_QUERY_MS {
                warn!(
                    subsystem = "db",
                    component,
                    op,
                    duration_ms,
                    slow = true,
                    "Slow query"
                );
            } else {
                debug!(
                    subsystem = "db",
                    component,
                    op,
                    duration_ms,
                    "Query completed"
                );
            }
            Ok(value)
        }
        Ok(Err(e)) => {
            warn!(
                subsystem = "db",
                component,
                op,
                duration_ms,
                error = %e,
                "Query failed"
            );
            Err(Error::query(op)(e))
        }
        Err(_) => {
            let timeout_ms = deadline.budget_ms();
            warn!(
                subsystem = "db",
                component,
                op,
                timeout_ms,
                "Query exceeded timeout"
            );
            Err(Error::Timeout { op, timeout_ms })
        }
    }
}

/// Log an input rejected before any query was issued.
pub(crate) fn rejected(component: &'static str, op: &'static str, err: &Error) {
    warn!(
        subsystem = "db",
        component,
        op,
        error = %err,
        "Rejected invalid input"
    );
}
