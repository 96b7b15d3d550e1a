//! Correlation id for one HTTP request.
//!
//! [`crate::middleware::Trace`] puts the id in task-local storage while the
//! handler runs, so [`crate::domain::Error`] constructors can stamp it onto
//! error payloads. Spawned tasks do not inherit it.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use uuid::Uuid;

tokio::task_local! {
    static CURRENT: TraceId;
}

/// UUID identifying a request in logs, response headers and error bodies.
///
/// ```
/// use rollcall::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id = TraceId::from_header(Some("8f14e45f-ceea-467a-9af0-2a5fc1b2c3d4"));
/// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Reuse a caller-supplied id when it is a UUID, otherwise mint one.
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_else(|| Self(Uuid::new_v4()))
    }

    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    pub async fn scope<F: Future>(id: TraceId, fut: F) -> F::Output {
        CURRENT.scope(id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
