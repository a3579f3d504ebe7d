//! # Scoped logger handle.
//!
//! [`Logger`] is what every worker receives in [`Worker::init`](crate::Worker::init).
//! It is a thin pairing of a [`tracing::Span`] with a dotted name path, so a
//! worker's events land under its own span and carry its position in the
//! supervision tree:
//!
//! ```text
//! Logger::new(root_span)            name = None
//!   └─ .named("ingest")             name = "ingest"         span worker{name="ingest"}
//!        └─ .named("reader")        name = "ingest.reader"  span worker{name="ingest.reader"}
//! ```
//!
//! The handle is always supplied by the caller; the crate never installs or
//! reaches for a global subscriber.

use std::sync::Arc;

use tracing::Span;

/// Structured-logging sink handed to workers.
///
/// Cheap to clone. Emit events with `tracing` macros using the span as parent:
/// ```
/// use workvisor::Logger;
///
/// let logger = Logger::new(tracing::info_span!("service")).named("cache");
/// tracing::info!(parent: logger.span(), "cache warmed");
/// assert_eq!(logger.name(), Some("cache"));
/// ```
#[derive(Clone, Debug)]
pub struct Logger {
    name: Option<Arc<str>>,
    span: Span,
}

impl Logger {
    /// Wraps an existing span as an unnamed root handle.
    pub fn new(span: Span) -> Self {
        Self { name: None, span }
    }

    /// A handle attached to no span. Events still reach the active subscriber.
    pub fn detached() -> Self {
        Self::new(Span::none())
    }

    /// Derives a child handle scoped to `name`.
    pub fn named(&self, name: &str) -> Self {
        let full: Arc<str> = match &self.name {
            Some(parent) => format!("{parent}.{name}").into(),
            None => name.into(),
        };
        let span = tracing::info_span!(parent: &self.span, "worker", name = %full);
        Self {
            name: Some(full),
            span,
        }
    }

    /// Dotted name path, `None` for a root handle.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The span events should be parented to.
    pub fn span(&self) -> &Span {
        &self.span
    }
}
