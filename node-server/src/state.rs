//! Shared application state.

use std::sync::Arc;

use chain::NodeScheduler;

/// Shared state held by the HTTP handlers and the background timers.
///
/// Wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor.
pub type SharedState = Arc<NodeScheduler>;
