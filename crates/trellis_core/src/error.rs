//! Error types for trellis

use thiserror::Error;

use crate::key::Key;

/// Errors raised by the layout solver, the state store, and the widget tree.
///
/// Every variant is a wiring bug in the widget tree rather than a recoverable
/// runtime condition. They propagate to the host, which is expected to abort
/// the current run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrellisError {
    /// A widget was asked for a state type it never created
    #[error("widget {widget} does not have {state}")]
    MissingState { widget: Key, state: &'static str },

    /// A tag was observed before any widget registered it
    #[error("unknown tag: '{0}'")]
    UnknownTag(String),

    /// A key that names no widget
    #[error("unknown widget: {0}")]
    UnknownWidget(Key),

    /// An extent or position was read before the solver resolved it
    #[error("{axis} {what} of node {key:?} read before it was resolved")]
    UnresolvedLayout {
        key: Option<Key>,
        axis: &'static str,
        what: &'static str,
    },

    /// A node has no exact request and its deduction policy gave up
    #[error("could not deduce extent of node {key:?}")]
    CouldNotDeduceExtent { key: Option<Key> },

    /// Children were positioned before their parent had a position
    #[error("cannot position children of node {key:?}: it has no position itself")]
    NoPosition { key: Option<Key> },

    /// The width and height trees of one layout disagree in key or shape
    #[error("axis trees disagree: width node {width:?}, height node {height:?}")]
    AxisMismatch {
        width: Option<Key>,
        height: Option<Key>,
    },

    /// Observer notifications kept producing dirty widgets
    #[error("state flush did not converge after {rounds} rounds")]
    FlushDidNotConverge { rounds: usize },

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for trellis operations
pub type Result<T> = std::result::Result<T, TrellisError>;
