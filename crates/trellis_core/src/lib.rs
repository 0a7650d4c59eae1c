//! Trellis Core Runtime
//!
//! This crate provides the foundational primitives shared by the trellis
//! layout solver and widget tree:
//!
//! - **Keys**: Process-unique identifiers for widgets and their layout nodes
//! - **State Types**: Typed per-widget state with a fixed set of built-ins
//! - **State Store**: Deferred mutation, observers and fixed-point flushing
//! - **Errors**: One error type for every wiring failure
//!
//! # Example
//!
//! ```rust
//! use trellis_core::prelude::*;
//!
//! struct Host {
//!     store: StateStore<Host>,
//! }
//!
//! impl StoreHost for Host {
//!     fn store(&self) -> &StateStore<Self> {
//!         &self.store
//!     }
//!     fn store_mut(&mut self) -> &mut StateStore<Self> {
//!         &mut self.store
//!     }
//! }
//!
//! let mut host = Host { store: StateStore::new() };
//! let button = Key::new();
//!
//! host.store.create_state(button, WidgetState::default(), false);
//! host.store
//!     .set_state::<WidgetState, _>(button, |s| s.is_hovered = true);
//!
//! // Nothing changes until the store is flushed
//! assert!(!host.store.get_state::<WidgetState>(button).unwrap().is_hovered);
//! host.flush().unwrap();
//! assert!(host.store.get_state::<WidgetState>(button).unwrap().is_hovered);
//! ```

pub mod error;
pub mod key;
pub mod state;
pub mod store;

pub use error::{Result, TrellisError};
pub use key::Key;
pub use state::{OnBuildLayout, StateType, TextState, Transform, VisibleChildren, WidgetState};
pub use store::{
    flush, FlushStats, Observed, ObserverCallback, StateStore, StoreConfig, StoreHost, StoreStats,
    Task,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, TrellisError};
    pub use crate::key::Key;
    pub use crate::state::{
        OnBuildLayout, StateType, TextState, Transform, VisibleChildren, WidgetState,
    };
    pub use crate::store::{Observed, StateStore, StoreConfig, StoreHost};
}
