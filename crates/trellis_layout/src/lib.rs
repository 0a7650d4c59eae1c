//! Trellis Layout Engine
//!
//! A two-axis constraint layout solver. Every layout node is a pair of
//! interval nodes, one in a width tree and one in a height tree, solved
//! independently and combined into a [`Rect`] only when read.
//!
//! - **Requests**: [`ExtentRequest`] asks for an exact or minimum extent,
//!   absolute or as a fraction of the parent
//! - **Policies**: closed sets of sizing ([`DimensionPolicy`]), placement
//!   ([`PositionPolicy`]) and bottom-up inference ([`DeducePolicy`]) rules
//! - **Recipes**: prebuilt rows, columns, scrollers, padding and spacers
//!
//! # Example
//!
//! ```rust
//! use trellis_layout::prelude::*;
//!
//! let mut layout = scaffold(300, 100);
//! let bar = layout.add_child(row(ExtentRequest::AUTO, ExtentRequest::AUTO));
//! let icon = layout.attach(bar, childless(ExtentRequest::exactly(24), ExtentRequest::AUTO));
//! let label = layout.attach(bar, childless(ExtentRequest::AUTO, ExtentRequest::AUTO));
//!
//! layout.solve(0, 0).unwrap();
//!
//! assert_eq!(layout.rect(icon).unwrap(), Rect::new(0, 0, 24, 100));
//! assert_eq!(layout.rect(label).unwrap(), Rect::new(24, 0, 276, 100));
//! ```

pub mod builder;
pub mod distrib;
pub mod interval;
pub mod recipes;

pub use builder::{LayoutBuilder, LayoutNodeId, Rect};
pub use distrib::distribute_middle;
pub use interval::{
    Amount, Axis, DeducePolicy, DimensionPolicy, ExtentNotification, ExtentNotifier,
    ExtentRequest, Interval, IntervalId, IntervalNode, IntervalPolicies, IntervalTree,
    PositionPolicy, RequestKind,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{LayoutBuilder, LayoutNodeId, Rect};
    pub use crate::interval::{
        DeducePolicy, DimensionPolicy, ExtentRequest, IntervalPolicies, PositionPolicy,
    };
    pub use crate::recipes::{
        align_left, align_right, childless, column, fixed_box, hspace, padding, row, scaffold,
        vertical_scroll,
    };
}
