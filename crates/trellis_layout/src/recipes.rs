//! Ready-made layouts for common containers
//!
//! Each recipe pairs one policy set per axis. A "main axis" packs children
//! back to back and shares leftover space among flexible ones; a "cross
//! axis" gives every child the full extent and deduces the largest child.
//!
//! ```rust
//! use trellis_layout::prelude::*;
//!
//! let mut root = scaffold(200, 100);
//! let bar = root.add_child(row(ExtentRequest::AUTO, ExtentRequest::AUTO));
//! root.solve(0, 0).unwrap();
//!
//! assert_eq!(root.rect(bar).unwrap(), Rect::new(0, 0, 200, 100));
//! ```

use crate::builder::LayoutBuilder;
use crate::interval::{
    DeducePolicy, DimensionPolicy, ExtentRequest, IntervalPolicies, PositionPolicy,
};

fn single_child() -> IntervalPolicies {
    IntervalPolicies::new(
        DimensionPolicy::CopyParent,
        PositionPolicy::CopyParent,
        DeducePolicy::SumChildren,
    )
}

fn main_axis() -> IntervalPolicies {
    IntervalPolicies::new(
        DimensionPolicy::Evenly,
        PositionPolicy::SequentiallyFromOffset(0),
        DeducePolicy::SumChildren,
    )
}

fn cross_axis() -> IntervalPolicies {
    IntervalPolicies::new(
        DimensionPolicy::CopyParent,
        PositionPolicy::CopyParent,
        DeducePolicy::MaxChild,
    )
}

/// Content in its own coordinate space, packed from zero. Children size
/// themselves.
fn scroll_axis() -> IntervalPolicies {
    IntervalPolicies {
        position: Some(PositionPolicy::SequentiallyFromAbsolute(0)),
        deduce: Some(DeducePolicy::SumChildren),
        ..Default::default()
    }
}

fn inset(before: i32, after: i32) -> IntervalPolicies {
    IntervalPolicies::new(
        DimensionPolicy::Inset { before, after },
        PositionPolicy::SequentiallyFromOffset(before),
        DeducePolicy::SumChildren.with_inset(before, after),
    )
}

/// Exactly-sized root whose children fill it
pub fn scaffold(width: i32, height: i32) -> LayoutBuilder {
    fixed_box(ExtentRequest::exactly(width), ExtentRequest::exactly(height))
}

/// Box whose children fill it, or which wraps its children when it has no
/// exact size
pub fn fixed_box(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    LayoutBuilder::from_parts(width, single_child(), height, single_child())
}

/// Children side by side
pub fn row(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    LayoutBuilder::from_parts(width, main_axis(), height, cross_axis())
}

/// Children stacked top to bottom
pub fn column(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    LayoutBuilder::from_parts(width, cross_axis(), height, main_axis())
}

/// Column whose children are laid out from y = 0 regardless of where the
/// view itself sits. The view's own height is independent of its content.
pub fn vertical_scroll(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    LayoutBuilder::from_parts(width, cross_axis(), height, scroll_axis())
}

/// Flexible filler that soaks up leftover space in a row or column
pub fn hspace() -> LayoutBuilder {
    childless(ExtentRequest::AUTO, ExtentRequest::AUTO)
}

/// Row packing its children against its left edge. Flexible children
/// still share any leftover width.
pub fn align_left(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    row(width, height)
}

/// Row packing its children against its right edge. Flexible children
/// still share any leftover width.
pub fn align_right(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    let width_axis = IntervalPolicies {
        position: Some(PositionPolicy::SequentiallyToEnd(0)),
        ..main_axis()
    };
    LayoutBuilder::from_parts(width, width_axis, height, cross_axis())
}

/// Box that insets its children by fixed margins on both axes
pub fn padding(
    width: ExtentRequest,
    height: ExtentRequest,
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
) -> LayoutBuilder {
    LayoutBuilder::from_parts(width, inset(left, right), height, inset(top, bottom))
}

/// Leaf with no policies: it must be sized by its parent or ask exactly
pub fn childless(width: ExtentRequest, height: ExtentRequest) -> LayoutBuilder {
    LayoutBuilder::from_parts(
        width,
        IntervalPolicies::default(),
        height,
        IntervalPolicies::default(),
    )
}
