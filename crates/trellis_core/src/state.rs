//! Widget state types
//!
//! Any type stored in the [`StateStore`](crate::store::StateStore) implements
//! [`StateType`]. The store keeps one table per type, so a widget may hold at
//! most one value of each type.
//!
//! The built-in types below are registered with every store in a fixed order:
//! [`WidgetState`], [`TextState`], [`Transform`], [`VisibleChildren`],
//! [`OnBuildLayout`]. Applications may register their own types after these.

use crate::key::Key;

/// A value that can live in the state store.
///
/// `NAME` appears in diagnostics such as
/// [`TrellisError::MissingState`](crate::error::TrellisError::MissingState).
pub trait StateType: Clone + 'static {
    const NAME: &'static str;
}

/// Interaction and visibility flags shared by most widgets.
///
/// Hit-testing skips widgets that never created a `WidgetState`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetState {
    /// The widget is the innermost hit under the pointer
    pub is_hovered: bool,
    /// The widget takes part in layout
    pub is_visible: bool,
    /// The widget is somewhere in the current hit list
    pub is_in_hit_tree: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            is_hovered: false,
            is_visible: true,
            is_in_hit_tree: false,
        }
    }
}

impl StateType for WidgetState {
    const NAME: &'static str = "WidgetState";
}

/// Resolved width handed to text widgets so their height can follow it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextState {
    pub width: i32,
}

impl StateType for TextState {
    const NAME: &'static str = "TextState";
}

/// Offset of a widget's content from its own origin.
///
/// Used by containers whose children live in a different coordinate space
/// (scrolling content).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transform {
    pub x: i32,
    pub y: i32,
}

impl StateType for Transform {
    const NAME: &'static str = "Transform";
}

/// Children of a clipping container that currently intersect its viewport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleChildren {
    pub children: Vec<Key>,
}

impl StateType for VisibleChildren {
    const NAME: &'static str = "VisibleChildren";
}

/// Carries no data: mutating it signals that a fresh layout was built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OnBuildLayout;

impl StateType for OnBuildLayout {
    const NAME: &'static str = "OnBuildLayout";
}
