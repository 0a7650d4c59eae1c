//! Two-axis layout composition
//!
//! A [`LayoutBuilder`] pairs a width tree with a height tree of the same
//! shape. The axes are solved independently and only meet when a node's
//! [`Rect`] is read.

use smallvec::SmallVec;
use trellis_core::{Key, Result, TrellisError};

use crate::interval::{
    Axis, ExtentNotification, ExtentNotifier, ExtentRequest, Interval, IntervalId,
    IntervalPolicies, IntervalTree,
};

/// Pixel rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Combine one interval per axis
    pub const fn from_intervals(width: Interval, height: Interval) -> Self {
        Self {
            x: width.position,
            y: height.position,
            w: width.extent,
            h: height.extent,
        }
    }

    /// Same size, moved by `(dx, dy)`
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w,
            h: self.h,
        }
    }

    /// Whether `(x, y)` lies inside. The right and bottom edges are
    /// exclusive.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// A node of a [`LayoutBuilder`]: one id per axis tree
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutNodeId {
    pub width: IntervalId,
    pub height: IntervalId,
}

/// Width and height interval trees with identical shape and keys
#[derive(Clone, Debug)]
pub struct LayoutBuilder {
    width: IntervalTree,
    height: IntervalTree,
}

impl LayoutBuilder {
    pub fn new(width: IntervalTree, height: IntervalTree) -> Self {
        debug_assert_eq!(width.axis(), Axis::Width);
        debug_assert_eq!(height.axis(), Axis::Height);
        Self { width, height }
    }

    /// Build from one request and policy set per axis
    pub fn from_parts(
        width_request: ExtentRequest,
        width_policies: IntervalPolicies,
        height_request: ExtentRequest,
        height_policies: IntervalPolicies,
    ) -> Self {
        Self::new(
            IntervalTree::new(Axis::Width, width_request, width_policies),
            IntervalTree::new(Axis::Height, height_request, height_policies),
        )
    }

    pub fn root(&self) -> LayoutNodeId {
        LayoutNodeId {
            width: self.width.root(),
            height: self.height.root(),
        }
    }

    pub fn width_tree(&self) -> &IntervalTree {
        &self.width
    }

    pub fn height_tree(&self) -> &IntervalTree {
        &self.height
    }

    pub fn width_tree_mut(&mut self) -> &mut IntervalTree {
        &mut self.width
    }

    pub fn height_tree_mut(&mut self) -> &mut IntervalTree {
        &mut self.height
    }

    /// Number of nodes, counted on the width tree
    pub fn len(&self) -> usize {
        self.width.len()
    }

    pub fn is_empty(&self) -> bool {
        self.width.is_empty()
    }

    /// Stamp `key` onto the root of both trees
    pub fn set_key(&mut self, key: Key) {
        self.set_node_key(self.root(), key);
    }

    pub fn set_node_key(&mut self, node: LayoutNodeId, key: Key) {
        self.width.set_key(node.width, key);
        self.height.set_key(node.height, key);
    }

    /// Builder-style [`LayoutBuilder::set_key`]
    pub fn with_key(mut self, key: Key) -> Self {
        self.set_key(key);
        self
    }

    /// Record the root's resolved width in the width tree's notification log
    pub fn notify_width(mut self) -> Self {
        let root = self.width.root();
        self.width.set_notifier(root, ExtentNotifier::Record);
        self
    }

    /// Record the root's resolved height in the height tree's notification log
    pub fn notify_height(mut self) -> Self {
        let root = self.height.root();
        self.height.set_notifier(root, ExtentNotifier::Record);
        self
    }

    /// Key of the root, checked to agree across axes
    pub fn key(&self) -> Result<Option<Key>> {
        self.node_key(self.root())
    }

    pub fn node_key(&self, node: LayoutNodeId) -> Result<Option<Key>> {
        let width = self.width.key(node.width);
        let height = self.height.key(node.height);
        if width != height {
            return Err(TrellisError::AxisMismatch { width, height });
        }
        Ok(width)
    }

    /// Move `child` under `parent` in both trees. Returns where its root
    /// landed.
    pub fn attach(&mut self, parent: LayoutNodeId, child: LayoutBuilder) -> LayoutNodeId {
        let LayoutBuilder { width, height } = child;
        LayoutNodeId {
            width: self.width.graft(parent.width, width),
            height: self.height.graft(parent.height, height),
        }
    }

    /// Append `child` under the root
    pub fn add_child(&mut self, child: LayoutBuilder) -> LayoutNodeId {
        self.attach(self.root(), child)
    }

    /// Children of `node`, pairing the two axes position by position
    pub fn children(&self, node: LayoutNodeId) -> Result<SmallVec<[LayoutNodeId; 4]>> {
        let widths = self.width.children(node.width);
        let heights = self.height.children(node.height);
        if widths.len() != heights.len() {
            return Err(TrellisError::AxisMismatch {
                width: self.width.key(node.width),
                height: self.height.key(node.height),
            });
        }
        Ok(widths
            .iter()
            .zip(heights)
            .map(|(&width, &height)| LayoutNodeId { width, height })
            .collect())
    }

    /// Walk both trees and fail on the first node whose key or child count
    /// differs between the axes
    pub fn check_axes(&self) -> Result<()> {
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            self.node_key(node)?;
            stack.extend(self.children(node)?);
        }
        Ok(())
    }

    // =========================================================================
    // SOLVING
    // =========================================================================

    /// Resolve the extent of every node on both axes
    pub fn dimension_children(&mut self) -> Result<()> {
        let (width_root, height_root) = (self.width.root(), self.height.root());
        self.width.dimension_children(width_root)?;
        self.height.dimension_children(height_root)?;
        Ok(())
    }

    /// Place the root at `(x, y)` and resolve every position below it
    pub fn position_children(&mut self, x: i32, y: i32) -> Result<()> {
        let (width_root, height_root) = (self.width.root(), self.height.root());
        self.width.set_position(width_root, x);
        self.width.position_children(width_root)?;
        self.height.set_position(height_root, y);
        self.height.position_children(height_root)?;
        Ok(())
    }

    /// Dimension, then position at `(x, y)`
    pub fn solve(&mut self, x: i32, y: i32) -> Result<()> {
        self.dimension_children()?;
        self.position_children(x, y)
    }

    /// Resolved rectangle of `node`
    pub fn rect(&self, node: LayoutNodeId) -> Result<Rect> {
        Ok(Rect::from_intervals(
            self.width.interval(node.width)?,
            self.height.interval(node.height)?,
        ))
    }

    pub fn root_rect(&self) -> Result<Rect> {
        self.rect(self.root())
    }

    /// Drain both axes' notification logs: `(width, height)`
    pub fn take_notifications(&mut self) -> (Vec<ExtentNotification>, Vec<ExtentNotification>) {
        (
            self.width.take_notifications(),
            self.height.take_notifications(),
        )
    }

    pub fn debug_dump(&self) -> String {
        format!(
            "widths:\n{}heights:\n{}",
            self.width.debug_dump(),
            self.height.debug_dump()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{DeducePolicy, DimensionPolicy, PositionPolicy};

    fn leaf(w: ExtentRequest, h: ExtentRequest) -> LayoutBuilder {
        LayoutBuilder::from_parts(w, IntervalPolicies::default(), h, IntervalPolicies::default())
    }

    fn row(w: ExtentRequest, h: ExtentRequest) -> LayoutBuilder {
        LayoutBuilder::from_parts(
            w,
            IntervalPolicies::new(
                DimensionPolicy::Evenly,
                PositionPolicy::SequentiallyFromOffset(0),
                DeducePolicy::SumChildren,
            ),
            h,
            IntervalPolicies::new(
                DimensionPolicy::CopyParent,
                PositionPolicy::CopyParent,
                DeducePolicy::MaxChild,
            ),
        )
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = Rect::new(10, 10, 5, 5);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(14, 14));
        assert!(!rect.contains(15, 10));
        assert!(!rect.contains(10, 15));
        assert!(!rect.contains(9, 12));
    }

    #[test]
    fn test_rect_translated() {
        let rect = Rect::new(1, 2, 3, 4).translated(10, -2);
        assert_eq!(rect, Rect::new(11, 0, 3, 4));
    }

    #[test]
    fn test_row_layout() {
        let mut layout = row(ExtentRequest::exactly(100), ExtentRequest::exactly(20));
        let a = layout.add_child(leaf(ExtentRequest::exactly(30), ExtentRequest::AUTO));
        let b = layout.add_child(leaf(ExtentRequest::AUTO, ExtentRequest::AUTO));

        layout.solve(5, 7).unwrap();

        assert_eq!(layout.root_rect().unwrap(), Rect::new(5, 7, 100, 20));
        assert_eq!(layout.rect(a).unwrap(), Rect::new(5, 7, 30, 20));
        assert_eq!(layout.rect(b).unwrap(), Rect::new(35, 7, 70, 20));
    }

    #[test]
    fn test_attach_builds_top_down() {
        let mut layout = row(ExtentRequest::exactly(60), ExtentRequest::exactly(10));
        let root = layout.root();
        let inner = layout.attach(root, row(ExtentRequest::AUTO, ExtentRequest::AUTO));
        let leaves: Vec<_> = (0..2)
            .map(|_| layout.attach(inner, leaf(ExtentRequest::AUTO, ExtentRequest::AUTO)))
            .collect();

        layout.solve(0, 0).unwrap();

        assert_eq!(layout.len(), 4);
        assert_eq!(layout.rect(inner).unwrap(), Rect::new(0, 0, 60, 10));
        assert_eq!(layout.rect(leaves[0]).unwrap(), Rect::new(0, 0, 30, 10));
        assert_eq!(layout.rect(leaves[1]).unwrap(), Rect::new(30, 0, 30, 10));
    }

    #[test]
    fn test_children_pairs_axes() {
        let mut layout = row(ExtentRequest::exactly(10), ExtentRequest::exactly(10));
        let child = layout.add_child(leaf(ExtentRequest::AUTO, ExtentRequest::AUTO));
        assert_eq!(layout.children(layout.root()).unwrap().as_slice(), &[child]);
    }

    #[test]
    fn test_keys_agree() {
        let key = Key::new();
        let layout = row(ExtentRequest::AUTO, ExtentRequest::AUTO).with_key(key);
        assert_eq!(layout.key(), Ok(Some(key)));
        assert!(layout.check_axes().is_ok());
    }

    #[test]
    fn test_axis_mismatch_is_detected() {
        let mut layout = row(ExtentRequest::AUTO, ExtentRequest::AUTO);
        let root = layout.root();
        let key = Key::new();
        layout.width_tree_mut().set_key(root.width, key);

        assert_eq!(
            layout.key(),
            Err(TrellisError::AxisMismatch {
                width: Some(key),
                height: None
            })
        );

        let mut uneven = row(ExtentRequest::AUTO, ExtentRequest::AUTO);
        let width_root = uneven.width_tree().root();
        uneven
            .width_tree_mut()
            .push_child(width_root, ExtentRequest::AUTO, IntervalPolicies::default());
        assert!(matches!(
            uneven.check_axes(),
            Err(TrellisError::AxisMismatch { .. })
        ));
    }

    #[test]
    fn test_rect_before_solving_fails() {
        let layout = leaf(ExtentRequest::exactly(1), ExtentRequest::exactly(1));
        assert!(matches!(
            layout.root_rect(),
            Err(TrellisError::UnresolvedLayout { .. })
        ));
    }

    #[test]
    fn test_width_notification() {
        let key = Key::new();
        let mut layout = row(ExtentRequest::exactly(80), ExtentRequest::exactly(40));
        layout.add_child(
            leaf(ExtentRequest::AUTO, ExtentRequest::exactly(12))
                .with_key(key)
                .notify_width(),
        );

        layout.solve(0, 0).unwrap();
        let (widths, heights) = layout.take_notifications();
        assert_eq!(widths, vec![ExtentNotification { key, extent: 80 }]);
        assert!(heights.is_empty());
    }

    #[test]
    fn test_debug_dump_lists_both_axes() {
        let mut layout = leaf(ExtentRequest::exactly(3), ExtentRequest::exactly(4));
        layout.dimension_children().unwrap();
        let dump = layout.debug_dump();
        assert!(dump.starts_with("widths:\n[-] extent 3 position -\n"));
        assert!(dump.contains("heights:\n[-] extent 4 position -\n"));
    }
}
