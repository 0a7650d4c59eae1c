//! One-axis interval solver
//!
//! An [`IntervalTree`] resolves one axis (width or height) of a layout. Each
//! node asks for an extent with an [`ExtentRequest`], then two passes run
//! top-down:
//!
//! 1. [`IntervalTree::dimension_children`] gives every node an extent. A
//!    node partitions only its immediate children, through its
//!    [`DimensionPolicy`]. Nodes left without an extent deduce one from
//!    their own subtree through their [`DeducePolicy`].
//! 2. [`IntervalTree::position_children`] gives every node a position
//!    through its parent's [`PositionPolicy`].
//!
//! Nodes live in a slotmap arena and are addressed by [`IntervalId`], so a
//! full rebuild allocates one arena per axis instead of one box per node.

use std::fmt::Write as _;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use trellis_core::{Key, Result, TrellisError};

use crate::distrib::distribute_middle;

new_key_type! {
    /// Node handle within one [`IntervalTree`]
    pub struct IntervalId;
}

/// Which axis a tree resolves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }
}

/// Whether a request is a fixed size or a minimum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    Exactly,
    /// Flexible: the node accepts more than it asks for
    AtLeast,
}

/// Requested amount, absolute or relative to the parent's extent
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Amount {
    Absolute(i32),
    Fraction(f32),
}

/// How much space a node asks its parent for
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtentRequest {
    pub kind: RequestKind,
    pub amount: Amount,
}

impl ExtentRequest {
    /// Flexible request for at least one pixel
    pub const AUTO: ExtentRequest = ExtentRequest::at_least(1);

    pub const fn exactly(extent: i32) -> Self {
        Self {
            kind: RequestKind::Exactly,
            amount: Amount::Absolute(extent),
        }
    }

    pub const fn exactly_fraction(fraction_of_parent: f32) -> Self {
        Self {
            kind: RequestKind::Exactly,
            amount: Amount::Fraction(fraction_of_parent),
        }
    }

    pub const fn at_least(extent: i32) -> Self {
        Self {
            kind: RequestKind::AtLeast,
            amount: Amount::Absolute(extent),
        }
    }

    pub const fn at_least_fraction(fraction_of_parent: f32) -> Self {
        Self {
            kind: RequestKind::AtLeast,
            amount: Amount::Fraction(fraction_of_parent),
        }
    }

    pub fn is_flexible(&self) -> bool {
        self.kind == RequestKind::AtLeast
    }

    /// The absolute amount, if any fraction has already been converted
    pub fn absolute(&self) -> Option<i32> {
        match self.amount {
            Amount::Absolute(extent) => Some(extent),
            Amount::Fraction(_) => None,
        }
    }
}

/// How a node splits its extent among its immediate children
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DimensionPolicy {
    /// Every child gets the parent's extent
    CopyParent,
    /// Inflexible children get their request; the leftover is shared among
    /// flexible children, center-weighted
    Evenly,
    /// Every child gets the parent's extent minus both margins
    Inset { before: i32, after: i32 },
}

/// How a node places its immediate children
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionPolicy {
    /// Every child starts where the parent starts
    CopyParent,
    /// Back to back, from the parent's position plus an offset
    SequentiallyFromOffset(i32),
    /// Back to back, from a fixed origin independent of the parent. Used
    /// when children live in their own coordinate space, such as scrolled
    /// content.
    SequentiallyFromAbsolute(i32),
    /// Back to back, the last child ending the given distance before the
    /// parent's end
    SequentiallyToEnd(i32),
    /// Every child stacked at one fixed position
    AllAt(i32),
}

/// How a node without an exact request infers its own extent
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeducePolicy {
    SumChildren,
    /// Largest child, or zero without children
    MaxChild,
    WithInset {
        inner: Box<DeducePolicy>,
        before: i32,
        after: i32,
    },
}

impl DeducePolicy {
    pub fn with_inset(self, before: i32, after: i32) -> Self {
        DeducePolicy::WithInset {
            inner: Box::new(self),
            before,
            after,
        }
    }
}

/// Side effect of resolving a node's extent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtentNotifier {
    /// Append `(key, extent)` to the tree's notification log
    Record,
}

/// Policies attached to one node. All optional: a leaf needs none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntervalPolicies {
    pub dimension: Option<DimensionPolicy>,
    pub position: Option<PositionPolicy>,
    pub deduce: Option<DeducePolicy>,
    pub notifier: Option<ExtentNotifier>,
}

impl IntervalPolicies {
    pub fn new(dimension: DimensionPolicy, position: PositionPolicy, deduce: DeducePolicy) -> Self {
        Self {
            dimension: Some(dimension),
            position: Some(position),
            deduce: Some(deduce),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: ExtentNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

/// Resolved position and extent of one node along one axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interval {
    pub position: i32,
    pub extent: i32,
}

/// An extent recorded by a node carrying [`ExtentNotifier::Record`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtentNotification {
    pub key: Key,
    pub extent: i32,
}

/// One node of an axis tree
#[derive(Clone, Debug)]
pub struct IntervalNode {
    key: Option<Key>,
    request: ExtentRequest,
    extent: Option<i32>,
    position: Option<i32>,
    policies: IntervalPolicies,
    parent: Option<IntervalId>,
    children: SmallVec<[IntervalId; 4]>,
}

impl IntervalNode {
    fn new(request: ExtentRequest, policies: IntervalPolicies) -> Self {
        Self {
            key: None,
            request,
            extent: None,
            position: None,
            policies,
            parent: None,
            children: SmallVec::new(),
        }
    }

    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn request(&self) -> ExtentRequest {
        self.request
    }

    pub fn policies(&self) -> &IntervalPolicies {
        &self.policies
    }

    pub fn parent(&self) -> Option<IntervalId> {
        self.parent
    }

    pub fn children(&self) -> &[IntervalId] {
        &self.children
    }
}

/// Arena-backed interval tree for one axis
#[derive(Clone, Debug)]
pub struct IntervalTree {
    axis: Axis,
    nodes: SlotMap<IntervalId, IntervalNode>,
    root: IntervalId,
    notifications: Vec<ExtentNotification>,
}

impl IntervalTree {
    /// Create a tree holding a single root node
    pub fn new(axis: Axis, request: ExtentRequest, policies: IntervalPolicies) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(IntervalNode::new(request, policies));
        Self {
            axis,
            nodes,
            root,
            notifications: Vec::new(),
        }
    }

    /// Create a root with no policies
    pub fn leaf(axis: Axis, request: ExtentRequest) -> Self {
        Self::new(axis, request, IntervalPolicies::default())
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn root(&self) -> IntervalId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: IntervalId) -> Option<&IntervalNode> {
        self.nodes.get(id)
    }

    /// Children of `id`, in order. Panics if `id` is not in this tree.
    pub fn children(&self, id: IntervalId) -> &[IntervalId] {
        &self.nodes[id].children
    }

    pub fn key(&self, id: IntervalId) -> Option<Key> {
        self.nodes[id].key
    }

    pub fn set_key(&mut self, id: IntervalId, key: Key) {
        self.nodes[id].key = Some(key);
    }

    /// Attach the extent notifier to an existing node
    pub fn set_notifier(&mut self, id: IntervalId, notifier: ExtentNotifier) {
        self.nodes[id].policies.notifier = Some(notifier);
    }

    /// Append a fresh node under `parent`
    pub fn push_child(
        &mut self,
        parent: IntervalId,
        request: ExtentRequest,
        policies: IntervalPolicies,
    ) -> IntervalId {
        let mut node = IntervalNode::new(request, policies);
        node.parent = Some(parent);
        let id = self.nodes.insert(node);
        self.nodes[parent].children.push(id);
        id
    }

    /// Move every node of `other` under `parent`, keeping `other`'s shape.
    ///
    /// Returns the id the old root of `other` now has in this tree. Pending
    /// notifications of `other` are carried over.
    pub fn graft(&mut self, parent: IntervalId, other: IntervalTree) -> IntervalId {
        let IntervalTree {
            mut nodes,
            root,
            notifications,
            ..
        } = other;
        self.notifications.extend(notifications);

        // (node in `other`, its new parent here)
        let mut stack: Vec<(IntervalId, IntervalId)> = vec![(root, parent)];
        let mut grafted_root = None;
        while let Some((old_id, new_parent)) = stack.pop() {
            let Some(mut node) = nodes.remove(old_id) else {
                continue;
            };
            let old_children = std::mem::take(&mut node.children);
            node.parent = Some(new_parent);
            let new_id = self.nodes.insert(node);
            self.nodes[new_parent].children.push(new_id);
            if grafted_root.is_none() {
                grafted_root = Some(new_id);
            }

            // Reversed so the stack pops children in order
            for child in old_children.into_iter().rev() {
                stack.push((child, new_id));
            }
        }

        grafted_root.unwrap_or(parent)
    }

    // =========================================================================
    // REQUESTS
    // =========================================================================

    pub fn is_flexible(&self, id: IntervalId) -> bool {
        self.nodes[id].request.is_flexible()
    }

    pub fn request(&self, id: IntervalId) -> ExtentRequest {
        self.nodes[id].request
    }

    /// Convert a fractional request against the parent's resolved extent.
    ///
    /// Truncates toward zero. Does nothing once the request is absolute.
    pub fn calc_request(&mut self, id: IntervalId, parent_extent: i32) {
        let request = &mut self.nodes[id].request;
        if let Amount::Fraction(fraction) = request.amount {
            request.amount = Amount::Absolute((parent_extent as f32 * fraction) as i32);
        }
    }

    fn requested_extent(&self, id: IntervalId) -> Result<i32> {
        self.nodes[id]
            .request
            .absolute()
            .ok_or_else(|| self.unresolved(id, "request"))
    }

    /// Infer the extent `id` needs, without assigning it.
    ///
    /// An exact absolute request answers directly. Otherwise the node's
    /// deduction policy runs over its subtree; on success the request is
    /// frozen to that exact amount. Returns `None` if nothing can be
    /// deduced.
    pub fn deduce_extent(&mut self, id: IntervalId) -> Option<i32> {
        let node = &self.nodes[id];
        if let ExtentRequest {
            kind: RequestKind::Exactly,
            amount: Amount::Absolute(extent),
        } = node.request
        {
            return Some(extent);
        }

        let policy = node.policies.deduce.clone()?;
        let extent = self.deduce_with(id, &policy)?;
        if extent < 0 {
            return None;
        }

        tracing::trace!(axis = self.axis.name(), key = ?self.nodes[id].key, extent, "deduced extent");
        self.nodes[id].request = ExtentRequest::exactly(extent);
        Some(extent)
    }

    fn deduce_with(&mut self, id: IntervalId, policy: &DeducePolicy) -> Option<i32> {
        let children = self.nodes[id].children.clone();
        match policy {
            DeducePolicy::SumChildren => {
                let mut total = 0i32;
                for child in children {
                    total = total.saturating_add(self.deduce_extent(child)?);
                }
                Some(total)
            }
            DeducePolicy::MaxChild => {
                let mut max = 0;
                for child in children {
                    max = max.max(self.deduce_extent(child)?);
                }
                Some(max)
            }
            DeducePolicy::WithInset {
                inner,
                before,
                after,
            } => self
                .deduce_with(id, inner)
                .map(|extent| extent.saturating_add(*before).saturating_add(*after)),
        }
    }

    // =========================================================================
    // RESOLVED VALUES
    // =========================================================================

    /// Resolved extent of `id`
    pub fn extent(&self, id: IntervalId) -> Result<i32> {
        self.nodes[id]
            .extent
            .ok_or_else(|| self.unresolved(id, "extent"))
    }

    /// Resolved position of `id`
    pub fn position(&self, id: IntervalId) -> Result<i32> {
        self.nodes[id]
            .position
            .ok_or_else(|| self.unresolved(id, "position"))
    }

    pub fn interval(&self, id: IntervalId) -> Result<Interval> {
        Ok(Interval {
            position: self.position(id)?,
            extent: self.extent(id)?,
        })
    }

    /// Assign the extent of `id`. Overwriting a resolved extent is allowed
    /// but logged.
    pub fn set_extent(&mut self, id: IntervalId, extent: i32) {
        let axis = self.axis.name();
        let node = &mut self.nodes[id];
        if let Some(previous) = node.extent {
            tracing::warn!(
                "{} extent of node {:?} overridden: was {}, now {}",
                axis,
                node.key,
                previous,
                extent
            );
        }
        node.extent = Some(extent);

        if let Some(ExtentNotifier::Record) = node.policies.notifier {
            match node.key {
                Some(key) => self.notifications.push(ExtentNotification { key, extent }),
                None => tracing::debug!("{} extent notifier on a node without a key", axis),
            }
        }
    }

    /// Assign the position of `id`. Overwriting a resolved position is
    /// allowed but logged.
    pub fn set_position(&mut self, id: IntervalId, position: i32) {
        let axis = self.axis.name();
        let node = &mut self.nodes[id];
        if let Some(previous) = node.position {
            tracing::warn!(
                "{} position of node {:?} overridden: was {}, now {}",
                axis,
                node.key,
                previous,
                position
            );
        }
        node.position = Some(position);
    }

    /// Notifications recorded since the last call, oldest first
    pub fn take_notifications(&mut self) -> Vec<ExtentNotification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn notifications(&self) -> &[ExtentNotification] {
        &self.notifications
    }

    fn unresolved(&self, id: IntervalId, what: &'static str) -> TrellisError {
        TrellisError::UnresolvedLayout {
            key: self.nodes[id].key,
            axis: self.axis.name(),
            what,
        }
    }

    // =========================================================================
    // SOLVER PASSES
    // =========================================================================

    /// Give every node below `id` an extent.
    ///
    /// If `id` itself has no extent yet it is deduced, and failing that the
    /// pass aborts with [`TrellisError::CouldNotDeduceExtent`].
    pub fn dimension_children(&mut self, id: IntervalId) -> Result<()> {
        let extent = match self.nodes[id].extent {
            Some(extent) => extent,
            None => {
                let extent = self
                    .deduce_extent(id)
                    .ok_or(TrellisError::CouldNotDeduceExtent {
                        key: self.nodes[id].key,
                    })?;
                self.set_extent(id, extent);
                extent
            }
        };

        let children = self.nodes[id].children.clone();
        if children.is_empty() {
            return Ok(());
        }

        for &child in &children {
            self.calc_request(child, extent);
        }

        if let Some(policy) = self.nodes[id].policies.dimension {
            self.apply_dimension(id, policy, extent, &children)?;
        }

        for child in children {
            self.dimension_children(child)?;
        }
        Ok(())
    }

    fn apply_dimension(
        &mut self,
        id: IntervalId,
        policy: DimensionPolicy,
        extent: i32,
        children: &[IntervalId],
    ) -> Result<()> {
        match policy {
            DimensionPolicy::CopyParent => {
                for &child in children {
                    let requested = self.requested_extent(child)?;
                    if !self.is_flexible(child) && requested > 0 && requested != extent {
                        tracing::warn!(
                            "inflexible {} of node {:?} overridden by parent: wants {}, gets {}",
                            self.axis.name(),
                            self.nodes[child].key,
                            requested,
                            extent
                        );
                    }
                    self.set_extent(child, extent);
                }
            }
            DimensionPolicy::Evenly => {
                let mut requested: SmallVec<[i32; 8]> = SmallVec::with_capacity(children.len());
                for &child in children {
                    requested.push(self.requested_extent(child)?);
                }
                let flexible = children.iter().filter(|&&c| self.is_flexible(c)).count();
                let total = requested.iter().fold(0i32, |sum, &r| sum.saturating_add(r));
                let leftover = extent.saturating_sub(total);

                let shares = if leftover > 0 && flexible > 0 {
                    distribute_middle(flexible, leftover as u32)
                } else {
                    if leftover < 0 {
                        tracing::debug!(
                            "children of node {:?} request {} more {} than available",
                            self.nodes[id].key,
                            -leftover,
                            self.axis.name()
                        );
                    }
                    Vec::new()
                };

                let mut shares = shares.into_iter();
                for (&child, requested) in children.iter().zip(requested) {
                    let extent = if self.is_flexible(child) {
                        requested + shares.next().unwrap_or(0) as i32
                    } else {
                        requested
                    };
                    self.set_extent(child, extent);
                }
            }
            DimensionPolicy::Inset { before, after } => {
                for &child in children {
                    self.set_extent(child, extent - before - after);
                }
            }
        }
        Ok(())
    }

    /// Give every node below `id` a position. `id` must already have one.
    pub fn position_children(&mut self, id: IntervalId) -> Result<()> {
        let position = self.nodes[id]
            .position
            .ok_or(TrellisError::NoPosition {
                key: self.nodes[id].key,
            })?;

        let children = self.nodes[id].children.clone();
        if let Some(policy) = self.nodes[id].policies.position {
            match policy {
                PositionPolicy::CopyParent => {
                    for &child in &children {
                        self.set_position(child, position);
                    }
                }
                PositionPolicy::SequentiallyFromOffset(offset) => {
                    self.position_sequentially(&children, position + offset)?;
                }
                PositionPolicy::SequentiallyFromAbsolute(start) => {
                    self.position_sequentially(&children, start)?;
                }
                PositionPolicy::SequentiallyToEnd(offset) => {
                    let mut content = 0i32;
                    for &child in &children {
                        content = content.saturating_add(self.extent(child)?);
                    }
                    let end = position.saturating_add(self.extent(id)?).saturating_sub(offset);
                    self.position_sequentially(&children, end.saturating_sub(content))?;
                }
                PositionPolicy::AllAt(at) => {
                    for &child in &children {
                        self.set_position(child, at);
                    }
                }
            }
        }

        for child in children {
            self.position_children(child)?;
        }
        Ok(())
    }

    fn position_sequentially(&mut self, children: &[IntervalId], start: i32) -> Result<()> {
        let mut cursor = start;
        for &child in children {
            self.set_position(child, cursor);
            cursor = cursor.saturating_add(self.extent(child)?);
        }
        Ok(())
    }

    /// Indented listing of the tree, one node per line
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            let key = node.key.map_or_else(|| "-".to_string(), |k| k.to_string());
            let extent = node.extent.map_or_else(|| "-".to_string(), |e| e.to_string());
            let position = node
                .position
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            let _ = writeln!(
                out,
                "{:indent$}[{}] extent {} position {}",
                "",
                key,
                extent,
                position,
                indent = depth * 2
            );
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }
}
