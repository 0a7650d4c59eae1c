//! The widget database
//!
//! [`Ui`] owns the widget tree, the state store and the layout
//! invalidation flag. It is the host of its [`StateStore`], so every state
//! task and observer callback receives `&mut Ui` and may reach the widget
//! tree as well as other widgets' state.
//!
//! Topology is fixed once [`Ui::init_widget_tree`] has run. Layouts are
//! not: every [`Ui::rebuild_layout_tree`] builds a new layout from each
//! widget's `build_layout` callback, solves it, and commits the resulting
//! rectangles back onto the widgets.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use trellis_core::{
    FlushStats, Key, Observed, Result, StateStore, StateType, StoreConfig, StoreHost, TextState,
    TrellisError, WidgetState,
};
use trellis_layout::{LayoutBuilder, LayoutNodeId, Rect};

use crate::render::Renderer;
use crate::widget::{Customisation, Widget, WidgetCallbacks};

/// Widget registry, state store and layout invalidation flag
pub struct Ui {
    widgets: FxHashMap<Key, Widget>,
    store: StateStore<Ui>,
    rebuild_layout: bool,
    hit_tree: Vec<Key>,
    initialized: bool,
}

impl StoreHost for Ui {
    fn store(&self) -> &StateStore<Self> {
        &self.store
    }

    fn store_mut(&mut self) -> &mut StateStore<Self> {
        &mut self.store
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    pub fn new() -> Self {
        Self::with_store_config(StoreConfig::default())
    }

    pub fn with_store_config(config: StoreConfig) -> Self {
        Self {
            widgets: FxHashMap::default(),
            store: StateStore::with_config(config),
            rebuild_layout: true,
            hit_tree: Vec::new(),
            initialized: false,
        }
    }

    // =========================================================================
    // TOPOLOGY
    // =========================================================================

    /// Register a widget. A non-empty `tag` makes it observable by name.
    pub fn create_widget(
        &mut self,
        tag: &str,
        callbacks: WidgetCallbacks,
        children: impl IntoIterator<Item = Key>,
    ) -> Key {
        let key = Key::new();
        let widget = Widget::new(tag, key, callbacks, children.into_iter().collect());
        self.widgets.insert(key, widget);
        self.store.register_tag(tag, key);
        key
    }

    /// Register a widget with some of its callbacks extended or replaced
    pub fn create_widget_customised(
        &mut self,
        tag: &str,
        callbacks: WidgetCallbacks,
        custom: Customisation,
        children: impl IntoIterator<Item = Key>,
    ) -> Key {
        self.create_widget(tag, callbacks.customised(custom), children)
    }

    /// Append `child` to `parent`'s children. Only meaningful before the
    /// tree is initialised: a child added later is never initialised.
    pub fn add_child_widget(&mut self, parent: Key, child: Key) -> Result<Key> {
        if !self.widgets.contains_key(&child) {
            return Err(TrellisError::UnknownWidget(child));
        }
        if self.initialized {
            tracing::warn!("widget {} added under {} after initialisation", child, parent);
        }
        self.widget_mut(parent)?.children.push(child);
        Ok(child)
    }

    pub fn widget(&self, key: Key) -> Result<&Widget> {
        self.widgets.get(&key).ok_or(TrellisError::UnknownWidget(key))
    }

    fn widget_mut(&mut self, key: Key) -> Result<&mut Widget> {
        self.widgets
            .get_mut(&key)
            .ok_or(TrellisError::UnknownWidget(key))
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Committed rectangle of `key`, or an empty rectangle if it has none
    pub fn widget_rect(&self, key: Key) -> Rect {
        self.widgets
            .get(&key)
            .and_then(|widget| widget.rect)
            .unwrap_or_default()
    }

    /// Ancestor `generation` levels above `key`'s parent. Generation 0 is
    /// the parent itself.
    pub fn parent_widget(&self, key: Key, generation: usize) -> Result<Option<Key>> {
        let mut current = self.widget(key)?.parent;
        for _ in 0..generation {
            match current {
                Some(parent) => current = self.widget(parent)?.parent,
                None => return Ok(None),
            }
        }
        Ok(current)
    }

    pub fn child_widgets(&self, key: Key) -> Result<&[Key]> {
        Ok(&self.widget(key)?.children)
    }

    /// Children of `key`'s parent, `key` included. Empty for the root.
    pub fn sibling_widgets(&self, key: Key) -> Result<&[Key]> {
        match self.widget(key)?.parent {
            Some(parent) => self.child_widgets(parent),
            None => Ok(&[]),
        }
    }

    /// Whether `predicate` holds for `root` or any widget below it
    pub fn true_of_any<P>(&self, root: Key, predicate: P) -> Result<bool>
    where
        P: Fn(&Ui, Key) -> bool,
    {
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            if predicate(self, key) {
                return Ok(true);
            }
            stack.extend(self.widget(key)?.children.iter().rev());
        }
        Ok(false)
    }

    /// Link parents and run every init callback, depth first, parents
    /// before children
    pub fn init_widget_tree(&mut self, root: Key) -> Result<()> {
        self.init_subtree(root, None)?;
        self.initialized = true;
        tracing::debug!("initialised {} widgets", self.widgets.len());
        Ok(())
    }

    fn init_subtree(&mut self, key: Key, parent: Option<Key>) -> Result<()> {
        let widget = self.widget_mut(key)?;
        widget.parent = parent;
        let init = Rc::clone(&widget.callbacks.init);
        init(self, key)?;

        let children = self.widget(key)?.children.clone();
        for child in children {
            self.init_subtree(child, Some(key))?;
        }
        Ok(())
    }

    // =========================================================================
    // LAYOUT
    // =========================================================================

    /// Build a fresh layout for the subtree at `root`, keyed by widget
    pub fn build_layout_tree(&mut self, root: Key) -> Result<LayoutBuilder> {
        let mut layout = self.build_widget_layout(root)?;
        let children = self.widget(root)?.children.clone();
        let node = layout.root();
        for child in children {
            self.attach_subtree(&mut layout, node, child)?;
        }
        Ok(layout)
    }

    fn build_widget_layout(&mut self, key: Key) -> Result<LayoutBuilder> {
        let build = Rc::clone(&self.widget(key)?.callbacks.build_layout);
        Ok(build(self, key)?.with_key(key))
    }

    fn attach_subtree(
        &mut self,
        layout: &mut LayoutBuilder,
        parent: LayoutNodeId,
        key: Key,
    ) -> Result<()> {
        let own = self.build_widget_layout(key)?;
        let node = layout.attach(parent, own);
        let children = self.widget(key)?.children.clone();
        for child in children {
            self.attach_subtree(layout, node, child)?;
        }
        Ok(())
    }

    /// Copy every solved rectangle onto its widget by walking the layout and
    /// the widget tree side by side
    pub fn commit_layout(&mut self, root: Key, layout: &LayoutBuilder) -> Result<()> {
        let mut stack = vec![(layout.root(), root)];
        while let Some((node, key)) = stack.pop() {
            let rect = layout.rect(node)?;
            let widget = self.widget_mut(key)?;
            debug_assert_eq!(layout.node_key(node), Ok(Some(key)));
            widget.rect = Some(rect);
            stack.extend(layout.children(node)?.into_iter().zip(widget.children.iter().copied()));
        }
        Ok(())
    }

    pub fn should_rebuild_layout_tree(&self) -> bool {
        self.rebuild_layout
    }

    /// Request a layout rebuild. The host consumes the request at least once
    /// per frame.
    pub fn set_rebuild_layout_tree(&mut self) {
        self.rebuild_layout = true;
    }

    /// Build, solve and commit a new layout for the tree at `root`, then
    /// flush state.
    ///
    /// The rebuild request is cleared before anything runs, so callbacks
    /// may request another rebuild from here on. If building, solving or
    /// committing fails, the request is put back.
    pub fn rebuild_layout_tree(&mut self, root: Key) -> Result<()> {
        if !self.rebuild_layout {
            tracing::debug!("rebuilding layout without a pending request");
        }
        self.rebuild_layout = false;

        let mut layout = match self.build_solve_commit(root) {
            Ok(layout) => layout,
            Err(err) => {
                self.rebuild_layout = true;
                return Err(err);
            }
        };
        tracing::debug!(nodes = layout.len(), "layout rebuilt");
        tracing::trace!("\n{}", layout.debug_dump());

        let (widths, _) = layout.take_notifications();
        for notification in widths {
            let (key, width) = (notification.key, notification.extent);
            let Ok(text) = self.store.get_state::<TextState>(key) else {
                continue;
            };
            if text.width != width {
                self.store
                    .set_state::<TextState, _>(key, move |text| text.width = width);
            }
        }

        self.flush()?;
        Ok(())
    }

    fn build_solve_commit(&mut self, root: Key) -> Result<LayoutBuilder> {
        let mut layout = self.build_layout_tree(root)?;
        layout.solve(0, 0)?;
        self.commit_layout(root, &layout)?;
        Ok(layout)
    }

    // =========================================================================
    // HIT TESTING
    // =========================================================================

    /// Hit-test the tree at `root` against `(x, y)`.
    ///
    /// Returns the hit widgets, outermost first. The list is also kept as
    /// [`Ui::hit_tree`].
    pub fn run_hit_tests(&mut self, root: Key, x: i32, y: i32) -> Result<&[Key]> {
        let mut hits = std::mem::take(&mut self.hit_tree);
        hits.clear();
        let result = self.run_hit_tests_into(root, x, y, &mut hits);
        self.hit_tree = hits;
        result?;
        Ok(&self.hit_tree)
    }

    /// Hit-test the subtree at `key`, appending to `hits`.
    ///
    /// Widgets without a [`WidgetState`] are skipped with their subtree.
    /// Children are tested in order until one of them adds a hit.
    pub fn run_hit_tests_into(&self, key: Key, x: i32, y: i32, hits: &mut Vec<Key>) -> Result<()> {
        if !self.store.has_state::<WidgetState>(key) {
            return Ok(());
        }

        let widget = self.widget(key)?;
        let rect = widget.rect.unwrap_or_default();
        if !(widget.callbacks.hit_test)(self, key, rect, x, y, hits)? {
            return Ok(());
        }

        let before = hits.len();
        for &child in &widget.children {
            self.run_hit_tests_into(child, x, y, hits)?;
            if hits.len() != before {
                break;
            }
        }
        Ok(())
    }

    /// Hit list from the most recent [`Ui::run_hit_tests`]
    pub fn hit_tree(&self) -> &[Key] {
        &self.hit_tree
    }

    pub fn clear_hit_tree(&mut self) {
        self.hit_tree.clear();
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    /// Render the tree at `root` using committed rectangles
    pub fn render_layout_tree(&self, renderer: &mut dyn Renderer, root: Key) -> Result<()> {
        self.render_layout_tree_at(renderer, root, 0, 0)
    }

    /// Render the tree at `root` with every rectangle moved by `(dx, dy)`.
    ///
    /// Widgets with no width or height are skipped with their subtree.
    pub fn render_layout_tree_at(
        &self,
        renderer: &mut dyn Renderer,
        root: Key,
        dx: i32,
        dy: i32,
    ) -> Result<()> {
        let widget = self.widget(root)?;
        let rect = widget.rect.unwrap_or_default().translated(dx, dy);
        if rect.w == 0 || rect.h == 0 {
            return Ok(());
        }

        if !(widget.callbacks.render)(self, renderer, root, rect)? {
            return Ok(());
        }

        for &child in &widget.children {
            self.render_layout_tree_at(renderer, child, dx, dy)?;
        }
        Ok(())
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn create_state<T: StateType>(&mut self, widget: Key, value: T, mark_dirty: bool) {
        self.store.create_state(widget, value, mark_dirty);
    }

    pub fn get_state<T: StateType>(&self, widget: Key) -> Result<&T> {
        self.store.get_state(widget)
    }

    pub fn has_state<T: StateType>(&self, widget: Key) -> bool {
        self.store.has_state::<T>(widget)
    }

    /// Queue a mutation of `widget`'s `T` for the next flush
    pub fn set_state<T, F>(&mut self, widget: Key, mutator: F)
    where
        T: StateType,
        F: FnOnce(&mut T) + 'static,
    {
        self.store.set_state(widget, mutator);
    }

    /// Observe `observed`'s `T`, returning its current value
    pub fn observe_state<'a, T, F>(
        &mut self,
        observer: Key,
        observed: impl Into<Observed<'a>>,
        callback: F,
    ) -> Result<&T>
    where
        T: StateType,
        F: Fn(&mut Ui, Key, &T) -> Result<()> + 'static,
    {
        self.store.observe_state(observer, observed, callback)
    }

    /// Drain pending state changes to a fixed point
    pub fn flush_state(&mut self) -> Result<FlushStats> {
        self.flush()
    }
}
