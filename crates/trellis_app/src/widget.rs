//! Widgets and their callbacks
//!
//! A widget is a key, a place in the tree and four callbacks:
//!
//! - **init** runs once, depth first, when the tree is initialised. It
//!   creates the widget's state and registers observers.
//! - **build_layout** returns a fresh single-node [`LayoutBuilder`] each
//!   time the layout is rebuilt. The tree attaches one child layout per
//!   child widget.
//! - **render** draws the widget into its committed rectangle and says
//!   whether its children should be rendered as well.
//! - **hit_test** pushes the widget onto the hit list if the pointer is
//!   over it and says whether its children should be tested.

use std::fmt;
use std::rc::Rc;

use trellis_core::{Key, Result};
use trellis_layout::{LayoutBuilder, Rect};

use crate::render::Renderer;
use crate::ui::Ui;

/// One-time state setup
pub type InitFn = Rc<dyn Fn(&mut Ui, Key) -> Result<()>>;

/// Produce this widget's own layout node
pub type BuildLayoutFn = Rc<dyn Fn(&mut Ui, Key) -> Result<LayoutBuilder>>;

/// Draw into the committed rectangle. `Ok(true)` renders children too.
pub type RenderFn = Rc<dyn Fn(&Ui, &mut dyn Renderer, Key, Rect) -> Result<bool>>;

/// `(ui, self, rect, x, y, hits)`. `Ok(true)` tests children too.
pub type HitTestFn = Rc<dyn Fn(&Ui, Key, Rect, i32, i32, &mut Vec<Key>) -> Result<bool>>;

/// Hit if the pointer is inside the rectangle, and always test children
pub fn default_hit_test(
    _ui: &Ui,
    key: Key,
    rect: Rect,
    x: i32,
    y: i32,
    hits: &mut Vec<Key>,
) -> Result<bool> {
    if rect.contains(x, y) {
        hits.push(key);
    }
    Ok(true)
}

/// Never hit, never test children
pub fn refuse_hit_test(
    _ui: &Ui,
    _key: Key,
    _rect: Rect,
    _x: i32,
    _y: i32,
    _hits: &mut Vec<Key>,
) -> Result<bool> {
    Ok(false)
}

/// The four callbacks that define a widget's behaviour
#[derive(Clone)]
pub struct WidgetCallbacks {
    pub init: InitFn,
    pub build_layout: BuildLayoutFn,
    pub render: RenderFn,
    pub hit_test: HitTestFn,
}

impl WidgetCallbacks {
    pub fn new<I, B, R, H>(init: I, build_layout: B, render: R, hit_test: H) -> Self
    where
        I: Fn(&mut Ui, Key) -> Result<()> + 'static,
        B: Fn(&mut Ui, Key) -> Result<LayoutBuilder> + 'static,
        R: Fn(&Ui, &mut dyn Renderer, Key, Rect) -> Result<bool> + 'static,
        H: Fn(&Ui, Key, Rect, i32, i32, &mut Vec<Key>) -> Result<bool> + 'static,
    {
        Self {
            init: Rc::new(init),
            build_layout: Rc::new(build_layout),
            render: Rc::new(render),
            hit_test: Rc::new(hit_test),
        }
    }

    /// Apply a [`Customisation`]: extra init runs after the widget's own, the
    /// other callbacks replace theirs
    pub fn customised(self, custom: Customisation) -> Self {
        let init = match custom.extra_init {
            Some(extra) => {
                let own = self.init;
                Rc::new(move |ui: &mut Ui, key: Key| {
                    own(ui, key)?;
                    extra(ui, key)
                }) as InitFn
            }
            None => self.init,
        };

        Self {
            init,
            build_layout: custom.build_layout.unwrap_or(self.build_layout),
            render: custom.render.unwrap_or(self.render),
            hit_test: custom.hit_test.unwrap_or(self.hit_test),
        }
    }
}

impl fmt::Debug for WidgetCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCallbacks").finish_non_exhaustive()
    }
}

/// Per-instance adjustments to a widget's callbacks
#[derive(Clone, Default)]
pub struct Customisation {
    pub extra_init: Option<InitFn>,
    pub build_layout: Option<BuildLayoutFn>,
    pub render: Option<RenderFn>,
    pub hit_test: Option<HitTestFn>,
}

impl Customisation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `init` after the widget's own init
    pub fn extra_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut Ui, Key) -> Result<()> + 'static,
    {
        self.extra_init = Some(Rc::new(init));
        self
    }

    pub fn build_layout<F>(mut self, build_layout: F) -> Self
    where
        F: Fn(&mut Ui, Key) -> Result<LayoutBuilder> + 'static,
    {
        self.build_layout = Some(Rc::new(build_layout));
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Ui, &mut dyn Renderer, Key, Rect) -> Result<bool> + 'static,
    {
        self.render = Some(Rc::new(render));
        self
    }

    pub fn hit_test<F>(mut self, hit_test: F) -> Self
    where
        F: Fn(&Ui, Key, Rect, i32, i32, &mut Vec<Key>) -> Result<bool> + 'static,
    {
        self.hit_test = Some(Rc::new(hit_test));
        self
    }
}

impl fmt::Debug for Customisation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Customisation")
            .field("extra_init", &self.extra_init.is_some())
            .field("build_layout", &self.build_layout.is_some())
            .field("render", &self.render.is_some())
            .field("hit_test", &self.hit_test.is_some())
            .finish()
    }
}

/// A node of the widget tree
#[derive(Debug)]
pub struct Widget {
    pub(crate) tag: String,
    pub(crate) key: Key,
    pub(crate) parent: Option<Key>,
    pub(crate) children: Vec<Key>,
    pub(crate) callbacks: WidgetCallbacks,
    /// Rectangle from the most recent layout commit
    pub(crate) rect: Option<Rect>,
}

impl Widget {
    pub(crate) fn new(tag: &str, key: Key, callbacks: WidgetCallbacks, children: Vec<Key>) -> Self {
        Self {
            tag: tag.to_string(),
            key,
            parent: None,
            children,
            callbacks,
            rect: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Set once the tree has been initialised; `None` for the root
    pub fn parent(&self) -> Option<Key> {
        self.parent
    }

    pub fn children(&self) -> &[Key] {
        &self.children
    }

    pub fn callbacks(&self) -> &WidgetCallbacks {
        &self.callbacks
    }

    /// Committed rectangle, if a layout has been committed
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }
}
