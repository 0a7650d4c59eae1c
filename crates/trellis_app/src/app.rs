//! Frame-driven application loop
//!
//! An [`App`] wraps the user's content in a root widget sized to the
//! viewport and drives one tick per [`App::frame`]:
//!
//! 1. rebuild the layout if it was invalidated
//! 2. hit-test at the pointer and update hit-tree and hover flags
//! 3. scroll the innermost hit widget that owns a [`Transform`]
//! 4. flush state, rebuild again if the flush invalidated layout, flush
//! 5. clear, render, present

use trellis_core::{Key, Transform, WidgetState};
use trellis_layout::recipes::scaffold;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::render::Renderer;
use crate::ui::Ui;
use crate::widget::{default_hit_test, WidgetCallbacks};

/// Tag of the widget every [`App`] places above its content
pub const APP_ROOT_TAG: &str = "AppRoot";

/// Pointer state for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub pointer_x: i32,
    pub pointer_y: i32,
    /// Wheel notches since the last frame, positive away from the user
    pub wheel_delta: i32,
}

impl FrameInput {
    pub fn pointer(x: i32, y: i32) -> Self {
        Self {
            pointer_x: x,
            pointer_y: y,
            wheel_delta: 0,
        }
    }

    pub fn with_wheel(mut self, delta: i32) -> Self {
        self.wheel_delta = delta;
        self
    }
}

/// What happened during one [`App::frame`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Hit widgets, outermost first
    pub hits: Vec<Key>,
    /// Innermost hit widget
    pub hovered: Option<Key>,
    /// Widget whose [`Transform`] received the wheel delta
    pub scrolled: Option<Key>,
    /// Whether the layout was rebuilt at least once
    pub rebuilt: bool,
}

/// A [`Ui`] bound to a viewport and driven frame by frame
pub struct App {
    ui: Ui,
    root: Key,
    content: Key,
    config: AppConfig,
    hovered: Option<Key>,
    frames: u64,
}

impl App {
    /// Build an app with the default configuration. `build` creates the
    /// content widgets and returns the top one.
    pub fn new<F>(build: F) -> Result<Self>
    where
        F: FnOnce(&mut Ui) -> Result<Key>,
    {
        Self::with_config(AppConfig::default(), build)
    }

    pub fn with_config<F>(config: AppConfig, build: F) -> Result<Self>
    where
        F: FnOnce(&mut Ui) -> Result<Key>,
    {
        let mut ui = Ui::with_store_config(config.store_config());
        let content = build(&mut ui)?;

        let (width, height) = (config.width, config.height);
        let root = ui.create_widget(
            APP_ROOT_TAG,
            WidgetCallbacks::new(
                |ui: &mut Ui, key: Key| {
                    ui.create_state(key, WidgetState::default(), false);
                    Ok(())
                },
                move |_: &mut Ui, _: Key| Ok(scaffold(width, height)),
                |_: &Ui, _: &mut dyn Renderer, _: Key, _| Ok(true),
                default_hit_test,
            ),
            [content],
        );
        ui.init_widget_tree(root)?;
        tracing::info!(width, height, widgets = ui.widget_count(), "app created");

        Ok(Self {
            ui,
            root,
            content,
            config,
            hovered: None,
            frames: 0,
        })
    }

    pub fn ui(&self) -> &Ui {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut Ui {
        &mut self.ui
    }

    /// The root widget sized to the viewport
    pub fn root(&self) -> Key {
        self.root
    }

    /// The widget returned by the build closure
    pub fn content(&self) -> Key {
        self.content
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn hovered(&self) -> Option<Key> {
        self.hovered
    }

    /// Frames completed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one tick and render it
    pub fn frame(&mut self, input: &FrameInput, renderer: &mut dyn Renderer) -> Result<FrameReport> {
        let mut report = FrameReport {
            rebuilt: self.rebuild_if_needed()?,
            ..Default::default()
        };

        let previous = self.ui.hit_tree().to_vec();
        report.hits = self
            .ui
            .run_hit_tests(self.root, input.pointer_x, input.pointer_y)?
            .to_vec();
        self.update_hit_tree_flags(&previous, &report.hits);

        report.hovered = report.hits.last().copied();
        self.update_hover(report.hovered);

        if input.wheel_delta != 0 {
            report.scrolled = self.scroll(&report.hits, input.wheel_delta);
        }

        self.ui.flush_state()?;
        report.rebuilt |= self.rebuild_if_needed()?;
        self.ui.flush_state()?;

        renderer.clear();
        self.ui.render_layout_tree(renderer, self.root)?;
        renderer
            .present()
            .map_err(|err| AppError::Render(err.to_string()))?;

        self.frames += 1;
        tracing::trace!(
            frame = self.frames,
            hits = report.hits.len(),
            rebuilt = report.rebuilt,
            "frame complete"
        );
        Ok(report)
    }

    fn rebuild_if_needed(&mut self) -> Result<bool> {
        if !self.ui.should_rebuild_layout_tree() {
            return Ok(false);
        }
        self.ui.rebuild_layout_tree(self.root)?;
        Ok(true)
    }

    fn update_hit_tree_flags(&mut self, previous: &[Key], current: &[Key]) {
        for &key in previous.iter().filter(|key| !current.contains(key)) {
            self.set_widget_flag(key, |state| state.is_in_hit_tree = false);
        }
        for &key in current.iter().filter(|key| !previous.contains(key)) {
            self.set_widget_flag(key, |state| state.is_in_hit_tree = true);
        }
    }

    fn update_hover(&mut self, hovered: Option<Key>) {
        if hovered == self.hovered {
            return;
        }
        if let Some(old) = self.hovered {
            self.set_widget_flag(old, |state| state.is_hovered = false);
        }
        if let Some(new) = hovered {
            self.set_widget_flag(new, |state| state.is_hovered = true);
        }
        self.hovered = hovered;
    }

    fn set_widget_flag(&mut self, key: Key, mutator: fn(&mut WidgetState)) {
        if self.ui.has_state::<WidgetState>(key) {
            self.ui.set_state::<WidgetState, _>(key, mutator);
        }
    }

    /// Move the innermost hit widget owning a [`Transform`] by
    /// `delta * scroll_step`
    fn scroll(&mut self, hits: &[Key], delta: i32) -> Option<Key> {
        let target = hits
            .iter()
            .rev()
            .copied()
            .find(|&key| self.ui.has_state::<Transform>(key))?;
        let step = delta * self.config.scroll_step;
        self.ui
            .set_state::<Transform, _>(target, move |transform| transform.y -= step);
        tracing::debug!("scrolled widget {} by {}", target, -step);
        Some(target)
    }
}
