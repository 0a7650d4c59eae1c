//! Trellis Application Framework
//!
//! Ties the state store and the layout solver into a retained widget tree:
//!
//! - **Widgets**: A fixed tree of init, layout, render and hit-test callbacks
//! - **Ui**: Widget registry, layout rebuild and commit, hit-testing, rendering
//! - **App**: One frame per call: input, flush, relayout, render
//! - **Renderer**: The drawing boundary, with a recording implementation
//!
//! # Example
//!
//! ```rust
//! use trellis_app::prelude::*;
//!
//! let mut app = App::new(|ui| {
//!     let panel = ui.create_widget(
//!         "panel",
//!         WidgetCallbacks::new(
//!             |ui: &mut Ui, key: Key| {
//!                 ui.create_state(key, WidgetState::default(), false);
//!                 Ok(())
//!             },
//!             |_: &mut Ui, _: Key| Ok(fixed_box(ExtentRequest::AUTO, ExtentRequest::AUTO)),
//!             |_: &Ui, renderer: &mut dyn Renderer, _: Key, rect: Rect| {
//!                 renderer.fill_rect(rect, Rgba::BLUE);
//!                 Ok(true)
//!             },
//!             default_hit_test,
//!         ),
//!         [],
//!     );
//!     Ok(panel)
//! })
//! .unwrap();
//!
//! let mut renderer = RecordingRenderer::default();
//! let report = app.frame(&FrameInput::pointer(10, 10), &mut renderer).unwrap();
//!
//! assert!(report.rebuilt);
//! assert_eq!(report.hovered, Some(app.content()));
//! assert_eq!(app.ui().widget_rect(app.content()), Rect::new(0, 0, 300, 600));
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod render;
pub mod ui;
pub mod widget;


pub use app::{App, FrameInput, FrameReport, APP_ROOT_TAG};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use render::{DrawCommand, RecordingRenderer, Renderer, Rgba};
pub use ui::Ui;
pub use widget::{
    default_hit_test, refuse_hit_test, BuildLayoutFn, Customisation, HitTestFn, InitFn, RenderFn,
    Widget, WidgetCallbacks,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::app::{App, FrameInput, FrameReport};
    pub use crate::config::AppConfig;
    pub use crate::error::AppError;
    pub use crate::render::{DrawCommand, RecordingRenderer, Renderer, Rgba};
    pub use crate::ui::Ui;
    pub use crate::widget::{
        default_hit_test, refuse_hit_test, Customisation, Widget, WidgetCallbacks,
    };

    pub use trellis_core::prelude::*;
    pub use trellis_layout::prelude::*;
}
