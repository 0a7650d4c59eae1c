//! Headless Demo
//!
//! A header, a scrolling list and a footer, driven through a scripted
//! sequence of pointer moves and wheel notches. Frames are recorded rather
//! than drawn and summarised in the log.
//!
//! Run with: cargo run -p trellis_app --example headless -- [config.toml]

use std::path::PathBuf;

use clap::Parser;
use trellis_app::prelude::*;
use tracing_subscriber::EnvFilter;

const ROWS: usize = 30;
const ROW_HEIGHT: i32 = 24;

#[derive(Parser)]
#[command(name = "headless")]
#[command(about = "Drive a trellis app through a scripted frame sequence", long_about = None)]
struct Cli {
    /// TOML file with viewport and logging settings
    config: Option<PathBuf>,

    /// Log at debug level regardless of the configured filter
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => AppConfig::default(),
    };
    if cli.verbose {
        config.log_filter = "debug".to_string();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let mut app = App::with_config(config, build_ui)?;
    let mut renderer = RecordingRenderer::default();

    let script = [
        FrameInput::pointer(150, 100),
        FrameInput::pointer(150, 100).with_wheel(-4),
        FrameInput::pointer(150, 300).with_wheel(-12),
        FrameInput::pointer(150, 300).with_wheel(-80),
        FrameInput::pointer(20, 10),
        FrameInput::pointer(20, 10).with_wheel(3),
        FrameInput::pointer(150, 580),
    ];

    for input in &script {
        let report = app.frame(input, &mut renderer)?;
        let hovered = report
            .hovered
            .map(|key| app.ui().widget(key).map(|w| w.tag().to_string()))
            .transpose()?;
        tracing::info!(
            frame = app.frames(),
            hits = report.hits.len(),
            hovered = ?hovered,
            rebuilt = report.rebuilt,
            commands = renderer.last_frame().len(),
            "frame"
        );
    }

    let list = app.ui().store().resolve_tag("list")?;
    tracing::info!(
        scroll = app.ui().get_state::<Transform>(list)?.y,
        visible = app.ui().get_state::<VisibleChildren>(list)?.children.len(),
        "finished"
    );
    tracing::debug!("{:?}", app.ui().store().stats());
    Ok(())
}

fn build_ui(ui: &mut Ui) -> trellis_app::Result<Key> {
    let title = label(ui, "title", "Trellis", ExtentRequest::AUTO);
    let header = boxed(
        ui,
        "header",
        || padding(ExtentRequest::AUTO, ExtentRequest::exactly(40), 8, 8, 12, 12),
        Rgba::rgb(40, 40, 60),
        [title],
    );

    let rows: Vec<Key> = (0..ROWS).map(|i| list_row(ui, i)).collect();
    let list = scroll_list(ui, "list", rows);

    let status = label(ui, "status", "ready", ExtentRequest::exactly(64));
    let footer = boxed(
        ui,
        "footer",
        || align_right(ExtentRequest::AUTO, ExtentRequest::exactly(20)),
        Rgba::rgb(40, 40, 60),
        [status],
    );

    Ok(boxed(
        ui,
        "page",
        || column(ExtentRequest::AUTO, ExtentRequest::AUTO),
        Rgba::WHITE,
        [header, list, footer],
    ))
}

fn list_row(ui: &mut Ui, index: usize) -> Key {
    let icon = boxed(
        ui,
        "",
        || childless(ExtentRequest::exactly(ROW_HEIGHT), ExtentRequest::AUTO),
        Rgba::BLUE,
        [],
    );
    let text: &'static str = if index % 2 == 0 { "even row" } else { "odd row" };
    let name = label(ui, "", text, ExtentRequest::AUTO);
    let shade = if index % 2 == 0 {
        Rgba::rgb(245, 245, 245)
    } else {
        Rgba::WHITE
    };
    boxed(
        ui,
        "",
        || align_left(ExtentRequest::AUTO, ExtentRequest::exactly(ROW_HEIGHT)),
        shade,
        [icon, name],
    )
}

/// Filled box around its children
fn boxed<L>(
    ui: &mut Ui,
    tag: &str,
    layout: L,
    color: Rgba,
    children: impl IntoIterator<Item = Key>,
) -> Key
where
    L: Fn() -> LayoutBuilder + 'static,
{
    ui.create_widget(
        tag,
        WidgetCallbacks::new(
            |ui: &mut Ui, key: Key| {
                ui.create_state(key, WidgetState::default(), false);
                Ok(())
            },
            move |_: &mut Ui, _: Key| Ok(layout()),
            move |ui: &Ui, renderer: &mut dyn Renderer, key: Key, rect: Rect| {
                let hovered = ui.get_state::<WidgetState>(key)?.is_hovered;
                renderer.fill_rect(rect, if hovered { Rgba::rgb(220, 230, 255) } else { color });
                Ok(true)
            },
            default_hit_test,
        ),
        children,
    )
}

/// Single-line text, as wide as `width` allows
fn label(ui: &mut Ui, tag: &str, text: &'static str, width: ExtentRequest) -> Key {
    ui.create_widget(
        tag,
        WidgetCallbacks::new(
            |ui: &mut Ui, key: Key| {
                ui.create_state(key, WidgetState::default(), false);
                ui.create_state(key, TextState::default(), false);
                ui.observe_state(key, key, |ui: &mut Ui, _: Key, _: &TextState| {
                    ui.set_rebuild_layout_tree();
                    Ok(())
                })?;
                Ok(())
            },
            move |_: &mut Ui, _: Key| Ok(childless(width, ExtentRequest::AUTO).notify_width()),
            move |_: &Ui, renderer: &mut dyn Renderer, _: Key, rect: Rect| {
                renderer.draw_text(rect, text, Rgba::BLACK);
                Ok(true)
            },
            refuse_hit_test,
        ),
        [],
    )
}

fn visible_rows(ui: &Ui, key: Key, scroll: i32) -> trellis_core::Result<Vec<Key>> {
    let viewport = ui.widget_rect(key);
    let mut visible = Vec::new();
    for &child in ui.child_widgets(key)? {
        let rect = ui.widget_rect(child);
        if rect.y + rect.h < scroll {
            continue;
        }
        if rect.y > scroll + viewport.h {
            break;
        }
        visible.push(child);
    }
    Ok(visible)
}

fn refresh_visible(ui: &mut Ui, key: Key, scroll: i32) -> trellis_core::Result<()> {
    let visible = visible_rows(ui, key, scroll)?;
    ui.set_state::<VisibleChildren, _>(key, move |state| state.children = visible);
    Ok(())
}

/// Clipped list rendering only the rows inside its viewport
fn scroll_list(ui: &mut Ui, tag: &str, rows: Vec<Key>) -> Key {
    ui.create_widget(
        tag,
        WidgetCallbacks::new(
            |ui: &mut Ui, key: Key| {
                ui.create_state(key, WidgetState::default(), false);
                ui.create_state(key, VisibleChildren::default(), false);
                ui.create_state(key, Transform::default(), true);
                ui.observe_state(key, key, |ui: &mut Ui, key: Key, transform: &Transform| {
                    let viewport = ui.widget_rect(key);
                    let content: i32 = ui
                        .child_widgets(key)?
                        .iter()
                        .map(|&row| ui.widget_rect(row).h)
                        .sum();
                    let max = (content - viewport.h).max(0);
                    let clamped = transform.y.clamp(0, max);
                    if clamped != transform.y {
                        ui.set_state::<Transform, _>(key, move |t| t.y = clamped);
                    }
                    refresh_visible(ui, key, clamped)
                })?;
                ui.create_state(key, OnBuildLayout, false);
                ui.observe_state(key, key, |ui: &mut Ui, key: Key, _: &OnBuildLayout| {
                    let scroll = ui.get_state::<Transform>(key)?.y;
                    refresh_visible(ui, key, scroll)
                })?;
                Ok(())
            },
            |ui: &mut Ui, key: Key| {
                ui.set_state::<OnBuildLayout, _>(key, |_| {});
                Ok(vertical_scroll(ExtentRequest::AUTO, ExtentRequest::AUTO))
            },
            |ui: &Ui, renderer: &mut dyn Renderer, key: Key, rect: Rect| {
                let scroll = ui.get_state::<Transform>(key)?.y;
                renderer.push_clip(rect);
                for &row in &ui.get_state::<VisibleChildren>(key)?.children {
                    ui.render_layout_tree_at(renderer, row, 0, rect.y - scroll)?;
                }
                renderer.pop_clip();
                Ok(false)
            },
            |ui: &Ui, key: Key, rect: Rect, x: i32, y: i32, hits: &mut Vec<Key>| {
                if !rect.contains(x, y) {
                    return Ok(false);
                }
                hits.push(key);
                let before = hits.len();
                let transform = *ui.get_state::<Transform>(key)?;
                for &row in &ui.get_state::<VisibleChildren>(key)?.children {
                    ui.run_hit_tests_into(row, x + transform.x, y + transform.y - rect.y, hits)?;
                    if hits.len() != before {
                        break;
                    }
                }
                Ok(false)
            },
        ),
        rows,
    )
}
