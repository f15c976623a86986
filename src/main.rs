//! # Strata - layout preview
//!
//! Runs the window-management core headless: one synthetic output, a number
//! of synthetic windows, optional monitor-group bars, then prints where every
//! window ended up.

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use strata::client::{Rectangle, View, ViewHandle};
use strata::layer_manager::{OutputRequest, ReservedSpace};
use strata::{logging, Context, LayoutKind, OutputInfo, Seat, StrataConfig};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt:  ",
    env!("BUILD_DATE"),
    "\ncommit: ",
    env!("GIT_COMMIT"),
    "\ntarget: ",
    env!("TARGET_TRIPLE"),
);

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Preview how Strata tiles windows on an output")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/strata/strata.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Output connector name
    #[arg(long, default_value = "DP-1")]
    output: String,

    /// Output width in pixels
    #[arg(long, default_value_t = 1920)]
    width: i32,

    /// Output height in pixels
    #[arg(long, default_value_t = 1080)]
    height: i32,

    /// Number of windows to map
    #[arg(short = 'n', long, default_value_t = 3)]
    windows: usize,

    /// Layout for the current tag: master-stack, monocle, grid, floating
    #[arg(short, long)]
    layout: Option<LayoutKind>,

    /// Monitor group to apply instead of auto-selecting one
    #[arg(short, long)]
    group: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

/// Window stand-in that only records what it is told
#[derive(Debug, Default)]
struct PreviewView {
    geometry: Rectangle,
    title: String,
}

impl View for PreviewView {
    fn set_position(&mut self, x: i32, y: i32) {
        self.geometry.x = x;
        self.geometry.y = y;
    }

    fn set_size(&mut self, width: i32, height: i32) {
        self.geometry.width = width;
        self.geometry.height = height;
    }

    fn set_enabled(&mut self, _enabled: bool) {}

    fn set_fullscreen(&mut self, _fullscreen: bool) {}

    fn close(&mut self) {}

    fn raise(&mut self) {}

    fn is_mapped(&self) -> bool {
        true
    }

    fn geometry(&self) -> Rectangle {
        self.geometry
    }

    fn title(&self) -> Option<String> {
        Some(self.title.clone())
    }

    fn app_id(&self) -> Option<String> {
        Some("strata-preview".to_string())
    }
}

#[derive(Serialize)]
struct WindowReport {
    id: u64,
    title: String,
    focused: bool,
    geometry: Rectangle,
}

#[derive(Serialize)]
struct Report {
    output: String,
    tag: String,
    layout: LayoutKind,
    reserved: ReservedSpace,
    usable_area: Rectangle,
    requests: Vec<OutputRequest>,
    windows: Vec<WindowReport>,
}

fn load_config(path: &str) -> StrataConfig {
    match StrataConfig::load(path) {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", path);
            config
        }
        Err(e) => {
            warn!("❌ Failed to load configuration: {:#}", e);
            info!("📝 Using default configuration");
            StrataConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.debug);
    info!("🚀 Strata layout preview {}", strata::VERSION);
    let config = load_config(&cli.config);

    if cli.width <= 0 || cli.height <= 0 {
        bail!("output size must be positive, got {}x{}", cli.width, cli.height);
    }

    let mut seat = Seat::new(Context::global(config));
    seat.add_output(&OutputInfo::new(cli.output.clone(), cli.width, cli.height));

    let requests = match &cli.group {
        Some(name) => {
            let group = seat
                .context()
                .config
                .monitor_group(name)
                .cloned()
                .with_context(|| format!("no monitor group named '{}'", name))?;
            seat.apply_monitor_group(&group)
        }
        None => seat.apply_configured_monitors(),
    };

    // Views are owned here; clients only hold weak handles
    let views: Vec<Rc<RefCell<PreviewView>>> = (0..cli.windows)
        .map(|i| {
            Rc::new(RefCell::new(PreviewView {
                title: format!("window {}", i + 1),
                ..PreviewView::default()
            }))
        })
        .collect();
    for view in &views {
        let handle: ViewHandle = view.clone();
        seat.map_view(&handle);
    }

    let output = seat
        .focused_output_mut()
        .context("no output is managed")?;
    if let Some(layout) = cli.layout {
        output.set_layout(layout);
    }

    let tag = output.current_tag().context("output has no tags")?;
    let report = Report {
        output: output.name().to_string(),
        tag: tag.name().to_string(),
        layout: tag.layout(),
        reserved: output.reserved_space(),
        usable_area: output.usable_area(),
        requests,
        windows: output
            .render_order()
            .into_iter()
            .filter_map(|id| output.client(id))
            .map(|client| WindowReport {
                id: client.id().raw(),
                title: client.title().to_string(),
                focused: client.is_focused(),
                geometry: client.geometry(),
            })
            .collect(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} tag '{}' layout {} usable {:?}",
        report.output, report.tag, report.layout, report.usable_area
    );
    for window in &report.windows {
        let g = window.geometry;
        println!(
            "{:>4} {:<12} {:>5},{:<5} {:>5}x{:<5}{}",
            window.id,
            window.title,
            g.x,
            g.y,
            g.width,
            g.height,
            if window.focused { " *" } else { "" }
        );
    }
    Ok(())
}
