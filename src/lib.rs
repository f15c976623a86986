//! # Strata Window Management Core
//!
//! Decides which window goes where, on which output, under which tag, and
//! how space reserved for bars shrinks the tileable area.
//!
//! ## Architecture
//!
//! Strata is built from small components, leaves first:
//! - `layout`: Pure tiling geometry (master-stack, monocle, grid)
//! - `client`: Window-management state wrapped around an external view
//! - `screen`: Identity and geometry of one output
//! - `tag`: Named workspaces holding ordered clients
//! - `events`: Thread-safe publish/subscribe hub
//! - `layer_manager`: Per-output tags, scene layers and reserved space
//! - `monitor`: Matching configured monitors against connected outputs
//! - `seat`: Every managed output and which one has focus
//! - `config`: Configuration records and TOML loading
//!
//! Only the [`events::EventBus`] may be shared between threads; everything
//! else is driven from a single compositor thread.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use strata::{Context, OutputInfo, Seat, StrataConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = StrataConfig::load("~/.config/strata/strata.toml")?;
//!     let mut seat = Seat::new(Context::global(config));
//!     seat.add_output(&OutputInfo::new("DP-1", 2560, 1440));
//!     let requests = seat.apply_configured_monitors();
//!     println!("{} output request(s)", requests.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod events;
pub mod layer_manager;
pub mod layout;
pub mod logging;
pub mod monitor;
pub mod screen;
pub mod seat;
pub mod tag;

// Re-export main types for easy access
pub use client::{Client, ClientId, ClientRegistry, Rectangle, View, ViewHandle};
pub use config::{ConfigError, StrataConfig};
pub use context::Context;
pub use events::{Event, EventBus, EventKind};
pub use layer_manager::{LayerManager, OutputRequest, ReservedSpace};
pub use layout::{LayoutParams, TilingLayout};
pub use screen::{Output, OutputInfo, Screen};
pub use seat::Seat;
pub use tag::{LayoutKind, Tag, TagId};

// Re-export common error types
pub use anyhow::{Error, Result};

/// Version information for Strata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
