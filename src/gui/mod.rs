//! GUI module for the proxy batch builder
//!
//! Built with egui/eframe.
//!
//! ## Module Structure
//!
//! - `app` - GuiApp state, per-frame bookkeeping and the top bar
//! - `async_job` - Background jobs polled from the frame loop
//! - `theme` - Colors, spacing and styled widget factories
//! - `notifications` - Notification history
//! - `views` - Transfer editor and output panels
//!
//! ## Usage
//!
//! ```no_run
//! use proxy_batch_builder::config::Config;
//! use proxy_batch_builder::gui;
//!
//! gui::launch(Config::default()).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod notifications;
pub mod theme;
mod views;

pub use app::{launch, GuiApp};
pub use async_job::{spawn_job, AsyncJob};
pub use notifications::NotificationEntry;
pub use theme::{configure_style, AppTheme};
