//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single form screen generated from the feature catalog, with the
//! prediction or validation message shown under the form.

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
pub use ui::form::{FormState, Outcome, PLACEHOLDER};
