//! Presentation layer handling terminal UI and user input.
//!
//! This module renders the wizard with ratatui and maps key presses onto
//! [`App`](crate::application::App) actions.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
