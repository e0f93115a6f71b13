//! pyramyd - Terminal Loan Application Library
//!
//! A multi-step loan application wizard for the terminal. Drafts are
//! validated step by step, saved after every change and submitted through a
//! simulated request.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
