//! Application layer: the draft store, the step views and the state that
//! ties them to the terminal UI.

pub mod forms;
pub mod progress;
pub mod state;
pub mod steps;
pub mod store;

pub use forms::{FormField, FormState};
pub use progress::{progress_percentage, step_status, StepStatus};
pub use state::*;
pub use steps::{StepForm, StepView, SubmissionTiming};
pub use store::{DraftStore, MemoryStore, SnapshotStore, ThemeStore};
