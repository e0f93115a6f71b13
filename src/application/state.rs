//! Application state for the terminal loan wizard.
//!
//! [`App`] owns the draft store, the view for the current step and the UI
//! chrome around it (theme, help overlay, status line). Every user action
//! enters through a method here so the store and the view never drift apart.

use super::steps::{StepView, SubmissionTiming};
use super::store::{DraftStore, SnapshotStore, ThemeStore};
use crate::domain::{FormStep, Theme};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Landing page or wizard steps receive keys
    Normal,
    /// Help screen is displayed
    Help,
}

/// Top-level screen, derived from whether the applicant has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Wizard,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use pyramyd::application::{App, MemoryStore, Screen, SubmissionTiming};
/// use pyramyd::domain::Theme;
///
/// let store = MemoryStore::default();
/// let mut app = App::new(
///     Box::new(store.clone()),
///     Box::new(store),
///     Theme::Light,
///     SubmissionTiming::default(),
/// );
/// assert_eq!(app.screen(), Screen::Landing);
/// app.start_application();
/// assert_eq!(app.screen(), Screen::Wizard);
/// ```
#[derive(Debug)]
pub struct App {
    store: DraftStore,
    view: StepView,
    theme_store: Box<dyn ThemeStore>,
    timing: SubmissionTiming,
    /// Active colour scheme
    pub theme: Theme,
    /// Current application mode
    pub mode: AppMode,
    /// Scroll position in help text
    pub help_scroll: usize,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Set when the event loop should exit
    pub should_quit: bool,
}

impl App {
    /// Rehydrates the draft and picks the theme. A saved theme preference
    /// wins over `system_theme`.
    pub fn new(
        snapshots: Box<dyn SnapshotStore>,
        theme_store: Box<dyn ThemeStore>,
        system_theme: Theme,
        timing: SubmissionTiming,
    ) -> Self {
        let store = DraftStore::open(snapshots);
        let theme = match theme_store.load_theme() {
            Ok(Some(theme)) => theme,
            Ok(None) => system_theme,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable theme preference");
                system_theme
            }
        };
        let view = StepView::for_step(store.current_step(), store.state(), timing);

        Self {
            store,
            view,
            theme_store,
            timing,
            theme,
            mode: AppMode::Normal,
            help_scroll: 0,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn view(&self) -> &StepView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut StepView {
        &mut self.view
    }

    pub fn screen(&self) -> Screen {
        if self.store.is_form_started() {
            Screen::Wizard
        } else {
            Screen::Landing
        }
    }

    pub fn current_step(&self) -> FormStep {
        self.store.current_step()
    }

    pub fn start_application(&mut self) {
        info!("application started");
        self.store.start_form();
        self.rebuild_view();
        self.collect_store_errors();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        debug!(theme = self.theme.as_str(), "theme updated");
        if let Err(err) = self.theme_store.save_theme(self.theme) {
            warn!(error = %err, "failed to save theme preference");
            self.status_message = Some(format!("Could not save theme: {}", err));
        }
    }

    /// Continue on a form step, or submit on the review step.
    pub fn continue_step(&mut self, now: Instant) {
        match &mut self.view {
            StepView::ReviewSubmit(review) => {
                if review.submit(&self.store, now).is_ok() && review.is_submitting() {
                    self.status_message = Some("Submitting your application...".to_string());
                }
            }
            view => {
                if view.submit_form(&mut self.store) {
                    self.status_message = None;
                }
            }
        }
        self.sync_view();
        self.collect_store_errors();
    }

    /// Back one step. Edits not yet continued are dropped. Ignored while a
    /// submission is in flight or has finished.
    pub fn go_back(&mut self) {
        if let StepView::ReviewSubmit(review) = &self.view {
            if review.is_submitting() || review.is_submitted() {
                return;
            }
        }
        if self.store.current_step() == FormStep::PersonalInfo {
            return;
        }
        self.store.previous_step();
        self.sync_view();
        self.collect_store_errors();
    }

    /// Throws the whole draft away and returns to the landing screen.
    /// A submission in flight cannot be cancelled.
    pub fn reset_application(&mut self) {
        if matches!(&self.view, StepView::ReviewSubmit(review) if review.is_submitting()) {
            self.status_message = Some("Submission in progress".to_string());
            return;
        }
        info!("application reset by applicant");
        self.store.reset_form();
        self.rebuild_view();
        self.status_message = Some("Application cleared".to_string());
        self.collect_store_errors();
    }

    /// From the success screen, clears the draft without waiting for the
    /// automatic reset.
    pub fn start_new_application(&mut self) {
        if let StepView::ReviewSubmit(review) = &mut self.view {
            review.start_new_application(&mut self.store);
        }
        self.sync_view();
        self.status_message = None;
        self.collect_store_errors();
    }

    pub fn toggle_terms(&mut self) {
        if let StepView::ReviewSubmit(review) = &mut self.view {
            review.toggle_terms();
        }
    }

    pub fn dismiss_alert(&mut self) {
        if let StepView::ReviewSubmit(review) = &mut self.view {
            review.dismiss_alert();
        }
    }

    pub fn has_alert(&self) -> bool {
        matches!(&self.view, StepView::ReviewSubmit(review) if review.alert().is_some())
    }

    /// Advances time-driven state: the submission delay and the reset grace
    /// period.
    pub fn tick(&mut self, now: Instant) {
        if let StepView::ReviewSubmit(review) = &mut self.view {
            let was_submitting = review.is_submitting();
            let reset = review.tick(&mut self.store, now);
            if was_submitting && !review.is_submitting() {
                self.status_message = None;
            }
            if reset {
                self.status_message = Some("Application cleared".to_string());
            }
        }
        self.sync_view();
        self.collect_store_errors();
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    pub fn hide_help(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Rebuilds the view when the store has moved to another step.
    fn sync_view(&mut self) {
        if self.view.step() != self.store.current_step() {
            self.rebuild_view();
        }
    }

    fn rebuild_view(&mut self) {
        let step = self.store.current_step();
        debug!(step = step.number(), "entering step");
        self.view = StepView::for_step(step, self.store.state(), self.timing);
    }

    fn collect_store_errors(&mut self) {
        if let Some(message) = self.store.take_persist_error() {
            self.status_message = Some(message);
        }
    }
}
