//! Step 4: terms acknowledgement and the simulated submission.
//!
//! Submission is driven by [`ReviewStep::tick`] rather than by sleeping, so
//! the event loop keeps handling input while the request is "in flight".

use crate::application::store::DraftStore;
use crate::domain::schema::validate_application;
use crate::domain::{Application, FormStep, SubmissionError};
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// How long the simulated request takes and how long the success screen
/// stays up before the wizard resets itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTiming {
    pub delay: Duration,
    pub reset_grace: Duration,
    pub simulate_failure: bool,
}

impl Default for SubmissionTiming {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(2000),
            reset_grace: Duration::from_millis(5000),
            simulate_failure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewPhase {
    Editing,
    Submitting {
        ready_at: Instant,
        application: Box<Application>,
    },
    Submitted {
        reset_at: Instant,
    },
}

#[derive(Debug, Clone)]
pub struct ReviewStep {
    terms_accepted: bool,
    alert: Option<SubmissionError>,
    phase: ReviewPhase,
    timing: SubmissionTiming,
}

impl ReviewStep {
    pub fn new(timing: SubmissionTiming) -> Self {
        Self {
            terms_accepted: false,
            alert: None,
            phase: ReviewPhase::Editing,
            timing,
        }
    }

    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    pub fn toggle_terms(&mut self) {
        if self.phase == ReviewPhase::Editing {
            self.terms_accepted = !self.terms_accepted;
        }
    }

    pub fn alert(&self) -> Option<&SubmissionError> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn phase(&self) -> &ReviewPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, ReviewPhase::Submitting { .. })
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.phase, ReviewPhase::Submitted { .. })
    }

    /// Checks terms and the whole application, then starts the simulated
    /// request. Failures are also kept as the blocking alert.
    pub fn submit(&mut self, store: &DraftStore, now: Instant) -> Result<(), SubmissionError> {
        if self.phase != ReviewPhase::Editing {
            return Ok(());
        }

        let result = self.begin(store, now);
        if let Err(err) = &result {
            warn!(error = %err, "submission blocked");
            self.alert = Some(err.clone());
        }
        result
    }

    fn begin(&mut self, store: &DraftStore, now: Instant) -> Result<(), SubmissionError> {
        if !self.terms_accepted {
            return Err(SubmissionError::TermsNotAccepted);
        }

        let state = store.state();
        let application = validate_application(
            &state.personal_info,
            &state.employment_info,
            &state.loan_details,
            Some(Utc::now()),
        )
        .map_err(SubmissionError::Invalid)?;

        info!(delay_ms = self.timing.delay.as_millis() as u64, "submitting application");
        self.phase = ReviewPhase::Submitting {
            ready_at: now + self.timing.delay,
            application: Box::new(application),
        };
        Ok(())
    }

    /// Advances the submission timers. Returns `true` once the success grace
    /// period has run out and the draft store has been reset.
    pub fn tick(&mut self, store: &mut DraftStore, now: Instant) -> bool {
        match &self.phase {
            ReviewPhase::Submitting { ready_at, application } if now >= *ready_at => {
                if self.timing.simulate_failure {
                    warn!("simulated submission failure");
                    self.alert = Some(SubmissionError::Rejected);
                    self.phase = ReviewPhase::Editing;
                    return false;
                }

                match serde_json::to_string(application) {
                    Ok(json) => info!(application = %json, "application submitted"),
                    Err(err) => error!(error = %err, "application submitted but could not be logged"),
                }
                store.mark_step_completed(FormStep::ReviewSubmit);
                self.phase = ReviewPhase::Submitted {
                    reset_at: now + self.timing.reset_grace,
                };
                false
            }
            ReviewPhase::Submitted { reset_at } if now >= *reset_at => {
                info!("clearing submitted application");
                store.reset_form();
                self.phase = ReviewPhase::Editing;
                self.terms_accepted = false;
                true
            }
            _ => false,
        }
    }

    /// Skips the rest of the grace period.
    pub fn start_new_application(&mut self, store: &mut DraftStore) {
        if self.is_submitted() {
            store.reset_form();
            self.phase = ReviewPhase::Editing;
            self.terms_accepted = false;
        }
    }
}
