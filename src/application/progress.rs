use crate::domain::{FormStep, WizardState};

/// How far through the wizard `current` is: 0 on the first step, 100 on
/// the review step.
pub fn progress_percentage(current: FormStep) -> u16 {
    let done = u16::from(current.number() - 1);
    let span = u16::from(FormStep::TOTAL - 1);
    done * 100 / span
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

/// Completion wins over being current, so a step revisited after it passed
/// still shows as completed.
pub fn step_status(step: FormStep, state: &WizardState) -> StepStatus {
    if state.completed_steps.contains(&step) {
        StepStatus::Completed
    } else if state.current_step == step {
        StepStatus::Current
    } else {
        StepStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(FormStep::PersonalInfo), 0);
        assert_eq!(progress_percentage(FormStep::EmploymentInfo), 33);
        assert_eq!(progress_percentage(FormStep::LoanDetails), 66);
        assert_eq!(progress_percentage(FormStep::ReviewSubmit), 100);
    }

    #[test]
    fn test_step_status() {
        let mut state = WizardState::default();
        state.current_step = FormStep::PersonalInfo;
        state.completed_steps.insert(FormStep::PersonalInfo);
        state.completed_steps.insert(FormStep::EmploymentInfo);

        assert_eq!(step_status(FormStep::PersonalInfo, &state), StepStatus::Completed);
        assert_eq!(step_status(FormStep::EmploymentInfo, &state), StepStatus::Completed);
        assert_eq!(step_status(FormStep::LoanDetails, &state), StepStatus::Pending);

        state.current_step = FormStep::LoanDetails;
        assert_eq!(step_status(FormStep::LoanDetails, &state), StepStatus::Current);
    }
}
