use crate::application::{App, AppMode, Screen, StepView};
use crossterm::event::{KeyCode, KeyModifiers};
use std::time::Instant;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            Self::handle_control(app, key);
            return;
        }

        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_control(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Char('c') | KeyCode::Char('q') => app.quit(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Char('r') if app.screen() == Screen::Wizard => app.reset_application(),
            _ => {}
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode) {
        // The alert is modal: the key that dismisses it does nothing else.
        if app.has_alert() {
            app.dismiss_alert();
            return;
        }

        if key == KeyCode::F(1) {
            app.show_help();
            return;
        }

        app.status_message = None;

        let on_review = matches!(app.view(), StepView::ReviewSubmit(_));
        match app.screen() {
            Screen::Landing => Self::handle_landing(app, key),
            Screen::Wizard if on_review => Self::handle_review(app, key),
            Screen::Wizard => Self::handle_form_step(app, key),
        }
    }

    fn handle_landing(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Char('s') => app.start_application(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Char('?') => app.show_help(),
            KeyCode::Char('q') | KeyCode::Esc => app.quit(),
            _ => {}
        }
    }

    fn handle_form_step(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Tab | KeyCode::Down => app.view_mut().focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.view_mut().focus_previous(),
            KeyCode::Left => app.view_mut().cycle_choice(false),
            KeyCode::Right => app.view_mut().cycle_choice(true),
            KeyCode::Backspace => app.view_mut().backspace(),
            KeyCode::Char(c) => app.view_mut().type_char(c),
            KeyCode::Enter => app.continue_step(Instant::now()),
            KeyCode::Esc => app.go_back(),
            _ => {}
        }
    }

    fn handle_review(app: &mut App, key: KeyCode) {
        let (submitting, submitted) = match app.view() {
            StepView::ReviewSubmit(review) => (review.is_submitting(), review.is_submitted()),
            _ => return,
        };

        if submitted {
            if matches!(key, KeyCode::Enter | KeyCode::Char('n')) {
                app.start_new_application();
            }
            return;
        }
        if submitting {
            return;
        }

        match key {
            KeyCode::Char(' ') => app.toggle_terms(),
            KeyCode::Enter => app.continue_step(Instant::now()),
            KeyCode::Esc => app.go_back(),
            KeyCode::Char('?') => app.show_help(),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.hide_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}
