use crate::application::steps::{
    EmploymentInfoStep, LoanDetailsStep, PersonalInfoStep, ReviewPhase, ReviewStep, StepForm,
};
use crate::application::{
    progress_percentage, step_status, App, AppMode, FormField, FormState, Screen, StepStatus,
    StepView,
};
use crate::domain::{
    estimate_monthly_payment, format_currency, loan_term_label, FormStep, SubmissionError, Theme,
    WizardState,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

/// Colours for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,
    pub success: Color,
    pub focus_fg: Color,
    pub focus_bg: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                error: Color::Red,
                success: Color::Green,
                focus_fg: Color::Black,
                focus_bg: Color::LightBlue,
            },
            Theme::Dark => Self {
                bg: Color::Black,
                fg: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                error: Color::LightRed,
                success: Color::LightGreen,
                focus_fg: Color::White,
                focus_bg: Color::Blue,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }
}

pub fn render_ui(f: &mut Frame, app: &App) {
    let palette = Palette::for_theme(app.theme);
    f.render_widget(Block::default().style(palette.base()), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, &palette, chunks[0]);
    match app.screen() {
        Screen::Landing => render_landing(f, &palette, chunks[1]),
        Screen::Wizard => render_wizard(f, app, &palette, chunks[1]),
    }
    render_status_bar(f, app, &palette, chunks[2]);

    if app.screen() == Screen::Wizard {
        if let StepView::ReviewSubmit(review) = app.view() {
            if let Some(alert) = review.alert() {
                render_alert_popup(f, alert, &palette);
            }
        }
    }

    if app.mode == AppMode::Help {
        render_help_popup(f, app.help_scroll, &palette);
    }
}

fn render_header(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let progress = match app.screen() {
        Screen::Landing => "Welcome".to_string(),
        Screen::Wizard => format!(
            "Step {} of {}",
            app.current_step().number(),
            FormStep::TOTAL
        ),
    };
    let header = Paragraph::new(format!(
        "pyramyd - Loan Application | {} | Theme: {}",
        progress,
        app.theme.as_str()
    ))
    .style(Style::default().fg(palette.accent).bg(palette.bg));
    f.render_widget(header, area);
}

fn render_landing(f: &mut Frame, palette: &Palette, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Apply for a Loan",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Get the funding you need with a fast, simple application."),
        Line::from("Four short steps: personal details, employment and income,"),
        Line::from("the loan you want, and a final review."),
        Line::from(""),
        Line::from(Span::styled(
            "Your progress is saved automatically, so you can stop and resume at any time.",
            Style::default().fg(palette.muted),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start your application",
            Style::default().fg(palette.success).add_modifier(Modifier::BOLD),
        )),
    ];

    let landing = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Welcome"))
        .style(palette.base());
    f.render_widget(landing, area);
}

fn render_wizard(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let step = app.current_step();
    let percent = progress_percentage(step);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bg))
        .percent(percent)
        .label(format!("{}% complete", percent));
    f.render_widget(gauge, chunks[0]);

    f.render_widget(
        Paragraph::new(step_indicator(app.store().state(), palette)).style(palette.base()),
        chunks[1],
    );

    let title = format!("{} - {}", step.title(), step.description());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(chunks[2]);
    f.render_widget(block.style(palette.base()), chunks[2]);

    match app.view() {
        StepView::PersonalInfo(view) => render_personal(f, view, palette, inner),
        StepView::EmploymentInfo(view) => render_employment(f, view, palette, inner),
        StepView::LoanDetails(view) => render_loan(f, view, palette, inner),
        StepView::ReviewSubmit(view) => render_review(f, view, app.store().state(), palette, inner),
    }
}

fn step_indicator(state: &WizardState, palette: &Palette) -> Line<'static> {
    let mut spans = Vec::new();
    for step in FormStep::ALL {
        let (marker, style) = match step_status(step, state) {
            StepStatus::Completed => ("✓", Style::default().fg(palette.success)),
            StepStatus::Current => (
                "●",
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
            StepStatus::Pending => ("○", Style::default().fg(palette.muted)),
        };
        spans.push(Span::styled(
            format!(" {} {}. {} ", marker, step.number(), step.title()),
            style,
        ));
    }
    Line::from(spans)
}

/// Label, value and optional error line for every field. Returns the lines
/// and the index of the focused field's value line.
fn form_lines<F: FormField>(form: &FormState<F>, palette: &Palette) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut focus_line = 0;

    for &field in F::ALL {
        let focused = field == form.focus();
        let marker = if field.required() { " *" } else { " (optional)" };
        lines.push(Line::from(vec![
            Span::styled(
                field.label().to_string(),
                Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(marker.to_string(), Style::default().fg(palette.muted)),
        ]));

        if focused {
            focus_line = lines.len();
        }
        let raw = form.value(field);
        let value = if raw.is_empty() {
            Span::styled(field.placeholder().to_string(), Style::default().fg(palette.muted))
        } else if field.is_choice() {
            Span::raw(format!("‹ {} ›", field.display(raw)))
        } else {
            Span::raw(field.display(raw))
        };
        let mut value_line = vec![Span::raw(if focused { "▸ " } else { "  " })];
        value_line.push(value);
        if focused && !field.is_choice() {
            value_line.push(Span::raw("_"));
        }
        let style = if focused {
            Style::default().fg(palette.focus_fg).bg(palette.focus_bg)
        } else {
            Style::default()
        };
        lines.push(Line::from(value_line).style(style));

        if let Some(message) = form.error(field) {
            lines.push(Line::from(Span::styled(
                format!("  ✗ {}", message),
                Style::default().fg(palette.error),
            )));
        }
    }

    (lines, focus_line)
}

/// Renders form lines, scrolled so the focused field stays visible.
fn render_form_lines(
    f: &mut Frame,
    lines: Vec<Line<'static>>,
    focus_line: usize,
    palette: &Palette,
    area: Rect,
) {
    let height = area.height as usize;
    let offset = (focus_line + 3).saturating_sub(height);
    let paragraph = Paragraph::new(lines)
        .style(palette.base())
        .scroll((offset as u16, 0));
    f.render_widget(paragraph, area);
}

fn render_personal(f: &mut Frame, view: &PersonalInfoStep, palette: &Palette, area: Rect) {
    let (lines, focus_line) = form_lines(view.form(), palette);
    render_form_lines(f, lines, focus_line, palette, area);
}

fn render_employment(f: &mut Frame, view: &EmploymentInfoStep, palette: &Palette, area: Rect) {
    let (mut lines, focus_line) = form_lines(view.form(), palette);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Annual salary and monthly income update each other as you type.",
        Style::default().fg(palette.muted),
    )));
    render_form_lines(f, lines, focus_line, palette, area);
}

fn render_loan(f: &mut Frame, view: &LoanDetailsStep, palette: &Palette, area: Rect) {
    let (mut lines, focus_line) = form_lines(view.form(), palette);
    if let Some(payment) = view.monthly_payment() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("Estimated monthly payment: "),
            Span::styled(
                format_currency(payment),
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            "Based on 5% APR. Actual rates may vary.",
            Style::default().fg(palette.muted),
        )));
    }
    render_form_lines(f, lines, focus_line, palette, area);
}

fn summary_row(label: &str, value: String, palette: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<20}", label), Style::default().fg(palette.muted)),
        Span::raw(value),
    ])
}

fn section(title: &str, palette: &Palette) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
    ))
}

fn text_or_blank(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn money_or_blank(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_default()
}

fn render_review(
    f: &mut Frame,
    view: &ReviewStep,
    state: &WizardState,
    palette: &Palette,
    area: Rect,
) {
    match view.phase() {
        ReviewPhase::Submitting { .. } => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Submitting your application...",
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "This will only take a moment.",
                    Style::default().fg(palette.muted),
                )),
            ];
            f.render_widget(
                Paragraph::new(lines).alignment(Alignment::Center).style(palette.base()),
                area,
            );
        }
        ReviewPhase::Submitted { .. } => render_success(f, palette, area),
        ReviewPhase::Editing => {
            let lines = review_lines(view, state, palette);
            f.render_widget(
                Paragraph::new(lines).wrap(Wrap { trim: false }).style(palette.base()),
                area,
            );
        }
    }
}

fn review_lines(view: &ReviewStep, state: &WizardState, palette: &Palette) -> Vec<Line<'static>> {
    let personal = &state.personal_info;
    let employment = &state.employment_info;
    let loan = &state.loan_details;

    let mut lines = vec![
        Line::from(Span::styled(
            "Please review all your information before submitting your application.",
            Style::default().fg(palette.muted),
        )),
        Line::from(""),
        section("Personal Information", palette),
        summary_row(
            "Name",
            format!("{} {}", text_or_blank(&personal.first_name), text_or_blank(&personal.last_name)),
            palette,
        ),
        summary_row("Email", text_or_blank(&personal.email), palette),
        summary_row("Phone", text_or_blank(&personal.phone), palette),
        summary_row(
            "Address",
            format!(
                "{}, {}, {} {}",
                text_or_blank(&personal.address),
                text_or_blank(&personal.city),
                text_or_blank(&personal.state),
                text_or_blank(&personal.zip_code)
            ),
            palette,
        ),
        Line::from(""),
        section("Employment Information", palette),
        summary_row("Employer", text_or_blank(&employment.employer), palette),
        summary_row("Position", text_or_blank(&employment.position), palette),
        summary_row(
            "Employment Type",
            employment
                .employment_type
                .map(|t| t.label().to_string())
                .unwrap_or_default(),
            palette,
        ),
        summary_row(
            "Years Employed",
            employment
                .years_employed
                .map(|y| format!("{} years", y))
                .unwrap_or_default(),
            palette,
        ),
        summary_row("Annual Salary", money_or_blank(employment.annual_salary), palette),
        summary_row("Monthly Income", money_or_blank(employment.monthly_income), palette),
        Line::from(""),
        section("Loan Details", palette),
        summary_row("Loan Amount", money_or_blank(loan.loan_amount), palette),
        summary_row(
            "Loan Purpose",
            loan.loan_purpose
                .map(|p| p.label().to_string())
                .unwrap_or_default(),
            palette,
        ),
        summary_row(
            "Loan Term",
            loan.loan_term.map(loan_term_label).unwrap_or_default(),
            palette,
        ),
    ];

    if let Some(down) = loan.down_payment {
        lines.push(summary_row("Down Payment", format_currency(down), palette));
    }
    if let (Some(amount), Some(term)) = (loan.loan_amount, loan.loan_term) {
        lines.push(summary_row(
            "Est. Monthly Payment",
            format_currency(estimate_monthly_payment(amount, loan.down_payment, term)),
            palette,
        ));
    }

    let checkbox = if view.terms_accepted() { "[x]" } else { "[ ]" };
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("{} ", checkbox),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Span::raw(
            "I agree to the terms and conditions and privacy policy. I certify that the \
             information provided is accurate and complete.",
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "Space: toggle agreement | Enter: submit application",
        Style::default().fg(palette.muted),
    )));
    lines
}

fn render_success(f: &mut Frame, palette: &Palette, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "✓ Application Submitted Successfully!",
            Style::default().fg(palette.success).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(
            "Thank you for your application. We'll review your information and get back to you \
             within 2-3 business days.",
        ),
        Line::from(""),
        Line::from(Span::styled(
            "You will receive a confirmation email shortly with your application reference number.",
            Style::default().fg(palette.muted),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start a new application",
            Style::default().fg(palette.accent),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .style(palette.base()),
        area,
    );
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_alert_popup(f: &mut Frame, alert: &SubmissionError, palette: &Palette) {
    let mut lines = vec![Line::from(alert.to_string())];
    if let SubmissionError::Invalid(errors) = alert {
        lines.push(Line::from(""));
        for error in errors.iter().take(5) {
            lines.push(Line::from(Span::styled(
                format!("• {}: {}", error.field, error.message),
                Style::default().fg(palette.error),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to continue",
        Style::default().fg(palette.muted),
    )));

    let popup_area = centered_rect(60, lines.len() as u16 + 4, f.area());
    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Notice")
                .style(Style::default().fg(palette.error).bg(palette.bg)),
        )
        .style(palette.base());
    f.render_widget(popup, popup_area);
}

fn render_status_bar(f: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let text = match (app.mode, app.status_message.as_ref()) {
        (AppMode::Help, _) => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        (AppMode::Normal, Some(status)) => status.clone(),
        (AppMode::Normal, None) => match (app.screen(), app.view()) {
            (Screen::Landing, _) => {
                "Enter: start | t: theme | F1/?: help | q: quit".to_string()
            }
            (Screen::Wizard, StepView::ReviewSubmit(_)) => {
                "Space: terms | Enter: submit | Esc: back | Ctrl+T: theme | Ctrl+R: reset | F1: help | Ctrl+Q: quit"
                    .to_string()
            }
            (Screen::Wizard, _) => {
                "Tab/↑↓: field | ←→: option | Enter: continue | Esc: back | Ctrl+T: theme | Ctrl+R: reset | F1: help | Ctrl+Q: quit"
                    .to_string()
            }
        },
    };

    let style = match app.mode {
        AppMode::Normal => palette.base(),
        AppMode::Help => Style::default().fg(palette.accent).bg(palette.bg),
    };
    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize, palette: &Palette) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "pyramyd Help (Line {}/{})",
                    start_line + 1,
                    help_lines.len()
                ))
                .style(Style::default().fg(palette.accent).bg(palette.bg)),
        )
        .style(palette.base());

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"PYRAMYD LOAN APPLICATION

=== THE STEPS ===
1. Personal Information    Name, contact details and address
2. Employment & Income     Employer, position, years employed and income
3. Loan Details            Amount, purpose, term and optional down payment
4. Review & Submit         Check everything, accept the terms and submit

A step is only completed once every field on it is valid. Fields marked *
are required. Your answers are saved after each completed step, so you can
quit and pick up where you left off.

=== LANDING PAGE ===
Enter / s       Start (or resume) the application
t               Toggle light/dark theme
F1 / ?          Show this help
q / Esc         Quit

=== FORM STEPS ===
Tab / Down      Next field
Shift+Tab / Up  Previous field
Left / Right    Change the selected option (employment type, purpose, term)
Type            Enter text into the selected field
Backspace       Delete the last character
Enter           Continue to the next step
Esc             Back to the previous step (unsaved edits are discarded)

=== REVIEW & SUBMIT ===
Space           Agree / disagree with the terms and conditions
Enter           Submit the application
Esc             Back to loan details
Enter / n       Start a new application after a successful submission

=== ANYWHERE ===
Ctrl+T          Toggle light/dark theme
Ctrl+R          Clear the application and start over
F1              Show this help
Ctrl+Q / Ctrl+C Quit

=== VALIDATION ===
• Email must look like name@example.com
• Phone numbers need at least 10 digits, any formatting
• ZIP codes are 12345 or 12345-6789
• Income fields accept $ and , and update each other
• Loans start at $1,000; terms run 12 to 360 months
• Leave the down payment empty if there is none

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{MemoryStore, SubmissionTiming};
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(120, 50);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    fn new_app() -> App {
        let store = MemoryStore::default();
        App::new(
            Box::new(store.clone()),
            Box::new(store),
            Theme::Light,
            SubmissionTiming::default(),
        )
    }

    #[test]
    fn test_landing_screen() {
        let app = new_app();
        let screen = render_to_string(&app);
        assert!(screen.contains("Apply for a Loan"));
        assert!(screen.contains("Press Enter to start"));
    }

    #[test]
    fn test_first_step_shows_fields_and_progress() {
        let mut app = new_app();
        app.start_application();
        let screen = render_to_string(&app);
        assert!(screen.contains("Personal Information"));
        assert!(screen.contains("Email Address"));
        assert!(screen.contains("0% complete"));
        assert!(screen.contains("Step 1 of 4"));
    }

    #[test]
    fn test_help_popup() {
        let mut app = new_app();
        app.show_help();
        let screen = render_to_string(&app);
        assert!(screen.contains("pyramyd Help"));
        assert!(get_help_text().lines().count() > 10);
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(
            Palette::for_theme(Theme::Light).bg,
            Palette::for_theme(Theme::Dark).bg
        );
    }
}
