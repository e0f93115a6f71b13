//! Loan arithmetic used by the loan-details and review steps.
//!
//! Nothing here touches wizard state: the functions take plain numbers so the
//! step views can call them on every keystroke.

/// Fixed annual rate used for the monthly payment estimate.
pub const ANNUAL_INTEREST_RATE: f64 = 0.05;

pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Amortized monthly payment for `principal` over `months` at `annual_rate`.
///
/// A zero rate degrades to straight division. Zero months yields zero
/// rather than dividing by zero.
///
/// # Examples
///
/// ```
/// use pyramyd::domain::amortized_payment;
///
/// assert_eq!(amortized_payment(1200.0, 0.0, 12), 100.0);
/// ```
pub fn amortized_payment(principal: f64, annual_rate: f64, months: u32) -> f64 {
    if months == 0 {
        return 0.0;
    }
    let n = f64::from(months);
    let r = annual_rate / MONTHS_PER_YEAR;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    principal * (r * growth) / (growth - 1.0)
}

/// Monthly payment estimate shown on the loan-details step, rounded to whole
/// currency units.
///
/// The principal is the loan amount minus the down payment, if any.
///
/// # Examples
///
/// ```
/// use pyramyd::domain::estimate_monthly_payment;
///
/// assert_eq!(estimate_monthly_payment(50_000.0, Some(10_000.0), 36), 1199.0);
/// ```
pub fn estimate_monthly_payment(loan_amount: f64, down_payment: Option<f64>, term_months: u32) -> f64 {
    let principal = loan_amount - down_payment.unwrap_or(0.0);
    amortized_payment(principal, ANNUAL_INTEREST_RATE, term_months).round()
}

/// Monthly income derived from an edited annual salary.
pub fn monthly_from_annual(annual_salary: f64) -> f64 {
    (annual_salary / MONTHS_PER_YEAR).round()
}

/// Annual salary derived from an edited monthly income.
pub fn annual_from_monthly(monthly_income: f64) -> f64 {
    monthly_income * MONTHS_PER_YEAR
}

/// Rounds to whole cents so derived amounts carry no float noise.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Formats an amount as US dollars with cents, e.g. `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let digits = dollars.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
