//! Core data types for the login/extract/report pipeline.

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Serialize;

use crate::amount::parse_locale_amount;

/// Bankin account credentials. The password is wrapped in
/// [`SecretString`] so it never shows up in logs or debug output.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: SecretString) -> Self {
        Self {
            email: email.into(),
            password,
        }
    }
}

/// Outcome of a login attempt. Always produced, never thrown past the
/// orchestrator: failures carry a best-effort current URL and a message.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub success: bool,
    pub current_url: String,
    pub message: String,
}

impl LoginResult {
    pub fn failure(current_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            current_url: current_url.into(),
            message: message.into(),
        }
    }
}

/// One report page: the expenses view or the income view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportView {
    /// Short name used in logs and messages.
    pub label: &'static str,
    pub url: &'static str,
}

/// Expenses report view.
pub const EXPENSES_VIEW: ReportView = ReportView {
    label: "expenses",
    url: crate::config::EXPENSES_URL,
};

/// Income report view.
pub const INCOMES_VIEW: ReportView = ReportView {
    label: "income",
    url: crate::config::INCOMES_URL,
};

/// One side (expenses or income) of the monthly summary.
///
/// `total` keeps the locale-formatted string exactly as displayed on the
/// page; `month` is the label actually selected, which can differ from
/// the requested target when the fallback to the active month kicks in.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialFigure {
    pub success: bool,
    pub total: String,
    pub month: String,
    pub message: String,
}

impl FinancialFigure {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            total: "0.00 €".to_string(),
            month: String::new(),
            message: message.into(),
        }
    }
}

/// Monthly summary derived from the two extracted figures.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub success: bool,
    pub month: String,
    pub expenses: String,
    pub revenues: String,

    /// Income minus expenses; only present when both extractions
    /// succeeded.
    pub net_balance: Option<Decimal>,

    /// Failure detail when one of the figures is missing.
    pub message: Option<String>,
}

impl FinancialSummary {
    pub fn new(expenses: &FinancialFigure, incomes: &FinancialFigure) -> Self {
        let success = expenses.success && incomes.success;

        let net_balance = success
            .then(|| parse_locale_amount(&incomes.total) - parse_locale_amount(&expenses.total));

        let month = if !expenses.month.is_empty() {
            expenses.month.clone()
        } else {
            incomes.month.clone()
        };

        let message = (!success).then(|| {
            [expenses, incomes]
                .iter()
                .filter(|figure| !figure.success)
                .map(|figure| figure.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        });

        Self {
            success,
            month,
            expenses: expenses.total.clone(),
            revenues: incomes.total.clone(),
            net_balance,
            message,
        }
    }

    /// Net balance rendered with two decimal places, e.g. `"800.00"`.
    pub fn net_balance_display(&self) -> Option<String> {
        self.net_balance.map(|net| format!("{net:.2}"))
    }
}
