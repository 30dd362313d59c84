//! Money management domain logic for the student tracker.
//!
//! This module contains the rules for the payment amount field and the
//! student form: normalizing typed amounts, the increment/decrement
//! controls, and validating a submission before it reaches the store. The
//! UI only handles presentation; these rules live here.
//!
//! ## Amount normalization
//!
//! - thousands separators are stripped, and re-inserted on output
//! - a leading minus sign clamps the value to `0`
//! - any other character except digits and the first decimal point is dropped
//! - fractional digits beyond two are truncated, not rounded

use chrono::NaiveDate;
use log::debug;
use shared::{PaymentStatus, StudentFormInput, StudentRecord};

use crate::backend::domain::commands::students::StudentCommand;
use crate::backend::domain::models::errors::ValidationError;

/// Configuration for amount handling
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyManagementConfig {
    /// Step applied by the increment/decrement controls
    pub amount_step: f64,
    pub max_fraction_digits: usize,
}

impl Default for MoneyManagementConfig {
    fn default() -> Self {
        Self {
            amount_step: 10.0,
            max_fraction_digits: 2,
        }
    }
}

/// Money management service that handles amount input and form validation
#[derive(Clone, Debug, Default)]
pub struct MoneyManagementService {
    config: MoneyManagementConfig,
}

impl MoneyManagementService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MoneyManagementConfig) -> Self {
        Self { config }
    }

    /// Normalize raw amount text as the user types it.
    ///
    /// `"1,234.567"` becomes `"1,234.56"` and `"-5"` becomes `"0"`.
    pub fn normalize_amount_input(&self, raw: &str) -> String {
        let without_separators: String = raw.trim().chars().filter(|c| *c != ',').collect();
        if without_separators.starts_with('-') {
            return "0".to_string();
        }

        let mut integer_digits = String::new();
        let mut fraction_digits = String::new();
        let mut seen_point = false;
        for c in without_separators.chars() {
            match c {
                '0'..='9' if seen_point => fraction_digits.push(c),
                '0'..='9' => integer_digits.push(c),
                '.' => seen_point = true,
                _ => {}
            }
        }
        fraction_digits.truncate(self.config.max_fraction_digits);

        let integer_part = if integer_digits.is_empty() {
            if seen_point { "0".to_string() } else { String::new() }
        } else {
            let trimmed = integer_digits.trim_start_matches('0');
            group_thousands(if trimmed.is_empty() { "0" } else { trimmed })
        };

        if seen_point {
            format!("{}.{}", integer_part, fraction_digits)
        } else {
            integer_part
        }
    }

    /// Numeric value of amount text; separators are ignored, invalid text is `None`
    pub fn parse_amount(&self, text: &str) -> Option<f64> {
        let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return None;
        }
        cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
    }

    pub fn increment_amount(&self, text: &str) -> String {
        self.step_amount(text, self.config.amount_step)
    }

    /// Decrease by one step, never below zero
    pub fn decrement_amount(&self, text: &str) -> String {
        self.step_amount(text, -self.config.amount_step)
    }

    fn step_amount(&self, text: &str, delta: f64) -> String {
        let current = self.parse_amount(text).unwrap_or(0.0);
        let next = (current + delta).max(0.0);
        debug!("Amount stepped from {} to {}", current, next);
        format_amount_with_separators(next)
    }

    /// Validate a form submission, checking fields in form order.
    ///
    /// The amount is normalized before it is parsed, so the stored amount
    /// never carries more than two fractional digits.
    pub fn validate_student_form(&self, input: &StudentFormInput) -> Result<StudentCommand, ValidationError> {
        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::EmptyFullName);
        }

        let grade = input.grade.trim();
        if grade.is_empty() {
            return Err(ValidationError::MissingGrade);
        }

        let date_text = input.registration_date.trim();
        if date_text.is_empty() {
            return Err(ValidationError::MissingRegistrationDate);
        }
        let registration_date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidRegistrationDate(date_text.to_string()))?;

        let payment_plan = input.payment_plan.ok_or(ValidationError::MissingPaymentPlan)?;

        let normalized = self.normalize_amount_input(&input.amount_input);
        let payment_amount = self.parse_amount(&normalized).unwrap_or(0.0);
        if payment_amount <= 0.0 {
            return Err(ValidationError::AmountNotPositive);
        }

        Ok(StudentCommand {
            full_name: full_name.to_string(),
            grade: grade.to_string(),
            gender: input.gender,
            registration_date,
            payment_plan,
            payment_amount,
            payment_status: input.payment_status,
        })
    }

    /// Form contents for editing an existing record
    pub fn form_from_record(&self, record: &StudentRecord) -> StudentFormInput {
        StudentFormInput {
            full_name: record.full_name.clone(),
            grade: record.grade.clone(),
            registration_date: record.registration_date.format("%Y-%m-%d").to_string(),
            payment_plan: Some(record.payment_months),
            payment_status: record.payment_status_value,
            amount_input: if record.payment_amount > 0.0 {
                format_amount_with_separators(record.payment_amount)
            } else {
                String::new()
            },
            gender: record.gender,
        }
    }

    /// Empty form as shown after a submit or cancel
    pub fn blank_form(&self, today: NaiveDate) -> StudentFormInput {
        StudentFormInput {
            registration_date: today.format("%Y-%m-%d").to_string(),
            payment_status: PaymentStatus::Paid,
            ..StudentFormInput::default()
        }
    }
}

/// Two decimals with thousands separators, e.g. `1,234.50`
pub fn format_amount_with_separators(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.max(0.0));
    match fixed.split_once('.') {
        Some((integer, fraction)) => format!("{}.{}", group_thousands(integer), fraction),
        None => group_thousands(&fixed),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, c) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
