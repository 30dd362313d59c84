//! Domain rules for a student record.
use chrono::{DateTime, Utc};
use shared::StudentRecord;

use crate::backend::domain::commands::students::StudentCommand;

/// Generate a record ID from epoch milliseconds.
/// Example: 1718300000123
pub fn generate_id(epoch_millis: i64) -> String {
    epoch_millis.to_string()
}

/// Amount due for the whole plan
pub fn total_payment(payment_amount: f64, total_months: u32) -> f64 {
    payment_amount * f64::from(total_months)
}

/// Recompute month count, plan label and total payment from the plan and amount.
pub fn apply_derived_fields(record: &mut StudentRecord) {
    record.total_months = record.payment_months.total_months();
    record.payment_months_text = record.payment_months.label();
    record.total_payment = total_payment(record.payment_amount, record.total_months);
}

/// Build a record from a validated command
pub fn build_record(id: String, command: StudentCommand, now: DateTime<Utc>) -> StudentRecord {
    let mut record = StudentRecord {
        id,
        full_name: command.full_name,
        grade: command.grade,
        gender: command.gender,
        registration_date: command.registration_date,
        payment_months: command.payment_plan,
        payment_months_text: String::new(),
        total_months: 0,
        payment_amount: command.payment_amount,
        total_payment: 0.0,
        payment_status_value: command.payment_status,
        last_updated: now,
    };
    apply_derived_fields(&mut record);
    record
}
