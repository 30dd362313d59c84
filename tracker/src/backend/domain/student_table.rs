//! Student table domain logic for the student tracker.
//!
//! This module holds the query engine behind the filterable table and the
//! formatting that turns records into display rows.
//!
//! ## Filtering
//!
//! A record is shown when all four criteria match:
//!
//! - **Search**: the lowercased search text occurs in the lowercased full
//!   name, or occurs in the grade label as written
//! - **Payment status**: `all`, or the record's status
//! - **Payment type**: `monthly` covers 1..=9 months, `yearly` 10 or more;
//!   the "all" plan (0 months) only matches `all`
//! - **Month**: `all`, or the month of the registration date
//!
//! Filtering never touches the source collection and keeps its order.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use shared::{
    FilterCriteria, MonthFilter, PaymentStatus, PaymentTypeFilter, StatusFilter, StudentRecord,
};
use std::fmt::Display;

use crate::backend::domain::money_management::format_amount_with_separators;

/// Plans of this many months or more count as yearly
pub const YEARLY_MIN_MONTHS: u32 = 10;

/// One table row, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedStudentRow {
    pub id: String,
    /// 1-based position in the rendered table
    pub row_number: usize,
    pub full_name: String,
    pub grade: String,
    pub gender_symbol: &'static str,
    pub formatted_registration_date: String,
    pub plan_label: String,
    pub formatted_amount: String,
    pub formatted_total: String,
    pub status_label: &'static str,
    pub formatted_last_updated: String,
    /// Tooltip for the status button
    pub status_action_hint: &'static str,
}

#[derive(Clone, Debug, Default)]
pub struct StudentTableService;

impl StudentTableService {
    pub fn new() -> Self {
        Self
    }

    /// Return copies of the records matching every criterion, in input order
    pub fn filter(&self, records: &[StudentRecord], criteria: &FilterCriteria) -> Vec<StudentRecord> {
        let search = criteria.search_text.to_lowercase();
        records
            .iter()
            .filter(|record| {
                matches_search(record, &search)
                    && matches_status(record.payment_status_value, criteria.payment_status)
                    && matches_payment_type(record.total_months, criteria.payment_type)
                    && matches_month(record.registration_date, criteria.month)
            })
            .cloned()
            .collect()
    }

    /// Criteria after a reset: everything cleared, and the month set to
    /// today's month when `use_current_month` is on
    pub fn reset_criteria(&self, use_current_month: bool, today: NaiveDate) -> FilterCriteria {
        FilterCriteria {
            month: if use_current_month {
                MonthFilter::Month(today.month())
            } else {
                MonthFilter::All
            },
            ..FilterCriteria::default()
        }
    }

    /// Format records for table display using the local time zone
    pub fn format_rows(&self, records: &[StudentRecord]) -> Vec<FormattedStudentRow> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.format_row(index + 1, record, &Local))
            .collect()
    }

    pub fn format_row<Tz>(&self, row_number: usize, record: &StudentRecord, tz: &Tz) -> FormattedStudentRow
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        FormattedStudentRow {
            id: record.id.clone(),
            row_number,
            full_name: record.full_name.clone(),
            grade: record.grade.clone(),
            gender_symbol: record.gender.symbol(),
            formatted_registration_date: self.format_registration_date(record.registration_date),
            plan_label: record.payment_months_text.clone(),
            formatted_amount: self.format_money_cell(record.payment_amount),
            formatted_total: self.format_money_cell(record.total_payment),
            status_label: record.payment_status_value.label(),
            formatted_last_updated: self.format_timestamp(&record.last_updated, tz),
            status_action_hint: status_action_hint(record.payment_status_value),
        }
    }

    /// d/m/yyyy
    pub fn format_registration_date(&self, date: NaiveDate) -> String {
        format!("{}/{}/{}", date.day(), date.month(), date.year())
    }

    /// Weekday, d Month yyyy - HH:MM
    pub fn format_timestamp<Tz>(&self, timestamp: &DateTime<Utc>, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        timestamp
            .with_timezone(tz)
            .format("%A, %-d %B %Y - %H:%M")
            .to_string()
    }

    /// Amount with thousands separators, or "-" when there is nothing to show
    pub fn format_money_cell(&self, amount: f64) -> String {
        if amount > 0.0 {
            format_amount_with_separators(amount)
        } else {
            "-".to_string()
        }
    }
}

fn matches_search(record: &StudentRecord, lowercase_search: &str) -> bool {
    lowercase_search.is_empty()
        || record.full_name.to_lowercase().contains(lowercase_search)
        || record.grade.contains(lowercase_search)
}

fn matches_status(status: PaymentStatus, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Paid => status == PaymentStatus::Paid,
        StatusFilter::Partial => status == PaymentStatus::Partial,
        StatusFilter::Unpaid => status == PaymentStatus::Unpaid,
    }
}

fn matches_payment_type(total_months: u32, filter: PaymentTypeFilter) -> bool {
    match filter {
        PaymentTypeFilter::All => true,
        PaymentTypeFilter::Monthly => (1..YEARLY_MIN_MONTHS).contains(&total_months),
        PaymentTypeFilter::Yearly => total_months >= YEARLY_MIN_MONTHS,
    }
}

fn matches_month(registration_date: NaiveDate, filter: MonthFilter) -> bool {
    match filter {
        MonthFilter::All => true,
        MonthFilter::Month(month) => registration_date.month() == month,
    }
}

fn status_action_hint(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "Change status to unpaid",
        _ => "Change status to paid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Gender, PaymentPlan};

    fn record(id: &str, name: &str, grade: &str, months: u32, status: PaymentStatus, month: u32) -> StudentRecord {
        let plan = PaymentPlan::months(months).unwrap_or(PaymentPlan::All);
        StudentRecord {
            id: id.to_string(),
            full_name: name.to_string(),
            grade: grade.to_string(),
            gender: Gender::Male,
            registration_date: NaiveDate::from_ymd_opt(2024, month, 5).unwrap(),
            payment_months: plan,
            payment_months_text: plan.label(),
            total_months: months,
            payment_amount: 100.0,
            total_payment: 100.0 * f64::from(months),
            payment_status_value: status,
            last_updated: Utc.with_ymd_and_hms(2024, 3, 8, 14, 5, 0).unwrap(),
        }
    }

    fn sample() -> Vec<StudentRecord> {
        vec![
            record("1", "Amira Hassan", "Grade 5", 1, PaymentStatus::Paid, 1),
            record("2", "Bilal Omar", "Grade 2", 9, PaymentStatus::Partial, 2),
            record("3", "Celine Fares", "KG 1", 10, PaymentStatus::Unpaid, 2),
            record("4", "Dana Khalil", "Grade 5", 0, PaymentStatus::Paid, 3),
        ]
    }

    fn ids(records: &[StudentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_default_criteria_returns_everything_in_order() {
        let service = StudentTableService::new();
        let records = sample();

        let filtered = service.filter(&records, &FilterCriteria::default());

        assert_eq!(filtered, records);
    }

    #[test]
    fn test_payment_type_boundaries() {
        let service = StudentTableService::new();
        let records = sample();
        let monthly = FilterCriteria {
            payment_type: PaymentTypeFilter::Monthly,
            ..FilterCriteria::default()
        };
        let yearly = FilterCriteria {
            payment_type: PaymentTypeFilter::Yearly,
            ..FilterCriteria::default()
        };

        assert_eq!(ids(&service.filter(&records, &monthly)), vec!["1", "2"]);
        assert_eq!(ids(&service.filter(&records, &yearly)), vec!["3"]);
    }

    #[test]
    fn test_search_is_case_insensitive_on_name() {
        let service = StudentTableService::new();
        let criteria = FilterCriteria {
            search_text: "BILAL".to_string(),
            ..FilterCriteria::default()
        };

        assert_eq!(ids(&service.filter(&sample(), &criteria)), vec!["2"]);
    }

    #[test]
    fn test_search_matches_grade_substring() {
        let service = StudentTableService::new();
        let criteria = FilterCriteria {
            search_text: "5".to_string(),
            ..FilterCriteria::default()
        };

        assert_eq!(ids(&service.filter(&sample(), &criteria)), vec!["1", "4"]);
    }

    #[test]
    fn test_status_and_month_combine() {
        let service = StudentTableService::new();
        let criteria = FilterCriteria {
            payment_status: StatusFilter::Partial,
            month: MonthFilter::Month(2),
            ..FilterCriteria::default()
        };

        assert_eq!(ids(&service.filter(&sample(), &criteria)), vec!["2"]);

        let none = FilterCriteria {
            payment_status: StatusFilter::Paid,
            month: MonthFilter::Month(2),
            ..FilterCriteria::default()
        };
        assert!(service.filter(&sample(), &none).is_empty());
    }

    #[test]
    fn test_filter_leaves_source_untouched() {
        let service = StudentTableService::new();
        let records = sample();
        let criteria = FilterCriteria {
            payment_status: StatusFilter::Unpaid,
            ..FilterCriteria::default()
        };

        let _ = service.filter(&records, &criteria);

        assert_eq!(records, sample());
    }

    #[test]
    fn test_reset_criteria() {
        let service = StudentTableService::new();
        let today = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();

        assert_eq!(service.reset_criteria(true, today).month, MonthFilter::Month(11));
        assert_eq!(service.reset_criteria(false, today), FilterCriteria::default());
    }

    #[test]
    fn test_format_row() {
        let service = StudentTableService::new();
        let mut student = record("7", "Farah Nasser", "Grade 1", 12, PaymentStatus::Paid, 6);
        student.payment_amount = 1250.0;
        student.total_payment = 15000.0;
        student.gender = Gender::Female;

        let row = service.format_row(3, &student, &Utc);

        assert_eq!(row.row_number, 3);
        assert_eq!(row.gender_symbol, "♀");
        assert_eq!(row.formatted_registration_date, "5/6/2024");
        assert_eq!(row.plan_label, "12 months");
        assert_eq!(row.formatted_amount, "1,250.00");
        assert_eq!(row.formatted_total, "15,000.00");
        assert_eq!(row.status_label, "Paid in full");
        assert_eq!(row.formatted_last_updated, "Friday, 8 March 2024 - 14:05");
        assert_eq!(row.status_action_hint, "Change status to unpaid");
    }

    #[test]
    fn test_zero_total_shows_dash() {
        let service = StudentTableService::new();
        let row = service.format_row(1, &record("8", "Zaid", "Grade 3", 0, PaymentStatus::Unpaid, 1), &Utc);

        assert_eq!(row.formatted_total, "-");
        assert_eq!(row.status_action_hint, "Change status to paid");
    }
}
