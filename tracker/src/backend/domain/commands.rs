//! Domain-level command types.
//! Front ends collect raw `StudentFormInput` from the `shared` crate;
//! `MoneyManagementService::validate_student_form` turns it into these
//! validated commands before the student service sees them.

pub mod students {
    use chrono::NaiveDate;
    use shared::{Gender, PaymentPlan, PaymentStatus};

    /// Validated input for creating or editing a student.
    #[derive(Debug, Clone, PartialEq)]
    pub struct StudentCommand {
        pub full_name: String,
        pub grade: String,
        pub gender: Gender,
        pub registration_date: NaiveDate,
        pub payment_plan: PaymentPlan,
        /// Normalized amount, at most two fractional digits
        pub payment_amount: f64,
        pub payment_status: PaymentStatus,
    }
}
