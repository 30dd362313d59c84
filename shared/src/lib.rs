use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label stored for records whose plan covers no fixed month count
pub const UNSPECIFIED_PLAN_LABEL: &str = "Not specified";

/// One student's payment-tracking entry.
///
/// Field names serialize in camelCase so the JSON matches what the web
/// version of the tracker kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Millisecond timestamp at creation, as text
    pub id: String,
    pub full_name: String,
    /// Grade label as chosen in the form
    pub grade: String,
    pub gender: Gender,
    /// Calendar date, serialized as YYYY-MM-DD
    pub registration_date: NaiveDate,
    /// Selected plan, serialized as "all" or "option-N"
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_months: PaymentPlan,
    /// Plan label captured when the record was last written
    #[serde(default = "default_plan_label", deserialize_with = "label_or_unspecified")]
    pub payment_months_text: String,
    /// 0 for the "all" plan, the plan's month count otherwise
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_months: u32,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub payment_amount: f64,
    /// Always payment_amount * total_months
    #[serde(default, deserialize_with = "number_or_zero")]
    pub total_payment: f64,
    #[serde(default, deserialize_with = "status_or_unpaid")]
    pub payment_status_value: PaymentStatus,
    /// RFC 3339 timestamp of the last create/update/status change
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
}

fn default_plan_label() -> String {
    UNSPECIFIED_PLAN_LABEL.to_string()
}

/// Legacy records may carry `null` where a value is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn label_or_unspecified<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_plan_label))
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn status_or_unpaid<'de, D>(deserializer: D) -> Result<PaymentStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|value| value.parse().ok())
        .unwrap_or_default())
}

/// Tri-state payment completion indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    #[default]
    Unpaid,
}

impl PaymentStatus {
    /// Next status in the fixed cycle unpaid -> partial -> paid -> unpaid
    pub fn next(self) -> Self {
        match self {
            PaymentStatus::Unpaid => PaymentStatus::Partial,
            PaymentStatus::Partial => PaymentStatus::Paid,
            PaymentStatus::Paid => PaymentStatus::Unpaid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Unpaid => "unpaid",
        }
    }

    /// Human-readable label for tables and notifications
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid in full",
            PaymentStatus::Partial => "Partially paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "partial" => Ok(PaymentStatus::Partial),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn symbol(&self) -> &'static str {
        match self {
            Gender::Male => "♂",
            Gender::Female => "♀",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

/// Payment plan selected in the form.
///
/// Serialized as the form option identifier: `"all"` or
/// `"option-N"` where N is the month count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentPlan {
    #[default]
    All,
    Months(u32),
}

impl PaymentPlan {
    /// Largest month count offered as a plan option
    pub const MAX_MONTHS: u32 = 12;

    /// Create a fixed-month plan, rejecting counts outside 1..=12
    pub fn months(count: u32) -> Option<Self> {
        if (1..=Self::MAX_MONTHS).contains(&count) {
            Some(PaymentPlan::Months(count))
        } else {
            None
        }
    }

    /// Month count used for the total payment (0 for "all")
    pub fn total_months(&self) -> u32 {
        match self {
            PaymentPlan::All => 0,
            PaymentPlan::Months(count) => *count,
        }
    }

    pub fn label(&self) -> String {
        match self {
            PaymentPlan::All => UNSPECIFIED_PLAN_LABEL.to_string(),
            PaymentPlan::Months(1) => "1 month".to_string(),
            PaymentPlan::Months(count) => format!("{} months", count),
        }
    }

    pub fn option_id(&self) -> String {
        match self {
            PaymentPlan::All => "all".to_string(),
            PaymentPlan::Months(count) => format!("option-{}", count),
        }
    }
}

impl FromStr for PaymentPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(PaymentPlan::All);
        }
        let count = trimmed
            .strip_prefix("option-")
            .unwrap_or(trimmed)
            .parse::<u32>()
            .map_err(|_| format!("Invalid payment plan: {}", s))?;
        PaymentPlan::months(count).ok_or_else(|| format!("Plan month count out of range: {}", count))
    }
}

impl TryFrom<String> for PaymentPlan {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentPlan> for String {
    fn from(plan: PaymentPlan) -> Self {
        plan.option_id()
    }
}

/// Payment-status filter options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Partial,
    Unpaid,
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        Ok(match s.parse::<PaymentStatus>()? {
            PaymentStatus::Paid => StatusFilter::Paid,
            PaymentStatus::Partial => StatusFilter::Partial,
            PaymentStatus::Unpaid => StatusFilter::Unpaid,
        })
    }
}

/// Payment-type filter: monthly plans cover 1..=9 months, yearly 10 or more
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentTypeFilter {
    #[default]
    All,
    Monthly,
    Yearly,
}

impl FromStr for PaymentTypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(PaymentTypeFilter::All),
            "monthly" => Ok(PaymentTypeFilter::Monthly),
            "yearly" => Ok(PaymentTypeFilter::Yearly),
            other => Err(format!("Unknown payment type: {}", other)),
        }
    }
}

/// Registration-month filter, serialized as `"all"` or the month number as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MonthFilter {
    #[default]
    All,
    /// Calendar month, 1 = January
    Month(u32),
}

impl MonthFilter {
    pub fn month(month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(MonthFilter::Month(month))
        } else {
            None
        }
    }
}

impl FromStr for MonthFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(MonthFilter::All);
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(MonthFilter::month)
            .ok_or_else(|| format!("Month must be 'all' or 1-12, got: {}", s))
    }
}

impl TryFrom<String> for MonthFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthFilter> for String {
    fn from(filter: MonthFilter) -> Self {
        match filter {
            MonthFilter::All => "all".to_string(),
            MonthFilter::Month(month) => month.to_string(),
        }
    }
}

/// Criteria applied by the student table filter. All four must match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_text: String,
    pub payment_status: StatusFilter,
    pub payment_type: PaymentTypeFilter,
    pub month: MonthFilter,
}

/// Aggregate statistics over every stored record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStatistics {
    pub total: usize,
    pub paid_count: usize,
    pub partial_count: usize,
    pub unpaid_count: usize,
    pub total_payments: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationSeverity {
    Info,
    Success,
    Error,
}

/// Raw form input as typed by the user, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFormInput {
    pub full_name: String,
    pub grade: String,
    /// YYYY-MM-DD as entered
    pub registration_date: String,
    /// None when no plan option is selected
    pub payment_plan: Option<PaymentPlan>,
    pub payment_status: PaymentStatus,
    /// Amount text, possibly with thousands separators
    pub amount_input: String,
    pub gender: Gender,
}

impl Default for StudentFormInput {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            grade: String::new(),
            registration_date: String::new(),
            payment_plan: None,
            payment_status: PaymentStatus::Paid,
            amount_input: String::new(),
            gender: Gender::Male,
        }
    }
}

/// JSON export produced on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDataResponse {
    /// Pretty-printed JSON array of every record
    pub json_content: String,
    /// students_<YYYY-MM-DD>.json
    pub filename: String,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub record_count: usize,
}
