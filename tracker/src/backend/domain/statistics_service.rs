//! Statistics over the whole student collection.
//!
//! Statistics always describe every stored record; the table filter never
//! affects them.

use log::debug;
use shared::{PaymentStatus, StudentRecord, StudentStatistics};

use crate::backend::domain::money_management::format_amount_with_separators;

#[derive(Clone, Debug, Default)]
pub struct StatisticsService;

impl StatisticsService {
    pub fn new() -> Self {
        Self
    }

    /// Count records per payment status and sum their total payments in one pass
    pub fn aggregate(&self, records: &[StudentRecord]) -> StudentStatistics {
        let stats = records.iter().fold(StudentStatistics::default(), |mut stats, record| {
            stats.total += 1;
            match record.payment_status_value {
                PaymentStatus::Paid => stats.paid_count += 1,
                PaymentStatus::Partial => stats.partial_count += 1,
                PaymentStatus::Unpaid => stats.unpaid_count += 1,
            }
            if record.total_payment.is_finite() {
                stats.total_payments += record.total_payment;
            }
            stats
        });

        debug!("Statistics updated: {:?}", stats);
        stats
    }

    /// Total payments as shown on the statistics panel, e.g. `12,500.00`
    pub fn format_total_payments(&self, stats: &StudentStatistics) -> String {
        format_amount_with_separators(stats.total_payments)
    }
}
