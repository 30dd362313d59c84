//! Presentation boundary.
use shared::{NotificationSeverity, StudentRecord, StudentStatistics};

/// Receives everything the controller wants shown. Calls are fire-and-forget.
pub trait Presenter {
    /// Show the filtered records, in order
    fn render_table(&mut self, records: &[StudentRecord]);

    /// Shown instead of the table when no record matches
    fn render_empty_state(&mut self);

    /// Statistics over every record, independent of filters
    fn render_stats(&mut self, stats: &StudentStatistics);

    fn notify(&mut self, message: &str, severity: NotificationSeverity);
}
