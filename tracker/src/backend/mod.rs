//! # Backend Module
//!
//! Contains all non-UI logic for the student tracker.
//!
//! - **Domain**: the record store, filtering, statistics and form rules
//! - **Storage**: durable key-value storage and configuration
//! - **IO**: the controller front ends drive, and the presenter trait they implement
//!
//! All operations are synchronous; every user action runs to completion
//! before the next one starts.

pub mod domain;
pub mod storage;
pub mod io;

use crate::backend::domain::{
    ExportService, MoneyManagementConfig, MoneyManagementService, StatisticsService, StudentService,
    StudentTableService,
};
use crate::backend::storage::{Connection, TrackerConfig};

/// Main backend struct that holds all services
pub struct Backend<C: Connection> {
    pub student_service: StudentService<C>,
    pub student_table_service: StudentTableService,
    pub statistics_service: StatisticsService,
    pub money_management_service: MoneyManagementService,
    pub export_service: ExportService,
    pub config: TrackerConfig,
}

impl<C: Connection> Backend<C> {
    /// Create a backend with all services wired to `connection`
    pub fn new(connection: &C, config: TrackerConfig) -> Self {
        let money_config = MoneyManagementConfig {
            amount_step: config.amount_step,
            ..MoneyManagementConfig::default()
        };

        Backend {
            student_service: StudentService::new(connection, &config),
            student_table_service: StudentTableService::new(),
            statistics_service: StatisticsService::new(),
            money_management_service: MoneyManagementService::with_config(money_config),
            export_service: ExportService::new(),
            config,
        }
    }
}
