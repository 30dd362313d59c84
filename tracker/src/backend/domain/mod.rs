//! # Domain Module
//!
//! Contains all business logic for the student tracker.
//!
//! ## Module Organization
//!
//! - **student_service**: the record store; create, update, delete, status
//!   cycling and persistence of the student collection
//! - **student_table**: filtering and table row formatting
//! - **statistics_service**: counts and totals over every record
//! - **money_management**: amount input normalization and form validation
//! - **export_service**: JSON export of all records
//! - **commands**: validated inputs passed to the services
//! - **models**: record rules and error types
//!
//! ## Business Rules
//!
//! - Names, grades, registration dates and plans are required
//! - Amounts must be greater than zero, with at most two decimals
//! - Total payment is always amount × plan months, recomputed on every write
//! - Statistics cover the full collection regardless of filters
//! - Insertion order is the display order

pub mod student_service;
pub mod student_table;
pub mod statistics_service;
pub mod money_management;
pub mod export_service;
pub mod commands;
pub mod models;

pub use student_service::*;
pub use student_table::*;
pub use statistics_service::*;
pub use money_management::*;
pub use export_service::*;
pub use commands::*;
