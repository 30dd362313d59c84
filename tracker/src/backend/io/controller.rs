//! # Student Controller
//!
//! Drives the presenter from user actions. Every action mutates the store
//! through the backend services, then re-renders the table and statistics.
//!
//! ## Flow
//! 1. `start()` loads the saved collection and renders it
//! 2. Form submits go through validation before they reach the store
//! 3. Deletes and clear-all are two-step: request, then confirm or cancel
//! 4. Save failures surface as error notifications; the in-memory change stays

use chrono::NaiveDate;
use log::{error, info, warn};
use shared::{
    ExportToPathResponse, FilterCriteria, NotificationSeverity, StudentFormInput, StudentRecord,
    StudentStatistics,
};
use std::path::Path;

use crate::backend::domain::models::{LoadError, StoreError, ValidationError};
use crate::backend::io::Presenter;
use crate::backend::storage::Connection;
use crate::backend::Backend;

pub struct StudentController<C: Connection, P: Presenter> {
    backend: Backend<C>,
    presenter: P,
    criteria: FilterCriteria,
    /// Id of the record loaded into the form, if editing
    editing_id: Option<String>,
    /// Id waiting for delete confirmation
    pending_delete_id: Option<String>,
}

impl<C: Connection, P: Presenter> StudentController<C, P> {
    pub fn new(backend: Backend<C>, presenter: P) -> Self {
        Self {
            backend,
            presenter,
            criteria: FilterCriteria::default(),
            editing_id: None,
            pending_delete_id: None,
        }
    }

    /// Load saved records and render the first view.
    ///
    /// Missing data is a normal first run. Unreadable or corrupt data starts
    /// an empty collection and tells the user.
    pub fn start(&mut self, today: NaiveDate) {
        match self.backend.student_service.load_all() {
            Ok(records) => info!("🚀 START: Loaded {} students", records.len()),
            Err(LoadError::NoData) => info!("🚀 START: No saved students, starting empty"),
            Err(e) => {
                warn!("⚠️ START: {}", e);
                self.presenter
                    .notify("An error occurred while loading data", NotificationSeverity::Error);
            }
        }

        self.criteria = self
            .backend
            .student_table_service
            .reset_criteria(self.backend.config.reset_month_to_current, today);
        self.refresh();
    }

    /// Re-render the filtered table and the statistics panel
    pub fn refresh(&mut self) {
        let records = self.backend.student_service.records();
        let visible = self.backend.student_table_service.filter(records, &self.criteria);
        if visible.is_empty() {
            self.presenter.render_empty_state();
        } else {
            self.presenter.render_table(&visible);
        }

        let stats = self.backend.statistics_service.aggregate(records);
        self.presenter.render_stats(&stats);
    }

    /// Save the form as a new record, or over the record being edited.
    ///
    /// Validation failures are notified and returned so the form can keep its
    /// contents. Anything past validation ends the edit session.
    pub fn submit_record(&mut self, input: &StudentFormInput) -> Result<(), ValidationError> {
        let command = match self.backend.money_management_service.validate_student_form(input) {
            Ok(command) => command,
            Err(e) => {
                self.presenter.notify(&e.to_string(), NotificationSeverity::Error);
                return Err(e);
            }
        };

        let outcome = match self.editing_id.take() {
            Some(id) => match self.backend.student_service.update_student(&id, command) {
                Ok(_) => Ok("Student details updated successfully"),
                Err(StoreError::NotFound(missing)) => {
                    warn!("⚠️ SUBMIT: Record {} vanished while editing", missing);
                    Err("Student to update was not found".to_string())
                }
                Err(StoreError::Save(e)) => Err(e.to_string()),
            },
            None => self
                .backend
                .student_service
                .create_student(command)
                .map(|_| "Student added successfully")
                .map_err(|e| e.to_string()),
        };

        self.refresh();
        match outcome {
            Ok(message) => self.presenter.notify(message, NotificationSeverity::Success),
            Err(message) => self.presenter.notify(&message, NotificationSeverity::Error),
        }
        Ok(())
    }

    /// Enter edit mode for `id`, returning the form to pre-fill
    pub fn request_edit(&mut self, id: &str) -> Option<StudentFormInput> {
        let record = self.backend.student_service.find_by_id(id)?;
        let form = self.backend.money_management_service.form_from_record(record);
        self.editing_id = Some(record.id.clone());
        info!("✏️ EDIT: Editing {}", id);
        Some(form)
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    /// Stage a delete and return the confirmation prompt
    pub fn request_delete(&mut self, id: &str) -> Option<String> {
        let record = self.backend.student_service.find_by_id(id)?;
        let prompt = format!("Are you sure you want to delete {}?", record.full_name);
        self.pending_delete_id = Some(record.id.clone());
        Some(prompt)
    }

    pub fn pending_delete_id(&self) -> Option<&str> {
        self.pending_delete_id.as_deref()
    }

    /// Delete the staged record. Returns whether a record was removed.
    pub fn confirm_delete(&mut self) -> bool {
        let Some(id) = self.pending_delete_id.take() else {
            return false;
        };
        if self.editing_id.as_deref() == Some(id.as_str()) {
            self.editing_id = None;
        }

        match self.backend.student_service.remove(&id) {
            Ok(true) => {
                self.refresh();
                self.presenter
                    .notify("Student deleted successfully", NotificationSeverity::Success);
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.refresh();
                self.presenter.notify(&e.to_string(), NotificationSeverity::Error);
                true
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete_id = None;
    }

    /// Advance a record's status one step. Unknown ids do nothing.
    pub fn toggle_status(&mut self, id: &str) {
        match self.backend.student_service.cycle_status(id) {
            Ok(Some(status)) => {
                self.refresh();
                let message = format!("Payment status changed to {}", status.label());
                self.presenter.notify(&message, NotificationSeverity::Success);
            }
            Ok(None) => {}
            Err(e) => {
                self.refresh();
                self.presenter.notify(&e.to_string(), NotificationSeverity::Error);
            }
        }
    }

    /// Replace the filter criteria and re-render
    pub fn change_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refresh();
    }

    pub fn reset_filters(&mut self, today: NaiveDate) {
        let criteria = self
            .backend
            .student_table_service
            .reset_criteria(self.backend.config.reset_month_to_current, today);
        self.change_filter(criteria);
    }

    /// Export every record as JSON into `directory`, or the documents directory
    pub fn export(&mut self, directory: Option<&Path>, today: NaiveDate) -> Option<ExportToPathResponse> {
        let records = self.backend.student_service.records();
        match self.backend.export_service.export_to_path(records, directory, today) {
            Ok(response) if response.success => {
                self.presenter
                    .notify("Data exported successfully", NotificationSeverity::Success);
                Some(response)
            }
            Ok(response) => {
                self.presenter.notify(&response.message, NotificationSeverity::Error);
                Some(response)
            }
            Err(e) => {
                error!("❌ EXPORT: {}", e);
                self.presenter
                    .notify("An error occurred while exporting data", NotificationSeverity::Error);
                None
            }
        }
    }

    /// Remove every record. Callers confirm with the user first.
    pub fn clear_all(&mut self) {
        self.editing_id = None;
        self.pending_delete_id = None;
        let result = self.backend.student_service.clear_all();
        self.refresh();
        match result {
            Ok(()) => self
                .presenter
                .notify("All data cleared successfully", NotificationSeverity::Success),
            Err(e) => self.presenter.notify(&e.to_string(), NotificationSeverity::Error),
        }
    }

    /// Amount text as it should read after the user types `raw`
    pub fn normalize_amount(&self, raw: &str) -> String {
        self.backend.money_management_service.normalize_amount_input(raw)
    }

    pub fn increment_amount(&self, text: &str) -> String {
        self.backend.money_management_service.increment_amount(text)
    }

    pub fn decrement_amount(&self, text: &str) -> String {
        self.backend.money_management_service.decrement_amount(text)
    }

    pub fn blank_form(&self, today: NaiveDate) -> StudentFormInput {
        self.backend.money_management_service.blank_form(today)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn records(&self) -> &[StudentRecord] {
        self.backend.student_service.records()
    }

    pub fn statistics(&self) -> StudentStatistics {
        self.backend
            .statistics_service
            .aggregate(self.backend.student_service.records())
    }

    pub fn backend(&self) -> &Backend<C> {
        &self.backend
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
