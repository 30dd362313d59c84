//! Student record store for the student tracker.
//!
//! `StudentService` owns the in-memory collection of records and mirrors it
//! to durable storage after every mutation. Insertion order is the canonical
//! display order; updates replace a record in place.
//!
//! A failed durable write never rolls back memory: the caller gets a
//! `SaveError` to report, and the user can delete records and retry.

use chrono::Utc;
use log::{debug, error, info, warn};
use shared::{PaymentStatus, StudentRecord};

use crate::backend::domain::commands::students::StudentCommand;
use crate::backend::domain::models::errors::{LoadError, SaveError, StoreError};
use crate::backend::domain::models::student::{apply_derived_fields, build_record, generate_id};
use crate::backend::storage::{Connection, KeyValueStorage, TrackerConfig};

pub struct StudentService<C: Connection> {
    repository: C::KeyValueRepository,
    storage_key: String,
    max_serialized_bytes: usize,
    students: Vec<StudentRecord>,
}

impl<C: Connection> StudentService<C> {
    pub fn new(connection: &C, config: &TrackerConfig) -> Self {
        Self {
            repository: connection.create_key_value_repository(),
            storage_key: config.storage_key.clone(),
            max_serialized_bytes: config.max_serialized_bytes,
            students: Vec::new(),
        }
    }

    /// Replace the in-memory collection with what durable storage holds.
    ///
    /// On any failure the collection is left empty and the error is returned.
    pub fn load_all(&mut self) -> Result<&[StudentRecord], LoadError> {
        self.students.clear();

        let stored = match self.repository.get(&self.storage_key) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                info!("No saved student data found");
                return Err(LoadError::NoData);
            }
            Err(e) => {
                error!("❌ LOAD: Failed to read student data: {}", e);
                return Err(LoadError::Unreadable(e));
            }
        };

        match serde_json::from_str::<Vec<StudentRecord>>(&stored) {
            Ok(students) => {
                info!("✅ LOAD: Loaded {} students", students.len());
                self.students = students;
                Ok(&self.students)
            }
            Err(e) => {
                error!("❌ LOAD: Saved student data is corrupt: {}", e);
                Err(LoadError::Corrupt(e))
            }
        }
    }

    /// Read-only view of every record in insertion order
    pub fn records(&self) -> &[StudentRecord] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&StudentRecord> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Create a new record from a validated command and persist it.
    ///
    /// The record stays in memory even when the durable write fails.
    pub fn create_student(&mut self, command: StudentCommand) -> Result<StudentRecord, SaveError> {
        let record = build_record(self.next_id(), command, Utc::now());
        info!("Adding student {} ({})", record.id, record.full_name);
        self.upsert(record.clone())?;
        Ok(record)
    }

    /// Replace the fields of an existing record, keeping its id and position.
    pub fn update_student(&mut self, id: &str, command: StudentCommand) -> Result<StudentRecord, StoreError> {
        if self.find_by_id(id).is_none() {
            warn!("Cannot update missing student {}", id);
            return Err(StoreError::NotFound(id.to_string()));
        }
        let record = build_record(id.to_string(), command, Utc::now());
        info!("Updating student {} ({})", record.id, record.full_name);
        self.upsert(record.clone())?;
        Ok(record)
    }

    /// Insert or replace a record by id, then persist the whole collection.
    ///
    /// Derived fields are recomputed before the record is stored.
    pub fn upsert(&mut self, mut record: StudentRecord) -> Result<(), SaveError> {
        apply_derived_fields(&mut record);

        match self.students.iter().position(|s| s.id == record.id) {
            Some(index) => self.students[index] = record,
            None => self.students.push(record),
        }

        self.persist()
    }

    /// Remove a record. `Ok(false)` when the id is unknown; nothing is written then.
    pub fn remove(&mut self, id: &str) -> Result<bool, SaveError> {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        if self.students.len() == before {
            debug!("Remove ignored, no student with id {}", id);
            return Ok(false);
        }

        info!("Removed student {}", id);
        self.persist()?;
        Ok(true)
    }

    /// Advance the payment status unpaid -> partial -> paid -> unpaid.
    ///
    /// Returns the new status, or `None` when the id is unknown.
    pub fn cycle_status(&mut self, id: &str) -> Result<Option<PaymentStatus>, SaveError> {
        let Some(student) = self.students.iter_mut().find(|s| s.id == id) else {
            debug!("Status change ignored, no student with id {}", id);
            return Ok(None);
        };

        let new_status = student.payment_status_value.next();
        student.payment_status_value = new_status;
        student.last_updated = Utc::now();
        info!("Student {} payment status is now {}", id, new_status);

        self.persist()?;
        Ok(Some(new_status))
    }

    /// Delete every record, both durably and in memory.
    pub fn clear_all(&mut self) -> Result<(), SaveError> {
        self.repository.remove(&self.storage_key).map_err(|e| {
            error!("❌ CLEAR: Failed to remove saved data: {}", e);
            SaveError::from(e)
        })?;
        self.students.clear();
        info!("✅ CLEAR: All student data removed");
        Ok(())
    }

    fn next_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = generate_id(millis);
            if self.find_by_id(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }

    fn persist(&self) -> Result<(), SaveError> {
        let serialized = serde_json::to_string(&self.students).map_err(|e| SaveError::Unknown(e.to_string()))?;

        if serialized.len() > self.max_serialized_bytes {
            error!(
                "❌ SAVE: Data too large: {} bytes (limit {})",
                serialized.len(),
                self.max_serialized_bytes
            );
            return Err(SaveError::TooLarge {
                size: serialized.len(),
                limit: self.max_serialized_bytes,
            });
        }

        self.repository.set(&self.storage_key, &serialized).map_err(|e| {
            error!("❌ SAVE: Failed to save student data: {}", e);
            SaveError::from(e)
        })?;

        debug!(
            "Saved {} students ({} bytes)",
            self.students.len(),
            serialized.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::json::test_utils::TestEnvironment;
    use crate::backend::storage::{JsonConnection, MemoryConnection, StorageError};
    use chrono::NaiveDate;
    use shared::{Gender, PaymentPlan};

    fn create_test_service() -> (StudentService<MemoryConnection>, MemoryConnection) {
        let connection = MemoryConnection::new();
        let service = StudentService::new(&connection, &TrackerConfig::default());
        (service, connection)
    }

    fn command(name: &str, plan: PaymentPlan, amount: f64) -> StudentCommand {
        StudentCommand {
            full_name: name.to_string(),
            grade: "Grade 3".to_string(),
            gender: Gender::Female,
            registration_date: NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(),
            payment_plan: plan,
            payment_amount: amount,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    #[test]
    fn test_create_and_find_has_exact_total() {
        let (mut service, _conn) = create_test_service();

        let created = service
            .create_student(command("Maya", PaymentPlan::Months(7), 33.33))
            .unwrap();
        let found = service.find_by_id(&created.id).unwrap();

        assert_eq!(found.total_payment, found.payment_amount * f64::from(found.total_months));
        assert_eq!(found.total_months, 7);
    }

    #[test]
    fn test_upsert_recomputes_total_for_raw_records() {
        let (mut service, _conn) = create_test_service();
        let mut record = service
            .create_student(command("Adam", PaymentPlan::Months(2), 100.0))
            .unwrap();

        record.payment_amount = 80.5;
        record.total_payment = 0.0;
        service.upsert(record.clone()).unwrap();

        let found = service.find_by_id(&record.id).unwrap();
        assert_eq!(found.total_payment, 161.0);
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let (mut service, _conn) = create_test_service();
        let first = service.create_student(command("First", PaymentPlan::All, 10.0)).unwrap();
        service.create_student(command("Second", PaymentPlan::All, 10.0)).unwrap();
        service.create_student(command("Third", PaymentPlan::All, 10.0)).unwrap();

        let mut edited = first.clone();
        edited.full_name = "First Edited".to_string();
        service.upsert(edited).unwrap();

        let names: Vec<&str> = service.records().iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["First Edited", "Second", "Third"]);
    }

    #[test]
    fn test_ids_are_unique_when_created_in_same_millisecond() {
        let (mut service, _conn) = create_test_service();
        for i in 0..20 {
            service
                .create_student(command(&format!("Student {}", i), PaymentPlan::Months(1), 5.0))
                .unwrap();
        }

        let mut ids: Vec<&str> = service.records().iter().map(|s| s.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn test_load_after_save_round_trips_in_order() {
        let (mut service, connection) = create_test_service();
        let a = service.create_student(command("Ali", PaymentPlan::Months(1), 150.5)).unwrap();
        let b = service.create_student(command("Huda", PaymentPlan::Months(12), 99.75)).unwrap();

        let mut reloaded = StudentService::new(&connection, &TrackerConfig::default());
        let records = reloaded.load_all().unwrap();

        assert_eq!(records, &[a, b]);
    }

    #[test]
    fn test_reload_keeps_exact_two_decimal_totals() {
        let (mut service, connection) = create_test_service();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        let mut amounts = vec![(943627.81, 10)];
        for _ in 0..3000 {
            let cents = next() % 100_000_000;
            let months = (next() % 12) as u32 + 1;
            amounts.push((cents as f64 / 100.0, months));
        }
        for (index, (amount, months)) in amounts.into_iter().enumerate() {
            let plan = PaymentPlan::months(months).unwrap();
            let record = build_record(index.to_string(), command("Student", plan, amount), Utc::now());
            service.students.push(record);
        }
        service.persist().unwrap();

        let mut reloaded = StudentService::new(&connection, &TrackerConfig::default());
        let records = reloaded.load_all().unwrap();

        assert_eq!(records, service.records());
        for record in records {
            assert_eq!(record.total_payment, record.payment_amount * f64::from(record.total_months));
        }
    }

    #[test]
    fn test_load_with_no_data_is_empty() {
        let (mut service, _conn) = create_test_service();

        assert!(matches!(service.load_all(), Err(LoadError::NoData)));
        assert!(service.is_empty());
    }

    #[test]
    fn test_load_corrupt_data_degrades_to_empty() {
        let (mut service, connection) = create_test_service();
        service.create_student(command("Kept", PaymentPlan::All, 1.0)).unwrap();
        connection
            .create_key_value_repository()
            .set("students", "{not json")
            .unwrap();

        assert!(matches!(service.load_all(), Err(LoadError::Corrupt(_))));
        assert!(service.records().is_empty());
    }

    #[test]
    fn test_cycle_status_three_times_returns_to_start() {
        let (mut service, _conn) = create_test_service();
        let record = service.create_student(command("Noor", PaymentPlan::Months(4), 20.0)).unwrap();
        let before = record.last_updated;

        assert_eq!(service.cycle_status(&record.id).unwrap(), Some(PaymentStatus::Partial));
        assert_eq!(service.cycle_status(&record.id).unwrap(), Some(PaymentStatus::Paid));
        assert_eq!(service.cycle_status(&record.id).unwrap(), Some(PaymentStatus::Unpaid));

        let found = service.find_by_id(&record.id).unwrap();
        assert_eq!(found.payment_status_value, PaymentStatus::Unpaid);
        assert!(found.last_updated >= before);
    }

    #[test]
    fn test_cycle_status_unknown_id_is_noop() {
        let (mut service, _conn) = create_test_service();
        assert_eq!(service.cycle_status("missing").unwrap(), None);
    }

    #[test]
    fn test_remove_absent_id_leaves_collection() {
        let (mut service, _conn) = create_test_service();
        service.create_student(command("Only", PaymentPlan::All, 1.0)).unwrap();

        assert!(!service.remove("missing").unwrap());
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_remove_persists() {
        let (mut service, connection) = create_test_service();
        let gone = service.create_student(command("Gone", PaymentPlan::All, 1.0)).unwrap();
        let kept = service.create_student(command("Kept", PaymentPlan::All, 1.0)).unwrap();

        assert!(service.remove(&gone.id).unwrap());

        let mut reloaded = StudentService::new(&connection, &TrackerConfig::default());
        assert_eq!(reloaded.load_all().unwrap(), &[kept]);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let (mut service, _conn) = create_test_service();
        let result = service.update_student("missing", command("Ghost", PaymentPlan::All, 1.0));
        assert_eq!(result.unwrap_err(), StoreError::NotFound("missing".to_string()));
        assert!(service.is_empty());
    }

    #[test]
    fn test_update_keeps_id_and_position() {
        let (mut service, _conn) = create_test_service();
        let first = service.create_student(command("Before", PaymentPlan::Months(1), 10.0)).unwrap();
        service.create_student(command("Other", PaymentPlan::All, 10.0)).unwrap();

        let updated = service
            .update_student(&first.id, command("After", PaymentPlan::Months(5), 12.0))
            .unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(service.records()[0].full_name, "After");
        assert_eq!(service.records()[0].total_payment, 60.0);
    }

    #[test]
    fn test_too_large_keeps_previous_durable_data() {
        let connection = MemoryConnection::new();
        let config = TrackerConfig {
            max_serialized_bytes: 700,
            ..TrackerConfig::default()
        };
        let mut service = StudentService::new(&connection, &config);
        let first = service.create_student(command("Fits", PaymentPlan::All, 1.0)).unwrap();

        let result = service.create_student(command(&"x".repeat(800), PaymentPlan::All, 1.0));

        assert!(matches!(result, Err(SaveError::TooLarge { limit: 700, .. })));
        // Memory keeps the mutation, storage keeps the last good save
        assert_eq!(service.len(), 2);
        let mut reloaded = StudentService::new(&connection, &config);
        assert_eq!(reloaded.load_all().unwrap(), &[first]);
    }

    #[test]
    fn test_default_ceiling_is_five_million_bytes() {
        let (mut service, connection) = create_test_service();

        let result = service.create_student(command(&"a".repeat(5_000_001), PaymentPlan::All, 1.0));

        assert!(matches!(result, Err(SaveError::TooLarge { limit: 5_000_000, .. })));
        assert_eq!(connection.create_key_value_repository().get("students").unwrap(), None);
    }

    #[test]
    fn test_storage_failures_are_distinguished() {
        let connection = MemoryConnection::new().with_quota(10);
        let mut service = StudentService::new(&connection, &TrackerConfig::default());

        let quota = service.create_student(command("Quota", PaymentPlan::All, 1.0));
        assert_eq!(quota.unwrap_err(), SaveError::QuotaExceeded);

        connection.set_forced_failure(Some(StorageError::Unknown("io".to_string())));
        let unknown = service.create_student(command("Unknown", PaymentPlan::All, 1.0));
        assert_eq!(unknown.unwrap_err(), SaveError::Unknown("io".to_string()));

        assert_eq!(service.len(), 2);
    }

    #[test]
    fn test_delete_and_retry_recovers_after_save_failure() {
        let connection = MemoryConnection::new();
        let config = TrackerConfig {
            max_serialized_bytes: 700,
            ..TrackerConfig::default()
        };
        let mut service = StudentService::new(&connection, &config);
        service.create_student(command("Small", PaymentPlan::All, 1.0)).unwrap();
        let big = service.create_student(command(&"y".repeat(800), PaymentPlan::All, 1.0));
        assert!(big.is_err());

        let big_id = service.records()[1].id.clone();
        assert!(service.remove(&big_id).unwrap());
    }

    #[test]
    fn test_clear_all_empties_memory_and_storage() {
        let (mut service, connection) = create_test_service();
        service.create_student(command("One", PaymentPlan::All, 1.0)).unwrap();

        service.clear_all().unwrap();

        assert!(service.is_empty());
        assert_eq!(connection.create_key_value_repository().get("students").unwrap(), None);
    }

    #[test]
    fn test_file_backed_store_round_trips() -> anyhow::Result<()> {
        let env = TestEnvironment::new()?;
        let mut service: StudentService<JsonConnection> =
            StudentService::new(&env.connection, &TrackerConfig::default());
        let record = service
            .create_student(command("On Disk", PaymentPlan::Months(9), 45.5))
            .unwrap();

        assert!(env.base_directory().join("students.json").exists());

        let mut reloaded: StudentService<JsonConnection> =
            StudentService::new(&env.connection, &TrackerConfig::default());
        assert_eq!(reloaded.load_all().unwrap(), &[record]);
        Ok(())
    }
}
