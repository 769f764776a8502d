use std::sync::{Arc, Mutex, OnceLock};

use log::{debug, info, warn};
use regex::Regex;

use crate::error_handling::types::{RegistrationError, StorageError};
use crate::storage::types::{read_json, write_json, VISITORS_KEY};
use crate::storage::KeyValueStore;
use crate::visitor_ledger::badge::BadgeGenerator;
use crate::visitor_ledger::clock::{Clock, SystemClock};
use crate::visitor_ledger::directory::DepartmentDirectory;
use crate::visitor_ledger::types::{VisitorRecord, VisitorRecordInput, VisitorStatus};

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Append-only list of visitor registrations stored under `visitors`.
///
/// Every append reads the whole list, pushes one record and writes the list
/// back. Appends through one ledger are serialized by `append_lock`; two
/// processes sharing a store are not coordinated.
///
/// # Fields Overview
///
/// - `store`: backing key-value store
/// - `directory`: department to floor table used to derive `floor`
/// - `badges`: registration-code generator
/// - `clock`: time source for codes and timestamps
pub struct VisitorLedger {
    store: Arc<dyn KeyValueStore>,
    directory: Arc<DepartmentDirectory>,
    badges: BadgeGenerator,
    clock: Arc<dyn Clock>,
    append_lock: Mutex<()>,
}

impl VisitorLedger {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        directory: Arc<DepartmentDirectory>,
        badge_prefix: &str,
    ) -> Self {
        Self::with_clock(store, directory, badge_prefix, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        directory: Arc<DepartmentDirectory>,
        badge_prefix: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            directory,
            badges: BadgeGenerator::new(badge_prefix),
            clock,
            append_lock: Mutex::new(()),
        }
    }

    pub fn directory(&self) -> &DepartmentDirectory {
        &self.directory
    }

    pub fn badges(&self) -> &BadgeGenerator {
        &self.badges
    }

    /// Checks the required fields, the department and the optional email.
    ///
    /// Required: full name, id number, phone number, department, purpose,
    /// person to visit and expected duration. Whitespace-only counts as empty.
    /// All missing fields are reported together, by their form names.
    pub fn validate(&self, input: &VisitorRecordInput) -> Result<u8, RegistrationError> {
        let mut missing = Vec::new();
        let required: [(&'static str, &str); 6] = [
            ("fullName", &input.full_name),
            ("idNumber", &input.id_number),
            ("phoneNumber", &input.phone_number),
            ("department", &input.department),
            ("purpose", &input.purpose),
            ("personToVisit", &input.person_to_visit),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if input.expected_duration.is_none() {
            missing.push("expectedDuration");
        }
        if !missing.is_empty() {
            return Err(RegistrationError::MissingFields(missing));
        }

        let department = input.department.trim();
        let floor = self
            .directory
            .floor_of(department)
            .ok_or_else(|| RegistrationError::UnknownDepartment(department.to_string()))?;

        if let Some(email) = optional(&input.email) {
            if !email_pattern().is_match(&email) {
                return Err(RegistrationError::InvalidEmail(email));
            }
        }

        Ok(floor)
    }

    /// Validates `input`, appends the finished record and returns it.
    ///
    /// On any error nothing is written.
    pub fn register(&self, input: VisitorRecordInput) -> Result<VisitorRecord, RegistrationError> {
        let floor = self.validate(&input).map_err(|e| {
            debug!("Registration rejected: {}", e);
            e
        })?;
        let expected_duration = input
            .expected_duration
            .ok_or(RegistrationError::MissingFields(vec!["expectedDuration"]))?;

        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| RegistrationError::StorageError(StorageError::WriteFailed))?;

        let mut records = self.load()?;
        let now = self.clock.now();
        let registration_code = self
            .badges
            .next_unused_code(now, |code| {
                records.iter().any(|r| r.registration_code == code)
            })
            .ok_or(RegistrationError::CodesExhausted)?;

        let record = VisitorRecord {
            full_name: input.full_name.trim().to_string(),
            phone_number: input.phone_number.trim().to_string(),
            email: optional(&input.email),
            id_number: input.id_number.trim().to_string(),
            company: optional(&input.company),
            purpose: input.purpose.trim().to_string(),
            person_to_visit: input.person_to_visit.trim().to_string(),
            department: input.department.trim().to_string(),
            floor,
            expected_duration,
            items: optional(&input.items),
            vehicle_reg: optional(&input.vehicle_reg),
            registration_code,
            registration_time: now,
            status: VisitorStatus::CheckedIn,
            check_out_time: None,
        };

        records.push(record.clone());
        write_json(self.store.as_ref(), VISITORS_KEY, &records)?;

        info!(
            "Registered visitor {} for {} (floor {}), {} record(s) in ledger",
            record.registration_code,
            record.department,
            record.floor,
            records.len()
        );
        Ok(record)
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Result<Vec<VisitorRecord>, RegistrationError> {
        self.load()
    }

    pub fn len(&self) -> Result<usize, RegistrationError> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistrationError> {
        Ok(self.len()? == 0)
    }

    /// Most recent record carrying `code`.
    ///
    /// Codes issued here are unique, but a ledger written by the browser
    /// front end may repeat one.
    pub fn find(&self, code: &str) -> Result<Option<VisitorRecord>, RegistrationError> {
        Ok(self
            .load()?
            .into_iter()
            .rev()
            .find(|r| r.registration_code == code))
    }

    /// Moves a checked-in visitor to `CheckedOut` and stamps the time.
    ///
    /// With repeated codes the most recent checked-in record is the one moved.
    pub fn check_out(&self, code: &str) -> Result<VisitorRecord, RegistrationError> {
        let _guard = self
            .append_lock
            .lock()
            .map_err(|_| RegistrationError::StorageError(StorageError::WriteFailed))?;

        let mut records = self.load()?;
        if !records.iter().any(|r| r.registration_code == code) {
            return Err(RegistrationError::NotFound(code.to_string()));
        }
        let record = records
            .iter_mut()
            .rev()
            .find(|r| r.registration_code == code && r.status == VisitorStatus::CheckedIn)
            .ok_or_else(|| {
                warn!("Visitor {} is already checked out", code);
                RegistrationError::AlreadyCheckedOut(code.to_string())
            })?;

        record.status = VisitorStatus::CheckedOut;
        record.check_out_time = Some(self.clock.now());
        let updated = record.clone();

        write_json(self.store.as_ref(), VISITORS_KEY, &records)?;
        info!("Visitor {} checked out", code);
        Ok(updated)
    }

    fn load(&self) -> Result<Vec<VisitorRecord>, RegistrationError> {
        Ok(read_json::<Vec<VisitorRecord>>(self.store.as_ref(), VISITORS_KEY)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::types::default_departments;
    use crate::storage::memory_storage::MemoryStorage;
    use crate::visitor_ledger::clock::ManualClock;
    use crate::visitor_ledger::types::ExpectedDuration;
    use chrono::{TimeZone, Utc};

    fn ledger() -> (Arc<MemoryStorage>, Arc<ManualClock>, VisitorLedger) {
        let store = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(
            Utc.timestamp_millis_opt(1_717_000_654_321).unwrap(),
        ));
        let ledger = VisitorLedger::with_clock(
            store.clone(),
            Arc::new(DepartmentDirectory::new(default_departments())),
            "REG",
            clock.clone(),
        );
        (store, clock, ledger)
    }

    fn complete_input() -> VisitorRecordInput {
        VisitorRecordInput {
            full_name: "Sipho Nkosi".into(),
            phone_number: "+268 7612 3456".into(),
            email: "sipho@example.org".into(),
            id_number: "9001015800081".into(),
            company: "  ".into(),
            purpose: "Budget consultation".into(),
            person_to_visit: "Ms. Dube".into(),
            department: "Policy Analysis".into(),
            expected_duration: Some(ExpectedDuration::OneHour),
            items: "Laptop".into(),
            vehicle_reg: String::new(),
        }
    }

    #[test]
    fn test_register_appends_exactly_one() {
        let (_store, clock, ledger) = ledger();
        assert!(ledger.is_empty().unwrap());

        let record = ledger.register(complete_input()).unwrap();
        assert_eq!(ledger.len().unwrap(), 1);
        assert_eq!(record.registration_code, "REG654321");
        assert!(ledger.badges().is_valid(&record.registration_code));
        assert_eq!(record.floor, 3);
        assert_eq!(record.status, VisitorStatus::CheckedIn);
        assert_eq!(record.company, None);
        assert_eq!(record.items.as_deref(), Some("Laptop"));
        assert_eq!(record.vehicle_reg, None);

        clock.advance(chrono::Duration::seconds(5));
        ledger.register(complete_input()).unwrap();
        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], record);
        assert_ne!(records[0].registration_code, records[1].registration_code);
    }

    #[test]
    fn test_missing_fields_append_nothing() {
        let (store, _clock, ledger) = ledger();
        let mut input = complete_input();
        input.full_name = "   ".into();
        input.person_to_visit.clear();
        input.expected_duration = None;

        match ledger.register(input) {
            Err(RegistrationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["fullName", "personToVisit", "expectedDuration"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(store.get(VISITORS_KEY).unwrap(), None);
        assert_eq!(ledger.len().unwrap(), 0);
    }

    #[test]
    fn test_unknown_department_and_bad_email() {
        let (_store, _clock, ledger) = ledger();
        let mut input = complete_input();
        input.department = "Human Resources".into();
        assert!(matches!(
            ledger.register(input),
            Err(RegistrationError::UnknownDepartment(d)) if d == "Human Resources"
        ));

        let mut input = complete_input();
        input.email = "not-an-email".into();
        assert!(matches!(
            ledger.register(input),
            Err(RegistrationError::InvalidEmail(_))
        ));
        assert_eq!(ledger.len().unwrap(), 0);
    }

    #[test]
    fn test_records_use_camel_case_keys() {
        let (store, _clock, ledger) = ledger();
        ledger.register(complete_input()).unwrap();
        let raw = store.get(VISITORS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"fullName\":\"Sipho Nkosi\""));
        assert!(raw.contains("\"registrationCode\":\"REG654321\""));
        assert!(raw.contains("\"status\":\"checked-in\""));
        assert!(!raw.contains("company"));
    }

    #[test]
    fn test_check_out_transitions_once() {
        let (_store, clock, ledger) = ledger();
        let record = ledger.register(complete_input()).unwrap();
        clock.advance(chrono::Duration::hours(1));

        let out = ledger.check_out(&record.registration_code).unwrap();
        assert_eq!(out.status, VisitorStatus::CheckedOut);
        assert_eq!(
            out.check_out_time,
            Some(record.registration_time + chrono::Duration::hours(1))
        );
        assert_eq!(ledger.len().unwrap(), 1);
        assert_eq!(ledger.find(&record.registration_code).unwrap(), Some(out));

        assert!(matches!(
            ledger.check_out(&record.registration_code),
            Err(RegistrationError::AlreadyCheckedOut(_))
        ));
        assert!(matches!(
            ledger.check_out("REG000000"),
            Err(RegistrationError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_registrations_are_all_kept() {
        let (_store, _clock, ledger) = ledger();
        let ledger = Arc::new(ledger);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = ledger.clone();
                std::thread::spawn(move || ledger.register(complete_input()).unwrap())
            })
            .collect();
        let mut codes: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().registration_code)
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 8);
        assert_eq!(ledger.len().unwrap(), 8);
    }

    #[test]
    fn test_codes_stay_unique_after_suffix_wraps() {
        let (_store, clock, ledger) = ledger();
        let first = ledger.register(complete_input()).unwrap();
        ledger.check_out(&first.registration_code).unwrap();

        clock.advance(chrono::Duration::milliseconds(1_000_000));
        let mut input = complete_input();
        input.full_name = "Lindiwe Shongwe".into();
        let second = ledger.register(input).unwrap();

        assert_eq!(first.registration_code, "REG654321");
        assert_eq!(second.registration_code, "REG654322");
        let found = ledger.find(&second.registration_code).unwrap().unwrap();
        assert_eq!(found.full_name, "Lindiwe Shongwe");

        let out = ledger.check_out(&second.registration_code).unwrap();
        assert_eq!(out.full_name, "Lindiwe Shongwe");
        assert_eq!(out.status, VisitorStatus::CheckedOut);
    }

    #[test]
    fn test_register_over_browser_ledger() {
        let (store, _clock, ledger) = ledger();
        let legacy = r#"[{
            "fullName": "Musa Dlamini",
            "phoneNumber": "7600 0000",
            "email": "",
            "idNumber": "880101",
            "company": "",
            "purpose": "Meeting",
            "personToVisit": "Mr. Dube",
            "department": "Policy Analysis",
            "floor": "3",
            "expectedDuration": "1 hour",
            "items": "",
            "vehicleReg": "",
            "registrationCode": "REG654321",
            "registrationTime": "2024-05-29T16:37:34.321Z",
            "status": "active"
        }]"#;
        store.set(VISITORS_KEY, legacy).unwrap();

        let record = ledger.register(complete_input()).unwrap();
        assert_eq!(record.registration_code, "REG654322");
        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].floor, 3);
        assert_eq!(records[0].email, None);
        assert_eq!(records[0].status, VisitorStatus::CheckedIn);

        let out = ledger.check_out("REG654321").unwrap();
        assert_eq!(out.full_name, "Musa Dlamini");
        let raw = store.get(VISITORS_KEY).unwrap().unwrap();
        assert!(raw.contains("\"floor\":3"));
        assert!(!raw.contains("\"active\""));
    }
}
