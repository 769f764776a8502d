use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error_handling::types::RegistrationError;
use crate::visitor_ledger::directory::DepartmentDirectory;
use crate::visitor_ledger::ledger::VisitorLedger;
use crate::visitor_ledger::types::{ExpectedDuration, VisitorRecord, VisitorRecordInput};

/// Free-text fields of the registration form.
///
/// The department is absent on purpose: it is chosen through
/// [`RegistrationForm::select_department`] so the floor follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FullName,
    PhoneNumber,
    Email,
    IdNumber,
    Company,
    Purpose,
    PersonToVisit,
    ExpectedDuration,
    Items,
    VehicleReg,
}

impl FormField {
    pub const ALL: [FormField; 10] = [
        FormField::FullName,
        FormField::PhoneNumber,
        FormField::Email,
        FormField::IdNumber,
        FormField::Company,
        FormField::Purpose,
        FormField::PersonToVisit,
        FormField::ExpectedDuration,
        FormField::Items,
        FormField::VehicleReg,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FormField::FullName => "fullName",
            FormField::PhoneNumber => "phoneNumber",
            FormField::Email => "email",
            FormField::IdNumber => "idNumber",
            FormField::Company => "company",
            FormField::Purpose => "purpose",
            FormField::PersonToVisit => "personToVisit",
            FormField::ExpectedDuration => "expectedDuration",
            FormField::Items => "items",
            FormField::VehicleReg => "vehicleReg",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FormField {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.id() == s)
            .ok_or_else(|| RegistrationError::UnknownField(s.to_string()))
    }
}

/// In-progress registration as a front end holds it.
///
/// The floor is read-only: it is only ever filled in from the directory when
/// a department is selected, and cleared with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    input: VisitorRecordInput,
    floor: Option<u8>,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: FormField, value: &str) -> Result<(), RegistrationError> {
        let slot = match field {
            FormField::FullName => &mut self.input.full_name,
            FormField::PhoneNumber => &mut self.input.phone_number,
            FormField::Email => &mut self.input.email,
            FormField::IdNumber => &mut self.input.id_number,
            FormField::Company => &mut self.input.company,
            FormField::Purpose => &mut self.input.purpose,
            FormField::PersonToVisit => &mut self.input.person_to_visit,
            FormField::Items => &mut self.input.items,
            FormField::VehicleReg => &mut self.input.vehicle_reg,
            FormField::ExpectedDuration => {
                self.input.expected_duration = if value.trim().is_empty() {
                    None
                } else {
                    Some(
                        value
                            .parse::<ExpectedDuration>()
                            .map_err(RegistrationError::InvalidDuration)?,
                    )
                };
                return Ok(());
            }
        };
        *slot = value.to_string();
        Ok(())
    }

    /// Sets the department and fills the floor from `directory`.
    ///
    /// An empty name clears both. An unknown name is rejected and leaves the
    /// form as it was.
    pub fn select_department(
        &mut self,
        directory: &DepartmentDirectory,
        name: &str,
    ) -> Result<(), RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            self.input.department.clear();
            self.floor = None;
            return Ok(());
        }
        let floor = directory
            .floor_of(name)
            .ok_or_else(|| RegistrationError::UnknownDepartment(name.to_string()))?;
        self.input.department = name.to_string();
        self.floor = Some(floor);
        debug!("Department '{}' selected, floor {}", name, floor);
        Ok(())
    }

    pub fn floor(&self) -> Option<u8> {
        self.floor
    }

    pub fn input(&self) -> &VisitorRecordInput {
        &self.input
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Registers the current contents. Fields are cleared only on success.
    pub fn submit(&mut self, ledger: &VisitorLedger) -> Result<VisitorRecord, RegistrationError> {
        let record = ledger.register(self.input.clone())?;
        self.reset();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::types::default_departments;
    use crate::storage::memory_storage::MemoryStorage;
    use std::sync::Arc;

    fn directory() -> Arc<DepartmentDirectory> {
        Arc::new(DepartmentDirectory::new(default_departments()))
    }

    fn filled_form(directory: &DepartmentDirectory) -> RegistrationForm {
        let mut form = RegistrationForm::new();
        for (field, value) in [
            (FormField::FullName, "Nomsa Khumalo"),
            (FormField::PhoneNumber, "7600 1122"),
            (FormField::IdNumber, "8507120044"),
            (FormField::Purpose, "Tender briefing"),
            (FormField::PersonToVisit, "Mr. Shongwe"),
            (FormField::ExpectedDuration, "2 hours"),
        ] {
            form.set(field, value).unwrap();
        }
        form.select_department(directory, "Ministry of Finance").unwrap();
        form
    }

    #[test]
    fn test_field_ids_round_trip() {
        for field in FormField::ALL {
            assert_eq!(field.id().parse::<FormField>().unwrap(), field);
        }
        assert!(matches!(
            "department".parse::<FormField>(),
            Err(RegistrationError::UnknownField(_))
        ));
        assert!(matches!(
            "floor".parse::<FormField>(),
            Err(RegistrationError::UnknownField(_))
        ));
    }

    #[test]
    fn test_selecting_department_sets_floor() {
        let directory = directory();
        let mut form = RegistrationForm::new();
        assert_eq!(form.floor(), None);

        form.select_department(&directory, "Development Finance").unwrap();
        assert_eq!(form.floor(), Some(2));
        assert_eq!(form.input().department, "Development Finance");

        assert!(form.select_department(&directory, "Catering").is_err());
        assert_eq!(form.floor(), Some(2));

        form.select_department(&directory, "").unwrap();
        assert_eq!(form.floor(), None);
        assert!(form.input().department.is_empty());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let mut form = RegistrationForm::new();
        assert!(matches!(
            form.set(FormField::ExpectedDuration, "forever"),
            Err(RegistrationError::InvalidDuration(_))
        ));
        form.set(FormField::ExpectedDuration, "half day").unwrap();
        assert_eq!(form.input().expected_duration, Some(ExpectedDuration::HalfDay));
        form.set(FormField::ExpectedDuration, "").unwrap();
        assert_eq!(form.input().expected_duration, None);
    }

    #[test]
    fn test_submit_resets_all_fields() {
        let directory = directory();
        let ledger = VisitorLedger::new(Arc::new(MemoryStorage::new()), directory.clone(), "REG");
        let mut form = filled_form(&directory);

        let record = form.submit(&ledger).unwrap();
        assert_eq!(record.floor, 5);
        assert!(form.is_empty());
        assert_eq!(form.floor(), None);
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn test_failed_submit_keeps_fields_and_appends_nothing() {
        let directory = directory();
        let ledger = VisitorLedger::new(Arc::new(MemoryStorage::new()), directory.clone(), "REG");
        let mut form = filled_form(&directory);
        form.set(FormField::Purpose, " ").unwrap();

        assert!(matches!(
            form.submit(&ledger),
            Err(RegistrationError::MissingFields(ref f)) if f == &vec!["purpose"]
        ));
        assert_eq!(form.input().full_name, "Nomsa Khumalo");
        assert_eq!(form.floor(), Some(5));
        assert_eq!(ledger.len().unwrap(), 0);
    }
}
