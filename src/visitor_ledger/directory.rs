use std::collections::BTreeSet;

use crate::configuration::DepartmentConfig;

/// Department to floor lookup, built once from configuration.
///
/// This is the single source of a visitor's floor: records never carry a
/// floor that did not come from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDirectory {
    departments: Vec<DepartmentConfig>,
}

impl DepartmentDirectory {
    pub fn new(departments: Vec<DepartmentConfig>) -> Self {
        Self { departments }
    }

    /// Floor of the department with exactly this name.
    pub fn floor_of(&self, name: &str) -> Option<u8> {
        self.departments
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.floor)
    }

    pub fn departments(&self) -> &[DepartmentConfig] {
        &self.departments
    }

    pub fn len(&self) -> usize {
        self.departments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    /// Number of distinct floors served.
    pub fn floor_count(&self) -> usize {
        self.departments
            .iter()
            .map(|d| d.floor)
            .collect::<BTreeSet<_>>()
            .len()
    }
}
