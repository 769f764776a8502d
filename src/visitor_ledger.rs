//! Visitor registration and the append-only ledger.
//!
//! - `types`: visitor record shapes and their persisted JSON form.
//! - `directory`: department to floor lookup.
//! - `clock`: time source, injectable for tests.
//! - `badge`: registration-code generation.
//! - `ledger`: validation and persistence of records under `visitors`.
//! - `form`: the registration form state used by interactive front ends.

pub mod badge;
pub mod clock;
pub mod directory;
pub mod form;
pub mod ledger;
pub mod types;

pub use badge::BadgeGenerator;
pub use clock::{Clock, SystemClock};
pub use directory::DepartmentDirectory;
pub use form::{FormField, RegistrationForm};
pub use ledger::VisitorLedger;
pub use types::{ExpectedDuration, VisitorRecord, VisitorRecordInput, VisitorStatus};
