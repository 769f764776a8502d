use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::configuration::{Config, DepartmentConfig, StorageBackend};
use crate::error_handling::types::{AuthError, ControllerError};
use crate::reporting::{DashboardOverview, ReportData, ReportDocument, ReportGenerator, ReportPeriod};
use crate::session_management::{Session, SessionManager};
use crate::storage::database_storage::DatabaseStorage;
use crate::storage::file_storage::FileStorage;
use crate::storage::memory_storage::MemoryStorage;
use crate::storage::KeyValueStore;
use crate::visitor_ledger::{DepartmentDirectory, FormField, RegistrationForm, VisitorLedger, VisitorRecord};
use crate::web_interface::{AppState, WebServer};

/// Wires the services together from a [`Config`] and runs one command
/// against them.
///
/// The one-shot operations are synchronous and may block on the store; call
/// them from a plain thread. Only [`Controller::serve`] is async.
pub struct Controller {
    config: Config,
    sessions: Arc<SessionManager>,
    ledger: Arc<VisitorLedger>,
    reports: Arc<ReportGenerator>,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        let store = Self::open_store(&config)?;
        Ok(Self::with_store(config, store))
    }

    /// Builds the services over an existing store.
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let directory = Arc::new(DepartmentDirectory::new(config.departments.clone()));
        let sessions = Arc::new(SessionManager::new(
            store.clone(),
            config.auth.accounts.clone(),
        ));
        let ledger = Arc::new(VisitorLedger::new(
            store,
            directory.clone(),
            &config.registration.badge_prefix,
        ));
        let reports = Arc::new(ReportGenerator::new(directory, &config.reports));
        Self {
            config,
            sessions,
            ledger,
            reports,
        }
    }

    fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>, ControllerError> {
        let path = &config.storage.path;
        let store: Arc<dyn KeyValueStore> = match config.storage.backend {
            StorageBackend::Memory => {
                warn!("Using in-memory storage, nothing will persist after exit");
                Arc::new(MemoryStorage::new())
            }
            StorageBackend::File => Arc::new(FileStorage::new(path)?),
            StorageBackend::Database if path.as_os_str().is_empty() => {
                Arc::new(DatabaseStorage::new()?)
            }
            StorageBackend::Database => Arc::new(DatabaseStorage::new_file(path)?),
        };
        info!(
            "Opened {:?} storage at {}",
            config.storage.backend,
            path.display()
        );
        Ok(store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn ledger(&self) -> &VisitorLedger {
        &self.ledger
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            sessions: self.sessions.clone(),
            ledger: self.ledger.clone(),
            reports: self.reports.clone(),
            login_latency: self.config.login_latency(),
            registration_latency: self.config.registration_latency(),
        }
    }

    /// Runs the web interface until the process is stopped.
    pub async fn serve(&self) -> Result<(), ControllerError> {
        let server = WebServer::new(self.app_state());
        server
            .start(&self.config.web.bind_address, self.config.web.port)
            .await?;
        Ok(())
    }

    fn simulate_latency(latency: Duration) {
        if !latency.is_zero() {
            debug!("Simulating {} ms round trip", latency.as_millis());
            thread::sleep(latency);
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, ControllerError> {
        Self::simulate_latency(self.config.login_latency());
        Ok(self.sessions.login(username, password)?)
    }

    pub fn logout(&self) -> Result<(), ControllerError> {
        Ok(self.sessions.logout()?)
    }

    pub fn whoami(&self) -> Result<Option<Session>, ControllerError> {
        Ok(self.sessions.current_session()?)
    }

    fn require_session(&self) -> Result<Session, ControllerError> {
        self.sessions.require_session().map_err(|e| {
            if matches!(e, AuthError::NotAuthenticated) {
                warn!("No active session, log in first");
            }
            ControllerError::AuthError(e)
        })
    }

    /// Fills a registration form from `fields` and submits it.
    ///
    /// Requires a session. Field values are applied in order, then the
    /// department is selected so the floor comes from the directory.
    pub fn register(
        &self,
        fields: &[(FormField, String)],
        department: &str,
    ) -> Result<VisitorRecord, ControllerError> {
        let session = self.require_session()?;
        let mut form = RegistrationForm::new();
        for (field, value) in fields {
            form.set(*field, value)?;
        }
        form.select_department(self.ledger.directory(), department)?;

        Self::simulate_latency(self.config.registration_latency());
        let record = form.submit(&self.ledger)?;
        info!(
            "{} registered {} as {}",
            session.user.username, record.full_name, record.registration_code
        );
        Ok(record)
    }

    pub fn check_out(&self, code: &str) -> Result<VisitorRecord, ControllerError> {
        self.require_session()?;
        Ok(self.ledger.check_out(code)?)
    }

    pub fn departments(&self) -> Result<Vec<DepartmentConfig>, ControllerError> {
        self.require_session()?;
        Ok(self.ledger.directory().departments().to_vec())
    }

    pub fn dashboard(&self) -> Result<DashboardOverview, ControllerError> {
        self.require_session()?;
        Ok(self.reports.dashboard_overview())
    }

    pub fn report(&self, period: ReportPeriod) -> Result<ReportData, ControllerError> {
        self.require_session()?;
        Ok(self.reports.report(period))
    }

    pub fn export_report(&self, period: ReportPeriod) -> Result<ReportDocument, ControllerError> {
        self.require_session()?;
        Ok(self.reports.export(period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::types::RegistrationError;

    fn controller() -> Controller {
        let mut config = Config::default();
        config.auth.simulated_latency_ms = 0;
        config.registration.simulated_latency_ms = 0;
        Controller::with_store(config, Arc::new(MemoryStorage::new()))
    }

    fn fields() -> Vec<(FormField, String)> {
        vec![
            (FormField::FullName, "Lindiwe Mamba".to_string()),
            (FormField::IdNumber, "9203140567".to_string()),
            (FormField::PhoneNumber, "7812 0099".to_string()),
            (FormField::Purpose, "Grant application".to_string()),
            (FormField::PersonToVisit, "Dr. Simelane".to_string()),
            (FormField::ExpectedDuration, "30 minutes".to_string()),
        ]
    }

    #[test]
    fn test_protected_commands_need_a_session() {
        let controller = controller();
        assert!(matches!(
            controller.dashboard(),
            Err(ControllerError::AuthError(AuthError::NotAuthenticated))
        ));
        assert!(matches!(
            controller.register(&fields(), "Administration"),
            Err(ControllerError::AuthError(AuthError::NotAuthenticated))
        ));
        assert_eq!(controller.ledger().len().unwrap(), 0);
    }

    #[test]
    fn test_register_after_login() {
        let controller = controller();
        controller.login("guard", "admin123").unwrap();
        let record = controller.register(&fields(), "Administration").unwrap();
        assert_eq!(record.floor, 6);
        assert_eq!(controller.ledger().len().unwrap(), 1);

        let out = controller.check_out(&record.registration_code).unwrap();
        assert_eq!(out.registration_code, record.registration_code);
    }

    #[test]
    fn test_register_with_unknown_department() {
        let controller = controller();
        controller.login("guard", "admin123").unwrap();
        assert!(matches!(
            controller.register(&fields(), "Catering"),
            Err(ControllerError::RegistrationError(
                RegistrationError::UnknownDepartment(_)
            ))
        ));
    }

    #[test]
    fn test_logout_closes_views() {
        let controller = controller();
        controller.login("guard", "admin123").unwrap();
        assert_eq!(controller.departments().unwrap().len(), 6);
        controller.logout().unwrap();
        assert!(controller.whoami().unwrap().is_none());
        assert!(controller.report(ReportPeriod::Week).is_err());
    }
}
