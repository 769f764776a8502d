use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reporting::{ReportGenerator, ReportPeriod};
use crate::session_management::SessionManager;
use crate::visitor_ledger::VisitorLedger;

/// Services shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub ledger: Arc<VisitorLedger>,
    pub reports: Arc<ReportGenerator>,
    pub login_latency: Duration,
    pub registration_latency: Duration,
}

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl ApiError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<ReportPeriod>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentEntry {
    pub name: String,
    pub floor: u8,
}

/// Protected route reached without a session.
#[derive(Debug)]
pub struct Unauthenticated;

impl warp::reject::Reject for Unauthenticated {}

/// Store or task failure behind a route.
#[derive(Debug)]
pub struct Internal(pub String);

impl warp::reject::Reject for Internal {}
