//! Sample statistics for the dashboard and reports views.
//!
//! Nothing here reads the visitor ledger: every figure is a configured
//! constant, optionally perturbed by a seeded generator.

pub mod generator;
pub mod types;

pub use generator::ReportGenerator;
pub use types::{
    CategoryCount, DashboardOverview, DepartmentOccupancy, DepartmentShare, RecentVisitor,
    ReportData, ReportDocument, ReportPeriod, SummaryCards,
};
