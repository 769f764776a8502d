pub mod configuration;
pub mod controller;
pub mod error_handling;
pub mod reporting;
pub mod session_management;
pub mod storage;
pub mod visitor_ledger;
pub mod web_interface;
