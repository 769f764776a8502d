//! Visitor record shapes.
//!
//! Field names serialize in camelCase so a ledger written by the browser
//! front end (`fullName`, `registrationCode`, ...) reads back. That front end
//! stores the floor as a string and blank optional fields as `""`; both are
//! accepted on read and normalized on the next write.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed choices offered for the expected length of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpectedDuration {
    #[serde(rename = "30 minutes")]
    ThirtyMinutes,
    #[serde(rename = "1 hour")]
    OneHour,
    #[serde(rename = "2 hours")]
    TwoHours,
    #[serde(rename = "Half day")]
    HalfDay,
    #[serde(rename = "Full day")]
    FullDay,
}

impl ExpectedDuration {
    pub const ALL: [ExpectedDuration; 5] = [
        ExpectedDuration::ThirtyMinutes,
        ExpectedDuration::OneHour,
        ExpectedDuration::TwoHours,
        ExpectedDuration::HalfDay,
        ExpectedDuration::FullDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectedDuration::ThirtyMinutes => "30 minutes",
            ExpectedDuration::OneHour => "1 hour",
            ExpectedDuration::TwoHours => "2 hours",
            ExpectedDuration::HalfDay => "Half day",
            ExpectedDuration::FullDay => "Full day",
        }
    }
}

impl fmt::Display for ExpectedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpectedDuration {
    type Err = String;

    /// Accepts the display labels case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let choices: Vec<&str> = Self::ALL.iter().map(|d| d.as_str()).collect();
                format!("'{}' is not one of: {}", s, choices.join(", "))
            })
    }
}

fn floor_number_or_text<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Floor {
        Number(u8),
        Text(String),
    }

    match Floor::deserialize(deserializer)? {
        Floor::Number(floor) => Ok(floor),
        Floor::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid floor '{}'", text))),
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Blank(Blank),
        Value(T),
    }

    #[derive(Deserialize)]
    #[serde(try_from = "String")]
    struct Blank;

    impl TryFrom<String> for Blank {
        type Error = &'static str;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            if value.trim().is_empty() {
                Ok(Blank)
            } else {
                Err("not blank")
            }
        }
    }

    match Option::<Field<T>>::deserialize(deserializer)? {
        Some(Field::Value(value)) => Ok(Some(value)),
        Some(Field::Blank(_)) | None => Ok(None),
    }
}

/// Visit state.
///
/// Registration checks the visitor in; the only transition is to `CheckedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitorStatus {
    #[serde(rename = "checked-in", alias = "active")]
    CheckedIn,
    #[serde(rename = "checked-out")]
    CheckedOut,
}

/// What the front desk submits. Blank optional fields mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorRecordInput {
    pub full_name: String,
    pub phone_number: String,
    pub email: String,
    pub id_number: String,
    pub company: String,
    pub purpose: String,
    pub person_to_visit: String,
    pub department: String,
    pub expected_duration: Option<ExpectedDuration>,
    pub items: String,
    pub vehicle_reg: String,
}

/// A registered visitor as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub full_name: String,
    pub phone_number: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub email: Option<String>,
    pub id_number: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub company: Option<String>,
    pub purpose: String,
    pub person_to_visit: String,
    pub department: String,
    /// Always the directory floor of `department`.
    #[serde(deserialize_with = "floor_number_or_text")]
    pub floor: u8,
    pub expected_duration: ExpectedDuration,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub items: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub vehicle_reg: Option<String>,
    pub registration_code: String,
    pub registration_time: DateTime<Utc>,
    pub status: VisitorStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "blank_as_none"
    )]
    pub check_out_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_labels() {
        assert_eq!(
            serde_json::to_string(&ExpectedDuration::HalfDay).unwrap(),
            "\"Half day\""
        );
        assert_eq!("1 HOUR".parse::<ExpectedDuration>(), Ok(ExpectedDuration::OneHour));
        assert!("3 days".parse::<ExpectedDuration>().is_err());
    }

    #[test]
    fn test_status_accepts_legacy_active() {
        let status: VisitorStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, VisitorStatus::CheckedIn);
        assert_eq!(
            serde_json::to_string(&VisitorStatus::CheckedIn).unwrap(),
            "\"checked-in\""
        );
    }

    #[test]
    fn test_input_from_partial_json() {
        let input: VisitorRecordInput =
            serde_json::from_str(r#"{"fullName":"Thandi Dlamini","expectedDuration":"2 hours"}"#)
                .unwrap();
        assert_eq!(input.full_name, "Thandi Dlamini");
        assert_eq!(input.expected_duration, Some(ExpectedDuration::TwoHours));
        assert!(input.id_number.is_empty());
    }

    #[test]
    fn test_record_from_browser_ledger() {
        let json = r#"{
            "fullName": "Sipho Nkosi",
            "phoneNumber": "7612 3456",
            "email": "",
            "idNumber": "9001015800081",
            "company": "",
            "purpose": "Meeting",
            "personToVisit": "Mr. Dube",
            "department": "Policy Analysis",
            "floor": "3",
            "expectedDuration": "1 hour",
            "items": " ",
            "vehicleReg": "",
            "registrationCode": "REG654321",
            "registrationTime": "2024-05-29T16:37:34.321Z",
            "status": "active"
        }"#;
        let record: VisitorRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.floor, 3);
        assert_eq!(record.status, VisitorStatus::CheckedIn);
        assert_eq!(record.email, None);
        assert_eq!(record.company, None);
        assert_eq!(record.items, None);
        assert_eq!(record.vehicle_reg, None);
        assert_eq!(record.check_out_time, None);

        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written["floor"], 3);
        assert_eq!(written["status"], "checked-in");
        assert!(written.get("email").is_none());
    }

    #[test]
    fn test_record_rejects_non_numeric_floor() {
        let json = r#"{"fullName":"A","phoneNumber":"1","idNumber":"1","purpose":"p",
            "personToVisit":"x","department":"d","floor":"third","expectedDuration":"1 hour",
            "registrationCode":"REG000001","registrationTime":"2024-05-29T16:37:34Z",
            "status":"checked-in"}"#;
        let err = serde_json::from_str::<VisitorRecord>(json).unwrap_err();
        assert!(err.to_string().contains("invalid floor"));
    }
}
