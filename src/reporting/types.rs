use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reporting window chosen on the reports page.
///
/// `daily`, `weekly` and `monthly` are accepted as aliases of the older
/// report selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    #[serde(alias = "daily")]
    Today,
    #[serde(alias = "weekly")]
    Week,
    #[serde(alias = "monthly")]
    Month,
    Year,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Today => "today",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::Year => "year",
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" | "daily" => Ok(ReportPeriod::Today),
            "week" | "weekly" => Ok(ReportPeriod::Week),
            "month" | "monthly" => Ok(ReportPeriod::Month),
            "year" => Ok(ReportPeriod::Year),
            other => Err(format!(
                "unknown report period '{}', expected today, week, month or year",
                other
            )),
        }
    }
}

/// One bar or point of a chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u32,
}

impl CategoryCount {
    pub fn new<S: Into<String>>(category: S, count: u32) -> Self {
        Self {
            category: category.into(),
            count,
        }
    }
}

/// One slice of the department pie. `percentage` is rounded to a whole number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentShare {
    pub department: String,
    pub visitors: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    pub total_visitors: u32,
    pub total_change: String,
    pub daily_average: u32,
    pub average_change: String,
    pub peak_day: String,
    pub peak_day_visitors: u32,
    pub popular_department: String,
    pub popular_department_share: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentVisitor {
    pub name: String,
    pub company: String,
    pub department: String,
    pub time: String,
    pub status: String,
}

/// Everything the reports page draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub period: ReportPeriod,
    pub summary: SummaryCards,
    pub daily_visitors: Vec<CategoryCount>,
    pub monthly_trend: Vec<CategoryCount>,
    pub department_visitors: Vec<DepartmentShare>,
    pub recent_visitors: Vec<RecentVisitor>,
}

/// Downloadable form of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub period: ReportPeriod,
    pub generated: DateTime<Utc>,
    pub data: ReportData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentOccupancy {
    pub name: String,
    pub floor: u8,
    pub visitors: u32,
}

/// Today's figures on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_visitors: u32,
    pub active_visitors: u32,
    pub departments: usize,
    pub floors: usize,
    pub occupancy: Vec<DepartmentOccupancy>,
}
