use std::sync::{Arc, Mutex};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::ReportsConfig;
use crate::reporting::types::{
    CategoryCount, DashboardOverview, DepartmentOccupancy, DepartmentShare, RecentVisitor,
    ReportData, ReportDocument, ReportPeriod, SummaryCards,
};
use crate::visitor_ledger::clock::{Clock, SystemClock};
use crate::visitor_ledger::directory::DepartmentDirectory;

const DAILY_VISITORS: [(&str, u32); 7] = [
    ("Mon", 23),
    ("Tue", 31),
    ("Wed", 28),
    ("Thu", 47),
    ("Fri", 52),
    ("Sat", 12),
    ("Sun", 8),
];

const MONTHLY_TREND: [(&str, u32); 6] = [
    ("Jan", 340),
    ("Feb", 425),
    ("Mar", 380),
    ("Apr", 467),
    ("May", 520),
    ("Jun", 485),
];

const DEPARTMENT_VISITORS: [u32; 5] = [15, 12, 10, 7, 3];
const DEPARTMENT_OCCUPANCY: [u32; 6] = [5, 3, 7, 4, 2, 2];

const TOTAL_VISITORS: u32 = 1247;
const TOTAL_CHANGE: &str = "+12% from last month";
const DAILY_AVERAGE: u32 = 42;
const AVERAGE_CHANGE: &str = "+8% increase";

const TODAY_TOTAL: u32 = 23;
const TODAY_ACTIVE: u32 = 8;

// (name, company, time, status)
const RECENT_VISITORS: [(&str, &str, &str, &str); 4] = [
    ("John Smith", "ABC Corp", "14:30", "Inside"),
    ("Mary Johnson", "XYZ Ltd", "14:15", "Inside"),
    ("David Wilson", "Tech Solutions", "13:45", "Checked Out"),
    ("Sarah Brown", "Consulting Group", "13:30", "Inside"),
];

fn full_day_name(short: &str) -> &str {
    match short {
        "Mon" => "Monday",
        "Tue" => "Tuesday",
        "Wed" => "Wednesday",
        "Thu" => "Thursday",
        "Fri" => "Friday",
        "Sat" => "Saturday",
        "Sun" => "Sunday",
        other => other,
    }
}

/// Builds chart-ready sample data.
///
/// With `jitter_percent == 0` every figure is the literal constant. Otherwise
/// each count is moved by up to that percentage, reproducibly when a seed is
/// configured. Department names and floors always come from the directory.
pub struct ReportGenerator {
    directory: Arc<DepartmentDirectory>,
    jitter_percent: u8,
    rng: Mutex<StdRng>,
    clock: Arc<dyn Clock>,
}

impl ReportGenerator {
    pub fn new(directory: Arc<DepartmentDirectory>, config: &ReportsConfig) -> Self {
        Self::with_clock(directory, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        directory: Arc<DepartmentDirectory>,
        config: &ReportsConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            directory,
            jitter_percent: config.jitter_percent.min(100),
            rng: Mutex::new(rng),
            clock,
        }
    }

    fn perturb(&self, base: u32) -> u32 {
        if self.jitter_percent == 0 || base == 0 {
            return base;
        }
        let spread = f64::from(self.jitter_percent) / 100.0;
        let factor = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(-spread..=spread),
            Err(_) => 0.0,
        };
        let value = f64::from(base) * (1.0 + factor);
        value.round().max(0.0) as u32
    }

    fn series(&self, table: &[(&str, u32)]) -> Vec<CategoryCount> {
        table
            .iter()
            .map(|(category, count)| CategoryCount::new(*category, self.perturb(*count)))
            .collect()
    }

    /// Weekly bar chart, Monday to Sunday.
    pub fn daily_visitors(&self) -> Vec<CategoryCount> {
        self.series(&DAILY_VISITORS)
    }

    /// Monthly line chart, January to June.
    pub fn monthly_trend(&self) -> Vec<CategoryCount> {
        self.series(&MONTHLY_TREND)
    }

    /// Visitors per configured department, with each one's rounded share.
    pub fn department_visitors(&self) -> Vec<DepartmentShare> {
        let counts: Vec<(String, u32)> = self
            .directory
            .departments()
            .iter()
            .zip(DEPARTMENT_VISITORS.iter().cycle())
            .map(|(dept, count)| (dept.name.clone(), self.perturb(*count)))
            .collect();
        let total: u32 = counts.iter().map(|(_, c)| c).sum();

        counts
            .into_iter()
            .map(|(department, visitors)| {
                let percentage = if total == 0 {
                    0
                } else {
                    (f64::from(visitors) * 100.0 / f64::from(total)).round() as u32
                };
                DepartmentShare {
                    department,
                    visitors,
                    percentage,
                }
            })
            .collect()
    }

    pub fn recent_visitors(&self) -> Vec<RecentVisitor> {
        let names: Vec<&str> = self
            .directory
            .departments()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        RECENT_VISITORS
            .iter()
            .enumerate()
            .map(|(i, (name, company, time, status))| RecentVisitor {
                name: name.to_string(),
                company: company.to_string(),
                department: names
                    .get(i % names.len().max(1))
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                time: time.to_string(),
                status: status.to_string(),
            })
            .collect()
    }

    fn summary(&self, daily: &[CategoryCount], departments: &[DepartmentShare]) -> SummaryCards {
        // first maximum wins on ties
        let peak = daily.iter().fold(None::<&CategoryCount>, |best, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(c),
        });
        let popular = departments
            .iter()
            .fold(None::<&DepartmentShare>, |best, d| match best {
                Some(b) if b.visitors >= d.visitors => Some(b),
                _ => Some(d),
            });

        SummaryCards {
            total_visitors: self.perturb(TOTAL_VISITORS),
            total_change: TOTAL_CHANGE.to_string(),
            daily_average: self.perturb(DAILY_AVERAGE),
            average_change: AVERAGE_CHANGE.to_string(),
            peak_day: peak
                .map(|c| full_day_name(&c.category).to_string())
                .unwrap_or_default(),
            peak_day_visitors: peak.map(|c| c.count).unwrap_or(0),
            popular_department: popular.map(|d| d.department.clone()).unwrap_or_default(),
            popular_department_share: popular.map(|d| d.percentage).unwrap_or(0),
        }
    }

    /// Data for the reports page.
    ///
    /// The period is echoed back; the sample figures are the same for every
    /// period.
    pub fn report(&self, period: ReportPeriod) -> ReportData {
        let daily_visitors = self.daily_visitors();
        let department_visitors = self.department_visitors();
        let summary = self.summary(&daily_visitors, &department_visitors);
        debug!("Built report data for period '{}'", period);
        ReportData {
            period,
            summary,
            daily_visitors,
            monthly_trend: self.monthly_trend(),
            department_visitors,
            recent_visitors: self.recent_visitors(),
        }
    }

    /// Report wrapped with its generation time, as offered for download.
    pub fn export(&self, period: ReportPeriod) -> ReportDocument {
        let document = ReportDocument {
            period,
            generated: self.clock.now(),
            data: self.report(period),
        };
        info!("Generated {} report at {}", period, document.generated.to_rfc3339());
        document
    }

    /// Today's dashboard figures. Department and floor counts follow the
    /// directory; the visitor figures are fixed.
    pub fn dashboard_overview(&self) -> DashboardOverview {
        let occupancy = self
            .directory
            .departments()
            .iter()
            .zip(DEPARTMENT_OCCUPANCY.iter().cycle())
            .map(|(dept, visitors)| DepartmentOccupancy {
                name: dept.name.clone(),
                floor: dept.floor,
                visitors: *visitors,
            })
            .collect();
        DashboardOverview {
            total_visitors: TODAY_TOTAL,
            active_visitors: TODAY_ACTIVE,
            departments: self.directory.len(),
            floors: self.directory.floor_count(),
            occupancy,
        }
    }
}
