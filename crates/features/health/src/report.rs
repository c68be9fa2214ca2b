//! Shapes returned by the health probes.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Overall verdict derived from the individual checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    /// Some checks failed, some passed.
    Degraded,
    /// Every check failed.
    Unhealthy,
}

impl OverallStatus {
    #[must_use]
    pub const fn from_counts(passed: usize, failed: usize) -> Self {
        match (passed, failed) {
            (_, 0) => Self::Healthy,
            (0, _) => Self::Unhealthy,
            _ => Self::Degraded,
        }
    }
}

/// The checks run by a full health report, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CheckKind {
    SystemInfo,
    MemoryUsage,
    DiskUsage,
    ApplicationUptime,
    CpuUsage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass { data: Value },
    Fail { error: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub timestamp: DateTime<Local>,
    pub checks: BTreeMap<String, CheckOutcome>,
    pub summary: CheckSummary,
}

impl HealthReport {
    /// Tallies `outcomes` and derives the overall status.
    #[must_use]
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = (CheckKind, CheckOutcome)>) -> Self {
        let mut summary = CheckSummary::default();
        let mut checks = BTreeMap::new();
        for (kind, outcome) in outcomes {
            summary.total_checks += 1;
            match outcome {
                CheckOutcome::Pass { .. } => summary.passed += 1,
                CheckOutcome::Fail { .. } => summary.failed += 1,
            }
            checks.insert(kind.to_string(), outcome);
        }

        Self {
            status: OverallStatus::from_counts(summary.passed, summary.failed),
            timestamp: Local::now(),
            checks,
            summary,
        }
    }
}

/// Lightweight snapshot for frequent polling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStatus {
    pub status: OverallStatus,
    pub timestamp: DateTime<Local>,
    pub uptime_seconds: i64,
    pub memory_usage_percent: f64,
    pub cpu_usage_percent: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub platform: String,
    pub system: String,
    pub os_version: Option<String>,
    pub kernel_version: Option<String>,
    pub architecture: String,
    pub processor: Option<String>,
    pub hostname: Option<String>,
    pub app_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryUsage {
    pub total_gb: f64,
    pub available_gb: f64,
    pub used_gb: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskUsage {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Uptime {
    pub uptime_seconds: i64,
    pub uptime_formatted: String,
    pub started_at: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuUsage {
    pub percentage: f32,
    pub logical_core_count: usize,
}

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes to gigabytes, rounded to two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gigabytes(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_GB)
}

/// `part / whole` as a percentage, rounded to two decimals; `0` for an empty whole.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { round2(part as f64 / whole as f64 * 100.0) }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `H:MM:SS`, prefixed with `N day(s), ` past 24 hours.
#[must_use]
pub fn format_uptime(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (days, rest) = (seconds / 86_400, seconds % 86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_from_counts() {
        assert_eq!(OverallStatus::from_counts(5, 0), OverallStatus::Healthy);
        assert_eq!(OverallStatus::from_counts(3, 2), OverallStatus::Degraded);
        assert_eq!(OverallStatus::from_counts(0, 5), OverallStatus::Unhealthy);
        assert_eq!(OverallStatus::Degraded.to_string(), "degraded");
    }

    #[test]
    fn report_tallies_and_serializes() {
        let report = HealthReport::from_outcomes([
            (CheckKind::MemoryUsage, CheckOutcome::Pass { data: json!({ "percentage": 40.0 }) }),
            (CheckKind::DiskUsage, CheckOutcome::Fail { error: "no disks".to_owned() }),
        ]);
        assert_eq!(report.status, OverallStatus::Degraded);
        assert_eq!(report.summary, CheckSummary { total_checks: 2, passed: 1, failed: 1 });

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["checks"]["disk_usage"], json!({ "status": "fail", "error": "no disks" }));
        assert_eq!(value["checks"]["memory_usage"]["status"], "pass");
    }

    #[test]
    fn unit_helpers() {
        assert!((gigabytes(3 * 1024 * 1024 * 1024) - 3.0).abs() < f64::EPSILON);
        assert!((percentage(1, 3) - 33.33).abs() < f64::EPSILON);
        assert!(percentage(5, 0).abs() < f64::EPSILON);
        assert_eq!(format_uptime(59), "0:00:59");
        assert_eq!(format_uptime(3 * 3600 + 61), "3:01:01");
        assert_eq!(format_uptime(2 * 86_400 + 5), "2 days, 0:00:05");
    }
}
