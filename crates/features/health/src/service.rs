use crate::capability::{DiagnosticsCapability, HealthCapability};
use crate::error::HealthError;
use crate::report::{
    CheckKind, CheckOutcome, CpuUsage, DiskUsage, HealthReport, MemoryUsage, OverallStatus,
    QuickStatus, SystemInfo, Uptime, format_uptime, gigabytes, percentage,
};
use automata_kernel::prelude::*;
use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use strum::IntoEnumIterator;
use sysinfo::{CpuRefreshKind, Disks, MemoryRefreshKind, RefreshKind, System};
use tracing::{info, warn};

/// Host and application health probes backed by `sysinfo`.
#[service("health")]
pub struct HealthService {
    state: ServiceState,
    started_at: Option<DateTime<Local>>,
    system: Mutex<System>,
}

impl HealthService {
    fn ensure_initialized(&self) -> Result<(), HealthError> {
        if self.state.is_initialized() {
            Ok(())
        } else {
            Err(HealthError::NotInitialized {
                message: Cow::Borrowed("call initialize first"),
                context: None,
            })
        }
    }

    fn run_check(&self, kind: CheckKind) -> Result<Value, HealthError> {
        match kind {
            CheckKind::SystemInfo => to_data(&self.system_info()),
            CheckKind::MemoryUsage => to_data(&self.memory_usage()?),
            CheckKind::DiskUsage => to_data(&disk_usage()?),
            CheckKind::ApplicationUptime => to_data(&self.uptime()),
            CheckKind::CpuUsage => to_data(&self.cpu_usage(true)?),
        }
    }

    fn system_info(&self) -> SystemInfo {
        let processor = self
            .system
            .lock()
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_owned())
            .filter(|brand| !brand.is_empty());

        SystemInfo {
            platform: System::long_os_version().unwrap_or_else(|| std::env::consts::OS.to_owned()),
            system: System::name().unwrap_or_else(|| std::env::consts::OS.to_owned()),
            os_version: System::os_version(),
            kernel_version: System::kernel_version(),
            architecture: std::env::consts::ARCH.to_owned(),
            processor,
            hostname: System::host_name(),
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    fn memory_usage(&self) -> Result<MemoryUsage, HealthError> {
        let mut system = self.system.lock();
        system.refresh_memory();

        let total = system.total_memory();
        if total == 0 {
            return Err(probe_error("no memory information available"));
        }
        let used = system.used_memory();
        Ok(MemoryUsage {
            total_gb: gigabytes(total),
            available_gb: gigabytes(system.available_memory()),
            used_gb: gigabytes(used),
            percentage: percentage(used, total),
        })
    }

    /// With `settle`, samples twice across the minimum update interval so the
    /// reading reflects current load rather than the delta since the last call.
    fn cpu_usage(&self, settle: bool) -> Result<CpuUsage, HealthError> {
        let mut system = self.system.lock();
        system.refresh_cpu_all();
        if settle {
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            system.refresh_cpu_all();
        }

        let logical_core_count = system.cpus().len();
        if logical_core_count == 0 {
            return Err(probe_error("no CPU information available"));
        }
        Ok(CpuUsage { percentage: system.global_cpu_usage(), logical_core_count })
    }

    fn uptime_seconds(&self) -> i64 {
        self.started_at.map_or(0, |started| (Local::now() - started).num_seconds())
    }

    fn uptime(&self) -> Uptime {
        match self.started_at {
            Some(started) => {
                let seconds = self.uptime_seconds();
                Uptime {
                    uptime_seconds: seconds,
                    uptime_formatted: format_uptime(seconds),
                    started_at: Some(started),
                }
            },
            None => Uptime { uptime_seconds: 0, uptime_formatted: "Unknown".to_owned(), started_at: None },
        }
    }
}

fn disk_usage() -> Result<DiskUsage, HealthError> {
    let disks = Disks::new_with_refreshed_list();
    let (total, free) = disks
        .iter()
        .fold((0u64, 0u64), |(total, free), disk| (total + disk.total_space(), free + disk.available_space()));
    if total == 0 {
        return Err(probe_error("no disk information available"));
    }

    let used = total.saturating_sub(free);
    Ok(DiskUsage {
        total_gb: gigabytes(total),
        used_gb: gigabytes(used),
        free_gb: gigabytes(free),
        percentage: percentage(used, total),
    })
}

fn to_data(value: &impl Serialize) -> Result<Value, HealthError> {
    Ok(serde_json::to_value(value)?)
}

fn probe_error(message: &'static str) -> HealthError {
    HealthError::Probe { message: Cow::Borrowed(message), context: None }
}

impl HealthCapability for HealthService {
    fn get_health_status(&self) -> Result<HealthReport, HealthError> {
        self.ensure_initialized()?;

        let outcomes = CheckKind::iter().map(|kind| {
            let outcome = match self.run_check(kind) {
                Ok(data) => CheckOutcome::Pass { data },
                Err(e) => {
                    warn!(check = %kind, error = %e, "Health check {kind} failed: {e}");
                    CheckOutcome::Fail { error: e.to_string() }
                },
            };
            (kind, outcome)
        });
        Ok(HealthReport::from_outcomes(outcomes))
    }

    fn get_quick_status(&self) -> Result<QuickStatus, HealthError> {
        self.ensure_initialized()?;

        Ok(QuickStatus {
            status: OverallStatus::Healthy,
            timestamp: Local::now(),
            uptime_seconds: self.uptime_seconds(),
            memory_usage_percent: self.memory_usage()?.percentage,
            cpu_usage_percent: self.cpu_usage(false)?.percentage,
        })
    }
}

impl DiagnosticsCapability for HealthService {
    fn get_system_info(&self) -> Result<SystemInfo, HealthError> {
        self.ensure_initialized()?;
        Ok(self.system_info())
    }
}

impl Service for HealthService {
    fn feature_name(&self) -> &str {
        self.state.feature_name()
    }

    fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    fn initialize(&mut self) -> Result<(), ServiceError> {
        let started_at = &mut self.started_at;
        let system = self.system.get_mut();
        self.state.initialize_with(|| {
            // First CPU sample; usage is computed against it on the next refresh.
            system.refresh_cpu_all();
            *started_at = Some(Local::now());
            info!("Health service initialized with monitoring capabilities");
            Ok(())
        })
    }
}

impl ServiceDefinition for HealthService {
    fn create() -> Result<Self, ServiceError> {
        let refresh = RefreshKind::nothing()
            .with_memory(MemoryRefreshKind::everything())
            .with_cpu(CpuRefreshKind::everything());
        Ok(Self {
            state: ServiceState::new(Self::SERVICE_NAME),
            started_at: None,
            system: Mutex::new(System::new_with_specifics(refresh)),
        })
    }

    fn capabilities(set: &mut CapabilitySet<Self>) {
        set.provide::<dyn HealthCapability>(|s| s).provide::<dyn DiagnosticsCapability>(|s| s);
    }
}

impl fmt::Debug for HealthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthService")
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_refuse_before_initialize() {
        let service = HealthService::create().unwrap();
        assert!(matches!(service.get_quick_status(), Err(HealthError::NotInitialized { .. })));
        assert!(matches!(service.get_system_info(), Err(HealthError::NotInitialized { .. })));
        assert_eq!(service.uptime().uptime_formatted, "Unknown");
    }

    #[test]
    fn full_report_runs_every_check() {
        let mut service = HealthService::create().unwrap();
        service.initialize().unwrap();
        assert_eq!(service.feature_name(), "health");

        let report = service.get_health_status().unwrap();
        assert_eq!(report.summary.total_checks, 5);
        assert_eq!(report.summary.passed + report.summary.failed, 5);
        for kind in CheckKind::iter() {
            assert!(report.checks.contains_key(kind.as_ref()), "missing {kind}");
        }
        assert!(matches!(report.checks["application_uptime"], CheckOutcome::Pass { .. }));
        assert!(matches!(report.checks["system_info"], CheckOutcome::Pass { .. }));
    }

    #[test]
    fn system_info_describes_the_build_target() {
        let mut service = HealthService::create().unwrap();
        service.initialize().unwrap();

        let info = service.get_system_info().unwrap();
        assert_eq!(info.architecture, std::env::consts::ARCH);
        assert_eq!(info.app_version, env!("CARGO_PKG_VERSION"));
    }
}
