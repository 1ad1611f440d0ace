#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub scans: u64,
    pub uptime: Duration,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    peak_memory_mb: u64,
    scans: u64,
}

/// 追蹤每次掃描後的行程 CPU 與記憶體用量
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    state: Option<Mutex<MonitorState>>,
    pid: Option<Pid>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = sysinfo::get_current_pid().ok();
        let state = (enabled && pid.is_some()).then(|| {
            let mut system = System::new_with_specifics(RefreshKind::everything());
            system.refresh_all();
            Mutex::new(MonitorState {
                system,
                peak_memory_mb: 0,
                scans: 0,
            })
        });

        if enabled && state.is_none() {
            tracing::warn!("⚠️ System monitoring requested but the current PID is unavailable");
        }

        Self {
            state,
            pid,
            started: Instant::now(),
        }
    }

    /// 記錄一次掃描並回傳當下的統計
    pub fn record_scan(&self) -> Option<SystemStats> {
        let pid = self.pid?;
        let mut state = self.state.as_ref()?.lock().ok()?;
        state.scans += 1;
        state.system.refresh_all();

        let process = state.system.process(pid)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let cpu_usage = process.cpu_usage();
        if memory_mb > state.peak_memory_mb {
            state.peak_memory_mb = memory_mb;
        }

        Some(SystemStats {
            cpu_usage,
            memory_usage_mb: memory_mb,
            peak_memory_mb: state.peak_memory_mb,
            scans: state.scans,
            uptime: self.started.elapsed(),
        })
    }

    pub fn log_scan(&self, symbols: usize) {
        if let Some(stats) = self.record_scan() {
            tracing::info!(
                "📊 Scan #{} ({} symbols) - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Uptime: {:?}",
                stats.scans,
                symbols,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.uptime
            );
        }
    }

    pub fn log_final_stats(&self) {
        let Some(state) = self.state.as_ref().and_then(|s| s.lock().ok()) else {
            return;
        };
        tracing::info!(
            "📊 Final Stats - Scans: {}, Peak Memory: {}MB, Uptime: {:?}",
            state.scans,
            state.peak_memory_mb,
            self.started.elapsed()
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 建置沒有 sysinfo，提供空實作
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_scan(&self, _symbols: usize) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
