use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::clock::LocalZone;
use crate::correlator::StrayStopPolicy;
use crate::db::WeekStart;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorSettings {
    pub week_start: WeekStart,
    pub stray_stop_policy: StrayStopPolicy,
    /// Fixed offset used for day boundaries; `None` follows the system zone.
    pub utc_offset_minutes: Option<i32>,
    /// Whole seconds credited per tick.
    pub tick_interval_secs: u64,
    pub aggregation_interval_secs: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Monday,
            stray_stop_policy: StrayStopPolicy::Synthesize,
            utc_offset_minutes: None,
            tick_interval_secs: 1,
            aggregation_interval_secs: 60 * 60,
        }
    }
}

impl MonitorSettings {
    pub fn zone(&self) -> LocalZone {
        LocalZone::from_offset_minutes(self.utc_offset_minutes)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    pub fn aggregation_interval(&self) -> Duration {
        Duration::from_secs(self.aggregation_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct UserSettings {
    monitor: MonitorSettings,
    /// Written once on first launch.
    installed_at: Option<DateTime<Utc>>,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring unreadable settings file {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn monitor(&self) -> MonitorSettings {
        self.read().monitor.clone()
    }

    pub fn update_monitor(&self, settings: MonitorSettings) -> Result<()> {
        let mut guard = self.write();
        guard.monitor = settings;
        self.persist(&guard)
    }

    /// Record the install time on first launch. Returns `true` only that first time.
    pub fn ensure_installed(&self, now: DateTime<Utc>) -> Result<bool> {
        let mut guard = self.write();
        if guard.installed_at.is_some() {
            return Ok(false);
        }
        guard.installed_at = Some(now);
        self.persist(&guard)?;
        Ok(true)
    }

    pub fn installed_at(&self) -> Option<DateTime<Utc>> {
        self.read().installed_at
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
