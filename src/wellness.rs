//! Daily wellness log: water, sleep and journal notes, one document per user per day.

use crate::context::UserContext;
use crate::error::{Result, SkinRoutineError};
use crate::store::{DAILY_LOGS, DocumentStore, get_as, put_as};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub const MAX_WATER_GLASSES: u8 = 8;
pub const DEFAULT_HOURS_SLEPT: f32 = 7.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

impl JournalEntry {
    pub fn new(text: &str, mood: Option<&str>) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SkinRoutineError::Validation {
                message: "journal entry cannot be empty".into(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            text: text.to_string(),
            mood: mood.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub water_intake: u8,
    #[serde(default = "default_hours_slept")]
    pub hours_slept: f32,
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
}

fn default_hours_slept() -> f32 {
    DEFAULT_HOURS_SLEPT
}

/// Storage id for a user's log on `date`: `<user>_<YYYY-MM-DD>`.
pub fn log_id(user_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", user_id, date.format("%Y-%m-%d"))
}

impl DailyLog {
    pub fn new(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            date,
            water_intake: 0,
            hours_slept: DEFAULT_HOURS_SLEPT,
            journal: Vec::new(),
        }
    }

    pub fn id(&self) -> String {
        log_id(&self.user_id, self.date)
    }

    /// Set today's glasses of water, clamped to `0..=MAX_WATER_GLASSES`.
    pub fn set_water(&mut self, glasses: i32) -> u8 {
        self.water_intake = glasses.clamp(0, MAX_WATER_GLASSES as i32) as u8;
        self.water_intake
    }

    /// Add (or subtract) hours of sleep; never drops below zero.
    pub fn adjust_sleep(&mut self, delta_hours: f32) -> f32 {
        let current = if self.hours_slept.is_finite() {
            self.hours_slept
        } else {
            0.0
        };
        self.hours_slept = (current + delta_hours).max(0.0);
        self.hours_slept
    }
}

/// Partial update; only fields that are set are applied.
#[derive(Debug, Clone, Default)]
pub struct DailyLogUpdate {
    pub water_intake: Option<i32>,
    pub sleep_delta: Option<f32>,
    pub hours_slept: Option<f32>,
    pub journal_entry: Option<JournalEntry>,
}

impl DailyLogUpdate {
    pub fn is_empty(&self) -> bool {
        self.water_intake.is_none()
            && self.sleep_delta.is_none()
            && self.hours_slept.is_none()
            && self.journal_entry.is_none()
    }

    pub fn apply(self, log: &mut DailyLog) {
        if let Some(glasses) = self.water_intake {
            log.set_water(glasses);
        }
        if let Some(hours) = self.hours_slept {
            log.hours_slept = hours.max(0.0);
        }
        if let Some(delta) = self.sleep_delta {
            log.adjust_sleep(delta);
        }
        if let Some(entry) = self.journal_entry {
            log.journal.push(entry);
        }
    }
}

/// Reads and merges daily logs through a [`DocumentStore`].
///
/// Clones share one write lock, so concurrent updates through the same
/// service never overwrite each other's fields.
#[derive(Clone)]
pub struct DailyLogService {
    store: Arc<dyn DocumentStore>,
    write_lock: Arc<Mutex<()>>,
}

impl DailyLogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The stored log for `date`, if one has been written.
    pub async fn get(&self, ctx: &UserContext, date: NaiveDate) -> Result<Option<DailyLog>> {
        get_as(self.store.as_ref(), DAILY_LOGS, &log_id(ctx.user_id(), date)).await
    }

    /// The stored log for `date`, or a fresh default one.
    pub async fn get_or_default(&self, ctx: &UserContext, date: NaiveDate) -> Result<DailyLog> {
        Ok(self
            .get(ctx, date)
            .await?
            .unwrap_or_else(|| DailyLog::new(ctx.user_id(), date)))
    }

    /// Merge `update` into the log for `date` and persist it.
    pub async fn update(
        &self,
        ctx: &UserContext,
        date: NaiveDate,
        update: DailyLogUpdate,
    ) -> Result<DailyLog> {
        if update.is_empty() {
            return Err(SkinRoutineError::Validation {
                message: "daily log update has no fields set".into(),
            });
        }
        let _guard = self.write_lock.lock().await;
        let mut log = self.get_or_default(ctx, date).await?;
        update.apply(&mut log);
        put_as(self.store.as_ref(), DAILY_LOGS, &log.id(), &log).await?;
        info!(
            log_id = %log.id(),
            water = log.water_intake,
            sleep = log.hours_slept,
            notes = log.journal.len(),
            "daily log updated"
        );
        Ok(log)
    }
}
