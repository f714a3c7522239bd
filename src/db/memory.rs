use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{DayEntry, MonthlySummary, MonthlySummaryRow, TradeDayRow, UserSettings, YearMonth};
use crate::store::{StoreError, TrackerStore};

/// In-process [`TrackerStore`]. Used when no database is configured and in
/// tests; reads and writes can be made to fail on demand.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

#[derive(Default)]
struct MemoryInner {
    trade_days: HashMap<(Uuid, YearMonth, u32), TradeDayRow>,
    summaries: HashMap<(Uuid, YearMonth), MonthlySummaryRow>,
    settings: HashMap<Uuid, UserSettings>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Make every subsequent read fail with [`StoreError::Unavailable`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    fn check_readable(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl TrackerStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_trade_days(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Vec<TradeDayRow>, StoreError> {
        self.check_readable()?;
        let inner = self.inner.lock().await;
        let mut rows: Vec<TradeDayRow> = inner
            .trade_days
            .iter()
            .filter(|((user, p, _), _)| *user == user_id && *p == period)
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by_key(|r| r.day);
        Ok(rows)
    }

    async fn upsert_trade_day(
        &self,
        user_id: Uuid,
        period: YearMonth,
        entry: &DayEntry,
    ) -> Result<TradeDayRow, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let existing = inner.trade_days.get(&(user_id, period, entry.day));
        let operated = entry.is_operated();

        let row = TradeDayRow {
            id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
            user_id,
            year: period.year,
            month: period.month as i32,
            day: entry.day as i32,
            date: entry.date.clone(),
            capital: entry.capital,
            initial_value: entry.opening_value,
            final_value: entry.closing_value,
            profit_amount: operated.then_some(entry.profit_amount),
            profit_percent: operated.then_some(entry.profit_percent),
            created_at: existing.and_then(|r| r.created_at).or(Some(now)),
            updated_at: Some(now),
        };
        inner.trade_days.insert((user_id, period, entry.day), row.clone());
        Ok(row)
    }

    async fn get_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Option<MonthlySummaryRow>, StoreError> {
        self.check_readable()?;
        let inner = self.inner.lock().await;
        Ok(inner.summaries.get(&(user_id, period)).cloned())
    }

    async fn upsert_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
        summary: &MonthlySummary,
    ) -> Result<MonthlySummaryRow, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let existing = inner.summaries.get(&(user_id, period));

        let row = MonthlySummaryRow {
            id: existing.map(|r| r.id).unwrap_or_else(Uuid::new_v4),
            user_id,
            year: period.year,
            month: period.month as i32,
            total_operations: summary.total_operations as i32,
            profit_days: summary.profit_days as i32,
            loss_days: summary.loss_days as i32,
            total_profit: summary.total_profit,
            profit_percent: summary.profit_percent,
            average_daily_profit: summary.average_daily_profit,
            best_day_number: Some(summary.best_day.day as i32),
            best_day_profit: Some(summary.best_day.profit),
            worst_day_number: Some(summary.worst_day.day as i32),
            worst_day_profit: Some(summary.worst_day.profit),
            created_at: existing.and_then(|r| r.created_at).or(Some(now)),
            updated_at: Some(now),
        };
        inner.summaries.insert((user_id, period), row.clone());
        Ok(row)
    }

    async fn delete_summary(&self, user_id: Uuid, period: YearMonth) -> Result<bool, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        Ok(inner.summaries.remove(&(user_id, period)).is_some())
    }

    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>, StoreError> {
        self.check_readable()?;
        let inner = self.inner.lock().await;
        Ok(inner.settings.get(&user_id).cloned())
    }

    async fn upsert_settings(&self, settings: &UserSettings) -> Result<UserSettings, StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        let created_at = inner
            .settings
            .get(&settings.user_id)
            .and_then(|s| s.created_at)
            .or(Some(now));

        let stored = UserSettings {
            created_at,
            updated_at: Some(now),
            ..settings.clone()
        };
        inner.settings.insert(settings.user_id, stored.clone());
        Ok(stored)
    }

    async fn insert_settings_if_absent(
        &self,
        settings: &UserSettings,
    ) -> Result<(UserSettings, bool), StoreError> {
        self.check_writable()?;
        let mut inner = self.inner.lock().await;
        if let Some(existing) = inner.settings.get(&settings.user_id) {
            return Ok((existing.clone(), false));
        }

        let now = Utc::now();
        let stored = UserSettings {
            created_at: Some(now),
            updated_at: Some(now),
            ..settings.clone()
        };
        inner.settings.insert(settings.user_id, stored.clone());
        Ok((stored, true))
    }
}
