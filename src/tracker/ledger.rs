use std::sync::Arc;

use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    checked_profit, format_phone, DayEntry, MonthlySummary, SettingsDefaults, UserSettings,
    YearMonth,
};
use crate::store::{StoreError, TrackerStore};

use super::aggregator::summarize;
use super::month::initialize_month;
use super::totals::{month_totals, MonthTotals};

/// What to do when a write to the store fails after the new values were
/// already computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Log the failure, report it in the [`SaveReport`] and keep serving the
    /// locally computed values.
    BestEffort,
    /// Fail the whole operation with [`LedgerError::Persistence`].
    Strict,
}

impl PersistPolicy {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "strict" => PersistPolicy::Strict,
            _ => PersistPolicy::BestEffort,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersistPolicy::BestEffort => "best_effort",
            PersistPolicy::Strict => "strict",
        }
    }
}

/// Outcome of one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum PersistStatus {
    Saved,
    /// A stale stored row was removed.
    Cleared,
    /// Nothing needed writing.
    Skipped,
    Failed(String),
}

impl PersistStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistStatus::Failed(_))
    }
}

/// Per-target outcome of the writes an edit triggered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub entries: PersistStatus,
    pub summary: PersistStatus,
}

impl SaveReport {
    pub fn has_failures(&self) -> bool {
        self.entries.is_failed() || self.summary.is_failed()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("day {day} does not exist in {period}")]
    InvalidDay { day: u32, period: YearMonth },

    #[error("capital must be greater than zero")]
    InvalidCapital,

    #[error("day {day} values are out of range")]
    ValueOutOfRange { day: u32 },

    #[error("failed to persist {target}: {source}")]
    Persistence {
        target: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A month as the dashboard shows it.
#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub period: YearMonth,
    pub previous: YearMonth,
    pub next: YearMonth,
    pub capital: Decimal,
    pub days: Vec<DayEntry>,
    pub summary: MonthlySummary,
    pub totals: MonthTotals,
    /// False when no day of this month has been stored yet.
    pub persisted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerUpdate {
    pub view: MonthView,
    pub report: SaveReport,
}

#[derive(Debug, Clone, Default)]
pub struct SettingsChange {
    pub capital: Decimal,
    pub entry: Option<Decimal>,
    pub target: Option<Decimal>,
}

/// Whether a read may fall back to placeholder data. Only reads whose
/// result is shown may; reads whose result gets written back may not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadPurpose {
    Display,
    Write,
}

/// Month workflow over a [`TrackerStore`]: load a month, edit a day,
/// recompute the summary and persist it.
#[derive(Clone)]
pub struct MonthLedger {
    store: Arc<dyn TrackerStore>,
    policy: PersistPolicy,
    defaults: SettingsDefaults,
}

impl MonthLedger {
    pub fn new(store: Arc<dyn TrackerStore>, policy: PersistPolicy, defaults: SettingsDefaults) -> Self {
        Self {
            store,
            policy,
            defaults,
        }
    }

    pub fn policy(&self) -> PersistPolicy {
        self.policy
    }

    pub fn defaults(&self) -> &SettingsDefaults {
        &self.defaults
    }

    /// Settings for `user_id`. A missing row is bootstrapped with defaults;
    /// if the store cannot provide one the unsaved defaults are returned.
    pub async fn load_settings(&self, user_id: Uuid) -> UserSettings {
        match self.store.get_settings(user_id).await {
            Ok(Some(settings)) => return settings,
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to read user settings, using defaults");
                return UserSettings::with_defaults(user_id, &self.defaults);
            }
        }

        match self.ensure_default_settings(user_id).await {
            Ok((settings, _)) => settings,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to bootstrap user settings, using defaults");
                UserSettings::with_defaults(user_id, &self.defaults)
            }
        }
    }

    /// Idempotently make sure the user has a settings row.
    pub async fn ensure_default_settings(
        &self,
        user_id: Uuid,
    ) -> Result<(UserSettings, bool), StoreError> {
        let (settings, created) = self
            .store
            .insert_settings_if_absent(&UserSettings::with_defaults(user_id, &self.defaults))
            .await?;

        if created {
            tracing::info!(user_id = %user_id, "Created default user settings");
        }
        Ok((settings, created))
    }

    pub async fn update_settings(
        &self,
        user_id: Uuid,
        change: SettingsChange,
    ) -> Result<UserSettings, LedgerError> {
        if change.capital <= Decimal::ZERO {
            return Err(LedgerError::InvalidCapital);
        }

        let mut settings = self.settings_for_write(user_id).await?;
        settings.capital = change.capital;
        if let Some(entry) = change.entry {
            settings.entry = entry;
        }
        if let Some(target) = change.target {
            settings.target = target;
        }

        let saved = self.store.upsert_settings(&settings).await?;
        tracing::info!(user_id = %user_id, capital = %saved.capital, "User settings updated");
        Ok(saved)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        name: &str,
        phone: &str,
    ) -> Result<UserSettings, LedgerError> {
        let mut settings = self.settings_for_write(user_id).await?;
        settings.name = Some(name.trim().to_string());
        settings.phone = Some(format_phone(phone));

        Ok(self.store.upsert_settings(&settings).await?)
    }

    pub async fn load_month(&self, user_id: Uuid, period: YearMonth) -> Result<MonthView, LedgerError> {
        let settings = self.load_settings(user_id).await;
        let (days, persisted) = self
            .month_entries(user_id, period, settings.capital, ReadPurpose::Display)
            .await?;
        Ok(build_view(period, settings.capital, days, persisted))
    }

    /// The summary row currently stored for the month, if any.
    pub async fn stored_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Option<MonthlySummary>, LedgerError> {
        let row = self.store.get_summary(user_id, period).await?;
        Ok(row.as_ref().map(MonthlySummary::from_row))
    }

    /// Set both values of one day, then recompute and persist the day and
    /// the month summary. A failed read aborts before anything is written.
    pub async fn update_day(
        &self,
        user_id: Uuid,
        period: YearMonth,
        day: u32,
        opening: Option<Decimal>,
        closing: Option<Decimal>,
    ) -> Result<LedgerUpdate, LedgerError> {
        if !period.contains_day(day) {
            return Err(LedgerError::InvalidDay { day, period });
        }
        if let (Some(open), Some(close)) = (opening, closing) {
            if checked_profit(open, close).is_none() {
                return Err(LedgerError::ValueOutOfRange { day });
            }
        }

        let settings = self.settings_for_write(user_id).await?;
        let (mut days, _) = self
            .month_entries(user_id, period, settings.capital, ReadPurpose::Write)
            .await?;

        let Some(entry) = days.iter_mut().find(|d| d.day == day) else {
            return Err(LedgerError::InvalidDay { day, period });
        };
        entry.set_values(opening, closing);
        let entry = entry.clone();

        tracing::debug!(
            user_id = %user_id,
            period = %period,
            day,
            profit = %entry.profit_amount,
            "Trade day updated"
        );

        let write = self.store.upsert_trade_day(user_id, period, &entry).await.map(|_| ());
        let entries = self.settle(write, "trade day", period)?;
        if entries == PersistStatus::Saved {
            counter!("day_saves_total").increment(1);
        }

        let view = build_view(period, settings.capital, days, true);
        let summary = self.persist_summary(user_id, period, &view.summary).await?;

        Ok(LedgerUpdate {
            view,
            report: SaveReport { entries, summary },
        })
    }

    /// Overwrite every stored day of the month with an empty placeholder and
    /// drop the stored summary.
    pub async fn reset_month(&self, user_id: Uuid, period: YearMonth) -> Result<LedgerUpdate, LedgerError> {
        let settings = self.settings_for_write(user_id).await?;
        let days = initialize_month(period.year, period.month, settings.capital);

        let mut entries = PersistStatus::Saved;
        for entry in &days {
            let write = self.store.upsert_trade_day(user_id, period, entry).await.map(|_| ());
            let status = self.settle(write, "trade day", period)?;
            if status.is_failed() && !entries.is_failed() {
                entries = status;
            }
        }

        tracing::info!(user_id = %user_id, period = %period, "Month reset");

        let view = build_view(period, settings.capital, days, true);
        let summary = self.persist_summary(user_id, period, &view.summary).await?;

        Ok(LedgerUpdate {
            view,
            report: SaveReport { entries, summary },
        })
    }

    /// Settings that are about to be written back or to feed a stored
    /// summary. Unlike [`load_settings`](Self::load_settings) a read failure
    /// is returned instead of replaced by defaults.
    async fn settings_for_write(&self, user_id: Uuid) -> Result<UserSettings, LedgerError> {
        if let Some(settings) = self.store.get_settings(user_id).await? {
            return Ok(settings);
        }

        // The store confirmed there is no row, so defaults are the real values.
        match self.ensure_default_settings(user_id).await {
            Ok((settings, _)) => Ok(settings),
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to bootstrap user settings, using defaults");
                Ok(UserSettings::with_defaults(user_id, &self.defaults))
            }
        }
    }

    /// Stored entries for the month, with placeholders for days never saved.
    async fn month_entries(
        &self,
        user_id: Uuid,
        period: YearMonth,
        capital: Decimal,
        purpose: ReadPurpose,
    ) -> Result<(Vec<DayEntry>, bool), LedgerError> {
        let rows = match self.store.list_trade_days(user_id, period).await {
            Ok(rows) => rows,
            Err(e) if purpose == ReadPurpose::Display && self.policy == PersistPolicy::BestEffort => {
                tracing::warn!(error = %e, period = %period, "Failed to load trade days, showing an empty month");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let persisted = !rows.is_empty();
        let mut days = initialize_month(period.year, period.month, capital);
        for row in &rows {
            let stored = DayEntry::from_row(row);
            if let Some(slot) = days.iter_mut().find(|d| d.day == stored.day) {
                *slot = stored;
            }
        }

        Ok((days, persisted))
    }

    /// A month without operated days keeps no summary row, so a summary left
    /// over from earlier edits is removed instead of going stale.
    async fn persist_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
        summary: &MonthlySummary,
    ) -> Result<PersistStatus, LedgerError> {
        counter!("summaries_recomputed_total").increment(1);

        if summary.has_operations() {
            let write = self
                .store
                .upsert_summary(user_id, period, summary)
                .await
                .map(|_| ());
            return self.settle(write, "monthly summary", period);
        }

        match self.store.delete_summary(user_id, period).await {
            Ok(true) => Ok(PersistStatus::Cleared),
            Ok(false) => Ok(PersistStatus::Skipped),
            Err(e) => self.settle(Err(e), "monthly summary", period),
        }
    }

    fn settle(
        &self,
        result: Result<(), StoreError>,
        target: &'static str,
        period: YearMonth,
    ) -> Result<PersistStatus, LedgerError> {
        let Err(e) = result else {
            return Ok(PersistStatus::Saved);
        };

        counter!("persist_failures_total").increment(1);
        match self.policy {
            PersistPolicy::BestEffort => {
                tracing::warn!(
                    error = %e,
                    target,
                    period = %period,
                    "Persistence failed, keeping locally computed values"
                );
                Ok(PersistStatus::Failed(e.to_string()))
            }
            PersistPolicy::Strict => Err(LedgerError::Persistence { target, source: e }),
        }
    }
}

fn build_view(period: YearMonth, capital: Decimal, days: Vec<DayEntry>, persisted: bool) -> MonthView {
    let summary = summarize(&days, capital);
    let totals = month_totals(&days, capital);

    MonthView {
        period,
        previous: period.previous(),
        next: period.next(),
        capital,
        days,
        summary,
        totals,
        persisted,
    }
}
