use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{DayEntry, MonthlySummary, MonthlySummaryRow, TradeDayRow, UserSettings, YearMonth};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Keyed persistence for trade days, monthly summaries and user settings.
///
/// Every write is an upsert on the natural key: `(user, year, month, day)`
/// for trade days, `(user, year, month)` for summaries and `user` for
/// settings. Reads return `None` / an empty list when nothing is stored.
#[async_trait]
pub trait TrackerStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_trade_days(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Vec<TradeDayRow>, StoreError>;

    async fn upsert_trade_day(
        &self,
        user_id: Uuid,
        period: YearMonth,
        entry: &DayEntry,
    ) -> Result<TradeDayRow, StoreError>;

    async fn get_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Option<MonthlySummaryRow>, StoreError>;

    async fn upsert_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
        summary: &MonthlySummary,
    ) -> Result<MonthlySummaryRow, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_summary(&self, user_id: Uuid, period: YearMonth) -> Result<bool, StoreError>;

    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>, StoreError>;

    async fn upsert_settings(&self, settings: &UserSettings) -> Result<UserSettings, StoreError>;

    /// Insert `settings` unless the user already has a row. Returns the
    /// stored row and whether it was created by this call.
    async fn insert_settings_if_absent(
        &self,
        settings: &UserSettings,
    ) -> Result<(UserSettings, bool), StoreError>;
}
