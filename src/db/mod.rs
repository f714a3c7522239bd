pub mod memory;
pub mod settings_repo;
pub mod summary_repo;
pub mod trade_day_repo;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{DayEntry, MonthlySummary, MonthlySummaryRow, TradeDayRow, UserSettings, YearMonth};
use crate::store::{StoreError, TrackerStore};

pub use memory::MemoryStore;

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// [`TrackerStore`] backed by Postgres.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackerStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_trade_days(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Vec<TradeDayRow>, StoreError> {
        Ok(trade_day_repo::get_trade_days(&self.pool, user_id, period).await?)
    }

    async fn upsert_trade_day(
        &self,
        user_id: Uuid,
        period: YearMonth,
        entry: &DayEntry,
    ) -> Result<TradeDayRow, StoreError> {
        Ok(trade_day_repo::upsert_trade_day(&self.pool, user_id, period, entry).await?)
    }

    async fn get_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
    ) -> Result<Option<MonthlySummaryRow>, StoreError> {
        Ok(summary_repo::get_summary(&self.pool, user_id, period).await?)
    }

    async fn upsert_summary(
        &self,
        user_id: Uuid,
        period: YearMonth,
        summary: &MonthlySummary,
    ) -> Result<MonthlySummaryRow, StoreError> {
        Ok(summary_repo::upsert_summary(&self.pool, user_id, period, summary).await?)
    }

    async fn delete_summary(&self, user_id: Uuid, period: YearMonth) -> Result<bool, StoreError> {
        Ok(summary_repo::delete_summary(&self.pool, user_id, period).await?)
    }

    async fn get_settings(&self, user_id: Uuid) -> Result<Option<UserSettings>, StoreError> {
        Ok(settings_repo::get_settings(&self.pool, user_id).await?)
    }

    async fn upsert_settings(&self, settings: &UserSettings) -> Result<UserSettings, StoreError> {
        Ok(settings_repo::upsert_settings(&self.pool, settings).await?)
    }

    async fn insert_settings_if_absent(
        &self,
        settings: &UserSettings,
    ) -> Result<(UserSettings, bool), StoreError> {
        if let Some(created) = settings_repo::insert_settings_if_absent(&self.pool, settings).await? {
            return Ok((created, true));
        }

        let existing = settings_repo::get_settings(&self.pool, settings.user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((existing, false))
    }
}
