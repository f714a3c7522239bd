use sqlx::PgPool;
use uuid::Uuid;

use crate::models::UserSettings;

pub async fn get_settings(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<UserSettings>> {
    sqlx::query_as::<_, UserSettings>(
        r#"
        SELECT user_id, capital, entry, target, name, phone, created_at, updated_at
        FROM user_settings
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_settings(pool: &PgPool, settings: &UserSettings) -> sqlx::Result<UserSettings> {
    sqlx::query_as::<_, UserSettings>(
        r#"
        INSERT INTO user_settings (user_id, capital, entry, target, name, phone)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO UPDATE
            SET capital = $2,
                entry = $3,
                target = $4,
                name = $5,
                phone = $6,
                updated_at = NOW()
        RETURNING user_id, capital, entry, target, name, phone, created_at, updated_at
        "#,
    )
    .bind(settings.user_id)
    .bind(settings.capital)
    .bind(settings.entry)
    .bind(settings.target)
    .bind(&settings.name)
    .bind(&settings.phone)
    .fetch_one(pool)
    .await
}

/// Insert unless a row exists. Returns `None` when the user already had settings.
pub async fn insert_settings_if_absent(
    pool: &PgPool,
    settings: &UserSettings,
) -> sqlx::Result<Option<UserSettings>> {
    sqlx::query_as::<_, UserSettings>(
        r#"
        INSERT INTO user_settings (user_id, capital, entry, target, name, phone)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id) DO NOTHING
        RETURNING user_id, capital, entry, target, name, phone, created_at, updated_at
        "#,
    )
    .bind(settings.user_id)
    .bind(settings.capital)
    .bind(settings.entry)
    .bind(settings.target)
    .bind(&settings.name)
    .bind(&settings.phone)
    .fetch_optional(pool)
    .await
}
