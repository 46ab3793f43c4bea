//! Privacy Repository Implementation
//!
//! One row per user; contact overrides are a JSONB array.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{ContactPrivacySettings, PrivacyRepository, PrivacySettings};
use crate::shared::error::AppError;

const PRIVACY_COLUMNS: &str = r#"
    id, user_id, default_show_read_receipts, default_show_last_seen,
    default_show_online_status, contact_settings, created_at, updated_at
"#;

/// PostgreSQL privacy settings repository implementation.
pub struct PgPrivacyRepository {
    pool: PgPool,
}

impl PgPrivacyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, user_id: &str) -> Result<Option<PrivacySettings>, AppError> {
        let row = sqlx::query_as::<_, PrivacyRow>(&format!(
            "SELECT {PRIVACY_COLUMNS} FROM user_privacy_settings WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PrivacyRow::into_settings))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PrivacyRow {
    id: Uuid,
    user_id: String,
    default_show_read_receipts: bool,
    default_show_last_seen: bool,
    default_show_online_status: bool,
    contact_settings: Json<Vec<ContactPrivacySettings>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PrivacyRow {
    fn into_settings(self) -> PrivacySettings {
        PrivacySettings {
            id: self.id,
            user_id: self.user_id,
            default_show_read_receipts: self.default_show_read_receipts,
            default_show_last_seen: self.default_show_last_seen,
            default_show_online_status: self.default_show_online_status,
            contact_settings: self.contact_settings.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl PrivacyRepository for PgPrivacyRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Option<PrivacySettings>, AppError> {
        self.fetch(user_id).await
    }

    async fn insert_if_absent(&self, settings: &PrivacySettings) -> Result<PrivacySettings, AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_privacy_settings (
                id, user_id, default_show_read_receipts, default_show_last_seen,
                default_show_online_status, contact_settings, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(settings.id)
        .bind(&settings.user_id)
        .bind(settings.default_show_read_receipts)
        .bind(settings.default_show_last_seen)
        .bind(settings.default_show_online_status)
        .bind(Json(&settings.contact_settings))
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        self.fetch(&settings.user_id).await?.ok_or_else(|| {
            AppError::Internal(format!("Privacy settings for {} vanished after insert", settings.user_id))
        })
    }

    async fn save(&self, settings: &PrivacySettings) -> Result<PrivacySettings, AppError> {
        let row = sqlx::query_as::<_, PrivacyRow>(&format!(
            r#"
            INSERT INTO user_privacy_settings (
                id, user_id, default_show_read_receipts, default_show_last_seen,
                default_show_online_status, contact_settings, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                default_show_read_receipts = EXCLUDED.default_show_read_receipts,
                default_show_last_seen = EXCLUDED.default_show_last_seen,
                default_show_online_status = EXCLUDED.default_show_online_status,
                contact_settings = EXCLUDED.contact_settings,
                updated_at = EXCLUDED.updated_at
            RETURNING {PRIVACY_COLUMNS}
            "#
        ))
        .bind(settings.id)
        .bind(&settings.user_id)
        .bind(settings.default_show_read_receipts)
        .bind(settings.default_show_last_seen)
        .bind(settings.default_show_online_status)
        .bind(Json(&settings.contact_settings))
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_settings())
    }
}
