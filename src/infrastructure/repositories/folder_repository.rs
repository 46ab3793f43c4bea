//! Folder Repository Implementation
//!
//! PostgreSQL implementation of folder storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Folder, FolderRepository, FolderType, FolderUpdate};
use crate::shared::error::AppError;

const FOLDER_COLUMNS: &str =
    "id, user_id, name, icon, folder_type, chat_ids, is_default, position, created_at";

/// PostgreSQL folder repository implementation.
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Creates a new PgFolderRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FolderRow {
    id: Uuid,
    user_id: String,
    name: String,
    icon: String,
    folder_type: String,
    chat_ids: Vec<Uuid>,
    is_default: bool,
    position: i32,
    created_at: DateTime<Utc>,
}

impl FolderRow {
    fn into_folder(self) -> Result<Folder, AppError> {
        let folder_type = FolderType::parse(&self.folder_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown folder type '{}' for folder {}", self.folder_type, self.id))
        })?;

        Ok(Folder {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            folder_type,
            icon: self.icon,
            chat_ids: self.chat_ids,
            is_default: self.is_default,
            order: self.position,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl FolderRepository for PgFolderRepository {
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Folder>, AppError> {
        let rows = sqlx::query_as::<_, FolderRow>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE user_id = $1 ORDER BY position, created_at"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FolderRow::into_folder).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Folder>, AppError> {
        let row = sqlx::query_as::<_, FolderRow>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FolderRow::into_folder).transpose()
    }

    /// Concurrent callers race on `uq_folders_user_default_type`; losers
    /// insert nothing.
    async fn insert_defaults(&self, folders: &[Folder]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for folder in folders {
            sqlx::query(
                r#"
                INSERT INTO folders (id, user_id, name, icon, folder_type, chat_ids, is_default, position, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
                ON CONFLICT (user_id, folder_type) WHERE is_default DO NOTHING
                "#,
            )
            .bind(folder.id)
            .bind(&folder.user_id)
            .bind(&folder.name)
            .bind(&folder.icon)
            .bind(folder.folder_type.as_str())
            .bind(&folder.chat_ids)
            .bind(folder.order)
            .bind(folder.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn create(&self, folder: &Folder) -> Result<Folder, AppError> {
        let row = sqlx::query_as::<_, FolderRow>(&format!(
            r#"
            INSERT INTO folders (id, user_id, name, icon, folder_type, chat_ids, is_default, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {FOLDER_COLUMNS}
            "#
        ))
        .bind(folder.id)
        .bind(&folder.user_id)
        .bind(&folder.name)
        .bind(&folder.icon)
        .bind(folder.folder_type.as_str())
        .bind(&folder.chat_ids)
        .bind(folder.is_default)
        .bind(folder.order)
        .bind(folder.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_folder()
    }

    async fn update(&self, id: Uuid, update: &FolderUpdate) -> Result<Option<Folder>, AppError> {
        let row = sqlx::query_as::<_, FolderRow>(&format!(
            r#"
            UPDATE folders SET
                name = COALESCE($2, name),
                icon = COALESCE($3, icon),
                chat_ids = COALESCE($4, chat_ids)
            WHERE id = $1
            RETURNING {FOLDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.icon)
        .bind(&update.chat_ids)
        .fetch_optional(&self.pool)
        .await?;

        row.map(FolderRow::into_folder).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
