//! Privacy settings entity and repository trait.
//!
//! Maps to the `user_privacy_settings` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::VisibilityKind;
use crate::shared::error::AppError;

/// Per-contact override of a user's global visibility defaults.
///
/// The `show_*` flags are directional: "show my X to this contact".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPrivacySettings {
    pub contact_user_id: String,
    pub show_read_receipts_to_contact: bool,
    pub can_see_contact_read_receipts: bool,
    pub show_last_seen_to_contact: bool,
    pub can_see_contact_last_seen: bool,
    pub show_online_status_to_contact: bool,
    pub can_see_contact_online_status: bool,
}

/// Partial update of a contact override. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPrivacyUpdate {
    pub contact_user_id: String,
    pub show_read_receipts_to_contact: Option<bool>,
    pub can_see_contact_read_receipts: Option<bool>,
    pub show_last_seen_to_contact: Option<bool>,
    pub can_see_contact_last_seen: Option<bool>,
    pub show_online_status_to_contact: Option<bool>,
    pub can_see_contact_online_status: Option<bool>,
}

/// Partial update of the global defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivacyDefaultsUpdate {
    pub default_show_read_receipts: Option<bool>,
    pub default_show_last_seen: Option<bool>,
    pub default_show_online_status: Option<bool>,
}

/// One privacy record per user.
///
/// Maps to the `user_privacy_settings` table:
/// - user_id: TEXT PRIMARY KEY
/// - default_show_*: BOOLEAN NOT NULL DEFAULT TRUE
/// - contact_settings: JSONB NOT NULL DEFAULT '[]'
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub id: Uuid,
    pub user_id: String,
    pub default_show_read_receipts: bool,
    pub default_show_last_seen: bool,
    pub default_show_online_status: bool,
    pub contact_settings: Vec<ContactPrivacySettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PrivacySettings {
    /// Everything visible, no overrides.
    pub fn defaults_for(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            default_show_read_receipts: true,
            default_show_last_seen: true,
            default_show_online_status: true,
            contact_settings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn global_default(&self, kind: VisibilityKind) -> bool {
        match kind {
            VisibilityKind::ReadReceipt => self.default_show_read_receipts,
            VisibilityKind::LastSeen => self.default_show_last_seen,
            VisibilityKind::OnlineStatus => self.default_show_online_status,
        }
    }

    pub fn contact(&self, contact_user_id: &str) -> Option<&ContactPrivacySettings> {
        self.contact_settings
            .iter()
            .find(|c| c.contact_user_id == contact_user_id)
    }

    /// Whether this user's `kind` signal is visible to `viewer_id`.
    ///
    /// A contact override for the viewer wins; otherwise the global default.
    pub fn shows_to(&self, kind: VisibilityKind, viewer_id: &str) -> bool {
        match self.contact(viewer_id) {
            Some(contact) => match kind {
                VisibilityKind::ReadReceipt => contact.show_read_receipts_to_contact,
                VisibilityKind::LastSeen => contact.show_last_seen_to_contact,
                VisibilityKind::OnlineStatus => contact.show_online_status_to_contact,
            },
            None => self.global_default(kind),
        }
    }

    /// The override for a contact, or one derived from the global defaults.
    pub fn effective_contact(&self, contact_user_id: &str) -> ContactPrivacySettings {
        self.contact(contact_user_id)
            .cloned()
            .unwrap_or_else(|| ContactPrivacySettings {
                contact_user_id: contact_user_id.to_string(),
                show_read_receipts_to_contact: self.default_show_read_receipts,
                can_see_contact_read_receipts: true,
                show_last_seen_to_contact: self.default_show_last_seen,
                can_see_contact_last_seen: true,
                show_online_status_to_contact: self.default_show_online_status,
                can_see_contact_online_status: true,
            })
    }

    pub fn apply_defaults(&mut self, update: &PrivacyDefaultsUpdate, now: DateTime<Utc>) {
        if let Some(v) = update.default_show_read_receipts {
            self.default_show_read_receipts = v;
        }
        if let Some(v) = update.default_show_last_seen {
            self.default_show_last_seen = v;
        }
        if let Some(v) = update.default_show_online_status {
            self.default_show_online_status = v;
        }
        self.updated_at = now;
    }

    /// Merge into the existing override for the contact, or append a new one
    /// seeded from the global defaults.
    pub fn apply_contact(&mut self, update: &ContactPrivacyUpdate, now: DateTime<Utc>) {
        let index = match self
            .contact_settings
            .iter()
            .position(|c| c.contact_user_id == update.contact_user_id)
        {
            Some(index) => index,
            None => {
                let seeded = self.effective_contact(&update.contact_user_id);
                self.contact_settings.push(seeded);
                self.contact_settings.len() - 1
            }
        };

        let contact = &mut self.contact_settings[index];
        if let Some(v) = update.show_read_receipts_to_contact {
            contact.show_read_receipts_to_contact = v;
        }
        if let Some(v) = update.can_see_contact_read_receipts {
            contact.can_see_contact_read_receipts = v;
        }
        if let Some(v) = update.show_last_seen_to_contact {
            contact.show_last_seen_to_contact = v;
        }
        if let Some(v) = update.can_see_contact_last_seen {
            contact.can_see_contact_last_seen = v;
        }
        if let Some(v) = update.show_online_status_to_contact {
            contact.show_online_status_to_contact = v;
        }
        if let Some(v) = update.can_see_contact_online_status {
            contact.can_see_contact_online_status = v;
        }
        self.updated_at = now;
    }
}

/// Repository trait for privacy settings.
#[async_trait]
pub trait PrivacyRepository: Send + Sync {
    /// Find the record of a user.
    async fn find_by_user(&self, user_id: &str) -> Result<Option<PrivacySettings>, AppError>;

    /// Insert `settings` unless the user already has a record, then return
    /// whichever record is stored.
    async fn insert_if_absent(&self, settings: &PrivacySettings) -> Result<PrivacySettings, AppError>;

    /// Rewrite the whole record.
    async fn save(&self, settings: &PrivacySettings) -> Result<PrivacySettings, AppError>;
}
