//! Presence and read signals gated by privacy settings.

use serde::{Deserialize, Serialize};

/// A signal about one user that another user may or may not be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityKind {
    ReadReceipt,
    LastSeen,
    OnlineStatus,
}

impl VisibilityKind {
    pub const ALL: [VisibilityKind; 3] = [Self::ReadReceipt, Self::LastSeen, Self::OnlineStatus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadReceipt => "read_receipt",
            Self::LastSeen => "last_seen",
            Self::OnlineStatus => "online_status",
        }
    }
}

impl std::fmt::Display for VisibilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
