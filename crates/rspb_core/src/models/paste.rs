//! Paste records cached on this device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata the service returns for a freshly created paste.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteInfo {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub expire_time: Option<DateTime<Utc>>,
}

/// A paste this device knows about, as persisted in the history slot.
///
/// `create_time` is stamped when the record is cached, not when the server
/// stored the paste. It is encoded as epoch milliseconds and `expire_time` as
/// an RFC 3339 string (or `null` for pastes that never expire).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteRecord {
    pub id: String,
    pub key: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub create_time: DateTime<Utc>,
    #[serde(default)]
    pub expire_time: Option<DateTime<Utc>>,
}

impl PasteRecord {
    /// Stamp server metadata with the time it was cached.
    pub fn from_info(info: PasteInfo, create_time: DateTime<Utc>) -> Self {
        Self {
            id: info.id,
            key: info.key,
            create_time,
            expire_time: info.expire_time,
        }
    }

    /// Whether the record has a deadline strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expire_time, Some(expire_time) if expire_time < now)
    }
}
