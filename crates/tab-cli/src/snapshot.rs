//! Receipt snapshot files.
//!
//! A snapshot is one receipt's rows (receipt, items, claims, and the
//! profiles of everyone involved) as a single JSON document. It is what the
//! hosted store would hand the settlement view, frozen to disk.
//!
//! ```json
//! {
//!   "receipt": { "id": "...", "owner_id": "...", "subtotal": 50.0, ... },
//!   "items": [{ "id": "...", "name": "Steak", "quantity": 1, ... }],
//!   "claims": [{ "item_id": "...", "user_id": "...", "quantity": 1.0 }],
//!   "profiles": [{ "id": "...", "username": "alice" }]
//! }
//! ```
//!
//! Claims are stored without profiles; [`BillSource::claims`] joins them in.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tab_core::{
    BillSource, ItemClaim, ItemId, Profile, ReceiptId, ReceiptItem, ReceiptRecord, UserId,
};

/// Snapshot errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading or writing the file failed.
    #[error("failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid snapshot.
    #[error("invalid snapshot {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Serializing the snapshot failed.
    #[error("failed to serialize snapshot")]
    Serialize(#[source] serde_json::Error),
    /// The requested receipt is not the one in this snapshot.
    #[error("receipt not found: {0}")]
    ReceiptNotFound(ReceiptId),
    /// No item matches the given ID or name.
    #[error("item not found: {0}")]
    UnknownItem(String),
    /// More than one item has the given name.
    #[error("item name is ambiguous, use the item ID: {0}")]
    AmbiguousItem(String),
}

/// One receipt's rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub receipt: ReceiptRecord,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub claims: Vec<ItemClaim>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Snapshot {
    /// Loads a snapshot from disk.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Self = serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(
            path = %path.display(),
            receipt = %snapshot.receipt.id,
            items = snapshot.items.len(),
            claims = snapshot.claims.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// Writes the snapshot to disk as pretty-printed JSON.
    ///
    /// Joined profiles are stripped from claims before writing.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let mut stored = self.clone();
        for claim in &mut stored.claims {
            claim.profile = None;
        }
        let mut json = serde_json::to_string_pretty(&stored).map_err(SnapshotError::Serialize)?;
        json.push('\n');
        std::fs::write(path, json).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "saved snapshot");
        Ok(())
    }

    /// Finds an item by exact ID, or else by case-insensitive name.
    pub fn find_item(&self, query: &str) -> Result<&ReceiptItem, SnapshotError> {
        if let Some(item) = self.items.iter().find(|i| i.id.as_str() == query) {
            return Ok(item);
        }
        let mut matches = self
            .items
            .iter()
            .filter(|i| i.name.eq_ignore_ascii_case(query));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Ok(item),
            (Some(_), Some(_)) => Err(SnapshotError::AmbiguousItem(query.to_string())),
            (None, _) => Err(SnapshotError::UnknownItem(query.to_string())),
        }
    }

    pub fn profile(&self, user_id: &UserId) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.id == user_id)
    }

    /// Adds a minimal profile for `user_id` unless the snapshot has one.
    ///
    /// The username is the user ID itself. Returns whether a profile was added.
    pub fn ensure_profile(&mut self, user_id: &UserId) -> bool {
        if self.profile(user_id).is_some() {
            return false;
        }
        self.profiles.push(Profile {
            id: user_id.clone(),
            username: Some(user_id.as_str().to_string()),
            display_name: None,
            avatar_url: None,
        });
        true
    }

    /// Name to show for a user: display name, then username, then the raw ID.
    pub fn display_name<'a>(&'a self, user_id: &'a UserId) -> &'a str {
        self.profile(user_id)
            .and_then(|p| {
                p.display_name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .or_else(|| p.username.as_deref().filter(|n| !n.is_empty()))
            })
            .unwrap_or_else(|| user_id.as_str())
    }

    fn check_receipt(&self, receipt_id: &ReceiptId) -> Result<(), SnapshotError> {
        if &self.receipt.id == receipt_id {
            Ok(())
        } else {
            Err(SnapshotError::ReceiptNotFound(receipt_id.clone()))
        }
    }
}

impl BillSource for Snapshot {
    type Error = SnapshotError;

    fn receipt(&self, receipt_id: &ReceiptId) -> Result<ReceiptRecord, Self::Error> {
        self.check_receipt(receipt_id)?;
        Ok(self.receipt.clone())
    }

    fn items(&self, receipt_id: &ReceiptId) -> Result<Vec<ReceiptItem>, Self::Error> {
        self.check_receipt(receipt_id)?;
        Ok(self.items.clone())
    }

    fn claims(&self, item_ids: &[ItemId]) -> Result<Vec<ItemClaim>, Self::Error> {
        let profiles: HashMap<&UserId, &Profile> =
            self.profiles.iter().map(|p| (&p.id, p)).collect();
        Ok(self
            .claims
            .iter()
            .filter(|c| item_ids.contains(&c.item_id))
            .map(|c| {
                let mut claim = c.clone();
                if claim.profile.is_none() {
                    claim.profile = profiles.get(&c.user_id).map(|p| (*p).clone());
                }
                claim
            })
            .collect())
    }
}
