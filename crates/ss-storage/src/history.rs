use serde::{Deserialize, Serialize};
use ss_api_types::{EntryId, HistoryEntry, TxStatus, WalletAddress};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::KeyValueStore;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history index {index} is out of range (log has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no account is active")]
    NoActiveAccount,
    #[error("history entry {0} is already settled")]
    AlreadySettled(EntryId),
    #[error("stored history is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("history backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

/// On-disk record. `id` is absent in logs written before ids were persisted.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    input_value: String,
    status: TxStatus,
    #[serde(default)]
    id: Option<EntryId>,
}

/// `next_id` is a high-water mark: ids of deleted entries are never handed out again, so a
/// late confirmation can't land on a newer entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLog {
    next_id: u64,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredFormat {
    Log(StoredLog),
    /// Bare array written before the high-water mark was persisted.
    Legacy(Vec<StoredEntry>),
}

/// Per-account submission log, persisted on every mutation.
pub struct HistoryStore {
    backend: Rc<dyn KeyValueStore>,
    account: Option<WalletAddress>,
    entries: Vec<HistoryEntry>,
    next_id: u64,
}

impl HistoryStore {
    pub fn new(backend: Rc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            account: None,
            entries: Vec::new(),
            next_id: 1,
        }
    }

    pub fn account(&self) -> Option<&WalletAddress> {
        self.account.as_ref()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Replace the in-memory log with the one stored for `account`.
    pub fn load(&mut self, account: &WalletAddress) -> Result<(), HistoryError> {
        let (entries, next_id) = self.read_log(account)?;
        debug!(account = %account, entries = entries.len(), "history loaded");
        self.account = Some(account.clone());
        self.entries = entries;
        self.next_id = next_id;
        Ok(())
    }

    /// Drop the in-memory log. Persisted data is untouched.
    pub fn unload(&mut self) {
        self.account = None;
        self.entries.clear();
        self.next_id = 1;
    }

    pub fn append(&mut self, input_value: &str) -> Result<EntryId, HistoryError> {
        if self.account.is_none() {
            return Err(HistoryError::NoActiveAccount);
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(HistoryEntry::pending(id, input_value));
        self.persist()?;
        Ok(id)
    }

    /// Move entry `id` of `account`'s log out of Pending.
    ///
    /// When `account` is not the active one its stored log is rewritten directly. Returns
    /// `false` when the entry no longer exists.
    pub fn settle(
        &mut self,
        account: &WalletAddress,
        id: EntryId,
        status: TxStatus,
    ) -> Result<bool, HistoryError> {
        if self.account.as_ref() == Some(account) {
            let updated = settle_entry(&mut self.entries, id, status)?;
            if updated {
                self.persist()?;
            }
            return Ok(updated);
        }

        let (mut entries, next_id) = self.read_log(account)?;
        let updated = settle_entry(&mut entries, id, status)?;
        if updated {
            warn!(account = %account, entry = %id, status = %status, "settled entry of inactive account");
            self.write_log(account, &entries, next_id)?;
        }
        Ok(updated)
    }

    pub fn edit_value(&mut self, index: usize, new_value: &str) -> Result<(), HistoryError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(HistoryError::IndexOutOfRange { index, len })?;
        entry.input_value = new_value.to_owned();
        self.persist()
    }

    pub fn delete(&mut self, index: usize) -> Result<HistoryEntry, HistoryError> {
        let len = self.entries.len();
        if index >= len {
            return Err(HistoryError::IndexOutOfRange { index, len });
        }
        let removed = self.entries.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Most recent Completed entry, scanning newest first.
    pub fn latest_completed(&self) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.status == TxStatus::Completed)
    }

    fn persist(&self) -> Result<(), HistoryError> {
        let account = self.account.as_ref().ok_or(HistoryError::NoActiveAccount)?;
        self.write_log(account, &self.entries, self.next_id)
    }

    fn read_log(&self, account: &WalletAddress) -> Result<(Vec<HistoryEntry>, u64), HistoryError> {
        match self.backend.get(key_for_account(account))? {
            Some(raw) => decode(&raw),
            None => Ok((Vec::new(), 1)),
        }
    }

    fn write_log(
        &self,
        account: &WalletAddress,
        entries: &[HistoryEntry],
        next_id: u64,
    ) -> Result<(), HistoryError> {
        let stored = StoredLog {
            next_id,
            entries: entries
                .iter()
                .map(|entry| StoredEntry {
                    input_value: entry.input_value.clone(),
                    status: entry.status,
                    id: Some(entry.id),
                })
                .collect(),
        };
        let raw = serde_json::to_string(&stored)?;
        self.backend.set(key_for_account(account), &raw)?;
        debug!(account = %account, entries = entries.len(), "history persisted");
        Ok(())
    }
}

fn key_for_account(account: &WalletAddress) -> &str {
    account.as_str()
}

fn settle_entry(entries: &mut [HistoryEntry], id: EntryId, status: TxStatus) -> Result<bool, HistoryError> {
    let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) else {
        debug!(entry = %id, "entry to settle is gone");
        return Ok(false);
    };

    if entry.status.is_settled() {
        return Err(HistoryError::AlreadySettled(id));
    }

    entry.status = status;
    Ok(true)
}

fn decode(raw: &str) -> Result<(Vec<HistoryEntry>, u64), HistoryError> {
    let (stored, high_water) = match serde_json::from_str(raw)? {
        StoredFormat::Log(log) => (log.entries, log.next_id),
        StoredFormat::Legacy(entries) => (entries, 1),
    };
    let mut next_id = stored
        .iter()
        .filter_map(|entry| entry.id)
        .map(|id| id.0 + 1)
        .fold(high_water.max(1), u64::max);

    let entries = stored
        .into_iter()
        .map(|entry| {
            let id = entry.id.unwrap_or_else(|| {
                let id = EntryId(next_id);
                next_id += 1;
                id
            });
            HistoryEntry {
                id,
                input_value: entry.input_value,
                status: entry.status,
            }
        })
        .collect();

    Ok((entries, next_id))
}
