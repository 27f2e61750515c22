//! Card store on an embedded fjall database.
//!
//! Layout:
//! - `cards`: card id -> JSON card
//! - `history`: zero-padded sequence number -> JSON history entry
//!
//! A card change and its history row are committed in one write batch.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use fjall::{Database, Keyspace};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, instrument};

use super::{CardRepository, newest_first};
use crate::models::{Card, HistoryEntry, Operation};
use crate::{Result, WeatherCardError};

#[derive(Clone)]
struct Keyspaces {
    db: Database,
    cards: Keyspace,
    history: Keyspace,
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(bytes).with_context(|| format!("Corrupt record '{key}'"))
}

fn history_key(seq: u64) -> String {
    format!("{seq:020}")
}

impl Keyspaces {
    fn card(&self, id: &str) -> anyhow::Result<Option<Card>> {
        match self.cards.get(id.as_bytes().to_vec())? {
            Some(bytes) => Ok(Some(decode(id, &bytes)?)),
            None => Ok(None),
        }
    }

    fn next_history_seq(&self) -> anyhow::Result<u64> {
        let Some(last) = self.history.last_key_value() else {
            return Ok(0);
        };
        let key = last.key()?;
        let seq: u64 = std::str::from_utf8(&key)?
            .parse()
            .context("Corrupt history key")?;
        Ok(seq + 1)
    }

    /// Commit an optional card write or removal together with its history row
    fn commit(&self, operation: Operation, card_id: &str, card: Option<&Card>) -> anyhow::Result<()> {
        let entry = HistoryEntry::for_card(operation, card_id);
        let seq = self.next_history_seq()?;

        let mut batch = self.db.batch();
        match card {
            Some(card) => batch.insert(
                &self.cards,
                card.id.as_bytes().to_vec(),
                serde_json::to_vec(card)?,
            ),
            None => batch.remove(&self.cards, card_id.as_bytes().to_vec()),
        }
        batch.insert(
            &self.history,
            history_key(seq).into_bytes(),
            serde_json::to_vec(&entry)?,
        );
        batch.commit()?;
        Ok(())
    }

    fn insert(&self, card: &Card) -> anyhow::Result<()> {
        self.commit(Operation::Create, &card.id, Some(card))
    }

    fn list(&self) -> anyhow::Result<Vec<Card>> {
        let mut cards = Vec::new();
        for guard in self.cards.iter() {
            let (key, value) = guard.into_inner()?;
            cards.push(decode(&String::from_utf8_lossy(&key), &value)?);
        }
        newest_first(&mut cards);
        Ok(cards)
    }

    fn update(&self, card: &Card) -> anyhow::Result<bool> {
        if self.card(&card.id)?.is_none() {
            return Ok(false);
        }
        self.commit(Operation::Update, &card.id, Some(card))?;
        Ok(true)
    }

    fn delete(&self, id: &str) -> anyhow::Result<bool> {
        if self.card(id)?.is_none() {
            return Ok(false);
        }
        self.commit(Operation::Delete, id, None)?;
        Ok(true)
    }

    fn history(&self) -> anyhow::Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for guard in self.history.iter() {
            let (key, value) = guard.into_inner()?;
            entries.push(decode(&String::from_utf8_lossy(&key), &value)?);
        }
        Ok(entries)
    }
}

/// Persistent card store. Writes are serialized so history sequence numbers never collide.
pub struct FjallCardStore {
    spaces: Keyspaces,
    write_lock: Mutex<()>,
}

impl FjallCardStore {
    /// Open (or create) the card database under `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let open = || -> anyhow::Result<Keyspaces> {
            let db = Database::builder(path).open()?;
            Ok(Keyspaces {
                cards: db.keyspace("cards", fjall::KeyspaceCreateOptions::default)?,
                history: db.keyspace("history", fjall::KeyspaceCreateOptions::default)?,
                db,
            })
        };
        let spaces = open().map_err(|e| {
            WeatherCardError::storage(format!(
                "Failed to open card database at {}: {e}",
                path.display()
            ))
        })?;

        info!("Opened card database at {}", path.display());
        Ok(Self {
            spaces,
            write_lock: Mutex::new(()),
        })
    }

    async fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Keyspaces) -> anyhow::Result<T> + Send + 'static,
    {
        let spaces = self.spaces.clone();
        task::spawn_blocking(move || op(&spaces))
            .await
            .map_err(|e| WeatherCardError::storage(format!("Storage task failed: {e}")))?
            .map_err(|e| WeatherCardError::storage(e.to_string()))
    }
}

#[async_trait]
impl CardRepository for FjallCardStore {
    #[instrument(skip(self, card), fields(card_id = %card.id))]
    async fn insert(&self, card: &Card) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let card = card.clone();
        self.run(move |spaces| spaces.insert(&card)).await?;
        debug!("Card stored");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Card>> {
        let id = id.to_string();
        self.run(move |spaces| spaces.card(&id)).await
    }

    async fn list(&self) -> Result<Vec<Card>> {
        self.run(|spaces| spaces.list()).await
    }

    #[instrument(skip(self, card), fields(card_id = %card.id))]
    async fn update(&self, card: &Card) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let card = card.clone();
        self.run(move |spaces| spaces.update(&card)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let id = id.to_string();
        self.run(move |spaces| spaces.delete(&id)).await
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.run(|spaces| spaces.history()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn test_insert_get_list() {
        let dir = tempfile::tempdir().unwrap();
        contract::insert_get_list(&FjallCardStore::open(dir.path()).unwrap()).await;
    }

    #[tokio::test]
    async fn test_same_timestamp_order() {
        let dir = tempfile::tempdir().unwrap();
        contract::same_timestamp_lists_by_id(&FjallCardStore::open(dir.path()).unwrap()).await;
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        contract::update_and_delete(&FjallCardStore::open(dir.path()).unwrap()).await;
    }

    #[tokio::test]
    async fn test_history() {
        let dir = tempfile::tempdir().unwrap();
        contract::history_records_mutations(&FjallCardStore::open(dir.path()).unwrap()).await;
    }

    #[tokio::test]
    async fn test_reopen_keeps_cards_and_history_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let first = contract::card("Fortaleza", "beach");
        let second = contract::card("Belem", "running");

        {
            let store = FjallCardStore::open(dir.path()).unwrap();
            store.insert(&first).await.unwrap();
            store.insert(&second).await.unwrap();
        }

        let store = FjallCardStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&first.id).await.unwrap(), Some(first.clone()));
        assert_eq!(store.list().await.unwrap().len(), 2);

        assert!(store.delete(&first.id).await.unwrap());
        let history = store.history().await.unwrap();
        let ops: Vec<Operation> = history.iter().map(|h| h.operation).collect();
        assert_eq!(
            ops,
            vec![Operation::Create, Operation::Create, Operation::Delete]
        );
        assert_eq!(history[2].entity_id, first.id);
    }

    #[tokio::test]
    async fn test_card_and_history_written_together() {
        let dir = tempfile::tempdir().unwrap();
        let store = FjallCardStore::open(dir.path()).unwrap();
        let card = contract::card("Manaus", "picnic");
        store.insert(&card).await.unwrap();

        let spaces = store.spaces.clone();
        assert_eq!(spaces.history.len().unwrap(), 1);
        assert_eq!(spaces.cards.len().unwrap(), 1);
        assert_eq!(spaces.next_history_seq().unwrap(), 1);

        assert!(store.delete(&card.id).await.unwrap());
        assert_eq!(spaces.cards.len().unwrap(), 0);
        assert_eq!(spaces.next_history_seq().unwrap(), 2);
    }

    #[test]
    fn test_history_keys_sort_numerically() {
        assert!(history_key(9) < history_key(10));
        assert_eq!(history_key(42).len(), 20);
    }
}
