//! In-process card store for tests and throwaway runs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CardRepository, newest_first};
use crate::Result;
use crate::models::{Card, HistoryEntry, Operation};

#[derive(Default)]
struct MemoryState {
    cards: HashMap<String, Card>,
    history: Vec<HistoryEntry>,
}

#[derive(Default)]
pub struct MemoryCardStore {
    state: RwLock<MemoryState>,
}

impl MemoryCardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardRepository for MemoryCardStore {
    async fn insert(&self, card: &Card) -> Result<()> {
        let mut state = self.state.write().await;
        state.cards.insert(card.id.clone(), card.clone());
        state
            .history
            .push(HistoryEntry::for_card(Operation::Create, &card.id));
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Card>> {
        Ok(self.state.read().await.cards.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Card>> {
        let mut cards: Vec<Card> = self.state.read().await.cards.values().cloned().collect();
        newest_first(&mut cards);
        Ok(cards)
    }

    async fn update(&self, card: &Card) -> Result<bool> {
        let mut state = self.state.write().await;
        let Some(existing) = state.cards.get_mut(&card.id) else {
            return Ok(false);
        };
        *existing = card.clone();
        state
            .history
            .push(HistoryEntry::for_card(Operation::Update, &card.id));
        Ok(true)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.cards.remove(id).is_none() {
            return Ok(false);
        }
        state
            .history
            .push(HistoryEntry::for_card(Operation::Delete, id));
        Ok(true)
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.state.read().await.history.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn test_insert_get_list() {
        contract::insert_get_list(&MemoryCardStore::new()).await;
    }

    #[tokio::test]
    async fn test_same_timestamp_order() {
        contract::same_timestamp_lists_by_id(&MemoryCardStore::new()).await;
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        contract::update_and_delete(&MemoryCardStore::new()).await;
    }

    #[tokio::test]
    async fn test_history() {
        contract::history_records_mutations(&MemoryCardStore::new()).await;
    }
}
