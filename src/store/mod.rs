//! Card persistence
//!
//! Every mutation also appends a [`HistoryEntry`] so the audit trail and the
//! cards never disagree about what happened.

use async_trait::async_trait;

use crate::Result;
use crate::models::{Card, HistoryEntry};

pub mod fjall_store;
pub mod memory;

pub use fjall_store::FjallCardStore;
pub use memory::MemoryCardStore;

#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Store a new card and record CREATE
    async fn insert(&self, card: &Card) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Card>>;

    /// All cards, newest `created_at` first, ties broken by id
    async fn list(&self) -> Result<Vec<Card>>;

    /// Replace an existing card and record UPDATE. Returns `false` if absent.
    async fn update(&self, card: &Card) -> Result<bool>;

    /// Remove a card and record DELETE. Returns `false` if absent.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Audit entries, oldest first
    async fn history(&self) -> Result<Vec<HistoryEntry>>;
}

fn newest_first(cards: &mut [Card]) {
    cards.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
