//! Shared directory of discovered agents.

use crate::types::AgentCard;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle to the set of known agents, keyed by service name.
///
/// Cloning is cheap and every clone sees the same entries. Discovery writes,
/// the invoker and the chain executor read; locks are held only for one lookup
/// or one insert.
#[derive(Debug, Clone, Default)]
pub struct AgentDirectory {
    agents: Arc<RwLock<HashMap<String, AgentCard>>>,
}

impl AgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `card.name`, returning the previous one.
    pub async fn insert(&self, card: AgentCard) -> Option<AgentCard> {
        self.agents.write().await.insert(card.name.clone(), card)
    }

    pub async fn remove(&self, name: &str) -> Option<AgentCard> {
        self.agents.write().await.remove(name)
    }

    pub async fn get(&self, name: &str) -> Option<AgentCard> {
        self.agents.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.agents.read().await.contains_key(name)
    }

    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }

    /// Known service names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Copy of all entries, sorted by name.
    pub async fn snapshot(&self) -> Vec<AgentCard> {
        let mut cards: Vec<AgentCard> = self.agents.read().await.values().cloned().collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        cards
    }
}
