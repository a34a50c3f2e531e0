use crate::application::knowledge_base::{KnowledgeBase, DEMO_USER};
use crate::domain::entities::shared_data::{Position, SandboxData, SandboxUpdate, SharedData, SharedDataUpdate};
use crate::domain::error::DomainError;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::debug;

const LISTENER_CAPACITY: usize = 16;

#[derive(Default)]
struct Workspaces {
    data: HashMap<String, SharedData>,
    listeners: HashMap<String, broadcast::Sender<SharedData>>,
}

/// Per-user sandbox workspace and display preferences. Every write is
/// broadcast to that user's subscribers.
pub struct SharedDataStore {
    inner: RwLock<Workspaces>,
}

impl Default for SharedDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedDataStore {
    pub fn new() -> Self {
        let mut inner = Workspaces::default();
        inner.data.insert(DEMO_USER.to_string(), demo_workspace());
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Workspaces>, DomainError> {
        self.inner
            .read()
            .map_err(|e| DomainError::Store(format!("shared data: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Workspaces>, DomainError> {
        self.inner
            .write()
            .map_err(|e| DomainError::Store(format!("shared data: {e}")))
    }

    pub fn get_user_data(&self, user_id: &str) -> Result<Option<SharedData>, DomainError> {
        Ok(self.read()?.data.get(user_id).cloned())
    }

    pub fn update_user_data(&self, user_id: &str, update: SharedDataUpdate) -> Result<SharedData, DomainError> {
        self.modify(user_id, |data| {
            if let Some(sandbox) = update.sandbox_data {
                data.sandbox_data = sandbox;
            }
            if let Some(prefs) = update.user_preferences {
                data.user_preferences = prefs;
            }
        })
    }

    pub fn update_sandbox_data(&self, user_id: &str, update: SandboxUpdate) -> Result<SharedData, DomainError> {
        self.modify(user_id, |data| data.sandbox_data.apply(update))
    }

    /// Whole-object replacements first, then field updates, as one change.
    pub fn apply_patch(
        &self,
        user_id: &str,
        workspace: SharedDataUpdate,
        sandbox: SandboxUpdate,
    ) -> Result<SharedData, DomainError> {
        self.modify(user_id, |data| {
            if let Some(replacement) = workspace.sandbox_data {
                data.sandbox_data = replacement;
            }
            if let Some(prefs) = workspace.user_preferences {
                data.user_preferences = prefs;
            }
            data.sandbox_data.apply(sandbox);
        })
    }

    /// Receives a snapshot after every change to `user_id`'s workspace.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&self, user_id: &str) -> Result<broadcast::Receiver<SharedData>, DomainError> {
        let mut inner = self.write()?;
        let sender = inner
            .listeners
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(LISTENER_CAPACITY).0);
        Ok(sender.subscribe())
    }

    /// Copies the knowledge-base profile's risk tolerance into the display
    /// preferences and its preferred assets into the watchlist.
    pub fn sync_with_knowledge_base(&self, user_id: &str, kb: &KnowledgeBase) -> Result<Option<SharedData>, DomainError> {
        let Some(profile) = kb.get_user_profile(user_id)? else {
            return Ok(None);
        };
        let synced = self.modify(user_id, |data| {
            data.user_preferences.risk_level = profile.risk_tolerance.to_string();
            data.sandbox_data.watchlist = profile.preferred_assets.clone();
        })?;
        Ok(Some(synced))
    }

    fn modify(&self, user_id: &str, change: impl FnOnce(&mut SharedData)) -> Result<SharedData, DomainError> {
        let mut inner = self.write()?;
        let data = inner.data.entry(user_id.to_string()).or_default();
        change(data);
        data.last_updated = Utc::now();
        let snapshot = data.clone();

        if let Some(sender) = inner.listeners.get(user_id) {
            if sender.send(snapshot.clone()).is_err() {
                // Everyone unsubscribed.
                inner.listeners.remove(user_id);
            }
        }
        debug!(user_id, "workspace updated");
        Ok(snapshot)
    }
}

fn position(symbol: &str, quantity: f64, avg_price: f64, current_price: f64, pnl: f64) -> Position {
    Position {
        symbol: symbol.to_string(),
        quantity,
        avg_price,
        current_price,
        pnl,
    }
}

fn demo_workspace() -> SharedData {
    SharedData {
        sandbox_data: SandboxData {
            portfolio_value: 100_000.0,
            positions: vec![
                position("AAPL", 50.0, 175.0, 178.5, 175.0),
                position("GOOGL", 25.0, 140.0, 142.75, 68.75),
                position("TSLA", 30.0, 245.0, 248.2, 96.0),
            ],
            watchlist: ["AAPL", "GOOGL", "TSLA", "MSFT", "AMZN", "NVDA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            notes: vec![
                "Monitor AAPL earnings next week".to_string(),
                "TSLA showing strong momentum".to_string(),
                "Consider adding NVDA on dip".to_string(),
            ],
        },
        ..SharedData::default()
    }
}
