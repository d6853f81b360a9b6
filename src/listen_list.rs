use std::sync::{Mutex, MutexGuard};

use crate::error::{ClientError, ClientResult};
use crate::services::ListenListService;
use crate::types::{ItemKind, ListenListEntry};

#[derive(Debug, Default)]
struct ListState {
    entries: Vec<ListenListEntry>,
    loading: bool,
    last_error: Option<String>,
}

/// The signed-in user's listen list with optimistic add and remove.
///
/// The lock is never held across a request: each operation mutates
/// locally, awaits the server, then reconciles. Rollbacks restore the
/// exact prior entry.
pub struct ListenList {
    service: ListenListService,
    state: Mutex<ListState>,
}

impl ListenList {
    pub fn new(service: ListenListService) -> Self {
        Self {
            service,
            state: Mutex::new(ListState::default()),
        }
    }

    /// Replace the local collection with the server's
    pub async fn load(&self) -> ClientResult<()> {
        {
            let mut state = self.lock();
            state.loading = true;
            state.last_error = None;
        }

        let result = self.service.list().await;

        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(entries) => {
                tracing::debug!("Loaded {} listen-list entries", entries.len());
                state.entries = entries;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load listen list: {}", e);
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Add content, showing a placeholder until the server confirms.
    ///
    /// Adding content that is already listed is a no-op without a request.
    pub async fn add(&self, kind: ItemKind, content_id: &str) -> ClientResult<()> {
        let placeholder = {
            let mut state = self.lock();
            if state.entries.iter().any(|e| e.references(kind, content_id)) {
                return Ok(());
            }
            let placeholder = ListenListEntry::placeholder(kind, content_id);
            state.entries.insert(0, placeholder.clone());
            placeholder
        };

        if let Err(e) = self.service.add(kind, content_id).await {
            tracing::error!("Failed to add {} {} to listen list, rolling back: {}", kind, content_id, e);
            self.lock().entries.retain(|entry| entry.id != placeholder.id);
            return Err(e);
        }

        // The placeholder stays until a later load if this fails
        match self.service.list().await {
            Ok(entries) => self.lock().entries = entries,
            Err(e) => {
                tracing::error!("Added {} {} but could not refresh listen list: {}", kind, content_id, e);
                self.lock().last_error = Some(e.to_string());
            }
        }
        Ok(())
    }

    /// Remove an entry by its entry id; restores it at the front on failure
    pub async fn remove(&self, entry: &ListenListEntry) -> ClientResult<()> {
        if entry.id.is_placeholder() {
            return Err(ClientError::validation("This item is still being added."));
        }

        let removed = {
            let mut state = self.lock();
            let before = state.entries.len();
            state.entries.retain(|e| e.id != entry.id);
            state.entries.len() != before
        };

        if let Err(e) = self.service.remove(&entry.id).await {
            tracing::error!("Failed to remove listen-list entry {}, rolling back: {}", entry.id, e);
            if removed {
                self.lock().entries.insert(0, entry.clone());
            }
            return Err(e);
        }
        Ok(())
    }

    /// Remove whichever entry references this content; no-op when none does
    pub async fn remove_content(&self, kind: ItemKind, content_id: &str) -> ClientResult<()> {
        let entry = self
            .lock()
            .entries
            .iter()
            .find(|e| e.references(kind, content_id))
            .cloned();

        match entry {
            Some(entry) => self.remove(&entry).await,
            None => Ok(()),
        }
    }

    pub fn entries(&self) -> Vec<ListenListEntry> {
        self.lock().entries.clone()
    }

    pub fn entries_of(&self, kind: ItemKind) -> Vec<ListenListEntry> {
        self.lock().entries.iter().filter(|e| e.kind() == kind).cloned().collect()
    }

    pub fn contains(&self, kind: ItemKind, content_id: &str) -> bool {
        self.lock().entries.iter().any(|e| e.references(kind, content_id))
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Forget everything, e.g. after logout
    pub fn reset(&self) {
        *self.lock() = ListState::default();
    }

    fn lock(&self) -> MutexGuard<'_, ListState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
