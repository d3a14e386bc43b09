use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{HintCatalog, HintImage, PlayerId, SessionState, TargetWord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("revision conflict: expected {expected}, found {actual}")]
    Conflict { expected: u64, actual: u64 },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored session plus the bookkeeping needed for conditional writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub state: SessionState,
    /// Bumped on every successful write.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

/// Per-player session store.
///
/// `replace_session` is the compare-and-swap used for every mutation after
/// Init: it only writes if the stored revision still equals `expected`, so
/// two requests that read the same revision cannot both win.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Fetch the session for a player.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the player has no session.
    async fn get_session(&self, player: &PlayerId) -> Result<SessionRecord, StorageError>;

    /// Create or overwrite a session unconditionally. Returns the new revision.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn put_session(
        &self,
        player: &PlayerId,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError>;

    /// Overwrite a session only if its revision is still `expected`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another write landed first, or
    /// `StorageError::NotFound` if the session is gone.
    async fn replace_session(
        &self,
        player: &PlayerId,
        expected: u64,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError>;
}

/// Read access to the hint dataset, plus the upsert used when importing it.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Load every target and its hints.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a stored target does not have
    /// exactly three hints.
    async fn load_catalog(&self) -> Result<HintCatalog, StorageError>;

    /// Add or replace the hints of one target.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the hints cannot be stored.
    async fn upsert_target(
        &self,
        target: &TargetWord,
        hints: &[HintImage],
    ) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    sessions: Arc<Mutex<HashMap<PlayerId, SessionRecord>>>,
    catalog: Arc<Mutex<Vec<(TargetWord, Vec<HintImage>)>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-loaded with a catalog.
    #[must_use]
    pub fn with_catalog(catalog: &HintCatalog) -> Self {
        let entries = catalog
            .iter()
            .map(|(word, hints)| (word.clone(), hints.to_vec()))
            .collect();
        Self {
            sessions: Arc::default(),
            catalog: Arc::new(Mutex::new(entries)),
        }
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn get_session(&self, player: &PlayerId) -> Result<SessionRecord, StorageError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(player).cloned().ok_or(StorageError::NotFound)
    }

    async fn put_session(
        &self,
        player: &PlayerId,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let revision = guard.get(player).map_or(1, |r| r.revision + 1);
        guard.insert(
            player.clone(),
            SessionRecord {
                state: state.clone(),
                revision,
                updated_at: at,
            },
        );
        Ok(revision)
    }

    async fn replace_session(
        &self,
        player: &PlayerId,
        expected: u64,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard.get_mut(player).ok_or(StorageError::NotFound)?;
        if record.revision != expected {
            return Err(StorageError::Conflict {
                expected,
                actual: record.revision,
            });
        }
        record.state = state.clone();
        record.revision += 1;
        record.updated_at = at;
        Ok(record.revision)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryRepository {
    async fn load_catalog(&self) -> Result<HintCatalog, StorageError> {
        let guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut catalog = HintCatalog::new();
        for (word, hints) in guard.iter() {
            catalog
                .insert(word.clone(), hints.clone())
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
        }
        Ok(catalog)
    }

    async fn upsert_target(
        &self,
        target: &TargetWord,
        hints: &[HintImage],
    ) -> Result<(), StorageError> {
        let mut guard = self
            .catalog
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter().position(|(word, _)| word == target) {
            Some(idx) => guard[idx].1 = hints.to_vec(),
            None => guard.push((target.clone(), hints.to_vec())),
        }
        Ok(())
    }
}

/// Aggregates the session and catalog repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let catalog: Arc<dyn CatalogRepository> = Arc::new(repo);
        Self { sessions, catalog }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn state(target_index: u32) -> SessionState {
        let targets = ["cat", "dog", "owl"]
            .into_iter()
            .map(|w| TargetWord::new(w).unwrap())
            .collect();
        SessionState::from_persisted(targets, target_index, 0, 0, 0, false).unwrap()
    }

    fn player() -> PlayerId {
        PlayerId::new("p1").unwrap()
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.get_session(&player()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn put_bumps_revision() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.put_session(&player(), &state(0), fixed_now()).await.unwrap(), 1);
        assert_eq!(repo.put_session(&player(), &state(1), fixed_now()).await.unwrap(), 2);
        let record = repo.get_session(&player()).await.unwrap();
        assert_eq!(record.revision, 2);
        assert_eq!(record.state.current_target_index(), 1);
    }

    #[tokio::test]
    async fn stale_replace_conflicts() {
        let repo = InMemoryRepository::new();
        repo.put_session(&player(), &state(0), fixed_now()).await.unwrap();

        let rev = repo
            .replace_session(&player(), 1, &state(1), fixed_now())
            .await
            .unwrap();
        assert_eq!(rev, 2);

        let err = repo
            .replace_session(&player(), 1, &state(2), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { expected: 1, actual: 2 }));
        let record = repo.get_session(&player()).await.unwrap();
        assert_eq!(record.state.current_target_index(), 1);
    }

    #[tokio::test]
    async fn replace_without_session_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo
            .replace_session(&player(), 1, &state(0), fixed_now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn catalog_rejects_bad_hint_count_on_load() {
        let repo = InMemoryRepository::new();
        let word = TargetWord::new("kite").unwrap();
        repo.upsert_target(&word, &[HintImage::new("k0")]).await.unwrap();
        let err = repo.load_catalog().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));

        let hints: Vec<HintImage> = ["k0", "k1", "k2"].into_iter().map(HintImage::new).collect();
        repo.upsert_target(&word, &hints).await.unwrap();
        assert_eq!(repo.load_catalog().await.unwrap().len(), 1);
    }
}
