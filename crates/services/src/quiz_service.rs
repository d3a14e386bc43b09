use std::sync::{Arc, Mutex, PoisonError};

use quiz_core::engine::{self, Action};
use quiz_core::model::{
    CatalogError, HintCatalog, HintImage, InitialSettings, PlayerId, QuizResult, SessionState,
};
use quiz_core::picker::TargetPicker;
use storage::repository::{
    CatalogRepository, SessionRecord, SessionRepository, Storage, StorageError,
};
use tokio::sync::OnceCell;

use crate::Clock;
use crate::error::QuizServiceError;
use crate::picker::RandomPicker;
use crate::settings::QuizSettings;

/// Runs quiz actions against persisted per-player sessions.
///
/// Every mutating action is one get/compute/put cycle. The write is
/// conditional on the revision that was read; when another request for the
/// same player got there first, the cycle starts over from the fresh state.
///
/// The hint catalog is read from storage once, on first use, and shared by
/// every clone of the service afterwards.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    sessions: Arc<dyn SessionRepository>,
    catalog: Arc<dyn CatalogRepository>,
    loaded: Arc<OnceCell<Arc<HintCatalog>>>,
    picker: Arc<Mutex<Box<dyn TargetPicker>>>,
    settings: QuizSettings,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        sessions: Arc<dyn SessionRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            clock,
            sessions,
            catalog,
            loaded: Arc::new(OnceCell::new()),
            picker: Arc::new(Mutex::new(Box::new(RandomPicker::new()))),
            settings: QuizSettings::default(),
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.catalog),
        )
    }

    /// Replace the source used to draw targets on Init.
    #[must_use]
    pub fn with_picker(mut self, picker: impl TargetPicker + 'static) -> Self {
        self.picker = Arc::new(Mutex::new(Box::new(picker)));
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: QuizSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Start (or restart) a session for `player`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Catalog` if the catalog is empty, or
    /// `QuizServiceError::Storage` if loading the catalog or writing the session fails.
    pub async fn init(&self, player: &PlayerId) -> Result<InitialSettings, QuizServiceError> {
        let catalog = self.hint_catalog().await?;
        let (state, settings) = {
            let mut picker = self.picker.lock().unwrap_or_else(PoisonError::into_inner);
            engine::init(&catalog, &mut **picker)?
        };

        let revision = self
            .sessions
            .put_session(player, &state, self.clock.now())
            .await?;
        tracing::info!(
            player = %player,
            revision,
            targets = catalog.len(),
            "quiz session started"
        );
        Ok(settings)
    }

    /// Submit an estimate for the current target.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Validation` for an empty estimate,
    /// `UnknownPlayer`, `SessionEnded`, `Contended`, or `Storage`.
    pub async fn guess(
        &self,
        player: &PlayerId,
        estimation: &str,
    ) -> Result<QuizResult, QuizServiceError> {
        self.act(player, Action::Guess(estimation)).await
    }

    /// Reveal the next hint image without spending a guess.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NoMoreHints` on the last hint,
    /// `UnknownPlayer`, `SessionEnded`, `Contended`, or `Storage`.
    pub async fn request_hint(&self, player: &PlayerId) -> Result<QuizResult, QuizServiceError> {
        self.act(player, Action::RequestHint).await
    }

    /// Reveal the current target and move on.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPlayer`, `SessionEnded`, `Contended`, or `Storage`.
    pub async fn give_up(&self, player: &PlayerId) -> Result<QuizResult, QuizServiceError> {
        self.act(player, Action::GiveUp).await
    }

    /// Current session state, read-only.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownPlayer` if the player has no session.
    pub async fn session(&self, player: &PlayerId) -> Result<SessionState, QuizServiceError> {
        Ok(self.load(player).await?.state)
    }

    /// Hint images revealed so far for the player's current target.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPlayer`, `Catalog` if the target has left the catalog,
    /// or `Storage`.
    pub async fn current_hints(
        &self,
        player: &PlayerId,
    ) -> Result<Vec<HintImage>, QuizServiceError> {
        let state = self.load(player).await?.state;
        let catalog = self.hint_catalog().await?;
        let hints = catalog.revealed(state.current_target(), state.current_hint_index())?;
        Ok(hints.to_vec())
    }

    /// Cached catalog. An empty catalog is not cached, so seeding after
    /// startup is picked up by the next Init.
    async fn hint_catalog(&self) -> Result<Arc<HintCatalog>, QuizServiceError> {
        let catalog = self
            .loaded
            .get_or_try_init(|| async {
                let catalog = self.catalog.load_catalog().await?;
                if catalog.is_empty() {
                    return Err(QuizServiceError::Catalog(CatalogError::Empty));
                }
                tracing::info!(targets = catalog.len(), "hint catalog loaded");
                Ok(Arc::new(catalog))
            })
            .await?;
        Ok(Arc::clone(catalog))
    }

    async fn load(&self, player: &PlayerId) -> Result<SessionRecord, QuizServiceError> {
        self.sessions
            .get_session(player)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => QuizServiceError::UnknownPlayer {
                    player: player.to_string(),
                },
                other => QuizServiceError::Storage(other),
            })
    }

    async fn act(
        &self,
        player: &PlayerId,
        action: Action<'_>,
    ) -> Result<QuizResult, QuizServiceError> {
        let attempts = self.settings.max_attempts();
        for attempt in 1..=attempts {
            let record = self.load(player).await?;
            let transition = engine::apply(&record.state, action)?;

            match self
                .sessions
                .replace_session(player, record.revision, &transition.state, self.clock.now())
                .await
            {
                Ok(revision) => {
                    tracing::debug!(
                        player = %player,
                        ?action,
                        revision,
                        target_index = transition.state.current_target_index(),
                        hint_index = transition.state.current_hint_index(),
                        trial = transition.state.trial(),
                        score = transition.state.score(),
                        "quiz transition stored"
                    );
                    if transition.result.end {
                        tracing::info!(
                            player = %player,
                            score = transition.result.score,
                            "quiz session ended"
                        );
                    }
                    return Ok(transition.result);
                }
                Err(StorageError::Conflict { expected, actual }) => {
                    tracing::warn!(
                        player = %player,
                        attempt,
                        expected,
                        actual,
                        "session changed underneath request; retrying"
                    );
                }
                Err(StorageError::NotFound) => {
                    return Err(QuizServiceError::UnknownPlayer {
                        player: player.to_string(),
                    });
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(QuizServiceError::Contended {
            player: player.to_string(),
            attempts,
        })
    }
}
