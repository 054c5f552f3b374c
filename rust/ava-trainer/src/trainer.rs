//! The training workflow: a tagging session driven through fetch and save.
//!
//! [`Trainer`] connects a [`TaggingSession`] to a [`SentenceStore`]. Event
//! handlers (key presses, taps, button clicks) receive a [`SessionHandle`]
//! and call into the trainer with it; the handle is the only owner of the
//! session's state and lives exactly as long as the page showing it.
//!
//! ```text
//! start ─▶ SessionHandle ─┬─ toggle / retreat (sync)
//!                         └─ advance ─┬─ Moved(category)
//!                                     └─ payload ─▶ store.save ─┬─ Saved { reset_after }
//!                                                               └─ Err(SaveFailed) (retry by advancing)
//! ```
//!
//! The session lock is never held across an `.await`: the payload is taken
//! under the lock, the save runs without it, and its outcome is applied
//! under the lock again. Another advance arriving while the save is out sees
//! the session in `Saving` and does not dispatch a second save.

use std::sync::Arc;
use std::time::Duration;

use ava_tagger::{Advance, Category, TaggingSession, Word};
use parking_lot::Mutex;

use crate::config::{DEFAULT_RESET_DELAY, TrainerConfig};
use crate::error::TrainerError;
use crate::store::SentenceStore;

/// Shared handle to the tagging session of one page view.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    session: Arc<Mutex<TaggingSession>>,
}

impl SessionHandle {
    pub fn new(session: TaggingSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Run `f` with read access to the session.
    pub fn read<R>(&self, f: impl FnOnce(&TaggingSession) -> R) -> R {
        f(&self.session.lock())
    }

    fn write<R>(&self, f: impl FnOnce(&mut TaggingSession) -> R) -> R {
        f(&mut self.session.lock())
    }

    /// A copy of the session as it is now, for rendering.
    pub fn snapshot(&self) -> TaggingSession {
        self.read(|session| session.clone())
    }

    pub fn id(&self) -> u64 {
        self.read(|session| session.sentence().id)
    }

    pub fn is_saving(&self) -> bool {
        self.read(|session| session.is_saving())
    }
}

/// What an advance did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The active category changed.
    Moved(Category),
    /// The tagged sentence was stored. The caller should show the completed
    /// state and start over after `reset_after`.
    Saved { reset_after: Duration },
    /// A save for this session is already in flight.
    SaveInProgress,
    /// The session was saved earlier.
    AlreadySaved,
}

/// Drives tagging sessions against a sentence store.
pub struct Trainer<S> {
    store: S,
    reset_delay: Duration,
}

impl<S> Trainer<S>
where
    S: SentenceStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    /// Create a trainer using the delays from `config`.
    pub fn with_config(store: S, config: &TrainerConfig) -> Self {
        Self::new(store).with_reset_delay(config.reset_delay)
    }

    pub fn with_reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch a sentence and open a session over it.
    ///
    /// With `sentence_id` the given sentence is fetched, otherwise the next
    /// one needing work. `Ok(None)` means there is nothing left to annotate.
    pub async fn start(
        &self,
        sentence_id: Option<u64>,
        assignment_id: Option<String>,
    ) -> Result<Option<SessionHandle>, TrainerError> {
        let Some(sentence) = self.store.fetch(sentence_id).await? else {
            tracing::info!("no sentences need annotating");
            return Ok(None);
        };
        tracing::info!(id = sentence.id, "starting tagging session");
        Ok(Some(SessionHandle::new(sentence.into_session(assignment_id))))
    }

    /// Tap word `index` under the active category.
    pub fn toggle(&self, handle: &SessionHandle, index: usize) -> Result<Word, TrainerError> {
        Ok(handle.write(|session| session.toggle(index).cloned())?)
    }

    /// Move back one category; `None` when there is nowhere to go.
    pub fn retreat(&self, handle: &SessionHandle) -> Option<Category> {
        handle.write(|session| session.retreat())
    }

    /// Move to the next category, saving when advancing past the last.
    ///
    /// A rejected save leaves the session at the last category with the
    /// server's message recorded, and returns [`TrainerError::SaveFailed`];
    /// advancing again resubmits the whole sentence.
    pub async fn advance(&self, handle: &SessionHandle) -> Result<Progress, TrainerError> {
        let payload = match handle.write(|session| session.advance()) {
            Advance::Moved(category) => return Ok(Progress::Moved(category)),
            Advance::SaveInProgress => return Ok(Progress::SaveInProgress),
            Advance::Complete => return Ok(Progress::AlreadySaved),
            Advance::Save(payload) => payload,
        };

        match self.store.save(&payload).await {
            Ok(()) => {
                handle.write(|session| session.complete_save());
                tracing::info!(id = payload.id, "tagged sentence saved");
                Ok(Progress::Saved {
                    reset_after: self.reset_delay,
                })
            }
            Err(error) => {
                let message = error.message();
                tracing::warn!(id = payload.id, %message, "saving tagged sentence failed");
                handle.write(|session| session.fail_save(message.clone()));
                Err(TrainerError::SaveFailed { message })
            }
        }
    }

    /// Open a session over the next sentence in place of `handle`.
    ///
    /// The caller drops `handle` once a new session is returned. If the fetch
    /// fails, `handle` is left as it was so the trainer can carry on or skip
    /// again.
    pub async fn skip(&self, handle: &SessionHandle) -> Result<Option<SessionHandle>, TrainerError> {
        tracing::info!(id = handle.id(), "skipping sentence");
        self.start(None, None).await
    }

    /// Wait out the reset delay after a save, then start on the next sentence.
    pub async fn next_after_reset(&self) -> Result<Option<SessionHandle>, TrainerError> {
        tokio::time::sleep(self.reset_delay).await;
        self.start(None, None).await
    }
}
