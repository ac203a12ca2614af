//! Session persistence for the card being edited.
//!
//! The session directory holds one key-value entry per file; the card lives
//! under the fixed key `cardData`, i.e. `<session>/cardData.json`. The saved
//! form is the full card JSON, illustration included.
//!
//! Loading is forgiving: a missing entry means "no saved card", and a
//! malformed one is logged and treated the same way, so a corrupted session
//! never blocks the designer from starting with the default card.

use crate::card::CardModel;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Key under which the card is stored.
pub const SESSION_KEY: &str = "cardData";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed saved card: {0}")]
    Parse(#[from] serde_json::Error),
}

/// JSON-file key-value store rooted at a session directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn card_path(&self) -> PathBuf {
        self.dir.join(format!("{SESSION_KEY}.json"))
    }

    /// Strict load: `Ok(None)` if nothing is saved, `Err` if the saved entry
    /// can't be read or parsed.
    pub fn try_load(&self) -> Result<Option<CardModel>, PersistenceError> {
        let bytes = match fs::read(self.card_path()) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(CardModel::from_json(&bytes)?))
    }

    /// Load the saved card. Errors are logged and swallowed.
    pub fn load(&self) -> Option<CardModel> {
        match self.try_load() {
            Ok(card) => card,
            Err(e) => {
                tracing::warn!(path = %self.card_path().display(), error = %e, "ignoring saved card");
                None
            }
        }
    }

    /// The saved card, or the default card when there is none.
    pub fn load_or_default(&self) -> CardModel {
        self.load().unwrap_or_default()
    }

    pub fn save(&self, card: &CardModel) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let json = card.to_json_pretty(true)?;
        fs::write(self.card_path(), json)?;
        tracing::info!(card = %card.name, "session saved");
        Ok(())
    }

    /// Forget the saved card. Clearing an empty session is not an error.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        match fs::remove_file(self.card_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
