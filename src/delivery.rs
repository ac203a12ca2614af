//! Handing exports to the outside world.
//!
//! The engine never opens files itself. A [`Delivery`] receives finished
//! [`Deliverable`]s; [`DirectoryDelivery`] writes them into one directory.

use crate::export::Deliverable;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Refusing to deliver to {0:?}: not a plain file name")]
    InvalidFilename(String),
}

pub trait Delivery {
    /// Deliver one export, returning where it went.
    fn deliver(&self, deliverable: &Deliverable) -> Result<PathBuf, DeliveryError>;
}

/// Writes deliverables into a directory, creating it on first use.
/// Existing files with the same name are overwritten.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl Delivery for DirectoryDelivery {
    fn deliver(&self, deliverable: &Deliverable) -> Result<PathBuf, DeliveryError> {
        if !is_plain_filename(&deliverable.filename) {
            return Err(DeliveryError::InvalidFilename(deliverable.filename.clone()));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&deliverable.filename);
        fs::write(&path, &deliverable.bytes)?;
        tracing::info!(path = %path.display(), bytes = deliverable.bytes.len(), "delivered");
        Ok(path)
    }
}
