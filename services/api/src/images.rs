//! Recipe and author image files
//!
//! Removing an image is best-effort: a failure is logged and handed to the
//! optional [`CleanupObserver`], and never fails the request that caused it.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, warn};

/// A best-effort image removal that did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub image_name: String,
    pub reason: String,
}

/// Callback notified of every failed cleanup
pub type CleanupObserver = Arc<dyn Fn(&CleanupFailure) + Send + Sync>;

/// Image files stored under one directory
#[derive(Clone)]
pub struct ImageDepot {
    root: PathBuf,
    observer: Option<CleanupObserver>,
}

impl fmt::Debug for ImageDepot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageDepot")
            .field("root", &self.root)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ImageDepot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            observer: None,
        }
    }

    /// Observe cleanup failures in addition to the log line
    pub fn with_observer(mut self, observer: CleanupObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bare file name under the depot root
    pub fn resolve(&self, image_name: &str) -> Option<PathBuf> {
        let name = Path::new(image_name);
        if image_name.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return None;
        }
        Some(self.root.join(name))
    }

    /// Remove an image, reporting rather than returning any failure.
    ///
    /// An empty name means the record had no image and is not a failure.
    pub async fn remove_best_effort(&self, image_name: &str) {
        if image_name.is_empty() {
            return;
        }

        let result = match self.resolve(image_name) {
            Some(path) => tokio::fs::remove_file(&path)
                .await
                .map_err(|e| e.to_string()),
            None => Err("image name is not a plain file name".to_string()),
        };

        match result {
            Ok(()) => info!("Removed image {}", image_name),
            Err(reason) => {
                warn!("Failed to delete image {}: {}", image_name, reason);
                if let Some(observer) = &self.observer {
                    observer(&CleanupFailure {
                        image_name: image_name.to_string(),
                        reason,
                    });
                }
            }
        }
    }
}
