//! Completed-recording artifacts and revocable download handles.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// A revocable handle to an in-memory blob, in the `blob:<uuid>` scheme.
///
/// Minted by [`ObjectUrls::create`]; resolving a revoked handle yields
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadUrl(String);

impl DownloadUrl {
    /// The handle as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DownloadUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live download handles.
///
/// The in-process analog of the platform's object-URL surface: the core
/// produces and revokes handles; rendering the download affordance is the
/// presentation layer's job.
#[derive(Debug, Default)]
pub struct ObjectUrls {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl ObjectUrls {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh handle for `data`.
    pub fn create(&mut self, data: Arc<Vec<u8>>) -> DownloadUrl {
        let url = format!("blob:{}", Uuid::new_v4());
        self.entries.insert(url.clone(), data);
        DownloadUrl(url)
    }

    /// Resolves a handle to its blob, or `None` if revoked or unknown.
    #[must_use]
    pub fn resolve(&self, url: &DownloadUrl) -> Option<Arc<Vec<u8>>> {
        self.entries.get(url.as_str()).cloned()
    }

    /// Revokes a handle. Returns `true` if it was live.
    pub fn revoke(&mut self, url: &DownloadUrl) -> bool {
        self.entries.remove(url.as_str()).is_some()
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no handles are live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The completed, downloadable recording produced at the end of a session.
///
/// Created exactly once per completed session. When a new recording starts
/// or the controller is reconfigured, the previous artifact's URL is
/// revoked.
#[derive(Debug, Clone)]
pub struct Artifact {
    data: Arc<Vec<u8>>,
    url: DownloadUrl,
    filename: String,
}

impl Artifact {
    pub(crate) fn new(data: Arc<Vec<u8>>, url: DownloadUrl, filename: String) -> Self {
        Self {
            data,
            url,
            filename,
        }
    }

    /// The concatenated recording bytes.
    #[must_use]
    pub fn data(&self) -> &Arc<Vec<u8>> {
        &self.data
    }

    /// The revocable download handle.
    #[must_use]
    pub fn url(&self) -> &DownloadUrl {
        &self.url
    }

    /// Filename derived from the finalize instant,
    /// e.g. `2024-05-01T12:00:00.000Z.mp4`.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Size of the recording in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` when the recording contains no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes the recording to `path`.
    ///
    /// Convenience backend for a host's "download" affordance; the crate
    /// itself does not manage persistence.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.data.as_slice())
    }
}

/// Derives the download filename from the finalize instant.
///
/// `extension` includes the leading dot.
pub(crate) fn derive_filename(finalized_at: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}{}",
        finalized_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        extension
    )
}
