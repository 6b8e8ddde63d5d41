//! Session lookup against a running notebook server.
//!
//! A session ties a kernel to the notebook file it executes. The server
//! exposes the active list at `api/sessions`; the kernel side identifies
//! its own session by matching its kernel id against the connection file
//! path the server handed it at launch.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::resolver::ResolveError;
use crate::server::ServerInfo;

/// The kernel half of a session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KernelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One active session, as returned by `api/sessions`.
///
/// Created by the notebook server; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token; doubles as the database name on first bind.
    pub id: String,
    /// Notebook file path relative to the server root.
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    pub kernel: KernelInfo,
}

/// HTTP client for one server's session API.
pub struct SessionClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl SessionClient {
    pub fn new(server: &ServerInfo) -> Result<Self, ResolveError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(&server.url)?,
            token: server.token.clone(),
        })
    }

    /// Fetch the active session list.
    ///
    /// One authenticated GET, no retry, no configured timeout; transport
    /// failures and malformed bodies propagate to the caller as-is.
    pub async fn fetch_sessions(&self) -> Result<Vec<Session>, ResolveError> {
        let endpoint = self.base_url.join("api/sessions")?;
        debug!("[session] GET {}", endpoint);
        let response = self
            .http
            .get(endpoint)
            .query(&[("token", self.token.as_str())])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Find the current kernel's connection file under `runtime_dir`.
///
/// The server writes one `kernel-*.json` per kernel it launches; the most
/// recently modified one belongs to the newest kernel, which is the
/// behavior notebook clients rely on when no explicit path is given.
pub fn find_connection_file(runtime_dir: &Path) -> Result<PathBuf, ResolveError> {
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(runtime_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("kernel-") || !name.ends_with(".json") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            newest = Some((modified, entry.path()));
        }
    }
    newest
        .map(|(_, path)| path)
        .ok_or_else(|| ResolveError::ConnectionFileNotFound {
            runtime_dir: runtime_dir.to_path_buf(),
        })
}

/// Select the session whose kernel id occurs in the connection file path.
///
/// Connection files are named after the kernel id, so a substring match is
/// how the kernel recognizes itself in the session list. Kept as a
/// substring (not exact) match deliberately.
pub fn match_session<'a>(sessions: &'a [Session], connection_file: &Path) -> Option<&'a Session> {
    let path = connection_file.to_string_lossy();
    sessions
        .iter()
        .find(|session| path.contains(&session.kernel.id))
}
