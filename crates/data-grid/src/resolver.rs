//! The resolution pipeline: process environment to `(server, origin, session)`.
//!
//! All inputs arrive through [`ResolverConfig`] rather than being read from
//! ambient globals, so resolution stays testable without process-tree
//! mocking; [`ResolverConfig::from_env`] fills the platform defaults for
//! the common in-kernel case.

use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::server::{self, ServerInfo};
use crate::session::{self, Session, SessionClient};

/// Error type for session resolution.
///
/// Every variant is fatal to the operation that raised it; nothing is
/// retried (see the catalog layer for the storage-side equivalents).
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no running notebook server owned by parent pid {parent_pid}")]
    ServerNotFound { parent_pid: u32 },

    #[error("{count} running notebook servers claim pid {parent_pid}")]
    AmbiguousServer { parent_pid: u32, count: usize },

    #[error("no session matches connection file {connection_file:?}")]
    SessionNotFound { connection_file: PathBuf },

    #[error("no kernel connection file under {runtime_dir:?}")]
    ConnectionFileNotFound { runtime_dir: PathBuf },

    #[error("parent pid is unavailable on this platform; pass it explicitly")]
    ParentPidUnavailable,

    #[error("session list request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Explicit inputs to [`resolve`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Jupyter runtime directory holding server info and connection files.
    pub runtime_dir: PathBuf,
    /// Pid of the process expected to own the notebook server.
    pub parent_pid: u32,
    /// Kernel connection file; discovered from `runtime_dir` when `None`.
    pub connection_file: Option<PathBuf>,
}

impl ResolverConfig {
    /// Config for a known parent pid, with the platform runtime directory.
    pub fn new(parent_pid: u32) -> Self {
        Self {
            runtime_dir: runtimelib::dirs::runtime_dir(),
            parent_pid,
            connection_file: None,
        }
    }

    /// Config for the current process: its parent is expected to be the
    /// notebook server that launched this kernel.
    pub fn from_env() -> Result<Self, ResolveError> {
        let parent_pid = current_parent_pid().ok_or(ResolveError::ParentPidUnavailable)?;
        Ok(Self::new(parent_pid))
    }
}

/// Pid of this process's parent, where the platform exposes it.
#[cfg(unix)]
pub fn current_parent_pid() -> Option<u32> {
    Some(std::os::unix::process::parent_id())
}

#[cfg(not(unix))]
pub fn current_parent_pid() -> Option<u32> {
    None
}

/// Output of [`resolve`].
#[derive(Debug, Clone, Serialize)]
pub struct Resolved {
    pub server: ServerInfo,
    /// Browser storage namespace key derived from the server URL.
    pub origin: String,
    pub session: Session,
}

/// Resolve the current kernel's server, origin, and session.
///
/// Selects the server whose pid matches `config.parent_pid`, derives the
/// storage origin from its URL, fetches the session list (the single
/// network call in this crate), and matches the kernel's connection file
/// against it. Any miss or transport failure aborts resolution.
pub async fn resolve(config: &ResolverConfig) -> Result<Resolved, ResolveError> {
    let servers = server::list_running_servers(&config.runtime_dir)?;
    let server_info = server::find_server(servers, config.parent_pid)?;
    let origin = server::origin_for_url(&server_info.url);

    let client = SessionClient::new(&server_info)?;
    let sessions = client.fetch_sessions().await?;

    let connection_file = match &config.connection_file {
        Some(path) => path.clone(),
        None => session::find_connection_file(&config.runtime_dir)?,
    };
    let session = session::match_session(&sessions, &connection_file)
        .cloned()
        .ok_or(ResolveError::SessionNotFound { connection_file })?;

    info!(
        "[resolver] session {} ({}) on {}",
        session.id, session.path, server_info.url
    );
    Ok(Resolved {
        server: server_info,
        origin,
        session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_fails_without_matching_server() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig {
            runtime_dir: dir.path().to_path_buf(),
            parent_pid: 12345,
            connection_file: None,
        };
        let result = resolve(&config).await;
        assert!(matches!(
            result,
            Err(ResolveError::ServerNotFound { parent_pid: 12345 })
        ));
    }

    #[tokio::test]
    async fn test_resolve_fails_on_missing_runtime_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig {
            runtime_dir: dir.path().join("missing"),
            parent_pid: 1,
            connection_file: None,
        };
        assert!(matches!(resolve(&config).await, Err(ResolveError::Io(_))));
    }
}
