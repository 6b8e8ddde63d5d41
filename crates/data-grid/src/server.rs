//! Discovery of running Jupyter notebook servers.
//!
//! The notebook server writes an `nbserver-<pid>.json` info file into the
//! Jupyter runtime directory on startup and removes it on shutdown, so
//! listing those files is how a kernel-side process learns which servers
//! are alive and how to reach them.

use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::resolver::ResolveError;

/// Connection info for one running notebook server, as written to its
/// runtime info file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Base URL clients talk to, e.g. `http://localhost:8888/`.
    pub url: String,
    /// API token; empty when the server runs without authentication.
    #[serde(default)]
    pub token: String,
    /// Pid of the server process. The resolver matches this against the
    /// kernel's parent pid to find the server that spawned it.
    pub pid: u32,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub notebook_dir: Option<String>,
}

/// List the servers currently advertising an info file under `runtime_dir`.
///
/// Unreadable or malformed info files are skipped with a warning; a stale
/// file from a crashed server shouldn't take session resolution down.
pub fn list_running_servers(runtime_dir: &Path) -> Result<Vec<ServerInfo>, ResolveError> {
    let mut servers = Vec::new();
    for entry in std::fs::read_dir(runtime_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with("nbserver-") || !name.ends_with(".json") {
            continue;
        }
        match std::fs::read_to_string(entry.path()) {
            Ok(contents) => match serde_json::from_str::<ServerInfo>(&contents) {
                Ok(info) => servers.push(info),
                Err(e) => warn!("[server] skipping malformed {:?}: {}", entry.path(), e),
            },
            Err(e) => warn!("[server] skipping unreadable {:?}: {}", entry.path(), e),
        }
    }
    Ok(servers)
}

/// Select the server whose pid equals `parent_pid`.
///
/// Fails with [`ResolveError::ServerNotFound`] when no server matches and
/// with [`ResolveError::AmbiguousServer`] when more than one does (two
/// matches would mean a stale info file reusing the pid; picking one
/// silently could bind the wrong server).
pub fn find_server(
    servers: Vec<ServerInfo>,
    parent_pid: u32,
) -> Result<ServerInfo, ResolveError> {
    let mut matches: Vec<ServerInfo> = servers
        .into_iter()
        .filter(|server| server.pid == parent_pid)
        .collect();
    match matches.len() {
        0 => Err(ResolveError::ServerNotFound { parent_pid }),
        1 => Ok(matches.remove(0)),
        count => Err(ResolveError::AmbiguousServer { parent_pid, count }),
    }
}

/// Derive the browser storage namespace key from a server URL.
///
/// Each maximal run of `:` and `/` characters becomes a single `_`, so
/// `http://localhost:8888/` maps to `http_localhost_8888_`. This matches
/// the origin directory names Chrome uses for WebSQL storage.
pub fn origin_for_url(url: &str) -> String {
    let mut origin = String::with_capacity(url.len());
    let mut in_separator = false;
    for c in url.chars() {
        if c == ':' || c == '/' {
            if !in_separator {
                origin.push('_');
            }
            in_separator = true;
        } else {
            origin.push(c);
            in_separator = false;
        }
    }
    origin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(pid: u32) -> ServerInfo {
        ServerInfo {
            url: format!("http://localhost:{}/", 8880 + pid),
            token: "tok".into(),
            pid,
            base_url: "/".into(),
            port: 8880 + pid as u16,
            notebook_dir: None,
        }
    }

    #[test]
    fn test_origin_for_url() {
        assert_eq!(origin_for_url("http://localhost:8888/"), "http_localhost_8888_");
        assert_eq!(
            origin_for_url("https://hub.example.com:443/user/a"),
            "https_hub.example.com_443_user_a"
        );
        assert_eq!(origin_for_url("http://localhost:8888"), "http_localhost_8888");
    }

    #[test]
    fn test_find_server_unique_match() {
        let found = find_server(vec![server(1), server(2)], 2).unwrap();
        assert_eq!(found.pid, 2);
    }

    #[test]
    fn test_find_server_no_match() {
        let result = find_server(vec![server(1)], 99);
        assert!(matches!(
            result,
            Err(ResolveError::ServerNotFound { parent_pid: 99 })
        ));
    }

    #[test]
    fn test_find_server_ambiguous() {
        let result = find_server(vec![server(7), server(7)], 7);
        assert!(matches!(
            result,
            Err(ResolveError::AmbiguousServer { parent_pid: 7, count: 2 })
        ));
    }

    #[test]
    fn test_list_running_servers_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("nbserver-41.json"),
            r#"{"url": "http://localhost:8888/", "token": "tok", "pid": 41}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("nbserver-42.json"), "not json").unwrap();
        // Kernel connection files in the same directory are ignored
        std::fs::write(dir.path().join("kernel-abc.json"), "{}").unwrap();

        let servers = list_running_servers(dir.path()).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].pid, 41);
        assert_eq!(servers[0].url, "http://localhost:8888/");
    }

    #[test]
    fn test_list_running_servers_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_running_servers(&missing).is_err());
    }
}
