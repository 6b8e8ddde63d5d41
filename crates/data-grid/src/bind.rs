//! One-call construction of a session-bound widget.

use grid_protocol::DataGridWidget;

use crate::catalog::{Catalog, CatalogError};
use crate::resolver::{resolve, ResolveError, ResolverConfig};

/// Error type for the combined resolve-and-bind flow.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("session resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("catalog binding failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// Resolve the current session and construct a widget over its database.
///
/// Runs the resolver, finds or creates the session's catalog entry, and
/// hands back a widget whose `db` is the bound database name. Callers that
/// already know their database name should construct
/// [`DataGridWidget::new`] directly; resolution is an optional layer, not
/// a requirement.
pub async fn bind(
    table: &str,
    config: &ResolverConfig,
    catalog: &Catalog,
) -> Result<DataGridWidget, BindError> {
    let resolved = resolve(config).await?;
    let db = catalog.database_name(&resolved.origin, &resolved.session)?;
    Ok(DataGridWidget::new(table, db))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_propagates_resolution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = ResolverConfig {
            runtime_dir: dir.path().to_path_buf(),
            parent_pid: 4242,
            connection_file: None,
        };
        let catalog = Catalog::new(dir.path());

        let result = bind("t1", &config, &catalog).await;
        assert!(matches!(
            result,
            Err(BindError::Resolve(ResolveError::ServerNotFound { .. }))
        ));
    }
}
