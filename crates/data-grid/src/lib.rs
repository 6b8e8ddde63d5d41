//! data-grid - session-aware binding of notebook kernels to browser-local
//! pivot-grid databases.
//!
//! The library has two halves. The resolver half discovers the running
//! Jupyter notebook server that owns the current kernel (by parent pid),
//! fetches its session list over HTTP, and matches the kernel's connection
//! file to a session. The catalog half maps the resolved session to a
//! Chrome WebSQL database through the shared `Databases.db` catalog,
//! creating the catalog entry on first use.
//!
//! [`bind::bind`] chains both halves and hands back a
//! [`grid_protocol::DataGridWidget`] ready to synchronize with a view.
//! Callers that already know their database name can construct the widget
//! directly and skip resolution entirely.

pub mod bind;
pub mod catalog;
pub mod resolver;
pub mod server;
pub mod session;

pub use bind::{bind, BindError};
pub use catalog::{Catalog, CatalogError};
pub use resolver::{resolve, Resolved, ResolveError, ResolverConfig};
pub use server::{list_running_servers, origin_for_url, ServerInfo};
pub use session::{Session, SessionClient};
