//! Host-side state and synchronization contract for the data-grid widget.
//!
//! The widget's fields are an explicit struct with a versioned field schema
//! rather than dynamically declared synchronized attributes. Hosts and views
//! exchange [`WidgetMessage`] values to keep both sides in sync; the view
//! implementation to load is identified by the static metadata in
//! [`widget`].

pub mod message;
pub mod widget;

pub use message::{ProtocolError, WidgetMessage, WidgetModel};
pub use widget::{
    DataGridWidget, FieldKind, FieldSpec, SyncDirection, PROTOCOL_VERSION, SYNC_FIELDS,
};
