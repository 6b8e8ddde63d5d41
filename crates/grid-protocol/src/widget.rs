//! The widget state struct and its declared synchronization surface.

use serde::{Deserialize, Serialize};

/// Name of the front-end view class the notebook loads for this widget.
pub const VIEW_NAME: &str = "DataGridView";

/// Module path the front-end resolves the view from.
pub const VIEW_MODULE: &str = "nbextensions/data-grid/main";

/// Version of the front-end module.
pub const VIEW_MODULE_VERSION: &str = "0.1.0";

/// Version of the host/view synchronization contract.
///
/// Bumped whenever a field is added, removed, or changes kind or direction.
/// An [`crate::message::WidgetMessage::Open`] carrying a different version is
/// rejected instead of being half-applied.
pub const PROTOCOL_VERSION: u32 = 1;

/// Wire type of a synchronized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextList,
}

/// Which side is allowed to mutate a synchronized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Only the host writes; the view treats the field as read-only.
    HostToView,
    /// Either side may write; updates flow both ways.
    Bidirectional,
}

/// One entry in the declared synchronization surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub direction: SyncDirection,
}

/// The synchronized fields of [`DataGridWidget`], in declaration order.
///
/// This is the contract the view is written against: every serialized field
/// of the state struct appears here with its wire type and sync direction.
pub const SYNC_FIELDS: [FieldSpec; 6] = [
    FieldSpec {
        name: "table",
        kind: FieldKind::Text,
        direction: SyncDirection::Bidirectional,
    },
    FieldSpec {
        name: "db",
        kind: FieldKind::Text,
        direction: SyncDirection::Bidirectional,
    },
    FieldSpec {
        name: "source",
        kind: FieldKind::Text,
        direction: SyncDirection::HostToView,
    },
    FieldSpec {
        name: "unused_axis",
        kind: FieldKind::TextList,
        direction: SyncDirection::Bidirectional,
    },
    FieldSpec {
        name: "col_axis",
        kind: FieldKind::TextList,
        direction: SyncDirection::Bidirectional,
    },
    FieldSpec {
        name: "row_axis",
        kind: FieldKind::TextList,
        direction: SyncDirection::Bidirectional,
    },
];

/// State of one pivotable data-grid widget.
///
/// `table` names the table to pivot inside the browser-local database `db`.
/// The three axis lists describe where each column of the table currently
/// sits in the pivot (unassigned, column axis, row axis); the view reorders
/// them as the user drags columns around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGridWidget {
    pub table: String,
    pub db: String,
    /// Optional query the view runs to populate the table before pivoting.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub unused_axis: Vec<String>,
    #[serde(default)]
    pub col_axis: Vec<String>,
    #[serde(default)]
    pub row_axis: Vec<String>,
}

impl DataGridWidget {
    /// Create a widget over `table` in the database `db`.
    ///
    /// The caller supplies the database name directly; see `data_grid::bind`
    /// for the variant that resolves it from the running notebook session.
    pub fn new(table: impl Into<String>, db: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            db: db.into(),
            source: String::new(),
            unused_axis: Vec::new(),
            col_axis: Vec::new(),
            row_axis: Vec::new(),
        }
    }

    /// Set the source query the view runs before pivoting.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_values_and_defaults_axes() {
        let widget = DataGridWidget::new("t1", "d1");
        assert_eq!(widget.table, "t1");
        assert_eq!(widget.db, "d1");
        assert_eq!(widget.source, "");
        assert!(widget.unused_axis.is_empty());
        assert!(widget.col_axis.is_empty());
        assert!(widget.row_axis.is_empty());
    }

    #[test]
    fn test_with_source() {
        let widget = DataGridWidget::new("t1", "d1").with_source("SELECT * FROM t1");
        assert_eq!(widget.source, "SELECT * FROM t1");
    }

    #[test]
    fn test_serialized_fields_match_sync_schema() {
        let value = serde_json::to_value(DataGridWidget::new("t1", "d1")).unwrap();
        let mut serialized: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        serialized.sort_unstable();

        let mut declared: Vec<&str> = SYNC_FIELDS.iter().map(|f| f.name).collect();
        declared.sort_unstable();

        assert_eq!(serialized, declared);
    }

    #[test]
    fn test_axis_lists_preserve_order() {
        let mut widget = DataGridWidget::new("t1", "d1");
        widget.col_axis = vec!["year".into(), "month".into()];
        let value = serde_json::to_value(&widget).unwrap();
        assert_eq!(
            value["col_axis"],
            serde_json::json!(["year", "month"])
        );
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let widget: DataGridWidget =
            serde_json::from_str(r#"{"table":"t1","db":"d1"}"#).unwrap();
        assert_eq!(widget, DataGridWidget::new("t1", "d1"));
    }

    #[test]
    fn test_view_metadata() {
        assert_eq!(VIEW_NAME, "DataGridView");
        assert_eq!(VIEW_MODULE, "nbextensions/data-grid/main");
        assert_eq!(VIEW_MODULE_VERSION, "0.1.0");
    }

    #[test]
    fn test_field_spec_serializes_snake_case() {
        let value = serde_json::to_value(SYNC_FIELDS[2]).unwrap();
        assert_eq!(value["name"], "source");
        assert_eq!(value["kind"], "text");
        assert_eq!(value["direction"], "host_to_view");
    }
}
