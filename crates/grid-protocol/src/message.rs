//! Host/view message passing for widget state synchronization.
//!
//! The protocol mirrors the Jupyter comm lifecycle: an `open` message
//! carries the full initial state (plus the contract version), `update`
//! messages carry partial state deltas that are merged key by key, and
//! `close` tears the model down. [`WidgetModel`] is the receiving side's
//! view of that lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::widget::{DataGridWidget, PROTOCOL_VERSION};

/// Error type for protocol violations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("protocol version mismatch: host speaks {expected}, peer sent {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("widget state does not match the declared schema: {0}")]
    MalformedState(#[from] serde_json::Error),

    #[error("expected an open message to establish the model")]
    ExpectedOpen,

    #[error("model is closed")]
    Closed,
}

/// A message exchanged between the host and the rendering view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetMessage {
    /// Full initial state, tagged with the contract version.
    Open { version: u32, state: DataGridWidget },
    /// Partial state delta; only the keys present are replaced.
    Update { state: Value },
    /// Tear the model down.
    Close,
}

impl WidgetMessage {
    /// Build an `open` message for the current [`PROTOCOL_VERSION`].
    pub fn open(state: DataGridWidget) -> Self {
        WidgetMessage::Open {
            version: PROTOCOL_VERSION,
            state,
        }
    }

    /// Build an `update` message from a state delta.
    pub fn update(delta: Value) -> Self {
        WidgetMessage::Update { state: delta }
    }
}

/// The receiving side's model of a widget, fed by [`WidgetMessage`]s.
///
/// State is kept as a JSON object so deltas merge without touching fields
/// they don't mention; [`WidgetModel::widget`] projects it back into the
/// typed struct.
#[derive(Debug, Clone)]
pub struct WidgetModel {
    state: Map<String, Value>,
    closed: bool,
}

impl WidgetModel {
    /// Establish a model from an `open` message.
    ///
    /// Rejects a version the host does not speak, and any non-`open`
    /// message.
    pub fn from_open(message: &WidgetMessage) -> Result<Self, ProtocolError> {
        match message {
            WidgetMessage::Open { version, state } => {
                if *version != PROTOCOL_VERSION {
                    return Err(ProtocolError::VersionMismatch {
                        expected: PROTOCOL_VERSION,
                        got: *version,
                    });
                }
                let value = serde_json::to_value(state)?;
                let state = value.as_object().cloned().unwrap_or_default();
                Ok(Self {
                    state,
                    closed: false,
                })
            }
            _ => Err(ProtocolError::ExpectedOpen),
        }
    }

    /// Apply a subsequent message to the model.
    ///
    /// `update` merges its delta key by key, preserving untouched fields.
    /// A second `open` resets the model to the carried state (after the
    /// same version check). Nothing may follow `close`.
    pub fn apply(&mut self, message: &WidgetMessage) -> Result<(), ProtocolError> {
        if self.closed {
            return Err(ProtocolError::Closed);
        }
        match message {
            WidgetMessage::Open { .. } => {
                *self = Self::from_open(message)?;
                Ok(())
            }
            WidgetMessage::Update { state } => {
                if let Some(delta) = state.as_object() {
                    for (key, value) in delta {
                        self.state.insert(key.clone(), value.clone());
                    }
                }
                Ok(())
            }
            WidgetMessage::Close => {
                self.closed = true;
                Ok(())
            }
        }
    }

    /// Project the merged state back into the typed widget struct.
    pub fn widget(&self) -> Result<DataGridWidget, ProtocolError> {
        Ok(serde_json::from_value(Value::Object(self.state.clone()))?)
    }

    /// Raw merged state.
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
