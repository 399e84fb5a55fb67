//! Live update feed messages

use crate::contact::ContactEvent;
use crate::error::ModelResult;
use serde::{Deserialize, Serialize};

/// Message kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateKind {
    /// Contact created or deleted
    #[serde(rename = "contacts_update", alias = "contatos_update")]
    ContactsUpdate,
    /// Any other feed message
    #[serde(other)]
    Other,
}

/// Action carried by a contacts update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveAction {
    Create,
    Delete,
    /// Updates and unknown actions; never patched
    #[default]
    #[serde(other)]
    Other,
}

impl LiveAction {
    /// Count delta for patchable actions
    #[inline]
    #[must_use]
    pub fn delta(self) -> Option<i64> {
        match self {
            Self::Create => Some(1),
            Self::Delete => Some(-1),
            Self::Other => None,
        }
    }
}

/// One message from the live feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,

    #[serde(default)]
    pub action: LiveAction,

    /// Partial contact payload
    #[serde(default)]
    pub data: Option<ContactEvent>,

    /// Opaque, increasing identifier used only to bust the signature
    #[serde(default)]
    pub update_id: u64,
}

impl LiveUpdate {
    /// Contact-created message
    #[inline]
    #[must_use]
    pub fn create(data: ContactEvent, update_id: u64) -> Self {
        Self {
            kind: UpdateKind::ContactsUpdate,
            action: LiveAction::Create,
            data: Some(data),
            update_id,
        }
    }

    /// Contact-deleted message
    #[inline]
    #[must_use]
    pub fn delete(data: ContactEvent, update_id: u64) -> Self {
        Self {
            kind: UpdateKind::ContactsUpdate,
            action: LiveAction::Delete,
            data: Some(data),
            update_id,
        }
    }

    /// Decode a JSON text frame
    ///
    /// # Errors
    /// Returns error if the frame is not a valid live message
    pub fn from_json(frame: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Whether this message is a contacts update
    #[inline]
    #[must_use]
    pub fn is_contacts_update(&self) -> bool {
        self.kind == UpdateKind::ContactsUpdate
    }
}
