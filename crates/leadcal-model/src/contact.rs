//! Contact events and roster records
//!
//! Both types are supplied by an external data source and never mutated by
//! the engine. Field names on the wire follow the upstream API.

use crate::period::DayKey;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

/// Owner-identifier candidates of one event, in resolution order
pub type OwnerCandidates<'a> = SmallVec<[&'a str; 2]>;

/// Upstream contact identifier (numeric or textual)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContactId {
    /// Numeric database key
    Numeric(i64),
    /// Opaque textual key
    Text(String),
}

impl Display for ContactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ContactId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

/// Contact-type classification used for the per-type statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactKind {
    /// Outbound contact ("Ativo")
    Active,
    /// Inbound contact ("Receptivo")
    Receptive,
    /// Missing or any other tag
    Other,
}

/// One raw lead/contact record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Upstream identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,

    /// Day-level date, first 10 characters significant
    #[serde(rename = "data_dia", default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,

    /// Full timestamp, used when `day` is absent
    #[serde(rename = "data_hora", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Primary owner identifier (login, e-mail or display name)
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Fallback owner identifier
    #[serde(rename = "vendedor", default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,

    /// Contact-type tag ("Ativo", "Receptivo", ...)
    #[serde(rename = "tipo_contato", default, skip_serializing_if = "Option::is_none")]
    pub contact_type: Option<String>,

    /// Origin/channel tag
    #[serde(rename = "origem", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl ContactEvent {
    /// Create event dated `day`
    #[inline]
    #[must_use]
    pub fn new(day: impl Into<String>) -> Self {
        Self {
            day: Some(day.into()),
            ..Self::default()
        }
    }

    /// With upstream id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ContactId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// With timestamp field
    #[inline]
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// With primary owner identifier
    #[inline]
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// With fallback owner identifier
    #[inline]
    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// With contact-type tag
    #[inline]
    #[must_use]
    pub fn with_contact_type(mut self, contact_type: impl Into<String>) -> Self {
        self.contact_type = Some(contact_type.into());
        self
    }

    /// With origin tag
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Raw date text: the day field when non-empty, otherwise the timestamp
    #[inline]
    #[must_use]
    pub fn raw_date(&self) -> Option<&str> {
        non_empty(self.day.as_deref()).or_else(|| non_empty(self.timestamp.as_deref()))
    }

    /// Parsed day key, `None` when the date is missing or malformed
    #[inline]
    #[must_use]
    pub fn day_key(&self) -> Option<DayKey> {
        self.raw_date().and_then(DayKey::parse)
    }

    /// Contact type, matched case-insensitively
    #[must_use]
    pub fn kind(&self) -> ContactKind {
        match self.contact_type.as_deref().map(str::trim) {
            Some(t) if t.eq_ignore_ascii_case("ativo") => ContactKind::Active,
            Some(t) if t.eq_ignore_ascii_case("receptivo") => ContactKind::Receptive,
            _ => ContactKind::Other,
        }
    }

    /// Owner identifiers to try, primary field first
    #[must_use]
    pub fn owner_candidates(&self) -> OwnerCandidates<'_> {
        let mut out = OwnerCandidates::new();
        out.extend(non_empty(self.user.as_deref()));
        out.extend(non_empty(self.seller.as_deref()));
        out
    }

    /// Raw string used to memoize resolution within one pass
    #[inline]
    #[must_use]
    pub fn owner_key(&self) -> Option<&str> {
        non_empty(self.user.as_deref()).or_else(|| non_empty(self.seller.as_deref()))
    }
}

/// One entry of the active seller roster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SellerRecord {
    /// Canonical full name, also the row identity
    #[serde(rename = "nomecompleto")]
    pub name: String,

    /// Optional e-mail, registered as an extra resolution key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Branch the seller belongs to
    #[serde(rename = "filial", default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// State the seller operates in
    #[serde(rename = "estado", default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl SellerRecord {
    /// Create roster entry with canonical name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            branch: None,
            state: None,
        }
    }

    /// With e-mail
    #[inline]
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// With branch
    #[inline]
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// With state
    #[inline]
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
