//! Active filter selection
//!
//! Branch and state narrow the roster; status and origin narrow the events.
//! Event matching is an exact, case-insensitive comparison against the
//! event's tags.

use crate::contact::ContactEvent;
use serde::{Deserialize, Serialize};

/// Origin filter sentinel meaning "every origin"
pub const ORIGIN_ALL: &str = "todos";

/// Origin assumed for events without an origin tag
pub const ORIGIN_UNSPECIFIED: &str = "nao_informado";

/// A selectable filter value with its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOption {
    pub label: &'static str,
    pub value: &'static str,
}

const fn option(label: &'static str, value: &'static str) -> FilterOption {
    FilterOption { label, value }
}

/// Contact-type filter choices; the empty value selects every status
pub const STATUS_OPTIONS: &[FilterOption] = &[
    option("Todos os status", ""),
    option("Ativo", "Ativo"),
    option("Receptivo", "Receptivo"),
];

/// Origin filter choices
pub const ORIGIN_OPTIONS: &[FilterOption] = &[
    option("Todas as origens", ORIGIN_ALL),
    option("WhatsApp", "whatsapp"),
    option("Ligação", "ligacao"),
    option("E-mail", "email"),
    option("Balcão", "balcao"),
    option("Não informado", ORIGIN_UNSPECIFIED),
    option("Análises", "analises"),
    option("POVT", "povt"),
    option("Campanhas", "campanhas"),
];

/// Filter values driving roster selection and event matching
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactFilters {
    /// Roster branch (`filial`)
    #[serde(default)]
    pub branch: Option<String>,
    /// Roster state (`estado`)
    #[serde(default)]
    pub state: Option<String>,
    /// Contact-type tag
    #[serde(default)]
    pub status: Option<String>,
    /// Origin/channel tag
    #[serde(default)]
    pub origin: Option<String>,
}

impl ContactFilters {
    /// No filters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With branch, empty means all
    #[inline]
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = selected(branch.into(), "");
        self
    }

    /// With state, empty means all
    #[inline]
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = selected(state.into(), "");
        self
    }

    /// With contact-type status, empty means all
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = selected(status.into(), "");
        self
    }

    /// With origin, empty or [`ORIGIN_ALL`] means all
    #[inline]
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = selected(origin.into(), ORIGIN_ALL);
        self
    }

    /// Precompute the lower-cased event matcher
    #[must_use]
    pub fn matcher(&self) -> FilterMatcher {
        FilterMatcher {
            status: self.status.as_deref().map(str::to_lowercase),
            origin: self
                .origin
                .as_deref()
                .filter(|o| !o.eq_ignore_ascii_case(ORIGIN_ALL))
                .map(str::to_lowercase),
        }
    }

    /// Whether a seller passes the branch/state selection
    #[must_use]
    pub fn admits_seller(&self, branch: Option<&str>, state: Option<&str>) -> bool {
        fn admits(filter: Option<&str>, value: Option<&str>) -> bool {
            filter.map_or(true, |f| value == Some(f))
        }
        admits(self.branch.as_deref(), branch) && admits(self.state.as_deref(), state)
    }
}

fn selected(value: String, all: &str) -> Option<String> {
    (!value.is_empty() && !value.eq_ignore_ascii_case(all)).then_some(value)
}

/// Lower-cased status/origin matcher reused across a whole pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterMatcher {
    status: Option<String>,
    origin: Option<String>,
}

impl FilterMatcher {
    /// Whether `event` passes the status and origin filters
    #[must_use]
    pub fn matches(&self, event: &ContactEvent) -> bool {
        if let Some(status) = &self.status {
            if !eq_lowered(event.contact_type.as_deref().unwrap_or(""), status) {
                return false;
            }
        }
        if let Some(origin) = &self.origin {
            let tag = event
                .origin
                .as_deref()
                .filter(|o| !o.is_empty())
                .unwrap_or(ORIGIN_UNSPECIFIED);
            if !eq_lowered(tag, origin) {
                return false;
            }
        }
        true
    }

    /// Whether no filter is active
    #[inline]
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        self.status.is_none() && self.origin.is_none()
    }
}

fn eq_lowered(value: &str, lowered: &str) -> bool {
    if value.is_ascii() {
        value.eq_ignore_ascii_case(lowered)
    } else {
        value.to_lowercase() == lowered
    }
}
