//! Logical-state catalog domain entity.
//!
//! The catalog is the startup-loaded table that maps a logical state name
//! (`"screensaver"`, `"carescape"`, ...) to its destination: either a remote
//! URL or the built-in local splash asset.  It is built once from
//! configuration, validated eagerly, and read-only for the life of the
//! process — states are never created or destroyed at runtime.
//!
//! Entry order is preserved from the configuration so that the list of
//! available states reported by the control plane is deterministic.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Target literal that maps a state to the built-in local splash asset
/// instead of a remote URL.
pub const SPLASH_TARGET: &str = "splash";

/// Parameter map attached to a state transition (`roomId`, `inviteId`, ...).
///
/// Keys keep their insertion order (`serde_json` is built with
/// `preserve_order`), which makes query-string construction deterministic.
/// Values are arbitrary JSON; the resolver decides which ones are usable as
/// query parameters.
pub type StateParams = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur while building the catalog from configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A state's target is neither the splash literal nor a parseable URL.
    #[error("state '{state}' has an invalid target URL '{target}': {source}")]
    InvalidTargetUrl {
        state: String,
        target: String,
        #[source]
        source: url::ParseError,
    },

    /// The same state name appears twice in the configuration.
    #[error("state '{0}' is declared more than once")]
    DuplicateState(String),

    /// The configuration declares no states at all.
    #[error("state catalog is empty")]
    Empty,
}

/// One state declaration as it appears in configuration, before validation.
///
/// `target` is either the literal `"splash"` or a URL string; `exact_url`
/// marks states whose destination is never parameterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    /// Logical state name, e.g. `"carescape"`.
    pub name: String,
    /// Destination: `"splash"` or an absolute URL string.
    pub target: String,
    /// When `true`, parameters are never appended to the target URL.
    #[serde(default)]
    pub exact_url: bool,
}

impl StateSpec {
    /// Convenience constructor used by the built-in deployment profiles.
    pub fn new(name: &str, target: &str, exact_url: bool) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            exact_url,
        }
    }
}

/// A validated destination inside the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogTarget {
    /// The built-in local splash asset.
    LocalSplash,
    /// A remote URL, parsed and validated at catalog build time.
    Url(Url),
}

/// One validated catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Logical state name this entry is keyed by.
    pub state: String,
    /// Validated destination.
    pub target: CatalogTarget,
    /// When `true`, parameters are ignored when resolving this state.
    pub exact_url: bool,
}

/// The immutable logical-state catalog.
///
/// Built once at startup via [`StateCatalog::build`]; lookups after that can
/// only fail with an unknown state name.  Entries are stored in declaration
/// order (a handful at most), so lookup is a linear scan.
#[derive(Debug, Clone)]
pub struct StateCatalog {
    entries: Vec<CatalogEntry>,
}

impl StateCatalog {
    /// Validates `specs` and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`] for an empty spec list,
    /// [`CatalogError::DuplicateState`] when a name repeats, and
    /// [`CatalogError::InvalidTargetUrl`] when a non-splash target does not
    /// parse as an absolute URL.
    pub fn build(specs: &[StateSpec]) -> Result<Self, CatalogError> {
        if specs.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(specs.len());
        for spec in specs {
            if entries.iter().any(|e| e.state == spec.name) {
                return Err(CatalogError::DuplicateState(spec.name.clone()));
            }

            let target = if spec.target == SPLASH_TARGET {
                CatalogTarget::LocalSplash
            } else {
                let url = Url::parse(&spec.target).map_err(|source| {
                    CatalogError::InvalidTargetUrl {
                        state: spec.name.clone(),
                        target: spec.target.clone(),
                        source,
                    }
                })?;
                CatalogTarget::Url(url)
            };

            entries.push(CatalogEntry {
                state: spec.name.clone(),
                target,
                exact_url: spec.exact_url,
            });
        }

        Ok(Self { entries })
    }

    /// Looks up the entry for `state`, if the catalog declares it.
    pub fn get(&self, state: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.state == state)
    }

    /// Returns `true` when `state` is declared in the catalog.
    pub fn contains(&self, state: &str) -> bool {
        self.get(state).is_some()
    }

    /// State names in declaration order.
    pub fn state_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.state.as_str()).collect()
    }

    /// Number of declared states.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the catalog declares no states.
    ///
    /// Unreachable through [`StateCatalog::build`], which rejects empty spec
    /// lists, but kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
