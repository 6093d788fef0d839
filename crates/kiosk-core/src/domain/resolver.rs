//! Destination resolution: `(state, params)` → concrete render target.
//!
//! The resolver applies the per-state policy recorded in the catalog:
//!
//! - A state whose target is the local splash literal always resolves to the
//!   local asset, parameters ignored.
//! - An exact-URL state resolves to its catalog URL byte-for-byte,
//!   parameters ignored (used for screensaver/splash variants whose
//!   destinations must never change).
//! - Any other state resolves to its catalog URL with the usable parameters
//!   appended to the query string.  A query string already present on the
//!   base URL is preserved.
//!
//! Resolution never mutates anything; an unknown state name is reported to
//! the caller and the display controller leaves its snapshot untouched.

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::catalog::{CatalogTarget, StateCatalog, StateParams, SPLASH_TARGET};

/// A concrete destination for the window host to render.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    /// Load a remote URL into the child render surface.
    Remote(Url),
    /// Load a named local asset into the top-level surface.
    LocalAsset(String),
}

/// The requested state name is not declared in the catalog.
///
/// Never fatal: the HTTP layer answers 400, the link layer logs a warning,
/// and in both cases the controller snapshot stays unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown state: {0}")]
pub struct UnknownStateError(pub String);

impl StateCatalog {
    /// Resolves `state` + `params` to a [`RenderTarget`].
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStateError`] when `state` is not declared in the
    /// catalog.  Callers must treat this as a no-op.
    pub fn resolve(
        &self,
        state: &str,
        params: &StateParams,
    ) -> Result<RenderTarget, UnknownStateError> {
        let entry = self
            .get(state)
            .ok_or_else(|| UnknownStateError(state.to_string()))?;

        Ok(match &entry.target {
            CatalogTarget::LocalSplash => RenderTarget::LocalAsset(SPLASH_TARGET.to_string()),
            CatalogTarget::Url(base) if entry.exact_url => RenderTarget::Remote(base.clone()),
            CatalogTarget::Url(base) => RenderTarget::Remote(build_url_with_params(base, params)),
        })
    }
}

/// Builds `base` with each usable entry of `params` appended as a
/// query-string pair.
///
/// Pairs append in the map's insertion order, after any query string the
/// base URL already carries.  Null values and empty strings are skipped the
/// same way the controller-facing JSON contract skips them; arrays and
/// objects have no query-string form and are skipped with a debug log.
pub fn build_url_with_params(base: &Url, params: &StateParams) -> Url {
    let usable: Vec<(&str, String)> = params
        .iter()
        .filter_map(|(key, value)| query_value(value).map(|v| (key.as_str(), v)))
        .collect();

    if usable.is_empty() {
        // Appending nothing would still leave a dangling '?' on the URL.
        return base.clone();
    }

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in usable {
            pairs.append_pair(key, &value);
        }
    }
    url
}

/// Renders a JSON value as a query-string value, or `None` when the value
/// has no query-string form.
fn query_value(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => {
            debug!("skipping non-scalar query parameter value");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
