//! The display-state machine.
//!
//! The controller owns the answer to "what is this kiosk showing right now":
//! the current logical state, the parameters it was entered with, and the
//! deployment profile.  Commands arrive from the HTTP control server and the
//! upstream link; the controller resolves them through the catalog and
//! issues render calls to the window host.
//!
//! # Snapshot-before-render ordering
//!
//! Rendering is fire-and-forget: the controller never waits for a page load
//! and never learns whether the host finished it.  The snapshot is therefore
//! updated *before* the render call is issued, so the `/status` endpoint
//! always reports the last state the host was told to render — the contract
//! is "intent recorded", not "pixels painted".
//!
//! # Idempotence
//!
//! `set_state` with the current state re-issues the render call; there is no
//! dedup.  A kiosk showing stale content is worse than a redundant reload,
//! and the window host is free to no-op a reload of the URL it already has.

use tracing::{info, warn};
use url::Url;

use kiosk_core::{
    RenderTarget, StateCatalog, StateParams, UnknownStateError, SPLASH_TARGET,
};

use crate::infrastructure::window_host::WindowHost;

/// The state every deployment profile anchors on; also the startup state.
pub const SCREENSAVER_STATE: &str = "screensaver";

/// Snapshot state recorded when the legacy navigate path bypasses the
/// catalog.
pub const CUSTOM_STATE: &str = "custom";

/// What the kiosk is currently showing, as last commanded.
///
/// Single mutable instance, owned by the [`DisplayController`]; read by the
/// `/status` endpoint and by tests.  Field names serialize to the control
/// API's JSON spelling.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ControllerSnapshot {
    /// The logical state last commanded (or `"custom"` after a raw navigate).
    #[serde(rename = "currentState")]
    pub current_state: String,
    /// Parameters the state was entered with.
    #[serde(rename = "stateParams")]
    pub current_params: StateParams,
    /// Deployment profile this kiosk runs as (`"ledcarewall"`, `"provider"`).
    #[serde(rename = "userType")]
    pub user_type: String,
}

/// The display-state machine: catalog + snapshot + window host.
pub struct DisplayController {
    catalog: StateCatalog,
    snapshot: ControllerSnapshot,
    host: Box<dyn WindowHost>,
}

impl DisplayController {
    /// Creates a controller whose snapshot starts at `initial_state`.
    ///
    /// Nothing is rendered until the window host reports ready and
    /// [`enter_initial_state`](Self::enter_initial_state) runs.
    pub fn new(
        catalog: StateCatalog,
        user_type: &str,
        initial_state: &str,
        host: Box<dyn WindowHost>,
    ) -> Self {
        Self {
            catalog,
            snapshot: ControllerSnapshot {
                current_state: initial_state.to_string(),
                current_params: StateParams::new(),
                user_type: user_type.to_string(),
            },
            host,
        }
    }

    /// Read access to the snapshot for the status endpoint and tests.
    pub fn snapshot(&self) -> &ControllerSnapshot {
        &self.snapshot
    }

    /// State names declared in the catalog, in configuration order.
    pub fn available_states(&self) -> Vec<String> {
        self.catalog
            .state_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Transitions to `state` with `params`.
    ///
    /// Resolution happens first: on an unknown state the snapshot stays
    /// unchanged, no render call is issued, and the error goes back to the
    /// caller (the HTTP layer answers 400, the link layer logs it).  On
    /// success the snapshot is updated and exactly one render call matching
    /// the resolved target kind goes to the window host.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStateError`] when `state` is not in the catalog.
    pub fn set_state(
        &mut self,
        state: &str,
        params: StateParams,
    ) -> Result<(), UnknownStateError> {
        let target = self.catalog.resolve(state, &params)?;

        info!("transitioning to state: {state}");
        self.snapshot.current_state = state.to_string();
        self.snapshot.current_params = params;

        self.render(target);
        Ok(())
    }

    /// Legacy path: navigates straight to `url`, bypassing the catalog.
    ///
    /// The snapshot records the `"custom"` state with the URL as its only
    /// parameter, keeping the status endpoint truthful about what is shown.
    pub fn enter_destination(&mut self, url: Url) {
        info!("navigating to destination: {url}");

        let mut params = StateParams::new();
        params.insert(
            "url".to_string(),
            serde_json::Value::String(url.to_string()),
        );
        self.snapshot.current_state = CUSTOM_STATE.to_string();
        self.snapshot.current_params = params;

        self.render(RenderTarget::Remote(url));
    }

    /// Returns to the local splash screen.
    ///
    /// When the catalog maps `screensaver` to the local splash asset this is
    /// the same transition as `set_state("screensaver", {})`.  When it does
    /// not — a remote screensaver URL, or a catalog with no screensaver at
    /// all — the splash asset is still rendered directly: this is the
    /// startup/fallback screen and must work with a misconfigured catalog.
    pub fn show_splash(&mut self) {
        let target = match self.catalog.resolve(SCREENSAVER_STATE, &StateParams::new()) {
            Ok(target @ RenderTarget::LocalAsset(_)) => target,
            _ => RenderTarget::LocalAsset(SPLASH_TARGET.to_string()),
        };

        info!("switching to splash screen");
        self.snapshot.current_state = SCREENSAVER_STATE.to_string();
        self.snapshot.current_params = StateParams::new();

        self.render(target);
    }

    /// Enters the configured initial state once the window host is ready.
    ///
    /// Falls back to the splash screen when the configured state is not in
    /// the catalog, so the kiosk always comes up showing something.
    pub fn enter_initial_state(&mut self) {
        let initial = self.snapshot.current_state.clone();
        if let Err(e) = self.set_state(&initial, StateParams::new()) {
            warn!("initial state not available ({e}); falling back to splash");
            self.show_splash();
        }
    }

    /// Re-fits the active render target after the host reported a resize.
    ///
    /// A pass-through, not a state transition: the snapshot is untouched.
    pub fn handle_resize(&mut self) {
        let bounds = self.host.content_bounds();
        self.host.resize_to_fill(bounds);
    }

    /// Issues exactly one render call for `target`.
    ///
    /// A local asset replaces the child render surface with the top-level
    /// one, so the child surface is destroyed first.  A remote URL goes to
    /// the child surface; the host owns surface reuse.
    fn render(&mut self, target: RenderTarget) {
        match target {
            RenderTarget::Remote(url) => {
                info!("loading URL: {url}");
                self.host.render_remote(&url);
            }
            RenderTarget::LocalAsset(asset) => {
                info!("loading local asset: {asset}");
                self.host.destroy_current_view();
                self.host.render_local_asset(&asset);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
