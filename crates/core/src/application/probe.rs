// Capability Probe
//
// One-time detection of the host primitives background mode requires. The
// verdict is process-wide immutable state, computed lazily on first use;
// tests inject their own verdict through `Executor::with_capabilities`
// instead of re-probing.

use crate::port::{BackgroundSpawner, ScriptLoader};
use std::sync::OnceLock;
use tracing::debug;

/// Capability verdict for background execution.
///
/// The three checks are independent; all must hold for background mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Source text can be packaged into a loadable payload
    pub script_payloads: bool,
    /// A payload can be addressed by a dereferenceable URL
    pub loadable_urls: bool,
    /// The host has a background-context constructor
    pub background_contexts: bool,
}

impl Capabilities {
    /// Probe the host through the port traits, side-effect free
    pub fn detect(loader: &dyn ScriptLoader, spawner: &dyn BackgroundSpawner) -> Self {
        let caps = Self {
            script_payloads: loader.supports_payloads(),
            loadable_urls: loader.supports_urls(),
            background_contexts: spawner.available(),
        };

        debug!(
            script_payloads = %caps.script_payloads,
            loadable_urls = %caps.loadable_urls,
            background_contexts = %caps.background_contexts,
            supported = %caps.supported(),
            "Capability probe completed"
        );

        caps
    }

    /// Background mode is supported only when every check holds
    pub fn supported(&self) -> bool {
        self.script_payloads && self.loadable_urls && self.background_contexts
    }

    /// Verdict with every capability present (test injection helper)
    pub fn full() -> Self {
        Self {
            script_payloads: true,
            loadable_urls: true,
            background_contexts: true,
        }
    }

    /// Verdict with every capability absent (test injection helper)
    pub fn absent() -> Self {
        Self {
            script_payloads: false,
            loadable_urls: false,
            background_contexts: false,
        }
    }
}

static PROBE: OnceLock<Capabilities> = OnceLock::new();

/// Process-wide cached verdict: probed once, on the first executor that asks
pub fn cached(loader: &dyn ScriptLoader, spawner: &dyn BackgroundSpawner) -> Capabilities {
    *PROBE.get_or_init(|| Capabilities::detect(loader, spawner))
}
