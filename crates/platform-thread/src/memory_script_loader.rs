// In-memory script loader
//
// Native hosts have no blob/object-URL machinery, so this adapter keeps
// payloads in memory and hands out `memory://` URLs that resolve back to
// them. Both loader capabilities are always present here; absence only
// occurs on constrained hosts with their own adapter.

use offload_core::port::{PlatformError, ScriptLoader, ScriptPayload, ScriptUrl};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Script loader backed by an in-process registry
#[derive(Default)]
pub struct MemoryScriptLoader {
    registry: Mutex<HashMap<ScriptUrl, ScriptPayload>>,
}

impl MemoryScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look a registered payload back up by its URL
    pub fn resolve(&self, url: &ScriptUrl) -> Option<ScriptPayload> {
        self.registry.lock().unwrap().get(url).cloned()
    }

    /// Number of URLs handed out so far
    pub fn registered(&self) -> usize {
        self.registry.lock().unwrap().len()
    }
}

impl ScriptLoader for MemoryScriptLoader {
    fn supports_payloads(&self) -> bool {
        true
    }

    fn supports_urls(&self) -> bool {
        true
    }

    fn build_payload(&self, source: &str) -> Result<ScriptPayload, PlatformError> {
        Ok(ScriptPayload::new(source.as_bytes().to_vec()))
    }

    fn payload_url(&self, payload: &ScriptPayload) -> Result<ScriptUrl, PlatformError> {
        let url = ScriptUrl::new(format!("memory://{}", Uuid::new_v4()));
        self.registry
            .lock()
            .unwrap()
            .insert(url.clone(), payload.clone());

        debug!(url = %url, bytes = payload.len(), "Registered entry script payload");
        Ok(url)
    }
}
