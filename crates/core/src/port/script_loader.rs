// Script Loader Port
// Abstraction over the host's "source text -> loadable code" machinery

use super::background::PlatformError;
use std::sync::Arc;

/// Opaque loadable script payload built from source text
#[derive(Debug, Clone)]
pub struct ScriptPayload {
    bytes: Arc<[u8]>,
}

impl ScriptPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into().into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Dereferenceable URL the host can load as code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptUrl(String);

impl ScriptUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ScriptUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Script loader port
///
/// The two `supports_*` methods are pure feature probes: they must not
/// allocate host resources and must never panic when the underlying host
/// facility is absent. A host exposing several historical variants of the
/// same facility answers for the first available one in its own preference
/// order; callers are indifferent to which variant satisfied the probe.
pub trait ScriptLoader: Send + Sync {
    /// Feature probe: can arbitrary source text be packaged into a loadable
    /// payload?
    fn supports_payloads(&self) -> bool;

    /// Feature probe: can a payload be addressed by a dereferenceable URL?
    fn supports_urls(&self) -> bool;

    /// Package source text into a loadable payload
    ///
    /// # Errors
    /// - PlatformError::Unavailable if the host facility is absent
    /// - PlatformError::LoadFailed if packaging fails
    fn build_payload(&self, source: &str) -> Result<ScriptPayload, PlatformError>;

    /// Resolve a payload into a URL the host can load as code
    ///
    /// # Errors
    /// - PlatformError::Unavailable if the host facility is absent
    /// - PlatformError::LoadFailed if resolution fails
    fn payload_url(&self, payload: &ScriptPayload) -> Result<ScriptUrl, PlatformError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Mock script loader with per-capability toggles
    pub struct MockScriptLoader {
        payloads: bool,
        urls: bool,
    }

    impl MockScriptLoader {
        pub fn new(payloads: bool, urls: bool) -> Self {
            Self { payloads, urls }
        }

        pub fn new_full() -> Self {
            Self::new(true, true)
        }

        pub fn new_absent() -> Self {
            Self::new(false, false)
        }
    }

    impl ScriptLoader for MockScriptLoader {
        fn supports_payloads(&self) -> bool {
            self.payloads
        }

        fn supports_urls(&self) -> bool {
            self.urls
        }

        fn build_payload(&self, source: &str) -> Result<ScriptPayload, PlatformError> {
            if !self.payloads {
                return Err(PlatformError::Unavailable("script payloads"));
            }
            Ok(ScriptPayload::new(source.as_bytes().to_vec()))
        }

        fn payload_url(&self, payload: &ScriptPayload) -> Result<ScriptUrl, PlatformError> {
            if !self.urls {
                return Err(PlatformError::Unavailable("loadable urls"));
            }
            Ok(ScriptUrl::new(format!("mock://{}", payload.len())))
        }
    }
}
