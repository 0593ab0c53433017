//! Facade over the engine's live browser session
//!
//! The engine owns the real WebDriver session; hooks only need two things
//! from it: the capability facts it reports and a PNG capture on demand.

use async_trait::async_trait;

use crate::capability::SessionCapabilities;
use crate::error::SessionError;

/// Read-only view of the active browser session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Engine-assigned session identifier.
    fn id(&self) -> &str;

    /// Facts the session reports about itself.
    fn capabilities(&self) -> &SessionCapabilities;

    /// Capture the current viewport as PNG bytes.
    async fn capture_screenshot(&self) -> Result<Vec<u8>, SessionError>;
}

/// PNG signature, enough payload for tests that only care about bytes
/// reaching disk.
const PNG_STUB: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Canned session for tests and dry runs: fixed capabilities, scriptable
/// capture behavior.
#[derive(Debug, Clone)]
pub struct StaticSession {
    id: String,
    capabilities: SessionCapabilities,
    png: Vec<u8>,
    capture_error: Option<String>,
}

impl StaticSession {
    pub fn new(capabilities: SessionCapabilities) -> Self {
        Self {
            id: "static-session".to_string(),
            capabilities,
            png: PNG_STUB.to_vec(),
            capture_error: None,
        }
    }

    pub fn with_png(mut self, png: Vec<u8>) -> Self {
        self.png = png;
        self
    }

    /// Make every capture attempt fail with the given message.
    pub fn failing_capture(mut self, message: impl Into<String>) -> Self {
        self.capture_error = Some(message.into());
        self
    }
}

impl Default for StaticSession {
    fn default() -> Self {
        Self::new(SessionCapabilities::new("chrome", "120.0", "linux"))
    }
}

#[async_trait]
impl Session for StaticSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &SessionCapabilities {
        &self.capabilities
    }

    async fn capture_screenshot(&self) -> Result<Vec<u8>, SessionError> {
        match &self.capture_error {
            Some(message) => Err(SessionError::Command(message.clone())),
            None => Ok(self.png.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_session_returns_canned_capture() {
        let session = StaticSession::default();
        let bytes = session.capture_screenshot().await.unwrap();
        assert!(bytes.starts_with(PNG_STUB));
        assert_eq!(session.capabilities().browser_name, "chrome");
    }

    #[tokio::test]
    async fn failing_capture_reports_session_error() {
        let session = StaticSession::default().failing_capture("no such window");
        let err = session.capture_screenshot().await.unwrap_err();
        assert!(matches!(err, SessionError::Command(_)));
    }
}
