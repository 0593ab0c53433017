//! Failure-screenshot capture
//!
//! Best-effort evidence collection: when a test ends with an error the
//! after-test hook asks the session for a PNG and writes it under the
//! configured directory. Errors are returned to the caller, which logs
//! them; they never fail the test or the suite.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::ScreenshotError;
use crate::session::Session;

/// Longest filename stem derived from a test title.
const MAX_STEM_LEN: usize = 80;

/// Screenshot utility handed to hooks and spec code via the spec context.
#[derive(Debug, Clone)]
pub struct Screenshots {
    dir: PathBuf,
}

impl Default for Screenshots {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("report/screenshots"),
        }
    }
}

impl Screenshots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture the session's viewport and write it as
    /// `<sanitised-title>-<utc-stamp>.png`, creating the directory on
    /// first use. Returns the path written.
    pub async fn capture(
        &self,
        session: &dyn Session,
        title: &str,
    ) -> Result<PathBuf, ScreenshotError> {
        let bytes = session.capture_screenshot().await?;
        if bytes.is_empty() {
            return Err(ScreenshotError::EmptyCapture);
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| ScreenshotError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
        let path = self.dir.join(format!("{}-{stamp}.png", sanitize(title)));
        std::fs::write(&path, &bytes).map_err(|source| ScreenshotError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Turn a test title into a safe filename stem: alphanumerics, `-` and `_`
/// survive, everything else becomes `_`, capped in length.
fn sanitize(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();
    if stem.is_empty() {
        "screenshot".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::StaticSession;

    #[tokio::test]
    async fn capture_writes_png_under_the_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let shots = Screenshots::new(dir.path().join("shots"));
        let session = StaticSession::default();

        let path = shots.capture(&session, "Dynamic Table: reads CPU load").await.unwrap();

        assert!(path.exists());
        assert_eq!(path.parent(), Some(shots.dir()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Dynamic_Table__reads_CPU_load-"));
        assert!(name.ends_with(".png"));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn session_refusal_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let shots = Screenshots::new(dir.path());
        let session = StaticSession::default().failing_capture("no such window");

        let err = shots.capture(&session, "any").await.unwrap_err();
        assert!(matches!(err, ScreenshotError::Session(_)));
    }

    #[tokio::test]
    async fn empty_capture_is_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let shots = Screenshots::new(dir.path().join("shots"));
        let session = StaticSession::default().with_png(Vec::new());

        let err = shots.capture(&session, "blank").await.unwrap_err();
        assert!(matches!(err, ScreenshotError::EmptyCapture));
        assert!(!shots.dir().exists());
    }

    #[test]
    fn titles_sanitise_to_safe_stems() {
        assert_eq!(sanitize("login / logout"), "login___logout");
        assert_eq!(sanitize(""), "screenshot");
        let long = "x".repeat(200);
        assert_eq!(sanitize(&long).len(), MAX_STEM_LEN);
    }
}
