//! Capability declarations and session facts
//!
//! A [`Capability`] is what the run *declares*: which browser to launch and
//! how. [`SessionCapabilities`] is what the engine's live session *reports*
//! back once connected, and is the record the before-test environment
//! tagging reads its three facts from.

use serde::{Deserialize, Serialize};

/// Browser a capability launches sessions against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
    Edge,
    Safari,
}

impl Browser {
    /// WebDriver `browserName` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "MicrosoftEdge",
            Browser::Safari => "safari",
        }
    }
}

impl std::fmt::Display for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vendor-specific launch options block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LaunchOptions {
    #[serde(default)]
    pub args: Vec<String>,
}

impl LaunchOptions {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// One declared browser configuration workers launch sessions against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    /// Browser to launch
    #[serde(rename = "browserName")]
    pub browser: Browser,

    /// Parallel session cap for this capability; falls back to the global
    /// `max_instances` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_instances: Option<u32>,

    /// Chrome launch options, serialized under the vendor wire key
    #[serde(
        default,
        rename = "goog:chromeOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub chrome_options: Option<LaunchOptions>,

    /// Firefox launch options, serialized under the vendor wire key
    #[serde(
        default,
        rename = "moz:firefoxOptions",
        skip_serializing_if = "Option::is_none"
    )]
    pub firefox_options: Option<LaunchOptions>,
}

impl Default for Capability {
    fn default() -> Self {
        Self {
            browser: Browser::Chrome,
            max_instances: Some(3),
            chrome_options: Some(LaunchOptions::new([
                "--disable-infobars",
                "--window-size=1920,1440",
            ])),
            firefox_options: None,
        }
    }
}

impl Capability {
    pub fn new(browser: Browser) -> Self {
        Self {
            browser,
            max_instances: None,
            chrome_options: None,
            firefox_options: None,
        }
    }

    /// Effective parallel session bound for this capability.
    pub fn instance_limit(&self, global_max: u32) -> u32 {
        self.max_instances
            .unwrap_or(global_max)
            .min(global_max.max(1))
    }

    /// Launch arguments for the declared browser, if any were configured.
    pub fn launch_args(&self) -> &[String] {
        let options = match self.browser {
            Browser::Chrome | Browser::Edge => self.chrome_options.as_ref(),
            Browser::Firefox => self.firefox_options.as_ref(),
            Browser::Safari => None,
        };
        options.map(|o| o.args.as_slice()).unwrap_or(&[])
    }
}

/// Facts the active session reports about itself.
///
/// Field names follow the session's wire record; the legacy `version` and
/// `platform` spellings are what tagging reads, so they stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCapabilities {
    #[serde(rename = "browserName")]
    pub browser_name: String,

    pub version: String,

    pub platform: String,
}

impl SessionCapabilities {
    pub fn new(
        browser_name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            browser_name: browser_name.into(),
            version: version.into(),
            platform: platform.into(),
        }
    }
}

impl Default for SessionCapabilities {
    fn default() -> Self {
        Self::new(Browser::Chrome.as_str(), "", "")
    }
}
