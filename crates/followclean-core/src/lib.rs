use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod bridge;
pub mod config_file;
pub mod executor;
pub mod extract;
pub mod page;
pub mod poll;
pub mod scanner;
pub mod session;
pub mod throttle;
pub mod workflow;

// Re-export for convenience
pub use bridge::{BridgeHandle, ScanAck};
pub use executor::{FailureReason, LogEntry, RunLog, RunSummary, UnfollowExecutor, UnfollowOutcome};
pub use extract::{Extractor, XCardExtractor};
pub use page::{HostPage, PageError};
pub use scanner::{AccountScanner, ScanState};
pub use session::{Bucket, OrderMode, ReviewSession, ReviewSnapshot, SwipeDirection};
pub use throttle::ThrottleWindow;
pub use workflow::{Command, Effect, Phase, RunView, Workflow};

/// A followed account as extracted from one rendered card.
///
/// Identity is the handle alone, compared ASCII case-insensitively; the
/// stored handle keeps the casing it was first seen with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Canonical `@name` form.
    pub handle: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl Account {
    pub fn new(handle: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            display_name: display_name.into(),
            bio: String::new(),
            avatar_url: String::new(),
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = avatar_url.into();
        self
    }

    /// Case-insensitive handle comparison.
    pub fn same_handle(&self, handle: &str) -> bool {
        self.handle.eq_ignore_ascii_case(handle)
    }

    /// Lookup key used for deduplication.
    pub fn handle_key(&self) -> String {
        self.handle.to_ascii_lowercase()
    }

    /// Profile page on x.com.
    pub fn profile_url(&self) -> String {
        format!("https://x.com/{}", self.handle.trim_start_matches('@'))
    }

    /// Uppercased first letter of the display name, for avatar placeholders.
    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.same_handle(&other.handle)
    }
}

impl Eq for Account {}

/// Events the core emits to whatever presentation layer is attached.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Distinct accounts discovered so far in the running scan.
    ScanProgress { count: usize },
    /// Scan converged; accounts are oldest-first.
    ScanComplete { accounts: Vec<Account> },
    /// The backend was busy and did not start the requested scan.
    ScanRefused,
    /// The executor is about to process `account`.
    UnfollowStarted {
        index: usize,
        total: usize,
        account: Account,
    },
    /// The executor finished processing `account`.
    UnfollowProgress {
        index: usize,
        total: usize,
        account: Account,
        outcome: UnfollowOutcome,
    },
    /// The run ended, either naturally or by cancellation.
    UnfollowSummary(RunSummary),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("account list error: {0}")]
    AccountList(#[from] serde_json::Error),
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Tuning for [`AccountScanner`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Consecutive no-growth iterations that end the scan.
    pub stability_threshold: u32,
    /// Pixels advanced per iteration.
    pub scroll_step_px: u32,
    /// Pause after each scroll.
    pub settle_delay: Duration,
    /// Pause after the initial reset to the top.
    pub initial_delay: Duration,
    /// Pause after returning to the top once scanning is done.
    pub return_delay: Duration,
    /// Optional hard cap on iterations. `None` relies on convergence alone.
    pub max_iterations: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            stability_threshold: 6,
            scroll_step_px: 2000,
            settle_delay: Duration::from_millis(150),
            initial_delay: Duration::from_millis(500),
            return_delay: Duration::from_millis(300),
            max_iterations: None,
        }
    }
}

/// Tuning for [`UnfollowExecutor`].
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
    /// Scroll steps spent looking for an account's row.
    pub locate_budget: usize,
    pub locate_scroll_px: u32,
    pub locate_delay: Duration,
    /// Pause after resetting the viewport to the top.
    pub reset_delay: Duration,
    /// Pause between clicking the trigger and looking for the confirmation.
    pub trigger_delay: Duration,
    /// How many times to look for the confirmation control.
    pub confirm_attempts: usize,
    /// Pause after clicking the confirmation.
    pub confirm_delay: Duration,
    /// Randomized wait between consecutive accounts.
    pub throttle: ThrottleWindow,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            locate_budget: 80,
            locate_scroll_px: 400,
            locate_delay: Duration::from_millis(200),
            reset_delay: Duration::from_millis(300),
            trigger_delay: Duration::from_millis(500),
            confirm_attempts: 1,
            confirm_delay: Duration::from_millis(300),
            throttle: ThrottleWindow::default(),
        }
    }
}

/// Tuning for [`ReviewSession`].
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub default_order: OrderMode,
    /// Lock swipe/undo until the presentation layer signals the card
    /// animation finished.
    pub animate: bool,
    /// Fixed shuffle seed, mainly for tests and reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            default_order: OrderMode::Random,
            animate: true,
            seed: None,
        }
    }
}

/// Runtime configuration for the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub scan: ScanConfig,
    pub execute: ExecuteConfig,
    pub review: ReviewConfig,
}

/// Read a JSON account list, as written by [`save_accounts`].
pub fn load_accounts(path: &Path) -> Result<Vec<Account>, CoreError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write an account list as pretty JSON.
pub fn save_accounts(path: &Path, accounts: &[Account]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(accounts)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_handle_case() {
        let a = Account::new("@Alice", "Alice");
        let b = Account::new("@alice", "Someone Else");
        assert_eq!(a, b);
        assert_ne!(a, Account::new("@bob", "Alice"));
    }

    #[test]
    fn profile_url_strips_at_sign() {
        let a = Account::new("@rustlang", "Rust");
        assert_eq!(a.profile_url(), "https://x.com/rustlang");
    }

    #[test]
    fn initial_falls_back_for_empty_name() {
        assert_eq!(Account::new("@x", "").initial(), '?');
        assert_eq!(Account::new("@x", "ferris").initial(), 'F');
    }

    #[test]
    fn account_list_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("accounts.json");
        let accounts = vec![
            Account::new("@a", "A").with_bio("first"),
            Account::new("@b", "B").with_avatar("https://pbs.twimg.com/profile_images/b.jpg"),
        ];

        save_accounts(&path, &accounts).unwrap();
        let loaded = load_accounts(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].bio, "first");
        assert!(loaded[1].avatar_url.contains("profile_images"));
    }

    #[test]
    fn account_list_tolerates_missing_optional_fields() {
        let json = r#"[{"handle": "@a", "display_name": "A"}]"#;
        let parsed: Vec<Account> = serde_json::from_str(json).unwrap();
        assert!(parsed[0].bio.is_empty());
        assert!(parsed[0].avatar_url.is_empty());
    }
}
