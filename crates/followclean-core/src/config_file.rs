use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::OrderMode;
use crate::throttle::ThrottleWindow;
use crate::{Config, CoreError};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub scan: Option<ScanSection>,
    pub execute: Option<ExecuteSection>,
    pub review: Option<ReviewSection>,
    pub webdriver: Option<WebDriverSection>,
    pub display: Option<DisplaySection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSection {
    pub stability_threshold: Option<u32>,
    pub scroll_step_px: Option<u32>,
    pub settle_ms: Option<u64>,
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSection {
    pub locate_budget: Option<usize>,
    pub locate_scroll_px: Option<u32>,
    pub throttle_min_secs: Option<f64>,
    pub throttle_max_secs: Option<f64>,
    pub confirm_attempts: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewSection {
    pub default_order: Option<OrderMode>,
    pub animate: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebDriverSection {
    pub url: Option<String>,
    pub following_url: Option<String>,
    /// `host:port` of a browser started with remote debugging, to reuse its
    /// logged-in session.
    pub debugger_address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySection {
    pub theme: Option<String>,
    pub fps: Option<u32>,
}

/// Platform config directory path: `<config_dir>/followclean/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("followclean").join("config.toml"))
}

/// Load config by cascading CWD `.followclean.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    load_cascade(config_path().as_deref(), Path::new(".followclean.toml"))
}

/// The cascade behind [`load_config`] with explicit paths.
pub fn load_cascade(platform: Option<&Path>, local: &Path) -> ConfigFile {
    let platform = platform.and_then(load_from_path);
    let local = load_from_path(local);

    match (platform, local) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config");
            None
        }
    }
}

/// Field-wise overlay: `overlay` wins wherever it has a value.
fn pick<S, T>(base: &Option<S>, overlay: &Option<S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (b, o) = (&base, &overlay);
    ConfigFile {
        scan: Some(ScanSection {
            stability_threshold: pick(&b.scan, &o.scan, |s| s.stability_threshold),
            scroll_step_px: pick(&b.scan, &o.scan, |s| s.scroll_step_px),
            settle_ms: pick(&b.scan, &o.scan, |s| s.settle_ms),
            max_iterations: pick(&b.scan, &o.scan, |s| s.max_iterations),
        }),
        execute: Some(ExecuteSection {
            locate_budget: pick(&b.execute, &o.execute, |e| e.locate_budget),
            locate_scroll_px: pick(&b.execute, &o.execute, |e| e.locate_scroll_px),
            throttle_min_secs: pick(&b.execute, &o.execute, |e| e.throttle_min_secs),
            throttle_max_secs: pick(&b.execute, &o.execute, |e| e.throttle_max_secs),
            confirm_attempts: pick(&b.execute, &o.execute, |e| e.confirm_attempts),
        }),
        review: Some(ReviewSection {
            default_order: pick(&b.review, &o.review, |r| r.default_order),
            animate: pick(&b.review, &o.review, |r| r.animate),
        }),
        webdriver: Some(WebDriverSection {
            url: pick(&b.webdriver, &o.webdriver, |w| w.url.clone()),
            following_url: pick(&b.webdriver, &o.webdriver, |w| w.following_url.clone()),
            debugger_address: pick(&b.webdriver, &o.webdriver, |w| w.debugger_address.clone()),
        }),
        display: Some(DisplaySection {
            theme: pick(&b.display, &o.display, |d| d.theme.clone()),
            fps: pick(&b.display, &o.display, |d| d.fps),
        }),
    }
}

/// Seconds from the file as a duration. NaN and infinities count as unset.
fn secs(value: f64) -> Option<Duration> {
    value
        .is_finite()
        .then(|| Duration::from_secs_f64(value.clamp(0.0, 86_400.0)))
}

impl ConfigFile {
    /// Overwrite the fields of `config` this file sets.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(scan) = &self.scan {
            if let Some(v) = scan.stability_threshold {
                config.scan.stability_threshold = v;
            }
            if let Some(v) = scan.scroll_step_px {
                config.scan.scroll_step_px = v;
            }
            if let Some(v) = scan.settle_ms {
                config.scan.settle_delay = Duration::from_millis(v);
            }
            if scan.max_iterations.is_some() {
                config.scan.max_iterations = scan.max_iterations;
            }
        }
        if let Some(execute) = &self.execute {
            if let Some(v) = execute.locate_budget {
                config.execute.locate_budget = v.max(1);
            }
            if let Some(v) = execute.locate_scroll_px {
                config.execute.locate_scroll_px = v;
            }
            if let Some(v) = execute.confirm_attempts {
                config.execute.confirm_attempts = v.max(1);
            }
            let current = config.execute.throttle;
            let min = execute.throttle_min_secs.and_then(secs).unwrap_or(current.min);
            let max = execute.throttle_max_secs.and_then(secs).unwrap_or(current.max);
            config.execute.throttle = ThrottleWindow::new(min, max);
        }
        if let Some(review) = &self.review {
            if let Some(v) = review.default_order {
                config.review.default_order = v;
            }
            if let Some(v) = review.animate {
                config.review.animate = v;
            }
        }
    }

    /// The runtime config this file describes, on top of defaults.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        self.apply_to(&mut config);
        config
    }

    /// This file with every tunable filled in with the value the runtime
    /// actually uses: defaults where the file is silent, sanitized values
    /// where it is out of range.
    pub fn with_defaults(&self) -> ConfigFile {
        let config = self.to_config();
        let effective = ConfigFile {
            scan: Some(ScanSection {
                stability_threshold: Some(config.scan.stability_threshold),
                scroll_step_px: Some(config.scan.scroll_step_px),
                settle_ms: Some(config.scan.settle_delay.as_millis() as u64),
                max_iterations: config.scan.max_iterations,
            }),
            execute: Some(ExecuteSection {
                locate_budget: Some(config.execute.locate_budget),
                locate_scroll_px: Some(config.execute.locate_scroll_px),
                throttle_min_secs: Some(config.execute.throttle.min.as_secs_f64()),
                throttle_max_secs: Some(config.execute.throttle.max.as_secs_f64()),
                confirm_attempts: Some(config.execute.confirm_attempts),
            }),
            review: Some(ReviewSection {
                default_order: Some(config.review.default_order),
                animate: Some(config.review.animate),
            }),
            webdriver: None,
            display: None,
        };
        merge(self.clone(), effective)
    }
}

/// Save a config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, CoreError> {
    let path = config_path().ok_or(CoreError::NoConfigDir)?;
    save_to_path(&path, config)?;
    Ok(path)
}

pub fn save_to_path(path: &Path, config: &ConfigFile) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
