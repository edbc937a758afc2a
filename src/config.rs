use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::parse::Caret;

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// User overlay, relative to `$HOME`.
const USER_CONFIG_PATH: &str = ".config/text-transmute/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub aliases: AliasConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Expressions kept in the session history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Meaning of `^` in arithmetic: `power` or `xor`.
    #[serde(default)]
    pub caret: Caret,
    /// `off`, `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where the session and the log file live. `~` is expanded.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            caret: Caret::default(),
            log_level: default_log_level(),
            data_dir: default_data_dir(),
        }
    }
}

impl Settings {
    /// `data_dir` with `~` and environment variables expanded.
    pub fn data_dir(&self) -> PathBuf {
        match shellexpand::full(&self.data_dir) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(e) => {
                log::warn!("config: cannot expand data_dir {:?}: {e}", self.data_dir);
                PathBuf::from(shellexpand::tilde(&self.data_dir).as_ref())
            }
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

fn default_history_limit() -> usize {
    crate::session::DEFAULT_HISTORY_LIMIT
}

fn default_log_level() -> String {
    "info".into()
}

fn default_data_dir() -> String {
    "~/.local/share/text-transmute".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("text-transmute/", env!("CARGO_PKG_VERSION")).into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MarkdownConfig {
    /// Spaces per nesting level when `markdown` is given no indent.
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            indent: default_indent(),
        }
    }
}

fn default_indent() -> usize {
    2
}

/// A named, saved pipeline expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Alias {
    pub name: String,
    /// Menu label.
    #[serde(default)]
    pub caption: String,
    pub expression: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct AliasConfig {
    #[serde(default)]
    pub entries: Vec<Alias>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    http: HttpOverlay,
    #[serde(default)]
    markdown: MarkdownOverlay,
    #[serde(default)]
    aliases: AliasesOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    history_limit: Option<usize>,
    caret: Option<Caret>,
    log_level: Option<String>,
    data_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct HttpOverlay {
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct MarkdownOverlay {
    indent: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct AliasesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    entries: Vec<Alias>,
    /// Alias names to drop.
    #[serde(default)]
    remove_entries: Vec<String>,
}

// ── Merge logic ──

/// Merge user aliases into the defaults.
/// In replace mode: user entries replace the defaults entirely.
/// In merge mode: removals first, then each entry overrides a same-named
/// default in place or is appended.
fn merge_aliases(base: &mut Vec<Alias>, add: Vec<Alias>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
        return;
    }
    base.retain(|alias| !remove.iter().any(|r| r.eq_ignore_ascii_case(&alias.name)));
    for alias in add {
        match base.iter_mut().find(|a| a.name.eq_ignore_ascii_case(&alias.name)) {
            Some(existing) => *existing = alias,
            None => base.push(alias),
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/text-transmute/config.toml (if exists)
    ///
    /// Scalars override. Alias entries override by name or are appended;
    /// `remove_entries` drops aliases and `replace = true` discards the
    /// default set.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = std::path::Path::new(&home).join(USER_CONFIG_PATH);
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("text-transmute: config parse error: {e}");
                None
            }
        }
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        if let Some(v) = s.history_limit {
            self.settings.history_limit = v;
        }
        if let Some(v) = s.caret {
            self.settings.caret = v;
        }
        if let Some(v) = s.log_level {
            self.settings.log_level = v;
        }
        if let Some(v) = s.data_dir {
            self.settings.data_dir = v;
        }

        if let Some(v) = overlay.http.timeout_secs {
            self.http.timeout_secs = v;
        }
        if let Some(v) = overlay.http.user_agent {
            self.http.user_agent = v;
        }

        if let Some(v) = overlay.markdown.indent {
            self.markdown.indent = v;
        }

        let a = overlay.aliases;
        merge_aliases(&mut self.aliases.entries, a.entries, &a.remove_entries, a.replace);
    }

    /// The merged configuration as TOML.
    pub fn dump(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
