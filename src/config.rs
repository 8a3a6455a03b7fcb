use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "chipdx";

#[derive(Debug, Clone)]
pub struct Config {
    /// File the configuration was read from, if any
    pub config_path: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub empty_query: EmptyQuery,
    pub keys: Keys,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            catalog: None,
            empty_query: EmptyQuery::default(),
            keys: Keys::default(),
            ui: UiFile::default().into(),
        }
    }
}

/// What the suggestion list shows while the query is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyQuery {
    /// Every contact that is not selected yet
    #[default]
    All,
    /// Nothing until the user types
    Hidden,
}

impl EmptyQuery {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(EmptyQuery::All),
            "none" => Some(EmptyQuery::Hidden),
            _ => None,
        }
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
    pub icons: UiIcons,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub chip_bg: RgbColor,
    pub chip_fg: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
}

#[derive(Debug, Clone)]
pub struct UiIcons {
    pub chip_remove: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Keys that work whenever no modal is open
    pub global: GlobalKeys,
    /// Keys while the search input has focus
    pub input: InputKeys,
    /// Keys while the chips row has focus
    pub chips: ChipsKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub done: Vec<String>,
    pub help: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct InputKeys {
    pub confirm: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub remove_last: Vec<String>,
    pub focus_chips: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChipsKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub remove: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            done: vec!["Escape".into()],
            help: vec!["F1".into()],
        }
    }
}

impl Default for InputKeys {
    fn default() -> Self {
        Self {
            confirm: vec!["Enter".into()],
            next: vec!["Down".into()],
            prev: vec!["Up".into()],
            remove_last: vec!["Backspace".into()],
            focus_chips: vec!["Backtab".into()],
        }
    }
}

impl Default for ChipsKeys {
    fn default() -> Self {
        Self {
            next: vec!["Right".into(), "l".into()],
            prev: vec!["Left".into(), "h".into()],
            remove: vec!["Delete".into(), "Backspace".into(), "x".into()],
            cancel: vec!["Escape".into(), "Tab".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    input: InputKeysFile,
    chips: ChipsKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    done: KeyBinding,
    help: KeyBinding,
}

impl Default for GlobalKeysFile {
    fn default() -> Self {
        let defaults = GlobalKeys::default();
        Self {
            done: KeyBinding::Multiple(defaults.done),
            help: KeyBinding::Multiple(defaults.help),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct InputKeysFile {
    confirm: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
    remove_last: KeyBinding,
    focus_chips: KeyBinding,
}

impl Default for InputKeysFile {
    fn default() -> Self {
        let defaults = InputKeys::default();
        Self {
            confirm: KeyBinding::Multiple(defaults.confirm),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            remove_last: KeyBinding::Multiple(defaults.remove_last),
            focus_chips: KeyBinding::Multiple(defaults.focus_chips),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ChipsKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    remove: KeyBinding,
    cancel: KeyBinding,
}

impl Default for ChipsKeysFile {
    fn default() -> Self {
        let defaults = ChipsKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            remove: KeyBinding::Multiple(defaults.remove),
            cancel: KeyBinding::Multiple(defaults.cancel),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            global: GlobalKeys {
                done: file.global.done.into_vec(),
                help: file.global.help.into_vec(),
            },
            input: InputKeys {
                confirm: file.input.confirm.into_vec(),
                next: file.input.next.into_vec(),
                prev: file.input.prev.into_vec(),
                remove_last: file.input.remove_last.into_vec(),
                focus_chips: file.input.focus_chips.into_vec(),
            },
            chips: ChipsKeys {
                next: file.chips.next.into_vec(),
                prev: file.chips.prev.into_vec(),
                remove: file.chips.remove.into_vec(),
                cancel: file.chips.cancel.into_vec(),
            },
        }
    }
}

// =============================================================================
// Key binding validation
// =============================================================================

/// Normalize a key binding string to a canonical form for collision detection.
/// Single characters preserve case (since 'M' means Shift+m, different from 'm').
/// Multi-character key names are case-insensitive (Enter, ENTER, enter are the same).
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "esc" => "escape".to_string(),
            "del" => "delete".to_string(),
            "shift+tab" => "backtab".to_string(),
            _ => lower,
        }
    }
}

/// Check for collisions within a single context
fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

/// Validate all key bindings for collisions within each context.
/// Global keys are checked together with each context they are active in.
fn validate_key_bindings(keys: &Keys) -> Result<()> {
    check_context_collisions(
        &[
            ("done", &keys.global.done),
            ("help", &keys.global.help),
            ("confirm", &keys.input.confirm),
            ("next", &keys.input.next),
            ("prev", &keys.input.prev),
            ("remove_last", &keys.input.remove_last),
            ("focus_chips", &keys.input.focus_chips),
        ],
        "input",
    )?;

    // chips.cancel shadows global.done while the chips row is focused
    check_context_collisions(
        &[
            ("help", &keys.global.help),
            ("next", &keys.chips.next),
            ("prev", &keys.chips.prev),
            ("remove", &keys.chips.remove),
            ("cancel", &keys.chips.cancel),
        ],
        "chips",
    )?;

    Ok(())
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    catalog: Option<PathBuf>,
    empty_query: Option<String>,
    keys: KeysFile,
    ui: UiFile,
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

pub fn cache_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine cache directory")?;
    let dir = base.cache_dir().join(APP_NAME);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create cache dir: {}", dir.display()))?;
    Ok(dir)
}

/// Load configuration. An explicit path must exist; the default path is optional.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("configuration file not found at {}", path.display());
            }
            path.to_path_buf()
        }
        None => {
            let path = config_path()?;
            if !path.exists() {
                log::info!("no configuration at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

    let mut config =
        parse(&raw).with_context(|| format!("invalid configuration in {}", path.display()))?;
    config.config_path = Some(path);
    Ok(config)
}

/// Parse configuration from TOML text.
pub fn parse(raw: &str) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse configuration as TOML")?;

    for warning in unknown_keys(&value) {
        eprintln!("warning: {}", warning);
    }

    let cfg_file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    let empty_query = match cfg_file.empty_query.as_deref() {
        None => EmptyQuery::default(),
        Some(raw) => match EmptyQuery::from_str(raw) {
            Some(policy) => policy,
            None => bail!("invalid empty_query '{}', expected one of: all, none", raw),
        },
    };

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    Ok(Config {
        config_path: None,
        catalog: cfg_file.catalog.map(|path| expand_tilde(&path)),
        empty_query,
        keys,
        ui: cfg_file.ui.into(),
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(table) = value.as_table() else {
        return warnings;
    };

    let known = HashSet::from(["catalog", "empty_query", "keys", "ui"]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            warnings.push(format!("unknown configuration key `{}`", key));
        }
    }

    if let Some(keys) = table.get("keys").and_then(|v| v.as_table()) {
        for key in keys.keys() {
            if !["global", "input", "chips"].contains(&key.as_str()) {
                warnings.push(format!("unknown keys.* context `{}`", key));
            }
        }
        unknown_in_section(keys.get("global"), "keys.global", &["done", "help"], &mut warnings);
        unknown_in_section(
            keys.get("input"),
            "keys.input",
            &["confirm", "next", "prev", "remove_last", "focus_chips"],
            &mut warnings,
        );
        unknown_in_section(
            keys.get("chips"),
            "keys.chips",
            &["next", "prev", "remove", "cancel"],
            &mut warnings,
        );
    }

    if let Some(ui) = table.get("ui").and_then(|v| v.as_table()) {
        for key in ui.keys() {
            if !["colors", "icons"].contains(&key.as_str()) {
                warnings.push(format!("unknown ui.* entry `{}`", key));
            }
        }
        unknown_in_section(
            ui.get("colors"),
            "ui.colors",
            &[
                "border",
                "selection_bg",
                "selection_fg",
                "chip_bg",
                "chip_fg",
                "status_fg",
                "status_bg",
            ],
            &mut warnings,
        );
        unknown_in_section(
            ui.get("icons"),
            "ui.icons",
            &["chip_remove", "placeholder"],
            &mut warnings,
        );
    }

    warnings
}

fn unknown_in_section(
    value: Option<&toml::Value>,
    section: &str,
    known: &[&str],
    warnings: &mut Vec<String>,
) {
    let Some(table) = value.and_then(|v| v.as_table()) else {
        return;
    };
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            warnings.push(format!("unknown {} entry `{}`", section, key));
        }
    }
}

// =============================================================================
// UI config types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
    icons: UiIconsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    chip_bg: RgbColor,
    chip_fg: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(255, 165, 0),
            selection_bg: RgbColor::new(255, 165, 0),
            selection_fg: RgbColor::new(0, 0, 0),
            chip_bg: RgbColor::new(135, 206, 235),
            chip_fg: RgbColor::new(0, 0, 0),
            status_fg: RgbColor::new(255, 165, 0),
            status_bg: RgbColor::new(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiIconsFile {
    chip_remove: String,
    placeholder: String,
}

impl Default for UiIconsFile {
    fn default() -> Self {
        Self {
            chip_remove: "×".to_string(),
            placeholder: "Type here...".to_string(),
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let chip_remove = if file.icons.chip_remove.trim().is_empty() {
            "x".to_string()
        } else {
            file.icons.chip_remove
        };
        Self {
            colors: UiColors {
                border: file.colors.border,
                selection_bg: file.colors.selection_bg,
                selection_fg: file.colors.selection_fg,
                chip_bg: file.colors.chip_bg,
                chip_fg: file.colors.chip_fg,
                status_fg: file.colors.status_fg,
                status_bg: file.colors.status_bg,
            },
            icons: UiIcons {
                chip_remove,
                placeholder: file.icons.placeholder,
            },
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.empty_query, EmptyQuery::All);
        assert!(config.catalog.is_none());
        assert_eq!(config.keys.input.remove_last, vec!["Backspace".to_string()]);
        assert_eq!(config.ui.icons.placeholder, "Type here...");
    }

    #[test]
    fn test_empty_query_policy() {
        assert_eq!(parse("empty_query = \"none\"").unwrap().empty_query, EmptyQuery::Hidden);
        assert_eq!(parse("empty_query = \"ALL\"").unwrap().empty_query, EmptyQuery::All);
        assert!(parse("empty_query = \"some\"").is_err());
    }

    #[test]
    fn test_key_binding_single_or_list() {
        let config = parse(
            r#"
[keys.input]
confirm = "Tab"
next = ["Down", "PageDown"]
"#,
        )
        .unwrap();
        assert_eq!(config.keys.input.confirm, vec!["Tab".to_string()]);
        assert_eq!(
            config.keys.input.next,
            vec!["Down".to_string(), "PageDown".to_string()]
        );
        // untouched actions keep their defaults
        assert_eq!(config.keys.input.prev, vec!["Up".to_string()]);
    }

    #[test]
    fn test_key_collision_is_rejected() {
        let err = parse(
            r#"
[keys.input]
confirm = "Down"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("collision"));
    }

    #[test]
    fn test_key_collision_ignores_case_for_names() {
        let err = parse(
            r#"
[keys.chips]
remove = ["x"]
cancel = ["ESC", "left"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("keys.chips"));
    }

    #[test]
    fn test_single_char_bindings_are_case_sensitive() {
        let config = parse(
            r#"
[keys.chips]
next = ["L"]
prev = ["l"]
"#,
        );
        assert!(config.is_ok());
    }

    #[test]
    fn test_colors_array_or_map() {
        let config = parse(
            r#"
[ui.colors]
chip_bg = [1, 2, 3]
chip_fg = { r = 4, g = 5, b = 6 }
"#,
        )
        .unwrap();
        assert_eq!(config.ui.colors.chip_bg, RgbColor::new(1, 2, 3));
        assert_eq!(config.ui.colors.chip_fg, RgbColor::new(4, 5, 6));
    }

    #[test]
    fn test_blank_remove_icon_falls_back() {
        let config = parse("[ui.icons]\nchip_remove = \"\"").unwrap();
        assert_eq!(config.ui.icons.chip_remove, "x");
    }

    #[test]
    fn test_unknown_keys_reported() {
        let value: toml::Value = toml::from_str(
            r#"
colour = 1
[keys.global]
quit = "q"
[ui.icons]
avatar = "@"
"#,
        )
        .unwrap();
        let warnings = unknown_keys(&value);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("colour"));
    }

    #[test]
    fn test_catalog_tilde_expansion() {
        let config = parse("catalog = \"~/contacts.toml\"").unwrap();
        let catalog = config.catalog.unwrap();
        if let Some(home) = home::home_dir() {
            assert_eq!(catalog, home.join("contacts.toml"));
        }
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_explicit_config_records_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "empty_query = \"none\"\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(config.empty_query, EmptyQuery::Hidden);
    }
}
