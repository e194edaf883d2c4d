//! Configuration loading and parsing.
//!
//! `oxop.toml` (or an override path provided by the binary) carries the
//! operator settings: flash feedback, per-family "stay" options, surround
//! pairs, the number pattern used by increment operators, insert-session undo
//! grouping, indentation, the select-list catalogue, and named external
//! commands. Every section and field is optional; unknown fields are ignored
//! so the file can evolve ahead of the binary. A file that fails to parse is
//! reported at warn level and replaced by defaults.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "oxop.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FlashConfig {
    #[serde(default = "FlashConfig::default_on_operate")]
    pub on_operate: bool,
    /// Operator names never flashed.
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default = "FlashConfig::default_duration_ms")]
    pub duration_ms: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            on_operate: Self::default_on_operate(),
            blacklist: Vec::new(),
            duration_ms: Self::default_duration_ms(),
        }
    }
}

impl FlashConfig {
    const fn default_on_operate() -> bool {
        true
    }
    const fn default_duration_ms() -> u64 {
        300
    }

    pub fn should_flash(&self, operator: &str) -> bool {
        self.on_operate && !self.blacklist.iter().any(|n| n == operator)
    }
}

/// Which stay option an operator consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StayOption {
    OnTransformString,
    OnYank,
    OnDelete,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct StayConfig {
    #[serde(default)]
    pub on_transform_string: bool,
    #[serde(default)]
    pub on_yank: bool,
    #[serde(default)]
    pub on_delete: bool,
}

impl StayConfig {
    pub fn enabled(&self, option: StayOption) -> bool {
        match option {
            StayOption::OnTransformString => self.on_transform_string,
            StayOption::OnYank => self.on_yank,
            StayOption::OnDelete => self.on_delete,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SurroundConfig {
    /// Input chars whose surround pads the text with one space on each side.
    #[serde(default)]
    pub chars_with_space: Vec<String>,
    /// Ordered bracket pairs; an input matching either side selects the pair.
    #[serde(default = "SurroundConfig::default_pairs")]
    pub pairs: Vec<[String; 2]>,
}

impl Default for SurroundConfig {
    fn default() -> Self {
        Self {
            chars_with_space: Vec::new(),
            pairs: Self::default_pairs(),
        }
    }
}

impl SurroundConfig {
    fn default_pairs() -> Vec<[String; 2]> {
        [("[", "]"), ("(", ")"), ("{", "}"), ("<", ">")]
            .into_iter()
            .map(|(open, close)| [open.to_string(), close.to_string()])
            .collect()
    }

    /// Open/close delimiters for an input char. Unknown chars surround with
    /// themselves on both sides.
    pub fn pair_for(&self, input: &str) -> (String, String) {
        self.pairs
            .iter()
            .find(|[open, close]| open == input || close == input)
            .map(|[open, close]| (open.clone(), close.clone()))
            .unwrap_or_else(|| (input.to_string(), input.to_string()))
    }

    pub fn pads_with_space(&self, input: &str) -> bool {
        self.chars_with_space.iter().any(|c| c == input)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct NumberConfig {
    #[serde(default = "NumberConfig::default_pattern")]
    pub pattern: String,
}

impl Default for NumberConfig {
    fn default() -> Self {
        Self {
            pattern: Self::default_pattern(),
        }
    }
}

impl NumberConfig {
    fn default_pattern() -> String {
        "-?[0-9]+".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InsertConfig {
    /// Collapse an insert session (positioning edit plus typing plus
    /// repeated copies) into one undo step when leaving insert mode.
    #[serde(default = "InsertConfig::default_group")]
    pub group_changes_when_leaving: bool,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            group_changes_when_leaving: Self::default_group(),
        }
    }
}

impl InsertConfig {
    const fn default_group() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IndentConfig {
    #[serde(default = "IndentConfig::default_unit")]
    pub unit: String,
    #[serde(default = "IndentConfig::default_comment_prefix")]
    pub comment_prefix: String,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            unit: Self::default_unit(),
            comment_prefix: Self::default_comment_prefix(),
        }
    }
}

impl IndentConfig {
    fn default_unit() -> String {
        "  ".to_string()
    }
    fn default_comment_prefix() -> String {
        "//".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SelectListConfig {
    /// Operator names offered by `TransformStringBySelectList`, in order.
    #[serde(default = "SelectListConfig::default_transformers")]
    pub transformers: Vec<String>,
}

impl Default for SelectListConfig {
    fn default() -> Self {
        Self {
            transformers: Self::default_transformers(),
        }
    }
}

impl SelectListConfig {
    fn default_transformers() -> Vec<String> {
        [
            "CamelCase",
            "DashCase",
            "SnakeCase",
            "PascalCase",
            "TitleCase",
            "EncodeUriComponent",
            "DecodeUriComponent",
            "TrimString",
            "CompactSpaces",
            "RemoveLeadingWhiteSpaces",
            "JoinWithKeepingSpace",
            "Reverse",
            "SplitString",
            "UpperCase",
            "LowerCase",
            "ToggleCase",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
}

/// A filter program exposed as an operator named `name`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ExternalCommandConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub flash: FlashConfig,
    #[serde(default)]
    pub stay: StayConfig,
    #[serde(default)]
    pub surround: SurroundConfig,
    #[serde(default)]
    pub number: NumberConfig,
    #[serde(default)]
    pub insert: InsertConfig,
    #[serde(default)]
    pub indent: IndentConfig,
    #[serde(default)]
    pub select_list: SelectListConfig,
    #[serde(default)]
    pub external_command: Vec<ExternalCommandConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub source: Option<PathBuf>,
}

/// Best-effort config path: `oxop.toml` in the working directory, then the
/// platform config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxop").join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match Config::from_toml(&content) {
        Ok(mut cfg) => {
            info!(target: "config", path = %path.display(), external_commands = cfg.file.external_command.len(), "config_loaded");
            cfg.source = Some(path);
            Ok(cfg)
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file = toml::from_str::<ConfigFile>(content)?;
        Ok(Self {
            raw: Some(content.to_string()),
            file,
            source: None,
        })
    }

    pub fn external_command(&self, name: &str) -> Option<&ExternalCommandConfig> {
        self.file.external_command.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.file.flash.on_operate);
        assert_eq!(cfg.file.flash.duration_ms, 300);
        assert_eq!(cfg.file.number.pattern, "-?[0-9]+");
        assert!(cfg.file.insert.group_changes_when_leaving);
        assert_eq!(cfg.file.surround.pairs.len(), 4);
        assert!(cfg.file.external_command.is_empty());
    }

    #[test]
    fn parses_sections_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"
[flash]
blacklist = ["Yank"]

[stay]
on_yank = true

[surround]
chars_with_space = ["("]

[indent]
unit = "    "

[[external_command]]
name = "SortLines"
command = "sort"
"#,
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.file.flash.should_flash("Yank"));
        assert!(cfg.file.flash.should_flash("Delete"));
        assert!(cfg.file.stay.enabled(StayOption::OnYank));
        assert!(!cfg.file.stay.enabled(StayOption::OnDelete));
        assert!(cfg.file.surround.pads_with_space("("));
        assert_eq!(cfg.file.indent.unit, "    ");
        assert_eq!(cfg.file.indent.comment_prefix, "//");
        let sort = cfg.external_command("SortLines").unwrap();
        assert_eq!(sort.command, "sort");
        assert!(sort.args.is_empty());
        assert_eq!(cfg.source.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn pair_lookup_matches_either_side() {
        let s = SurroundConfig::default();
        assert_eq!(s.pair_for("("), ("(".to_string(), ")".to_string()));
        assert_eq!(s.pair_for(">"), ("<".to_string(), ">".to_string()));
        assert_eq!(s.pair_for("'"), ("'".to_string(), "'".to_string()));
    }

    #[test]
    fn parse_error_logs_warning_and_falls_back() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[flash\non_operate = ").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap()
        });

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed_using_defaults"));
        assert!(cfg.raw.is_none());
        assert!(cfg.file.flash.on_operate);
    }
}
