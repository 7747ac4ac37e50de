use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::error::IrError;

lazy_static! {
    static ref PARAMETER: Regex = Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*=(.*)$").unwrap();
}

/// One `TEMPLATE_LIST` entry: a bare glob, or a glob bound to the proto file
/// whose name the produced artifacts take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateSpec {
    Pattern(String),
    WithProto(String, String),
}

impl TemplateSpec {
    pub fn pattern(&self) -> &str {
        match self {
            TemplateSpec::Pattern(p) | TemplateSpec::WithProto(p, _) => p,
        }
    }

    pub fn proto(&self) -> Option<&str> {
        match self {
            TemplateSpec::Pattern(_)          => None,
            TemplateSpec::WithProto(_, proto) => Some(proto),
        }
    }
}

/// Active configuration. Travels inside every snapshot so generator
/// processes see the same settings as the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "LOGGING_LEVEL")]
    pub logging_level: String,
    /// Log destination relative to `path`; empty means stderr.
    #[serde(rename = "LOGGING_FILE")]
    pub logging_file:  String,
    #[serde(rename = "IR_FILE")]
    pub ir_file:       PathBuf,
    #[serde(rename = "TEMPLATE_LIST")]
    pub template_list: Vec<TemplateSpec>,
    /// Base directory for the relative names above and for generator lookup.
    #[serde(rename = "PATH")]
    pub path:          PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            logging_level: "info".to_string(),
            logging_file:  "protoboil.log".to_string(),
            ir_file:       PathBuf::from("ir.json"),
            template_list: vec![TemplateSpec::Pattern("*.*.gen".to_string())],
            path:          PathBuf::new(),
        }
    }
}

impl Config {
    /// Reads a TOML configuration file. Keys outside the recognized set are
    /// ignored. `PATH` defaults to the directory holding the file, and a
    /// relative `PATH` is taken relative to that directory.
    pub fn from_file(filename: &Path) -> Result<Config, IrError> {
        let text = fs::read_to_string(filename)?;
        let mut config = Config::from_toml(&text)?;

        let base = filename.parent().unwrap_or_else(|| Path::new(""));
        if config.path.as_os_str().is_empty() {
            config.path = base.to_path_buf();
        } else if config.path.is_relative() {
            config.path = base.join(&config.path);
        }
        Ok(config)
    }

    /// Parses and validates configuration text without any path resolution.
    pub fn from_toml(text: &str) -> Result<Config, IrError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the fields that would otherwise fail late: the level name and
    /// every template glob.
    pub fn validate(&self) -> Result<(), IrError> {
        self.level()?;
        for spec in &self.template_list {
            glob::Pattern::new(spec.pattern()).map_err(|e| IrError::InvalidPattern {
                pattern: spec.pattern().to_string(),
                msg:     e.msg.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn level(&self) -> Result<LevelFilter, IrError> {
        self.logging_level
            .parse::<LevelFilter>()
            .map_err(|_| IrError::InvalidLevel(self.logging_level.clone()))
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.path.join(&self.ir_file)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        if self.logging_file.is_empty() {
            None
        } else {
            Some(self.path.join(&self.logging_file))
        }
    }
}

/// The plugin parameter string: comma separated `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: BTreeMap<String, String>,
}

impl Params {
    pub fn parse(parameter: &str) -> Result<Params, IrError> {
        let mut entries = BTreeMap::new();
        if parameter.trim().is_empty() {
            return Ok(Params { entries });
        }

        for item in parameter.split(',') {
            let caps = PARAMETER
                .captures(item)
                .ok_or_else(|| IrError::InvalidParameter(format!("{:?}", item)))?;
            entries.insert(caps[1].to_string(), caps[2].trim().to_string());
        }
        Ok(Params { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// The configuration file named by the `config` key.
    pub fn config(&self) -> Option<&Path> {
        self.get("config").map(Path::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
