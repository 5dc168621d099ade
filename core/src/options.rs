//! Compile options, loadable from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::emit::OutputFormat;
use crate::error::{FunkyErrorExt, Level, impl_funky_error};
use crate::ir::lower::DEFAULT_TEMP_PREFIX;
use crate::location::{Location, Span};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Prefix of generated temporaries; source identifiers of the form
    /// `<prefix><digits>` are rejected.
    pub temp_prefix: String,
    /// Turn unparsed lines into errors instead of dropping them.
    pub strict: bool,
    pub format: OutputFormat,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            strict: false,
            format: OutputFormat::Xml,
        }
    }
}

impl CompileOptions {
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn FunkyErrorExt>> {
        let location = Some(Location::new(path.display().to_string(), 1, 1));
        let text = std::fs::read_to_string(path).map_err(|e| {
            Box::new(ConfigError::new(format!("Cannot read config file: {}", e), location.clone()))
                as Box<dyn FunkyErrorExt>
        })?;
        let options: CompileOptions = serde_json::from_str(&text).map_err(|e| {
            Box::new(ConfigError::new(
                format!("Invalid config file: {}", e),
                Some(Location::new(path.display().to_string(), e.line(), e.column())),
            )) as Box<dyn FunkyErrorExt>
        })?;
        options.validate()?;
        Ok(options)
    }

    /// The temporary prefix must itself be a valid identifier.
    pub fn validate(&self) -> Result<(), Box<dyn FunkyErrorExt>> {
        let mut chars = self.temp_prefix.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(Box::new(ConfigError::new(
                format!("Temporary prefix '{}' is not a valid identifier", self.temp_prefix),
                None,
            )))
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl ConfigError {
    pub fn new(message: String, location: Option<Location>) -> Self {
        ConfigError {
            level: Level::Error,
            message,
            issuer: "funkytrees.options".to_string(),
            location,
            span: None,
        }
    }
}

impl_funky_error!(ConfigError);
