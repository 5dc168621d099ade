use std::path::PathBuf;

use crate::error::{Level, impl_funky_error};
use crate::location::{Location, Span};
use crate::FunkyErrorExt;

/// A source program together with the name used in diagnostics.
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl Script {
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn FunkyErrorExt>> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            Box::new(MissingScriptError::new(path.clone(), e.to_string())) as Box<dyn FunkyErrorExt>
        })?;
        Ok(Script {
            name,
            path,
            content,
        })
    }

    /// Build a script from in-memory text, e.g. for tests or stdin.
    pub fn from_source(name: &str, content: &str) -> Self {
        Script {
            name: name.to_string(),
            path: PathBuf::from(name),
            content: content.to_string(),
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Script: {} at {:?}", self.name, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MissingScriptError {
    pub path: PathBuf,
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl MissingScriptError {
    pub fn new(path: PathBuf, reason: String) -> Self {
        MissingScriptError {
            message: format!("Cannot read script at {:?}: {}", path, reason),
            path,
            level: Level::Error,
            issuer: "funkytrees.script".to_string(),
            location: None,
            span: None,
        }
    }
}

impl_funky_error!(MissingScriptError);
