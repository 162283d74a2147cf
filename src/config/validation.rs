//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (children and root name declared flows,
//!   path segments name table entries or declared dynamic keys)
//! - Detect duplicate identifiers, keys and path names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NavigatorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::NavigatorConfig;

/// One semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("flow #{0} has an empty identifier")]
    EmptyFlowIdentifier(usize),

    #[error("flow '{0}' is declared more than once")]
    DuplicateFlow(String),

    #[error("flow '{flow}' lists unknown child flow '{child}'")]
    UnknownChild { flow: String, child: String },

    #[error("root flow '{0}' is not declared in [[flows]]")]
    UnknownRoot(String),

    #[error("table entry #{0} has an empty key")]
    EmptyKey(usize),

    #[error("table entry '{0}' has an empty identifier")]
    EmptyEntryIdentifier(String),

    #[error("table key '{0}' is declared more than once")]
    DuplicateKey(String),

    #[error("dynamic key list contains an empty key")]
    EmptyDynamicKey,

    #[error("path '{0}' is declared more than once")]
    DuplicatePath(String),

    #[error("path '{0}' has no segments")]
    EmptyPath(String),

    #[error("path '{path}' references unknown table key '{key}'")]
    UnknownSegment { path: String, key: String },
}

/// Check `config` for semantic errors, collecting all of them.
pub fn validate_config(config: &NavigatorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut flows = HashSet::new();
    for (index, flow) in config.flows.iter().enumerate() {
        if flow.identifier.is_empty() {
            errors.push(ValidationError::EmptyFlowIdentifier(index));
        } else if !flows.insert(flow.identifier.as_str()) {
            errors.push(ValidationError::DuplicateFlow(flow.identifier.clone()));
        }
    }

    for flow in &config.flows {
        for child in &flow.children {
            if !flows.contains(child.as_str()) {
                errors.push(ValidationError::UnknownChild {
                    flow: flow.identifier.clone(),
                    child: child.clone(),
                });
            }
        }
    }

    if !flows.contains(config.navigation.root.as_str()) {
        errors.push(ValidationError::UnknownRoot(config.navigation.root.clone()));
    }

    let mut keys = HashSet::new();
    for (index, entry) in config.table.entries.iter().enumerate() {
        if entry.key.is_empty() {
            errors.push(ValidationError::EmptyKey(index));
            continue;
        }
        if entry.identifier.is_empty() {
            errors.push(ValidationError::EmptyEntryIdentifier(entry.key.clone()));
        }
        if !keys.insert(entry.key.as_str()) {
            errors.push(ValidationError::DuplicateKey(entry.key.clone()));
        }
    }

    for key in &config.table.dynamic_keys {
        if key.is_empty() {
            errors.push(ValidationError::EmptyDynamicKey);
        } else if !keys.insert(key.as_str()) {
            errors.push(ValidationError::DuplicateKey(key.clone()));
        }
    }

    let mut paths = HashSet::new();
    for path in &config.table.paths {
        if !paths.insert(path.name.as_str()) {
            errors.push(ValidationError::DuplicatePath(path.name.clone()));
        }
        if path.segments.is_empty() {
            errors.push(ValidationError::EmptyPath(path.name.clone()));
        }
        for key in &path.segments {
            if !keys.contains(key.as_str()) {
                errors.push(ValidationError::UnknownSegment {
                    path: path.name.clone(),
                    key: key.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
