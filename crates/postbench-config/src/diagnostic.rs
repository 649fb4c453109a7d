// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette diagnostics.
//!
//! Keys coming from a TOML file point at the offending line; keys coming
//! from `POSTBENCH_*` variables are reported under their variable name, so
//! a typo is suggested in the form the operator actually typed.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::ENV_PREFIX;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key that no section of the configuration accepts.
    #[error("unknown configuration key `{key}` in {origin}")]
    #[diagnostic(
        code(postbench::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Where the key came from: a file path, `<inline>`, or an env var.
        origin: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a postbench setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type or outside the accepted set.
    #[error("invalid value for `{key}`: {detail}")]
    #[diagnostic(code(postbench::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    /// Rejected by semantic validation after deserialization.
    #[error("validation error: {message}")]
    #[diagnostic(code(postbench::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(postbench::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? accepted here: {valid_keys}"),
        None => format!("accepted here: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may carry several errors) into diagnostics.
///
/// `toml_sources` holds `(name, content)` pairs used to attach spans.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                unknown_key(&error, field, expected, toml_sources)
            }
            Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
                ConfigError::InvalidType {
                    key: dotted(&error.path, None),
                    detail: format!("found {actual}"),
                    expected: expected.to_string(),
                }
            }
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

fn unknown_key(
    error: &figment::Error,
    field: &str,
    expected: &[&str],
    toml_sources: &[(String, String)],
) -> ConfigError {
    let section = error.path.first().map(String::as_str);
    let suggestion = suggest_key(field, expected);

    if from_env(error) {
        let var = |key: &str| env_var_name(section, key);
        return ConfigError::UnknownKey {
            key: field.to_string(),
            origin: format!("environment variable {}", var(field)),
            suggestion: suggestion.map(|s| var(&s)),
            valid_keys: expected.iter().map(|&k| var(k)).collect::<Vec<_>>().join(", "),
            span: None,
            src: None,
        };
    }

    let source = source_for(error, toml_sources);
    let located = source.and_then(|(name, content)| {
        locate_key(content, section, field).map(|offset| {
            (
                SourceSpan::new(offset.into(), field.len()),
                NamedSource::new(name, content.clone()),
            )
        })
    });
    let (span, src) = located.unzip();

    ConfigError::UnknownKey {
        key: dotted(&error.path, Some(field)),
        origin: source.map_or_else(|| "configuration".to_string(), |(name, _)| name.clone()),
        suggestion,
        valid_keys: expected.join(", "),
        span,
        src,
    }
}

fn from_env(error: &figment::Error) -> bool {
    error
        .metadata
        .as_ref()
        .is_some_and(|m| m.name.contains("environment variable"))
}

/// Pick the TOML text the error came from. Inline strings carry no file
/// metadata, so a lone source is assumed to be it.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<&'a (String, String)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| match s {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
    match file {
        Some(path) => toml_sources.iter().find(|(name, _)| *name == path),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    }
}

fn dotted<'a>(path: &'a [String], field: Option<&'a str>) -> String {
    path.iter()
        .map(String::as_str)
        .chain(field)
        .collect::<Vec<_>>()
        .join(".")
}

/// `POSTBENCH_<SECTION>_<KEY>`, the variable that sets `section.key`.
pub fn env_var_name(section: Option<&str>, key: &str) -> String {
    let dotted = match section {
        Some(section) => format!("{section}_{key}"),
        None => key.to_string(),
    };
    format!("{ENV_PREFIX}{}", dotted.to_ascii_uppercase())
}

/// Byte offset of `field` as a key inside the `[section]` table of `content`.
///
/// Tracks the current table header line by line, so a key with the same
/// name in another section is never matched.
pub fn locate_key(content: &str, section: Option<&str>, field: &str) -> Option<usize> {
    let mut table: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            table = Some(header.trim());
        } else if table == section {
            let indent = line.len() - line.trim_start().len();
            let key = trimmed.split('=').next().map(str::trim);
            if key == Some(field) && trimmed.contains('=') {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }

    None
}

/// Closest accepted key above the similarity threshold, if any.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics with miette's graphical handler.
pub fn render_to_string(errors: &[ConfigError]) -> String {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        let before = out.len();
        if handler.render_report(&mut out, error as &dyn Diagnostic).is_err() {
            out.truncate(before);
            out.push_str(&format!("Error: {error}\n"));
        }
    }
    out
}

/// Print diagnostics to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_to_string(errors));
}
