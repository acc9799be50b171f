//! Parsing of ignore file lines into glob rules.
//!
//! The syntax follows `.gitignore`: `#` comments, `!` negation, backslash
//! escapes, a trailing `/` for directory-only rules, and rules without an
//! interior separator matching at any depth. Each rule is rewritten into a
//! pattern for [`super::glob::GlobMatcher`] rooted at the scan root.
//!
//! Lines that cannot be represented as a safe relative pattern are dropped.

use std::path::{Component, Path};
use tracing::debug;

/// Stand-in for an escaped backslash while other escapes are resolved
const BACKSLASH_PLACEHOLDER: char = '\0';
/// Stand-in for an escaped space so trailing-space stripping keeps it
const SPACE_PLACEHOLDER: char = '\n';

/// One parsed rule of one ignore file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// Directory of the ignore file, relative to the scan root
    pub base: String,
    /// Glob pattern relative to the scan root, already joined with `base`
    pub pattern: String,
    /// Whether the rule removes paths from the excluded set
    pub negate: bool,
}

impl IgnoreRule {
    /// Parse one line of an ignore file located in `base`.
    ///
    /// Returns `None` for blank lines, comments, and lines that cannot be
    /// normalized.
    #[must_use]
    pub fn parse(line: &str, base: &Path) -> Option<Self> {
        let base = base_pattern(base);
        let (pattern, negate) = normalize_line(line)?;
        let pattern = if base.is_empty() {
            pattern
        } else {
            format!("{base}/{pattern}")
        };
        Some(Self {
            base,
            pattern,
            negate,
        })
    }
}

/// Parse every line of an ignore file in file order
#[must_use]
pub fn parse_rules<'a, I>(lines: I, base: &Path) -> Vec<IgnoreRule>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let rule = IgnoreRule::parse(line, base);
            if rule.is_none() {
                debug!("ignore:skip:{:?}", line.trim_end_matches('\n'));
            }
            rule
        })
        .collect()
}

/// Normalize one line into a pattern relative to its ignore file's directory
/// plus the negation flag.
#[must_use]
pub fn normalize_line(line: &str) -> Option<(String, bool)> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let unescaped = unescape(line)?;

    let (pattern, negate) = match unescaped.strip_prefix('!') {
        Some(rest) => (rest.to_string(), true),
        None => (unescaped, false),
    };

    if pattern.is_empty() || pattern == "/" || pattern.contains("//") || has_drive_prefix(&pattern)
    {
        return None;
    }

    let segments: Vec<&str> = pattern.split('/').collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return None;
    }

    // Anchored only when a separator appears before the last character.
    let anchored = pattern
        .find('/')
        .is_some_and(|pos| pos < pattern.len() - 1);
    let mut normalized = if anchored {
        pattern.clone()
    } else {
        format!("**/{pattern}")
    };
    if let Some(stripped) = normalized.strip_prefix('/') {
        normalized = stripped.to_string();
    }

    match segments.as_slice() {
        [.., "**"] => normalized.push_str("/*"),
        [.., "**", ""] => normalized.push_str("*/"),
        _ => {}
    }

    Some((normalized, negate))
}

/// Resolve backslash escapes. Escaped glob metacharacters become single
/// character classes; a dangling backslash makes the line unusable.
fn unescape(line: &str) -> Option<String> {
    let line = line.replace("\\\\", &BACKSLASH_PLACEHOLDER.to_string());
    if line.ends_with('\\') {
        return None;
    }

    let line = line
        .replace("\\*", "[*]")
        .replace("\\[", "[[]")
        .replace("\\?", "[?]")
        .replace("\\ ", &SPACE_PLACEHOLDER.to_string());
    let line = line.trim_end_matches(' ');
    Some(
        line.replace('\\', "")
            .replace(BACKSLASH_PLACEHOLDER, "\\")
            .replace(SPACE_PLACEHOLDER, " "),
    )
}

/// `C:`-style prefixes cannot be expressed as relative excludes
fn has_drive_prefix(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Render a root-relative directory as a pattern prefix, escaping any glob
/// metacharacters in its names
fn base_pattern(base: &Path) -> String {
    base.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(escape(&name.to_string_lossy())),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Wrap `*`, `?` and `[` in brackets so they match literally
#[must_use]
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '*' | '?' | '[') {
            out.push('[');
            out.push(c);
            out.push(']');
        } else {
            out.push(c);
        }
    }
    out
}
