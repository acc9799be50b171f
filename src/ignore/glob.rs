//! Shell-style globbing relative to a base directory.
//!
//! Patterns are split on `/` and matched one segment at a time against the
//! directory listing, so `*`, `?` and `[...]` never cross a separator. With
//! `recursive` set, a segment that is exactly `**` matches zero or more
//! directories. Names starting with `.` are only matched when the options
//! include hidden entries or the segment itself starts with a dot.
//!
//! Missing directories are not errors: they simply produce no matches.

use glob::{MatchOptions, Pattern, PatternError};
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options controlling a glob walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobOptions {
    /// Treat a `**` segment as "zero or more directories"
    pub recursive: bool,
    /// Let wildcards and `**` match entries whose name starts with `.`
    pub include_hidden: bool,
    /// Descend into symlinked directories while expanding `**`
    pub follow_symlinks: bool,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            include_hidden: false,
            follow_symlinks: true,
        }
    }
}

/// One `/`-separated piece of a pattern
#[derive(Debug, Clone)]
enum Segment {
    /// No magic characters, tested for existence
    Literal(String),
    /// `*`, `?` or `[...]` matched against directory listings
    Wildcard(Pattern),
    /// `**` with recursive matching enabled
    Recursive,
    /// Trailing separator: the match must be a directory
    DirOnly,
}

/// A compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    /// Source text, kept for diagnostics
    pattern: String,
    /// Compiled segments
    segments: Vec<Segment>,
    /// Walk options
    options: GlobOptions,
}

impl GlobMatcher {
    /// Compile `pattern` with the given options
    ///
    /// # Errors
    ///
    /// Returns an error if a wildcard segment is not a valid pattern
    /// (for example an unterminated `[` class).
    pub fn new(pattern: &str, options: GlobOptions) -> Result<Self, PatternError> {
        let raw: Vec<&str> = pattern.split('/').collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (i, seg) in raw.iter().enumerate() {
            if seg.is_empty() {
                if i + 1 == raw.len() && i > 0 {
                    segments.push(Segment::DirOnly);
                }
                continue;
            }
            if options.recursive && *seg == "**" {
                if !matches!(segments.last(), Some(Segment::Recursive)) {
                    segments.push(Segment::Recursive);
                }
            } else if has_magic(seg) {
                segments.push(Segment::Wildcard(Pattern::new(&collapse_stars(seg))?));
            } else {
                segments.push(Segment::Literal((*seg).to_string()));
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
            options,
        })
    }

    /// The pattern text this matcher was compiled from
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Lazily enumerate matches under `root` as paths relative to it.
    ///
    /// Each call starts a fresh walk, so the sequence can be restarted.
    #[must_use]
    pub fn matches<'a>(&'a self, root: &'a Path) -> Matches<'a> {
        let mut frames = VecDeque::new();
        if !self.segments.is_empty() {
            frames.push_back((PathBuf::new(), 0));
        }
        Matches {
            matcher: self,
            root,
            frames,
            ready: VecDeque::new(),
        }
    }

    /// Options used when matching names inside one directory
    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: !self.options.include_hidden,
        }
    }
}

/// Iterator over the matches of one [`GlobMatcher`] walk
pub struct Matches<'a> {
    /// Pattern being expanded
    matcher: &'a GlobMatcher,
    /// Directory the pattern is relative to
    root: &'a Path,
    /// Pending (relative prefix, segment index) pairs
    frames: VecDeque<(PathBuf, usize)>,
    /// Matches produced but not yet yielded
    ready: VecDeque<PathBuf>,
}

impl Iterator for Matches<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if let Some(found) = self.ready.pop_front() {
                return Some(found);
            }
            let (prefix, idx) = self.frames.pop_front()?;
            self.expand(&prefix, idx);
        }
    }
}

impl Matches<'_> {
    /// Expand segment `idx` below `prefix`, queueing matches and new frames
    fn expand(&mut self, prefix: &Path, idx: usize) {
        let segments = &self.matcher.segments;
        let last = idx + 1 == segments.len();
        let abs = self.root.join(prefix);

        match &segments[idx] {
            Segment::DirOnly => {
                if !prefix.as_os_str().is_empty() && abs.is_dir() {
                    self.ready.push_back(prefix.to_path_buf());
                }
            }
            Segment::Literal(name) => {
                let candidate = prefix.join(name);
                let abs_candidate = self.root.join(&candidate);
                if last {
                    if abs_candidate.symlink_metadata().is_ok() {
                        self.ready.push_back(candidate);
                    }
                } else if abs_candidate.is_dir() {
                    self.frames.push_back((candidate, idx + 1));
                }
            }
            Segment::Wildcard(pattern) => {
                let options = self.matcher.match_options();
                for name in list_dir(&abs) {
                    if !pattern.matches_with(&name.to_string_lossy(), options) {
                        continue;
                    }
                    let candidate = prefix.join(&name);
                    if last {
                        self.ready.push_back(candidate);
                    } else if self.root.join(&candidate).is_dir() {
                        self.frames.push_back((candidate, idx + 1));
                    }
                }
            }
            Segment::Recursive => {
                if last {
                    if !prefix.as_os_str().is_empty() {
                        self.ready.push_back(prefix.to_path_buf());
                    }
                    for entry in self.descendants(prefix) {
                        self.ready.push_back(entry.0);
                    }
                } else {
                    self.frames.push_back((prefix.to_path_buf(), idx + 1));
                    for (path, is_dir) in self.descendants(prefix) {
                        if is_dir {
                            self.frames.push_back((path, idx + 1));
                        }
                    }
                }
            }
        }
    }

    /// Every entry below `prefix` with its directory-ness, honoring the
    /// hidden and symlink options
    fn descendants(&self, prefix: &Path) -> Vec<(PathBuf, bool)> {
        let options = self.matcher.options;
        let follow_root = options.follow_symlinks || prefix.as_os_str().is_empty();
        WalkDir::new(self.root.join(prefix))
            .min_depth(1)
            .follow_links(options.follow_symlinks)
            .follow_root_links(follow_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| options.include_hidden || !is_hidden(e.file_name()))
            .filter_map(Result::ok)
            .filter_map(|e| {
                let rel = e.path().strip_prefix(self.root).ok()?.to_path_buf();
                Some((rel, e.file_type().is_dir()))
            })
            .collect()
    }
}

/// Match `pattern` under `root` and collect the relative results
///
/// # Errors
///
/// Returns an error if the pattern cannot be compiled
pub fn glob(pattern: &str, root: &Path, options: GlobOptions) -> Result<Vec<PathBuf>, PatternError> {
    let matcher = GlobMatcher::new(pattern, options)?;
    Ok(matcher.matches(root).collect())
}

/// Whether a segment contains glob metacharacters
#[must_use]
pub fn has_magic(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Whether a file name is hidden
fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().first() == Some(&b'.')
}

/// Fold runs of `*` into one; a non-recursive `**` means the same as `*`
fn collapse_stars(seg: &str) -> String {
    let mut out = String::with_capacity(seg.len());
    for c in seg.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Sorted names in `dir`, empty when it cannot be read
fn list_dir(dir: &Path) -> Vec<std::ffi::OsString> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<_> = entries.filter_map(Result::ok).map(|e| e.file_name()).collect();
    names.sort();
    names
}
