//! Glob patterns for spec includes/excludes and shard filenames
//!
//! Supports the dialect the run configuration actually uses: `*` and `?`
//! stay within one path component, `**` crosses components, everything
//! else is literal. Character classes are rejected rather than silently
//! mismatched. Patterns are anchored: they must match the whole name or
//! relative path.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled glob pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a glob. A leading `./` is normalised away so config globs
    /// like `./test/**/*.spec.js` match paths relative to the spec root.
    pub fn new(glob: &str) -> Result<Self> {
        let normalised = glob.strip_prefix("./").unwrap_or(glob);
        let regex_src = translate(glob, normalised)?;
        let regex = Regex::new(&regex_src).map_err(|e| Error::InvalidPattern {
            pattern: glob.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: glob.to_string(),
            regex,
        })
    }

    /// The glob as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a bare filename (shard selection).
    pub fn matches_name(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Match a `/`-separated path relative to the spec root.
    pub fn matches_path(&self, relative: &str) -> bool {
        let unixy = relative.replace('\\', "/");
        let trimmed = unixy.strip_prefix("./").unwrap_or(&unixy);
        self.regex.is_match(trimmed)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn translate(original: &str, glob: &str) -> Result<String> {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');

    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    if chars.get(i + 2) == Some(&'/') {
                        // `**/` spans zero or more whole components
                        out.push_str("(?:[^/]*/)*");
                        i += 3;
                    } else {
                        out.push_str(".*");
                        i += 2;
                    }
                } else {
                    out.push_str("[^/]*");
                    i += 1;
                }
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' | ']' => {
                return Err(Error::InvalidPattern {
                    pattern: original.to_string(),
                    reason: "character classes are not supported".to_string(),
                });
            }
            c => {
                if "\\.+()^${}|".contains(c) {
                    out.push('\\');
                }
                out.push(c);
                i += 1;
            }
        }
    }

    out.push('$');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_glob_matches_worker_files_only() {
        let pattern = Pattern::new("wdio-*").unwrap();
        assert!(pattern.matches_name("wdio-1.json"));
        assert!(pattern.matches_name("wdio-0-0.json"));
        assert!(!pattern.matches_name("testResults.json"));
        assert!(!pattern.matches_name("wdio"));
    }

    #[test]
    fn star_stays_within_a_component() {
        let pattern = Pattern::new("test/*.spec.js").unwrap();
        assert!(pattern.matches_path("test/login.spec.js"));
        assert!(!pattern.matches_path("test/auth/login.spec.js"));
    }

    #[test]
    fn globstar_spans_zero_or_more_components() {
        let pattern = Pattern::new("./test/**/*.spec.js").unwrap();
        assert!(pattern.matches_path("test/login.spec.js"));
        assert!(pattern.matches_path("test/auth/totp/login.spec.js"));
        assert!(!pattern.matches_path("test/login.page.js"));
        assert!(!pattern.matches_path("src/login.spec.js"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        let pattern = Pattern::new("shard-?.json").unwrap();
        assert!(pattern.matches_name("shard-1.json"));
        assert!(!pattern.matches_name("shard-12.json"));
        assert!(!pattern.matches_name("shard-.json"));
    }

    #[test]
    fn dots_are_literal() {
        let pattern = Pattern::new("*.spec.js").unwrap();
        assert!(pattern.matches_name("a.spec.js"));
        assert!(!pattern.matches_name("a_specajs"));
    }

    #[test]
    fn character_classes_are_rejected() {
        assert!(matches!(
            Pattern::new("test/["),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn leading_dot_slash_is_normalised_on_both_sides() {
        let pattern = Pattern::new("./report/*.json").unwrap();
        assert!(pattern.matches_path("report/out.json"));
        assert!(pattern.matches_path("./report/out.json"));
    }
}
