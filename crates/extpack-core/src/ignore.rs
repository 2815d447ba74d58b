//! Ignore rules for staging.
//!
//! Rules are `fnmatch`-style patterns matched against paths relative to the
//! source root. `*` matches any run of characters including `/`, so `**` is
//! just two wildcards, and `?` matches any single character. `[seq]` and
//! `[!seq]` are character sets; an unclosed `[` is a literal bracket.
//! Dotfiles need no explicit leading dot, and comparison is always
//! case-sensitive regardless of the host filesystem.
//!
//! Each rule is translated to an anchored [`Regex`] when loaded.

use crate::PackageError;
use crate::Result;
use crate::walker::to_posix_string;
use regex::Regex;
use std::path::Path;
use std::path::PathBuf;

/// Default rules file name, relative to the project root.
pub const DEFAULT_IGNORE_FILE_NAME: &str = ".crxignore";

/// An ordered set of compiled ignore patterns.
///
/// # Examples
///
/// ```
/// use extpack_core::IgnoreRules;
/// use std::path::Path;
///
/// let rules = IgnoreRules::parse("# build junk\n*.log\n\ntmp/*\n")?;
/// assert_eq!(rules.len(), 2);
/// assert!(rules.is_ignored(Path::new("debug.log")));
/// assert!(rules.is_ignored(Path::new("tmp/c.txt")));
/// assert!(!rules.is_ignored(Path::new("a.txt")));
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone)]
struct Rule {
    source: String,
    /// `None` when the pattern can never match, e.g. `[z-a]`.
    regex: Option<Regex>,
}

impl Rule {
    fn matches(&self, candidate: &str) -> bool {
        self.regex
            .as_ref()
            .is_some_and(|regex| regex.is_match(candidate))
    }
}

impl IgnoreRules {
    /// Creates an empty rule set that ignores nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a list of patterns.
    ///
    /// # Errors
    ///
    /// Returns [`PackageError::InvalidPattern`] for the first pattern whose
    /// translated expression exceeds the regex size limits. `line` is the
    /// 1-based position in `patterns`.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = patterns
            .into_iter()
            .enumerate()
            .map(|(idx, pattern)| compile(pattern.as_ref(), idx + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Parses rules file contents.
    ///
    /// Lines starting with `#` are comments; an indented `#` starts a
    /// pattern. Remaining lines are trimmed and blank ones skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let rules = text
            .lines()
            .enumerate()
            .filter_map(|(idx, raw)| {
                let line = raw.trim();
                (!line.is_empty() && !raw.starts_with('#')).then_some((idx + 1, line))
            })
            .map(|(line_no, line)| compile(line, line_no))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Loads rules from `path`. A missing file yields an empty rule set.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read, or
    /// [`PackageError::InvalidPattern`] if a rule cannot be compiled.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(PackageError::io(path, e)),
        }
    }

    /// Number of patterns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the set has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over the pattern sources in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.source.as_str())
    }

    /// Returns `true` if `relative` matches any pattern.
    ///
    /// `relative` must already be relative to the source root. Components
    /// are joined with `/` before matching.
    #[must_use]
    pub fn is_ignored(&self, relative: &Path) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let Some(candidate) = to_posix_string(relative) else {
            return false;
        };
        self.rules.iter().any(|rule| rule.matches(&candidate))
    }
}

/// Decides whether `path`, which lies under `source_root`, is ignored.
///
/// The decision depends only on the path relative to `source_root`.
///
/// # Errors
///
/// Returns [`PackageError::PathOutsideRoot`] if `path` is not under
/// `source_root`.
///
/// # Examples
///
/// ```
/// use extpack_core::IgnoreRules;
/// use extpack_core::should_ignore;
/// use std::path::Path;
///
/// let rules = IgnoreRules::from_patterns(["*.log"])?;
/// let root = Path::new("/project/src/app");
/// assert!(should_ignore(Path::new("/project/src/app/debug.log"), root, &rules)?);
/// assert!(!should_ignore(Path::new("/project/src/app/main.js"), root, &rules)?);
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
pub fn should_ignore(path: &Path, source_root: &Path, rules: &IgnoreRules) -> Result<bool> {
    let relative = relative_path(path, source_root)?;
    Ok(rules.is_ignored(relative))
}

/// Strips `root` from `path`.
pub(crate) fn relative_path<'a>(path: &'a Path, root: &Path) -> Result<&'a Path> {
    path.strip_prefix(root)
        .map_err(|_| PackageError::PathOutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
}

fn compile(pattern: &str, line: usize) -> Result<Rule> {
    let regex = translate(pattern)
        .map(|expr| Regex::new(&expr))
        .transpose()
        .map_err(|source| PackageError::InvalidPattern {
            pattern: pattern.to_string(),
            line,
            source,
        })?;
    Ok(Rule {
        source: pattern.to_string(),
        regex,
    })
}

/// Translates a pattern into an anchored regex source.
///
/// Returns `None` if the pattern contains a set that admits no character.
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut expr = String::from("(?s)^");
    let mut after_star = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c == '*' {
            if !after_star {
                expr.push_str(".*");
            }
            after_star = true;
            continue;
        }
        after_star = false;

        match c {
            '?' => expr.push('.'),
            '[' => match CharSet::parse(&chars, i) {
                Some((set, next)) => {
                    i = next;
                    expr.push_str(&set.to_regex()?);
                }
                None => expr.push_str(r"\["),
            },
            _ => push_escaped(&mut expr, c),
        }
    }

    expr.push_str(r"\z");
    Some(expr)
}

fn push_escaped(expr: &mut String, c: char) {
    expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
}

/// A bracket expression such as `[a-c]` or `[!x]`.
#[derive(Debug, PartialEq, Eq)]
struct CharSet {
    negated: bool,
    items: Vec<(char, char)>,
}

impl CharSet {
    /// Parses the set opening just before `start`.
    ///
    /// Returns the set and the index after its closing `]`, or `None` if the
    /// set is never closed. A `]` right after `[` or `[!` is a member.
    fn parse(chars: &[char], start: usize) -> Option<(Self, usize)> {
        let mut end = start;
        if chars.get(end) == Some(&'!') {
            end += 1;
        }
        if chars.get(end) == Some(&']') {
            end += 1;
        }
        while chars.get(end).is_some_and(|&c| c != ']') {
            end += 1;
        }
        if end >= chars.len() {
            return None;
        }

        let mut body = &chars[start..end];
        let negated = body.first() == Some(&'!');
        if negated {
            body = &body[1..];
        }

        let mut items = Vec::new();
        let mut p = 0;
        while p < body.len() {
            let lo = body[p];
            if body.get(p + 1) == Some(&'-') && p + 2 < body.len() {
                let hi = body[p + 2];
                // Reversed ranges are empty.
                if lo <= hi {
                    items.push((lo, hi));
                }
                p += 3;
            } else {
                items.push((lo, lo));
                p += 1;
            }
        }

        Some((Self { negated, items }, end + 1))
    }

    /// Regex for the set, or `None` if it can match nothing.
    fn to_regex(&self) -> Option<String> {
        if self.items.is_empty() {
            return self.negated.then(|| ".".to_string());
        }
        let mut class = String::from(if self.negated { "[^" } else { "[" });
        for &(lo, hi) in &self.items {
            push_escaped(&mut class, lo);
            if hi != lo {
                class.push('-');
                push_escaped(&mut class, hi);
            }
        }
        class.push(']');
        Some(class)
    }
}

/// Default rules file location for a project root.
#[must_use]
pub fn default_ignore_file(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_IGNORE_FILE_NAME)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rules(patterns: &[&str]) -> IgnoreRules {
        IgnoreRules::from_patterns(patterns).unwrap()
    }

    #[test]
    fn test_empty_rules_ignore_nothing() {
        let rules = IgnoreRules::new();
        assert!(rules.is_empty());
        assert!(!rules.is_ignored(Path::new("a.txt")));
        assert!(!rules.is_ignored(Path::new("deep/nested/file.log")));
    }

    #[test]
    fn test_star_matches_extension() {
        let rules = rules(&["*.log"]);
        assert!(rules.is_ignored(Path::new("b.log")));
        assert!(!rules.is_ignored(Path::new("b.txt")));
        assert!(!rules.is_ignored(Path::new("log")));
    }

    #[test]
    fn test_star_crosses_separator() {
        let rules = rules(&["*.log"]);
        assert!(rules.is_ignored(Path::new("logs/deep/b.log")));
    }

    #[test]
    fn test_directory_prefix_pattern() {
        let rules = rules(&["tmp/*"]);
        assert!(rules.is_ignored(Path::new("tmp/c.txt")));
        assert!(rules.is_ignored(Path::new("tmp/sub/d.txt")));
        assert!(!rules.is_ignored(Path::new("src/tmp/c.txt")));
        assert!(!rules.is_ignored(Path::new("tmpfile")));
    }

    #[test]
    fn test_question_mark_and_sequences() {
        let rules = rules(&["file?.js", "[ab].css", "[!x]y.txt"]);
        assert!(rules.is_ignored(Path::new("file1.js")));
        assert!(!rules.is_ignored(Path::new("file10.js")));
        assert!(rules.is_ignored(Path::new("a.css")));
        assert!(!rules.is_ignored(Path::new("c.css")));
        assert!(rules.is_ignored(Path::new("zy.txt")));
        assert!(!rules.is_ignored(Path::new("xy.txt")));
    }

    #[test]
    fn test_leading_dot_matched_by_star() {
        let rules = rules(&["*.map"]);
        assert!(rules.is_ignored(Path::new(".hidden.map")));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let rules = rules(&["*.LOG", "Readme.md"]);
        assert!(rules.is_ignored(Path::new("x.LOG")));
        assert!(!rules.is_ignored(Path::new("x.log")));
        assert!(rules.is_ignored(Path::new("Readme.md")));
        assert!(!rules.is_ignored(Path::new("README.md")));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let rules = IgnoreRules::parse("# comment\n\n   \n*.log\n  tmp/*  \n#*.txt\n").unwrap();
        let patterns: Vec<&str> = rules.patterns().collect();
        assert_eq!(patterns, ["*.log", "tmp/*"]);
    }

    #[test]
    fn test_parse_indented_hash_is_pattern() {
        let rules = IgnoreRules::parse("  #draft\n# comment\n").unwrap();
        let patterns: Vec<&str> = rules.patterns().collect();
        assert_eq!(patterns, ["#draft"]);
        assert!(rules.is_ignored(Path::new("#draft")));
    }

    #[test]
    fn test_double_star_is_two_wildcards() {
        let rules = rules(&["**/*.log"]);
        assert!(!rules.is_ignored(Path::new("b.log")));
        assert!(rules.is_ignored(Path::new("x/b.log")));
        assert!(rules.is_ignored(Path::new("x/y/b.log")));
    }

    #[test]
    fn test_star_runs_are_accepted() {
        let rules = rules(&["a**b", "***.map"]);
        assert!(rules.is_ignored(Path::new("ab")));
        assert!(rules.is_ignored(Path::new("a/x/b")));
        assert!(rules.is_ignored(Path::new("js/app.js.map")));
        assert!(!rules.is_ignored(Path::new("ba")));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        let rules = IgnoreRules::parse("*.log\n# fine\n[oops\n").unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.is_ignored(Path::new("[oops")));
        assert!(!rules.is_ignored(Path::new("o")));
        assert!(!rules.is_ignored(Path::new("oops")));
    }

    #[test]
    fn test_set_edge_cases() {
        let rules = rules(&["[]x].a", "[a-].b", "[!]].c", "[&&].d", "[^x].e"]);
        assert!(rules.is_ignored(Path::new("].a")));
        assert!(rules.is_ignored(Path::new("x.a")));
        assert!(rules.is_ignored(Path::new("-.b")));
        assert!(rules.is_ignored(Path::new("a.b")));
        assert!(!rules.is_ignored(Path::new("].c")));
        assert!(rules.is_ignored(Path::new("q.c")));
        assert!(rules.is_ignored(Path::new("&.d")));
        assert!(rules.is_ignored(Path::new("^.e")));
        assert!(!rules.is_ignored(Path::new("y.e")));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let rules = rules(&["[z-a].txt", "[!z-a].css"]);
        assert!(!rules.is_ignored(Path::new("m.txt")));
        assert!(!rules.is_ignored(Path::new("z.txt")));
        assert!(rules.is_ignored(Path::new("m.css")));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let rules = rules(&["a+b(1).{js}", "$x|y"]);
        assert!(rules.is_ignored(Path::new("a+b(1).{js}")));
        assert!(!rules.is_ignored(Path::new("aab1.js")));
        assert!(rules.is_ignored(Path::new("$x|y")));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let rules = IgnoreRules::load(&temp.path().join(".crxignore")).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = default_ignore_file(temp.path());
        fs::write(&path, "*.log\ntmp/*\n").unwrap();
        let rules = IgnoreRules::load(&path).unwrap();
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_should_ignore_uses_relative_path() {
        let rules = rules(&["app/*"]);
        // The root itself contains "app"; only the relative part counts.
        let root = Path::new("/work/app");
        assert!(!should_ignore(Path::new("/work/app/main.js"), root, &rules).unwrap());
        assert!(should_ignore(Path::new("/work/app/app/main.js"), root, &rules).unwrap());
    }

    #[test]
    fn test_should_ignore_outside_root() {
        let rules = rules(&["*"]);
        let err = should_ignore(Path::new("/other/file"), Path::new("/work"), &rules).unwrap_err();
        assert!(matches!(err, PackageError::PathOutsideRoot { .. }));
    }
}
