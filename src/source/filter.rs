//! Name-based exclusion policy for directory walks.

/// File names skipped by default: version control, dependency and build
/// output directories, editor and OS droppings, local secrets.
const DEFAULT_NAMES: &[&str] = &[
    ".git",
    ".cache",
    ".env",
    ".DS_Store",
    "Thumbs.db",
    "node_modules",
    "dist",
    "replit.nix",
    "cookies.txt",
    "auth_cookies.txt",
    "fresh_cookies.txt",
];

/// Suffixes of files skipped by default. Archives are never packed into
/// archives.
const DEFAULT_SUFFIXES: &[&str] = &[".zip", ".tar.gz"];

/// Decides which walked paths become archive entries.
///
/// Paths are forward-slash separated and relative to the walk root, e.g.
/// `client/src/app.js`. A directory that is not included is not descended
/// into.
///
/// ## Example
///
/// ```
/// use storezip::source::ExclusionPolicy;
///
/// let policy = ExclusionPolicy::default().exclude("*.log");
/// assert!(policy.should_include("src/main.rs"));
/// assert!(!policy.should_include("node_modules"));
/// assert!(!policy.should_include("src/.hidden"));
/// assert!(!policy.should_include("logs/today.log"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    skip_hidden: bool,
    names: Vec<String>,
    suffixes: Vec<String>,
    patterns: Vec<String>,
}

impl Default for ExclusionPolicy {
    /// Policy with the built-in skip list.
    fn default() -> Self {
        Self {
            skip_hidden: true,
            names: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            patterns: Vec::new(),
        }
    }
}

impl ExclusionPolicy {
    /// Policy that excludes nothing.
    pub fn new() -> Self {
        Self {
            skip_hidden: false,
            names: Vec::new(),
            suffixes: Vec::new(),
            patterns: Vec::new(),
        }
    }

    /// Add a user pattern.
    ///
    /// Patterns containing `*` or `?` are globs matched against the whole
    /// relative path and against the file name. Other patterns match an
    /// exact path component or any substring of the path.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.patterns.push(pattern);
        }
        self
    }

    /// Returns `true` if `path` should be archived (or, for a directory,
    /// walked).
    pub fn should_include(&self, path: &str) -> bool {
        let path = path.trim_matches('/');
        let name = path.rsplit('/').next().unwrap_or(path);

        if name.is_empty() {
            return false;
        }
        if self.skip_hidden && name.starts_with('.') {
            return false;
        }
        if self.names.iter().any(|n| n == name) {
            return false;
        }
        if self.suffixes.iter().any(|s| name.ends_with(s.as_str())) {
            return false;
        }

        !self.patterns.iter().any(|pattern| {
            if has_glob_chars(pattern) {
                glob_match(pattern, path) || glob_match(pattern, name)
            } else {
                path.split('/').any(|c| c == pattern) || path.contains(pattern.as_str())
            }
        })
    }
}

/// Check if a pattern contains glob wildcard characters.
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            // Star matches zero characters, or one and stays for more
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_policy_includes_everything() {
        let policy = ExclusionPolicy::new();
        for path in [".git", "node_modules", "a.zip", "dir/.env", "x"] {
            assert!(policy.should_include(path), "{path}");
        }
    }

    #[test]
    fn defaults_skip_hidden_and_build_output() {
        let policy = ExclusionPolicy::default();
        for path in [
            ".git",
            "src/.DS_Store",
            ".replit",
            "node_modules",
            "client/node_modules",
            "dist",
            "Thumbs.db",
            ".config",
            "replit.nix",
            "cookies.txt",
            "server/auth_cookies.txt",
            "fresh_cookies.txt",
        ] {
            assert!(!policy.should_include(path), "{path}");
        }
    }

    #[test]
    fn defaults_skip_archives() {
        let policy = ExclusionPolicy::default();
        assert!(!policy.should_include("release.zip"));
        assert!(!policy.should_include("out/backup.tar.gz"));
        assert!(policy.should_include("zipper.rs"));
        assert!(policy.should_include("data.tar"));
    }

    #[test]
    fn defaults_keep_ordinary_files() {
        let policy = ExclusionPolicy::default();
        for path in ["README.md", "src/main.rs", "client/dist.js", "a/b/c.txt"] {
            assert!(policy.should_include(path), "{path}");
        }
    }

    #[test]
    fn glob_patterns() {
        let policy = ExclusionPolicy::new().exclude("*.log").exclude("tmp/?.txt");
        assert!(!policy.should_include("debug.log"));
        assert!(!policy.should_include("deep/dir/debug.log"));
        assert!(!policy.should_include("tmp/a.txt"));
        assert!(policy.should_include("tmp/ab.txt"));
        assert!(policy.should_include("log.txt"));
    }

    #[test]
    fn literal_patterns_match_components_and_substrings() {
        let policy = ExclusionPolicy::new().exclude("secret").exclude("deployment");
        assert!(!policy.should_include("secret"));
        assert!(!policy.should_include("config/secret/key.pem"));
        assert!(!policy.should_include("kinsta-deployment/index.html"));
        assert!(policy.should_include("public/index.html"));
    }

    #[test]
    fn empty_pattern_is_ignored() {
        let policy = ExclusionPolicy::new().exclude("");
        assert!(policy.should_include("anything"));
    }

    #[test]
    fn glob_match_basics() {
        assert!(glob_match("*.txt", "readme.txt"));
        assert!(glob_match("file?.dat", "file1.dat"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("*.txt", "readme.md"));
        assert!(!glob_match("?", ""));
    }
}
