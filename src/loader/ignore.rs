//! A gitignore subset compiled to regexes.

use crate::log_info;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_GLOBAL_IGNORE: &str = "\
# vilark global ignores, applied in every directory (.gitignore syntax)
.git

# macOS
Library/

# Wildcards are slower; enable as needed
#*.swp
#*.pyc
";

struct Rule {
    /// Absolute directory the rule is relative to, ending in `/`.
    base: String,
    regex: Regex,
    negated: bool,
    dir_only: bool,
    anchored: bool,
}

impl Rule {
    fn parse(line: &str, base: &str) -> Option<Rule> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };
        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let anchored = body.contains('/');
        let body = body.strip_prefix('/').unwrap_or(body);
        if body.is_empty() {
            return None;
        }
        let regex = match Regex::new(&glob_to_regex(body)) {
            Ok(regex) => regex,
            Err(err) => {
                log_info(&format!("skipping ignore rule {line:?}: {err}"));
                return None;
            }
        };
        Some(Rule {
            base: base.to_string(),
            regex,
            negated,
            dir_only,
            anchored,
        })
    }

    fn matches(&self, abs_path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        let Some(sub) = abs_path.strip_prefix(self.base.as_str()) else {
            return false;
        };
        let sub = sub.trim_end_matches('/');
        if sub.is_empty() {
            return false;
        }
        if self.anchored {
            self.regex.is_match(sub)
        } else {
            let name = sub.rsplit('/').next().unwrap_or(sub);
            self.regex.is_match(name)
        }
    }
}

/// Rules for one directory: its parent's rules plus its own `.gitignore`.
#[derive(Default)]
pub struct IgnoreRules {
    parent: Option<Arc<IgnoreRules>>,
    rules: Vec<Rule>,
}

impl IgnoreRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `text` with every rule relative to `base` (absolute, ending in `/`).
    pub fn parse(text: &str, base: &str) -> Self {
        Self {
            parent: None,
            rules: text.lines().filter_map(|line| Rule::parse(line, base)).collect(),
        }
    }

    /// Layer `text` on top of `parent`.
    pub fn child(parent: &Arc<IgnoreRules>, text: &str, base: &str) -> Self {
        let mut rules = Self::parse(text, base);
        rules.parent = Some(Arc::clone(parent));
        rules
    }

    /// Global rules: the user's file, created with defaults when missing.
    pub fn global(path: Option<&Path>, root: &str) -> Self {
        let Some(path) = path else {
            log_info("global ignores disabled");
            return Self::empty();
        };
        match fs::read_to_string(path) {
            Ok(text) => {
                log_info(&format!("global ignore rules from {}", path.display()));
                Self::parse(&text, root)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if let Err(err) = write_default(path) {
                    log_info(&format!("could not create {}: {err}", path.display()));
                }
                Self::parse(DEFAULT_GLOBAL_IGNORE, root)
            }
            Err(err) => {
                log_info(&format!("could not read {}: {err}", path.display()));
                Self::parse(DEFAULT_GLOBAL_IGNORE, root)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len() + self.parent.as_ref().map_or(0, |parent| parent.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last matching rule wins, outermost rules first.
    pub fn is_ignored(&self, abs_path: &str, is_dir: bool) -> bool {
        let mut ignored = match &self.parent {
            Some(parent) => parent.is_ignored(abs_path, is_dir),
            None => false,
        };
        for rule in &self.rules {
            if rule.matches(abs_path, is_dir) {
                ignored = !rule.negated;
            }
        }
        ignored
    }
}

fn write_default(path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, DEFAULT_GLOBAL_IGNORE)
}

fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                let at_segment_start = i == 0 || chars[i - 1] == '/';
                if at_segment_start && chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '\\' if i + 1 < chars.len() => {
                out.push_str(&regex::escape(&chars[i + 1].to_string()));
                i += 2;
                continue;
            }
            '[' => {
                if let Some(close) = class_end(&chars, i) {
                    out.push_str(&class_to_regex(&chars[i + 1..close]));
                    i = close + 1;
                    continue;
                }
                out.push_str("\\[");
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `open`.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    if matches!(chars.get(i), Some('!') | Some('^')) {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    while i < chars.len() {
        if chars[i] == ']' {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn class_to_regex(body: &[char]) -> String {
    let mut out = String::from("[");
    let mut rest = body;
    if let Some((first, tail)) = rest.split_first() {
        if *first == '!' || *first == '^' {
            out.push('^');
            rest = tail;
        }
    }
    for &c in rest {
        if matches!(c, '\\' | '[' | ']' | '&' | '~' | '^') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
    out
}
