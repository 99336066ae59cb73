//! Smart-case word filter over item search strings.

use crate::config::FuzzySearchMode;
use crate::loader::Item;

struct QueryWord {
    chars: Vec<char>,
    case_sensitive: bool,
}

/// A parsed query; cheap to reuse across many lines.
pub struct FuzzyQuery {
    words: Vec<QueryWord>,
    mode: FuzzySearchMode,
}

impl FuzzyQuery {
    pub fn new(query: &str, mode: FuzzySearchMode) -> Self {
        let words = query
            .split_whitespace()
            .map(|word| {
                let case_sensitive = word.chars().any(char::is_uppercase);
                let chars = if case_sensitive {
                    word.chars().collect()
                } else {
                    word.chars().map(fold).collect()
                };
                QueryWord {
                    chars,
                    case_sensitive,
                }
            })
            .collect();
        Self { words, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn matches(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        if self.words.is_empty() {
            return true;
        }
        let exact: Vec<char> = line.chars().collect();
        let folded: Vec<char> = exact.iter().copied().map(fold).collect();
        let mut start = 0;
        for word in &self.words {
            let haystack = if word.case_sensitive { &exact } else { &folded };
            let Some(pos) = find_from(haystack, &word.chars, start) else {
                return false;
            };
            if self.mode == FuzzySearchMode::WordOrdered {
                start = pos + word.chars.len();
            }
        }
        true
    }
}

/// Indices of the items matching `query`, in their original order.
pub fn filter(items: &[Item], query: &str, mode: FuzzySearchMode) -> Vec<usize> {
    let query = FuzzyQuery::new(query, mode);
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| query.matches(item.search_text()))
        .map(|(index, _)| index)
        .collect()
}

/// One-to-one lowercase so positions line up between the two haystacks.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find_from(haystack: &[char], needle: &[char], start: usize) -> Option<usize> {
    if start > haystack.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(start);
    }
    haystack[start..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordered(query: &str, line: &str) -> bool {
        FuzzyQuery::new(query, FuzzySearchMode::WordOrdered).matches(line)
    }

    fn unordered(query: &str, line: &str) -> bool {
        FuzzyQuery::new(query, FuzzySearchMode::WordUnordered).matches(line)
    }

    #[test]
    fn empty_query_matches_everything_but_empty_lines() {
        assert!(ordered("", "src/main.rs"));
        assert!(ordered("   ", "src/main.rs"));
        assert!(!ordered("", ""));
        assert!(!ordered("main", ""));
    }

    #[test]
    fn lowercase_words_ignore_case() {
        assert!(ordered("readme", "docs/README.md"));
        assert!(ordered("ÉTÉ", "ÉTÉ.txt"));
        assert!(ordered("été", "Été.txt"));
    }

    #[test]
    fn uppercase_words_are_case_sensitive() {
        assert!(!ordered("Readme", "docs/README.md"));
        assert!(ordered("README", "docs/README.md"));
    }

    #[test]
    fn ordered_mode_requires_word_order() {
        assert!(ordered("src main", "src/main.rs"));
        assert!(!ordered("main src", "src/main.rs"));
        assert!(!ordered("ab ab", "xab"));
        assert!(ordered("ab ab", "abab"));
    }

    #[test]
    fn unordered_mode_accepts_any_order() {
        assert!(unordered("main src", "src/main.rs"));
        assert!(!unordered("main lib", "src/main.rs"));
    }

    #[test]
    fn filter_keeps_item_order() {
        let items: Vec<Item> = ["a/one.rs", "b/two.rs", "c/one.txt"]
            .into_iter()
            .map(|line| Item::external(line, false))
            .collect();
        assert_eq!(filter(&items, "one", FuzzySearchMode::WordOrdered), vec![0, 2]);
        assert_eq!(filter(&items, "", FuzzySearchMode::WordOrdered), vec![0, 1, 2]);
        assert!(filter(&items, "zzz", FuzzySearchMode::WordOrdered).is_empty());
    }
}
