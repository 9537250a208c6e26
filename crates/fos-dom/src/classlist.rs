//! Class lists
//!
//! The parsed form of an element's `class` attribute: an ordered set of
//! whitespace-separated tokens. The attribute string is rewritten from it
//! after every change.

use std::fmt;

/// Split on ASCII/Unicode whitespace, keeping the first occurrence of each token
pub fn split_tokens(s: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for token in s.split_whitespace() {
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Ordered, duplicate-free class tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList {
    tokens: Vec<String>,
}

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `class` attribute value
    pub fn parse(attribute: &str) -> Self {
        Self {
            tokens: split_tokens(attribute).into_iter().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// True when every token is present (vacuously true for none)
    pub fn contains_all(&self, tokens: &[&str]) -> bool {
        tokens.iter().all(|&t| self.contains(t))
    }

    /// Append missing tokens. Returns how many were added.
    pub fn add(&mut self, tokens: &[&str]) -> usize {
        let before = self.tokens.len();
        for &token in tokens {
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push(token.to_owned());
            }
        }
        self.tokens.len() - before
    }

    /// Drop every listed token. Returns how many were removed.
    pub fn remove(&mut self, tokens: &[&str]) -> usize {
        let before = self.tokens.len();
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
        before - self.tokens.len()
    }

    /// Flip one token; the result is whether it is now present
    pub fn toggle(&mut self, token: &str) -> bool {
        if self.remove(&[token]) > 0 {
            return false;
        }
        self.add(&[token]) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let list = ClassList::parse("  nav\tnav-item  nav\n");
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1), Some("nav-item"));
        assert_eq!(list.to_string(), "nav nav-item");
        assert!(ClassList::parse(" ").is_empty());
    }

    #[test]
    fn test_add_and_remove_report_changes() {
        let mut list = ClassList::parse("card");
        assert_eq!(list.add(&["card", "wide", ""]), 1);
        assert_eq!(list.to_string(), "card wide");

        assert_eq!(list.remove(&["tall"]), 0);
        assert_eq!(list.remove(&["card", "wide"]), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut list = ClassList::parse("open");
        assert!(!list.toggle("open"));
        assert!(list.toggle("open"));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["open"]);
    }

    #[test]
    fn test_contains_all() {
        let list = ClassList::parse("card wide");
        assert!(list.contains_all(&["wide", "card"]));
        assert!(!list.contains_all(&["card", "tall"]));
        assert!(list.contains_all(&[]));
    }

    #[test]
    fn test_split_tokens() {
        assert_eq!(split_tokens("x  y x"), vec!["x", "y"]);
        assert!(split_tokens("   ").is_empty());
    }
}
