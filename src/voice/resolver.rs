//! Fuzzy title resolution: exact, then substring, then token overlap.

use crate::models::Titled;

/// Which tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Substring,
    Token,
}

/// Index and tier of the first candidate matching `fragment`.
///
/// Tiers are tried in order and the earliest candidate within a tier wins.
/// A blank fragment matches nothing.
pub fn resolve_with_tier<T: Titled>(items: &[T], fragment: &str) -> Option<(usize, MatchTier)> {
    let query = fragment.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let titles: Vec<String> = items.iter().map(|i| i.title().to_lowercase()).collect();

    if let Some(i) = titles.iter().position(|t| *t == query) {
        return Some((i, MatchTier::Exact));
    }
    if let Some(i) = titles.iter().position(|t| t.contains(&query)) {
        return Some((i, MatchTier::Substring));
    }
    let query_words: Vec<&str> = query.split_whitespace().collect();
    titles
        .iter()
        .position(|t| {
            t.split_whitespace()
                .any(|tw| query_words.iter().any(|qw| tw.contains(qw) || qw.contains(tw)))
        })
        .map(|i| (i, MatchTier::Token))
}

pub fn resolve_index<T: Titled>(items: &[T], fragment: &str) -> Option<usize> {
    resolve_with_tier(items, fragment).map(|(i, _)| i)
}

pub fn resolve<'a, T: Titled>(items: &'a [T], fragment: &str) -> Option<&'a T> {
    resolve_index(items, fragment).map(|i| &items[i])
}

/// Resolves a typed reference: exact id, then a unique id prefix, then title.
pub fn resolve_ref<T: Titled>(items: &[T], reference: &str) -> Option<usize> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if let Some(i) = items.iter().position(|t| t.id() == reference) {
        return Some(i);
    }
    let prefixed: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, t)| t.id().starts_with(reference))
        .map(|(i, _)| i)
        .collect();
    if let [only] = prefixed.as_slice() {
        return Some(*only);
    }
    resolve_index(items, reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str, &'static str);

    impl Titled for Item {
        fn id(&self) -> &str {
            self.0
        }

        fn title(&self) -> &str {
            self.1
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item("a1", "Morning workout routine"),
            Item("b2", "Workout"),
            Item("c3", "Read a book"),
        ]
    }

    #[test]
    fn exact_beats_earlier_substring() {
        assert_eq!(resolve_with_tier(&items(), "workout"), Some((1, MatchTier::Exact)));
    }

    #[test]
    fn substring_then_token_tiers() {
        assert_eq!(resolve_with_tier(&items(), "a bo"), Some((2, MatchTier::Substring)));
        assert_eq!(resolve_with_tier(&items(), "books"), Some((2, MatchTier::Token)));
        assert_eq!(resolve_with_tier(&items(), "morn"), Some((0, MatchTier::Substring)));
    }

    #[test]
    fn misses_and_blank_fragments() {
        assert_eq!(resolve_index(&items(), "gym"), None);
        assert_eq!(resolve_index(&items(), "   "), None);
    }

    #[test]
    fn resolution_is_stable() {
        let items = items();
        let first = resolve(&items, "routine").map(|i| i.0);
        assert_eq!(first, Some("a1"));
        assert_eq!(resolve(&items, "routine").map(|i| i.0), first);
    }

    #[test]
    fn references_prefer_ids() {
        assert_eq!(resolve_ref(&items(), "c3"), Some(2));
        assert_eq!(resolve_ref(&items(), "b"), Some(1));
        assert_eq!(resolve_ref(&items(), "read"), Some(2));
    }
}
