use std::collections::BTreeMap;

use super::Task;

/// Every tag in use with the number of tasks carrying it, sorted by tag.
pub fn tag_counts(tasks: &[Task]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for tag in tasks.iter().flat_map(|t| t.tags.iter()) {
        *counts.entry(tag.clone()).or_insert(0) += 1;
    }
    counts
}

/// Replaces every tag in `sources` with `target` (lowercased).
///
/// The target is appended once per task that carried any source tag. Returns
/// how many tasks changed.
pub fn merge_tags(tasks: &mut [Task], sources: &[String], target: &str) -> usize {
    let target = target.trim().to_lowercase();
    let mut changed = 0;
    for task in tasks.iter_mut() {
        if !task.tags.iter().any(|t| sources.contains(t)) {
            continue;
        }
        task.tags.retain(|t| !sources.contains(t));
        if !task.tags.contains(&target) {
            task.tags.push(target.clone());
        }
        changed += 1;
    }
    changed
}

/// Removes `tags` from every task. Returns how many tasks changed.
pub fn delete_tags(tasks: &mut [Task], tags: &[String]) -> usize {
    let mut changed = 0;
    for task in tasks.iter_mut() {
        let before = task.tags.len();
        task.tags.retain(|t| !tags.contains(t));
        if task.tags.len() != before {
            changed += 1;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn tagged(title: &str, tags: &[&str]) -> Task {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mut task = Task::new(title, NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(), now);
        task.tags = tags.iter().map(|t| t.to_string()).collect();
        task
    }

    fn owned(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn counts_are_sorted_by_tag() {
        let tasks = vec![tagged("a", &["work", "q4"]), tagged("b", &["q4"]), tagged("c", &[])];
        let counts: Vec<(String, usize)> = tag_counts(&tasks).into_iter().collect();
        assert_eq!(counts, vec![("q4".to_string(), 2), ("work".to_string(), 1)]);
    }

    #[test]
    fn merge_adds_target_once() {
        let mut tasks = vec![
            tagged("a", &["Work", "office", "q4"]),
            tagged("b", &["home"]),
            tagged("c", &["office", "work"]),
        ];
        let changed = merge_tags(&mut tasks, &owned(&["Work", "office"]), " Work ");
        assert_eq!(changed, 2);
        assert_eq!(tasks[0].tags, owned(&["q4", "work"]));
        assert_eq!(tasks[1].tags, owned(&["home"]));
        assert_eq!(tasks[2].tags, owned(&["work"]));
    }

    #[test]
    fn delete_strips_from_every_task() {
        let mut tasks = vec![tagged("a", &["old", "keep"]), tagged("b", &["keep"])];
        assert_eq!(delete_tags(&mut tasks, &owned(&["old", "missing"])), 1);
        assert_eq!(tag_counts(&tasks).get("keep"), Some(&2));
        assert!(tag_counts(&tasks).get("old").is_none());
    }
}
