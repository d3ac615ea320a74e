use crate::restore_graph::domain::ItemView;
use std::collections::HashSet;

/// ItemDeduplicator service for collapsing MSBuild item lists
///
/// Items are duplicates when their identities match ignoring case. The first
/// occurrence wins and keeps its metadata; later duplicates are dropped
/// silently.
pub struct ItemDeduplicator;

impl ItemDeduplicator {
    /// Returns the first occurrence of each identity, in declaration order
    ///
    /// # Arguments
    /// * `items` - Items of one type, as returned by a project view
    ///
    /// # Returns
    /// References to the distinct items
    pub fn distinct(items: &[ItemView]) -> Vec<&ItemView> {
        Self::distinct_iter(items.iter())
    }

    /// Same as [`distinct`](Self::distinct) over an already filtered sequence
    pub fn distinct_iter<'a, I>(items: I) -> Vec<&'a ItemView>
    where
        I: IntoIterator<Item = &'a ItemView>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        items
            .into_iter()
            .filter(|item| seen.insert(item.identity().to_lowercase()))
            .collect()
    }
}
