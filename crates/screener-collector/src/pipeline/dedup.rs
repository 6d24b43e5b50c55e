//! 먼저 도착한 결과를 유지하는 중복 제거.

use std::collections::HashSet;
use std::hash::Hash;

/// 키별로 처음 본 항목만 통과시킵니다. 나중에 온 같은 키는 병합하지 않고 버립니다.
#[derive(Debug)]
pub struct FirstSeen<K> {
    seen: HashSet<K>,
    duplicates: usize,
}

impl<K: Hash + Eq> Default for FirstSeen<K> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            duplicates: 0,
        }
    }
}

impl<K: Hash + Eq> FirstSeen<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 처음 보는 키이면 `true`.
    pub fn insert(&mut self, key: K) -> bool {
        let fresh = self.seen.insert(key);
        if !fresh {
            self.duplicates += 1;
        }
        fresh
    }

    /// 지금까지 버린 중복 수
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// 순서를 유지하며 키별 첫 항목만 남깁니다. 버린 중복 수를 함께 반환합니다.
pub fn collect_first_seen<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> (Vec<T>, usize)
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut filter = FirstSeen::new();
    let kept = items
        .into_iter()
        .filter(|item| filter.insert(key(item)))
        .collect();
    (kept, filter.duplicates())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_wins() {
        let outputs = vec![("CF", "first"), ("AGU", "only"), ("CF", "second")];
        let (kept, duplicates) = collect_first_seen(outputs, |(key, _)| *key);

        assert_eq!(kept, vec![("CF", "first"), ("AGU", "only")]);
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn test_filter_counts() {
        let mut filter = FirstSeen::new();
        assert!(filter.is_empty());
        assert!(filter.insert(112u32));
        assert!(!filter.insert(112));
        assert!(filter.insert(130));

        assert_eq!(filter.len(), 2);
        assert_eq!(filter.duplicates(), 1);
    }
}
