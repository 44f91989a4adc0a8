//! Comparators applied to materialised query results.

use std::cmp::Ordering;
use std::fmt;

type Compare<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Ordering of query results.
///
/// Applied with a stable sort, so entities comparing equal keep the order
/// in which the store returned them.
///
/// # Examples
///
/// ```
/// use indexbox::Sort;
///
/// struct Person { firstname: &'static str, age: u32 }
///
/// let sort = Sort::by_key(|p: &Person| p.age)
///     .reverse()
///     .then(Sort::by_key(|p: &Person| p.firstname));
///
/// let mut people = vec![
///     Person { firstname: "rand", age: 20 },
///     Person { firstname: "egwene", age: 20 },
///     Person { firstname: "tam", age: 48 },
/// ];
/// sort.apply(&mut people);
///
/// let names: Vec<_> = people.iter().map(|p| p.firstname).collect();
/// assert_eq!(names, ["tam", "egwene", "rand"]);
/// ```
pub struct Sort<T> {
    compare: Compare<T>,
}

impl<T: 'static> Sort<T> {
    /// Orders with a comparator.
    pub fn by<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Box::new(compare),
        }
    }

    /// Orders by a key extracted from every entity, ascending.
    pub fn by_key<K, F>(key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Inverts the ordering.
    #[must_use]
    pub fn reverse(self) -> Self {
        let compare = self.compare;
        Self::by(move |a, b| compare(b, a))
    }

    /// Breaks ties with `next`.
    #[must_use]
    pub fn then(self, next: Sort<T>) -> Self {
        let first = self.compare;
        let next = next.compare;
        Self::by(move |a, b| first(a, b).then_with(|| next(a, b)))
    }
}

impl<T> Sort<T> {
    /// Compares two entities.
    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    /// Sorts `items` in place, stable.
    pub fn apply(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T> fmt::Debug for Sort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sort").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        key: u32,
        label: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { key: 2, label: "a" },
            Item { key: 1, label: "b" },
            Item { key: 2, label: "c" },
            Item { key: 1, label: "d" },
        ]
    }

    fn labels(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|item| item.label).collect()
    }

    #[test]
    fn test_sort_is_stable() {
        let mut items = items();
        Sort::by_key(|item: &Item| item.key).apply(&mut items);
        assert_eq!(labels(&items), ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_reverse_keeps_ties_in_place() {
        let mut items = items();
        Sort::by_key(|item: &Item| item.key).reverse().apply(&mut items);
        assert_eq!(labels(&items), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_then_breaks_ties() {
        let mut items = items();
        Sort::by_key(|item: &Item| item.key)
            .then(Sort::by_key(|item: &Item| item.label).reverse())
            .apply(&mut items);
        assert_eq!(labels(&items), ["d", "b", "c", "a"]);
    }
}
