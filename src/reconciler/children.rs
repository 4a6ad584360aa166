//! Ordered child list with move semantics.
//!
//! An item appears at most once. Appending or inserting an item that is
//! already present moves it. Inserting before a sibling that is not in the
//! list appends instead.

#[derive(Debug, Clone)]
pub struct ChildList<T> {
    items: Vec<T>,
}

impl<T> Default for ChildList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Clone + PartialEq> ChildList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|existing| existing == item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Move or add `item` to the end. Returns its new index.
    pub fn append(&mut self, item: T) -> usize {
        if let Some(index) = self.index_of(&item) {
            self.items.remove(index);
        }
        self.items.push(item);
        self.items.len() - 1
    }

    /// Move or add `item` directly before `before`. Returns its new index.
    pub fn insert_before(&mut self, item: T, before: &T) -> usize {
        if item == *before {
            return match self.index_of(&item) {
                Some(index) => index,
                None => self.append(item),
            };
        }
        let Some(mut target) = self.index_of(before) else {
            return self.append(item);
        };
        if let Some(current) = self.index_of(&item) {
            self.items.remove(current);
            if current < target {
                target -= 1;
            }
        }
        self.items.insert(target, item);
        target
    }

    /// Remove `item`. Returns the index it had.
    pub fn remove(&mut self, item: &T) -> Option<usize> {
        let index = self.index_of(item)?;
        self.items.remove(index);
        Some(index)
    }

    /// Remove everything, returning the items in their previous order.
    pub fn clear(&mut self) -> Vec<T> {
        std::mem::take(&mut self.items)
    }
}

impl<'a, T> IntoIterator for &'a ChildList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(items: &[u8]) -> ChildList<u8> {
        let mut list = ChildList::new();
        for item in items {
            list.append(*item);
        }
        list
    }

    #[test]
    fn test_append_moves_existing() {
        let mut l = list(&[1, 2, 3]);
        assert_eq!(l.append(1), 2);
        assert_eq!(l.as_slice(), &[2, 3, 1]);
    }

    #[test]
    fn test_insert_before_adjusts_for_earlier_item() {
        let mut l = list(&[1, 2, 3, 4]);
        assert_eq!(l.insert_before(1, &4), 2);
        assert_eq!(l.as_slice(), &[2, 3, 1, 4]);

        assert_eq!(l.insert_before(4, &2), 0);
        assert_eq!(l.as_slice(), &[4, 2, 3, 1]);
    }

    #[test]
    fn test_insert_before_missing_sibling_appends() {
        let mut l = list(&[1, 2]);
        assert_eq!(l.insert_before(7, &9), 2);
        assert_eq!(l.as_slice(), &[1, 2, 7]);
    }

    #[test]
    fn test_insert_before_self_is_noop() {
        let mut l = list(&[1, 2, 3]);
        assert_eq!(l.insert_before(2, &2), 1);
        assert_eq!(l.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut l = list(&[1, 2, 3]);
        assert_eq!(l.remove(&2), Some(1));
        assert_eq!(l.remove(&2), None);
        assert_eq!(l.clear(), vec![1, 3]);
        assert!(l.is_empty());
    }

    // =========================================================================
    // Oracle
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Append(u8),
        InsertBefore(u8, u8),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Append),
            (0u8..8, 0u8..8).prop_map(|(a, b)| Op::InsertBefore(a, b)),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    /// Plain list model of the same operations.
    fn oracle(model: &mut Vec<u8>, op: &Op) {
        match *op {
            Op::Append(x) => {
                model.retain(|y| *y != x);
                model.push(x);
            }
            Op::InsertBefore(x, before) => {
                if x == before {
                    if !model.contains(&x) {
                        model.push(x);
                    }
                    return;
                }
                if !model.contains(&before) {
                    model.retain(|y| *y != x);
                    model.push(x);
                    return;
                }
                model.retain(|y| *y != x);
                let at = model.iter().position(|y| *y == before).unwrap_or(model.len());
                model.insert(at, x);
            }
            Op::Remove(x) => model.retain(|y| *y != x),
        }
    }

    proptest! {
        #[test]
        fn test_order_matches_list_model(ops in prop::collection::vec(op(), 0..64)) {
            let mut children = ChildList::new();
            let mut model = Vec::new();
            for op in &ops {
                match *op {
                    Op::Append(x) => { children.append(x); }
                    Op::InsertBefore(x, before) => { children.insert_before(x, &before); }
                    Op::Remove(x) => { children.remove(&x); }
                }
                oracle(&mut model, op);
                prop_assert_eq!(children.as_slice(), model.as_slice());
            }
        }
    }
}
