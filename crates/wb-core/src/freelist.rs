//! Vector-backed storage whose indices survive removals.
//!
//! Freed slots form an intrusive singly-linked list threaded through the
//! vector; the most recently freed slot is reused first.

use crate::error::FreeListError;

pub type FreeIdx = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<T> {
    Occupied(T),
    Free { next: Option<FreeIdx> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeList<T> {
    slots: Vec<Slot<T>>,
    free: Option<FreeIdx>,
}

impl<T> Default for FreeList<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
        }
    }
}

impl<T> FreeList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, reusing the most recently freed slot if there is one.
    pub fn emplace(&mut self, value: T) -> FreeIdx {
        match self.free {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                self.free = match slot {
                    Slot::Free { next } => *next,
                    Slot::Occupied(_) => unreachable!("free list head points at an occupied slot"),
                };
                *slot = Slot::Occupied(value);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(value));
                (self.slots.len() - 1) as FreeIdx
            }
        }
    }

    /// Free the slot at `idx`, returning its value.
    pub fn erase(&mut self, idx: FreeIdx) -> Result<T, FreeListError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(idx as usize)
            .ok_or(FreeListError::OutOfBounds { index: idx, len })?;
        if matches!(slot, Slot::Free { .. }) {
            return Err(FreeListError::EraseTwice { index: idx });
        }
        let old = std::mem::replace(slot, Slot::Free { next: self.free });
        self.free = Some(idx);
        match old {
            Slot::Occupied(value) => Ok(value),
            Slot::Free { .. } => unreachable!(),
        }
    }

    /// `None` for free or out-of-range slots.
    pub fn get(&self, idx: FreeIdx) -> Option<&T> {
        match self.slots.get(idx as usize)? {
            Slot::Occupied(v) => Some(v),
            Slot::Free { .. } => None,
        }
    }

    pub fn get_mut(&mut self, idx: FreeIdx) -> Option<&mut T> {
        match self.slots.get_mut(idx as usize)? {
            Slot::Occupied(v) => Some(v),
            Slot::Free { .. } => None,
        }
    }

    pub fn contains(&self, idx: FreeIdx) -> bool {
        self.get(idx).is_some()
    }

    /// Number of freed slots waiting for reuse.
    pub fn free_slots(&self) -> usize {
        let mut count = 0;
        let mut next = self.free;
        while let Some(idx) = next {
            count += 1;
            next = match &self.slots[idx as usize] {
                Slot::Free { next } => *next,
                Slot::Occupied(_) => None,
            };
        }
        count
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_slots()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupied slots with their indices, skipping free ones.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots.iter().enumerate(),
        }
    }
}

/// Indexing a free slot is a caller bug and panics.
impl<T> std::ops::Index<FreeIdx> for FreeList<T> {
    type Output = T;

    fn index(&self, idx: FreeIdx) -> &T {
        match self.get(idx) {
            Some(v) => v,
            None => panic!("FreeList slot {idx} is not occupied"),
        }
    }
}

impl<T> std::ops::IndexMut<FreeIdx> for FreeList<T> {
    fn index_mut(&mut self, idx: FreeIdx) -> &mut T {
        match self.get_mut(idx) {
            Some(v) => v,
            None => panic!("FreeList slot {idx} is not occupied"),
        }
    }
}

pub struct Iter<'a, T> {
    inner: std::iter::Enumerate<std::slice::Iter<'a, Slot<T>>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (FreeIdx, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(|(idx, slot)| match slot {
            Slot::Occupied(v) => Some((idx as FreeIdx, v)),
            Slot::Free { .. } => None,
        })
    }
}

impl<'a, T> IntoIterator for &'a FreeList<T> {
    type Item = (FreeIdx, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> FromIterator<T> for FreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = FreeList::new();
        for v in iter {
            list.emplace(v);
        }
        list
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn surviving_indices_keep_their_values(
            values in prop::collection::vec(any::<u16>(), 1..32),
            removals in prop::collection::vec(any::<prop::sample::Index>(), 0..16),
        ) {
            let mut list = FreeList::new();
            let idxs: Vec<FreeIdx> = values.iter().map(|v| list.emplace(*v)).collect();
            let mut removed = std::collections::HashSet::new();
            for r in removals {
                let i = r.index(idxs.len());
                if removed.insert(i) {
                    prop_assert!(list.erase(idxs[i]).is_ok());
                }
            }
            for (i, idx) in idxs.iter().enumerate() {
                if removed.contains(&i) {
                    prop_assert!(list.get(*idx).is_none());
                } else {
                    prop_assert_eq!(list.get(*idx), Some(&values[i]));
                }
            }
            prop_assert_eq!(list.len(), values.len() - removed.len());
        }
    }
}
