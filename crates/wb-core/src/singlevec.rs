use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::optional::Noneable;

/// A vector that must hold at least one element.
///
/// The empty state is not a valid `SingleVec`; it is reserved as the
/// [`Noneable`] sentinel so an `Optional<SingleVec<T>>` is free.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SingleVec<T> {
    elems: Vec<T>,
}

impl<T> SingleVec<T> {
    pub fn new(first: T) -> Self {
        Self { elems: vec![first] }
    }

    /// `None` when `elems` is empty.
    pub fn from_vec(elems: Vec<T>) -> Option<Self> {
        if elems.is_empty() {
            None
        } else {
            Some(Self { elems })
        }
    }

    pub fn push(&mut self, elem: T) {
        self.elems.push(elem);
    }

    /// Remove the last element, never the first.
    pub fn pop(&mut self) -> Option<T> {
        if self.elems.len() > 1 {
            self.elems.pop()
        } else {
            None
        }
    }

    pub fn first(&self) -> &T {
        &self.elems[0]
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    /// Only true for the sentinel state.
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elems
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elems.iter()
    }
}

impl<T> std::ops::Index<usize> for SingleVec<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.elems[idx]
    }
}

impl<'a, T> IntoIterator for &'a SingleVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elems.iter()
    }
}

impl<T> Noneable for SingleVec<T> {
    fn none() -> Self {
        Self { elems: Vec::new() }
    }

    fn is_none(&self) -> bool {
        self.elems.is_empty()
    }
}

impl<T: Serialize> Serialize for SingleVec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.elems.serialize(serializer)
    }
}

/// An empty JSON array deserializes to the sentinel (absent) state.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for SingleVec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|elems| Self { elems })
    }
}
