//! Optionals that cost nothing for types with a built-in "none" state.
//!
//! `std::option::Option` already covers the generic tagged case. Types such
//! as [`SingleVec`](crate::SingleVec) or `PurchaseData` have an invalid
//! state (empty) that can stand in for absence, so [`Optional`] wraps them
//! without any extra flag: `size_of::<Optional<T>>() == size_of::<T>()`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A type with a sentinel value meaning "absent".
pub trait Noneable {
    /// The sentinel value.
    fn none() -> Self;

    fn is_none(&self) -> bool;

    fn make_none(&mut self)
    where
        Self: Sized,
    {
        *self = Self::none();
    }
}

/// Nullable wrapper storing absence inside `T` itself.
#[repr(transparent)]
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Optional<T: Noneable>(T);

impl<T: Noneable> Optional<T> {
    pub fn none() -> Self {
        Self(T::none())
    }

    /// Wrap `value`; a value already in its sentinel state stays absent.
    pub fn some(value: T) -> Self {
        Self(value)
    }

    pub fn is_some(&self) -> bool {
        !self.0.is_none()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn get(&self) -> Option<&T> {
        if self.is_some() { Some(&self.0) } else { None }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.is_some() {
            Some(&mut self.0)
        } else {
            None
        }
    }

    /// Replace the contents, returning a reference to the new value.
    pub fn emplace(&mut self, value: T) -> &mut T {
        self.0 = value;
        &mut self.0
    }

    pub fn reset(&mut self) {
        self.0.make_none();
    }

    pub fn take(&mut self) -> Option<T> {
        let taken = std::mem::replace(&mut self.0, T::none());
        if taken.is_none() { None } else { Some(taken) }
    }

    pub fn into_option(self) -> Option<T> {
        if self.is_some() { Some(self.0) } else { None }
    }

    pub fn map<U, F: FnOnce(&T) -> U>(&self, f: F) -> Option<U> {
        self.get().map(f)
    }

    /// Map into another sentinel-backed `Optional`. An empty result is
    /// absent too.
    pub fn map_optional<U: Noneable, F: FnOnce(&T) -> U>(&self, f: F) -> Optional<U> {
        self.map(f).into()
    }

    /// # Panics
    ///
    /// Unwrapping an absent `Optional` is a caller bug.
    pub fn unwrap(&self) -> &T {
        assert!(self.is_some(), "attempt to unwrap an empty Optional");
        &self.0
    }

    pub fn unwrap_or(self, default: T) -> T {
        if self.is_some() { self.0 } else { default }
    }

    /// Recover from absence with a caller-supplied error.
    pub fn unwrap_except<E>(&self, err: impl FnOnce() -> E) -> Result<&T, E> {
        self.get().ok_or_else(err)
    }

    /// Iterate the contained sequence; an absent value yields nothing.
    pub fn iter<'a>(&'a self) -> std::iter::Flatten<std::option::IntoIter<&'a T>>
    where
        &'a T: IntoIterator,
    {
        self.get().into_iter().flatten()
    }
}

impl<T: Noneable> Default for Optional<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: Noneable> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::none, Self::some)
    }
}

impl<T: Noneable> From<Optional<T>> for Option<T> {
    fn from(value: Optional<T>) -> Self {
        value.into_option()
    }
}

impl<T: Noneable + PartialEq> PartialEq<T> for Optional<T> {
    fn eq(&self, other: &T) -> bool {
        self.get() == Some(other)
    }
}

impl<'a, T: Noneable> IntoIterator for &'a Optional<T>
where
    &'a T: IntoIterator,
{
    type Item = <&'a T as IntoIterator>::Item;
    type IntoIter = std::iter::Flatten<std::option::IntoIter<&'a T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Noneable + fmt::Debug> fmt::Debug for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(v) => f.debug_tuple("Some").field(v).finish(),
            None => f.write_str("None"),
        }
    }
}

/// Absent values display as the empty string.
impl<T: Noneable + fmt::Display> fmt::Display for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(v) => v.fmt(f),
            None => Ok(()),
        }
    }
}

/// The empty string parses as absent.
impl<T: Noneable + FromStr> FromStr for Optional<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            Ok(Self::none())
        } else {
            s.parse().map(Self::some)
        }
    }
}

impl<T: Noneable + Serialize> Serialize for Optional<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.get() {
            Some(v) => serializer.serialize_some(v),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Noneable + Deserialize<'de>> Deserialize<'de> for Optional<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

impl<T> Noneable for Vec<T> {
    fn none() -> Self {
        Vec::new()
    }

    fn is_none(&self) -> bool {
        self.is_empty()
    }
}

impl Noneable for String {
    fn none() -> Self {
        String::new()
    }

    fn is_none(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_storage_has_no_overhead() {
        assert_eq!(
            std::mem::size_of::<Optional<Vec<u8>>>(),
            std::mem::size_of::<Vec<u8>>()
        );
        assert_eq!(
            std::mem::size_of::<Optional<String>>(),
            std::mem::size_of::<String>()
        );
    }

    #[test]
    fn emplace_reset_take() {
        let mut opt: Optional<Vec<i32>> = Optional::none();
        assert!(opt.is_none());
        opt.emplace(vec![1, 2]).push(3);
        assert_eq!(opt, vec![1, 2, 3]);
        assert_eq!(opt.map(|v| v.len()), Some(3));
        opt.reset();
        assert!(opt.is_none());
        assert_eq!(opt.map(|v| v.len()), None);
        assert_eq!(opt.take(), None);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let opt = Optional::some(String::new());
        assert!(opt.is_none());
        assert_eq!(opt.into_option(), None);
    }

    #[test]
    fn recovery_paths() {
        let none: Optional<String> = Optional::none();
        assert_eq!(none.unwrap_except(|| "missing"), Err("missing"));
        assert_eq!(none.unwrap_or("fallback".into()), "fallback");
    }

    #[test]
    #[should_panic(expected = "empty Optional")]
    fn unwrap_absent_panics() {
        let none: Optional<String> = Optional::none();
        let _ = none.unwrap();
    }

    #[test]
    fn iteration_passthrough() {
        let some = Optional::some(vec![1, 2, 3]);
        assert_eq!(some.iter().copied().sum::<i32>(), 6);
        let none: Optional<Vec<i32>> = Optional::none();
        assert_eq!((&none).into_iter().count(), 0);
    }

    #[test]
    fn json_null_round_trip() {
        let none: Optional<Vec<u8>> = serde_json::from_str("null").unwrap();
        assert!(none.is_none());
        assert_eq!(serde_json::to_string(&none).unwrap(), "null");
        let some: Optional<Vec<u8>> = serde_json::from_str("[4]").unwrap();
        assert_eq!(some, vec![4]);
    }

    #[test]
    fn map_optional_keeps_absence() {
        let some: Optional<String> = Optional::some("abc".to_string());
        assert_eq!(some.map_optional(|s| s.to_uppercase()), "ABC".to_string());
        assert_eq!(some.map_optional(|s| s.bytes().collect::<Vec<u8>>()), b"abc".to_vec());

        let none: Optional<String> = Optional::none();
        assert!(none.map_optional(|s| s.to_uppercase()).is_none());
        assert!(some.map_optional(|_| String::new()).is_none());
    }

    #[test]
    fn display_and_parse() {
        let none: Optional<String> = "".parse().unwrap();
        assert_eq!(none.to_string(), "");
        let some: Optional<String> = "abc".parse().unwrap();
        assert_eq!(some.to_string(), "abc");
    }
}
