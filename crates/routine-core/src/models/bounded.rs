// ABOUTME: Ordered list type with a compile-time capacity enforced on construction and push
// ABOUTME: Backs routine slot lists and performed-set lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

use crate::errors::{AppError, AppResult};

/// Ordered list holding at most `N` elements
///
/// Capacity is checked whenever elements enter the list, so a value of this
/// type can never describe more entries than its persisted form can hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedList<T, const N: usize> {
    items: Vec<T>,
}

impl<T, const N: usize> BoundedList<T, N> {
    /// Maximum number of elements
    pub const CAPACITY: usize = N;

    /// Create an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a list from a vector
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if `items` holds more than `N` elements
    pub fn from_vec(items: Vec<T>) -> AppResult<Self> {
        if items.len() > N {
            return Err(AppError::capacity_exceeded("List", items.len(), N));
        }
        Ok(Self { items })
    }

    /// Append an element
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the list is full
    pub fn push(&mut self, item: T) -> AppResult<()> {
        if self.items.len() >= N {
            return Err(AppError::capacity_exceeded("List", self.items.len() + 1, N));
        }
        self.items.push(item);
        Ok(())
    }

    /// Whether another element would exceed the capacity
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= N
    }

    /// Consume the list and return its elements
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T, const N: usize> Default for BoundedList<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for BoundedList<T, N> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedList<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T, const N: usize> IntoIterator for BoundedList<T, N> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T, const N: usize> TryFrom<Vec<T>> for BoundedList<T, N> {
    type Error = AppError;

    fn try_from(items: Vec<T>) -> AppResult<Self> {
        Self::from_vec(items)
    }
}

/// Collects at most `N` elements; anything past capacity is never pulled
/// from the iterator. Sources that are themselves `N` positions wide, such as
/// the persisted slot and set arrays, always fit.
impl<T, const N: usize> FromIterator<T> for BoundedList<T, N> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().take(N).collect(),
        }
    }
}

impl<T: Serialize, const N: usize> Serialize for BoundedList<T, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for BoundedList<T, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::from_vec(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_push_stops_at_capacity() {
        let mut list: BoundedList<u8, 2> = BoundedList::new();
        list.push(1).unwrap();
        list.push(2).unwrap();
        assert!(list.is_full());

        let error = list.push(3).unwrap_err();
        assert_eq!(error.code, ErrorCode::CapacityExceeded);
        assert_eq!(&*list, &[1, 2]);
    }

    #[test]
    fn test_from_vec_rejects_oversized_input() {
        let result = BoundedList::<u8, 3>::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(result.unwrap_err().code, ErrorCode::CapacityExceeded);
    }

    #[test]
    fn test_collect_stops_pulling_at_capacity() {
        let mut pulled = 0;
        let list: BoundedList<u8, 3> = (1..=5)
            .inspect(|_| pulled += 1)
            .collect();
        assert_eq!(&*list, &[1, 2, 3]);
        assert_eq!(pulled, 3);
    }

    #[test]
    fn test_deserialize_enforces_capacity() {
        let ok: BoundedList<u8, 3> = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(ok.len(), 3);
        assert!(serde_json::from_str::<BoundedList<u8, 3>>("[1,2,3,4]").is_err());
    }
}
