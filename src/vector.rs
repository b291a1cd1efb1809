//! Group-aware vector container (C1, §4.1): an ordered sequence whose
//! elements are checked once, at construction, to share a common group
//! (or field) and — for ciphertexts — a common size `l`. Once built, a
//! `GroupVector` is immutable and every subsequent operation is total.

use crate::error::{CoreError, CoreResult};
use std::ops::Index;

/// Anything that can report which group (or field) it belongs to, so a
/// `GroupVector` can check homogeneity at construction without requiring
/// every element type to carry a size generic.
pub trait GroupMember {
    type Membership: PartialEq + Clone;

    fn membership(&self) -> Self::Membership;
}

#[derive(Clone, Debug)]
pub struct GroupVector<T> {
    elements: Vec<T>,
}

impl<T> GroupVector<T> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }

    /// Builds a vector without checking homogeneity; for internal use
    /// where the invariant is established by the caller's construction
    /// (e.g. `map`, which preserves length and cannot introduce a
    /// mismatched element).
    fn from_vec_unchecked(elements: Vec<T>) -> Self {
        GroupVector { elements }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> GroupVector<U> {
        GroupVector::from_vec_unchecked(self.elements.iter().map(|e| f(e)).collect())
    }

    pub fn try_map<U>(
        &self,
        mut f: impl FnMut(&T) -> CoreResult<U>,
    ) -> CoreResult<GroupVector<U>> {
        let mut out = Vec::with_capacity(self.elements.len());
        for e in &self.elements {
            out.push(f(e)?);
        }
        Ok(GroupVector::from_vec_unchecked(out))
    }

    pub fn zip_with<U, V>(
        &self,
        other: &GroupVector<U>,
        mut f: impl FnMut(&T, &U) -> V,
    ) -> CoreResult<GroupVector<V>> {
        if self.len() != other.len() {
            return Err(CoreError::new(format!(
                "vector length mismatch: {} vs {}",
                self.len(),
                other.len()
            )));
        }
        Ok(GroupVector::from_vec_unchecked(
            self.elements
                .iter()
                .zip(other.elements.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        ))
    }

    pub fn prepend(&self, item: T) -> GroupVector<T>
    where
        T: Clone,
    {
        let mut out = Vec::with_capacity(self.elements.len() + 1);
        out.push(item);
        out.extend(self.elements.iter().cloned());
        GroupVector::from_vec_unchecked(out)
    }

    pub fn append(&self, item: T) -> GroupVector<T>
    where
        T: Clone,
    {
        let mut out = self.elements.clone();
        out.push(item);
        GroupVector::from_vec_unchecked(out)
    }
}

impl<T: GroupMember> GroupVector<T> {
    /// Constructs a `GroupVector`, rejecting a vector whose elements do
    /// not all share the same membership (group/field/size). An empty
    /// vector is always accepted; its group is undefined and must not be
    /// queried (§4.1).
    pub fn new(elements: Vec<T>) -> CoreResult<Self> {
        if let Some(first) = elements.first() {
            let membership = first.membership();
            for (i, e) in elements.iter().enumerate().skip(1) {
                if e.membership() != membership {
                    return Err(CoreError::new(format!(
                        "element {i} does not share the group/size of the other elements"
                    )));
                }
            }
        }
        Ok(GroupVector { elements })
    }

    /// The common group/field of all elements. Panics if the vector is
    /// empty — callers must check `is_empty()` first, matching §4.1's
    /// "for empty vectors the group is undefined and must not be
    /// queried".
    pub fn membership(&self) -> T::Membership {
        self.elements
            .first()
            .expect("membership queried on an empty GroupVector")
            .membership()
    }

    /// Reshapes a length-`m*n` vector into an `m x n` matrix, row-major.
    pub fn to_matrix(&self, m: usize, n: usize) -> CoreResult<crate::matrix::GroupMatrix<T>>
    where
        T: Clone,
    {
        if self.elements.len() != m * n {
            return Err(CoreError::new(format!(
                "cannot reshape a length-{} vector into a {}x{} matrix",
                self.elements.len(),
                m,
                n
            )));
        }
        crate::matrix::GroupMatrix::from_rows(
            self.elements.chunks(n).map(|row| row.to_vec()).collect(),
        )
    }
}

impl<T> Index<usize> for GroupVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<T> IntoIterator for GroupVector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a GroupVector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl<T: PartialEq> PartialEq for GroupVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl GroupMember for u32 {
        type Membership = ();
        fn membership(&self) -> Self::Membership {}
    }

    #[derive(Clone, PartialEq, Debug)]
    struct Tagged(u32, &'static str);
    impl GroupMember for Tagged {
        type Membership = &'static str;
        fn membership(&self) -> Self::Membership {
            self.1
        }
    }

    #[test]
    fn empty_vector_is_allowed() {
        let v: GroupVector<Tagged> = GroupVector::new(vec![]).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn mixed_membership_is_rejected() {
        let v = GroupVector::new(vec![Tagged(1, "a"), Tagged(2, "b")]);
        assert!(v.is_err());
    }

    #[test]
    fn reshape_to_matrix_is_row_major() {
        let v = GroupVector::new(vec![1u32, 2, 3, 4, 5, 6]).unwrap();
        let m = v.to_matrix(2, 3).unwrap();
        assert_eq!(*m.get(0, 0), 1);
        assert_eq!(*m.get(0, 2), 3);
        assert_eq!(*m.get(1, 0), 4);
    }

    #[test]
    fn reshape_rejects_wrong_size() {
        let v = GroupVector::new(vec![1u32, 2, 3]).unwrap();
        assert!(v.to_matrix(2, 2).is_err());
    }
}
