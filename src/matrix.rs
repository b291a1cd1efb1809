//! Group-aware matrix container (C1, §4.1): `m` rows of length `n`, all
//! rows sharing one group. Rows are 0..m-1, columns 0..n-1.

use crate::error::{CoreError, CoreResult};
use crate::vector::{GroupMember, GroupVector};

#[derive(Clone, Debug)]
pub struct GroupMatrix<T> {
    rows: Vec<Vec<T>>,
    n: usize,
}

impl<T> GroupMatrix<T> {
    pub fn from_rows(rows: Vec<Vec<T>>) -> CoreResult<Self> {
        let n = rows.first().map(|r| r.len()).unwrap_or(0);
        if rows.iter().any(|r| r.len() != n) {
            return Err(CoreError::new("matrix rows must all have the same length"));
        }
        Ok(GroupMatrix { rows, n })
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.n
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.rows[row][col]
    }

    pub fn get_row(&self, row: usize) -> &[T] {
        &self.rows[row]
    }

    pub fn get_column(&self, col: usize) -> Vec<T>
    where
        T: Clone,
    {
        self.rows.iter().map(|r| r[col].clone()).collect()
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub fn transpose(&self) -> GroupMatrix<T>
    where
        T: Clone,
    {
        let new_rows = (0..self.n)
            .map(|c| self.get_column(c))
            .collect::<Vec<_>>();
        GroupMatrix {
            rows: new_rows,
            n: self.rows.len(),
        }
    }

    pub fn prepend_column(&self, column: &[T]) -> CoreResult<GroupMatrix<T>>
    where
        T: Clone,
    {
        if column.len() != self.rows.len() {
            return Err(CoreError::new("column length must match number of rows"));
        }
        let rows = self
            .rows
            .iter()
            .zip(column.iter())
            .map(|(row, c)| {
                let mut new_row = Vec::with_capacity(row.len() + 1);
                new_row.push(c.clone());
                new_row.extend(row.iter().cloned());
                new_row
            })
            .collect();
        Ok(GroupMatrix { rows, n: self.n + 1 })
    }

    pub fn append_column(&self, column: &[T]) -> CoreResult<GroupMatrix<T>>
    where
        T: Clone,
    {
        if column.len() != self.rows.len() {
            return Err(CoreError::new("column length must match number of rows"));
        }
        let rows = self
            .rows
            .iter()
            .zip(column.iter())
            .map(|(row, c)| {
                let mut new_row = row.clone();
                new_row.push(c.clone());
                new_row
            })
            .collect();
        Ok(GroupMatrix { rows, n: self.n + 1 })
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> GroupMatrix<U> {
        GroupMatrix {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|e| f(e)).collect())
                .collect(),
            n: self.n,
        }
    }

    pub fn into_group_vector(self) -> Vec<T> {
        self.rows.into_iter().flatten().collect()
    }
}

impl<T: GroupMember> GroupMatrix<T> {
    pub fn membership(&self) -> Option<T::Membership> {
        self.rows
            .iter()
            .flatten()
            .next()
            .map(|e| e.membership())
    }

    pub fn to_group_vector(&self) -> CoreResult<GroupVector<T>>
    where
        T: Clone,
    {
        GroupVector::new(self.rows.iter().flatten().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpose_round_trips() {
        let m = GroupMatrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let t = m.transpose();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.num_columns(), 2);
        assert_eq!(*t.get(0, 0), 1);
        assert_eq!(*t.get(2, 1), 6);
        assert_eq!(t.transpose().rows(), m.rows());
    }

    #[test]
    fn prepend_and_append_column() {
        let m = GroupMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let prepended = m.prepend_column(&[0, 0]).unwrap();
        assert_eq!(prepended.get_row(0), &[0, 1, 2]);
        let appended = m.append_column(&[9, 9]).unwrap();
        assert_eq!(appended.get_row(1), &[3, 4, 9]);
    }

    #[test]
    fn mismatched_row_lengths_rejected() {
        assert!(GroupMatrix::from_rows(vec![vec![1, 2], vec![3]]).is_err());
    }
}
