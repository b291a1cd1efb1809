//! Pedersen vector commitment (C3, §4.3): `commit(a, r, ck) = h^r *
//! Prod g_i^{a_i}`, plus a column-wise lift to matrices. The per-column
//! case is the one place in the core naturally shaped like an
//! embarrassingly parallel loop (each column's commitment is
//! independent), so it is where this crate follows the teacher's
//! `rayon`-based parallel-iterator idiom rather than a dependency the
//! teacher never used.

use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement};
use crate::commitment_key::CommitmentKey;
use crate::matrix::GroupMatrix;
use rayon::prelude::*;

/// Commits to `a` (length `<= ck.nu()`) under randomness `r`, using the
/// first `a.len()` bases of `ck`.
pub fn commit<G: Group>(
    group: &G,
    ck: &CommitmentKey<G>,
    a: &[<G::Field as Field>::Element],
    r: &<G::Field as Field>::Element,
) -> CoreResult<G::Element> {
    if a.len() > ck.nu() {
        return Err(CoreError::new(format!(
            "cannot commit to a length-{} vector with a commitment key of length {}",
            a.len(),
            ck.nu()
        )));
    }
    let mut acc = ck.h().exponentiate(r);
    for (a_i, g_i) in a.iter().zip(ck.g().iter()) {
        acc = acc.multiply(&g_i.exponentiate(a_i))?;
    }
    let _ = group;
    Ok(acc)
}

/// Commits to each column of `matrix` independently, returning one
/// commitment per column. `randomness` must carry one scalar per column.
pub fn commit_matrix<G: Group>(
    group: &G,
    ck: &CommitmentKey<G>,
    matrix: &GroupMatrix<<G::Field as Field>::Element>,
    randomness: &[<G::Field as Field>::Element],
) -> CoreResult<Vec<G::Element>>
where
    G: Sync,
    G::Element: Send,
    <G::Field as Field>::Element: Sync,
{
    if randomness.len() != matrix.num_columns() {
        return Err(CoreError::new(format!(
            "expected {} randomness values, one per column, got {}",
            matrix.num_columns(),
            randomness.len()
        )));
    }
    (0..matrix.num_columns())
        .into_par_iter()
        .map(|col| {
            let column = matrix.get_column(col);
            commit(group, ck, &column, &randomness[col])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};
    use crate::group::RandomSource;
    use crate::hashing::HashService;

    fn test_group() -> GqGroup {
        let mut rng = OsRandomSource;
        GqGroup::generate(48, &mut rng)
    }

    #[test]
    fn commitment_is_deterministic_given_same_inputs() {
        let group = test_group();
        let field = group.exponent_field();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, 3).unwrap();
        let a = vec![field.from_u64(1), field.from_u64(2), field.from_u64(3)];
        let r = field.from_u64(7);
        let c1 = commit(&group, &ck, &a, &r).unwrap();
        let c2 = commit(&group, &ck, &a, &r).unwrap();
        assert_eq!(c1, c2);
    }

    #[test]
    fn different_randomness_changes_the_commitment() {
        let group = test_group();
        let field = group.exponent_field();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, 2).unwrap();
        let a = vec![field.from_u64(5), field.from_u64(9)];
        let c1 = commit(&group, &ck, &a, &field.from_u64(1)).unwrap();
        let c2 = commit(&group, &ck, &a, &field.from_u64(2)).unwrap();
        assert_ne!(c1, c2);
    }

    #[test]
    fn oversized_message_is_rejected() {
        let group = test_group();
        let field = group.exponent_field();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, 1).unwrap();
        let a = vec![field.from_u64(1), field.from_u64(2)];
        assert!(commit(&group, &ck, &a, &field.from_u64(0)).is_err());
    }

    #[test]
    fn matrix_commitment_produces_one_commitment_per_column() {
        let group = test_group();
        let field = group.exponent_field();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, 2).unwrap();
        let matrix = crate::vector::GroupVector::new(vec![
            field.from_u64(1),
            field.from_u64(2),
            field.from_u64(3),
            field.from_u64(4),
        ])
        .unwrap()
        .to_matrix(2, 2)
        .unwrap();
        let mut rng = OsRandomSource;
        let randomness: Vec<_> = (0..2).map(|_| field.random(&mut rng)).collect();
        let commitments = commit_matrix(&group, &ck, &matrix, &randomness).unwrap();
        assert_eq!(commitments.len(), 2);
    }
}
