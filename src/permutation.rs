//! Permutations and the re-encrypting shuffle (C4, §4.4). A `Permutation`
//! of size `N` is a bijection `psi: {0,...,N-1} -> {0,...,N-1}`, sampled
//! uniformly via Fisher-Yates; `shuffle` applies one to a vector of
//! ElGamal ciphertexts and re-randomizes each entry, producing the
//! output a mix node publishes alongside its shuffle argument.

use crate::elgamal::{Ciphertext, PublicKey};
use crate::error::{CoreError, CoreResult};
use crate::group::{Field, Group, GroupElement, RandomSource};
use num_bigint::BigUint;

#[derive(Clone, Debug, PartialEq)]
pub struct Permutation {
    psi: Vec<usize>,
}

impl Permutation {
    /// Builds a permutation from an explicit image vector, checking it is
    /// a bijection on `{0, ..., psi.len()-1}`.
    pub fn new(psi: Vec<usize>) -> CoreResult<Self> {
        let n = psi.len();
        let mut seen = vec![false; n];
        for &p in &psi {
            if p >= n || seen[p] {
                return Err(CoreError::new("permutation image is not a bijection on 0..N-1"));
            }
            seen[p] = true;
        }
        Ok(Permutation { psi })
    }

    pub fn identity(n: usize) -> Self {
        Permutation {
            psi: (0..n).collect(),
        }
    }

    /// Fisher-Yates: uniform over all `n!` permutations of `{0,...,n-1}`.
    pub fn random(n: usize, rng: &mut dyn RandomSource) -> Self {
        let mut psi: Vec<usize> = (0..n).collect();
        for i in (1..n).rev() {
            let j = rng.random_below(&BigUint::from(i as u64 + 1));
            let j: usize = j.try_into().unwrap_or(0);
            psi.swap(i, j);
        }
        Permutation { psi }
    }

    pub fn n(&self) -> usize {
        self.psi.len()
    }

    /// `psi(i)`.
    pub fn at(&self, i: usize) -> usize {
        self.psi[i]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.psi
    }

    /// `psi^-1`.
    pub fn inverse(&self) -> Permutation {
        let mut inv = vec![0usize; self.psi.len()];
        for (i, &p) in self.psi.iter().enumerate() {
            inv[p] = i;
        }
        Permutation { psi: inv }
    }

    /// Applies `psi` to `items`, producing `out[i] = items[psi(i)]`.
    pub fn apply<T: Clone>(&self, items: &[T]) -> CoreResult<Vec<T>> {
        if items.len() != self.psi.len() {
            return Err(CoreError::new(format!(
                "permutation of size {} cannot be applied to a length-{} vector",
                self.psi.len(),
                items.len()
            )));
        }
        Ok(self.psi.iter().map(|&p| items[p].clone()).collect())
    }
}

/// Permutes `ciphertexts` by `permutation` and re-randomizes each output
/// entry with the corresponding randomness in `re_encryption_exponents`:
/// `c'_i = Rerandomize(c_{psi(i)}, r_i)`.
pub fn shuffle<G: Group>(
    group: &G,
    pk: &PublicKey<G>,
    ciphertexts: &[Ciphertext<G>],
    permutation: &Permutation,
    re_encryption_exponents: &[<G::Field as Field>::Element],
) -> CoreResult<Vec<Ciphertext<G>>> {
    if ciphertexts.len() != permutation.n() {
        return Err(CoreError::new(format!(
            "permutation of size {} does not match {} ciphertexts",
            permutation.n(),
            ciphertexts.len()
        )));
    }
    if re_encryption_exponents.len() != ciphertexts.len() {
        return Err(CoreError::new(format!(
            "expected {} re-encryption exponents, got {}",
            ciphertexts.len(),
            re_encryption_exponents.len()
        )));
    }
    let permuted = permutation.apply(ciphertexts)?;
    permuted
        .iter()
        .zip(re_encryption_exponents.iter())
        .map(|(c, r)| c.rerandomize(group, pk, r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elgamal::{KeyPair, Message};
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};

    fn test_group() -> GqGroup {
        let mut rng = OsRandomSource;
        GqGroup::generate(48, &mut rng)
    }

    #[test]
    fn random_permutation_is_a_bijection() {
        let mut rng = OsRandomSource;
        let perm = Permutation::random(10, &mut rng);
        let mut seen = vec![false; 10];
        for i in 0..10 {
            assert!(!seen[perm.at(i)]);
            seen[perm.at(i)] = true;
        }
    }

    #[test]
    fn inverse_undoes_the_permutation() {
        let mut rng = OsRandomSource;
        let perm = Permutation::random(8, &mut rng);
        let inv = perm.inverse();
        let items: Vec<usize> = (0..8).collect();
        let shuffled = perm.apply(&items).unwrap();
        let restored = inv.apply(&shuffled).unwrap();
        assert_eq!(restored, items);
    }

    #[test]
    fn non_bijective_image_is_rejected() {
        assert!(Permutation::new(vec![0, 0, 1]).is_err());
        assert!(Permutation::new(vec![0, 2]).is_err());
    }

    #[test]
    fn shuffle_preserves_the_multiset_of_plaintexts() {
        let group = test_group();
        let field = group.exponent_field();
        let mut rng = OsRandomSource;
        let key_pair = KeyPair::generate(&group, 1, &mut rng).unwrap();
        let messages: Vec<_> = (1..=4u64)
            .map(|v| Message::constant(group.generator().exponentiate(&field.from_u64(v)), 1).unwrap())
            .collect();
        let ciphertexts: Vec<_> = messages
            .iter()
            .map(|m| Ciphertext::encrypt(&group, key_pair.public_key(), m, &field.random(&mut rng)).unwrap())
            .collect();
        let permutation = Permutation::new(vec![2, 0, 3, 1]).unwrap();
        let exponents: Vec<_> = (0..4).map(|_| field.random(&mut rng)).collect();
        let shuffled = shuffle(&group, key_pair.public_key(), &ciphertexts, &permutation, &exponents).unwrap();
        let mut decrypted: Vec<_> = shuffled
            .iter()
            .map(|c| c.decrypt(&key_pair).unwrap())
            .collect();
        let mut expected = messages.clone();
        decrypted.sort_by(|a, b| a.values()[0].value().cmp(b.values()[0].value()));
        expected.sort_by(|a, b| a.values()[0].value().cmp(b.values()[0].value()));
        assert_eq!(decrypted, expected);
    }
}
