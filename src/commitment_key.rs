//! Deterministic commitment-key derivation (C2, §4.2): `ck = (h, g_1, ...,
//! g_nu)`, reproducible from `(Gq, nu)` alone so two parties who agree on
//! the group and the vector length agree on the key without exchanging
//! it. Grounded on the same squaring technique
//! `group::integer_mod_p::find_quadratic_residue_generator` uses to find
//! a subgroup generator, lifted here into a counter-driven search that
//! collects `1 + nu` distinct elements.

use crate::error::{CoreError, CoreResult};
use crate::group::{Group, GroupElement};
use crate::hashing::{byte_array_to_integer, hashable_element, Hashable, HashService};
use num_bigint::BigUint;
use num_traits::{One, Zero};

#[derive(Clone, Debug)]
pub struct CommitmentKey<G: Group> {
    h: G::Element,
    g: Vec<G::Element>,
}

impl<G: Group> CommitmentKey<G> {
    pub fn h(&self) -> &G::Element {
        &self.h
    }

    pub fn g(&self) -> &[G::Element] {
        &self.g
    }

    /// `nu`: the number of message components this key can commit to.
    pub fn nu(&self) -> usize {
        self.g.len()
    }

    /// Derives `ck` deterministically from `group` and the target vector
    /// length `nu`. `nu` must be at least 1 — a commitment key with no
    /// `g_i` entries could only ever commit to the empty vector.
    pub fn derive(group: &G, hash_service: &HashService, nu: usize) -> CoreResult<Self> {
        if nu == 0 {
            return Err(CoreError::new("commitment key length nu must be at least 1"));
        }
        let q_minus_3 = group.q().clone() - BigUint::from(3u32);
        if BigUint::from(nu as u64) > q_minus_3 {
            return Err(CoreError::new("commitment key length nu must not exceed q - 3"));
        }
        let mut collected: Vec<G::Element> = Vec::with_capacity(1 + nu);
        let mut seen: Vec<BigUint> = Vec::with_capacity(1 + nu);
        let mut i: u64 = 0;
        let mut cnt: u64 = 0;
        while (cnt as usize) < 1 + nu {
            let transcript = vec![
                Hashable::BigInt(group.q().clone()),
                Hashable::from("commitmentKey"),
                Hashable::BigInt(BigUint::from(i)),
                Hashable::BigInt(BigUint::from(cnt)),
            ];
            let digest = hash_service.recursive_hash(&transcript);
            let u = byte_array_to_integer(&digest) % group.p();
            let w = u.modpow(&BigUint::from(2u32), group.p());
            if !(w.is_zero() || w == BigUint::one() || &w == group.generator().value()) && !seen.contains(&w) {
                seen.push(w.clone());
                collected.push(group.element_from_value(w)?);
                cnt += 1;
            }
            i += 1;
        }
        let h = collected.remove(0);
        log::debug!("commitment key derived: nu={nu}, searched {i} counter values");
        Ok(CommitmentKey { h, g: collected })
    }
}

/// Wraps a commitment key as a single hashable leaf (`h` followed by the
/// `g_i`), for inclusion in a Fiat-Shamir transcript.
pub fn hashable_commitment_key<G: Group>(ck: &CommitmentKey<G>) -> Hashable {
    let mut items = Vec::with_capacity(1 + ck.nu());
    items.push(hashable_element(ck.h()));
    items.extend(ck.g().iter().map(hashable_element));
    Hashable::List(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};

    fn test_group() -> GqGroup {
        let mut rng = OsRandomSource;
        GqGroup::generate(48, &mut rng)
    }

    #[test]
    fn derivation_is_deterministic() {
        let group = test_group();
        let hash_service = HashService::new();
        let ck1 = CommitmentKey::derive(&group, &hash_service, 4).unwrap();
        let ck2 = CommitmentKey::derive(&group, &hash_service, 4).unwrap();
        assert_eq!(ck1.h(), ck2.h());
        assert_eq!(ck1.g(), ck2.g());
    }

    #[test]
    fn collected_elements_are_distinct() {
        let group = test_group();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, 6).unwrap();
        assert_eq!(ck.nu(), 6);
        let mut values: Vec<&BigUint> = std::iter::once(ck.h().value())
            .chain(ck.g().iter().map(|e| e.value()))
            .collect();
        let before = values.len();
        values.sort();
        values.dedup();
        assert_eq!(values.len(), before);
    }

    #[test]
    fn zero_length_key_is_rejected() {
        let group = test_group();
        let hash_service = HashService::new();
        assert!(CommitmentKey::derive(&group, &hash_service, 0).is_err());
    }

    #[test]
    fn length_exceeding_q_minus_3_is_rejected() {
        let group = test_group();
        let hash_service = HashService::new();
        let q = group.q();
        let too_long: usize = (q - BigUint::from(2u32)).try_into().unwrap_or(usize::MAX);
        assert!(CommitmentKey::derive(&group, &hash_service, too_long).is_err());
    }
}
