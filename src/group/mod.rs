//! Collaborator interfaces consumed by the core (§6): the multiplicative
//! group `Gq`, its exponent field `Zq`, and the random source. The core's
//! argument logic (`crate::zkp`, `crate::commitment`, ...) is generic over
//! these traits; `integer_mod_p` is the one concrete instantiation this
//! crate ships, matching the data model in §3 (a prime-order subgroup of
//! `Z_p*` with `p = 2q + 1`) rather than an elliptic curve, since the
//! numeric code for the group primitive itself is explicitly out of scope
//! for the core's responsibilities (§1 Non-goals) — this module exists so
//! the core can be compiled and tested at all.

pub mod integer_mod_p;

use crate::error::{CoreError, CoreResult};
use num_bigint::BigUint;
use std::fmt::Debug;

/// A uniform random source, passed as an external capability rather than
/// owned globally (§9 "Ownership of random source"). Implementations
/// must provide integers uniform over `[0, bound)`.
pub trait RandomSource {
    fn random_below(&mut self, bound: &BigUint) -> BigUint;

    fn random_vector(&mut self, bound: &BigUint, len: usize) -> Vec<BigUint> {
        (0..len).map(|_| self.random_below(bound)).collect()
    }
}

/// An element of a cryptographic group: `value`, `multiply`, `exponentiate`,
/// `equals` as named by §6.
pub trait GroupElement: Clone + Debug + PartialEq {
    type Field: Field;

    /// The element's canonical representative, used only for hashing and
    /// for debugging; callers must not rely on any other structure.
    fn value(&self) -> &BigUint;

    fn multiply(&self, other: &Self) -> CoreResult<Self>;

    fn exponentiate(&self, exponent: &<Self::Field as Field>::Element) -> Self;

    /// Exponentiate by a raw integer exponent (the "BigInt" branch of
    /// §6's `exponentiate(e ∈ Zq|BigInt)`), used only internally for
    /// values such as `y^{j+1}` that are not reduced `Zq` witnesses.
    fn exponentiate_bigint(&self, exponent: &BigUint) -> Self;

    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

/// The group `Gq` itself: `p`, `q`, `generator`, `identity`, `equals` (§6).
pub trait Group: Clone + PartialEq {
    type Element: GroupElement<Field = Self::Field>;
    type Field: Field;

    fn p(&self) -> &BigUint;
    fn q(&self) -> &BigUint;
    fn generator(&self) -> &Self::Element;
    fn identity(&self) -> &Self::Element;

    /// `ZqGroup.sameOrderAs(Gq)` (§3): the exponent field sharing this
    /// group's order.
    fn exponent_field(&self) -> Self::Field;

    /// Wraps a raw value already known to be a member of this group (a
    /// quadratic residue mod `p`, in the `integer_mod_p` instantiation)
    /// as an element. Used by commitment-key derivation (§4.2), which
    /// discovers group elements by repeated squaring rather than by
    /// scalar exponentiation of the generator.
    fn element_from_value(&self, value: BigUint) -> CoreResult<Self::Element>;

    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

/// An exponent/scalar in `Zq`: `add`, `multiply`, `negate`, `subtract`,
/// `exponentiate`, `value` (§6).
pub trait FieldElement: Clone + Debug + PartialEq {
    fn field_order(&self) -> &BigUint;
    fn value(&self) -> &BigUint;

    fn add(&self, other: &Self) -> Self;
    fn subtract(&self, other: &Self) -> Self;
    fn multiply(&self, other: &Self) -> Self;
    fn negate(&self) -> Self;
    fn exponentiate(&self, power: &BigUint) -> Self;
}

/// The exponent field `Zq` itself.
pub trait Field: Clone + PartialEq {
    type Element: FieldElement;

    fn q(&self) -> &BigUint;
    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;
    fn from_u64(&self, value: u64) -> Self::Element;
    fn from_biguint(&self, value: BigUint) -> Self::Element;
    fn random(&self, rng: &mut dyn RandomSource) -> Self::Element;
}

/// Validates that a byte-length intended to be reduced into `Zq` respects
/// the §4.5 detail floor: `hash_byte_length * 8 < ceil(log2(q))`.
pub fn check_hash_length_bound(hash_byte_len: usize, q: &BigUint) -> CoreResult<()> {
    let bits_q = q.bits() as usize;
    // ceil(log2(q)): q.bits() already returns the minimal bit-width, i.e.
    // ceil(log2(q+1)), which coincides with ceil(log2(q)) for q > 1.
    if hash_byte_len * 8 >= bits_q {
        return Err(CoreError::new(format!(
            "hash length bound violated: {} bytes ({} bits) is not strictly less than ceil(log2(q)) = {} bits",
            hash_byte_len,
            hash_byte_len * 8,
            bits_q
        )));
    }
    Ok(())
}
