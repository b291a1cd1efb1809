//! Multi-recipient ElGamal over `Gq` (§3): a ciphertext `(gamma, phi_1,
//! ..., phi_l)` encrypts an `l`-component message vector under one
//! shared randomness `r` and one public key, so a single ciphertext can
//! carry an entire mixnet "row". Grounded on `src/elgamal.rs`'s
//! `ElGamal`/`KeyPair`/`ElGamalN` trio — generalized from the teacher's
//! const-generic `LEN`/single-recipient pair into a runtime-length
//! vector, and from `add_element`/`scalar_mul` calls on a concrete curve
//! into calls through the `group::Group`/`group::Field` traits.

use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::hashing::{hashable_element, Hashable};
use crate::vector::GroupMember;

/// `l` group elements, one per recipient slot, forming a plaintext
/// vector. `ones`/`constant` mirror the neutral and constant messages
/// the shuffle argument needs when re-randomizing with no message change.
#[derive(Clone, Debug, PartialEq)]
pub struct Message<G: Group> {
    values: Vec<G::Element>,
}

impl<G: Group> Message<G> {
    pub fn new(values: Vec<G::Element>) -> CoreResult<Self> {
        if values.is_empty() {
            return Err(CoreError::new("message must have at least one component"));
        }
        Ok(Message { values })
    }

    pub fn ones(group: &G, l: usize) -> CoreResult<Self> {
        Self::constant(group.identity().clone(), l)
    }

    pub fn constant(value: G::Element, l: usize) -> CoreResult<Self> {
        if l == 0 {
            return Err(CoreError::new("message length l must be at least 1"));
        }
        Ok(Message {
            values: std::iter::repeat(value).take(l).collect(),
        })
    }

    pub fn values(&self) -> &[G::Element] {
        &self.values
    }

    pub fn l(&self) -> usize {
        self.values.len()
    }
}

/// `(pk_1, ..., pk_k)`: one element per recipient slot (§3 "ordered
/// sequence of k Gq elements"). A message of length `l` is encrypted
/// under the first `l` of these `k` keys, so `l <= k` bounds every
/// ciphertext this key can produce.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicKey<G: Group> {
    elements: Vec<G::Element>,
}

impl<G: Group> PublicKey<G> {
    pub fn elements(&self) -> &[G::Element] {
        &self.elements
    }

    /// `k`: the number of recipient slots this key provides.
    pub fn size(&self) -> usize {
        self.elements.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KeyPair<G: Group> {
    secret_keys: Vec<<G::Field as Field>::Element>,
    pk: PublicKey<G>,
}

impl<G: Group> KeyPair<G> {
    /// Generates `k` independent key pairs and bundles their public
    /// halves into one `PublicKey` of size `k`.
    pub fn generate(group: &G, k: usize, rng: &mut dyn RandomSource) -> CoreResult<Self> {
        if k == 0 {
            return Err(CoreError::new("key pair size k must be at least 1"));
        }
        let field = group.exponent_field();
        let secret_keys: Vec<_> = (0..k).map(|_| field.random(rng)).collect();
        let elements = secret_keys
            .iter()
            .map(|sk| group.generator().exponentiate(sk))
            .collect();
        Ok(KeyPair {
            secret_keys,
            pk: PublicKey { elements },
        })
    }

    pub fn public_key(&self) -> &PublicKey<G> {
        &self.pk
    }

    pub fn secret_keys(&self) -> &[<G::Field as Field>::Element] {
        &self.secret_keys
    }
}

/// `(gamma, phi_1, ..., phi_l)`: `gamma = g^r`, `phi_i = m_i * pk_i^r`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ciphertext<G: Group> {
    gamma: G::Element,
    phis: Vec<G::Element>,
}

impl<G: Group> GroupMember for Ciphertext<G>
where
    G::Element: GroupMember,
{
    type Membership = (<G::Element as GroupMember>::Membership, usize);

    fn membership(&self) -> Self::Membership {
        (self.gamma.membership(), self.phis.len())
    }
}

impl<G: Group> Ciphertext<G> {
    pub fn gamma(&self) -> &G::Element {
        &self.gamma
    }

    pub fn phis(&self) -> &[G::Element] {
        &self.phis
    }

    pub fn l(&self) -> usize {
        self.phis.len()
    }

    /// Encrypts `message` under the first `message.l()` of `pk`'s `k`
    /// recipient keys, with freshly-supplied randomness `r`. Requires
    /// `l <= k` (§3, §4.10, §4.11 all state this bound explicitly).
    pub fn encrypt(
        group: &G,
        pk: &PublicKey<G>,
        message: &Message<G>,
        r: &<G::Field as Field>::Element,
    ) -> CoreResult<Self> {
        if message.l() > pk.size() {
            return Err(CoreError::new(format!(
                "message length l={} exceeds public key size k={}",
                message.l(),
                pk.size()
            )));
        }
        let gamma = group.generator().exponentiate(r);
        let phis = message
            .values()
            .iter()
            .zip(pk.elements().iter())
            .map(|(m, pk_i)| m.multiply(&pk_i.exponentiate(r)))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Ciphertext { gamma, phis })
    }

    /// Recovers the message vector. Requires the matching secret keys, so
    /// this is only ever called by the mix-net's output stage, never by
    /// the shuffle argument itself.
    pub fn decrypt(&self, key_pair: &KeyPair<G>) -> CoreResult<Message<G>> {
        if self.l() > key_pair.secret_keys().len() {
            return Err(CoreError::new(format!(
                "ciphertext length l={} exceeds key pair size k={}",
                self.l(),
                key_pair.secret_keys().len()
            )));
        }
        let order_minus_one = {
            let q = key_pair.secret_keys()[0].field_order();
            q - num_bigint::BigUint::from(1u32)
        };
        let values = self
            .phis
            .iter()
            .zip(key_pair.secret_keys().iter())
            .map(|(phi, sk)| {
                let shared_secret = self.gamma.exponentiate(sk);
                let inverse = shared_secret.exponentiate_bigint(&order_minus_one);
                phi.multiply(&inverse)
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Message::new(values)
    }

    /// Componentwise ciphertext multiplication (the ElGamal homomorphism
    /// over message vectors): `(gamma1*gamma2, phi1_i*phi2_i)`.
    pub fn multiply(&self, other: &Self) -> CoreResult<Self> {
        if self.phis.len() != other.phis.len() {
            return Err(CoreError::new("ciphertexts of different length l cannot be combined"));
        }
        let gamma = self.gamma.multiply(&other.gamma)?;
        let phis = self
            .phis
            .iter()
            .zip(other.phis.iter())
            .map(|(a, b)| a.multiply(b))
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Ciphertext { gamma, phis })
    }

    /// Raises every component to `exponent`.
    pub fn exponentiate(&self, exponent: &<G::Field as Field>::Element) -> Self {
        Ciphertext {
            gamma: self.gamma.exponentiate(exponent),
            phis: self.phis.iter().map(|p| p.exponentiate(exponent)).collect(),
        }
    }

    /// Re-randomizes without changing the encrypted message: multiplies
    /// by an encryption of the neutral message under fresh randomness
    /// `r_prime` (§4.4's re-encrypting shuffle).
    pub fn rerandomize(
        &self,
        group: &G,
        pk: &PublicKey<G>,
        r_prime: &<G::Field as Field>::Element,
    ) -> CoreResult<Self> {
        let neutral = Message::ones(group, self.l())?;
        let blinding = Ciphertext::encrypt(group, pk, &neutral, r_prime)?;
        self.multiply(&blinding)
    }
}

/// `Prod_i c_i^{e_i}`: the ciphertext-vector exponentiation the
/// multi-exponentiation argument (C10) builds its diagonals from.
pub fn ciphertext_vector_exponentiation<G: Group>(
    ciphertexts: &[Ciphertext<G>],
    exponents: &[<G::Field as Field>::Element],
    identity: &Ciphertext<G>,
) -> CoreResult<Ciphertext<G>> {
    if ciphertexts.len() != exponents.len() {
        return Err(CoreError::new(format!(
            "expected {} exponents for {} ciphertexts",
            ciphertexts.len(),
            exponents.len()
        )));
    }
    let mut acc = identity.clone();
    for (c, e) in ciphertexts.iter().zip(exponents.iter()) {
        acc = acc.multiply(&c.exponentiate(e))?;
    }
    Ok(acc)
}

/// The ciphertext `(1, 1, ..., 1)` of length `l`, the identity for
/// `multiply`.
pub fn identity_ciphertext<G: Group>(group: &G, l: usize) -> Ciphertext<G> {
    Ciphertext {
        gamma: group.identity().clone(),
        phis: std::iter::repeat(group.identity().clone()).take(l).collect(),
    }
}

/// Wraps a public key as a hashable leaf: its `k` elements in order.
pub fn hashable_public_key<G: Group>(pk: &PublicKey<G>) -> Hashable {
    Hashable::List(pk.elements().iter().map(hashable_element).collect())
}

/// Wraps a ciphertext as a hashable leaf: `gamma` followed by the `phi_i`.
pub fn hashable_ciphertext<G: Group>(c: &Ciphertext<G>) -> Hashable {
    let mut items = Vec::with_capacity(1 + c.l());
    items.push(hashable_element(c.gamma()));
    items.extend(c.phis().iter().map(hashable_element));
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
    fn encrypt_then_decrypt_round_trips() {
        let group = test_group();
        let field = group.exponent_field();
        let mut rng = OsRandomSource;
        let key_pair = KeyPair::generate(&group, 2, &mut rng).unwrap();
        let message = Message::new(vec![
            group.generator().exponentiate(&field.from_u64(7)),
            group.generator().exponentiate(&field.from_u64(11)),
        ])
        .unwrap();
        let r = field.random(&mut rng);
        let ciphertext = Ciphertext::encrypt(&group, key_pair.public_key(), &message, &r).unwrap();
        let decrypted = ciphertext.decrypt(&key_pair).unwrap();
        assert_eq!(decrypted, message);
    }

    #[test]
    fn rerandomize_preserves_the_plaintext() {
        let group = test_group();
        let field = group.exponent_field();
        let mut rng = OsRandomSource;
        let key_pair = KeyPair::generate(&group, 3, &mut rng).unwrap();
        let message = Message::ones(&group, 3).unwrap();
        let r = field.random(&mut rng);
        let ciphertext = Ciphertext::encrypt(&group, key_pair.public_key(), &message, &r).unwrap();
        let r_prime = field.random(&mut rng);
        let rerandomized = ciphertext
            .rerandomize(&group, key_pair.public_key(), &r_prime)
            .unwrap();
        assert_ne!(ciphertext, rerandomized);
        assert_eq!(rerandomized.decrypt(&key_pair).unwrap(), message);
    }

    #[test]
    fn mismatched_length_multiply_is_rejected() {
        let group = test_group();
        let mut rng = OsRandomSource;
        let key_pair = KeyPair::generate(&group, 3, &mut rng).unwrap();
        let field = group.exponent_field();
        let r = field.random(&mut rng);
        let m2 = Message::ones(&group, 2).unwrap();
        let m3 = Message::ones(&group, 3).unwrap();
        let c2 = Ciphertext::encrypt(&group, key_pair.public_key(), &m2, &r).unwrap();
        let c3 = Ciphertext::encrypt(&group, key_pair.public_key(), &m3, &r).unwrap();
        assert!(c2.multiply(&c3).is_err());
    }
}
