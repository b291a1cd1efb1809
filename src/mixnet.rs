//! Top-level facade (§6 "Exposed by the core"): `Mixnet::gen_verifiable_shuffle`
//! and `Mixnet::verify_shuffle`, the only two operations an external
//! caller needs. Bundles the group and hash service a deployment is
//! configured with once; the commitment key is re-derived per call since
//! its length tracks the dimension decomposition of each call's `N`.

use crate::commitment_key::CommitmentKey;
use crate::elgamal::{Ciphertext, PublicKey};
use crate::error::{CoreError, CoreResult, VerificationResult};
use crate::group::{Field, Group, RandomSource};
use crate::hashing::HashService;
use crate::permutation::{self, Permutation};
use crate::zkp::context::ArgumentContext;
use crate::zkp::shuffle_argument::{self, ShuffleArgument, ShuffleStatement, ShuffleWitness};

/// `(C', ShuffleArgument)`: the output of a shuffle, alongside the proof
/// that it is a permutation and re-encryption of the input.
pub struct VerifiableShuffle<G: Group> {
    pub c_prime: Vec<Ciphertext<G>>,
    pub argument: ShuffleArgument<G>,
}

pub struct Mixnet<G: Group> {
    group: G,
    hash_service: HashService,
}

impl<G: Group> Mixnet<G> {
    pub fn new(group: G, hash_service: HashService) -> Self {
        Mixnet { group, hash_service }
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    /// Shuffles `c` under `pk`: samples a uniform permutation and
    /// re-encryption randomness, produces `C'`, and proves the relation
    /// between `C` and `C'` with a shuffle argument.
    pub fn gen_verifiable_shuffle(
        &self,
        c: &[Ciphertext<G>],
        pk: &PublicKey<G>,
        rng: &mut dyn RandomSource,
    ) -> CoreResult<VerifiableShuffle<G>> {
        let big_n = c.len();
        if big_n < 2 {
            return Err(CoreError::new("mixnet: N must be at least 2"));
        }
        let field = self.group.exponent_field();
        let permutation = Permutation::random(big_n, rng);
        let rho: Vec<_> = (0..big_n).map(|_| field.random(rng)).collect();
        let c_prime = permutation::shuffle(&self.group, pk, c, &permutation, &rho)?;

        let (m, n) = shuffle_argument::decompose(big_n);
        log::debug!("mixnet: shuffling N={big_n} ciphertexts, decomposed as m={m} n={n}");
        let ck = CommitmentKey::derive(&self.group, &self.hash_service, n)?;
        let ctx = ArgumentContext {
            group: &self.group,
            pk,
            ck: &ck,
            hash_service: &self.hash_service,
        };

        let statement = ShuffleStatement::new(c.to_vec(), c_prime.clone())?;
        let witness = ShuffleWitness::new(permutation, rho)?;
        let argument = shuffle_argument::prove(ctx, &statement, &witness, m, n, rng)?;
        log::debug!("mixnet: shuffle argument produced for N={big_n}");

        Ok(VerifiableShuffle { c_prime, argument })
    }

    /// Re-derives every challenge and checks the shuffle argument proves
    /// `C'` is a permutation and re-encryption of `C` under `pk`.
    pub fn verify_shuffle(
        &self,
        c: &[Ciphertext<G>],
        c_prime: &[Ciphertext<G>],
        argument: &ShuffleArgument<G>,
        pk: &PublicKey<G>,
    ) -> CoreResult<VerificationResult> {
        let big_n = c.len();
        if big_n < 2 {
            return Err(CoreError::new("mixnet: N must be at least 2"));
        }
        let (m, n) = shuffle_argument::decompose(big_n);
        if argument.m() != m {
            return Err(CoreError::new(format!(
                "mixnet: argument dimension m={} does not match the decomposition of N={} (expected m={})",
                argument.m(),
                big_n,
                m
            )));
        }
        let ck = CommitmentKey::derive(&self.group, &self.hash_service, n)?;
        let ctx = ArgumentContext {
            group: &self.group,
            pk,
            ck: &ck,
            hash_service: &self.hash_service,
        };
        let statement = ShuffleStatement::new(c.to_vec(), c_prime.to_vec())?;
        let result = shuffle_argument::verify(ctx, &statement, argument, m, n)?;
        log::debug!("mixnet: shuffle verification for N={big_n}: {result}");
        Ok(result)
    }
}
