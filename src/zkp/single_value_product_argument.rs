//! Single-value product argument (C8, §4.8): proves a committed vector
//! `a` has product `b = Prod_j a_j`, without revealing `a`.
//!
//! §9 records an open question in the source material about the final
//! entry of `delta`: this implementation adopts `delta_{n-1} = 0` (the
//! Bayer-Groth paper's convention) rather than `delta_{n-1} = d_{n-1}`.

use crate::commitment::commit;
use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::hashing::{hashable_element, hashable_scalar};
use crate::zkp::context::ArgumentContext;

pub struct SingleValueProductStatement<G: Group> {
    pub c_a: G::Element,
    pub b: <G::Field as Field>::Element,
}

impl<G: Group> SingleValueProductStatement<G> {
    pub fn new(c_a: G::Element, b: <G::Field as Field>::Element) -> Self {
        SingleValueProductStatement { c_a, b }
    }
}

pub struct SingleValueProductWitness<G: Group> {
    pub a: Vec<<G::Field as Field>::Element>,
    pub r: <G::Field as Field>::Element,
}

impl<G: Group> SingleValueProductWitness<G> {
    pub fn new(a: Vec<<G::Field as Field>::Element>, r: <G::Field as Field>::Element) -> CoreResult<Self> {
        if a.len() < 2 {
            return Err(CoreError::new("single-value product argument requires n >= 2"));
        }
        Ok(SingleValueProductWitness { a, r })
    }

    pub fn n(&self) -> usize {
        self.a.len()
    }
}

#[derive(Clone)]
pub struct SingleValueProductArgument<G: Group> {
    pub c_d: G::Element,
    pub c_delta: G::Element,
    pub c_big_delta: G::Element,
    pub a_tilde: Vec<<G::Field as Field>::Element>,
    pub b_tilde: Vec<<G::Field as Field>::Element>,
    pub r_tilde: <G::Field as Field>::Element,
    pub s_tilde: <G::Field as Field>::Element,
}

fn transcript_challenge<G: Group>(
    ctx: &ArgumentContext<'_, G>,
    c_big_delta: &G::Element,
    c_delta: &G::Element,
    c_d: &G::Element,
    b: &<G::Field as Field>::Element,
    c_a: &G::Element,
) -> CoreResult<<G::Field as Field>::Element> {
    let field = ctx.group.exponent_field();
    ctx.hash_service.challenge(
        &field,
        &[
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_element(c_big_delta),
            hashable_element(c_delta),
            hashable_element(c_d),
            hashable_scalar(b),
            hashable_element(c_a),
        ],
    )
}

pub fn prove<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &SingleValueProductStatement<G>,
    witness: &SingleValueProductWitness<G>,
    rng: &mut dyn RandomSource,
) -> CoreResult<SingleValueProductArgument<G>> {
    let field = ctx.group.exponent_field();
    let n = witness.n();
    let a = &witness.a;

    let mut b = Vec::with_capacity(n);
    let mut acc = field.one();
    for a_j in a {
        acc = acc.multiply(a_j);
        b.push(acc.clone());
    }

    let d: Vec<_> = (0..n).map(|_| field.random(rng)).collect();
    let r_d = field.random(rng);

    let mut delta = Vec::with_capacity(n);
    delta.push(d[0].clone());
    for _ in 1..n - 1 {
        delta.push(field.random(rng));
    }
    delta.push(field.zero());

    let s_0 = field.random(rng);
    let s_x = field.random(rng);

    let mut delta_prime = Vec::with_capacity(n - 1);
    let mut big_delta = Vec::with_capacity(n - 1);
    for k in 0..n - 1 {
        delta_prime.push(delta[k].multiply(&d[k + 1]).negate());
        let term = delta[k + 1].subtract(&a[k + 1].multiply(&delta[k])).subtract(&b[k].multiply(&d[k + 1]));
        big_delta.push(term);
    }

    let c_d = commit(ctx.group, ctx.ck, &d, &r_d)?;
    let c_delta = commit(ctx.group, ctx.ck, &delta_prime, &s_0)?;
    let c_big_delta = commit(ctx.group, ctx.ck, &big_delta, &s_x)?;

    let x = transcript_challenge(&ctx, &c_big_delta, &c_delta, &c_d, &statement.b, &statement.c_a)?;

    let a_tilde: Vec<_> = (0..n).map(|k| x.multiply(&a[k]).add(&d[k])).collect();
    let b_tilde: Vec<_> = (0..n).map(|k| x.multiply(&b[k]).add(&delta[k])).collect();
    let r_tilde = x.multiply(&witness.r).add(&r_d);
    let s_tilde = x.multiply(&s_x).add(&s_0);

    Ok(SingleValueProductArgument {
        c_d,
        c_delta,
        c_big_delta,
        a_tilde,
        b_tilde,
        r_tilde,
        s_tilde,
    })
}

pub fn verify<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &SingleValueProductStatement<G>,
    argument: &SingleValueProductArgument<G>,
) -> CoreResult<crate::error::VerificationResult> {
    use crate::error::VerificationResult;

    let field = ctx.group.exponent_field();
    let n = argument.a_tilde.len();
    if argument.b_tilde.len() != n || n < 2 {
        return Err(CoreError::new("single-value product argument: a~, b~ must have equal length n >= 2"));
    }

    let x = transcript_challenge(
        &ctx,
        &argument.c_big_delta,
        &argument.c_delta,
        &argument.c_d,
        &statement.b,
        &statement.c_a,
    )?;

    let mut result = VerificationResult::verified();

    let lhs1 = statement.c_a.exponentiate(&x).multiply(&argument.c_d)?;
    let rhs1 = commit(ctx.group, ctx.ck, &argument.a_tilde, &argument.r_tilde)?;
    result = result.check(lhs1.equals(&rhs1), "single-value product argument: a~ commitment equation failed");

    let e: Vec<_> = (0..n - 1)
        .map(|k| {
            x.multiply(&argument.b_tilde[k + 1])
                .subtract(&argument.b_tilde[k].multiply(&argument.a_tilde[k + 1]))
        })
        .collect();
    let lhs2 = argument.c_big_delta.exponentiate(&x).multiply(&argument.c_delta)?;
    let rhs2 = commit(ctx.group, ctx.ck, &e, &argument.s_tilde)?;
    result = result.check(lhs2.equals(&rhs2), "single-value product argument: Delta commitment equation failed");

    result = result.check(
        argument.b_tilde[0] == argument.a_tilde[0],
        "single-value product argument: b~_0 must equal a~_0",
    );
    let expected_last = x.multiply(&statement.b);
    result = result.check(
        argument.b_tilde[n - 1] == expected_last,
        "single-value product argument: b~_(n-1) must equal x*b",
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment_key::CommitmentKey;
    use crate::elgamal::KeyPair;
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};
    use crate::hashing::HashService;

    fn setup(n: usize) -> (GqGroup, CommitmentKey<GqGroup>, crate::elgamal::PublicKey<GqGroup>, HashService) {
        let mut rng = OsRandomSource;
        let group = GqGroup::large_safe_prime_group();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, n).unwrap();
        let key_pair = KeyPair::generate(&group, 1, &mut rng).unwrap();
        (group, ck, key_pair.public_key().clone(), hash_service)
    }

    #[test]
    fn honest_product_claim_verifies() {
        let (group, ck, pk, hash_service) = setup(3);
        let field = group.exponent_field();
        let mut rng = OsRandomSource;
        let a = vec![field.from_u64(2), field.from_u64(3), field.from_u64(5)];
        let r = field.random(&mut rng);
        let c_a = commit(&group, &ck, &a, &r).unwrap();
        let b = field.from_u64(30);

        let statement = SingleValueProductStatement::new(c_a, b);
        let witness = SingleValueProductWitness::new(a, r).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument).unwrap();
        assert!(result.is_verified(), "{:?}", result.reasons());
    }

    #[test]
    fn wrong_product_claim_fails() {
        let (group, ck, pk, hash_service) = setup(3);
        let field = group.exponent_field();
        let mut rng = OsRandomSource;
        let a = vec![field.from_u64(2), field.from_u64(3), field.from_u64(5)];
        let r = field.random(&mut rng);
        let c_a = commit(&group, &ck, &a, &r).unwrap();
        let wrong_b = field.from_u64(29);

        let statement = SingleValueProductStatement::new(c_a, wrong_b);
        let witness = SingleValueProductWitness::new(a, r).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument).unwrap();
        assert!(!result.is_verified());
        assert!(result.reasons().iter().any(|r| r.contains("b~_(n-1)")));
    }
}
