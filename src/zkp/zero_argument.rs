//! Zero argument (C6, §4.6): proves that two committed sequences of
//! vectors `A`, `B` satisfy `Sum_i col_i(A) star_y col_i(B) = 0` under
//! the bilinear map `star_y(u, v) = Sum_j u_j v_j y^(j+1)`, without
//! revealing `A` or `B`.

use crate::commitment::commit;
use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::hashing::{hashable_element, Hashable};
use crate::matrix::GroupMatrix;
use crate::zkp::context::ArgumentContext;
use crate::zkp::{powers, star};

pub struct ZeroStatement<G: Group> {
    pub c_a: Vec<G::Element>,
    pub c_b: Vec<G::Element>,
    pub y: <G::Field as Field>::Element,
}

impl<G: Group> ZeroStatement<G> {
    pub fn new(
        c_a: Vec<G::Element>,
        c_b: Vec<G::Element>,
        y: <G::Field as Field>::Element,
    ) -> CoreResult<Self> {
        if c_a.len() != c_b.len() {
            return Err(CoreError::new("zero argument: |c_A| must equal |c_B|"));
        }
        if c_a.is_empty() {
            return Err(CoreError::new("zero argument: m must be at least 1"));
        }
        Ok(ZeroStatement { c_a, c_b, y })
    }

    pub fn m(&self) -> usize {
        self.c_a.len()
    }
}

pub struct ZeroWitness<G: Group> {
    pub a: GroupMatrix<<G::Field as Field>::Element>,
    pub b: GroupMatrix<<G::Field as Field>::Element>,
    pub r: Vec<<G::Field as Field>::Element>,
    pub s: Vec<<G::Field as Field>::Element>,
}

impl<G: Group> ZeroWitness<G> {
    pub fn new(
        a: GroupMatrix<<G::Field as Field>::Element>,
        b: GroupMatrix<<G::Field as Field>::Element>,
        r: Vec<<G::Field as Field>::Element>,
        s: Vec<<G::Field as Field>::Element>,
    ) -> CoreResult<Self> {
        if a.num_columns() != b.num_columns() || a.num_rows() != b.num_rows() {
            return Err(CoreError::new("zero argument: A and B must have equal shape"));
        }
        if r.len() != a.num_columns() || s.len() != a.num_columns() {
            return Err(CoreError::new("zero argument: r, s must have length m"));
        }
        Ok(ZeroWitness { a, b, r, s })
    }
}

#[derive(Clone)]
pub struct ZeroArgument<G: Group> {
    pub c_a0: G::Element,
    pub c_bm: G::Element,
    pub c_d: Vec<G::Element>,
    pub a_prime: Vec<<G::Field as Field>::Element>,
    pub b_prime: Vec<<G::Field as Field>::Element>,
    pub r_prime: <G::Field as Field>::Element,
    pub s_prime: <G::Field as Field>::Element,
    pub t_prime: <G::Field as Field>::Element,
}

fn column<F: Clone>(matrix: &GroupMatrix<F>, i: usize) -> Vec<F> {
    matrix.get_column(i)
}

fn hashable_elements<G: Group>(elements: &[G::Element]) -> Hashable {
    Hashable::List(elements.iter().map(hashable_element).collect())
}

pub fn prove<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &ZeroStatement<G>,
    witness: &ZeroWitness<G>,
    rng: &mut dyn RandomSource,
) -> CoreResult<ZeroArgument<G>> {
    let field = ctx.group.exponent_field();
    let m = statement.m();
    let n = witness.a.num_rows();
    let y_powers = powers(&field, &statement.y, n); // y^0 .. y^n
    let y_from_1 = &y_powers[1..]; // y^1 .. y^n, length n

    let a0: Vec<_> = (0..n).map(|_| field.random(rng)).collect();
    let r0 = field.random(rng);
    let bm: Vec<_> = (0..n).map(|_| field.random(rng)).collect();
    let sm = field.random(rng);
    let c_a0 = commit(ctx.group, ctx.ck, &a0, &r0)?;
    let c_bm = commit(ctx.group, ctx.ck, &bm, &sm)?;

    // Abar columns 0..=m: column 0 = a0, columns 1..=m = A's columns.
    let abar_cols: Vec<Vec<_>> = std::iter::once(a0.clone())
        .chain((0..m).map(|i| column(&witness.a, i)))
        .collect();
    let r_bar: Vec<_> = std::iter::once(r0.clone()).chain(witness.r.iter().cloned()).collect();

    // Bbar columns 0..=m: columns 0..m = B's columns, column m = bm.
    let bbar_cols: Vec<Vec<_>> = (0..m)
        .map(|i| column(&witness.b, i))
        .chain(std::iter::once(bm.clone()))
        .collect();
    let s_bar: Vec<_> = witness.s.iter().cloned().chain(std::iter::once(sm.clone())).collect();

    let d: Vec<_> = (0..=2 * m)
        .map(|k| {
            let mut acc = field.zero();
            for i in 0..=m {
                let j = m as i64 - k as i64 + i as i64;
                if j < 0 || j > m as i64 {
                    continue;
                }
                let j = j as usize;
                acc = acc.add(&star(&field, &abar_cols[i], &bbar_cols[j], y_from_1));
            }
            acc
        })
        .collect();

    let mut t: Vec<_> = (0..=2 * m).map(|_| field.random(rng)).collect();
    t[m] = field.zero();

    let c_d: Vec<G::Element> = d
        .iter()
        .zip(t.iter())
        .map(|(d_k, t_k)| commit(ctx.group, ctx.ck, std::slice::from_ref(d_k), t_k))
        .collect::<CoreResult<Vec<_>>>()?;

    let x = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_element(&c_a0),
            hashable_element(&c_bm),
            hashable_elements::<G>(&c_d),
            hashable_elements::<G>(&statement.c_b),
            hashable_elements::<G>(&statement.c_a),
        ],
    )?;
    let x_powers = powers(&field, &x, 2 * m); // x^0 .. x^2m

    let a_prime: Vec<_> = (0..n)
        .map(|j| {
            let mut acc = field.zero();
            for i in 0..=m {
                acc = acc.add(&x_powers[i].multiply(&abar_cols[i][j]));
            }
            acc
        })
        .collect();
    let b_prime: Vec<_> = (0..n)
        .map(|j| {
            let mut acc = field.zero();
            for i in 0..=m {
                acc = acc.add(&x_powers[m - i].multiply(&bbar_cols[i][j]));
            }
            acc
        })
        .collect();
    let r_prime = (0..=m).fold(field.zero(), |acc, i| acc.add(&x_powers[i].multiply(&r_bar[i])));
    let s_prime = (0..=m).fold(field.zero(), |acc, i| acc.add(&x_powers[m - i].multiply(&s_bar[i])));
    let t_prime = (0..=2 * m).fold(field.zero(), |acc, i| acc.add(&x_powers[i].multiply(&t[i])));

    Ok(ZeroArgument {
        c_a0,
        c_bm,
        c_d,
        a_prime,
        b_prime,
        r_prime,
        s_prime,
        t_prime,
    })
}

pub fn verify<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &ZeroStatement<G>,
    argument: &ZeroArgument<G>,
) -> CoreResult<crate::error::VerificationResult> {
    use crate::error::VerificationResult;

    let field = ctx.group.exponent_field();
    let m = statement.m();
    if argument.c_d.len() != 2 * m + 1 {
        return Err(CoreError::new("zero argument: c_d must have length 2m+1"));
    }
    let n = argument.a_prime.len();
    if argument.b_prime.len() != n {
        return Err(CoreError::new("zero argument: a' and b' must have equal length"));
    }

    let x = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_element(&argument.c_a0),
            hashable_element(&argument.c_bm),
            hashable_elements::<G>(&argument.c_d),
            hashable_elements::<G>(&statement.c_b),
            hashable_elements::<G>(&statement.c_a),
        ],
    )?;
    let x_powers = powers(&field, &x, 2 * m);

    let mut result = VerificationResult::verified();

    result = result.check(
        argument.c_d[m].equals(ctx.group.identity()),
        "zero argument: c_d[m] must equal the Gq identity",
    );

    let c_a_bar: Vec<_> = std::iter::once(argument.c_a0.clone())
        .chain(statement.c_a.iter().cloned())
        .collect();
    let lhs_a = product_of_powers(ctx.group, &c_a_bar, &x_powers)?;
    let rhs_a = commit(ctx.group, ctx.ck, &argument.a_prime, &argument.r_prime)?;
    result = result.check(lhs_a.equals(&rhs_a), "zero argument: A-side commitment equation failed");

    let c_b_bar: Vec<_> = statement
        .c_b
        .iter()
        .cloned()
        .chain(std::iter::once(argument.c_bm.clone()))
        .collect();
    let mut acc_b = ctx.group.identity().clone();
    for i in 0..=m {
        acc_b = acc_b.multiply(&c_b_bar[m - i].exponentiate(&x_powers[i]))?;
    }
    let rhs_b = commit(ctx.group, ctx.ck, &argument.b_prime, &argument.s_prime)?;
    result = result.check(acc_b.equals(&rhs_b), "zero argument: B-side commitment equation failed");

    let y_powers = powers(&field, &statement.y, n);
    let ab_star = star(&field, &argument.a_prime, &argument.b_prime, &y_powers[1..]);
    let lhs_d = product_of_powers(ctx.group, &argument.c_d, &x_powers)?;
    let rhs_d = commit(ctx.group, ctx.ck, std::slice::from_ref(&ab_star), &argument.t_prime)?;
    result = result.check(lhs_d.equals(&rhs_d), "zero argument: diagonal commitment equation failed");

    Ok(result)
}

fn product_of_powers<G: Group>(
    group: &G,
    bases: &[G::Element],
    exponents: &[<G::Field as Field>::Element],
) -> CoreResult<G::Element> {
    let mut acc = group.identity().clone();
    for (b, e) in bases.iter().zip(exponents.iter()) {
        acc = acc.multiply(&b.exponentiate(e))?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment_key::CommitmentKey;
    use crate::elgamal::KeyPair;
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};
    use crate::hashing::HashService;

    fn setup(n: usize, m: usize) -> (GqGroup, CommitmentKey<GqGroup>, crate::elgamal::PublicKey<GqGroup>, HashService) {
        let mut rng = OsRandomSource;
        let group = GqGroup::large_safe_prime_group();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, n.max(1)).unwrap();
        let key_pair = KeyPair::generate(&group, 1, &mut rng).unwrap();
        let _ = m;
        (group, ck, key_pair.public_key().clone(), hash_service)
    }

    #[test]
    fn honest_zero_relation_verifies() {
        let (group, ck, pk, hash_service) = setup(3, 2);
        let field = group.exponent_field();
        let mut rng = OsRandomSource;
        let m = 2usize;
        let n = 3usize;

        // Build A with an all-zero last column-pairing trick: choose B
        // freely, A freely except the star-product sums to zero overall
        // by picking A's last entry to cancel. Simplest honest witness:
        // make A the zero matrix, so the relation holds for any B.
        let a_rows: Vec<Vec<_>> = (0..n).map(|_| (0..m).map(|_| field.zero()).collect()).collect();
        let b_rows: Vec<Vec<_>> = (0..n).map(|_| (0..m).map(|_| field.random(&mut rng)).collect()).collect();
        let a = GroupMatrix::from_rows(a_rows).unwrap();
        let b = GroupMatrix::from_rows(b_rows).unwrap();
        let r: Vec<_> = (0..m).map(|_| field.random(&mut rng)).collect();
        let s: Vec<_> = (0..m).map(|_| field.random(&mut rng)).collect();

        let c_a: Vec<_> = (0..m)
            .map(|i| commit(&group, &ck, &column(&a, i), &r[i]).unwrap())
            .collect();
        let c_b: Vec<_> = (0..m)
            .map(|i| commit(&group, &ck, &column(&b, i), &s[i]).unwrap())
            .collect();
        let y = field.random(&mut rng);

        let statement = ZeroStatement::new(c_a, c_b, y).unwrap();
        let witness = ZeroWitness::new(a, b, r, s).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument).unwrap();
        assert!(result.is_verified(), "{:?}", result.reasons());
    }
}
