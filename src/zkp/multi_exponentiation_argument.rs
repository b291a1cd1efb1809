//! Multi-exponentiation argument (C10, §4.10): proves a committed `n x
//! m` exponent matrix `A`, combined with a fresh re-encryption `rho`,
//! multi-exponentiates an `m x n` ciphertext matrix into a claimed
//! ciphertext `C`. This is the argument the shuffle argument (C11) uses
//! to show the *output* ciphertexts are a correct re-encrypted
//! recombination of the *input* ciphertexts under the committed
//! permutation matrix.

use crate::commitment::commit;
use crate::elgamal::{ciphertext_vector_exponentiation, hashable_ciphertext, identity_ciphertext, Ciphertext};
use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::hashing::{hashable_element, Hashable};
use crate::matrix::GroupMatrix;
use crate::zkp::context::ArgumentContext;
use crate::zkp::powers;

pub struct MultiExponentiationStatement<G: Group> {
    pub c_matrix: GroupMatrix<Ciphertext<G>>,
    pub c: Ciphertext<G>,
    pub c_a: Vec<G::Element>,
}

impl<G: Group> MultiExponentiationStatement<G> {
    pub fn new(
        c_matrix: GroupMatrix<Ciphertext<G>>,
        c: Ciphertext<G>,
        c_a: Vec<G::Element>,
    ) -> CoreResult<Self> {
        if c_matrix.num_rows() != c_a.len() {
            return Err(CoreError::new(
                "multi-exponentiation argument: the ciphertext matrix must have one row per c_A entry",
            ));
        }
        if c_matrix.num_rows() == 0 || c_matrix.num_columns() == 0 {
            return Err(CoreError::new(
                "multi-exponentiation argument: the ciphertext matrix must be non-empty",
            ));
        }
        Ok(MultiExponentiationStatement { c_matrix, c, c_a })
    }

    pub fn m(&self) -> usize {
        self.c_a.len()
    }

    pub fn n(&self) -> usize {
        self.c_matrix.num_columns()
    }

    pub fn l(&self) -> usize {
        self.c.l()
    }
}

pub struct MultiExponentiationWitness<G: Group> {
    pub a: GroupMatrix<<G::Field as Field>::Element>,
    pub r: Vec<<G::Field as Field>::Element>,
    pub rho: <G::Field as Field>::Element,
}

impl<G: Group> MultiExponentiationWitness<G> {
    pub fn new(
        a: GroupMatrix<<G::Field as Field>::Element>,
        r: Vec<<G::Field as Field>::Element>,
        rho: <G::Field as Field>::Element,
    ) -> CoreResult<Self> {
        if a.num_columns() != r.len() {
            return Err(CoreError::new("multi-exponentiation argument: r must have length m"));
        }
        Ok(MultiExponentiationWitness { a, r, rho })
    }
}

#[derive(Clone)]
pub struct MultiExponentiationArgument<G: Group> {
    pub c_a0: G::Element,
    pub c_b: Vec<G::Element>,
    pub e: Vec<Ciphertext<G>>,
    pub a: Vec<<G::Field as Field>::Element>,
    pub r: <G::Field as Field>::Element,
    pub b: <G::Field as Field>::Element,
    pub s: <G::Field as Field>::Element,
    pub tau: <G::Field as Field>::Element,
}

impl<G: Group> MultiExponentiationArgument<G> {
    /// Recovers `m` from the shape of `c_B`/`E`: both have length `2m`.
    pub fn m(&self) -> usize {
        self.c_b.len() / 2
    }
}

fn hashable_elements<G: Group>(elements: &[G::Element]) -> Hashable {
    Hashable::List(elements.iter().map(hashable_element).collect())
}

fn hashable_ciphertexts<G: Group>(ciphertexts: &[Ciphertext<G>]) -> Hashable {
    Hashable::List(ciphertexts.iter().map(hashable_ciphertext).collect())
}

fn hashable_ciphertext_matrix<G: Group>(matrix: &GroupMatrix<Ciphertext<G>>) -> Hashable {
    Hashable::List(matrix.rows().iter().map(|row| hashable_ciphertexts(row)).collect())
}

/// Augmented exponent matrix `Abar = [a0 | A]`: column `0` is `a0`,
/// columns `1..=m` are `A`'s columns `0..m-1`.
fn augmented_column<F: Clone>(a0: &[F], a: &GroupMatrix<F>, i: usize) -> Vec<F> {
    if i == 0 {
        a0.to_vec()
    } else {
        a.get_column(i - 1)
    }
}

pub fn prove<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &MultiExponentiationStatement<G>,
    witness: &MultiExponentiationWitness<G>,
    rng: &mut dyn RandomSource,
) -> CoreResult<MultiExponentiationArgument<G>> {
    let field = ctx.group.exponent_field();
    let m = statement.m();
    let n = statement.n();
    let l = statement.l();
    let identity_c = identity_ciphertext(ctx.group, l);

    let a0: Vec<_> = (0..n).map(|_| field.random(rng)).collect();
    let r0 = field.random(rng);
    let c_a0 = commit(ctx.group, ctx.ck, &a0, &r0)?;

    let two_m = 2 * m;
    let mut b: Vec<_> = (0..two_m).map(|_| field.random(rng)).collect();
    let mut s: Vec<_> = (0..two_m).map(|_| field.random(rng)).collect();
    let mut tau: Vec<_> = (0..two_m).map(|_| field.random(rng)).collect();
    b[m] = field.zero();
    s[m] = field.zero();
    tau[m] = witness.rho.clone();

    let c_b: Vec<G::Element> = (0..two_m)
        .map(|k| commit(ctx.group, ctx.ck, std::slice::from_ref(&b[k]), &s[k]))
        .collect::<CoreResult<Vec<_>>>()?;

    // D_k: the product, over every (i, j) with 0 <= i <= m-1, 0 <= j <= m,
    // j - i = k - m + 1, of row_i(c_matrix) raised componentwise to
    // col_j(Abar).
    let mut d: Vec<Ciphertext<G>> = Vec::with_capacity(two_m);
    for k in 0..two_m {
        let mut acc = identity_c.clone();
        for i in 0..m {
            let j = k as i64 - m as i64 + i as i64 + 1;
            if j < 0 || j > m as i64 {
                continue;
            }
            let col = augmented_column(&a0, &witness.a, j as usize);
            let term = ciphertext_vector_exponentiation(statement.c_matrix.get_row(i), &col, &identity_c)?;
            acc = acc.multiply(&term)?;
        }
        d.push(acc);
    }

    let e: Vec<Ciphertext<G>> = (0..two_m)
        .map(|k| {
            let g_bk = crate::elgamal::Message::constant(ctx.group.generator().exponentiate(&b[k]), l)?;
            let blinding = Ciphertext::encrypt(ctx.group, ctx.pk, &g_bk, &tau[k])?;
            blinding.multiply(&d[k])
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let x = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_ciphertext_matrix(&statement.c_matrix),
            hashable_ciphertext(&statement.c),
            hashable_elements::<G>(&statement.c_a),
            hashable_element(&c_a0),
            hashable_elements::<G>(&c_b),
            hashable_ciphertexts(&e),
        ],
    )?;
    let x_powers = powers(&field, &x, two_m.max(m));

    let r_bar: Vec<_> = std::iter::once(r0).chain(witness.r.iter().cloned()).collect();
    let a_out: Vec<_> = (0..n)
        .map(|row| {
            let mut acc = field.zero();
            for i in 0..=m {
                let col = augmented_column(&a0, &witness.a, i);
                acc = acc.add(&x_powers[i].multiply(&col[row]));
            }
            acc
        })
        .collect();
    let r_out = (0..=m).fold(field.zero(), |acc, i| acc.add(&x_powers[i].multiply(&r_bar[i])));
    let b_out = (0..two_m).fold(field.zero(), |acc, k| acc.add(&x_powers[k].multiply(&b[k])));
    let s_out = (0..two_m).fold(field.zero(), |acc, k| acc.add(&x_powers[k].multiply(&s[k])));
    let tau_out = (0..two_m).fold(field.zero(), |acc, k| acc.add(&x_powers[k].multiply(&tau[k])));

    Ok(MultiExponentiationArgument {
        c_a0,
        c_b,
        e,
        a: a_out,
        r: r_out,
        b: b_out,
        s: s_out,
        tau: tau_out,
    })
}

pub fn verify<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &MultiExponentiationStatement<G>,
    argument: &MultiExponentiationArgument<G>,
) -> CoreResult<crate::error::VerificationResult> {
    use crate::error::VerificationResult;

    let field = ctx.group.exponent_field();
    let m = statement.m();
    let n = statement.n();
    let l = statement.l();
    if argument.c_b.len() != 2 * m || argument.e.len() != 2 * m {
        return Err(CoreError::new(
            "multi-exponentiation argument: c_B and E must have length 2m",
        ));
    }
    if argument.a.len() != n {
        return Err(CoreError::new("multi-exponentiation argument: a must have length n"));
    }

    let identity_c = identity_ciphertext(ctx.group, l);
    let x = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_ciphertext_matrix(&statement.c_matrix),
            hashable_ciphertext(&statement.c),
            hashable_elements::<G>(&statement.c_a),
            hashable_element(&argument.c_a0),
            hashable_elements::<G>(&argument.c_b),
            hashable_ciphertexts(&argument.e),
        ],
    )?;
    let two_m = 2 * m;
    let x_powers = powers(&field, &x, two_m.max(m));

    let mut result = VerificationResult::verified();
    result = result.check(
        argument.c_b[m].equals(ctx.group.identity()),
        "multi-exponentiation argument: c_B[m] must equal the Gq identity",
    );
    result = result.check(
        argument.e[m] == statement.c,
        "multi-exponentiation argument: E[m] must equal C",
    );

    let c_a_bar: Vec<_> = std::iter::once(argument.c_a0.clone())
        .chain(statement.c_a.iter().cloned())
        .collect();
    let mut lhs_a = ctx.group.identity().clone();
    for i in 0..=m {
        lhs_a = lhs_a.multiply(&c_a_bar[i].exponentiate(&x_powers[i]))?;
    }
    let rhs_a = commit(ctx.group, ctx.ck, &argument.a, &argument.r)?;
    result = result.check(lhs_a.equals(&rhs_a), "multi-exponentiation argument: a commitment equation failed");

    let mut lhs_b = ctx.group.identity().clone();
    for k in 0..two_m {
        lhs_b = lhs_b.multiply(&argument.c_b[k].exponentiate(&x_powers[k]))?;
    }
    let rhs_b = commit(ctx.group, ctx.ck, std::slice::from_ref(&argument.b), &argument.s)?;
    result = result.check(lhs_b.equals(&rhs_b), "multi-exponentiation argument: b commitment equation failed");

    let mut lhs_e = identity_c.clone();
    for k in 0..two_m {
        lhs_e = lhs_e.multiply(&argument.e[k].exponentiate(&x_powers[k]))?;
    }
    let message = crate::elgamal::Message::constant(ctx.group.generator().exponentiate(&argument.b), l)?;
    let mut rhs_e = Ciphertext::encrypt(ctx.group, ctx.pk, &message, &argument.tau)?;
    for i in 0..m {
        let scaled: Vec<_> = argument.a.iter().map(|a_j| x_powers[m - i - 1].multiply(a_j)).collect();
        let term = ciphertext_vector_exponentiation(statement.c_matrix.get_row(i), &scaled, &identity_c)?;
        rhs_e = rhs_e.multiply(&term)?;
    }
    result = result.check(lhs_e == rhs_e, "multi-exponentiation argument: ciphertext commitment equation failed");

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment_key::CommitmentKey;
    use crate::elgamal::{KeyPair, Message};
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};
    use crate::hashing::HashService;

    #[test]
    fn honest_multi_exponentiation_relation_verifies() {
        let mut rng = OsRandomSource;
        let group = GqGroup::large_safe_prime_group();
        let field = group.exponent_field();
        let hash_service = HashService::new();
        let m = 2;
        let n = 2;
        let l = 1;
        let ck = CommitmentKey::derive(&group, &hash_service, n).unwrap();
        let key_pair = KeyPair::generate(&group, l, &mut rng).unwrap();
        let pk = key_pair.public_key().clone();

        let c_matrix_rows: Vec<Vec<_>> = (0..m)
            .map(|_| {
                (0..n)
                    .map(|_| {
                        let msg = Message::constant(group.generator().exponentiate(&field.random(&mut rng)), l).unwrap();
                        Ciphertext::encrypt(&group, &pk, &msg, &field.random(&mut rng)).unwrap()
                    })
                    .collect()
            })
            .collect();
        let c_matrix = GroupMatrix::from_rows(c_matrix_rows).unwrap();

        let a_rows: Vec<Vec<_>> = (0..n)
            .map(|_| (0..m).map(|_| field.random(&mut rng)).collect())
            .collect();
        let a = GroupMatrix::from_rows(a_rows).unwrap();
        let r: Vec<_> = (0..m).map(|_| field.random(&mut rng)).collect();
        let rho = field.random(&mut rng);

        let identity_c = identity_ciphertext(&group, l);
        let mut product = identity_c.clone();
        for i in 0..m {
            let term = ciphertext_vector_exponentiation(c_matrix.get_row(i), &a.get_column(i), &identity_c).unwrap();
            product = product.multiply(&term).unwrap();
        }
        let blinding = Ciphertext::encrypt(&group, &pk, &Message::ones(&group, l).unwrap(), &rho).unwrap();
        let c = blinding.multiply(&product).unwrap();

        let c_a: Vec<_> = (0..m)
            .map(|i| crate::commitment::commit(&group, &ck, &a.get_column(i), &r[i]).unwrap())
            .collect();

        let statement = MultiExponentiationStatement::new(c_matrix, c, c_a).unwrap();
        let witness = MultiExponentiationWitness::new(a, r, rho).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument).unwrap();
        assert!(result.is_verified(), "{:?}", result.reasons());
    }
}
