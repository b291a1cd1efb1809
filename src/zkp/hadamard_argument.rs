//! Hadamard argument (C7, §4.7): proves a committed vector `b` equals
//! the entry-wise (Hadamard) product of every column of a committed
//! matrix `A`, by reducing the claim to a single zero-argument instance.

use crate::commitment::commit;
use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::hashing::{hashable_element, Hashable};
use crate::matrix::GroupMatrix;
use crate::zkp::context::ArgumentContext;
use crate::zkp::zero_argument::{self, ZeroArgument, ZeroStatement, ZeroWitness};

pub struct HadamardStatement<G: Group> {
    pub c_a: Vec<G::Element>,
    pub c_b: G::Element,
}

impl<G: Group> HadamardStatement<G> {
    pub fn new(c_a: Vec<G::Element>, c_b: G::Element) -> CoreResult<Self> {
        if c_a.len() < 2 {
            return Err(CoreError::new("Hadamard argument requires m >= 2"));
        }
        Ok(HadamardStatement { c_a, c_b })
    }

    pub fn m(&self) -> usize {
        self.c_a.len()
    }
}

pub struct HadamardWitness<G: Group> {
    pub a: GroupMatrix<<G::Field as Field>::Element>,
    pub b: Vec<<G::Field as Field>::Element>,
    pub r: Vec<<G::Field as Field>::Element>,
    pub s: <G::Field as Field>::Element,
}

impl<G: Group> HadamardWitness<G> {
    pub fn new(
        a: GroupMatrix<<G::Field as Field>::Element>,
        b: Vec<<G::Field as Field>::Element>,
        r: Vec<<G::Field as Field>::Element>,
        s: <G::Field as Field>::Element,
    ) -> CoreResult<Self> {
        if a.num_rows() != b.len() {
            return Err(CoreError::new("Hadamard argument: b must have length n"));
        }
        if a.num_columns() != r.len() {
            return Err(CoreError::new("Hadamard argument: r must have length m"));
        }
        Ok(HadamardWitness { a, b, r, s })
    }
}

pub struct HadamardArgument<G: Group> {
    pub c_b: Vec<G::Element>,
    pub zero_argument: ZeroArgument<G>,
}

fn hashable_elements<G: Group>(elements: &[G::Element]) -> Hashable {
    Hashable::List(elements.iter().map(hashable_element).collect())
}

fn hadamard_product<F: FieldElement>(a: &[F], b: &[F]) -> Vec<F> {
    a.iter().zip(b.iter()).map(|(x, y)| x.multiply(y)).collect()
}

pub fn prove<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &HadamardStatement<G>,
    witness: &HadamardWitness<G>,
    rng: &mut dyn RandomSource,
) -> CoreResult<HadamardArgument<G>> {
    let field = ctx.group.exponent_field();
    let m = statement.m();
    let n = witness.a.num_rows();

    let mut b_cols: Vec<Vec<_>> = Vec::with_capacity(m);
    b_cols.push(witness.a.get_column(0));
    for j in 1..m {
        let next = hadamard_product(&b_cols[j - 1], &witness.a.get_column(j));
        b_cols.push(next);
    }

    let mut s: Vec<_> = Vec::with_capacity(m);
    s.push(witness.r[0].clone());
    for _ in 1..m - 1 {
        s.push(field.random(rng));
    }
    s.push(witness.s.clone());

    let mut c_b: Vec<G::Element> = Vec::with_capacity(m);
    c_b.push(statement.c_a[0].clone());
    for j in 1..m - 1 {
        c_b.push(commit(ctx.group, ctx.ck, &b_cols[j], &s[j])?);
    }
    c_b.push(statement.c_b.clone());

    let x = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_elements::<G>(&statement.c_a),
            hashable_element(&statement.c_b),
            hashable_elements::<G>(&c_b),
        ],
    )?;
    let y = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::from("1"),
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_elements::<G>(&statement.c_a),
            hashable_element(&statement.c_b),
            hashable_elements::<G>(&c_b),
        ],
    )?;

    let neg_one = field.one().negate();
    let mu: Vec<_> = std::iter::repeat(neg_one).take(n).collect();
    let c_neg1 = commit(ctx.group, ctx.ck, &mu, &field.zero())?;

    let x_powers = crate::zkp::powers(&field, &x, m);

    let zero_c_a: Vec<G::Element> = statement.c_a[1..m]
        .iter()
        .cloned()
        .chain(std::iter::once(c_neg1))
        .collect();

    let mut zero_c_b: Vec<G::Element> = Vec::with_capacity(m);
    for i in 0..m - 1 {
        zero_c_b.push(c_b[i].exponentiate(&x_powers[i + 1]));
    }
    let mut aggregated = ctx.group.identity().clone();
    for i in 1..m {
        aggregated = aggregated.multiply(&c_b[i].exponentiate(&x_powers[i]))?;
    }
    zero_c_b.push(aggregated);

    let zero_statement = ZeroStatement::new(zero_c_a, zero_c_b, y)?;

    let mut d_cols: Vec<Vec<_>> = Vec::with_capacity(m);
    for i in 0..m - 1 {
        d_cols.push(b_cols[i].iter().map(|v| v.multiply(&x_powers[i + 1])).collect());
    }
    let mut final_col = vec![field.zero(); n];
    for i in 1..m {
        for j in 0..n {
            final_col[j] = final_col[j].add(&x_powers[i].multiply(&b_cols[i][j]));
        }
    }
    d_cols.push(final_col);

    let a_without_first: Vec<Vec<_>> = (1..m).map(|i| witness.a.get_column(i)).collect();
    let mut zero_a_cols = a_without_first;
    zero_a_cols.push(mu.clone());

    let zero_a_rows: Vec<Vec<_>> = (0..n)
        .map(|row| zero_a_cols.iter().map(|col| col[row].clone()).collect())
        .collect();
    let zero_a = GroupMatrix::from_rows(zero_a_rows)?;

    let zero_b_rows: Vec<Vec<_>> = (0..n)
        .map(|row| d_cols.iter().map(|col| col[row].clone()).collect())
        .collect();
    let zero_b = GroupMatrix::from_rows(zero_b_rows)?;

    let r_prime: Vec<_> = witness.r[1..m]
        .iter()
        .cloned()
        .chain(std::iter::once(field.zero()))
        .collect();
    let mut s_prime: Vec<_> = Vec::with_capacity(m);
    for i in 0..m - 1 {
        s_prime.push(x_powers[i + 1].multiply(&s[i]));
    }
    let mut s_final = field.zero();
    for i in 1..m {
        s_final = s_final.add(&x_powers[i].multiply(&s[i]));
    }
    s_prime.push(s_final);

    let zero_witness = ZeroWitness::new(zero_a, zero_b, r_prime, s_prime)?;
    let zero_argument = zero_argument::prove(ctx, &zero_statement, &zero_witness, rng)?;

    Ok(HadamardArgument { c_b, zero_argument })
}

pub fn verify<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &HadamardStatement<G>,
    argument: &HadamardArgument<G>,
) -> CoreResult<crate::error::VerificationResult> {
    use crate::error::VerificationResult;

    let field = ctx.group.exponent_field();
    let m = statement.m();
    if argument.c_b.len() != m {
        return Err(CoreError::new("Hadamard argument: c_B must have length m"));
    }

    let x = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_elements::<G>(&statement.c_a),
            hashable_element(&statement.c_b),
            hashable_elements::<G>(&argument.c_b),
        ],
    )?;
    let y = ctx.hash_service.challenge(
        &field,
        &[
            Hashable::from("1"),
            Hashable::BigInt(ctx.group.p().clone()),
            Hashable::BigInt(ctx.group.q().clone()),
            crate::elgamal::hashable_public_key(ctx.pk),
            crate::commitment_key::hashable_commitment_key(ctx.ck),
            hashable_elements::<G>(&statement.c_a),
            hashable_element(&statement.c_b),
            hashable_elements::<G>(&argument.c_b),
        ],
    )?;

    let mut result = VerificationResult::verified();
    result = result.check(
        argument.c_b[0].equals(&statement.c_a[0]),
        "c_B_0 must equal c_A_0",
    );
    result = result.check(
        argument.c_b[m - 1].equals(&statement.c_b),
        "c_B_(m-1) must equal c_b",
    );

    let neg_one = field.one().negate();
    // n is not directly observable from the statement/argument alone in
    // this reduced form; the zero argument's own a'/b' length check
    // enforces consistency, so mu is sized from the zero witness's n at
    // proving time and only needs to match here via the commitment
    // equations the zero argument itself verifies.
    let n_hint = argument.zero_argument.a_prime.len();
    let mu: Vec<_> = std::iter::repeat(neg_one).take(n_hint).collect();
    let c_neg1 = commit(ctx.group, ctx.ck, &mu, &field.zero())?;

    let x_powers = crate::zkp::powers(&field, &x, m);

    let zero_c_a: Vec<G::Element> = statement.c_a[1..m]
        .iter()
        .cloned()
        .chain(std::iter::once(c_neg1))
        .collect();

    let mut zero_c_b: Vec<G::Element> = Vec::with_capacity(m);
    for i in 0..m - 1 {
        zero_c_b.push(argument.c_b[i].exponentiate(&x_powers[i + 1]));
    }
    let mut aggregated = ctx.group.identity().clone();
    for i in 1..m {
        aggregated = aggregated.multiply(&argument.c_b[i].exponentiate(&x_powers[i]))?;
    }
    zero_c_b.push(aggregated);

    let zero_statement = ZeroStatement::new(zero_c_a, zero_c_b, y)?;
    let zero_result = zero_argument::verify(ctx, &zero_statement, &argument.zero_argument)?;
    result = result.and(zero_result);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment_key::CommitmentKey;
    use crate::elgamal::KeyPair;
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};
    use crate::hashing::HashService;

    #[test]
    fn honest_hadamard_relation_verifies() {
        let mut rng = OsRandomSource;
        let group = GqGroup::large_safe_prime_group();
        let field = group.exponent_field();
        let hash_service = HashService::new();
        let n = 3;
        let m = 3;
        let ck = CommitmentKey::derive(&group, &hash_service, n).unwrap();
        let key_pair = KeyPair::generate(&group, 1, &mut rng).unwrap();
        let pk = key_pair.public_key().clone();

        let a_rows: Vec<Vec<_>> = (0..n)
            .map(|row| (0..m).map(|col| field.from_u64((row * m + col + 1) as u64)).collect())
            .collect();
        let a = GroupMatrix::from_rows(a_rows).unwrap();
        let mut b = a.get_column(0);
        for i in 1..m {
            b = hadamard_product(&b, &a.get_column(i));
        }
        let r: Vec<_> = (0..m).map(|_| field.random(&mut rng)).collect();
        let s = field.random(&mut rng);

        let c_a: Vec<_> = (0..m).map(|i| commit(&group, &ck, &a.get_column(i), &r[i]).unwrap()).collect();
        let c_b_commitment = commit(&group, &ck, &b, &s).unwrap();

        let statement = HadamardStatement::new(c_a, c_b_commitment).unwrap();
        let witness = HadamardWitness::new(a, b, r, s).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument).unwrap();
        assert!(result.is_verified(), "{:?}", result.reasons());
    }
}
