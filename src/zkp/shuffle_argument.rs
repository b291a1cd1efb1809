//! Shuffle argument (C11, §4.11): the top-level composition. Proves `C'`
//! is a permutation of `C`, re-randomized under a committed permutation,
//! by reducing to one product-argument call (the committed values really
//! are a permutation of `0..N-1`) and one multi-exponentiation-argument
//! call (the output ciphertexts really are the permuted-and-re-randomized
//! input). Grounded on `src/zkp/shuffle.rs`'s overall shape, generalized
//! from its single monolithic Schnorr-style proof into the Bayer-Groth
//! product/multi-exponentiation composition.

use crate::commitment::{commit, commit_matrix};
use crate::commitment_key::{hashable_commitment_key, CommitmentKey};
use crate::elgamal::{
    ciphertext_vector_exponentiation, hashable_ciphertext, hashable_public_key, identity_ciphertext, Ciphertext,
    PublicKey,
};
use crate::error::{CoreError, CoreResult, VerificationResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::hashing::{hashable_element, Hashable};
use crate::matrix::GroupMatrix;
use crate::permutation::{self, Permutation};
use crate::vector::GroupVector;
use crate::zkp::context::ArgumentContext;
use crate::zkp::multi_exponentiation_argument::{
    self, MultiExponentiationArgument, MultiExponentiationStatement, MultiExponentiationWitness,
};
use crate::zkp::product_argument::{self, ProductArgument, ProductStatement, ProductWitness};
use crate::zkp::powers;

/// Decomposes `big_n = m * n` with `m` the largest divisor of `big_n`
/// not exceeding `floor(sqrt(big_n))`, searched downward; falls back to
/// `m = 1` when `big_n` is prime.
pub fn decompose(big_n: usize) -> (usize, usize) {
    let mut s = (big_n as f64).sqrt() as usize;
    while (s + 1) * (s + 1) <= big_n {
        s += 1;
    }
    while s > 0 && s * s > big_n {
        s -= 1;
    }
    for m in (1..=s.max(1)).rev() {
        if big_n % m == 0 {
            return (m, big_n / m);
        }
    }
    (1, big_n)
}

pub struct ShuffleStatement<G: Group> {
    pub c: Vec<Ciphertext<G>>,
    pub c_prime: Vec<Ciphertext<G>>,
}

impl<G: Group> ShuffleStatement<G> {
    pub fn new(c: Vec<Ciphertext<G>>, c_prime: Vec<Ciphertext<G>>) -> CoreResult<Self> {
        if c.len() != c_prime.len() {
            return Err(CoreError::new("shuffle argument: C and C' must have equal length N"));
        }
        if c.is_empty() {
            return Err(CoreError::new("shuffle argument: N must be at least 2"));
        }
        let l = c[0].l();
        if c.iter().chain(c_prime.iter()).any(|ct| ct.l() != l) {
            return Err(CoreError::new("shuffle argument: every ciphertext must share the same size l"));
        }
        Ok(ShuffleStatement { c, c_prime })
    }

    pub fn n(&self) -> usize {
        self.c.len()
    }

    pub fn l(&self) -> usize {
        self.c[0].l()
    }
}

pub struct ShuffleWitness<G: Group> {
    pub permutation: Permutation,
    pub rho: Vec<<G::Field as Field>::Element>,
}

impl<G: Group> ShuffleWitness<G> {
    pub fn new(permutation: Permutation, rho: Vec<<G::Field as Field>::Element>) -> CoreResult<Self> {
        if rho.len() != permutation.n() {
            return Err(CoreError::new("shuffle argument: rho must have one entry per ciphertext"));
        }
        Ok(ShuffleWitness { permutation, rho })
    }
}

pub struct ShuffleArgument<G: Group> {
    pub c_a: Vec<G::Element>,
    pub c_b: Vec<G::Element>,
    pub product_argument: ProductArgument<G>,
    pub multi_exp_argument: MultiExponentiationArgument<G>,
}

impl<G: Group> ShuffleArgument<G> {
    pub fn m(&self) -> usize {
        self.c_a.len()
    }
}

fn hashable_ciphertexts<G: Group>(ciphertexts: &[Ciphertext<G>]) -> Hashable {
    Hashable::List(ciphertexts.iter().map(hashable_ciphertext).collect())
}

fn hashable_elements<G: Group>(elements: &[G::Element]) -> Hashable {
    Hashable::List(elements.iter().map(hashable_element).collect())
}

fn base_transcript<G: Group>(
    ctx: &ArgumentContext<'_, G>,
    statement: &ShuffleStatement<G>,
    c_a: &[G::Element],
) -> Vec<Hashable> {
    vec![
        Hashable::BigInt(ctx.group.p().clone()),
        Hashable::BigInt(ctx.group.q().clone()),
        hashable_public_key(ctx.pk),
        hashable_commitment_key(ctx.ck),
        hashable_ciphertexts(&statement.c),
        hashable_ciphertexts(&statement.c_prime),
        hashable_elements::<G>(c_a),
    ]
}

fn neg_z_matrix<F: FieldElement + Clone>(z: &F, field: &impl Field<Element = F>, n: usize, m: usize) -> GroupMatrix<F> {
    let neg_z = field.zero().subtract(z);
    GroupMatrix::from_rows(vec![vec![neg_z; m]; n]).expect("uniform row lengths")
}

pub fn prove<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &ShuffleStatement<G>,
    witness: &ShuffleWitness<G>,
    m: usize,
    n: usize,
    rng: &mut dyn RandomSource,
) -> CoreResult<ShuffleArgument<G>> {
    let field = ctx.group.exponent_field();
    let big_n = statement.n();
    if m * n != big_n {
        return Err(CoreError::new(format!(
            "shuffle argument: m*n = {} does not match N = {}",
            m * n,
            big_n
        )));
    }
    if witness.permutation.n() != big_n {
        return Err(CoreError::new("shuffle argument: permutation size must equal N"));
    }
    if statement.l() > ctx.pk.size() {
        return Err(CoreError::new("shuffle argument: ciphertext size l exceeds the public key size"));
    }

    let recomputed = permutation::shuffle(ctx.group, ctx.pk, &statement.c, &witness.permutation, &witness.rho)?;
    if recomputed != statement.c_prime {
        return Err(CoreError::new(
            "shuffle argument: Enc(1_l, rho_i, pk) * C[psi(i)] does not equal C'[i] for all i",
        ));
    }

    let perm_vec: Vec<_> = (0..big_n)
        .map(|i| field.from_u64(witness.permutation.at(i) as u64))
        .collect();
    let a_matrix = GroupVector::new(perm_vec)?.to_matrix(m, n)?.transpose();
    let r: Vec<_> = (0..m).map(|_| field.random(rng)).collect();
    let c_a = commit_matrix(ctx.group, ctx.ck, &a_matrix, &r)?;

    let x = ctx.hash_service.challenge(&field, &base_transcript(&ctx, statement, &c_a))?;
    let x_powers = powers(&field, &x, big_n.max(1) - 1);

    let b_vec: Vec<_> = (0..big_n).map(|i| x_powers[witness.permutation.at(i)].clone()).collect();
    let b_matrix = GroupVector::new(b_vec.clone())?.to_matrix(m, n)?.transpose();
    let s: Vec<_> = (0..m).map(|_| field.random(rng)).collect();
    let c_b = commit_matrix(ctx.group, ctx.ck, &b_matrix, &s)?;

    let mut y_transcript = vec![hashable_elements::<G>(&c_b)];
    y_transcript.extend(base_transcript(&ctx, statement, &c_a));
    let y = ctx.hash_service.challenge(&field, &y_transcript)?;

    let mut z_transcript = vec![Hashable::from("1"), hashable_elements::<G>(&c_b)];
    z_transcript.extend(base_transcript(&ctx, statement, &c_a));
    let z = ctx.hash_service.challenge(&field, &z_transcript)?;
    log::trace!("shuffle argument: challenges x, y, z derived for N={big_n}");

    let neg_z = neg_z_matrix(&z, &field, n, m);
    let zero_m = vec![field.zero(); m];
    let c_neg_z = commit_matrix(ctx.group, ctx.ck, &neg_z, &zero_m)?;

    let c_d: Vec<_> = (0..m)
        .map(|i| c_a[i].exponentiate(&y).multiply(&c_b[i]))
        .collect::<CoreResult<Vec<_>>>()?;
    let d_matrix = GroupMatrix::from_rows(
        (0..n)
            .map(|row| {
                (0..m)
                    .map(|col| y.multiply(a_matrix.get(row, col)).add(b_matrix.get(row, col)))
                    .collect()
            })
            .collect(),
    )?;
    let t: Vec<_> = (0..m).map(|i| y.multiply(&r[i]).add(&s[i])).collect();

    let b_scalar = (0..big_n).fold(field.one(), |acc, i| {
        let term = y.multiply(&field.from_u64(i as u64)).add(&x_powers[i]).subtract(&z);
        acc.multiply(&term)
    });

    let product_c_a: Vec<_> = (0..m).map(|i| c_d[i].multiply(&c_neg_z[i])).collect::<CoreResult<Vec<_>>>()?;
    let product_a_matrix = GroupMatrix::from_rows(
        (0..n)
            .map(|row| (0..m).map(|col| d_matrix.get(row, col).add(neg_z.get(row, col))).collect())
            .collect(),
    )?;
    let product_statement = ProductStatement::new(product_c_a, b_scalar)?;
    let product_witness = ProductWitness::new(product_a_matrix, t)?;
    let product_argument = product_argument::prove(ctx, &product_statement, &product_witness, rng)?;

    let rho_sum = (0..big_n).fold(field.zero(), |acc, i| acc.subtract(&witness.rho[i].multiply(&b_vec[i])));
    let identity_c = identity_ciphertext(ctx.group, statement.l());
    let c_hat = ciphertext_vector_exponentiation(&statement.c, &x_powers[..big_n], &identity_c)?;
    let c_prime_matrix = GroupMatrix::from_rows(statement.c_prime.chunks(n).map(|row| row.to_vec()).collect())?;
    let multi_exp_statement = MultiExponentiationStatement::new(c_prime_matrix, c_hat, c_b.clone())?;
    let multi_exp_witness = MultiExponentiationWitness::new(b_matrix, s, rho_sum)?;
    let multi_exp_argument = multi_exponentiation_argument::prove(ctx, &multi_exp_statement, &multi_exp_witness, rng)?;

    Ok(ShuffleArgument {
        c_a,
        c_b,
        product_argument,
        multi_exp_argument,
    })
}

pub fn verify<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &ShuffleStatement<G>,
    argument: &ShuffleArgument<G>,
    m: usize,
    n: usize,
) -> CoreResult<VerificationResult> {
    let field = ctx.group.exponent_field();
    let big_n = statement.n();
    if m * n != big_n {
        return Err(CoreError::new(format!(
            "shuffle argument: m*n = {} does not match N = {}",
            m * n,
            big_n
        )));
    }
    if argument.c_a.len() != m || argument.c_b.len() != m {
        return Err(CoreError::new("shuffle argument: c_A and c_B must have length m"));
    }
    if statement.l() > ctx.pk.size() {
        return Err(CoreError::new("shuffle argument: ciphertext size l exceeds the public key size"));
    }

    let x = ctx.hash_service.challenge(&field, &base_transcript(&ctx, statement, &argument.c_a))?;
    let x_powers = powers(&field, &x, big_n.max(1) - 1);

    let mut y_transcript = vec![hashable_elements::<G>(&argument.c_b)];
    y_transcript.extend(base_transcript(&ctx, statement, &argument.c_a));
    let y = ctx.hash_service.challenge(&field, &y_transcript)?;

    let mut z_transcript = vec![Hashable::from("1"), hashable_elements::<G>(&argument.c_b)];
    z_transcript.extend(base_transcript(&ctx, statement, &argument.c_a));
    let z = ctx.hash_service.challenge(&field, &z_transcript)?;
    log::trace!("shuffle argument: re-derived challenges x, y, z for N={big_n} during verification");

    let neg_z = neg_z_matrix(&z, &field, n, m);
    let zero_m = vec![field.zero(); m];
    let c_neg_z = commit_matrix(ctx.group, ctx.ck, &neg_z, &zero_m)?;

    let c_d: Vec<_> = (0..m)
        .map(|i| argument.c_a[i].exponentiate(&y).multiply(&argument.c_b[i]))
        .collect::<CoreResult<Vec<_>>>()?;

    let b_scalar = (0..big_n).fold(field.one(), |acc, i| {
        let term = y.multiply(&field.from_u64(i as u64)).add(&x_powers[i]).subtract(&z);
        acc.multiply(&term)
    });

    let product_c_a: Vec<_> = (0..m).map(|i| c_d[i].multiply(&c_neg_z[i])).collect::<CoreResult<Vec<_>>>()?;
    let product_statement = ProductStatement::new(product_c_a, b_scalar)?;
    let product_result = product_argument::verify(ctx, &product_statement, &argument.product_argument)?;

    let identity_c = identity_ciphertext(ctx.group, statement.l());
    let c_hat = ciphertext_vector_exponentiation(&statement.c, &x_powers[..big_n], &identity_c)?;
    let c_prime_matrix = GroupMatrix::from_rows(statement.c_prime.chunks(n).map(|row| row.to_vec()).collect())?;
    let multi_exp_statement = MultiExponentiationStatement::new(c_prime_matrix, c_hat, argument.c_b.clone())?;
    let multi_exp_result = multi_exponentiation_argument::verify(ctx, &multi_exp_statement, &argument.multi_exp_argument)?;

    Ok(VerificationResult::verified().and(product_result).and(multi_exp_result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment_key::CommitmentKey;
    use crate::elgamal::{KeyPair, Message};
    use crate::group::integer_mod_p::{GqGroup, OsRandomSource};
    use crate::hashing::HashService;

    fn setup(n_cols: usize, l: usize) -> (GqGroup, CommitmentKey<GqGroup>, PublicKey<GqGroup>, HashService) {
        let mut rng = OsRandomSource;
        let group = GqGroup::large_safe_prime_group();
        let hash_service = HashService::new();
        let ck = CommitmentKey::derive(&group, &hash_service, n_cols).unwrap();
        let key_pair = KeyPair::generate(&group, l, &mut rng).unwrap();
        (group, ck, key_pair.public_key().clone(), hash_service)
    }

    fn random_ciphertexts(
        group: &GqGroup,
        pk: &PublicKey<GqGroup>,
        count: usize,
        l: usize,
        rng: &mut OsRandomSource,
    ) -> Vec<Ciphertext<GqGroup>> {
        let field = group.exponent_field();
        (0..count)
            .map(|_| {
                let values: Vec<_> = (0..l).map(|_| group.generator().exponentiate(&field.random(rng))).collect();
                let message = Message::new(values).unwrap();
                Ciphertext::encrypt(group, pk, &message, &field.random(rng)).unwrap()
            })
            .collect()
    }

    #[test]
    fn honest_shuffle_verifies_with_nonprime_decomposition() {
        let big_n = 4;
        let (m, n) = decompose(big_n);
        assert_eq!((m, n), (2, 2));
        let l = 2;
        let (group, ck, pk, hash_service) = setup(n, l);
        let mut rng = OsRandomSource;
        let field = group.exponent_field();

        let c = random_ciphertexts(&group, &pk, big_n, l, &mut rng);
        let permutation = Permutation::new(vec![2, 0, 3, 1]).unwrap();
        let rho: Vec<_> = (0..big_n).map(|_| field.random(&mut rng)).collect();
        let c_prime = permutation::shuffle(&group, &pk, &c, &permutation, &rho).unwrap();

        let statement = ShuffleStatement::new(c, c_prime).unwrap();
        let witness = ShuffleWitness::new(permutation, rho).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, m, n, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument, m, n).unwrap();
        assert!(result.is_verified(), "{:?}", result.reasons());
    }

    #[test]
    fn honest_shuffle_verifies_with_prime_decomposition() {
        let big_n = 5;
        let (m, n) = decompose(big_n);
        assert_eq!((m, n), (1, 5));
        let l = 1;
        let (group, ck, pk, hash_service) = setup(n, l);
        let mut rng = OsRandomSource;
        let field = group.exponent_field();

        let c = random_ciphertexts(&group, &pk, big_n, l, &mut rng);
        let permutation = Permutation::new(vec![4, 2, 0, 3, 1]).unwrap();
        let rho: Vec<_> = (0..big_n).map(|_| field.random(&mut rng)).collect();
        let c_prime = permutation::shuffle(&group, &pk, &c, &permutation, &rho).unwrap();

        let statement = ShuffleStatement::new(c, c_prime).unwrap();
        let witness = ShuffleWitness::new(permutation, rho).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement, &witness, m, n, &mut rng).unwrap();
        let result = verify(ctx, &statement, &argument, m, n).unwrap();
        assert!(result.is_verified(), "{:?}", result.reasons());
    }

    #[test]
    fn tampered_c_prime_fails_verification() {
        let big_n = 4;
        let (m, n) = decompose(big_n);
        let l = 1;
        let (group, ck, pk, hash_service) = setup(n, l);
        let mut rng = OsRandomSource;
        let field = group.exponent_field();

        let c = random_ciphertexts(&group, &pk, big_n, l, &mut rng);
        let permutation = Permutation::new(vec![2, 0, 3, 1]).unwrap();
        let rho: Vec<_> = (0..big_n).map(|_| field.random(&mut rng)).collect();
        let mut c_prime = permutation::shuffle(&group, &pk, &c, &permutation, &rho).unwrap();
        let h = ck.h().clone();
        c_prime[0] = c_prime[0]
            .multiply(&Ciphertext::encrypt(&group, &pk, &Message::constant(h, l).unwrap(), &field.zero()).unwrap())
            .unwrap();

        let statement_honest = ShuffleStatement::new(c.clone(), permutation::shuffle(&group, &pk, &c, &permutation, &rho).unwrap()).unwrap();
        let witness = ShuffleWitness::new(permutation.clone(), rho.clone()).unwrap();
        let ctx = ArgumentContext { group: &group, pk: &pk, ck: &ck, hash_service: &hash_service };
        let argument = prove(ctx, &statement_honest, &witness, m, n, &mut rng).unwrap();

        let tampered_statement = ShuffleStatement::new(c, c_prime).unwrap();
        let result = verify(ctx, &tampered_statement, &argument, m, n).unwrap();
        assert!(!result.is_verified());
    }
}
