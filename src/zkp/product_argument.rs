//! Product argument (C9, §4.9): proves the product of every entry of a
//! committed `n x m` exponent matrix equals a claimed scalar `b`,
//! combining the Hadamard argument (columns multiply out to a vector)
//! with the single-value product argument (that vector's entries
//! multiply out to `b`). Degenerates to the single-value product
//! argument alone when `m = 1`, since there is then only one column and
//! no Hadamard reduction to perform.

use crate::commitment::commit;
use crate::error::{CoreError, CoreResult};
use crate::group::{Field, FieldElement, Group, GroupElement, RandomSource};
use crate::matrix::GroupMatrix;
use crate::zkp::context::ArgumentContext;
use crate::zkp::hadamard_argument::{self, HadamardArgument, HadamardStatement, HadamardWitness};
use crate::zkp::single_value_product_argument::{
    self, SingleValueProductArgument, SingleValueProductStatement, SingleValueProductWitness,
};

pub struct ProductStatement<G: Group> {
    pub c_a: Vec<G::Element>,
    pub b: <G::Field as Field>::Element,
}

impl<G: Group> ProductStatement<G> {
    pub fn new(c_a: Vec<G::Element>, b: <G::Field as Field>::Element) -> CoreResult<Self> {
        if c_a.is_empty() {
            return Err(CoreError::new("product argument: c_A must have at least one column"));
        }
        Ok(ProductStatement { c_a, b })
    }

    pub fn m(&self) -> usize {
        self.c_a.len()
    }
}

pub struct ProductWitness<G: Group> {
    pub a: GroupMatrix<<G::Field as Field>::Element>,
    pub r: Vec<<G::Field as Field>::Element>,
}

impl<G: Group> ProductWitness<G> {
    pub fn new(
        a: GroupMatrix<<G::Field as Field>::Element>,
        r: Vec<<G::Field as Field>::Element>,
    ) -> CoreResult<Self> {
        if a.num_rows() < 2 {
            return Err(CoreError::new("product argument: n must be at least 2"));
        }
        if a.num_columns() != r.len() {
            return Err(CoreError::new("product argument: r must have length m"));
        }
        Ok(ProductWitness { a, r })
    }
}

/// Either branch of §4.9: `m > 1` carries a Hadamard reduction down to a
/// single committed vector, `m = 1` skips straight to the single-value
/// product argument on the lone column.
pub enum ProductArgument<G: Group> {
    Composed {
        c_b: G::Element,
        hadamard_argument: HadamardArgument<G>,
        single_value_product_argument: SingleValueProductArgument<G>,
    },
    SingleColumn {
        single_value_product_argument: SingleValueProductArgument<G>,
    },
}

fn row_products<F: FieldElement + Clone>(a: &GroupMatrix<F>, field: &impl Field<Element = F>) -> Vec<F> {
    (0..a.num_rows())
        .map(|row| {
            a.get_row(row)
                .iter()
                .fold(field.one(), |acc, v| acc.multiply(v))
        })
        .collect()
}

pub fn prove<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &ProductStatement<G>,
    witness: &ProductWitness<G>,
    rng: &mut dyn RandomSource,
) -> CoreResult<ProductArgument<G>> {
    let field = ctx.group.exponent_field();
    let m = statement.m();
    if witness.a.num_columns() != m {
        return Err(CoreError::new("product argument: witness column count must equal |c_A|"));
    }

    if m > 1 {
        let b_vector = row_products(&witness.a, &field);
        let s = field.random(rng);
        let c_b = commit(ctx.group, ctx.ck, &b_vector, &s)?;

        let hadamard_statement = HadamardStatement::new(statement.c_a.clone(), c_b.clone())?;
        let hadamard_witness =
            HadamardWitness::new(witness.a.clone(), b_vector.clone(), witness.r.clone(), s.clone())?;
        let hadamard_argument = hadamard_argument::prove(ctx, &hadamard_statement, &hadamard_witness, rng)?;

        let svp_statement = SingleValueProductStatement::new(c_b.clone(), statement.b.clone());
        let svp_witness = SingleValueProductWitness::new(b_vector, s)?;
        let single_value_product_argument = single_value_product_argument::prove(ctx, &svp_statement, &svp_witness, rng)?;

        Ok(ProductArgument::Composed {
            c_b,
            hadamard_argument,
            single_value_product_argument,
        })
    } else {
        let column = witness.a.get_column(0);
        let svp_statement = SingleValueProductStatement::new(statement.c_a[0].clone(), statement.b.clone());
        let svp_witness = SingleValueProductWitness::new(column, witness.r[0].clone())?;
        let single_value_product_argument = single_value_product_argument::prove(ctx, &svp_statement, &svp_witness, rng)?;
        Ok(ProductArgument::SingleColumn {
            single_value_product_argument,
        })
    }
}

pub fn verify<G: Group>(
    ctx: ArgumentContext<'_, G>,
    statement: &ProductStatement<G>,
    argument: &ProductArgument<G>,
) -> CoreResult<crate::error::VerificationResult> {
    use crate::error::VerificationResult;

    let m = statement.m();
    match argument {
        ProductArgument::Composed {
            c_b,
            hadamard_argument,
            single_value_product_argument,
        } => {
            if m < 2 {
                return Err(CoreError::new(
                    "product argument: a composed argument requires m >= 2",
                ));
            }
            let hadamard_statement = HadamardStatement::new(statement.c_a.clone(), c_b.clone())?;
            let hadamard_result = hadamard_argument::verify(ctx, &hadamard_statement, hadamard_argument)?;

            let svp_statement = SingleValueProductStatement::new(c_b.clone(), statement.b.clone());
            let svp_result = single_value_product_argument::verify(ctx, &svp_statement, single_value_product_argument)?;

            Ok(VerificationResult::verified().and(hadamard_result).and(svp_result))
        }
        ProductArgument::SingleColumn {
            single_value_product_argument,
        } => {
            if m != 1 {
                return Err(CoreError::new(
                    "product argument: a single-column argument requires m == 1",
                ));
            }
            let svp_statement = SingleValueProductStatement::new(statement.c_a[0].clone(), statement.b.clone());
            single_value_product_argument::verify(ctx, &svp_statement, single_value_product_argument)
        }
    }
}
