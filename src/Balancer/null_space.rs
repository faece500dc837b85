//! Exact null space of an integer matrix.
//!
//! The matrix is brought to reduced row-echelon form over `BigRational`, so a zero produced
//! by elimination is a true zero and the rank is never misjudged. One basis vector is built per
//! free (non-pivot) column: the free unknown is set to 1, the other free unknowns to 0, and every
//! pivot unknown is read off its row of the reduced matrix.
use super::balancer_error::BalanceError;
use log::{debug, warn};
use nalgebra::DMatrix;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// What to do when the equation has more than one independent solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// fail with `BalanceError::AmbiguousSolution`
    #[default]
    Reject,
    /// take the basis vector of the lowest free column
    FirstBasis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NullSpace {
    /// reduced row-echelon form of the matrix
    pub rref: DMatrix<BigRational>,
    pub pivot_columns: Vec<usize>,
    pub free_columns: Vec<usize>,
    /// one vector per free column, in the order of `free_columns`
    pub basis: Vec<Vec<BigRational>>,
}

impl NullSpace {
    pub fn nullity(&self) -> usize {
        self.basis.len()
    }

    /// Picks the vector to balance with. A one-dimensional null space has exactly one
    /// candidate; a larger one is resolved by `policy`.
    pub fn select(&self, policy: AmbiguityPolicy) -> Result<&[BigRational], BalanceError> {
        match (self.nullity(), policy) {
            (0, _) => Err(BalanceError::NoSolution),
            (1, _) => Ok(self.basis[0].as_slice()),
            (nullity, AmbiguityPolicy::Reject) => Err(BalanceError::AmbiguousSolution { nullity }),
            (nullity, AmbiguityPolicy::FirstBasis) => {
                warn!(
                    "null space has dimension {}, using the basis vector of column {}",
                    nullity,
                    self.free_columns[0] + 1
                );
                Ok(self.basis[0].as_slice())
            }
        }
    }
}

/// Gauss-Jordan elimination in exact arithmetic. The pivot of each column is the first
/// nonzero entry at or below the current row. Returns the reduced matrix and the pivot columns.
pub fn reduced_row_echelon(matrix: &DMatrix<i64>) -> (DMatrix<BigRational>, Vec<usize>) {
    let (nrows, ncols) = matrix.shape();
    let mut a: DMatrix<BigRational> = matrix.map(|x| BigRational::from_integer(BigInt::from(x)));
    let mut pivot_columns = Vec::new();
    let mut row = 0;

    for col in 0..ncols {
        if row >= nrows {
            break;
        }
        let Some(selected) = (row..nrows).find(|&r| !a[(r, col)].is_zero()) else {
            continue;
        };
        a.swap_rows(row, selected);

        let pivot = a[(row, col)].clone();
        for c in col..ncols {
            let scaled = &a[(row, c)] / &pivot;
            a[(row, c)] = scaled;
        }
        for r in 0..nrows {
            if r == row || a[(r, col)].is_zero() {
                continue;
            }
            let factor = a[(r, col)].clone();
            for c in col..ncols {
                let reduced = &a[(r, c)] - &factor * &a[(row, c)];
                a[(r, c)] = reduced;
            }
        }
        pivot_columns.push(col);
        row += 1;
    }
    (a, pivot_columns)
}

/// Computes a basis of the null space of the stoichiometric matrix.
/// Fails with `NoSolution` when the matrix has full column rank.
///
/// # Examples
/// ```
/// use Equilibrium::Balancer::null_space::null_space;
/// use nalgebra::DMatrix;
/// use num_rational::BigRational;
/// // Fe + O2 = Fe2O3
/// let matrix = DMatrix::from_row_slice(2, 3, &[1, 0, -2, 0, 2, -3]);
/// let ns = null_space(&matrix).unwrap();
/// assert_eq!(ns.nullity(), 1);
/// assert_eq!(ns.basis[0][1], BigRational::new(3.into(), 2.into()));
/// ```
pub fn null_space(matrix: &DMatrix<i64>) -> Result<NullSpace, BalanceError> {
    let ncols = matrix.ncols();
    let (rref, pivot_columns) = reduced_row_echelon(matrix);
    let free_columns: Vec<usize> = (0..ncols).filter(|c| !pivot_columns.contains(c)).collect();
    debug!(
        "rank {}, pivot columns {:?}, free columns {:?}",
        pivot_columns.len(),
        pivot_columns,
        free_columns
    );
    if free_columns.is_empty() {
        return Err(BalanceError::NoSolution);
    }

    let basis: Vec<Vec<BigRational>> = free_columns
        .iter()
        .map(|&free| {
            let mut vector = vec![BigRational::zero(); ncols];
            vector[free] = BigRational::one();
            // row r reads x_pivot + sum(rref[r][free] * x_free) = 0
            for (r, &pivot) in pivot_columns.iter().enumerate() {
                vector[pivot] = -rref[(r, free)].clone();
            }
            vector
        })
        .collect();

    Ok(NullSpace {
        rref,
        pivot_columns,
        free_columns,
        basis,
    })
}
