use super::balancer_error::BalanceError;
use super::equation_parser::Compound;
use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoefficientMode {
    /// smallest whole numbers
    #[default]
    Integer,
    /// smallest coefficient scaled to 1, the others as exact fractions
    Fractional,
}

/// stoichiometric coefficient: whole number or reduced fraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coefficient {
    Integer(BigInt),
    Fraction { num: BigInt, den: BigInt },
}

impl Coefficient {
    /// whole-number ratios become `Integer`, never n/1
    pub fn from_ratio(ratio: BigRational) -> Self {
        if ratio.is_integer() {
            Coefficient::Integer(ratio.to_integer())
        } else {
            Coefficient::Fraction {
                num: ratio.numer().clone(),
                den: ratio.denom().clone(),
            }
        }
    }

    pub fn to_ratio(&self) -> BigRational {
        match self {
            Coefficient::Integer(n) => BigRational::from_integer(n.clone()),
            Coefficient::Fraction { num, den } => BigRational::new(num.clone(), den.clone()),
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Coefficient::Integer(n) if n.is_one())
    }

    pub fn to_latex(&self) -> String {
        match self {
            Coefficient::Integer(n) => n.to_string(),
            Coefficient::Fraction { num, den } => format!("\\frac{{{}}}{{{}}}", num, den),
        }
    }
}

impl fmt::Display for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coefficient::Integer(n) => write!(f, "{}", n),
            Coefficient::Fraction { num, den } => write!(f, "{}/{}", num, den),
        }
    }
}

// JSON number when it fits into i64, decimal string otherwise
struct JsonInteger<'a>(&'a BigInt);

impl Serialize for JsonInteger<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_i64() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.collect_str(self.0),
        }
    }
}

impl Serialize for Coefficient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Coefficient::Integer(n) => JsonInteger(n).serialize(serializer),
            Coefficient::Fraction { num, den } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("num", &JsonInteger(num))?;
                map.serialize_entry("den", &JsonInteger(den))?;
                map.end()
            }
        }
    }
}

/// intermediate values of the integer normalization, kept for the step trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerNormalization {
    /// least common multiple of the denominators
    pub lcm: BigInt,
    /// vector multiplied by the lcm, sign fixed
    pub scaled: Vec<BigInt>,
    /// greatest common divisor of `scaled`
    pub gcd: BigInt,
    pub coefficients: Vec<BigInt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FractionalNormalization {
    /// smallest integer coefficient, every coefficient is divided by it
    pub pivot: BigInt,
    pub coefficients: Vec<Coefficient>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub integer: IntegerNormalization,
    pub fractional: Option<FractionalNormalization>,
    /// final coefficients in the requested mode
    pub coefficients: Vec<Coefficient>,
}

fn compound_name(compounds: &[Compound], i: usize) -> String {
    compounds
        .get(i)
        .map(|c| c.label())
        .unwrap_or_else(|| format!("x{}", i + 1))
}

/// Turns a rational null-space vector into the minimal positive integer solution:
/// clear denominators with their lcm, flip the sign if nothing is positive, require every entry
/// to be strictly positive, divide by the gcd.
pub fn normalize_integer(
    vector: &[BigRational],
    compounds: &[Compound],
) -> Result<IntegerNormalization, BalanceError> {
    let lcm = vector
        .iter()
        .fold(BigInt::one(), |acc, r| acc.lcm(r.denom()));
    let lcm_ratio = BigRational::from_integer(lcm.clone());
    let mut scaled: Vec<BigInt> = vector.iter().map(|r| (r * &lcm_ratio).to_integer()).collect();

    // the null space is closed under negation, so the sign of the basis vector is arbitrary
    if !scaled.iter().any(|x| x.is_positive()) {
        scaled.iter_mut().for_each(|x| *x = -x.clone());
    }
    if let Some(i) = scaled.iter().position(|x| !x.is_positive()) {
        return Err(BalanceError::NonPositiveCoefficient {
            compound: compound_name(compounds, i),
        });
    }

    let gcd = scaled.iter().fold(BigInt::zero(), |acc, x| acc.gcd(x));
    let coefficients: Vec<BigInt> = scaled.iter().map(|x| x / &gcd).collect();
    debug!(
        "lcm of denominators {}, gcd {}, coefficients {:?}",
        lcm,
        gcd,
        coefficients.iter().map(|c| c.to_string()).collect::<Vec<_>>()
    );
    Ok(IntegerNormalization {
        lcm,
        scaled,
        gcd,
        coefficients,
    })
}

/// Divides the minimal integer solution by its smallest entry, so that the smallest
/// coefficient becomes 1 and the others exact fractions.
pub fn normalize_fractional(integers: &[BigInt]) -> FractionalNormalization {
    let pivot = integers.iter().min().cloned().unwrap_or_else(BigInt::one);
    let coefficients = integers
        .iter()
        .map(|c| Coefficient::from_ratio(BigRational::new(c.clone(), pivot.clone())))
        .collect();
    FractionalNormalization {
        pivot,
        coefficients,
    }
}

/// Normalizes the selected null-space vector in the requested mode.
pub fn normalize(
    vector: &[BigRational],
    mode: CoefficientMode,
    compounds: &[Compound],
) -> Result<Normalized, BalanceError> {
    let integer = normalize_integer(vector, compounds)?;
    let (fractional, coefficients) = match mode {
        CoefficientMode::Integer => {
            let coefficients = integer
                .coefficients
                .iter()
                .map(|c| Coefficient::Integer(c.clone()))
                .collect();
            (None, coefficients)
        }
        CoefficientMode::Fractional => {
            let fractional = normalize_fractional(&integer.coefficients);
            let coefficients = fractional.coefficients.clone();
            (Some(fractional), coefficients)
        }
    };
    Ok(Normalized {
        integer,
        fractional,
        coefficients,
    })
}
