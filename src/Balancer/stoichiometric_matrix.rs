use super::balancer_error::{BalanceError, FormulaFault};
use super::equation_parser::{Compound, ParsedEquation, Side};
use super::formula_parser::{ChemicalFormula, parse_formula};
use log::debug;
use nalgebra::DMatrix;
use prettytable::{Cell, Row, Table};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Conservation equation of one element, e.g. "Fe: x1 = 2x3".
/// Terms are (column index, atom count); unknowns are x1..xn in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementEquation {
    pub element: String,
    pub reactant_terms: Vec<(usize, usize)>,
    pub product_terms: Vec<(usize, usize)>,
}

fn render_terms(terms: &[(usize, usize)]) -> String {
    if terms.is_empty() {
        return "0".to_string();
    }
    terms
        .iter()
        .map(|&(col, count)| {
            if count == 1 {
                format!("x{}", col + 1)
            } else {
                format!("{}x{}", count, col + 1)
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

impl fmt::Display for ElementEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} = {}",
            self.element,
            render_terms(&self.reactant_terms),
            render_terms(&self.product_terms)
        )
    }
}

/// Signed element-by-compound matrix of an equation together with its axes.
/// Rows follow the sorted element symbols, columns follow the compounds (reactants first).
/// Reactant entries are positive, product entries negative.
#[derive(Debug, Clone, PartialEq)]
pub struct StoichiometricMatrix {
    pub elements: Vec<String>,
    pub compounds: Vec<Compound>,
    pub compositions: Vec<ChemicalFormula>,
    pub matrix: DMatrix<i64>,
}

/// Parses every compound and fills the stoichiometric matrix.
/// The first formula error is returned as is.
pub fn build_matrix(parsed: &ParsedEquation) -> Result<StoichiometricMatrix, BalanceError> {
    let compounds: Vec<Compound> = parsed.compounds().cloned().collect();
    let compositions = compounds
        .iter()
        .map(|c| parse_formula(&c.formula))
        .collect::<Result<Vec<_>, _>>()?;

    let unique_elements: BTreeSet<&str> = compositions.iter().flat_map(|c| c.elements()).collect();
    let elements: Vec<String> = unique_elements.into_iter().map(|e| e.to_string()).collect();

    let mut matrix = DMatrix::<i64>::zeros(elements.len(), compounds.len());
    for (j, (compound, composition)) in compounds.iter().zip(compositions.iter()).enumerate() {
        for (i, element) in elements.iter().enumerate() {
            let count = composition.count(element);
            let count = i64::try_from(count).map_err(|_| {
                BalanceError::invalid_formula(
                    &compound.formula,
                    &compound.formula,
                    FormulaFault::CountOverflow,
                )
            })?;
            matrix[(i, j)] = match compound.side {
                Side::Reactant => count,
                Side::Product => -count,
            };
        }
    }
    debug!("elements {:?}, stoichiometric matrix {}", elements, matrix);
    Ok(StoichiometricMatrix {
        elements,
        compounds,
        compositions,
        matrix,
    })
}

impl StoichiometricMatrix {
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// matrix as a vector of rows
    pub fn rows(&self) -> Vec<Vec<i64>> {
        (0..self.nrows())
            .map(|i| self.matrix.row(i).iter().copied().collect())
            .collect()
    }

    /// one conservation equation per element, in row order
    pub fn element_equations(&self) -> Vec<ElementEquation> {
        self.elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let mut reactant_terms = Vec::new();
                let mut product_terms = Vec::new();
                for j in 0..self.ncols() {
                    let entry = self.matrix[(i, j)];
                    if entry > 0 {
                        reactant_terms.push((j, entry.unsigned_abs() as usize));
                    } else if entry < 0 {
                        product_terms.push((j, entry.unsigned_abs() as usize));
                    }
                }
                ElementEquation {
                    element: element.clone(),
                    reactant_terms,
                    product_terms,
                }
            })
            .collect()
    }

    /// checks that the matrix maps the coefficient vector to zero
    pub fn conserves(&self, coefficients: &[num_bigint::BigInt]) -> bool {
        if coefficients.len() != self.ncols() {
            return false;
        }
        (0..self.nrows()).all(|i| {
            let sum: num_bigint::BigInt = coefficients
                .iter()
                .enumerate()
                .map(|(j, c)| c * self.matrix[(i, j)])
                .sum();
            sum == num_bigint::BigInt::from(0)
        })
    }

    /// elements as rows, compounds as columns
    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        let mut header_row = vec![Cell::new("Elements/Compounds")];
        for compound in &self.compounds {
            header_row.push(Cell::new(&compound.label()));
        }
        table.add_row(Row::new(header_row));
        for (i, element) in self.elements.iter().enumerate() {
            let mut row = vec![Cell::new(element)];
            for j in 0..self.ncols() {
                row.push(Cell::new(&self.matrix[(i, j)].to_string()));
            }
            table.add_row(Row::new(row));
        }
        table
    }

    /// prints the matrix to the console
    pub fn pretty_print(&self) {
        println!("___________________STOICHIOMETRIC MATRIX________________________");
        self.to_table().printstd();
        println!("_____________________________________________________________");
    }
}
