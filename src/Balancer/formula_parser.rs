use super::balancer_error::{BalanceError, FormulaFault};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

// element symbol: one uppercase letter, optional lowercase letter, optional subscript
static ELEMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]?)([0-9]*)").unwrap());
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]*").unwrap());

/// Atomic composition of one formula: element symbol -> number of atoms.
/// Counts are always >= 1 and already summed over all groups of the formula.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChemicalFormula(BTreeMap<String, usize>);

impl ChemicalFormula {
    /// number of atoms of the element, 0 if the element is absent
    pub fn count(&self, element: &str) -> usize {
        self.0.get(element).copied().unwrap_or(0)
    }

    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|e| e.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(e, &n)| (e.as_str(), n))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, usize> {
        &self.0
    }
}

impl fmt::Display for ChemicalFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(e, n)| format!("{}: {}", e, n)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

fn add_atoms(
    frame: &mut BTreeMap<String, usize>,
    element: &str,
    count: usize,
    formula: &str,
    fragment: &str,
) -> Result<(), BalanceError> {
    let entry = frame.entry(element.to_string()).or_insert(0);
    *entry = entry
        .checked_add(count)
        .ok_or_else(|| BalanceError::invalid_formula(formula, fragment, FormulaFault::CountOverflow))?;
    Ok(())
}

// an absent subscript means 1
fn subscript(digits: &str, formula: &str, fragment: &str) -> Result<usize, BalanceError> {
    if digits.is_empty() {
        return Ok(1);
    }
    let n: usize = digits
        .parse()
        .map_err(|_| BalanceError::invalid_formula(formula, fragment, FormulaFault::CountOverflow))?;
    if n == 0 {
        return Err(BalanceError::invalid_formula(formula, fragment, FormulaFault::ZeroCount));
    }
    Ok(n)
}

/// Parses a chemical formula such as "Fe2(SO4)3" into its atomic composition.
///
/// The formula is scanned left to right with an explicit stack of partial element maps,
/// one frame per open bracket. A closing bracket pops its frame and merges it into the
/// enclosing one, scaled by the multiplier that follows the bracket, so multipliers of
/// nested groups compose.
///
/// # Examples
/// ```
/// use Equilibrium::Balancer::formula_parser::parse_formula;
/// let composition = parse_formula("Fe2(SO4)3").unwrap();
/// assert_eq!(composition.count("Fe"), 2);
/// assert_eq!(composition.count("S"), 3);
/// assert_eq!(composition.count("O"), 12);
/// ```
pub fn parse_formula(formula: &str) -> Result<ChemicalFormula, BalanceError> {
    let mut current: BTreeMap<String, usize> = BTreeMap::new();
    // enclosing frames together with the position of their opening bracket
    let mut stack: Vec<(usize, BTreeMap<String, usize>)> = Vec::new();
    let mut i = 0;

    while i < formula.len() {
        let rest = &formula[i..];
        if rest.starts_with('(') {
            stack.push((i, std::mem::take(&mut current)));
            i += 1;
        } else if rest.starts_with(')') {
            let digits = DIGIT_RUN.find(&rest[1..]).map_or("", |m| m.as_str());
            let fragment = &rest[..1 + digits.len()];
            let Some((_, mut outer)) = stack.pop() else {
                return Err(BalanceError::invalid_formula(
                    formula,
                    rest,
                    FormulaFault::UnbalancedParenthesis,
                ));
            };
            let multiplier = subscript(digits, formula, fragment)?;
            for (element, count) in std::mem::take(&mut current) {
                let scaled = count.checked_mul(multiplier).ok_or_else(|| {
                    BalanceError::invalid_formula(formula, fragment, FormulaFault::CountOverflow)
                })?;
                add_atoms(&mut outer, &element, scaled, formula, fragment)?;
            }
            current = outer;
            i += fragment.len();
        } else if let Some(caps) = ELEMENT_TOKEN.captures(rest) {
            let token = caps.get(0).map_or("", |m| m.as_str());
            let element = caps.get(1).map_or("", |m| m.as_str());
            let digits = caps.get(2).map_or("", |m| m.as_str());
            let count = subscript(digits, formula, token)?;
            add_atoms(&mut current, element, count, formula, token)?;
            i += token.len();
        } else {
            return Err(BalanceError::invalid_formula(
                formula,
                rest,
                FormulaFault::InvalidSymbol,
            ));
        }
    }

    if let Some((open_at, _)) = stack.first() {
        return Err(BalanceError::invalid_formula(
            formula,
            &formula[*open_at..],
            FormulaFault::UnbalancedParenthesis,
        ));
    }
    if current.is_empty() {
        return Err(BalanceError::invalid_formula(formula, formula, FormulaFault::Empty));
    }
    let composition = ChemicalFormula(current);
    debug!("parsed formula {} -> {}", formula, composition);
    Ok(composition)
}
