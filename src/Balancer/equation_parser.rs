use super::balancer_error::BalanceError;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static STATE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)\((g|l|s|aq)\)$").unwrap());
static LEADING_COEFFICIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)(.+)$").unwrap());

/// state of matter written after a compound: (g), (l), (s), (aq)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    G,
    L,
    S,
    Aq,
}

impl State {
    pub fn from_mark(mark: &str) -> Option<State> {
        match mark {
            "g" => Some(State::G),
            "l" => Some(State::L),
            "s" => Some(State::S),
            "aq" => Some(State::Aq),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            State::G => "g",
            State::L => "l",
            State::S => "s",
            State::Aq => "aq",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Reactant,
    Product,
}

/// one compound of the equation, formula without the state mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub formula: String,
    pub state: Option<State>,
    pub side: Side,
}

impl Compound {
    /// formula with its state mark, e.g. "H2O(l)"
    pub fn label(&self) -> String {
        match self.state {
            Some(state) => format!("{}({})", self.formula, state),
            None => self.formula.clone(),
        }
    }
}

/// Reactants and products in the order they were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEquation {
    pub reactants: Vec<Compound>,
    pub products: Vec<Compound>,
}

impl ParsedEquation {
    /// all reactants followed by all products: the column order of the stoichiometric matrix
    pub fn compounds(&self) -> impl Iterator<Item = &Compound> {
        self.reactants.iter().chain(self.products.iter())
    }

    pub fn len(&self) -> usize {
        self.reactants.len() + self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_compound(token: &str, side: Side) -> Compound {
    let (formula, state) = match STATE_SUFFIX.captures(token) {
        Some(caps) => {
            let formula = caps.get(1).map_or("", |m| m.as_str());
            let state = caps.get(2).and_then(|m| State::from_mark(m.as_str()));
            (formula, state)
        }
        None => (token, None),
    };
    // "2H2O" in an already balanced equation: the multiplier itself is ignored
    let formula = match LEADING_COEFFICIENT.captures(formula) {
        Some(caps) => {
            debug!(
                "dropping coefficient {} in front of {}",
                &caps[1], &caps[2]
            );
            caps.get(2).map_or(formula, |m| m.as_str())
        }
        None => formula,
    };
    Compound {
        formula: formula.to_string(),
        state,
        side,
    }
}

/// Splits an equation like "H2(g) + O2(g) = H2O(l)" into reactants and products.
///
/// Whitespace is removed first, then the equation is cut at its single "=" and each half
/// at "+". A trailing (g), (l), (s) or (aq) is taken off the compound and kept as its
/// state. Tokens are not validated here: an empty or meaningless token fails later,
/// when its formula is parsed.
pub fn parse_equation(equation: &str) -> Result<ParsedEquation, BalanceError> {
    let stripped: String = equation.chars().filter(|c| !c.is_whitespace()).collect();
    let halves: Vec<&str> = stripped.split('=').collect();
    let [left, right] = halves.as_slice() else {
        return Err(BalanceError::MalformedEquation(equation.to_string()));
    };
    let reactants: Vec<Compound> = left
        .split('+')
        .map(|token| parse_compound(token, Side::Reactant))
        .collect();
    let products: Vec<Compound> = right
        .split('+')
        .map(|token| parse_compound(token, Side::Product))
        .collect();
    debug!(
        "reactants: {:?}, products: {:?}",
        reactants.iter().map(|c| c.label()).collect::<Vec<_>>(),
        products.iter().map(|c| c.label()).collect::<Vec<_>>()
    );
    Ok(ParsedEquation {
        reactants,
        products,
    })
}
