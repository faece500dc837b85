use super::balancer_error::BalanceError;
use super::coefficients::{Coefficient, CoefficientMode, normalize};
use super::equation_parser::{Side, State, parse_equation};
use super::null_space::{AmbiguityPolicy, null_space};
use super::step_tracer::{Step, trace_steps};
use super::stoichiometric_matrix::build_matrix;
use log::{info, warn};
use regex::Regex;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::LazyLock;

static SUBSCRIPT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+)").unwrap());

/// per-request switches of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BalanceOptions {
    pub mode: CoefficientMode,
    pub return_steps: bool,
    pub ambiguity: AmbiguityPolicy,
}

impl BalanceOptions {
    pub fn fractional() -> Self {
        BalanceOptions {
            mode: CoefficientMode::Fractional,
            ..Default::default()
        }
    }

    pub fn with_steps(mut self) -> Self {
        self.return_steps = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedCompound {
    pub formula: String,
    pub state: Option<State>,
    pub side: Side,
    pub coefficient: Coefficient,
}

impl BalancedCompound {
    pub fn label(&self) -> String {
        match self.state {
            Some(state) => format!("{}({})", self.formula, state),
            None => self.formula.clone(),
        }
    }

    fn to_latex(&self) -> String {
        let mut latex = String::new();
        if !self.coefficient.is_one() {
            latex.push_str(&self.coefficient.to_latex());
        }
        latex.push_str(&SUBSCRIPT.replace_all(&self.formula, "_{$1}"));
        if let Some(state) = self.state {
            latex.push_str(&format!("({})", state));
        }
        latex
    }
}

impl fmt::Display for BalancedCompound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.coefficient {
            c if c.is_one() => write!(f, "{}", self.label()),
            Coefficient::Integer(n) => write!(f, "{}{}", n, self.label()),
            fraction => write!(f, "{} {}", fraction, self.label()),
        }
    }
}

/// Equation with its coefficients, compounds in the order they were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedEquation {
    pub reactants: Vec<BalancedCompound>,
    pub products: Vec<BalancedCompound>,
}

// formula as key; a repeated formula falls back to its label, then to its position
fn side_to_json(compounds: &[BalancedCompound]) -> Map<String, Value> {
    let mut map = Map::new();
    for (i, compound) in compounds.iter().enumerate() {
        let mut key = compound.formula.clone();
        if map.contains_key(&key) {
            key = compound.label();
        }
        if map.contains_key(&key) {
            key = format!("{}#{}", compound.formula, i + 1);
        }
        map.insert(
            key,
            json!({
                "coef": compound.coefficient,
                "state": compound.state.map(|s| s.as_str()),
            }),
        );
    }
    map
}

impl BalancedEquation {
    /// reactants then products
    pub fn compounds(&self) -> impl Iterator<Item = &BalancedCompound> {
        self.reactants.iter().chain(self.products.iter())
    }

    pub fn coefficients(&self) -> Vec<Coefficient> {
        self.compounds().map(|c| c.coefficient.clone()).collect()
    }

    /// `{"left": {...}, "right": {...}}` keyed by formula, in written order
    pub fn to_json(&self) -> Value {
        json!({
            "left": side_to_json(&self.reactants),
            "right": side_to_json(&self.products),
        })
    }

    /// e.g. `4Fe + 3O_{2} \rightarrow 2Fe_{2}O_{3}`
    pub fn to_latex(&self) -> String {
        let side = |compounds: &[BalancedCompound]| {
            compounds
                .iter()
                .map(|c| c.to_latex())
                .collect::<Vec<_>>()
                .join(" + ")
        };
        format!(
            "{} \\rightarrow {}",
            side(&self.reactants),
            side(&self.products)
        )
    }
}

impl fmt::Display for BalancedEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |compounds: &[BalancedCompound]| {
            compounds
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" + ")
        };
        write!(f, "{} = {}", side(&self.reactants), side(&self.products))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceResult {
    pub equation: BalancedEquation,
    /// present only when the steps were requested
    pub steps: Option<Vec<Step>>,
}

impl BalanceResult {
    /// output document: `left`, `right` and, when traced, `steps`
    pub fn to_json(&self) -> Result<Value, BalanceError> {
        let mut document = self.equation.to_json();
        if let Some(steps) = &self.steps {
            let steps =
                serde_json::to_value(steps).map_err(|e| BalanceError::Internal(e.to_string()))?;
            document["steps"] = steps;
        }
        Ok(document)
    }
}

fn run_pipeline(equation: &str, options: &BalanceOptions) -> Result<BalanceResult, BalanceError> {
    let parsed = parse_equation(equation)?;
    let matrix = build_matrix(&parsed)?;
    let null_space = null_space(&matrix.matrix)?;
    let selected = null_space.select(options.ambiguity)?;
    let normalized = normalize(selected, options.mode, &matrix.compounds)?;
    if !matrix.conserves(&normalized.integer.coefficients) {
        return Err(BalanceError::Internal(format!(
            "coefficients of '{}' do not conserve atoms",
            equation
        )));
    }

    let steps = options
        .return_steps
        .then(|| trace_steps(&matrix, &null_space, selected, &normalized));

    let (reactants, products): (Vec<_>, Vec<_>) = matrix
        .compounds
        .iter()
        .zip(normalized.coefficients)
        .map(|(compound, coefficient)| BalancedCompound {
            formula: compound.formula.clone(),
            state: compound.state,
            side: compound.side,
            coefficient,
        })
        .partition(|c| c.side == Side::Reactant);

    Ok(BalanceResult {
        equation: BalancedEquation {
            reactants,
            products,
        },
        steps,
    })
}

/// Balances a chemical equation.
///
/// Runs the whole pipeline: equation parsing, stoichiometric matrix, exact null space,
/// normalization of the coefficients and, on request, the step trace. The first error of any
/// stage is returned unchanged.
///
/// # Examples
/// ```
/// use Equilibrium::Balancer::balance_api::{BalanceOptions, balance_equation};
/// let result = balance_equation("Fe + O2 = Fe2O3", &BalanceOptions::default()).unwrap();
/// assert_eq!(result.equation.to_string(), "4Fe + 3O2 = 2Fe2O3");
/// let result = balance_equation("Fe + O2 = Fe2O3", &BalanceOptions::fractional()).unwrap();
/// assert_eq!(result.equation.to_string(), "2Fe + 3/2 O2 = Fe2O3");
/// ```
pub fn balance_equation(
    equation: &str,
    options: &BalanceOptions,
) -> Result<BalanceResult, BalanceError> {
    let result = run_pipeline(equation, options);
    match &result {
        Ok(balanced) => info!("balanced '{}': {}", equation, balanced.equation),
        Err(e) => warn!("could not balance '{}': {}", equation, e),
    }
    result
}

/// integer coefficients, no steps, ambiguous equations rejected
pub fn balance(equation: &str) -> Result<BalancedEquation, BalanceError> {
    balance_equation(equation, &BalanceOptions::default()).map(|r| r.equation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn test_display() {
        let balanced = balance("H2(g) + O2(g) = H2O(l)").unwrap();
        assert_eq!(balanced.to_string(), "2H2(g) + O2(g) = 2H2O(l)");
        assert_eq!(
            balanced.to_latex(),
            "2H_{2}(g) + O_{2}(g) \\rightarrow 2H_{2}O(l)"
        );
    }

    #[test]
    fn test_latex_fractions() {
        let result = balance_equation("Fe + O2 = Fe2O3", &BalanceOptions::fractional()).unwrap();
        assert_eq!(
            result.equation.to_latex(),
            "2Fe + \\frac{3}{2}O_{2} \\rightarrow Fe_{2}O_{3}"
        );
    }

    #[test]
    fn test_json_document() {
        let result = balance_equation("Fe + O2 = Fe2O3", &BalanceOptions::default()).unwrap();
        let document = result.to_json().unwrap();
        assert_eq!(
            document,
            json!({
                "left": {"Fe": {"coef": 4, "state": null}, "O2": {"coef": 3, "state": null}},
                "right": {"Fe2O3": {"coef": 2, "state": null}}
            })
        );
        assert!(document.get("steps").is_none());
        // written order is kept
        let keys: Vec<&String> = document["left"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Fe", "O2"]);
    }

    #[test]
    fn test_json_with_steps() {
        let options = BalanceOptions::default().with_steps();
        let result = balance_equation("Al + HCl = AlCl3 + H2", &options).unwrap();
        let document = result.to_json().unwrap();
        assert_eq!(document["steps"].as_array().unwrap().len(), 5);
        assert_eq!(document["steps"][0]["id"], json!("parse_compounds"));
    }

    #[test]
    fn test_repeated_formula_keys() {
        let compound = |state, n: i64| BalancedCompound {
            formula: "H2O".to_string(),
            state,
            side: Side::Product,
            coefficient: Coefficient::Integer(BigInt::from(n)),
        };
        let products = vec![compound(Some(State::L), 1), compound(Some(State::G), 2), compound(Some(State::G), 3)];
        let map = side_to_json(&products);
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["H2O", "H2O(g)", "H2O#3"]);
    }

    #[test]
    fn test_steps_do_not_change_the_result() {
        let plain = balance_equation("C3H8 + O2 = CO2 + H2O", &BalanceOptions::default()).unwrap();
        let traced = balance_equation(
            "C3H8 + O2 = CO2 + H2O",
            &BalanceOptions::default().with_steps(),
        )
        .unwrap();
        assert_eq!(plain.equation, traced.equation);
        assert!(plain.steps.is_none());
        assert!(traced.steps.is_some());
    }
}
