use crate::Balancer::balance_api::{
    BalanceOptions, BalancedEquation, balance, balance_equation,
};
use crate::Balancer::balancer_error::{BalanceError, FormulaFault};
use crate::Balancer::coefficients::Coefficient;
use crate::Balancer::equation_parser::State;
use crate::Balancer::formula_parser::parse_formula;
use crate::Balancer::null_space::AmbiguityPolicy;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Zero};
use serde_json::json;
use std::collections::BTreeMap;

const EQUATIONS: [&str; 8] = [
    "Fe + O2 = Fe2O3",
    "C3H8 + O2 = CO2 + H2O",
    "Al + HCl = AlCl3 + H2",
    "H2(g) + O2(g) = H2O(l)",
    "KMnO4 + HCl = KCl + MnCl2 + H2O + Cl2",
    "Fe2(SO4)3 + KOH = K2SO4 + Fe(OH)3",
    "Ca3(PO4)2 + SiO2 + C = CaSiO3 + P4 + CO",
    "K4Fe(CN)6 + KMnO4 + H2SO4 = KHSO4 + Fe2(SO4)3 + MnSO4 + HNO3 + CO2 + H2O",
];

fn integers(balanced: &BalancedEquation) -> Vec<i64> {
    balanced
        .compounds()
        .map(|c| match &c.coefficient {
            Coefficient::Integer(n) => n.to_string().parse().unwrap(),
            other => panic!("expected an integer coefficient, got {}", other),
        })
        .collect()
}

// element -> (atoms on the left, atoms on the right)
fn atom_balance(balanced: &BalancedEquation) -> BTreeMap<String, (BigRational, BigRational)> {
    let mut totals: BTreeMap<String, (BigRational, BigRational)> = BTreeMap::new();
    for (compounds, left) in [(&balanced.reactants, true), (&balanced.products, false)] {
        for compound in compounds {
            let composition = parse_formula(&compound.formula).unwrap();
            for (element, count) in composition.iter() {
                let atoms = compound.coefficient.to_ratio()
                    * BigRational::from_integer(BigInt::from(count));
                let entry = totals
                    .entry(element.to_string())
                    .or_insert_with(|| (BigRational::zero(), BigRational::zero()));
                if left {
                    entry.0 += atoms;
                } else {
                    entry.1 += atoms;
                }
            }
        }
    }
    totals
}

#[test]
fn test_iron_oxide() {
    let balanced = balance("Fe + O2 = Fe2O3").unwrap();
    assert_eq!(integers(&balanced), vec![4, 3, 2]);
    let result = balance_equation("Fe + O2 = Fe2O3", &BalanceOptions::default()).unwrap();
    assert_eq!(
        result.to_json().unwrap(),
        json!({
            "left": {"Fe": {"coef": 4, "state": null}, "O2": {"coef": 3, "state": null}},
            "right": {"Fe2O3": {"coef": 2, "state": null}}
        })
    );
}

#[test]
fn test_propane_combustion() {
    let balanced = balance("C3H8 + O2 = CO2 + H2O").unwrap();
    assert_eq!(integers(&balanced), vec![1, 5, 3, 4]);
    assert_eq!(balanced.to_string(), "C3H8 + 5O2 = 3CO2 + 4H2O");
}

#[test]
fn test_aluminium_and_acid() {
    let balanced = balance("Al + HCl = AlCl3 + H2").unwrap();
    assert_eq!(integers(&balanced), vec![2, 6, 2, 3]);
}

#[test]
fn test_states_are_preserved() {
    let result = balance_equation("H2(g) + O2(g) = H2O(l)", &BalanceOptions::default()).unwrap();
    let balanced = &result.equation;
    assert_eq!(integers(balanced), vec![2, 1, 2]);
    let states: Vec<Option<State>> = balanced.compounds().map(|c| c.state).collect();
    assert_eq!(states, vec![Some(State::G), Some(State::G), Some(State::L)]);
    assert_eq!(
        result.to_json().unwrap(),
        json!({
            "left": {"H2": {"coef": 2, "state": "g"}, "O2": {"coef": 1, "state": "g"}},
            "right": {"H2O": {"coef": 2, "state": "l"}}
        })
    );
    let aqueous = balance("NaOH(aq) + HCl(aq) = NaCl(aq) + H2O(l)").unwrap();
    assert_eq!(integers(&aqueous), vec![1, 1, 1, 1]);
    assert_eq!(aqueous.reactants[0].state, Some(State::Aq));
}

#[test]
fn test_input_errors() {
    assert_eq!(
        balance("H2 + O2 -> H2O").unwrap_err(),
        BalanceError::MalformedEquation("H2 + O2 -> H2O".to_string())
    );
    assert!(matches!(
        balance("H2 = O2 = H2O").unwrap_err(),
        BalanceError::MalformedEquation(_)
    ));
    assert_eq!(
        balance("fe + O2 = Fe2O3").unwrap_err(),
        BalanceError::InvalidFormula {
            formula: "fe".to_string(),
            fragment: "fe".to_string(),
            fault: FormulaFault::InvalidSymbol,
        }
    );
    assert!(matches!(
        balance("Fe(OH + O2 = Fe2O3").unwrap_err(),
        BalanceError::InvalidFormula {
            fault: FormulaFault::UnbalancedParenthesis,
            ..
        }
    ));
    // dangling "+" leaves an empty compound behind
    assert!(matches!(
        balance("H2 + = H2O").unwrap_err(),
        BalanceError::InvalidFormula {
            fault: FormulaFault::Empty,
            ..
        }
    ));
}

#[test]
fn test_no_solution() {
    assert_eq!(balance("H2 = O2").unwrap_err(), BalanceError::NoSolution);
    assert_eq!(balance("NaCl = Na").unwrap_err(), BalanceError::NoSolution);
}

#[test]
fn test_ambiguous_equation() {
    assert_eq!(
        balance("H2 + O2 = H2O + H2O2").unwrap_err(),
        BalanceError::AmbiguousSolution { nullity: 2 }
    );
    let options = BalanceOptions {
        ambiguity: AmbiguityPolicy::FirstBasis,
        ..Default::default()
    };
    // the first basis vector leaves H2O2 out of the reaction
    assert_eq!(
        balance_equation("H2 + O2 = H2O + H2O2", &options).unwrap_err(),
        BalanceError::NonPositiveCoefficient {
            compound: "H2O2".to_string()
        }
    );
}

#[test]
fn test_no_positive_solution() {
    // the only solution needs a negative amount of one compound
    let err = balance("H2 = H2O + O2").unwrap_err();
    assert!(matches!(err, BalanceError::NonPositiveCoefficient { .. }));
    let err = balance("H2O = H2 + O2 + H2O2").unwrap_err();
    assert!(matches!(err, BalanceError::AmbiguousSolution { .. }));
}

#[test]
fn test_harder_equations() {
    assert_eq!(
        integers(&balance("KMnO4 + HCl = KCl + MnCl2 + H2O + Cl2").unwrap()),
        vec![2, 16, 2, 2, 8, 5]
    );
    assert_eq!(
        integers(&balance("Fe2(SO4)3 + KOH = K2SO4 + Fe(OH)3").unwrap()),
        vec![1, 6, 3, 2]
    );
    assert_eq!(
        integers(&balance("Ca3(PO4)2 + SiO2 + C = CaSiO3 + P4 + CO").unwrap()),
        vec![2, 6, 10, 6, 1, 10]
    );
    assert_eq!(
        integers(
            &balance("K4Fe(CN)6 + KMnO4 + H2SO4 = KHSO4 + Fe2(SO4)3 + MnSO4 + HNO3 + CO2 + H2O")
                .unwrap()
        ),
        vec![10, 122, 299, 162, 5, 122, 60, 60, 188]
    );
}

#[test]
fn test_atoms_are_conserved() {
    for equation in EQUATIONS {
        for options in [BalanceOptions::default(), BalanceOptions::fractional()] {
            let result = balance_equation(equation, &options).unwrap();
            for (element, (left, right)) in atom_balance(&result.equation) {
                assert_eq!(left, right, "{} is not conserved in {}", element, equation);
            }
        }
    }
}

#[test]
fn test_integer_solutions_are_minimal() {
    for equation in EQUATIONS {
        let coefficients = integers(&balance(equation).unwrap());
        assert!(coefficients.iter().all(|&c| c > 0), "{}", equation);
        let gcd = coefficients.iter().fold(0i64, |acc, c| acc.gcd(c));
        assert_eq!(gcd, 1, "{}", equation);
    }
}

#[test]
fn test_fractional_mode() {
    let result = balance_equation("Fe + O2 = Fe2O3", &BalanceOptions::fractional()).unwrap();
    assert_eq!(result.equation.to_string(), "2Fe + 3/2 O2 = Fe2O3");
    // smallest coefficient is 1 in every fractional result
    for equation in EQUATIONS {
        let result = balance_equation(equation, &BalanceOptions::fractional()).unwrap();
        let ratios: Vec<BigRational> = result
            .equation
            .compounds()
            .map(|c| c.coefficient.to_ratio())
            .collect();
        assert_eq!(ratios.iter().min(), Some(&BigRational::one()), "{}", equation);
    }
}

#[test]
fn test_balanced_output_balances_to_itself() {
    for equation in EQUATIONS {
        let balanced = balance(equation).unwrap();
        let again = balance(&balanced.to_string()).unwrap();
        assert_eq!(again, balanced, "{}", equation);
    }
}

#[test]
fn test_results_are_deterministic() {
    let options = BalanceOptions::default().with_steps();
    for equation in EQUATIONS {
        let first = balance_equation(equation, &options).unwrap();
        let second = balance_equation(equation, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}

#[test]
fn test_whitespace_and_order() {
    let compact = balance("Fe+O2=Fe2O3").unwrap();
    let spaced = balance("  Fe  +   O2 =  Fe2O3 ").unwrap();
    assert_eq!(compact, spaced);
    // written order is kept in the output
    let swapped = balance("O2 + Fe = Fe2O3").unwrap();
    let formulas: Vec<&str> = swapped.reactants.iter().map(|c| c.formula.as_str()).collect();
    assert_eq!(formulas, vec!["O2", "Fe"]);
    assert_eq!(integers(&swapped), vec![3, 4, 2]);
}
