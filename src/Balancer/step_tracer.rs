//! Step-by-step record of one balancing run.
//!
//! Every step has an identifier, a short title, a plain-text body for the console and a JSON
//! payload with the artifact itself. Nothing here computes anything: the tracer only formats
//! values that the pipeline has already produced.
use super::coefficients::{Coefficient, Normalized};
use super::null_space::NullSpace;
use super::stoichiometric_matrix::StoichiometricMatrix;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub content: String,
    pub data: Value,
}

impl Step {
    fn new(id: &str, title: &str, content: String, data: Value) -> Self {
        Step {
            id: id.to_string(),
            title: title.to_string(),
            content,
            data,
        }
    }
}

fn int_value(n: &BigInt) -> Value {
    match n.to_i64() {
        Some(v) => json!(v),
        None => json!(n.to_string()),
    }
}

fn ratio_text(r: &BigRational) -> String {
    Coefficient::from_ratio(r.clone()).to_string()
}

fn variable(j: usize) -> String {
    format!("x{}", j + 1)
}

fn joined(values: &[BigInt]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_compounds_step(m: &StoichiometricMatrix) -> Step {
    let mut lines = Vec::new();
    let mut compounds = Vec::new();
    for (j, (compound, composition)) in m.compounds.iter().zip(m.compositions.iter()).enumerate() {
        let side = serde_json::to_value(compound.side).unwrap_or(Value::Null);
        lines.push(format!(
            "{} = {} ({}): {}",
            variable(j),
            compound.label(),
            side.as_str().unwrap_or_default(),
            composition
        ));
        compounds.push(json!({
            "variable": variable(j),
            "formula": compound.formula,
            "state": compound.state.map(|s| s.as_str()),
            "side": side,
            "composition": composition.as_map(),
        }));
    }
    lines.push(format!("elements: {}", m.elements.join(", ")));
    Step::new(
        "parse_compounds",
        "Parse compounds",
        lines.join("\n"),
        json!({ "compounds": compounds, "elements": m.elements }),
    )
}

fn element_equations_step(m: &StoichiometricMatrix) -> Step {
    let equations = m.element_equations();
    let content = equations
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let data: Vec<Value> = equations
        .iter()
        .map(|e| {
            let text = e.to_string();
            let equation = text
                .split_once(": ")
                .map_or(text.clone(), |(_, rhs)| rhs.to_string());
            json!({ "element": e.element, "equation": equation })
        })
        .collect();
    Step::new(
        "element_equations",
        "Conservation equation for each element",
        content,
        json!({ "equations": data }),
    )
}

fn matrix_step(m: &StoichiometricMatrix) -> Step {
    let labels: Vec<String> = m.compounds.iter().map(|c| c.label()).collect();
    let rows = m.rows();
    let mut lines = vec![format!("columns: {}", labels.join(", "))];
    for (element, row) in m.elements.iter().zip(rows.iter()) {
        let cells: Vec<String> = row.iter().map(|x| format!("{:>4}", x)).collect();
        lines.push(format!("{:<3}|{}", element, cells.join("")));
    }
    Step::new(
        "stoichiometric_matrix",
        "Stoichiometric matrix (reactants positive, products negative)",
        lines.join("\n"),
        json!({ "elements": m.elements, "compounds": labels, "rows": rows }),
    )
}

fn null_space_step(ns: &NullSpace, selected: &[BigRational]) -> Step {
    let rref: Vec<Vec<String>> = (0..ns.rref.nrows())
        .map(|i| ns.rref.row(i).iter().map(ratio_text).collect())
        .collect();
    let vector: Vec<String> = selected.iter().map(ratio_text).collect();
    let free: Vec<String> = ns.free_columns.iter().map(|&j| variable(j)).collect();
    let content = format!(
        "rank {}, nullity {}\nfree unknowns: {}\nnull space vector: [{}]",
        ns.pivot_columns.len(),
        ns.nullity(),
        free.join(", "),
        vector.join(", ")
    );
    Step::new(
        "null_space",
        "Null space of the matrix (exact rational elimination)",
        content,
        json!({
            "rref": rref,
            "pivot_columns": ns.pivot_columns,
            "free_columns": ns.free_columns,
            "nullity": ns.nullity(),
            "vector": vector,
        }),
    )
}

fn integer_step(normalized: &Normalized) -> Step {
    let n = &normalized.integer;
    let content = format!(
        "lcm of denominators: {}\nscaled vector: [{}]\ngcd: {}\ninteger coefficients: [{}]",
        n.lcm,
        joined(&n.scaled),
        n.gcd,
        joined(&n.coefficients)
    );
    Step::new(
        "integer_coefficients",
        "Minimal integer coefficients",
        content,
        json!({
            "lcm": int_value(&n.lcm),
            "scaled": n.scaled.iter().map(int_value).collect::<Vec<_>>(),
            "gcd": int_value(&n.gcd),
            "coefficients": n.coefficients.iter().map(int_value).collect::<Vec<_>>(),
        }),
    )
}

/// Builds the ordered list of steps from the artifacts of one run.
pub fn trace_steps(
    matrix: &StoichiometricMatrix,
    null_space: &NullSpace,
    selected: &[BigRational],
    normalized: &Normalized,
) -> Vec<Step> {
    let mut steps = vec![
        parse_compounds_step(matrix),
        element_equations_step(matrix),
        matrix_step(matrix),
        null_space_step(null_space, selected),
        integer_step(normalized),
    ];
    if let Some(fractional) = &normalized.fractional {
        let texts: Vec<String> = fractional.coefficients.iter().map(|c| c.to_string()).collect();
        steps.push(Step::new(
            "fractional_coefficients",
            "Fractional coefficients",
            format!(
                "divided by the smallest coefficient {}: [{}]",
                fractional.pivot,
                texts.join(", ")
            ),
            json!({
                "pivot": int_value(&fractional.pivot),
                "coefficients": fractional.coefficients,
            }),
        ));
    }
    steps
}

/// prints every step to the console
pub fn pretty_print_steps(steps: &[Step]) {
    for (i, step) in steps.iter().enumerate() {
        println!("__________STEP {}: {}__________", i + 1, step.title);
        println!("{}", step.content);
    }
}
