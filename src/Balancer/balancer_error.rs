use thiserror::Error;

/// what exactly went wrong inside a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaFault {
    /// substring is neither an element token nor a bracket
    InvalidSymbol,
    /// "(" without ")" or ")" without "("
    UnbalancedParenthesis,
    /// formula contains no atoms at all
    Empty,
    /// subscript or group multiplier equal to zero
    ZeroCount,
    /// atom count does not fit into the machine integer
    CountOverflow,
}

impl std::fmt::Display for FormulaFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormulaFault::InvalidSymbol => write!(f, "invalid chemical symbol"),
            FormulaFault::UnbalancedParenthesis => write!(f, "unbalanced parenthesis"),
            FormulaFault::Empty => write!(f, "formula contains no elements"),
            FormulaFault::ZeroCount => write!(f, "zero atom count"),
            FormulaFault::CountOverflow => write!(f, "atom count is too large"),
        }
    }
}

/// Errors of the balancing pipeline. Each one is raised by the stage that first sees the
/// problem and goes up to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    /// no "=" separator, or more than one
    #[error("malformed equation '{0}': exactly one '=' is required")]
    MalformedEquation(String),

    #[error("{fault} in '{fragment}' (formula '{formula}')")]
    InvalidFormula {
        formula: String,
        /// the offending substring
        fragment: String,
        fault: FormulaFault,
    },

    /// the stoichiometric matrix has a trivial null space
    #[error("no solution: the only conservation-satisfying assignment is all-zero")]
    NoSolution,

    #[error("no positive coefficient set exists, compound '{compound}' gets a non-positive coefficient")]
    NonPositiveCoefficient { compound: String },

    /// null space dimension is greater than one
    #[error("ambiguous equation: {nullity} independent solutions exist")]
    AmbiguousSolution { nullity: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

impl BalanceError {
    pub(crate) fn invalid_formula(formula: &str, fragment: &str, fault: FormulaFault) -> Self {
        BalanceError::InvalidFormula {
            formula: formula.to_string(),
            fragment: fragment.to_string(),
            fault,
        }
    }

    /// true when the error was caused by the user's input and its message may be shown to the user
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BalanceError::Internal(_))
    }

    /// short machine-readable name used by the request adapter
    pub fn kind(&self) -> &'static str {
        match self {
            BalanceError::MalformedEquation(_) => "malformed_equation",
            BalanceError::InvalidFormula { .. } => "invalid_formula",
            BalanceError::NoSolution => "no_solution",
            BalanceError::NonPositiveCoefficient { .. } => "non_positive_coefficient",
            BalanceError::AmbiguousSolution { .. } => "ambiguous_solution",
            BalanceError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = BalanceError::invalid_formula("fe", "fe", FormulaFault::InvalidSymbol);
        assert_eq!(e.to_string(), "invalid chemical symbol in 'fe' (formula 'fe')");
        assert_eq!(
            BalanceError::AmbiguousSolution { nullity: 2 }.to_string(),
            "ambiguous equation: 2 independent solutions exist"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(BalanceError::NoSolution.is_client_error());
        assert!(BalanceError::MalformedEquation("H2".to_string()).is_client_error());
        assert!(!BalanceError::Internal("x".to_string()).is_client_error());
        assert_eq!(BalanceError::NoSolution.kind(), "no_solution");
    }
}
