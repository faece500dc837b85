/// error taxonomy of the balancing pipeline: every stage returns `BalanceError`, and the request
/// adapter decides from the variant whether the caller or the balancer is at fault
pub mod balancer_error;
/// The module takes a single chemical formula such as "Fe2(SO4)3" and returns the number of atoms
/// of every element in it. Element tokens are an uppercase letter optionally followed by one lowercase
/// letter, brackets can be nested and carry an optional multiplier after ")".
/// # Examples
/// ```
/// use Equilibrium::Balancer::formula_parser::parse_formula;
/// let counts = parse_formula("Fe2(SO4)3").unwrap();
/// assert_eq!(counts.count("Fe"), 2);
/// assert_eq!(counts.count("S"), 3);
/// assert_eq!(counts.count("O"), 12);
/// ```
pub mod formula_parser;
/// splits an equation "A + B = C" into reactant and product compounds, physical state suffixes
/// "(g)", "(l)", "(s)", "(aq)" are detached from the formula and kept alongside
pub mod equation_parser;
/// The module builds the stoichiometric matrix of a parsed equation:
/// 1) rows are the elements in alphabetical order
/// 2) columns are the compounds, reactants first, in the order they were written
/// 3) entries are atom counts, positive for reactants and negative for products
/// So a coefficient vector x balances the equation exactly when the matrix times x is zero.
pub mod stoichiometric_matrix;
/// exact rational null space of the stoichiometric matrix (Gauss-Jordan elimination over
/// `BigRational`)
pub mod null_space;
///  turns the null-space vector into the minimal positive integer coefficients or, in fractional
/// mode, into coefficients with the smallest one equal to 1
pub mod coefficients;
/// human-readable trace of every stage of one balancing run
pub mod step_tracer;
/// The module joins all stages into one call and holds the result types.
/// # Examples
/// ```
/// use Equilibrium::Balancer::balance_api::balance;
/// let balanced = balance("C3H8 + O2 = CO2 + H2O").unwrap();
/// assert_eq!(balanced.to_string(), "C3H8 + 5O2 = 3CO2 + 4H2O");
/// let balanced = balance("Al + HCl = AlCl3 + H2").unwrap();
/// assert_eq!(balanced.to_latex(), "2Al + 6HCl \\rightarrow 2AlCl_{3} + 3H_{2}");
/// ```
pub mod balance_api;
/// JSON request/response adapter for network front-ends
pub mod request_api;
/// persistent settings of the console front-end
pub mod config;
#[cfg(test)]
mod balancer_tests;
