use crate::Balancer::balance_api::{BalanceOptions, BalanceResult, balance_equation};
use crate::Balancer::coefficients::CoefficientMode;
use crate::Balancer::config::ConfigManager;
use crate::Balancer::equation_parser::parse_equation;
use crate::Balancer::step_tracer::pretty_print_steps;
use crate::Balancer::stoichiometric_matrix::build_matrix;
use log::error;
use std::io::{self, Write};

pub fn run_interactive_menu(mut manager: ConfigManager) {
    let mut show_steps = manager.config().return_steps;
    loop {
        show_main_menu(show_steps);
        let Some(choice) = get_user_input() else {
            break;
        };

        match choice.trim() {
            "1" => balance_menu(&manager, CoefficientMode::Integer, show_steps),
            "2" => balance_menu(&manager, CoefficientMode::Fractional, show_steps),
            "3" => {
                show_steps = !show_steps;
                println!("Step display {}", if show_steps { "on" } else { "off" });
            }
            "4" => match manager.set_return_steps(show_steps) {
                Ok(()) => println!("Settings saved to {}", manager.config_file()),
                Err(e) => error!("could not save settings: {}", e),
            },
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu(show_steps: bool) {
    println!("\x1b[34m\n Equilibrium: chemical equation balancer\n \x1b[0m");
    println!("\x1b[33m1. Balance (integer coefficients)\x1b[0m");
    println!("\x1b[33m2. Balance (fractional coefficients)\x1b[0m");
    println!(
        "\x1b[33m3. Show steps: {}\x1b[0m",
        if show_steps { "on" } else { "off" }
    );
    println!("\x1b[33m4. Save settings\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    let _ = io::stdout().flush();
}

fn balance_menu(manager: &ConfigManager, mode: CoefficientMode, show_steps: bool) {
    print!("\x1b[36mEnter the equation, e.g. Fe + O2 = Fe2O3: \x1b[0m");
    let _ = io::stdout().flush();
    let Some(equation) = get_user_input() else {
        return;
    };
    let options = BalanceOptions {
        mode,
        return_steps: show_steps,
        ..manager.options()
    };
    match balance_equation(equation.trim(), &options) {
        Ok(result) => print_result(equation.trim(), &result),
        Err(e) => println!("\x1b[31mError: {}\x1b[0m", e),
    }
}

/// plain text and LaTeX renderings, then the steps when they were traced
fn print_result(equation: &str, result: &BalanceResult) {
    println!("{}", result.equation);
    println!("LaTeX: {}", result.equation.to_latex());
    if let Some(steps) = &result.steps {
        pretty_print_steps(steps);
        if let Ok(matrix) = parse_equation(equation).and_then(|parsed| build_matrix(&parsed)) {
            matrix.pretty_print();
        }
    }
}

// None on end of input or a read failure
fn get_user_input() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input),
        Err(e) => {
            error!("failed to read input: {}", e);
            None
        }
    }
}
