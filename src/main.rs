use Equilibrium::Balancer::balance_api::balance_equation;
use Equilibrium::Balancer::config::ConfigManager;
use Equilibrium::Balancer::step_tracer::pretty_print_steps;
use Equilibrium::cli::cli_main::run_interactive_menu;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::process::ExitCode;

pub fn main() -> ExitCode {
    let manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let _ = TermLogger::init(
        manager.config().level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let equations: Vec<String> = std::env::args().skip(1).collect();
    if equations.is_empty() {
        run_interactive_menu(manager);
        return ExitCode::SUCCESS;
    }

    let options = manager.options();
    let mut failed = false;
    for equation in &equations {
        match balance_equation(equation, &options) {
            Ok(result) => {
                println!("{}", result.equation);
                if let Some(steps) = &result.steps {
                    pretty_print_steps(steps);
                }
            }
            Err(e) => {
                eprintln!("{}: {}", equation, e);
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
