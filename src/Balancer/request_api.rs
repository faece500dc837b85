//! Request/response adapter for a transport layer (HTTP, websocket, ...).
//!
//! The adapter takes the raw JSON body of a request, runs the balancer and returns the status
//! code and JSON body to send back. Errors caused by the input are answered with 400 and their
//! message, everything else with 500.
//!
//! Request:
//! ```json
//! { "equation": "Fe + O2 = Fe2O3", "fractional": false, "return_steps": false }
//! ```
//! Response on success (status 200):
//! ```json
//! { "balanced": { "left": { "Fe": { "coef": 4, "state": null }, ... }, "right": { ... } } }
//! ```
use super::balance_api::{BalanceOptions, balance_equation};
use super::coefficients::CoefficientMode;
use super::null_space::AmbiguityPolicy;
use log::{error, info};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceRequest {
    pub equation: String,
    #[serde(default)]
    pub fractional: Option<bool>,
    #[serde(default)]
    pub return_steps: Option<bool>,
    #[serde(default)]
    pub ambiguity: Option<AmbiguityPolicy>,
}

impl BalanceRequest {
    /// flags missing from the request are taken from `defaults`
    pub fn options(&self, defaults: &BalanceOptions) -> BalanceOptions {
        let mode = match self.fractional {
            Some(true) => CoefficientMode::Fractional,
            Some(false) => CoefficientMode::Integer,
            None => defaults.mode,
        };
        BalanceOptions {
            mode,
            return_steps: self.return_steps.unwrap_or(defaults.return_steps),
            ambiguity: self.ambiguity.unwrap_or(defaults.ambiguity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn bad_request(message: String) -> Self {
        ApiResponse {
            status: 400,
            body: json!({ "error": message }),
        }
    }
}

/// Handles one request body, see the module docs for the format.
pub fn handle_request(body: &str, defaults: &BalanceOptions) -> ApiResponse {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return ApiResponse::bad_request(format!("request body is not valid JSON: {}", e)),
    };
    if value.get("equation").is_none() {
        return ApiResponse::bad_request("the request must contain the key 'equation'".to_string());
    }
    let request: BalanceRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => return ApiResponse::bad_request(format!("invalid request: {}", e)),
    };
    info!("balance request for '{}'", request.equation);

    let outcome = balance_equation(&request.equation, &request.options(defaults))
        .and_then(|result| result.to_json());
    match outcome {
        Ok(balanced) => ApiResponse {
            status: 200,
            body: json!({ "balanced": balanced }),
        },
        Err(e) if e.is_client_error() => ApiResponse {
            status: 400,
            body: json!({ "error": e.to_string(), "kind": e.kind() }),
        },
        Err(e) => {
            error!("internal failure for '{}': {}", request.equation, e);
            ApiResponse {
                status: 500,
                body: json!({ "error": e.to_string(), "kind": e.kind() }),
            }
        }
    }
}
