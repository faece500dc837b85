#[allow(non_snake_case)]
pub mod Balancer;
pub mod cli;
