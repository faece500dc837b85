/// interactive console menu of the balancer
pub mod cli_main;
