pub mod results_controller;
pub mod search_orchestrator;
