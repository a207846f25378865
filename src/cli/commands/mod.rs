//! Command implementation modules

pub mod estimate;
pub mod plan;
pub mod results;
pub mod scenarios;

// Re-export command execution functions
pub use estimate::run_estimate_command;
pub use plan::{run_plan_command, PlanParams};
pub use results::run_results_command;
pub use scenarios::run_scenarios_command;
