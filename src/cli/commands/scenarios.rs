//! `evalfleet scenarios`

use anyhow::Result;
use std::path::Path;

use crate::partition::{enumerate_scenarios, Scenario};

pub fn run_scenarios_command(job_config: &Path, json: bool) -> Result<()> {
    let scenarios = enumerate_scenarios(job_config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scenarios)?);
    } else if scenarios.is_empty() {
        println!("No scenarios found in {}", job_config.display());
    } else {
        print!("{}", format_scenario_table(&scenarios));
    }
    Ok(())
}

/// Pure: One line per scenario, id column padded to the longest id
pub fn format_scenario_table(scenarios: &[Scenario]) -> String {
    let width = scenarios.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let mut out = String::new();

    for scenario in scenarios {
        let tags = if scenario.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", scenario.tags.join(", "))
        };
        out.push_str(&format!(
            "{:<width$}  {}{}\n",
            scenario.id,
            scenario.path,
            tags,
            width = width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_scenario_table() {
        let mut billing = Scenario::new("billing", "Billing", "scenarios/billing.yaml");
        billing.tags = vec!["smoke".to_string(), "billing".to_string()];
        let refunds = Scenario::new("refunds-long", "Refunds", "scenarios/refunds.yaml");

        let table = format_scenario_table(&[billing, refunds]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "billing       scenarios/billing.yaml [smoke, billing]"
        );
        assert_eq!(lines[1], "refunds-long  scenarios/refunds.yaml");
    }
}
