//! `evalfleet estimate`

use anyhow::Result;
use std::path::Path;

use crate::partition::{enumerate_scenarios, estimate_work_items, filter};

pub fn run_estimate_command(
    job_config: &Path,
    providers: usize,
    include: &[String],
    exclude: &[String],
) -> Result<()> {
    let count = estimate(job_config, providers, include, exclude)?;
    println!("{}", count);
    Ok(())
}

/// Work items a job config would produce against `providers` providers
pub fn estimate(
    job_config: &Path,
    providers: usize,
    include: &[String],
    exclude: &[String],
) -> Result<usize> {
    let scenarios = filter(&enumerate_scenarios(job_config)?, include, exclude);
    Ok(estimate_work_items(scenarios.len(), providers))
}
