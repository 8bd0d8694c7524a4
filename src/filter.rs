use crate::seed::SeedStep;
use anyhow::{anyhow, bail, Result};

fn parse_steps(names: &[String]) -> Result<Vec<SeedStep>> {
    names
        .iter()
        .map(|name| name.parse::<SeedStep>().map_err(|e| anyhow!(e)))
        .collect()
}

/// Resolves which seed steps to run based on --only/--skip filters.
/// The result is always in canonical order.
pub fn resolve_steps(
    only: Option<Vec<String>>,
    skip: Option<Vec<String>>,
) -> Result<Vec<SeedStep>> {
    match (only, skip) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --only and --skip at the same time");
        }
        (Some(only_list), None) => {
            let wanted = parse_steps(&only_list)?;
            let steps: Vec<SeedStep> = SeedStep::ALL
                .into_iter()
                .filter(|s| wanted.contains(s))
                .collect();
            tracing::info!("Running {} of {} seed steps", steps.len(), SeedStep::ALL.len());
            Ok(steps)
        }
        (None, Some(skip_list)) => {
            let skipped = parse_steps(&skip_list)?;
            let steps: Vec<SeedStep> = SeedStep::ALL
                .into_iter()
                .filter(|s| !skipped.contains(s))
                .collect();
            tracing::info!("Skipping {:?}", skipped);
            Ok(steps)
        }
        (None, None) => Ok(SeedStep::ALL.to_vec()),
    }
}
