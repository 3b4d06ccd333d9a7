//! Scenario selection and runner setup

use crate::commands::RunArgs;
use crate::error::{CliError, CliResult};
use shopwright::{GuestUserProfile, Scenario, ScenarioRunner, SuiteConfig};
use std::time::Duration;

/// Resolve scenario ids, all scenarios when none are given.
///
/// Ids are case-insensitive; duplicates keep their first position.
pub fn select_scenarios(ids: &[String]) -> CliResult<Vec<Scenario>> {
    if ids.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }
    let mut selected = Vec::with_capacity(ids.len());
    for id in ids {
        let scenario: Scenario = id
            .parse()
            .map_err(|e: shopwright::ShopError| CliError::invalid_argument(e.to_string()))?;
        if !selected.contains(&scenario) {
            selected.push(scenario);
        }
    }
    Ok(selected)
}

/// Apply run flags to the suite configuration and build the runner
#[must_use]
pub fn build_runner(args: &RunArgs, mut suite: SuiteConfig, profile: GuestUserProfile) -> ScenarioRunner {
    if let Some(ms) = args.timeout {
        suite = suite.with_suite_timeout(Duration::from_millis(ms));
    }
    if args.headed {
        suite = suite.with_headless(false);
    }
    let runner = ScenarioRunner::new(suite, profile)
        .with_products_to_add(args.products)
        .with_payment_method(args.payment.into());
    match args.seed {
        Some(seed) => runner.with_seed(seed),
        None => runner,
    }
}
