//! Shopwright CLI: guest checkout scenarios for the Demo Web Shop
//!
//! ## Usage
//!
//! ```bash
//! shopwright list                                  # Show scenarios
//! shopwright run                                   # Run TC001-TC004
//! shopwright run TC003 --seed 7 -v                 # One scenario, step logs
//! shopwright run --parallel --format json -o r.json
//! shopwright config --base-url https://demowebshop.tricentis.com
//! ```

use clap::Parser;
use shopwright::{Scenario, ScenarioOutcome, ScenarioRunner, TestData};
use shopwright_cli::{
    build_runner, load_suite_config, select_scenarios, Cli, CliConfig, CliError, CliResult,
    ColorChoice, Commands, ConfigArgs, FormatArg, Reporter, RunArgs, RunReport, Verbosity,
};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::List => {
            run_list(&config);
            Ok(())
        }
        Commands::Run(args) => run_scenarios(&config, &args),
        Commands::Config(args) => run_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(ColorChoice::from(cli.color))
        .with_log_json(cli.log_json)
}

fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn reporter(config: &CliConfig) -> Reporter {
    Reporter::new(config.color.should_color(), config.verbosity.is_quiet())
        .with_steps(config.verbosity.is_verbose())
}

fn run_list(config: &CliConfig) {
    let reporter = reporter(config);
    reporter.header("Scenarios");
    reporter.scenario_list(&Scenario::ALL);
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let suite = load_suite_config(&args.env)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&suite)?);
        return Ok(());
    }
    println!("Base URL:            {}", suite.base_url);
    println!("Scenario timeout:    {} ms", suite.suite_timeout.as_millis());
    println!("Action timeout:      {} ms", suite.action_timeout.as_millis());
    println!("Navigation timeout:  {} ms", suite.navigation_timeout.as_millis());
    println!("Viewport:            {}x{}", suite.viewport_width, suite.viewport_height);
    println!("Headless:            {}", suite.headless);
    println!(
        "Chromium:            {}",
        suite.chromium_path.as_deref().unwrap_or("auto-detect")
    );
    Ok(())
}

fn run_scenarios(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    // Bad ids and missing configuration fail before a browser starts.
    let scenarios = select_scenarios(&args.scenarios)?;
    let suite = load_suite_config(&args.env)?;
    let data = TestData::load(&args.data)?;
    let runner = build_runner(args, suite, data.guest_user);

    tracing::info!(
        scenarios = scenarios.len(),
        parallel = args.parallel,
        base_url = %runner.config().base_url,
        "starting run"
    );
    let started = Instant::now();
    let outcomes = execute(&runner, &scenarios, args.parallel)?;
    let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let report = RunReport::new(&outcomes, elapsed);

    if let Some(path) = &args.output {
        report.write_to(path)?;
    }
    match args.format {
        FormatArg::Json => println!("{}", report.to_json()?),
        FormatArg::Text => {
            let reporter = reporter(config);
            reporter.header("Demo Web Shop checkout");
            for outcome in &outcomes {
                reporter.outcome(outcome);
            }
            reporter.summary(&report);
        }
    }

    if report.failed > 0 {
        return Err(CliError::test_execution(format!(
            "{} of {} scenarios failed",
            report.failed,
            outcomes.len()
        )));
    }
    Ok(())
}

#[cfg(feature = "browser")]
fn execute(
    runner: &ScenarioRunner,
    scenarios: &[Scenario],
    parallel: bool,
) -> CliResult<Vec<ScenarioOutcome>> {
    use shopwright::{Browser, BrowserConfig};

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(async {
        let browser = Browser::launch(BrowserConfig::from_suite(runner.config())).await?;
        let outcomes = runner
            .run_all(scenarios, parallel, || browser.new_driver())
            .await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser did not shut down cleanly");
        }
        Ok::<_, CliError>(outcomes)
    })
}

#[cfg(not(feature = "browser"))]
fn execute(
    _runner: &ScenarioRunner,
    _scenarios: &[Scenario],
    _parallel: bool,
) -> CliResult<Vec<ScenarioOutcome>> {
    Err(CliError::config(
        "live runs need the browser feature. Rebuild with --features browser",
    ))
}
