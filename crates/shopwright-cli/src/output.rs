//! Output formatting for scenario results

use crate::error::CliResult;
use console::{style, Style, Term};
use serde::Serialize;
use shopwright::checkout::StepStatus;
use shopwright::{Scenario, ScenarioOutcome, ScenarioStatus};
use std::path::Path;
use std::time::Duration;

/// JSON report covering one CLI run
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    /// Scenarios that passed
    pub passed: usize,
    /// Scenarios that failed or timed out
    pub failed: usize,
    /// Wall-clock time of the whole run
    pub duration_ms: u64,
    /// Per-scenario outcomes in request order
    pub outcomes: &'a [ScenarioOutcome],
}

impl<'a> RunReport<'a> {
    /// Summarize a set of outcomes
    #[must_use]
    pub fn new(outcomes: &'a [ScenarioOutcome], duration_ms: u64) -> Self {
        let passed = outcomes.iter().filter(|o| o.passed()).count();
        Self {
            passed,
            failed: outcomes.len() - passed,
            duration_ms,
            outcomes,
        }
    }

    /// Pretty JSON text
    pub fn to_json(&self) -> CliResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to a file
    pub fn write_to(&self, path: &Path) -> CliResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Terminal reporter for scenario runs
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Show per-step lines
    pub show_steps: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter writing to stdout
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
            show_steps: false,
        }
    }

    /// Print each step under its scenario
    #[must_use]
    pub const fn with_steps(mut self, show_steps: bool) -> Self {
        self.show_steps = show_steps;
        self
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the scenario catalogue
    pub fn scenario_list(&self, scenarios: &[Scenario]) {
        for scenario in scenarios {
            let id = if self.use_color {
                style(scenario.id()).cyan().bold().to_string()
            } else {
                scenario.id().to_string()
            };
            let marker = if scenario.places_order() { "  (places an order)" } else { "" };
            let _ = self
                .term
                .write_line(&format!("{id}  {}{marker}", scenario.title()));
        }
    }

    /// Print one scenario result
    pub fn outcome(&self, outcome: &ScenarioOutcome) {
        // Failures print even in quiet mode
        if self.quiet && outcome.passed() {
            return;
        }
        let line = format!("{} ({} ms)", outcome.scenario, outcome.duration_ms);
        let _ = self
            .term
            .write_line(&format!("{} {line}", self.status_prefix(outcome.status)));

        if self.show_steps {
            for step in &outcome.steps {
                let _ = self.term.write_line(&format!(
                    "    {} {} ({} ms)",
                    self.step_marker(step.status),
                    step.name,
                    step.duration_ms
                ));
            }
            for step in &outcome.checkout_steps {
                let detail = step.detail.as_deref().map(|d| format!(" [{d}]")).unwrap_or_default();
                let _ = self.term.write_line(&format!(
                    "      {} {}{detail} ({} ms)",
                    self.step_marker(step.status),
                    step.step,
                    step.duration_ms
                ));
            }
        }

        if let Some(confirmation) = &outcome.confirmation {
            let total = confirmation
                .order_total
                .map(|t| format!(", total {t}"))
                .unwrap_or_default();
            let _ = self.term.write_line(&format!(
                "    order {}{total}",
                confirmation.order_number
            ));
        }
        if let Some(error) = &outcome.error {
            let step = outcome
                .failed_step()
                .map(|s| format!("[{s}] "))
                .unwrap_or_default();
            let _ = self.term.write_line(&format!("    {step}{error}"));
        }
    }

    /// Print the run summary
    pub fn summary(&self, report: &RunReport<'_>) {
        if self.quiet && report.failed == 0 {
            return;
        }
        let _ = self.term.write_line("");
        let duration_secs = Duration::from_millis(report.duration_ms).as_secs_f64();
        let counts = format!(
            "{} passed, {} failed ({duration_secs:.2}s)",
            report.passed, report.failed
        );
        let line = if self.use_color {
            let status = if report.failed > 0 {
                Style::new().red().bold().apply_to("FAILED")
            } else {
                Style::new().green().bold().apply_to("PASSED")
            };
            format!("{status}: {counts}")
        } else if report.failed > 0 {
            format!("FAILED: {counts}")
        } else {
            format!("PASSED: {counts}")
        };
        let _ = self.term.write_line(&line);
    }

    fn status_prefix(&self, status: ScenarioStatus) -> String {
        match (status, self.use_color) {
            (ScenarioStatus::Passed, true) => style("✓").green().bold().to_string(),
            (ScenarioStatus::Failed, true) => style("✗").red().bold().to_string(),
            (ScenarioStatus::TimedOut, true) => style("⏱").yellow().bold().to_string(),
            (ScenarioStatus::Passed, false) => "PASS".to_string(),
            (ScenarioStatus::Failed, false) => "FAIL".to_string(),
            (ScenarioStatus::TimedOut, false) => "TIME".to_string(),
        }
    }

    fn step_marker(&self, status: StepStatus) -> String {
        let (plain, styled) = match status {
            StepStatus::Passed => ("ok", style("ok").green()),
            StepStatus::Skipped => ("skip", style("skip").dim()),
            StepStatus::Failed => ("fail", style("fail").red()),
        };
        if self.use_color {
            styled.to_string()
        } else {
            plain.to_string()
        }
    }
}
