use color_eyre::Result;
use colored::*;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const RULE_WIDTH: usize = 64;
const SLOWEST_SHOWN: usize = 3;

/// Runs the listed scenarios in order against one context, stopping at the
/// first failure, then prints the timings.
#[macro_export]
macro_rules! execute_suite {
    ($context:expr, [ $($scenario:ident),* $(,)? ]) => {{
        let planned = [$(stringify!($scenario)),*].len();
        let mut report = $crate::runner::orchestration_utils::SuiteReport::new(planned);
        $(
            report.step(stringify!($scenario), $scenario($context)).await?;
        )*
        report.print_summary();
    }};
}

/// Timings of the scenarios of one suite run.
pub struct SuiteReport {
    planned: usize,
    started: Instant,
    steps: Vec<(&'static str, Duration)>,
}

impl SuiteReport {
    #[must_use]
    pub fn new(planned: usize) -> Self {
        println!();
        Self {
            planned,
            started: Instant::now(),
            steps: Vec::with_capacity(planned),
        }
    }

    /// Runs one scenario and records how long it took. A failure is printed
    /// with its position in the suite and handed back.
    pub async fn step<Fut>(&mut self, name: &'static str, scenario: Fut) -> Result<()>
    where
        Fut: Future<Output = Result<()>>,
    {
        let position = format!("[{}/{}]", self.steps.len() + 1, self.planned);
        println!("{}", rule());
        println!("{} {} {}", position.dimmed(), "▶".cyan(), name.cyan().bold());

        let started = Instant::now();
        let outcome = scenario.await;
        let took = started.elapsed();

        match &outcome {
            Ok(()) => {
                println!("{} {} {name} ({took:.2?})", position.dimmed(), "✔".green().bold());
                self.steps.push((name, took));
            }
            Err(e) => {
                println!(
                    "{} {} {} ({took:.2?}), {} of {} passed before it",
                    position.dimmed(),
                    "✘".red().bold(),
                    name.red().bold(),
                    self.steps.len(),
                    self.planned
                );
                println!("\n{e:?}");
            }
        }
        outcome
    }

    /// Scenarios ordered from slowest, at most `limit` of them.
    #[must_use]
    pub fn slowest(&self, limit: usize) -> Vec<(&'static str, Duration)> {
        let mut steps = self.steps.clone();
        steps.sort_by(|a, b| b.1.cmp(&a.1));
        steps.truncate(limit);
        steps
    }

    pub fn print_summary(&self) {
        println!("{}", rule());
        println!(
            "{} {}/{} scenarios passed in {:.2?}",
            " SUITE ".on_blue().white().bold(),
            self.steps.len(),
            self.planned,
            self.started.elapsed()
        );
        for (name, took) in self.slowest(SLOWEST_SHOWN) {
            println!("  {} {name} {took:.2?}", "slow:".yellow());
        }
        println!("{}", rule());
        println!();
    }
}

fn rule() -> ColoredString {
    "┄".repeat(RULE_WIDTH).truecolor(90, 90, 90)
}

/// Installs log output for the suite and colored error reports. Safe to call
/// when either is already installed.
pub fn setup_tracing_and_panic_handling() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,sqlx=warn,api=debug,worker=debug,hyper=error,reqwest=error")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_test_writer()
        .try_init()
        .ok();
    color_eyre::install().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summary_orders_steps_by_duration() -> Result<()> {
        let mut report = SuiteReport::new(3);
        report.steps.push(("quick", Duration::from_millis(50)));
        report.steps.push(("slow", Duration::from_millis(900)));
        report.step("instant", async { Ok(()) }).await?;

        let slowest = report.slowest(2);
        assert_eq!(slowest.len(), 2);
        assert_eq!(slowest[0].0, "slow");
        assert_eq!(slowest[1].0, "quick");
        Ok(())
    }

    #[tokio::test]
    async fn failed_step_is_not_recorded() {
        let mut report = SuiteReport::new(1);
        let outcome = report
            .step("broken", async { Err(color_eyre::eyre::eyre!("boom")) })
            .await;
        assert!(outcome.is_err());
        assert!(report.slowest(SLOWEST_SHOWN).is_empty());
    }
}
