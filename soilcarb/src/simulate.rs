//! Scenario driver for `soilcarb run`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::core::history::HistoryEntry;
use crate::core::types::{Forcing, PartialState, SystemState};
use crate::core::units::{celsius_from_modis_lst, soc_from_openlandmap};
use crate::io::config::ScenarioConfig;
use crate::model::ModelRunner;

/// Raw remote-sensing samples that replace initial values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleOverrides {
    /// OpenLandMap organic-carbon sample (5 g/kg units).
    pub soc_sample: Option<f64>,
    /// MODIS land-surface-temperature sample (0.02 K units).
    pub lst_sample: Option<f64>,
}

impl SampleOverrides {
    pub fn apply(&self, initial: &mut PartialState) {
        if let Some(raw) = self.soc_sample {
            initial.soc = Some(soc_from_openlandmap(raw));
        }
        if let Some(raw) = self.lst_sample {
            initial.temp = Some(celsius_from_modis_lst(raw));
        }
    }
}

/// Summary of a driven run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub steps_executed: usize,
    pub final_state: SystemState,
}

/// Build a runner from a validated scenario.
pub fn build_runner(cfg: &ScenarioConfig, samples: &SampleOverrides) -> Result<ModelRunner> {
    let mut initial = cfg.initial;
    samples.apply(&mut initial);
    let runner = ModelRunner::from_partial(initial, cfg.parameters, cfg.output.runner_options())
        .context("initial state")?;
    Ok(runner)
}

/// Step `runner` once per forcing, calling `on_step` after each commit.
///
/// Stops at the first failing step; the runner keeps every step committed
/// before it.
#[instrument(skip_all)]
pub fn run_schedule<I, F>(
    runner: &mut ModelRunner,
    schedule: I,
    mut on_step: F,
) -> Result<RunOutcome>
where
    I: IntoIterator<Item = Forcing>,
    F: FnMut(&HistoryEntry),
{
    let mut steps_executed = 0usize;
    for forcing in schedule {
        let step = runner.history().next_step();
        let entry = runner
            .step(forcing)
            .with_context(|| format!("step {step}"))?;
        on_step(entry);
        steps_executed += 1;
    }
    let final_state = *runner.state();
    info!(steps_executed, soc = final_state.soc, co2 = final_state.co2, "run finished");
    Ok(RunOutcome {
        steps_executed,
        final_state,
    })
}

/// Resolve forcing, build the runner, and run the whole scenario.
///
/// `cfg` is validated here, so it may be built in code or changed after
/// [`load_config`](crate::io::config::load_config). `base_dir` resolves
/// relative paths in the scenario. `step_limit` truncates the resolved
/// schedule.
pub fn run_scenario(
    cfg: &ScenarioConfig,
    base_dir: &Path,
    samples: &SampleOverrides,
    step_limit: Option<usize>,
) -> Result<(ModelRunner, RunOutcome)> {
    cfg.validate()?;
    let mut runner = build_runner(cfg, samples)?;
    let mut schedule = cfg.forcing.resolve(runner.state().temp, base_dir)?;
    if let Some(limit) = step_limit {
        schedule.truncate(limit);
    }
    debug!(steps = schedule.len(), "forcing resolved");
    let outcome = run_schedule(&mut runner, schedule.iter(), |_| {})?;
    Ok((runner, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SimulationError;
    use crate::test_support::reference_runner;

    #[test]
    fn runs_every_forcing_and_reports_each_step() {
        let mut runner = reference_runner();
        let schedule = vec![Forcing::new(0.5, 1.0, 0.1); 4];
        let mut seen = Vec::new();

        let outcome = run_schedule(&mut runner, schedule, |entry| seen.push(entry.step))
            .expect("run");

        assert_eq!(outcome.steps_executed, 4);
        assert_eq!(seen, vec![1, 2, 3, 4]);
        assert_eq!(outcome.final_state, *runner.state());
        assert_eq!(runner.state().temp, 22.0);
    }

    #[test]
    fn failing_step_keeps_earlier_commits() {
        let mut runner = reference_runner();
        let schedule = [
            Forcing::default(),
            Forcing::default(),
            Forcing::new(f64::NAN, 0.0, 0.0),
            Forcing::default(),
        ];

        let err = run_schedule(&mut runner, schedule, |_| {}).expect_err("nan forcing");

        assert!(err.to_string().contains("step 3"));
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::InvalidForcing { field: "dtemp", .. })
        ));
        assert_eq!(runner.history().len(), 2);
    }

    #[test]
    fn samples_replace_initial_values() {
        let mut cfg = ScenarioConfig::default();
        cfg.forcing.steps = 0;
        let samples = SampleOverrides {
            soc_sample: Some(53.0),
            lst_sample: Some(14_800.0),
        };

        let runner = build_runner(&cfg, &samples).expect("runner");

        assert!((runner.state().soc - 53.0 / 5.0 * 1000.0 / 2.65).abs() < 1e-9);
        assert!((runner.state().temp - (14_800.0 * 0.02 - 273.15)).abs() < 1e-9);
    }

    #[test]
    fn step_limit_truncates_the_schedule() {
        let cfg = ScenarioConfig::default();
        let (runner, outcome) =
            run_scenario(&cfg, Path::new("."), &SampleOverrides::default(), Some(5))
                .expect("run");
        assert_eq!(outcome.steps_executed, 5);
        assert_eq!(runner.history().len(), 5);
    }

    #[test]
    fn huge_step_count_runs_only_up_to_the_limit() {
        let mut cfg = ScenarioConfig::default();
        cfg.forcing.steps = u32::MAX;
        let (runner, outcome) =
            run_scenario(&cfg, Path::new("."), &SampleOverrides::default(), Some(3))
                .expect("run");
        assert_eq!(outcome.steps_executed, 3);
        assert_eq!(runner.history().len(), 3);
    }

    #[test]
    fn scenario_built_in_code_is_validated() {
        let mut cfg = ScenarioConfig::default();
        cfg.parameters.mic_to_soc = 2.0;
        let err = run_scenario(&cfg, Path::new("."), &SampleOverrides::default(), Some(1))
            .expect_err("invalid partition");
        assert!(err.to_string().contains("mic_to_soc"));
    }

    #[test]
    fn incomplete_initial_state_is_reported() {
        let cfg = ScenarioConfig {
            initial: PartialState {
                soc: Some(1000.0),
                ..PartialState::default()
            },
            ..ScenarioConfig::default()
        };
        let err = build_runner(&cfg, &SampleOverrides::default()).expect_err("missing");
        assert!(matches!(
            err.downcast_ref::<SimulationError>(),
            Some(SimulationError::MissingState { .. })
        ));
    }
}
