//! Orchestration for a single simulation step.
//!
//! [`ModelRunner`] owns the state, the five kinetic processes, and the
//! history log. Each step runs the processes in a fixed order against a
//! candidate state and commits only once every flux and update succeeded.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::SimulationError;
use crate::core::history::{HistoryEntry, HistoryLog};
use crate::core::intermediate::{IntermediateVariables, IvKey};
use crate::core::invariants::{negative_stocks, validate_state};
use crate::core::kinetics::{
    CarbonUse, EnzymeCatalysis, EnzymeProductionDecay, KineticProcess, MicDeath, ProcessOutput,
    Uptake,
};
use crate::core::state_update::{DEFAULT_MIC_TO_SOC, apply_state_updates};
use crate::core::types::{Forcing, PartialState, SystemState};

/// Kinetic parameters for every process plus the death partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Fraction of dead biomass returned to SOC; the remainder goes to DOC.
    pub mic_to_soc: f64,
    pub catalysis: EnzymeCatalysis,
    pub uptake: Uptake,
    pub carbon_use: CarbonUse,
    pub enzyme: EnzymeProductionDecay,
    pub death: MicDeath,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            mic_to_soc: DEFAULT_MIC_TO_SOC,
            catalysis: EnzymeCatalysis::default(),
            uptake: Uptake::default(),
            carbon_use: CarbonUse::default(),
            enzyme: EnzymeProductionDecay::default(),
            death: MicDeath::default(),
        }
    }
}

/// Caller-selected behavior that changes observable results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerOptions {
    /// Keep each step's intermediate variables on its history entry.
    pub record_diagnostics: bool,
    /// Clamp carbon-use efficiency to `[0, 1]` before the update equations.
    pub clamp_cue: bool,
}

/// Lifecycle of a runner. There is no terminal phase; a run ends when the
/// caller stops stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// State is set and no step has completed.
    Initialized,
    /// At least one step has completed.
    Stepping,
}

#[derive(Debug, Clone)]
pub struct ModelRunner {
    state: SystemState,
    catalysis: EnzymeCatalysis,
    uptake: Uptake,
    carbon_use: CarbonUse,
    enzyme: EnzymeProductionDecay,
    death: MicDeath,
    mic_to_soc: f64,
    options: RunnerOptions,
    history: HistoryLog,
    last_intermediates: Option<IntermediateVariables>,
    last_process_order: Vec<&'static str>,
}

impl ModelRunner {
    pub fn new(state: SystemState, params: ModelParameters, options: RunnerOptions) -> Self {
        Self {
            state,
            catalysis: params.catalysis,
            uptake: params.uptake,
            carbon_use: params.carbon_use,
            enzyme: params.enzyme,
            death: params.death,
            mic_to_soc: params.mic_to_soc,
            options,
            history: HistoryLog::new(),
            last_intermediates: None,
            last_process_order: Vec::new(),
        }
    }

    /// Build a runner from caller-supplied values, failing with
    /// [`SimulationError::MissingState`] if any variable is absent.
    pub fn from_partial(
        initial: PartialState,
        params: ModelParameters,
        options: RunnerOptions,
    ) -> Result<Self, SimulationError> {
        let state = SystemState::try_from(initial)?;
        Ok(Self::new(state, params, options))
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    /// Mutable access for external perturbations between steps.
    ///
    /// Entries already in the history are unaffected.
    pub fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Intermediate variables of the most recent completed step.
    pub fn last_intermediates(&self) -> Option<&IntermediateVariables> {
        self.last_intermediates.as_ref()
    }

    /// Names of the processes the most recent completed step invoked, in
    /// invocation order. Empty before the first step.
    pub fn last_process_order(&self) -> &[&'static str] {
        &self.last_process_order
    }

    pub fn phase(&self) -> RunPhase {
        if self.history.is_empty() {
            RunPhase::Initialized
        } else {
            RunPhase::Stepping
        }
    }

    /// Advance the simulation by one step.
    ///
    /// Applies `dtemp`, runs the processes in order, applies the update
    /// equations, and appends the new state to the history. On error nothing
    /// is mutated.
    pub fn step(&mut self, forcing: Forcing) -> Result<&HistoryEntry, SimulationError> {
        validate_state(&self.state)?;
        forcing.validate()?;

        let step = self.history.next_step();
        let mut candidate = self.state;
        candidate.temp += forcing.dtemp;

        let mut order = Vec::with_capacity(5);
        let iv = self.compute_intermediates(&candidate, &mut order)?;
        let next = apply_state_updates(&candidate, &iv, &forcing, self.mic_to_soc)?;

        let negative = negative_stocks(&next);
        if !negative.is_empty() {
            warn!(step, stocks = ?negative, "negative carbon stocks after update");
        }
        debug!(
            step,
            soc = next.soc,
            doc = next.doc,
            mic = next.mic,
            enz = next.enz,
            co2 = next.co2,
            temp = next.temp,
            processes = ?order,
            "step complete"
        );

        self.state = next;
        let diagnostics = self.options.record_diagnostics.then(|| iv.clone());
        self.last_intermediates = Some(iv);
        self.last_process_order = order;
        Ok(self.history.append(HistoryEntry {
            step,
            state: next,
            diagnostics,
        }))
    }

    fn compute_intermediates(
        &self,
        state: &SystemState,
        order: &mut Vec<&'static str>,
    ) -> Result<IntermediateVariables, SimulationError> {
        let mut iv = IntermediateVariables::new();
        invoke(&self.catalysis, state, &mut iv, order)?;
        invoke(&self.uptake, state, &mut iv, order)?;
        invoke(&self.carbon_use, state, &mut iv, order)?;
        if self.options.clamp_cue {
            let cue = iv.require(IvKey::Cue)?;
            iv.insert(IvKey::Cue, cue.clamp(0.0, 1.0));
        }
        invoke(&self.enzyme, state, &mut iv, order)?;
        invoke(&self.death, state, &mut iv, order)?;
        Ok(iv)
    }
}

fn invoke<P: KineticProcess>(
    process: &P,
    state: &SystemState,
    iv: &mut IntermediateVariables,
    order: &mut Vec<&'static str>,
) -> Result<(), SimulationError> {
    let output = process.compute(state, iv)?;
    order.push(P::NAME);
    let overwritten = iv.merge(output.entries());
    if !overwritten.is_empty() {
        warn!(process = P::NAME, keys = ?overwritten, "process overwrote intermediate variables");
    }
    debug!(process = P::NAME, "process computed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Variable;

    fn reference_runner() -> ModelRunner {
        ModelRunner::new(
            SystemState::reference(),
            ModelParameters::default(),
            RunnerOptions::default(),
        )
    }

    #[test]
    fn new_runner_is_initialized() {
        let runner = reference_runner();
        assert_eq!(runner.phase(), RunPhase::Initialized);
        assert!(runner.history().is_empty());
        assert!(runner.last_intermediates().is_none());
    }

    #[test]
    fn step_appends_one_entry_and_starts_stepping() {
        let mut runner = reference_runner();
        let entry = runner.step(Forcing::default()).expect("step").clone();

        assert_eq!(entry.step, 1);
        assert_eq!(entry.state, *runner.state());
        assert_eq!(runner.history().len(), 1);
        assert_eq!(runner.phase(), RunPhase::Stepping);
    }

    #[test]
    fn every_intermediate_is_produced_each_step() {
        let mut runner = reference_runner();
        runner.step(Forcing::default()).expect("step");
        let iv = runner.last_intermediates().expect("intermediates");
        for key in IvKey::ALL {
            assert!(iv.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn processes_run_in_fixed_order_every_step() {
        let mut runner = reference_runner();
        assert!(runner.last_process_order().is_empty());
        let expected = [
            EnzymeCatalysis::NAME,
            Uptake::NAME,
            CarbonUse::NAME,
            EnzymeProductionDecay::NAME,
            MicDeath::NAME,
        ];
        assert_eq!(
            expected,
            [
                "enzyme_catalysis",
                "uptake",
                "carbon_use",
                "enzyme_production_decay",
                "mic_death",
            ]
        );

        for _ in 0..3 {
            runner.step(Forcing::new(0.5, 1.0, 0.1)).expect("step");
            assert_eq!(runner.last_process_order(), expected);
        }
    }

    #[test]
    fn clamping_does_not_change_process_order() {
        let mut runner = ModelRunner::new(
            SystemState::reference(),
            ModelParameters::default(),
            RunnerOptions {
                clamp_cue: true,
                ..RunnerOptions::default()
            },
        );
        runner.step(Forcing::default()).expect("step");
        assert_eq!(runner.last_process_order().len(), 5);
        assert_eq!(runner.last_process_order()[2], CarbonUse::NAME);
        assert_eq!(runner.last_process_order()[3], EnzymeProductionDecay::NAME);
    }

    #[test]
    fn processes_see_the_shifted_temperature() {
        let mut runner = reference_runner();
        runner.step(Forcing::new(5.0, 0.0, 0.0)).expect("step");
        let iv = runner.last_intermediates().expect("intermediates");
        assert_eq!(iv.get(IvKey::Km), Some(5.0 * 25.0 + 500.0));
        assert_eq!(runner.state().temp, 25.0);
    }

    #[test]
    fn diagnostics_are_recorded_only_when_requested() {
        let mut plain = reference_runner();
        plain.step(Forcing::default()).expect("step");
        assert!(plain.history().entries()[0].diagnostics.is_none());

        let mut recording = ModelRunner::new(
            SystemState::reference(),
            ModelParameters::default(),
            RunnerOptions {
                record_diagnostics: true,
                ..RunnerOptions::default()
            },
        );
        recording.step(Forcing::default()).expect("step");
        let diagnostics = recording.history().entries()[0]
            .diagnostics
            .as_ref()
            .expect("diagnostics");
        assert_eq!(diagnostics.len(), IvKey::ALL.len());
    }

    #[test]
    fn clamp_cue_bounds_efficiency() {
        let hot = SystemState {
            temp: 60.0,
            ..SystemState::reference()
        };
        let mut raw = ModelRunner::new(hot, ModelParameters::default(), RunnerOptions::default());
        raw.step(Forcing::default()).expect("step");
        let raw_cue = raw.last_intermediates().and_then(|iv| iv.get(IvKey::Cue));
        assert!(raw_cue.expect("cue") < 0.0);

        let mut clamped = ModelRunner::new(
            hot,
            ModelParameters::default(),
            RunnerOptions {
                clamp_cue: true,
                ..RunnerOptions::default()
            },
        );
        clamped.step(Forcing::default()).expect("step");
        let iv = clamped.last_intermediates().expect("intermediates");
        assert_eq!(iv.get(IvKey::Cue), Some(0.0));
        let death = iv.get(IvKey::Death).expect("death");
        let eprod = iv.get(IvKey::Eprod).expect("eprod");
        assert_eq!(clamped.state().mic, hot.mic - death - eprod);
    }

    #[test]
    fn missing_initial_values_are_rejected() {
        let err = ModelRunner::from_partial(
            PartialState {
                temp: Some(20.0),
                ..PartialState::default()
            },
            ModelParameters::default(),
            RunnerOptions::default(),
        )
        .expect_err("incomplete state");
        assert_eq!(
            err,
            SimulationError::MissingState {
                keys: vec![
                    Variable::Soc,
                    Variable::Doc,
                    Variable::Mic,
                    Variable::Enz,
                    Variable::Co2,
                ],
            }
        );
    }

    #[test]
    fn invalid_state_fails_without_mutation() {
        let mut runner = reference_runner();
        runner.step(Forcing::default()).expect("step");
        runner.state_mut().doc = f64::NAN;
        let before = runner.history().clone();

        let err = runner.step(Forcing::default()).expect_err("nan doc");
        assert!(matches!(
            err,
            SimulationError::InvalidState {
                key: Variable::Doc,
                ..
            }
        ));
        assert_eq!(runner.history(), &before);
    }

    #[test]
    fn domain_error_leaves_state_and_history_untouched() {
        let params = ModelParameters {
            catalysis: EnzymeCatalysis {
                km_0: -1000.0,
                km_slope: 0.0,
                ..EnzymeCatalysis::default()
            },
            ..ModelParameters::default()
        };
        let mut runner = ModelRunner::new(SystemState::reference(), params, RunnerOptions::default());

        let err = runner
            .step(Forcing::new(3.0, 1.0, 1.0))
            .expect_err("km + soc = 0");
        assert!(matches!(
            err,
            SimulationError::Domain {
                process: "enzyme_catalysis",
                ..
            }
        ));
        assert_eq!(*runner.state(), SystemState::reference());
        assert!(runner.history().is_empty());
        assert_eq!(runner.phase(), RunPhase::Initialized);
    }

    #[test]
    fn invalid_forcing_is_rejected() {
        let mut runner = reference_runner();
        let err = runner
            .step(Forcing::new(0.0, f64::INFINITY, 0.0))
            .expect_err("infinite input");
        assert!(matches!(
            err,
            SimulationError::InvalidForcing {
                field: "input_soc",
                ..
            }
        ));
        assert!(runner.history().is_empty());
    }
}
