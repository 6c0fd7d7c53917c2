use std::fmt::Display;

use brawl_shared::*;
use brawl_sim::{BatchEnv, FightingEnv, StepResult};
use numpy::{PyArray1, PyArrayMethods, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

fn value_error(e: impl Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn build_config(config_json: Option<&str>, lenient_actions: bool) -> PyResult<SimConfig> {
    let mut config = match config_json {
        Some(json) => SimConfig::from_json_str(json).map_err(value_error)?,
        None => SimConfig::default(),
    };
    if lenient_actions {
        config.episode.invalid_actions = InvalidActionMode::TreatAsIdle;
    }
    Ok(config)
}

fn preset_weights(name: &str) -> PyResult<RewardWeights> {
    RewardPreset::from_name(name)
        .map(RewardPreset::weights)
        .ok_or_else(|| value_error(format!("unknown reward preset '{name}', expected v1 or v2")))
}

/// Overlay the provided weights on `base`, in `RewardWeights` field order.
fn merge_weights(base: RewardWeights, overrides: [Option<f32>; 8]) -> RewardWeights {
    let [damage_dealt, damage_taken, approach, efficiency, corner_penalty, corner_margin, win_bonus, loss_penalty] =
        overrides;
    RewardWeights {
        damage_dealt: damage_dealt.unwrap_or(base.damage_dealt),
        damage_taken: damage_taken.unwrap_or(base.damage_taken),
        approach: approach.unwrap_or(base.approach),
        efficiency: efficiency.unwrap_or(base.efficiency),
        corner_penalty: corner_penalty.unwrap_or(base.corner_penalty),
        corner_margin: corner_margin.unwrap_or(base.corner_margin),
        win_bonus: win_bonus.unwrap_or(base.win_bonus),
        loss_penalty: loss_penalty.unwrap_or(base.loss_penalty),
    }
}

fn fill_step_info(info: &Bound<'_, PyDict>, result: &StepResult) -> PyResult<()> {
    let b = &result.breakdown;
    info.set_item("opponent_action", result.opponent_action.index())?;
    info.set_item("reward_damage_dealt", b.damage_dealt)?;
    info.set_item("reward_damage_taken", b.damage_taken)?;
    info.set_item("reward_approach", b.approach)?;
    info.set_item("reward_efficiency", b.efficiency)?;
    info.set_item("reward_corner", b.corner)?;
    info.set_item("reward_terminal", b.terminal)?;
    Ok(())
}

fn fill_episode_info(info: &Bound<'_, PyDict>, result: &EpisodeResult) -> PyResult<()> {
    info.set_item("outcome", format!("{:?}", result.outcome))?;
    info.set_item("reason", format!("{:?}", result.reason))?;
    info.set_item("final_tick", result.final_tick)?;
    info.set_item("episode_reward", result.total_reward)?;
    info.set_item("hits", result.stats.hits.to_vec())?;
    info.set_item("damage_dealt", result.stats.damage_dealt.to_vec())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Single env
// ---------------------------------------------------------------------------

/// Gym-like environment wrapping the fighting sim.
///
/// Usage:
///     env = FightingEnv(seed=42)
///     obs = env.reset()
///     obs, reward, terminated, truncated, info = env.step(6)
#[pyclass(name = "FightingEnv", unsendable)]
struct PyFightingEnv {
    env: FightingEnv,
}

#[pymethods]
impl PyFightingEnv {
    #[new]
    #[pyo3(signature = (seed=0, config_json=None, lenient_actions=false))]
    fn new(seed: u64, config_json: Option<&str>, lenient_actions: bool) -> PyResult<Self> {
        let config = build_config(config_json, lenient_actions)?;
        let env = FightingEnv::new(config, seed).map_err(value_error)?;
        Ok(Self { env })
    }

    /// Reset the environment. Returns observation (list of 16 floats).
    #[pyo3(signature = (seed=None))]
    fn reset(&mut self, seed: Option<u64>) -> Vec<f32> {
        self.env.reset(seed).data.to_vec()
    }

    /// Step with an action index in 0..=8.
    /// Returns (obs, reward, terminated, truncated, info_dict).
    fn step<'py>(&mut self, py: Python<'py>, action: i64) -> PyResult<(Vec<f32>, f32, bool, bool, Bound<'py, PyDict>)> {
        let result = self.env.step(action).map_err(value_error)?;

        let info = PyDict::new_bound(py);
        info.set_item("step", self.env.episode().step_count)?;
        fill_step_info(&info, &result)?;
        if let Some(episode) = self.env.result() {
            fill_episode_info(&info, &episode)?;
        }

        Ok((
            result.observation.data.to_vec(),
            result.reward,
            result.terminated,
            result.truncated,
            info,
        ))
    }

    /// Set reward weights. Keyword-only arguments; omitted ones keep their value.
    #[pyo3(signature = (
        damage_dealt=None,
        damage_taken=None,
        approach=None,
        efficiency=None,
        corner_penalty=None,
        corner_margin=None,
        win_bonus=None,
        loss_penalty=None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn set_rewards(
        &mut self,
        damage_dealt: Option<f32>,
        damage_taken: Option<f32>,
        approach: Option<f32>,
        efficiency: Option<f32>,
        corner_penalty: Option<f32>,
        corner_margin: Option<f32>,
        win_bonus: Option<f32>,
        loss_penalty: Option<f32>,
    ) -> PyResult<()> {
        let weights = merge_weights(
            self.env.config().reward,
            [
                damage_dealt,
                damage_taken,
                approach,
                efficiency,
                corner_penalty,
                corner_margin,
                win_bonus,
                loss_penalty,
            ],
        );
        self.env.set_reward_weights(weights).map_err(value_error)
    }

    /// Switch to a named reward preset ("v1" or "v2").
    fn use_preset(&mut self, name: &str) -> PyResult<()> {
        let weights = preset_weights(name)?;
        self.env.set_reward_weights(weights).map_err(value_error)
    }

    /// Current config as a JSON string.
    fn config_json(&self) -> String {
        self.env.config().to_json_pretty()
    }

    #[getter]
    fn obs_size(&self) -> usize {
        OBS_SIZE
    }

    #[getter]
    fn action_count(&self) -> usize {
        ACTION_COUNT
    }

    #[getter]
    fn current_step(&self) -> u32 {
        self.env.episode().step_count
    }

    #[getter]
    fn max_steps(&self) -> u32 {
        self.env.config().episode.max_steps
    }

    #[getter]
    fn opponent(&self) -> String {
        self.env.opponent_name().to_string()
    }
}

// ---------------------------------------------------------------------------
// BatchEnv, stepped in parallel with rayon
// ---------------------------------------------------------------------------

/// Vectorized environment that steps all N envs in parallel.
///
/// Usage:
///     batch = BatchEnv(64, seed=0)
///     obs = batch.reset()                      # numpy (64, 16)
///     obs, rewards, terminated, truncated, infos = batch.step(actions)  # actions: numpy (64,) int64
///
/// Finished envs are reset automatically; their final observation is in
/// `infos[i]["terminal_observation"]`.
#[pyclass(name = "BatchEnv", unsendable)]
struct PyBatchEnv {
    batch: BatchEnv,
}

#[pymethods]
impl PyBatchEnv {
    #[new]
    #[pyo3(signature = (n_envs, seed=0, config_json=None, lenient_actions=false))]
    fn new(n_envs: usize, seed: u64, config_json: Option<&str>, lenient_actions: bool) -> PyResult<Self> {
        if n_envs == 0 {
            return Err(value_error("n_envs must be at least 1"));
        }
        let config = build_config(config_json, lenient_actions)?;
        let batch = BatchEnv::new(config, n_envs, seed).map_err(value_error)?;
        Ok(Self { batch })
    }

    /// Reset all environments. Returns obs as numpy array (n_envs, OBS_SIZE).
    fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, numpy::PyArray2<f32>>> {
        let flat: Vec<f32> = self.batch.reset().iter().flat_map(|o| o.data).collect();
        PyArray1::from_vec_bound(py, flat).reshape([self.batch.len(), OBS_SIZE])
    }

    /// Step all environments in parallel.
    ///
    /// Args:
    ///     actions: numpy array (n_envs,) int64
    ///
    /// Returns: (obs, rewards, terminated, truncated, infos)
    #[allow(clippy::type_complexity)]
    fn step<'py>(
        &mut self,
        py: Python<'py>,
        actions: PyReadonlyArray1<i64>,
    ) -> PyResult<(
        Bound<'py, numpy::PyArray2<f32>>,
        Bound<'py, PyArray1<f32>>,
        Bound<'py, PyArray1<bool>>,
        Bound<'py, PyArray1<bool>>,
        Bound<'py, PyList>,
    )> {
        let actions = actions.as_array().to_vec();
        let steps = self.batch.step(&actions).map_err(value_error)?;

        let mut obs = Vec::with_capacity(steps.len() * OBS_SIZE);
        let mut rewards = Vec::with_capacity(steps.len());
        let mut terminated = Vec::with_capacity(steps.len());
        let mut truncated = Vec::with_capacity(steps.len());
        let infos = PyList::empty_bound(py);

        for step in &steps {
            obs.extend_from_slice(&step.next_observation().data);
            rewards.push(step.result.reward);
            terminated.push(step.result.terminated);
            truncated.push(step.result.truncated);

            let info = PyDict::new_bound(py);
            fill_step_info(&info, &step.result)?;
            if let Some(episode) = &step.episode {
                fill_episode_info(&info, episode)?;
                info.set_item("terminal_observation", step.result.observation.data.to_vec())?;
            }
            infos.append(info)?;
        }

        Ok((
            PyArray1::from_vec_bound(py, obs).reshape([steps.len(), OBS_SIZE])?,
            PyArray1::from_vec_bound(py, rewards),
            PyArray1::from_vec_bound(py, terminated),
            PyArray1::from_vec_bound(py, truncated),
            infos,
        ))
    }

    #[pyo3(signature = (
        damage_dealt=None,
        damage_taken=None,
        approach=None,
        efficiency=None,
        corner_penalty=None,
        corner_margin=None,
        win_bonus=None,
        loss_penalty=None,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn set_rewards(
        &mut self,
        damage_dealt: Option<f32>,
        damage_taken: Option<f32>,
        approach: Option<f32>,
        efficiency: Option<f32>,
        corner_penalty: Option<f32>,
        corner_margin: Option<f32>,
        win_bonus: Option<f32>,
        loss_penalty: Option<f32>,
    ) -> PyResult<()> {
        let base = self
            .batch
            .envs()
            .first()
            .map(|env| env.config().reward)
            .unwrap_or_default();
        let weights = merge_weights(
            base,
            [
                damage_dealt,
                damage_taken,
                approach,
                efficiency,
                corner_penalty,
                corner_margin,
                win_bonus,
                loss_penalty,
            ],
        );
        self.batch.set_reward_weights(weights).map_err(value_error)
    }

    fn use_preset(&mut self, name: &str) -> PyResult<()> {
        let weights = preset_weights(name)?;
        self.batch.set_reward_weights(weights).map_err(value_error)
    }

    /// Number of environments.
    #[getter]
    fn n(&self) -> usize {
        self.batch.len()
    }

    #[getter]
    fn obs_size(&self) -> usize {
        OBS_SIZE
    }

    #[getter]
    fn action_count(&self) -> usize {
        ACTION_COUNT
    }
}

/// Python module definition.
#[pymodule]
fn brawl_pyenv(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyFightingEnv>()?;
    m.add_class::<PyBatchEnv>()?;
    m.add("OBS_SIZE", OBS_SIZE)?;
    m.add("ACTION_COUNT", ACTION_COUNT)?;
    m.add("MAX_STEPS", MAX_STEPS)?;
    Ok(())
}
