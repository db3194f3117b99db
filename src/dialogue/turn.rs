//! Turn-selection policies.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::DialogueError;

use super::moderator::ModeratorSettings;

const SEED_KEY: &str = "seed";
const WEIGHT_PREFIX: &str = "weight:";

/// What a turn manager is told about the turn being scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnState<'a> {
    /// Zero-based index of the regular turn being scheduled.
    pub turn: usize,
    /// Participants eligible to speak, in declaration order.
    pub roster: &'a [String],
}

/// Decides which participant speaks next.
///
/// Implementations must only ever return names from `state.roster`, which
/// the conversation fills from [`TurnManager::roster`].
pub trait TurnManager: Send {
    /// Participant names, in declaration order.
    fn roster(&self) -> &[String];

    fn next_speaker(&mut self, state: &TurnState<'_>) -> String;

    fn policy(&self) -> TurnPolicy;
}

/// Available turn policies, keyed by their configuration tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPolicy {
    /// Cycle through the roster in declaration order.
    RoundRobin,
    /// Draw a speaker each turn, uniformly or by configured weight.
    Random,
}

impl TurnPolicy {
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::Random => "random",
        }
    }

    /// Resolves a configuration tag, case-insensitively.
    ///
    /// `round_robbin` is accepted as an alias of `round_robin`; older
    /// configuration files use that spelling.
    pub fn from_tag(tag: &str) -> Result<Self, DialogueError> {
        match tag.trim().to_lowercase().as_str() {
            "round_robin" | "round_robbin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            other => Err(DialogueError::config(format!(
                "there is no turn manager called '{other}'; valid values: round_robin, random"
            ))),
        }
    }
}

impl FromStr for TurnPolicy {
    type Err = DialogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl fmt::Display for TurnPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Deterministic rotation through the roster.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    usernames: Vec<String>,
    cursor: usize,
}

impl RoundRobin {
    pub fn new(usernames: Vec<String>) -> Result<Self, DialogueError> {
        ensure_roster(&usernames)?;
        Ok(Self {
            usernames,
            cursor: 0,
        })
    }
}

impl TurnManager for RoundRobin {
    fn roster(&self) -> &[String] {
        &self.usernames
    }

    fn next_speaker(&mut self, _state: &TurnState<'_>) -> String {
        let name = self.usernames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.usernames.len();
        name
    }

    fn policy(&self) -> TurnPolicy {
        TurnPolicy::RoundRobin
    }
}

/// Independent per-turn draw, weighted by participant.
#[derive(Debug, Clone)]
pub struct RandomTurns {
    usernames: Vec<String>,
    weights: Vec<f64>,
    dist: WeightedIndex<f64>,
    rng: StdRng,
}

impl RandomTurns {
    /// Uniform selection over the roster.
    pub fn uniform(usernames: Vec<String>, seed: Option<u64>) -> Result<Self, DialogueError> {
        let weights = vec![1.0; usernames.len()];
        Self::weighted(usernames, weights, seed)
    }

    /// Weighted selection; weights are normalized at draw time and need not sum to 1.
    pub fn weighted(
        usernames: Vec<String>,
        weights: Vec<f64>,
        seed: Option<u64>,
    ) -> Result<Self, DialogueError> {
        ensure_roster(&usernames)?;
        if weights.len() != usernames.len() {
            return Err(DialogueError::config(format!(
                "{} weights given for {} participants",
                weights.len(),
                usernames.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(DialogueError::config(format!(
                "turn weights must be finite and non-negative, got {bad}"
            )));
        }
        let dist = WeightedIndex::new(&weights)
            .map_err(|err| DialogueError::config(format!("invalid turn weights: {err}")))?;
        Ok(Self {
            usernames,
            weights,
            dist,
            rng: seeded_rng(seed),
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl TurnManager for RandomTurns {
    fn roster(&self) -> &[String] {
        &self.usernames
    }

    fn next_speaker(&mut self, _state: &TurnState<'_>) -> String {
        self.usernames[self.dist.sample(&mut self.rng)].clone()
    }

    fn policy(&self) -> TurnPolicy {
        TurnPolicy::Random
    }
}

/// Numeric `turn_manager_config` entries, parsed and checked.
///
/// Recognized keys: `seed`, `weight:<name>`, and the moderator keys handled
/// by [`ModeratorSettings`]. Anything else is logged and ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnSettings {
    pub seed: Option<u64>,
    pub weights: BTreeMap<String, f64>,
    pub moderator: ModeratorSettings,
}

impl TurnSettings {
    pub fn parse(config: &BTreeMap<String, f64>) -> Result<Self, DialogueError> {
        let mut settings = Self::default();
        for (key, &value) in config {
            if key == SEED_KEY {
                if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
                    return Err(DialogueError::config(format!(
                        "seed must be a non-negative integer, got {value}"
                    )));
                }
                settings.seed = Some(value as u64);
            } else if let Some(name) = key.strip_prefix(WEIGHT_PREFIX) {
                if !value.is_finite() || value < 0.0 {
                    return Err(DialogueError::config(format!(
                        "turn weight for '{name}' must be finite and non-negative, got {value}"
                    )));
                }
                settings.weights.insert(name.to_string(), value);
            } else if !settings.moderator.apply(key, value)? {
                log::warn!("ignoring unknown turn manager setting '{key}'");
            }
        }
        settings.moderator.validate()?;
        Ok(settings)
    }
}

/// Builds the turn manager named by `tag` over `usernames`.
pub fn build_turn_manager(
    tag: &str,
    usernames: &[String],
    settings: &TurnSettings,
) -> Result<Box<dyn TurnManager>, DialogueError> {
    let policy = TurnPolicy::from_tag(tag)?;
    if let Some(unknown) = settings.weights.keys().find(|k| !usernames.contains(k)) {
        return Err(DialogueError::config(format!(
            "turn weight given for unknown participant '{unknown}'"
        )));
    }
    let usernames = usernames.to_vec();
    match policy {
        TurnPolicy::RoundRobin => {
            if !settings.weights.is_empty() {
                log::warn!("turn weights are ignored by the round_robin policy");
            }
            Ok(Box::new(RoundRobin::new(usernames)?))
        }
        TurnPolicy::Random => {
            let weights = usernames
                .iter()
                .map(|name| settings.weights.get(name).copied().unwrap_or(1.0))
                .collect();
            Ok(Box::new(RandomTurns::weighted(
                usernames,
                weights,
                settings.seed,
            )?))
        }
    }
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn ensure_roster(usernames: &[String]) -> Result<(), DialogueError> {
    if usernames.is_empty() {
        return Err(DialogueError::config("the participant roster is empty"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = usernames.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(DialogueError::config(format!(
            "participant name '{dup}' appears more than once"
        )));
    }
    Ok(())
}
