//! When the moderator interjects, and whether that costs a regular turn.

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::DialogueError;

use super::turn::seeded_rng;

const INTERVAL_KEY: &str = "moderator_interval";
const PROBABILITY_KEY: &str = "moderator_probability";
const REPLACES_KEY: &str = "moderator_replaces_turn";

/// Condition under which the moderator speaks at a given regular turn.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ModeratorTrigger {
    /// At every regular turn.
    #[default]
    EveryTurn,
    /// At every `n`th regular turn (turns `n-1`, `2n-1`, ... zero-based).
    Interval(usize),
    /// Independently at each regular turn with the given probability.
    Probability(f64),
}

/// Whether moderator turns are extra or take the place of a regular turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeratorPlacement {
    /// The moderator answers right after a regular turn; the turn budget
    /// (`conv_len`) counts regular turns only.
    #[default]
    Additive,
    /// The moderator speaks instead of the regular speaker and the slot
    /// counts toward `conv_len`. The roster rotation is not advanced.
    Replace,
}

/// Moderator-related `turn_manager_config` entries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeratorSettings {
    pub trigger: ModeratorTrigger,
    pub placement: ModeratorPlacement,
    /// Whether any moderator key was present at all.
    pub configured: bool,
}

impl ModeratorSettings {
    /// Applies one config entry; returns `false` when the key is not a moderator key.
    pub(crate) fn apply(&mut self, key: &str, value: f64) -> Result<bool, DialogueError> {
        match key {
            INTERVAL_KEY => {
                if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
                    return Err(DialogueError::config(format!(
                        "{INTERVAL_KEY} must be a positive integer, got {value}"
                    )));
                }
                if matches!(self.trigger, ModeratorTrigger::Probability(_)) {
                    return Err(exclusive_triggers());
                }
                self.trigger = ModeratorTrigger::Interval(value as usize);
            }
            PROBABILITY_KEY => {
                if !(0.0..=1.0).contains(&value) {
                    return Err(DialogueError::config(format!(
                        "{PROBABILITY_KEY} must lie in [0, 1], got {value}"
                    )));
                }
                if matches!(self.trigger, ModeratorTrigger::Interval(_)) {
                    return Err(exclusive_triggers());
                }
                self.trigger = ModeratorTrigger::Probability(value);
            }
            REPLACES_KEY => {
                self.placement = if value != 0.0 {
                    ModeratorPlacement::Replace
                } else {
                    ModeratorPlacement::Additive
                };
            }
            _ => return Ok(false),
        }
        self.configured = true;
        Ok(true)
    }

    pub(crate) fn validate(&self) -> Result<(), DialogueError> {
        if self.placement == ModeratorPlacement::Replace && self.trigger == ModeratorTrigger::EveryTurn {
            return Err(DialogueError::config(format!(
                "{REPLACES_KEY} needs {INTERVAL_KEY} or {PROBABILITY_KEY}; \
                 otherwise the moderator would take every turn"
            )));
        }
        Ok(())
    }
}

fn exclusive_triggers() -> DialogueError {
    DialogueError::config(format!(
        "{INTERVAL_KEY} and {PROBABILITY_KEY} are mutually exclusive"
    ))
}

/// Stateful moderator trigger, owned by a conversation.
#[derive(Debug, Clone)]
pub struct ModeratorSchedule {
    trigger: ModeratorTrigger,
    placement: ModeratorPlacement,
    rng: StdRng,
}

impl ModeratorSchedule {
    pub fn new(trigger: ModeratorTrigger, placement: ModeratorPlacement, seed: Option<u64>) -> Self {
        Self {
            trigger,
            placement,
            rng: seeded_rng(seed),
        }
    }

    /// Schedule described by parsed settings. The seed is offset so the
    /// moderator draws do not mirror the speaker draws.
    pub fn from_settings(settings: &ModeratorSettings, seed: Option<u64>) -> Self {
        Self::new(
            settings.trigger,
            settings.placement,
            seed.map(|s| s.wrapping_add(1)),
        )
    }

    pub const fn placement(&self) -> ModeratorPlacement {
        self.placement
    }

    pub const fn trigger(&self) -> ModeratorTrigger {
        self.trigger
    }

    /// Whether the moderator speaks at regular turn `turn` (zero-based).
    pub fn fires(&mut self, turn: usize) -> bool {
        match self.trigger {
            ModeratorTrigger::EveryTurn => true,
            ModeratorTrigger::Interval(every) => every != 0 && (turn + 1) % every == 0,
            ModeratorTrigger::Probability(p) if p.is_nan() => false,
            ModeratorTrigger::Probability(p) => self.rng.gen_bool(p.clamp(0.0, 1.0)),
        }
    }
}

impl Default for ModeratorSchedule {
    fn default() -> Self {
        Self::new(ModeratorTrigger::EveryTurn, ModeratorPlacement::Additive, None)
    }
}
