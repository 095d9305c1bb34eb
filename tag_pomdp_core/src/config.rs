use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TagError;

/// The map from Pineau et al. (2003): a 10x5 grid whose top three rows are
/// walled off except for a three-wide open column.
pub const DEFAULT_MAP: &str = "xxxxxoooxx
xxxxxoooxx
xxxxxoooxx
oooooooooo
oooooooooo";

/// Selects how the opponent's evasion move is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionOption {
    /// Keeps the away probability fixed whenever an away move is possible.
    #[default]
    Modified,
    /// Legacy per-axis semantics where blocked away moves turn into staying.
    #[serde(alias = "orig")]
    Original,
}

/// Parameters of a Tag problem. Defaults follow the original paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Map with `x` for walls and `o` for open cells.
    pub map_str: String,
    /// Reward for tagging while co-located with the opponent.
    pub tag_reward: f64,
    /// Reward for tagging anywhere else.
    pub tag_penalty: f64,
    /// Reward for every movement action.
    pub step_penalty: f64,
    pub discount_factor: f64,
    /// Chance that the opponent moves away from the agent on a given step.
    pub move_away_probability: f64,
    pub transition_option: TransitionOption,
}

impl Default for TagConfig {
    fn default() -> Self {
        TagConfig {
            map_str: DEFAULT_MAP.to_string(),
            tag_reward: 10.0,
            tag_penalty: -10.0,
            step_penalty: -1.0,
            discount_factor: 0.95,
            move_away_probability: 0.8,
            transition_option: TransitionOption::Modified,
        }
    }
}

impl TagConfig {
    pub fn with_map(mut self, map_str: impl Into<String>) -> Self {
        self.map_str = map_str.into();
        self
    }

    pub fn with_move_away_probability(mut self, probability: f64) -> Self {
        self.move_away_probability = probability;
        self
    }

    pub fn with_transition_option(mut self, option: TransitionOption) -> Self {
        self.transition_option = option;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    /// Checks every numeric field. The map itself is validated when it is parsed.
    pub fn validate(&self) -> Result<(), TagError> {
        for (field, value) in [
            ("tag_reward", self.tag_reward),
            ("tag_penalty", self.tag_penalty),
            ("step_penalty", self.step_penalty),
        ] {
            if !value.is_finite() {
                return Err(TagError::InvalidConfig {
                    field,
                    value,
                    reason: "must be finite",
                });
            }
        }

        if !(self.discount_factor > 0.0 && self.discount_factor <= 1.0) {
            return Err(TagError::InvalidConfig {
                field: "discount_factor",
                value: self.discount_factor,
                reason: "must lie in (0, 1]",
            });
        }

        if !(0.0..=1.0).contains(&self.move_away_probability) {
            return Err(TagError::InvalidConfig {
                field: "move_away_probability",
                value: self.move_away_probability,
                reason: "must lie in [0, 1]",
            });
        }

        if self.move_away_probability == 0.0 {
            warn!("move_away_probability is 0; the opponent will never move");
        }

        Ok(())
    }
}
