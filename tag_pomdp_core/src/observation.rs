use serde::{Deserialize, Serialize};

use crate::{
    CellIndex,
    error::{IndexKind, TagError},
    state::TagState,
};

/// What the agent perceives after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Observation {
    /// The agent's own cell, plus the opponent's cell when they share it.
    Position {
        agent: CellIndex,
        opponent: Option<CellIndex>,
    },
    Terminal,
}

impl Observation {
    /// Observes a state: the opponent is only revealed on co-location.
    pub fn of(state: &TagState) -> Self {
        match *state {
            TagState::Active { agent, opponent } => Observation::Position {
                agent,
                opponent: (agent == opponent).then_some(opponent),
            },
            TagState::Terminal => Observation::Terminal,
        }
    }

    /// Returns `true` if the opponent was seen.
    pub fn sees_opponent(&self) -> bool {
        matches!(
            self,
            Observation::Position {
                opponent: Some(_),
                ..
            }
        )
    }
}

/// Dense 1-based indexing of observations over `N` open cells.
///
/// `unseen(agent) = agent`, `seen(agent) = N + agent`, terminal `= 2N + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationSpace {
    num_cells: usize,
}

impl ObservationSpace {
    pub fn new(num_cells: usize) -> Self {
        ObservationSpace { num_cells }
    }

    #[inline]
    pub fn len(&self) -> usize {
        2 * self.num_cells + 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn index_of(&self, observation: &Observation) -> Result<usize, TagError> {
        let n = self.num_cells;
        match *observation {
            Observation::Terminal => Ok(self.len()),
            Observation::Position { agent, opponent } => {
                if agent == 0 || agent > n {
                    return Err(TagError::IndexOutOfRange {
                        kind: IndexKind::Cell,
                        index: agent,
                        max: n,
                    });
                }
                match opponent {
                    None => Ok(agent),
                    Some(seen) if seen == agent => Ok(n + agent),
                    // Only co-located sightings exist.
                    Some(seen) => Err(TagError::IndexOutOfRange {
                        kind: IndexKind::Observation,
                        index: seen,
                        max: n,
                    }),
                }
            }
        }
    }

    pub fn observation_of(&self, index: usize) -> Result<Observation, TagError> {
        let n = self.num_cells;
        match index {
            i if i >= 1 && i <= n => Ok(Observation::Position {
                agent: i,
                opponent: None,
            }),
            i if i > n && i <= 2 * n => Ok(Observation::Position {
                agent: i - n,
                opponent: Some(i - n),
            }),
            i if i == self.len() => Ok(Observation::Terminal),
            _ => Err(TagError::IndexOutOfRange {
                kind: IndexKind::Observation,
                index,
                max: self.len(),
            }),
        }
    }

    /// Iterates over every observation in index order.
    pub fn iter(&self) -> impl Iterator<Item = Observation> + use<> {
        let n = self.num_cells;
        let unseen = (1..=n).map(|agent| Observation::Position {
            agent,
            opponent: None,
        });
        let seen = (1..=n).map(|agent| Observation::Position {
            agent,
            opponent: Some(agent),
        });
        unseen
            .chain(seen)
            .chain(std::iter::once(Observation::Terminal))
    }
}
