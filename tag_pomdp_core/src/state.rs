use serde::{Deserialize, Serialize};

use crate::{
    CellIndex,
    error::{IndexKind, TagError},
};

/// The joint position of agent and opponent, or the absorbing terminal state
/// reached after a successful tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagState {
    Active {
        agent: CellIndex,
        opponent: CellIndex,
    },
    Terminal,
}

impl TagState {
    #[inline]
    pub fn new(agent: CellIndex, opponent: CellIndex) -> Self {
        TagState::Active { agent, opponent }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TagState::Terminal)
    }

    /// The agent's cell, or `None` for the terminal state.
    pub fn agent(&self) -> Option<CellIndex> {
        match self {
            TagState::Active { agent, .. } => Some(*agent),
            TagState::Terminal => None,
        }
    }

    /// The opponent's cell, or `None` for the terminal state.
    pub fn opponent(&self) -> Option<CellIndex> {
        match self {
            TagState::Active { opponent, .. } => Some(*opponent),
            TagState::Terminal => None,
        }
    }

    /// Returns `true` when agent and opponent share a cell.
    pub fn is_colocated(&self) -> bool {
        matches!(self, TagState::Active { agent, opponent } if agent == opponent)
    }
}

/// Dense 1-based indexing of every [`TagState`] over `N` open cells.
///
/// Active states occupy `1..=N²` in agent-major order,
/// `index = (agent - 1) * N + opponent`, and the terminal state is `N² + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSpace {
    num_cells: usize,
}

impl StateSpace {
    pub fn new(num_cells: usize) -> Self {
        StateSpace { num_cells }
    }

    /// Total number of states, terminal included.
    #[inline]
    pub fn len(&self) -> usize {
        self.num_cells * self.num_cells + 1
    }

    /// Always `false`: the terminal state exists even for an empty grid.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn terminal_index(&self) -> usize {
        self.len()
    }

    pub fn index_of(&self, state: &TagState) -> Result<usize, TagError> {
        match *state {
            TagState::Terminal => Ok(self.terminal_index()),
            TagState::Active { agent, opponent } => {
                let n = self.num_cells;
                for cell in [agent, opponent] {
                    if cell == 0 || cell > n {
                        return Err(TagError::IndexOutOfRange {
                            kind: IndexKind::Cell,
                            index: cell,
                            max: n,
                        });
                    }
                }
                Ok((agent - 1) * n + opponent)
            }
        }
    }

    pub fn state_of(&self, index: usize) -> Result<TagState, TagError> {
        let n = self.num_cells;
        if index == 0 || index > self.len() {
            return Err(TagError::IndexOutOfRange {
                kind: IndexKind::State,
                index,
                max: self.len(),
            });
        }
        if index == self.terminal_index() {
            return Ok(TagState::Terminal);
        }
        let offset = index - 1;
        Ok(TagState::Active {
            agent: offset / n + 1,
            opponent: offset % n + 1,
        })
    }

    /// Iterates over every state in index order, terminal last.
    pub fn iter(&self) -> impl Iterator<Item = TagState> + use<> {
        let n = self.num_cells;
        (1..=n)
            .flat_map(move |agent| (1..=n).map(move |opponent| TagState::new(agent, opponent)))
            .chain(std::iter::once(TagState::Terminal))
    }
}
