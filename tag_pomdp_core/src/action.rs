use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IndexKind, TagError};

/// A cardinal direction on the grid. North decreases the row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions, in the same order as the movement actions.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the `(row, col)` step taken when moving in this direction.
    #[inline]
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Position of this direction in `Direction::ALL`.
    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }
}

/// Actions available to the agent.
///
/// The numeric encoding is part of the public contract and must stay stable:
///
/// | index | action |
/// |-------|--------|
/// | 1     | north  |
/// | 2     | east   |
/// | 3     | south  |
/// | 4     | west   |
/// | 5     | tag    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    North,
    East,
    South,
    West,
    Tag,
}

impl Action {
    /// All actions in index order.
    pub const ALL: [Action; 5] = [
        Action::North,
        Action::East,
        Action::South,
        Action::West,
        Action::Tag,
    ];

    /// Returns the 1-based index of this action.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Action::North => 1,
            Action::East => 2,
            Action::South => 3,
            Action::West => 4,
            Action::Tag => 5,
        }
    }

    /// Looks up an action by its 1-based index.
    pub fn from_index(index: usize) -> Result<Action, TagError> {
        index
            .checked_sub(1)
            .and_then(|slot| Action::ALL.get(slot).copied())
            .ok_or(TagError::IndexOutOfRange {
                kind: IndexKind::Action,
                index,
                max: Action::ALL.len(),
            })
    }

    /// The direction this action moves in, or `None` for `Tag`.
    #[inline]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Action::North => Some(Direction::North),
            Action::East => Some(Direction::East),
            Action::South => Some(Direction::South),
            Action::West => Some(Direction::West),
            Action::Tag => None,
        }
    }

    #[inline]
    pub fn is_movement(self) -> bool {
        self.direction().is_some()
    }

    /// Returns the lowercase name used in rendered output and config files.
    pub fn name(self) -> &'static str {
        match self {
            Action::North => "north",
            Action::East => "east",
            Action::South => "south",
            Action::West => "west",
            Action::Tag => "tag",
        }
    }
}

impl From<Direction> for Action {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::North => Action::North,
            Direction::East => Action::East,
            Direction::South => Action::South,
            Direction::West => Action::West,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_indices_are_stable() {
        let indices: Vec<usize> = Action::ALL.iter().map(|a| a.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), Ok(action));
        }
    }

    #[test]
    fn action_index_out_of_range() {
        assert!(matches!(
            Action::from_index(0),
            Err(TagError::IndexOutOfRange {
                kind: IndexKind::Action,
                index: 0,
                max: 5
            })
        ));
        assert!(Action::from_index(6).is_err());
    }

    #[test]
    fn movement_actions_map_to_directions() {
        for direction in Direction::ALL {
            let action = Action::from(direction);
            assert_eq!(action.direction(), Some(direction));
            assert!(action.is_movement());
            assert_eq!(Direction::ALL[direction.slot()], direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
        assert_eq!(Action::Tag.direction(), None);
        assert_eq!(Action::Tag.to_string(), "tag");
    }
}
