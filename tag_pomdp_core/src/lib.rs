use serde::{Deserialize, Serialize};

pub mod action;
pub mod config;
pub mod distance;
pub mod distribution;
pub mod error;
pub mod map;
pub mod observation;
pub mod opponent;
pub mod pomdp;
pub mod state;

pub use action::{Action, Direction};
pub use config::{DEFAULT_MAP, TagConfig, TransitionOption};
pub use distance::DistanceMatrix;
pub use distribution::{Categorical, PROB_TOLERANCE};
pub use error::{IndexKind, TagError};
pub use map::{Grid, MapGraph};
pub use observation::{Observation, ObservationSpace};
pub use opponent::opponent_transition;
pub use pomdp::{Step, TagPomdp};
pub use state::{StateSpace, TagState};

/// 1-based index of an open cell in a [`MapGraph`].
pub type CellIndex = usize;

/// Represents a grid coordinate. Row 0 is the top of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// The adjacent position in `direction`, or `None` when that would leave
    /// the non-negative quadrant. Upper bounds are checked by the grid.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (drow, dcol) = direction.delta();
        Some(Position {
            row: self.row.checked_add_signed(drow)?,
            col: self.col.checked_add_signed(dcol)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stops_at_origin() {
        let origin = Position { row: 0, col: 0 };
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(
            origin.step(Direction::South),
            Some(Position { row: 1, col: 0 })
        );
        assert_eq!(
            origin.step(Direction::East),
            Some(Position { row: 0, col: 1 })
        );
    }
}
