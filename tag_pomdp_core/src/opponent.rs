//! The opponent's stochastic evasion policy.

use std::cmp::Ordering;
use std::iter;

use log::trace;

use crate::{
    CellIndex,
    action::Direction,
    config::TransitionOption,
    distance::DistanceMatrix,
    distribution::Categorical,
    error::TagError,
    map::MapGraph,
};

/// Distribution over the opponent's next cell given where the agent stands.
///
/// With [`TransitionOption::Modified`] the whole `move_away_probability` is
/// split evenly over the neighbors that are strictly farther (by shortest path)
/// from the agent, and the opponent stays put otherwise. If no such neighbor
/// exists it stays with certainty.
///
/// With [`TransitionOption::Original`] each axis (north/south, east/west)
/// receives half of `move_away_probability`, aimed at the grid direction on
/// that axis leading away from the agent. A blocked direction, or an axis on
/// which both share a coordinate, keeps that half on the current cell.
pub fn opponent_transition(
    graph: &MapGraph,
    distances: &DistanceMatrix,
    agent: CellIndex,
    opponent: CellIndex,
    move_away_probability: f64,
    option: TransitionOption,
) -> Result<Categorical<CellIndex>, TagError> {
    graph.check_cell(agent)?;
    graph.check_cell(opponent)?;
    trace!(
        "Opponent transition ({:?}) agent={} opponent={}",
        option, agent, opponent
    );

    let distribution = match option {
        TransitionOption::Modified => {
            modified_transition(graph, distances, agent, opponent, move_away_probability)
        }
        TransitionOption::Original => {
            original_transition(graph, agent, opponent, move_away_probability)
        }
    };
    Ok(distribution)
}

fn modified_transition(
    graph: &MapGraph,
    distances: &DistanceMatrix,
    agent: CellIndex,
    opponent: CellIndex,
    move_away_probability: f64,
) -> Categorical<CellIndex> {
    let away: Vec<CellIndex> = graph
        .neighbors(opponent)
        .map(|(_, next)| next)
        .filter(|&next| distances.is_farther(agent, next, opponent))
        .collect();

    if away.is_empty() {
        return Categorical::point(opponent);
    }

    let share = move_away_probability / away.len() as f64;
    Categorical::from_weights(
        away.into_iter()
            .map(|next| (next, share))
            .chain(iter::once((opponent, 1.0 - move_away_probability))),
    )
}

fn original_transition(
    graph: &MapGraph,
    agent: CellIndex,
    opponent: CellIndex,
    move_away_probability: f64,
) -> Categorical<CellIndex> {
    let (Some(agent_pos), Some(opponent_pos)) = (graph.position(agent), graph.position(opponent))
    else {
        return Categorical::point(opponent);
    };

    let half = move_away_probability / 2.0;
    let axes = [
        away_along(
            opponent_pos.row,
            agent_pos.row,
            Direction::North,
            Direction::South,
        ),
        away_along(
            opponent_pos.col,
            agent_pos.col,
            Direction::West,
            Direction::East,
        ),
    ];

    let mut weights = Vec::with_capacity(3);
    weights.push((opponent, 1.0 - move_away_probability));
    for direction in axes {
        // Walls are ignored when choosing the direction, so a blocked move stays.
        let target = direction
            .and_then(|direction| graph.neighbor(opponent, direction))
            .unwrap_or(opponent);
        weights.push((target, half));
    }
    Categorical::from_weights(weights)
}

/// Picks the direction along one axis that increases separation from the agent.
fn away_along(
    opponent: usize,
    agent: usize,
    decreasing: Direction,
    increasing: Direction,
) -> Option<Direction> {
    match opponent.cmp(&agent) {
        Ordering::Less => Some(decreasing),
        Ordering::Greater => Some(increasing),
        Ordering::Equal => None,
    }
}
