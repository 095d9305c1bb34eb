use std::collections::VecDeque;

use log::{debug, warn};

use crate::{CellIndex, map::MapGraph};

/// All-pairs shortest path hop counts over a [`MapGraph`].
///
/// `None` stands for an infinite distance between cells in disconnected open
/// regions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    size: usize,
    hops: Vec<Option<u32>>,
}

impl DistanceMatrix {
    /// Runs a breadth-first search from every cell of the graph.
    pub fn from_graph(graph: &MapGraph) -> Self {
        let size = graph.num_cells();
        let mut hops = vec![None; size * size];
        let mut frontier = VecDeque::with_capacity(size);

        for source in graph.cells() {
            let row = &mut hops[(source - 1) * size..source * size];
            row[source - 1] = Some(0);
            frontier.push_back((source, 0u32));

            while let Some((current, depth)) = frontier.pop_front() {
                for (_, next) in graph.neighbors(current) {
                    let slot = &mut row[next - 1];
                    if slot.is_none() {
                        *slot = Some(depth + 1);
                        frontier.push_back((next, depth + 1));
                    }
                }
            }
        }

        let matrix = DistanceMatrix { size, hops };
        if matrix.is_connected() {
            debug!("Computed distance matrix for {} cells", size);
        } else {
            warn!(
                "Map has disconnected open regions; {} cell pairs are unreachable",
                matrix.hops.iter().filter(|d| d.is_none()).count()
            );
        }
        matrix
    }

    /// Number of cells covered by the matrix.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Shortest path length from `from` to `to`, or `None` if unreachable or
    /// either index is not a cell.
    #[inline]
    pub fn get(&self, from: CellIndex, to: CellIndex) -> Option<u32> {
        if from == 0 || to == 0 || from > self.size || to > self.size {
            return None;
        }
        self.hops[(from - 1) * self.size + (to - 1)]
    }

    /// Returns `true` when `candidate` is strictly farther from `origin` than
    /// `current` is. Infinite distances never count as farther.
    pub fn is_farther(&self, origin: CellIndex, candidate: CellIndex, current: CellIndex) -> bool {
        match (self.get(origin, candidate), self.get(origin, current)) {
            (Some(candidate), Some(current)) => candidate > current,
            _ => false,
        }
    }

    /// Returns `true` if every cell can reach every other cell.
    pub fn is_connected(&self) -> bool {
        self.hops.iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, config::DEFAULT_MAP};

    #[test]
    fn default_map_distances() {
        let graph = MapGraph::build(DEFAULT_MAP).unwrap();
        let distances = DistanceMatrix::from_graph(&graph);
        assert_eq!(distances.size(), 29);
        assert!(distances.is_connected());

        let at = |row, col| graph.index_at(Position { row, col }).unwrap();
        // Top of the open column down to the bottom-left corner.
        assert_eq!(distances.get(at(0, 5), at(4, 0)), Some(9));
        assert_eq!(distances.get(at(4, 0), at(0, 5)), Some(9));
        // Crossing the open column sideways needs no detour.
        assert_eq!(distances.get(at(0, 5), at(0, 7)), Some(2));
        assert_eq!(distances.get(at(3, 3), at(3, 3)), Some(0));
        assert_eq!(distances.get(0, 1), None);
        assert_eq!(distances.get(1, 30), None);
    }

    #[test]
    fn walls_force_detours() {
        let graph = MapGraph::build("ooo\nxxo\nooo").unwrap();
        let distances = DistanceMatrix::from_graph(&graph);
        let at = |row, col| graph.index_at(Position { row, col }).unwrap();
        // Manhattan distance is 2, but the wall forces the long way round.
        assert_eq!(distances.get(at(0, 0), at(2, 0)), Some(6));
    }

    #[test]
    fn disconnected_regions_are_infinite() {
        let graph = MapGraph::build("oxo\noxo").unwrap();
        let distances = DistanceMatrix::from_graph(&graph);
        assert!(!distances.is_connected());
        assert_eq!(distances.get(1, 3), Some(1));
        assert_eq!(distances.get(1, 2), None);
        assert!(!distances.is_farther(1, 2, 3));
        assert!(!distances.is_farther(1, 4, 2));
    }

    #[test]
    fn farther_is_strict() {
        let graph = MapGraph::build("oooo").unwrap();
        let distances = DistanceMatrix::from_graph(&graph);
        assert!(distances.is_farther(1, 3, 2));
        assert!(!distances.is_farther(1, 2, 2));
        assert!(!distances.is_farther(2, 1, 3));
    }
}
