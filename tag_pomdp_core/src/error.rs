/// Represents errors raised while building or querying a Tag model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TagError {
    #[error("Malformed map: row {row} has width {found}, expected {expected}")]
    MalformedRowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Malformed map: invalid character {found:?} at row {row}, column {col}")]
    MalformedCharacter { row: usize, col: usize, found: char },
    #[error("Map contains no open cells")]
    EmptyMap,
    #[error("{kind} index {index} is out of range 1..={max}")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        max: usize,
    },
    #[error("Invalid config: {field} = {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl TagError {
    /// Returns `true` for both flavours of map parse failure.
    pub fn is_malformed_map(&self) -> bool {
        matches!(
            self,
            TagError::MalformedRowWidth { .. } | TagError::MalformedCharacter { .. }
        )
    }
}

/// The index domain an `IndexOutOfRange` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Cell,
    State,
    Action,
    Observation,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IndexKind::Cell => "Cell",
            IndexKind::State => "State",
            IndexKind::Action => "Action",
            IndexKind::Observation => "Observation",
        };
        f.write_str(name)
    }
}
