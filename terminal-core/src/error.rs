use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameError {
    Json { context: &'static str, message: String },
    MissingField { field: &'static str },
    UnitInformationTooShort { actual: usize, min: usize },
    UnknownUnitIndex { index: usize },
    UnitEntryTooShort { player: u8, index: usize },
    OrphanModifier { shorthand: String, x: i32, y: i32 },
    UnexpectedPhase { phase: i64 },
    Io { message: String },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { context, message } => write!(f, "malformed {context}: {message}"),
            Self::MissingField { field } => write!(f, "frame is missing field '{field}'"),
            Self::UnitInformationTooShort { actual, min } => write!(
                f,
                "unitInformation too short: got {actual} entries, need at least {min}"
            ),
            Self::UnknownUnitIndex { index } => write!(f, "unknown unit list index {index}"),
            Self::UnitEntryTooShort { player, index } => write!(
                f,
                "unit entry for player {player} in list {index} has fewer than 3 fields"
            ),
            Self::OrphanModifier { shorthand, x, y } => write!(
                f,
                "{shorthand} marker at [{x}, {y}] has no structure to apply to"
            ),
            Self::UnexpectedPhase { phase } => write!(f, "unexpected turnInfo phase {phase}"),
            Self::Io { message } => write!(f, "engine channel failure: {message}"),
        }
    }
}

impl std::error::Error for FrameError {}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}
