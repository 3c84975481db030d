#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave definitions and the enemy archetypes they are built from.
//!
//! A wave file holds one wave per line. Each line lists whitespace separated
//! archetype codes: `1` for heavy, `2` for light and `3` for medium enemies.

mod archetypes;

use std::{fs, io, path::Path};

use path_defence_core::{Enemy, EnemyFactory, EnemyKind, Position};
use tracing::info;

pub use archetypes::{ArchetypeFactory, ArchetypeStats};

/// Reasons a wave definition can be rejected.
#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    /// The wave file could not be read.
    #[error("failed to read wave file: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },
    /// The definition contains no lines at all.
    #[error("wave definition is empty")]
    Empty,
    /// A line describes a wave without enemies.
    #[error("wave on line {line} has no enemies")]
    EmptyWave {
        /// One-based line number.
        line: usize,
    },
    /// A line starts with whitespace, leaving an empty first code.
    #[error("wave on line {line} starts with whitespace")]
    LeadingWhitespace {
        /// One-based line number.
        line: usize,
    },
    /// A token is not a known archetype code.
    #[error("unknown enemy code '{code}' on line {line}")]
    UnknownCode {
        /// One-based line number.
        line: usize,
        /// The offending token.
        code: String,
    },
}

/// Ordered group of enemies released together.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    enemies: Vec<Enemy>,
}

impl Wave {
    /// Creates a wave from already constructed enemies.
    #[must_use]
    pub fn new(enemies: Vec<Enemy>) -> Self {
        Self { enemies }
    }

    /// Enemies in release order.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Number of enemies in the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Reports whether the wave holds no enemy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Archetypes of the enemies in release order.
    pub fn kinds(&self) -> impl Iterator<Item = EnemyKind> + '_ {
        self.enemies.iter().map(|enemy| enemy.kind)
    }
}

impl IntoIterator for Wave {
    type Item = Enemy;
    type IntoIter = std::vec::IntoIter<Enemy>;

    fn into_iter(self) -> Self::IntoIter {
        self.enemies.into_iter()
    }
}

/// Parses a wave definition, creating every enemy at `start`.
///
/// A single malformed token rejects the whole definition.
pub fn parse_waves(
    text: &str,
    start: Position,
    factory: &dyn EnemyFactory,
) -> Result<Vec<Wave>, WaveError> {
    let mut waves = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim_end();
        if line.starts_with(char::is_whitespace) {
            return Err(WaveError::LeadingWhitespace { line: line_number });
        }
        let mut enemies = Vec::new();
        for code in line.split_whitespace() {
            let kind = EnemyKind::from_code(code).ok_or_else(|| WaveError::UnknownCode {
                line: line_number,
                code: code.to_owned(),
            })?;
            enemies.push(factory.create(kind, start));
        }
        if enemies.is_empty() {
            return Err(WaveError::EmptyWave { line: line_number });
        }
        waves.push(Wave::new(enemies));
    }

    if waves.is_empty() {
        return Err(WaveError::Empty);
    }
    Ok(waves)
}

/// Reads and parses the wave file at `path`.
pub fn load_waves(
    path: impl AsRef<Path>,
    start: Position,
    factory: &dyn EnemyFactory,
) -> Result<Vec<Wave>, WaveError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let waves = parse_waves(&text, start, factory)?;
    info!(path = %path.display(), waves = waves.len(), "wave file loaded");
    Ok(waves)
}
