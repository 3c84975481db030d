#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared world state for Path Defence.
//!
//! The world owns everything agents read or mutate concurrently: the
//! immutable [`TileMap`] enemies follow, the lock-protected [`Roster`] of
//! live enemies turrets scan, the [`TurretRegistry`] of placed turrets and
//! the [`PlayerStats`] sink terminal enemy events report into.

mod map;
mod player;
mod roster;
mod turrets;

pub use map::{MapError, Tile, TileMap};
pub use player::{PlayerStats, PlayerTotals};
pub use roster::{Roster, RosterCounters, RosterView};
pub use turrets::TurretRegistry;
