//! Game library browsing
//!
//! Lists the content of configured systems and resolves systems, emulators
//! and games from user queries.

mod resolver;
mod scanning;

pub use resolver::{
    ResolutionError, find_similar, levenshtein_distance, resolve_emulator, resolve_game,
    resolve_id, resolve_system,
};
pub use scanning::{GameEntry, scan_system};
