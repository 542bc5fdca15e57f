//! Name resolution from user queries
//!
//! Systems, emulators and games are picked on the command line by name. A
//! query resolves, in order of preference, to:
//! - an exact match
//! - a unique case-insensitive match
//! - a unique case-insensitive prefix match
//!
//! Anything else is an error carrying candidates (ambiguous prefix) or
//! suggestions within a small edit distance (typos).

use romhub_shared::{EmulatorDefinition, SystemLaunchConfig};
use thiserror::Error;

use super::GameEntry;

/// Maximum edit distance for "did you mean" suggestions.
const SUGGESTION_DISTANCE: usize = 3;
const MAX_SUGGESTIONS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ResolutionError {
    pub message: String,
    /// Candidates or near-misses to show the user
    pub suggestions: Vec<String>,
}

impl ResolutionError {
    fn new(message: String, suggestions: Vec<String>) -> Self {
        Self {
            message,
            suggestions,
        }
    }

    /// Message plus a "did you mean" line, ready for the terminal.
    pub fn display_with_hint(&self) -> String {
        if self.suggestions.is_empty() {
            self.message.clone()
        } else {
            format!("{}\n  did you mean: {}", self.message, self.suggestions.join(", "))
        }
    }
}

/// Resolve `query` against `items` by the name `name_of` extracts.
pub fn resolve_id<'a, T, F>(
    query: &str,
    items: &'a [T],
    name_of: F,
    kind: &str,
) -> Result<&'a T, ResolutionError>
where
    F: Fn(&T) -> &str,
{
    let query = query.trim();
    if query.is_empty() {
        return Err(ResolutionError::new(format!("Empty {} name", kind), Vec::new()));
    }

    if let Some(item) = items.iter().find(|item| name_of(item) == query) {
        return Ok(item);
    }

    let lower = query.to_lowercase();
    let mut same_case: Vec<&T> = items
        .iter()
        .filter(|item| name_of(item).to_lowercase() == lower)
        .collect();
    if same_case.len() == 1 {
        return Ok(same_case.remove(0));
    }

    let mut prefixed: Vec<&T> = items
        .iter()
        .filter(|item| name_of(item).to_lowercase().starts_with(&lower))
        .collect();
    match prefixed.len() {
        0 => Err(ResolutionError::new(
            format!("{} '{}' not found", kind, query),
            find_similar(query, items, &name_of),
        )),
        1 => Ok(prefixed.remove(0)),
        _ => Err(ResolutionError::new(
            format!("{} '{}' is ambiguous", kind, query),
            prefixed
                .iter()
                .map(|item| name_of(item).to_string())
                .collect(),
        )),
    }
}

pub fn resolve_system<'a>(
    query: &str,
    systems: &'a [SystemLaunchConfig],
) -> Result<&'a SystemLaunchConfig, ResolutionError> {
    resolve_id(query, systems, |s| s.name.as_str(), "System")
}

pub fn resolve_emulator<'a>(
    query: &str,
    system: &'a SystemLaunchConfig,
) -> Result<&'a EmulatorDefinition, ResolutionError> {
    resolve_id(query, &system.emulators, |e| e.name.as_str(), "Emulator")
}

pub fn resolve_game<'a>(
    query: &str,
    games: &'a [GameEntry],
) -> Result<&'a GameEntry, ResolutionError> {
    resolve_id(query, games, |g| g.title.as_str(), "Game")
}

/// Names within a small edit distance of `query`, closest first.
pub fn find_similar<T, F>(query: &str, items: &[T], name_of: F) -> Vec<String>
where
    F: Fn(&T) -> &str,
{
    let lower = query.to_lowercase();
    let mut close: Vec<(usize, &str)> = items
        .iter()
        .map(|item| {
            let name = name_of(item);
            (levenshtein_distance(&lower, &name.to_lowercase()), name)
        })
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .collect();
    close.sort();
    close
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Edit distance between two strings, counted in chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn systems(names: &[&str]) -> Vec<SystemLaunchConfig> {
        names
            .iter()
            .map(|name| SystemLaunchConfig::new(*name, format!("/games/{}", name)))
            .collect()
    }

    fn game(title: &str) -> GameEntry {
        GameEntry {
            title: title.to_string(),
            path: PathBuf::from(format!("/games/{}.sfc", title)),
            system: "snes".to_string(),
            size_bytes: 0,
        }
    }

    // =============================================================
    // Matching order
    // =============================================================

    #[test]
    fn test_exact_match_preferred_over_case_insensitive() {
        let systems = systems(&["GBA", "gba"]);
        assert_eq!(resolve_system("gba", &systems).unwrap().name, "gba");
        assert_eq!(resolve_system("GBA", &systems).unwrap().name, "GBA");
    }

    #[test]
    fn test_case_insensitive_match() {
        let systems = systems(&["PlayStation", "Saturn"]);
        assert_eq!(
            resolve_system("playstation", &systems).unwrap().name,
            "PlayStation"
        );
    }

    #[test]
    fn test_unique_prefix_match() {
        let systems = systems(&["megadrive", "mastersystem", "n64"]);
        assert_eq!(resolve_system("meg", &systems).unwrap().name, "megadrive");
        assert_eq!(resolve_system(" N6 ", &systems).unwrap().name, "n64");
    }

    #[test]
    fn test_ambiguous_prefix_lists_candidates() {
        let systems = systems(&["megadrive", "mastersystem"]);
        let err = resolve_system("m", &systems).unwrap_err();
        assert!(err.message.contains("ambiguous"));
        assert_eq!(err.suggestions, vec!["megadrive", "mastersystem"]);
    }

    #[test]
    fn test_not_found_suggests_near_misses() {
        let systems = systems(&["snes", "nes", "psx"]);
        let err = resolve_system("snez", &systems).unwrap_err();
        assert!(err.message.contains("not found"));
        assert_eq!(err.suggestions.first().map(String::as_str), Some("snes"));
        assert!(err.display_with_hint().contains("did you mean"));
    }

    #[test]
    fn test_empty_query() {
        let err = resolve_system("  ", &systems(&["snes"])).unwrap_err();
        assert_eq!(err.message, "Empty System name");
        assert_eq!(err.display_with_hint(), "Empty System name");
    }

    #[test]
    fn test_resolve_emulator_and_game() {
        let mut system = SystemLaunchConfig::new("snes", "/games/snes");
        system
            .emulators
            .push(EmulatorDefinition::new("snes9x", "/usr/bin/snes9x"));
        system
            .emulators
            .push(EmulatorDefinition::new("bsnes", "/usr/bin/bsnes"));
        assert_eq!(resolve_emulator("bs", &system).unwrap().name, "bsnes");

        let games = vec![game("Super Metroid"), game("Super Mario World")];
        assert_eq!(
            resolve_game("super met", &games).unwrap().title,
            "Super Metroid"
        );
        assert!(resolve_game("super", &games).is_err());
    }

    // =============================================================
    // Edit distance
    // =============================================================

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("snes", "sens"), 2);
        assert_eq!(levenshtein_distance("ñes", "nes"), 1);
    }

    #[test]
    fn test_find_similar_limits_and_orders() {
        let names = ["cube", "tube", "lube", "dub", "platformer"];
        let similar = find_similar("dube", &names, |n| *n);
        assert_eq!(similar.len(), 3);
        assert!(!similar.contains(&"platformer".to_string()));
    }
}
