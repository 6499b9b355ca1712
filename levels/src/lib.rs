#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Built-in level catalogue.
//!
//! Maps are stored as ASCII art using the glyphs understood by
//! [`TileGrid::from_ascii`].

use thiserror::Error;
use tile_defence_core::{
    EnemyKind, LevelDefinition, LevelError, LevelId, TileGrid, WaveDescriptor,
};

/// Number of built-in levels.
pub const LEVEL_COUNT: u32 = 5;

struct LevelSource {
    name: &'static str,
    map: &'static [&'static str],
    waves: &'static [(EnemyKind, u32, u64)],
    start_health: u32,
    start_money: u32,
}

const LEVELS: [LevelSource; LEVEL_COUNT as usize] = [
    LevelSource {
        name: "Level 1",
        map: &[
            "##########",
            "#........#",
            "S===.....#",
            "#..=..##.#",
            "#..=====.#",
            "#.....#=.#",
            "#.....#=.#",
            "#.======.#",
            "#.=......#",
            "##E#######",
        ],
        waves: &[
            (EnemyKind::Basic, 3, 2000),
            (EnemyKind::Fast, 2, 1000),
            (EnemyKind::Heavy, 1, 2000),
            (EnemyKind::Swarm, 10, 100),
            (EnemyKind::Basic, 9, 500),
            (EnemyKind::Heavy, 4, 2000),
            (EnemyKind::Boss, 1, 3000),
        ],
        start_health: 10,
        start_money: 250,
    },
    LevelSource {
        name: "Level 2",
        map: &[
            "#S########",
            "#=#......#",
            "#=#.====.#",
            "#====..=.#",
            "#......=.#",
            "#.####.=.#",
            "#.======.#",
            "#.=......#",
            "#.======E#",
            "##########",
        ],
        waves: &[
            (EnemyKind::Swarm, 15, 40),
            (EnemyKind::Basic, 20, 20),
            (EnemyKind::Fast, 50, 500),
            (EnemyKind::Boss, 2, 5000),
        ],
        start_health: 20,
        start_money: 500,
    },
    LevelSource {
        name: "Level 3",
        map: &[
            "##########",
            "S=======.#",
            "#......=.#",
            "#......=.#",
            "#......=.#",
            "#......=.#",
            "#......=.#",
            "#......=.#",
            "#......=.#",
            "#######E##",
        ],
        waves: &[
            (EnemyKind::Basic, 5, 1500),
            (EnemyKind::Fast, 5, 800),
            (EnemyKind::Swarm, 20, 300),
            (EnemyKind::Heavy, 3, 2500),
            (EnemyKind::Tank, 1, 3000),
        ],
        start_health: 15,
        start_money: 400,
    },
    LevelSource {
        name: "Level 4",
        map: &[
            "..............",
            "..............",
            "...==E..S==...",
            "..==......==..",
            ".==..####..==.",
            ".=..######..=.",
            ".=.########.=.",
            ".=.########.=.",
            ".=.########.=.",
            ".=..######..=.",
            ".==..####..==.",
            "..==......==..",
            "...========...",
            "..............",
        ],
        waves: &[
            (EnemyKind::Basic, 10, 1200),
            (EnemyKind::Fast, 10, 800),
            (EnemyKind::Swarm, 50, 200),
            (EnemyKind::Heavy, 7, 2000),
            (EnemyKind::Tank, 2, 3000),
        ],
        start_health: 20,
        start_money: 400,
    },
    LevelSource {
        name: "Level 5",
        map: &[
            "...S....",
            "...=....",
            "...=....",
            "...=....",
            "...==...",
            "....=...",
            "....=...",
            "....E...",
        ],
        waves: &[
            (EnemyKind::Fast, 10, 800),
            (EnemyKind::Swarm, 19, 250),
            (EnemyKind::Heavy, 12, 1000),
            (EnemyKind::Basic, 20, 100),
            (EnemyKind::Fast, 20, 100),
            (EnemyKind::Swarm, 40, 60),
            (EnemyKind::Tank, 2, 4000),
        ],
        start_health: 1,
        start_money: 300,
    },
];

/// Errors raised while loading a built-in level.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogueError {
    /// No built-in level carries the identifier.
    #[error("unknown level {0}")]
    UnknownLevel(u32),
    /// The stored map could not be parsed.
    #[error("level map is malformed: {0}")]
    Malformed(#[from] LevelError),
}

/// Identifiers of every built-in level in play order.
pub fn ids() -> impl Iterator<Item = LevelId> {
    (1..=LEVEL_COUNT).map(LevelId::new)
}

/// Builds the definition of the built-in level with the provided identifier.
///
/// Identifiers start at one.
pub fn load(id: LevelId) -> Result<LevelDefinition, CatalogueError> {
    let source = id
        .get()
        .checked_sub(1)
        .and_then(|index| LEVELS.get(index as usize))
        .ok_or(CatalogueError::UnknownLevel(id.get()))?;

    let grid = TileGrid::from_ascii(source.map)?;
    let waves = source
        .waves
        .iter()
        .map(|&(kind, count, interval_ms)| WaveDescriptor::new(kind, count, interval_ms))
        .collect();

    Ok(LevelDefinition::new(source.name, grid, waves)
        .with_start_health(source.start_health)
        .with_start_money(source.start_money))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_outside_catalogue_are_rejected() {
        assert_eq!(
            load(LevelId::new(0)),
            Err(CatalogueError::UnknownLevel(0))
        );
        assert_eq!(
            load(LevelId::new(LEVEL_COUNT + 1)),
            Err(CatalogueError::UnknownLevel(LEVEL_COUNT + 1))
        );
    }

    #[test]
    fn first_level_keeps_its_economy() {
        let level = load(LevelId::new(1)).expect("level loads");
        assert_eq!(level.name, "Level 1");
        assert_eq!(level.start_health, 10);
        assert_eq!(level.start_money, 250);
        assert_eq!(level.waves.len(), 7);
        assert_eq!(
            level.waves[0],
            WaveDescriptor::new(EnemyKind::Basic, 3, 2000)
        );
    }

    #[test]
    fn catalogue_lists_every_level() {
        assert_eq!(ids().count(), LEVEL_COUNT as usize);
        assert!(ids().all(|id| load(id).is_ok()));
    }
}
