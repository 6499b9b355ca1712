//! Stat tables describing every enemy and tower archetype.

use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of enemies that waves can spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Balanced walker.
    Basic,
    /// Quick and fragile.
    Fast,
    /// Slow and sturdy, hits the player hard.
    Heavy,
    /// Very slow, very sturdy, devastating on leak.
    Boss,
    /// Tiny, very fast, comes in numbers.
    Swarm,
    /// Listed by the later levels; uses the basic stat record unless overridden.
    Tank,
}

impl EnemyKind {
    /// Every enemy archetype in declaration order.
    pub const ALL: [EnemyKind; 6] = [
        Self::Basic,
        Self::Fast,
        Self::Heavy,
        Self::Boss,
        Self::Swarm,
        Self::Tank,
    ];

    /// Lower-case name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Heavy => "heavy",
            Self::Boss => "boss",
            Self::Swarm => "swarm",
            Self::Tank => "tank",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnemyKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ConfigError::UnknownEnemyKind(value.to_owned()))
    }
}

/// Types of towers that can be constructed on buildable tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Cheap all-rounder.
    Basic,
    /// Long range, heavy hits, slow cadence.
    Sniper,
    /// Short range, light hits, fast cadence.
    Rapid,
}

impl TowerKind {
    /// Every tower archetype in declaration order.
    pub const ALL: [TowerKind; 3] = [Self::Basic, Self::Sniper, Self::Rapid];

    /// Lower-case name used in configuration files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Sniper => "sniper",
            Self::Rapid => "rapid",
        }
    }
}

impl fmt::Display for TowerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TowerKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ConfigError::UnknownTowerKind(value.to_owned()))
    }
}

/// Opaque RGB color attached to archetypes for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl Color {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Parses a `#rrggbb` color string.
    pub fn from_hex(value: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(value.to_owned());
        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| invalid())
        };
        Ok(Self::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Fixed stat record of an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Travel speed in tiles per second.
    pub speed: f32,
    /// Health on spawn.
    pub health: u32,
    /// Drawing color.
    pub color: Color,
    /// Drawing radius in tiles.
    pub radius: f32,
    /// Health the player loses when the enemy leaks.
    pub damage: u32,
    /// Money awarded when the enemy is killed.
    pub bounty: u32,
}

/// Fixed stat record of a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Money required to build the tower.
    pub cost: u32,
    /// Targeting radius in tiles, measured from the tile center.
    pub range: f32,
    /// Damage dealt per shot.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Drawing color.
    pub color: Color,
}

impl TowerStats {
    /// Time a tower waits between shots (`1 / fire_rate`).
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        if self.fire_rate > 0.0 && self.fire_rate.is_finite() {
            Duration::from_secs_f64(1.0 / f64::from(self.fire_rate))
        } else {
            Duration::ZERO
        }
    }
}

/// Lookup from archetype to stat record for every enemy and tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Archetypes {
    enemies: BTreeMap<EnemyKind, EnemyStats>,
    towers: BTreeMap<TowerKind, TowerStats>,
}

impl Default for Archetypes {
    fn default() -> Self {
        Self {
            enemies: EnemyKind::ALL
                .into_iter()
                .map(|kind| (kind, builtin_enemy(kind)))
                .collect(),
            towers: TowerKind::ALL
                .into_iter()
                .map(|kind| (kind, builtin_tower(kind)))
                .collect(),
        }
    }
}

impl Archetypes {
    /// Parses TOML overrides layered on top of the built-in tables.
    ///
    /// Each `[enemies.<kind>]` or `[towers.<kind>]` table replaces the full
    /// stat record of that archetype; archetypes that are not mentioned keep
    /// their built-in values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let overrides: ArchetypeOverrides = toml::from_str(source)?;
        let mut archetypes = Self::default();
        for (kind, stats) in overrides.enemies {
            archetypes = archetypes.with_enemy(kind, stats)?;
        }
        for (kind, stats) in overrides.towers {
            archetypes = archetypes.with_tower(kind, stats)?;
        }
        Ok(archetypes)
    }

    /// Replaces the stat record of an enemy archetype.
    pub fn with_enemy(mut self, kind: EnemyKind, stats: EnemyStats) -> Result<Self, ConfigError> {
        validate_enemy(kind, &stats)?;
        let _ = self.enemies.insert(kind, stats);
        Ok(self)
    }

    /// Replaces the stat record of a tower archetype.
    pub fn with_tower(mut self, kind: TowerKind, stats: TowerStats) -> Result<Self, ConfigError> {
        validate_tower(kind, &stats)?;
        let _ = self.towers.insert(kind, stats);
        Ok(self)
    }

    /// Stat record of an enemy archetype.
    #[must_use]
    pub fn enemy(&self, kind: EnemyKind) -> EnemyStats {
        self.enemies
            .get(&kind)
            .copied()
            .unwrap_or_else(|| builtin_enemy(kind))
    }

    /// Stat record of a tower archetype.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> TowerStats {
        self.towers
            .get(&kind)
            .copied()
            .unwrap_or_else(|| builtin_tower(kind))
    }
}

/// Errors raised while reading archetype configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration was not valid TOML or did not match the schema.
    #[error("could not parse archetype table: {0}")]
    Parse(#[from] toml::de::Error),
    /// A color was not written as `#rrggbb`.
    #[error("color '{0}' is not a #rrggbb value")]
    InvalidColor(String),
    /// An enemy archetype name is not known.
    #[error("unknown enemy archetype '{0}'")]
    UnknownEnemyKind(String),
    /// A tower archetype name is not known.
    #[error("unknown tower archetype '{0}'")]
    UnknownTowerKind(String),
    /// A stat value lies outside its permitted range.
    #[error("{field} of '{archetype}' must be positive")]
    InvalidStat {
        /// Name of the archetype carrying the value.
        archetype: &'static str,
        /// Name of the offending field.
        field: &'static str,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArchetypeOverrides {
    #[serde(default)]
    enemies: BTreeMap<EnemyKind, EnemyStats>,
    #[serde(default)]
    towers: BTreeMap<TowerKind, TowerStats>,
}

fn validate_enemy(kind: EnemyKind, stats: &EnemyStats) -> Result<(), ConfigError> {
    let invalid = |field| ConfigError::InvalidStat {
        archetype: kind.name(),
        field,
    };
    if !is_positive(stats.speed) {
        return Err(invalid("speed"));
    }
    if stats.health == 0 {
        return Err(invalid("health"));
    }
    if !is_positive(stats.radius) {
        return Err(invalid("radius"));
    }
    Ok(())
}

fn validate_tower(kind: TowerKind, stats: &TowerStats) -> Result<(), ConfigError> {
    let invalid = |field| ConfigError::InvalidStat {
        archetype: kind.name(),
        field,
    };
    if !is_positive(stats.range) {
        return Err(invalid("range"));
    }
    if !is_positive(stats.fire_rate) {
        return Err(invalid("fire_rate"));
    }
    Ok(())
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

const fn builtin_enemy(kind: EnemyKind) -> EnemyStats {
    match kind {
        // Tanks have no table of their own and march with basic stats.
        EnemyKind::Basic | EnemyKind::Tank => EnemyStats {
            speed: 2.0,
            health: 100,
            color: Color::from_rgb(0xe7, 0x4c, 0x3c),
            radius: 0.3,
            damage: 1,
            bounty: 10,
        },
        EnemyKind::Fast => EnemyStats {
            speed: 4.0,
            health: 50,
            color: Color::from_rgb(0xf3, 0x9c, 0x12),
            radius: 0.25,
            damage: 1,
            bounty: 8,
        },
        EnemyKind::Heavy => EnemyStats {
            speed: 1.0,
            health: 300,
            color: Color::from_rgb(0x8e, 0x44, 0xad),
            radius: 0.4,
            damage: 3,
            bounty: 25,
        },
        EnemyKind::Boss => EnemyStats {
            speed: 0.5,
            health: 1000,
            color: Color::from_rgb(0x2c, 0x3e, 0x50),
            radius: 0.45,
            damage: 10,
            bounty: 100,
        },
        EnemyKind::Swarm => EnemyStats {
            speed: 5.0,
            health: 20,
            color: Color::from_rgb(0x16, 0xa0, 0x85),
            radius: 0.2,
            damage: 1,
            bounty: 3,
        },
    }
}

const fn builtin_tower(kind: TowerKind) -> TowerStats {
    match kind {
        TowerKind::Basic => TowerStats {
            cost: 50,
            range: 3.0,
            damage: 20,
            fire_rate: 1.0,
            color: Color::from_rgb(0x34, 0x98, 0xdb),
        },
        TowerKind::Sniper => TowerStats {
            cost: 100,
            range: 6.0,
            damage: 80,
            fire_rate: 0.5,
            color: Color::from_rgb(0x27, 0xae, 0x60),
        },
        TowerKind::Rapid => TowerStats {
            cost: 75,
            range: 2.5,
            damage: 8,
            fire_rate: 4.0,
            color: Color::from_rgb(0xf1, 0xc4, 0x0f),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_hex_notation() {
        let color = Color::from_hex("#e74c3c").expect("valid color");
        assert_eq!(color, Color::from_rgb(0xe7, 0x4c, 0x3c));
        assert_eq!(color.to_string(), "#e74c3c");
    }

    #[test]
    fn color_rejects_malformed_values() {
        for value in ["e74c3c", "#e74c3", "#zzzzzz", "#e74c3c00"] {
            assert!(
                matches!(Color::from_hex(value), Err(ConfigError::InvalidColor(_))),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn kinds_parse_case_insensitively() {
        assert_eq!("Sniper".parse::<TowerKind>().ok(), Some(TowerKind::Sniper));
        assert_eq!("swarm".parse::<EnemyKind>().ok(), Some(EnemyKind::Swarm));
        assert!("laser".parse::<TowerKind>().is_err());
    }

    #[test]
    fn basic_enemy_matches_builtin_table() {
        let stats = Archetypes::default().enemy(EnemyKind::Basic);
        assert_eq!(stats.health, 100);
        assert_eq!(stats.bounty, 10);
        assert!((stats.speed - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn tank_falls_back_to_basic_stats() {
        let archetypes = Archetypes::default();
        assert_eq!(
            archetypes.enemy(EnemyKind::Tank),
            archetypes.enemy(EnemyKind::Basic)
        );
    }

    #[test]
    fn cooldown_is_inverse_fire_rate() {
        let stats = Archetypes::default().tower(TowerKind::Rapid);
        assert_eq!(stats.cooldown(), Duration::from_millis(250));
    }

    #[test]
    fn toml_overrides_replace_selected_archetypes() {
        let source = r##"
            [enemies.basic]
            speed = 3.0
            health = 40
            color = "#112233"
            radius = 0.3
            damage = 2
            bounty = 12

            [towers.sniper]
            cost = 150
            range = 8.0
            damage = 120
            fire_rate = 0.25
            color = "#445566"
        "##;

        let archetypes = Archetypes::from_toml_str(source).expect("valid overrides");
        assert_eq!(archetypes.enemy(EnemyKind::Basic).health, 40);
        assert_eq!(archetypes.enemy(EnemyKind::Basic).bounty, 12);
        assert_eq!(archetypes.tower(TowerKind::Sniper).cost, 150);
        assert_eq!(
            archetypes.enemy(EnemyKind::Fast),
            Archetypes::default().enemy(EnemyKind::Fast)
        );
    }

    #[test]
    fn toml_overrides_are_validated() {
        let source = r##"
            [towers.rapid]
            cost = 10
            range = 2.0
            damage = 5
            fire_rate = 0.0
            color = "#ffffff"
        "##;

        let error = Archetypes::from_toml_str(source).expect_err("zero fire rate");
        assert!(matches!(
            error,
            ConfigError::InvalidStat {
                field: "fire_rate",
                ..
            }
        ));
    }

    #[test]
    fn toml_rejects_unknown_archetypes() {
        let source = r##"
            [enemies.dragon]
            speed = 1.0
            health = 1
            color = "#000000"
            radius = 0.1
            damage = 1
            bounty = 1
        "##;

        assert!(matches!(
            Archetypes::from_toml_str(source),
            Err(ConfigError::Parse(_))
        ));
    }
}
