//! Scripted tower placements passed on the command line.

use std::{fmt, str::FromStr};

use anyhow::{anyhow, Context, Error};
use tile_defence_core::{CellCoord, TowerKind};

/// Tower to build before the first wave, written as `kind@column,row`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerPlacement {
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
}

impl FromStr for TowerPlacement {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, cell) = value
            .split_once('@')
            .ok_or_else(|| anyhow!("expected kind@column,row, got '{value}'"))?;
        let (column, row) = cell
            .split_once(',')
            .ok_or_else(|| anyhow!("expected column,row after '@', got '{cell}'"))?;

        Ok(Self {
            kind: kind.parse()?,
            cell: CellCoord::new(
                column.trim().parse().context("invalid column")?,
                row.trim().parse().context("invalid row")?,
            ),
        })
    }
}

impl fmt::Display for TowerPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{},{}",
            self.kind,
            self.cell.column(),
            self.cell.row()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_cell() {
        let placement: TowerPlacement = "Sniper@3, 4".parse().expect("valid placement");

        assert_eq!(placement.kind, TowerKind::Sniper);
        assert_eq!(placement.cell, CellCoord::new(3, 4));
        assert_eq!(placement.to_string(), "sniper@3,4");
    }

    #[test]
    fn rejects_malformed_placements() {
        assert!("basic".parse::<TowerPlacement>().is_err());
        assert!("basic@3".parse::<TowerPlacement>().is_err());
        assert!("laser@1,1".parse::<TowerPlacement>().is_err());
        assert!("rapid@-1,2".parse::<TowerPlacement>().is_err());
    }
}
