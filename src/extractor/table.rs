use crate::error::Result;
use crate::extractor::block::{extract, Extraction, Grid, MarkerTrigger};
use crate::extractor::document::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 252-group structure: 50 full rows of five values plus two.
pub const FISSION_GRID: Grid = Grid::new(4, 51, 5, 2);

/// 253 group edges: 50 full rows of five values plus three.
pub const ENERGY_BOUNDARY_GRID: Grid = Grid::new(1, 51, 5, 3);

/// Column-alignment check on the line after the fission marker.
/// The run of six spaces is significant.
pub const FISSION_NEXT_LINE: &str = "0      0";

pub const ENERGY_BOUNDARY_MARKER: &str = "energy boundaries:";

/// The two tables pulled out of SDF files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// U-235 fission sensitivity profile.
    Fission,
    /// Group boundaries of the energy structure.
    EnergyBoundaries,
}

impl TableKind {
    pub fn trigger(&self) -> MarkerTrigger {
        match self {
            TableKind::Fission => {
                MarkerTrigger::new(["u-235", "fission"]).with_next_line(FISSION_NEXT_LINE)
            }
            TableKind::EnergyBoundaries => MarkerTrigger::new([ENERGY_BOUNDARY_MARKER]),
        }
    }

    pub fn grid(&self) -> Grid {
        match self {
            TableKind::Fission => FISSION_GRID,
            TableKind::EnergyBoundaries => ENERGY_BOUNDARY_GRID,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Fission => "u-235 fission",
            TableKind::EnergyBoundaries => "energy boundaries",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run the extractor configured for `kind` over a whole document.
pub fn extract_table(document: &Document, kind: TableKind) -> Result<Extraction<'_>> {
    let lines = document.lines();
    let extraction = extract(&lines, &kind.trigger(), kind.grid())?;

    tracing::debug!(
        table = %kind,
        triggers = extraction.triggers.len(),
        records = extraction.len(),
        "table extracted"
    );

    Ok(extraction)
}
