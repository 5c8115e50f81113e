//! Grid sizing, center-cell lookup and the eligibility gate for variants.

use serde::{Deserialize, Serialize};

pub const MIN_TOTAL_MEMBERS: usize = 3;
pub const MIN_PHOTOGRAPHED_MEMBERS: usize = 2;

/// Collage template. Both templates share the same cell math; they only
/// differ in how the compositor offsets rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GridTemplate {
    #[default]
    Square,
    #[serde(alias = "hex")]
    Hexagonal,
}

impl GridTemplate {
    /// Case-insensitive lookup; unknown names fall back to `Square`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "hexagonal" | "hex" => GridTemplate::Hexagonal,
            _ => GridTemplate::Square,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GridTemplate::Square => "square",
            GridTemplate::Hexagonal => "hexagonal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub cols: usize,
    pub rows: usize,
    pub total_cells: usize,
    /// Row-major index of the midpoint cell.
    pub center_index: usize,
}

/// Side length of the smallest square grid that fits `member_count`.
pub fn grid_side(member_count: usize) -> usize {
    match member_count {
        0..=4 => 2,
        5..=9 => 3,
        10..=16 => 4,
        17..=25 => 5,
        26..=36 => 6,
        n => ceil_sqrt(n),
    }
}

fn ceil_sqrt(n: usize) -> usize {
    let mut side = (n as f64).sqrt() as usize;
    while side * side < n {
        side += 1;
    }
    while side > 1 && (side - 1) * (side - 1) >= n {
        side -= 1;
    }
    side
}

/// Hexagonal layouts reuse the square math, so the template is accepted
/// for call-site symmetry only.
pub fn center_cell(member_count: usize, _template: GridTemplate) -> GridDimensions {
    let side = grid_side(member_count);
    let total_cells = side * side;
    GridDimensions {
        cols: side,
        rows: side,
        total_cells,
        center_index: (total_cells / 2).min(total_cells - 1),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: Option<String>,
}

pub fn check_eligibility(total_members: usize, photographed_members: usize) -> Eligibility {
    if total_members < MIN_TOTAL_MEMBERS {
        return Eligibility {
            eligible: false,
            reason: Some(format!(
                "Order needs at least {MIN_TOTAL_MEMBERS} members (has {total_members})"
            )),
        };
    }
    if photographed_members < MIN_PHOTOGRAPHED_MEMBERS {
        return Eligibility {
            eligible: false,
            reason: Some(format!(
                "Order needs at least {MIN_PHOTOGRAPHED_MEMBERS} members with photos (has {photographed_members})"
            )),
        };
    }
    Eligibility {
        eligible: true,
        reason: None,
    }
}
