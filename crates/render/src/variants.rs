use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::grid::{GridDimensions, GridTemplate, MIN_PHOTOGRAPHED_MEMBERS, center_cell};
use crate::order::Member;

/// One candidate arrangement with `center_member` pinned to the center cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub center_member: Member,
    pub grid: GridDimensions,
    /// Row-major cell assignments. Interior gaps are `None` so the center
    /// member keeps its index; trailing empty cells are dropped.
    pub positions: Vec<Option<Member>>,
}

impl Variant {
    pub fn id_for(member: &Member) -> String {
        format!("variant-{}", member.id)
    }
}

/// Builds one variant per member with a photo. The grid is sized to fit
/// every member of the order, not just the photographed ones.
pub async fn generate_grid_variants(
    members: &[Member],
    template: GridTemplate,
) -> RenderResult<Vec<Variant>> {
    let candidates: Vec<&Member> = members.iter().filter(|m| m.has_photo()).collect();
    if candidates.len() < MIN_PHOTOGRAPHED_MEMBERS {
        return Err(RenderError::InsufficientMembers {
            required: MIN_PHOTOGRAPHED_MEMBERS,
            found: candidates.len(),
        });
    }

    let grid = center_cell(members.len(), template);
    let mut variants = Vec::with_capacity(candidates.len());

    for center in candidates {
        variants.push(Variant {
            id: Variant::id_for(center),
            center_member: center.clone(),
            grid,
            positions: build_positions(members, center, &grid),
        });
        tokio::task::yield_now().await;
    }

    debug!(
        count = variants.len(),
        cols = grid.cols,
        center_index = grid.center_index,
        "Generated grid variants"
    );
    Ok(variants)
}

pub fn build_positions(
    members: &[Member],
    center: &Member,
    grid: &GridDimensions,
) -> Vec<Option<Member>> {
    let mut positions: Vec<Option<Member>> = vec![None; grid.total_cells];
    positions[grid.center_index] = Some(center.clone());

    let mut others = members.iter().filter(|m| m.id != center.id);
    for (index, slot) in positions.iter_mut().enumerate() {
        if index == grid.center_index {
            continue;
        }
        match others.next() {
            Some(member) => *slot = Some(member.clone()),
            None => break,
        }
    }

    while matches!(positions.last(), Some(None)) {
        positions.pop();
    }
    positions
}
