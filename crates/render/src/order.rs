use serde::{Deserialize, Serialize};

use crate::grid::GridTemplate;

/// Order payload served by `GET /render/order/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOrder {
    pub id: String,
    #[serde(default)]
    pub order_number: Option<String>,
    pub members: Vec<Member>,
    #[serde(default)]
    pub grid_template: GridTemplate,
    #[serde(default)]
    pub settings: CanvasSettings,
}

impl RenderOrder {
    pub fn photographed_members(&self) -> usize {
        self.members.iter().filter(|m| m.has_photo()).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub vote: Option<String>,
}

impl Member {
    pub fn has_photo(&self) -> bool {
        self.photo.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub gap: u32,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: crate::canvas::PRINT_WIDTH,
            height: crate::canvas::PRINT_HEIGHT,
            dpi: crate::canvas::PRINT_DPI,
            gap: 20,
        }
    }
}
