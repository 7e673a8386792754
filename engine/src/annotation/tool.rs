use serde::{Deserialize, Serialize};
use shared::PositionKind;

/// The tool the pointer currently acts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTool {
    #[default]
    Select,
    Rectangle,
    Trendline,
    Long,
    Short,
}

/// What a draft turns into when committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKind {
    Rectangle,
    Trendline,
    Position(PositionKind),
}

impl ActiveTool {
    pub fn name(&self) -> &'static str {
        match self {
            ActiveTool::Select => "Select",
            ActiveTool::Rectangle => "Rectangle",
            ActiveTool::Trendline => "Trendline",
            ActiveTool::Long => "Long position",
            ActiveTool::Short => "Short position",
        }
    }

    /// The draft this tool starts, `None` for select.
    pub fn draft_kind(&self) -> Option<DraftKind> {
        match self {
            ActiveTool::Select => None,
            ActiveTool::Rectangle => Some(DraftKind::Rectangle),
            ActiveTool::Trendline => Some(DraftKind::Trendline),
            ActiveTool::Long => Some(DraftKind::Position(PositionKind::Long)),
            ActiveTool::Short => Some(DraftKind::Position(PositionKind::Short)),
        }
    }

    pub fn is_drawing_tool(&self) -> bool {
        self.draft_kind().is_some()
    }

    pub fn all() -> &'static [ActiveTool] {
        &[
            ActiveTool::Select,
            ActiveTool::Rectangle,
            ActiveTool::Trendline,
            ActiveTool::Long,
            ActiveTool::Short,
        ]
    }
}
