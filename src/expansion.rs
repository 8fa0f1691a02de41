// ABOUTME: Detail panel expansion state for the bitacora carousel
// ABOUTME: At most one of the description or questions panels is shown full size

/// Which detail panel, if any, replaces the grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expansion {
    #[default]
    None,
    Description,
    Questions,
}

impl Expansion {
    /// Open the description panel, or close it if it is already open.
    pub fn toggle_description(&mut self) {
        *self = match self {
            Expansion::Description => Expansion::None,
            _ => Expansion::Description,
        };
    }

    /// Open the questions panel, or close it if it is already open.
    pub fn toggle_questions(&mut self) {
        *self = match self {
            Expansion::Questions => Expansion::None,
            _ => Expansion::Questions,
        };
    }

    pub fn collapse(&mut self) {
        *self = Expansion::None;
    }

    pub fn is_expanded(self) -> bool {
        self != Expansion::None
    }

    pub fn description_expanded(self) -> bool {
        self == Expansion::Description
    }

    pub fn questions_expanded(self) -> bool {
        self == Expansion::Questions
    }
}
