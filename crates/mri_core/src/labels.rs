use serde::{Deserialize, Serialize};
use std::fmt;

/// Dementia stage predicted for a scan.
///
/// The discriminants are the classifier's output indices and follow the
/// order the model was trained with. Reordering the variants silently
/// mislabels every prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLabel {
    MildDemented = 0,
    ModerateDemented = 1,
    NonDemented = 2,
    VeryMildDemented = 3,
}

impl ClassLabel {
    pub const COUNT: usize = 4;

    /// All labels in output-index order.
    pub const ALL: [ClassLabel; Self::COUNT] = [
        ClassLabel::MildDemented,
        ClassLabel::ModerateDemented,
        ClassLabel::NonDemented,
        ClassLabel::VeryMildDemented,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClassLabel::MildDemented => "MildDemented",
            ClassLabel::ModerateDemented => "ModerateDemented",
            ClassLabel::NonDemented => "NonDemented",
            ClassLabel::VeryMildDemented => "VeryMildDemented",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
