//! Interference label vocabulary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RfiError;

/// Interference category (closed vocabulary)
///
/// Serialized as its integer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Label {
    /// -1: no ground truth
    Undefined,
    /// 0: clean spectrum
    NoRfi,
    /// 1
    Jammer,
    /// 2
    Radar,
    /// 3: triangular-wave interference
    Triangular,
    /// 4: square-wave interference
    Square,
    /// 5
    Lte,
}

impl Label {
    /// Every label, in id order
    pub const ALL: [Label; 7] = [
        Label::Undefined,
        Label::NoRfi,
        Label::Jammer,
        Label::Radar,
        Label::Triangular,
        Label::Square,
        Label::Lte,
    ];

    /// Integer id
    pub fn id(self) -> i8 {
        match self {
            Label::Undefined => -1,
            Label::NoRfi => 0,
            Label::Jammer => 1,
            Label::Radar => 2,
            Label::Triangular => 3,
            Label::Square => 4,
            Label::Lte => 5,
        }
    }

    /// Label for an integer id
    ///
    /// # Example
    ///
    /// ```
    /// use rfi_dsp::Label;
    ///
    /// assert_eq!(Label::from_id(2), Some(Label::Radar));
    /// assert_eq!(Label::from_id(6), None);
    /// ```
    pub fn from_id(id: i64) -> Option<Self> {
        Label::ALL.iter().copied().find(|l| i64::from(l.id()) == id)
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Label::Undefined => "Undefined",
            Label::NoRfi => "No RFI",
            Label::Jammer => "Jammer",
            Label::Radar => "Radar",
            Label::Triangular => "Triangular",
            Label::Square => "Square",
            Label::Lte => "LTE",
        }
    }

    /// Parse a name (case-insensitive, spaces/underscores ignored) or an integer id
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(id) = text.parse::<i64>() {
            return Label::from_id(id);
        }
        let wanted: String = text
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        Label::ALL.iter().copied().find(|l| {
            l.name().replace(' ', "").to_ascii_lowercase() == wanted
        })
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Label> for i8 {
    fn from(label: Label) -> i8 {
        label.id()
    }
}

impl TryFrom<i8> for Label {
    type Error = RfiError;

    fn try_from(id: i8) -> Result<Self, Self::Error> {
        Label::from_id(i64::from(id))
            .ok_or_else(|| RfiError::InvalidInput(format!("unknown label id {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for label in Label::ALL {
            assert_eq!(Label::from_id(label.id() as i64), Some(label));
        }
        assert_eq!(Label::from_id(-2), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Label::parse("no_rfi"), Some(Label::NoRfi));
        assert_eq!(Label::parse("No RFI"), Some(Label::NoRfi));
        assert_eq!(Label::parse("lte"), Some(Label::Lte));
        assert_eq!(Label::parse("3"), Some(Label::Triangular));
        assert_eq!(Label::parse("-1"), Some(Label::Undefined));
        assert_eq!(Label::parse("wifi"), None);
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Label::Radar).unwrap(), "2");
        let l: Label = serde_json::from_str("5").unwrap();
        assert_eq!(l, Label::Lte);
        assert!(serde_json::from_str::<Label>("9").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Label::NoRfi.to_string(), "No RFI");
    }
}
