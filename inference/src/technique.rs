use std::fmt;

/// A guitar playing-technique label. Labels are not mutually exclusive:
/// one segment may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technique {
    Bend,
    Hammer,
    Normal,
    Pull,
    Slide,
    Vibrato,
}

/// The fixed technique vocabulary, in model output order.
///
/// The classifier emits one probability per entry, indexed by position.
/// This constant is the single source of truth for that mapping; it is
/// never re-derived from the model's output shape.
pub const TECHNIQUES: [Technique; 6] = [
    Technique::Bend,
    Technique::Hammer,
    Technique::Normal,
    Technique::Pull,
    Technique::Slide,
    Technique::Vibrato,
];

impl Technique {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bend => "bend",
            Self::Hammer => "hammer",
            Self::Normal => "normal",
            Self::Pull => "pull",
            Self::Slide => "slide",
            Self::Vibrato => "vibrato",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-segment technique prediction outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TechniqueOutcome {
    /// At least one label; never empty (the decision rule falls back to
    /// `Normal` when nothing crosses threshold).
    Labels(Vec<Technique>),
    /// Segment shorter than 10 ms; the model was not invoked.
    Degenerate,
    /// Transform or model failed for this segment, or the classifier was
    /// never loaded.
    Failed,
}

impl TechniqueOutcome {
    /// Wire representation: label strings, `["unknown"]`, or `["error"]`.
    pub fn wire_labels(&self) -> Vec<String> {
        match self {
            Self::Labels(labels) => labels.iter().map(|t| t.to_string()).collect(),
            Self::Degenerate => vec!["unknown".to_string()],
            Self::Failed => vec!["error".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_order_is_stable() {
        let names: Vec<&str> = TECHNIQUES.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, ["bend", "hammer", "normal", "pull", "slide", "vibrato"]);
    }

    #[test]
    fn wire_labels_encode_sentinels() {
        assert_eq!(TechniqueOutcome::Degenerate.wire_labels(), ["unknown"]);
        assert_eq!(TechniqueOutcome::Failed.wire_labels(), ["error"]);
        assert_eq!(
            TechniqueOutcome::Labels(vec![Technique::Bend, Technique::Vibrato]).wire_labels(),
            ["bend", "vibrato"]
        );
    }
}
