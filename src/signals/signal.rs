// =============================================================================
// Trading Signal — the engine's output value
// =============================================================================

use serde::{Deserialize, Serialize};

/// Separator used when the rationale is rendered as a single line.
pub const RATIONALE_SEPARATOR: &str = " • ";

/// Directional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Stop-loss / take-profit pair. Only directional signals carry one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub direction: Direction,
    /// Heuristic strength in [0, 1].
    pub confidence: f64,
    #[serde(flatten)]
    pub risk: Option<RiskLevels>,
    pub rationale: Vec<String>,
}

impl Signal {
    /// Build a signal from parts. Confidence is clamped to [0, 1] and any
    /// risk levels are dropped for `Direction::Neutral`.
    pub fn from_parts(
        direction: Direction,
        confidence: f64,
        risk: Option<RiskLevels>,
        rationale: Vec<String>,
    ) -> Self {
        let risk = risk.filter(|_| direction != Direction::Neutral);
        Self {
            direction,
            confidence: clamp_unit(confidence),
            risk,
            rationale,
        }
    }

    pub fn neutral(confidence: f64, rationale: impl Into<String>) -> Self {
        Self::from_parts(Direction::Neutral, confidence, None, vec![rationale.into()])
    }

    pub fn directional(
        direction: Direction,
        confidence: f64,
        risk: RiskLevels,
        rationale: Vec<String>,
    ) -> Self {
        Self::from_parts(direction, confidence, Some(risk), rationale)
    }

    pub fn stop_loss(&self) -> Option<f64> {
        self.risk.map(|r| r.stop_loss)
    }

    pub fn take_profit(&self) -> Option<f64> {
        self.risk.map(|r| r.take_profit)
    }

    /// The rationale joined into one display line.
    pub fn rationale_text(&self) -> String {
        self.rationale.join(RATIONALE_SEPARATOR)
    }
}

/// Clamp to [0, 1]. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
