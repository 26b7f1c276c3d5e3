//! Score strategies.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::wire;

/// How the remote service should score matching items.
///
/// Wire form `{type, function}` with numeric strategy types; both keys are
/// omitted at their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "ScoreStrategyWire", try_from = "ScoreStrategyWire")]
pub enum ScoreStrategy {
    /// The service's default relevance scoring.
    #[default]
    Default,
    /// Boost scores by the indexed relevance field.
    RelevanceBoosting,
    /// Score with a custom scoring function body.
    CustomFunction(String),
}

impl ScoreStrategy {
    /// Create the default strategy.
    pub fn create_default() -> Self {
        ScoreStrategy::Default
    }

    /// Create a relevance-boosting strategy.
    pub fn relevance_boosting() -> Self {
        ScoreStrategy::RelevanceBoosting
    }

    /// Create a custom-function strategy.
    pub fn custom_function(function: impl Into<String>) -> Self {
        ScoreStrategy::CustomFunction(function.into())
    }

    /// The scoring function body, for custom-function strategies.
    pub fn function(&self) -> Option<&str> {
        match self {
            ScoreStrategy::CustomFunction(function) => Some(function),
            _ => None,
        }
    }

    /// True at the default strategy, used to omit the key on encode.
    pub fn is_default(&self) -> bool {
        *self == ScoreStrategy::Default
    }
}

#[derive(Serialize, Deserialize)]
struct ScoreStrategyWire {
    #[serde(rename = "type", default, skip_serializing_if = "wire::is_zero_u64")]
    strategy_type: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function: Option<String>,
}

impl From<ScoreStrategy> for ScoreStrategyWire {
    fn from(strategy: ScoreStrategy) -> Self {
        match strategy {
            ScoreStrategy::Default => ScoreStrategyWire {
                strategy_type: 0,
                function: None,
            },
            ScoreStrategy::RelevanceBoosting => ScoreStrategyWire {
                strategy_type: 1,
                function: None,
            },
            ScoreStrategy::CustomFunction(function) => ScoreStrategyWire {
                strategy_type: 2,
                function: Some(function),
            },
        }
    }
}

impl TryFrom<ScoreStrategyWire> for ScoreStrategy {
    type Error = ProtocolError;

    fn try_from(wire: ScoreStrategyWire) -> Result<Self, Self::Error> {
        match (wire.strategy_type, wire.function) {
            (0, _) => Ok(ScoreStrategy::Default),
            (1, _) => Ok(ScoreStrategy::RelevanceBoosting),
            (2, Some(function)) => Ok(ScoreStrategy::CustomFunction(function)),
            (2, None) => Err(ProtocolError::invalid_format(
                "custom-function score strategy without a function",
            )),
            (other, _) => Err(ProtocolError::invalid_format(format!(
                "unknown score strategy type: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_is_empty_on_wire() {
        let json = serde_json::to_value(ScoreStrategy::create_default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_custom_function_round_trip() {
        let strategy = ScoreStrategy::custom_function("_score * doc.weight");
        let json = serde_json::to_value(&strategy).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": 2, "function": "_score * doc.weight"})
        );
        let parsed: ScoreStrategy = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, strategy);
    }

    #[test]
    fn test_custom_function_without_body_fails() {
        let result: Result<ScoreStrategy, _> =
            serde_json::from_value(serde_json::json!({"type": 2}));
        assert!(result.is_err());
    }
}
