use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Color painted for missing readings and for readings no rule matches.
pub const FALLBACK_COLOR: &str = "#9ca3af";

/// Color of a freshly added rule.
pub const DEFAULT_RULE_COLOR: &str = "#3B82F6";

/// Tolerance used by the `=` operator.
pub const EQUALITY_EPSILON: f64 = 0.01;

/// An opaque color token, passed through to the map layer unchanged.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn fallback() -> Self {
        Color(String::from(FALLBACK_COLOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == FALLBACK_COLOR
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Color(value.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Comparison applied between a reading and a rule's value.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl Operator {
    pub const ALL: [Operator; 5] = [
        Operator::Ge,
        Operator::Gt,
        Operator::Le,
        Operator::Lt,
        Operator::Eq,
    ];

    /// `>` and `>=` rules are evaluated from the highest threshold down.
    pub fn is_descending(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Ge)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }

    /// Evaluate `value <op> threshold`.
    pub fn holds(&self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Ge => value >= threshold,
            Operator::Gt => value > threshold,
            Operator::Le => value <= threshold,
            Operator::Lt => value < threshold,
            Operator::Eq => (value - threshold).abs() < EQUALITY_EPSILON,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("unknown operator {0:?}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s.trim())
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// A single `{operator, value, color}` classification rule.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Threshold {
    pub operator: Operator,
    pub value: f64,
    pub color: Color,
}

impl Threshold {
    pub fn new(operator: Operator, value: f64, color: impl Into<Color>) -> Self {
        Threshold {
            operator,
            value,
            color: color.into(),
        }
    }

    /// The rule appended by "add rule": `>= 0` in the default blue.
    pub fn default_rule() -> Self {
        Threshold::new(Operator::Ge, 0.0, DEFAULT_RULE_COLOR)
    }

    pub fn matches(&self, value: f64) -> bool {
        self.operator.holds(value, self.value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.operator, self.value, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_round_trips_through_symbol() {
        for op in Operator::ALL {
            assert_eq!(op.symbol().parse::<Operator>().unwrap(), op);
        }
        assert!("=>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_operator_holds() {
        assert!(Operator::Ge.holds(15.0, 15.0));
        assert!(!Operator::Gt.holds(15.0, 15.0));
        assert!(Operator::Le.holds(15.0, 15.0));
        assert!(!Operator::Lt.holds(15.0, 15.0));
        assert!(Operator::Eq.holds(25.005, 25.0));
        assert!(!Operator::Eq.holds(25.02, 25.0));
    }

    #[test]
    fn test_nan_threshold_never_holds() {
        for op in Operator::ALL {
            assert!(!op.holds(1.0, f64::NAN));
        }
    }

    #[test]
    fn test_threshold_serde_uses_symbols() {
        let rule = Threshold::new(Operator::Le, 3.5, "#10B981");
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, r##"{"operator":"<=","value":3.5,"color":"#10B981"}"##);
    }

    #[test]
    fn test_default_rule() {
        let rule = Threshold::default_rule();
        assert_eq!(rule.operator, Operator::Ge);
        assert_eq!(rule.value, 0.0);
        assert_eq!(rule.color.as_str(), DEFAULT_RULE_COLOR);
    }
}
