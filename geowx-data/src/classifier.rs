//! Threshold classification.
//!
//! Rules are evaluated in two groups. `>`/`>=` rules come first, sorted by
//! value from highest to lowest, so the highest bar a reading clears wins.
//! `<`/`<=`/`=` rules follow, sorted from lowest to highest. Both sorts are
//! stable, so rules with equal values keep their list order.

use geowx_meteo::{Color, Threshold};

/// The order in which `thresholds` are tried.
pub fn evaluation_order(thresholds: &[Threshold]) -> Vec<&Threshold> {
    let (mut descending, mut ascending): (Vec<&Threshold>, Vec<&Threshold>) = thresholds
        .iter()
        .partition(|rule| rule.operator.is_descending());
    descending.sort_by(|a, b| b.value.total_cmp(&a.value));
    ascending.sort_by(|a, b| a.value.total_cmp(&b.value));
    descending.extend(ascending);
    descending
}

/// The first rule, in evaluation order, that `value` satisfies.
pub fn matching_rule(value: Option<f64>, thresholds: &[Threshold]) -> Option<&Threshold> {
    let value = value.filter(|v| !v.is_nan())?;
    evaluation_order(thresholds)
        .into_iter()
        .find(|rule| rule.matches(value))
}

/// Color for a reading. Missing readings, NaN, and readings no rule
/// matches all get the fallback color.
pub fn classify(value: Option<f64>, thresholds: &[Threshold]) -> Color {
    matching_rule(value, thresholds)
        .map(|rule| rule.color.clone())
        .unwrap_or_else(Color::fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geowx_meteo::Operator;

    const RED: &str = "#EF4444";
    const ORANGE: &str = "#F97316";
    const BLUE: &str = "#3B82F6";
    const GREEN: &str = "#10B981";
    const PURPLE: &str = "#8B5CF6";

    fn temperature_rules() -> Vec<Threshold> {
        vec![
            Threshold::new(Operator::Ge, 25.0, RED),
            Threshold::new(Operator::Ge, 15.0, ORANGE),
            Threshold::new(Operator::Lt, 15.0, BLUE),
        ]
    }

    #[test]
    fn test_temperature_bands() {
        let rules = temperature_rules();
        assert_eq!(classify(Some(30.0), &rules), Color::from(RED));
        assert_eq!(classify(Some(20.0), &rules), Color::from(ORANGE));
        assert_eq!(classify(Some(10.0), &rules), Color::from(BLUE));
        assert_eq!(classify(Some(15.0), &rules), Color::from(ORANGE));
    }

    #[test]
    fn test_boundary_transition() {
        let rules = temperature_rules();
        assert_eq!(classify(Some(14.99), &rules), Color::from(BLUE));
        assert_eq!(classify(Some(15.0), &rules), Color::from(ORANGE));
    }

    #[test]
    fn test_list_order_does_not_matter() {
        let mut rules = temperature_rules();
        rules.reverse();
        assert_eq!(classify(Some(30.0), &rules), Color::from(RED));
        assert_eq!(classify(Some(20.0), &rules), Color::from(ORANGE));
    }

    #[test]
    fn test_missing_value_is_fallback() {
        assert_eq!(classify(None, &temperature_rules()), Color::fallback());
        assert_eq!(classify(None, &[]), Color::fallback());
        assert_eq!(classify(Some(f64::NAN), &temperature_rules()), Color::fallback());
    }

    #[test]
    fn test_empty_rules_is_fallback() {
        assert_eq!(classify(Some(12.0), &[]), Color::fallback());
    }

    #[test]
    fn test_no_match_is_fallback() {
        let rules = vec![Threshold::new(Operator::Gt, 100.0, RED)];
        assert_eq!(classify(Some(12.0), &rules), Color::fallback());
    }

    #[test]
    fn test_equality_epsilon() {
        let rules = vec![Threshold::new(Operator::Eq, 25.0, GREEN)];
        assert_eq!(classify(Some(25.005), &rules), Color::from(GREEN));
        assert_eq!(classify(Some(25.02), &rules), Color::fallback());
    }

    #[test]
    fn test_deterministic() {
        let rules = temperature_rules();
        let first = classify(Some(21.3), &rules);
        for _ in 0..10 {
            assert_eq!(classify(Some(21.3), &rules), first);
        }
    }

    #[test]
    fn test_mixed_rule_set_evaluation_order() {
        let rules = vec![
            Threshold::new(Operator::Lt, 15.0, BLUE),
            Threshold::new(Operator::Eq, 20.0, GREEN),
            Threshold::new(Operator::Ge, 15.0, ORANGE),
            Threshold::new(Operator::Le, 0.0, PURPLE),
            Threshold::new(Operator::Gt, 25.0, RED),
        ];
        let order: Vec<(Operator, f64)> = evaluation_order(&rules)
            .into_iter()
            .map(|rule| (rule.operator, rule.value))
            .collect();
        assert_eq!(
            order,
            vec![
                (Operator::Gt, 25.0),
                (Operator::Ge, 15.0),
                (Operator::Le, 0.0),
                (Operator::Lt, 15.0),
                (Operator::Eq, 20.0),
            ]
        );

        // `>=` rules are tried before `=`, so 20 lands on orange.
        assert_eq!(classify(Some(20.0), &rules), Color::from(ORANGE));
        assert_eq!(classify(Some(26.0), &rules), Color::from(RED));
        assert_eq!(classify(Some(-5.0), &rules), Color::from(PURPLE));
        assert_eq!(classify(Some(7.0), &rules), Color::from(BLUE));
    }

    #[test]
    fn test_equal_values_keep_list_order() {
        let rules = vec![
            Threshold::new(Operator::Ge, 10.0, RED),
            Threshold::new(Operator::Gt, 10.0, ORANGE),
        ];
        assert_eq!(classify(Some(11.0), &rules), Color::from(RED));
        let order = evaluation_order(&rules);
        assert_eq!(order[0].color, Color::from(RED));
    }

    #[test]
    fn test_matching_rule() {
        let rules = temperature_rules();
        let rule = matching_rule(Some(16.0), &rules).unwrap();
        assert_eq!(rule.value, 15.0);
        assert!(matching_rule(None, &rules).is_none());
    }
}
