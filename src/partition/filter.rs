//! Include/exclude filtering of scenarios by glob pattern

use glob::{MatchOptions, Pattern};
use std::path::Path;
use tracing::warn;

use super::types::Scenario;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Pure: Apply include patterns, then exclude patterns, preserving order
///
/// An empty include list lets every scenario through the first stage.
/// Patterns are tested against both the full path and the bare filename.
/// A pattern that is not valid glob syntax matches nothing.
pub fn filter(scenarios: &[Scenario], include: &[String], exclude: &[String]) -> Vec<Scenario> {
    let include_all = include.is_empty();
    let include = compile(include);
    let exclude = compile(exclude);

    scenarios
        .iter()
        .filter(|s| include_all || matches_any(&s.path, &include))
        .filter(|s| !matches_any(&s.path, &exclude))
        .cloned()
        .collect()
}

fn compile(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Ignoring invalid scenario pattern '{}': {}", p, e);
                None
            }
        })
        .collect()
}

/// Pure: Check a scenario path against a set of patterns
fn matches_any(path: &str, patterns: &[Pattern]) -> bool {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    patterns.iter().any(|pattern| {
        pattern.matches_with(path, MATCH_OPTIONS) || pattern.matches_with(file_name, MATCH_OPTIONS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenarios() -> Vec<Scenario> {
        vec![
            Scenario::new("billing", "Billing", "scenarios/billing.yaml"),
            Scenario::new("refunds", "Refunds", "scenarios/refunds.yaml"),
            Scenario::new("smoke", "Smoke", "smoke/basic.yaml"),
            Scenario::new("slow", "Slow", "scenarios/slow-billing.yaml"),
        ]
    }

    fn ids(scenarios: &[Scenario]) -> Vec<&str> {
        scenarios.iter().map(|s| s.id.as_str()).collect()
    }

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filters_return_everything_in_order() {
        let input = scenarios();
        let result = filter(&input, &[], &[]);
        assert_eq!(result, input);
    }

    #[test]
    fn test_include_matches_bare_filename() {
        let result = filter(&scenarios(), &patterns(&["billing.yaml"]), &[]);
        assert_eq!(ids(&result), vec!["billing"]);
    }

    #[test]
    fn test_include_matches_full_path() {
        let result = filter(&scenarios(), &patterns(&["smoke/*.yaml"]), &[]);
        assert_eq!(ids(&result), vec!["smoke"]);
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let result = filter(&scenarios(), &patterns(&["scenarios*"]), &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_include_any_pattern_passes() {
        let result = filter(
            &scenarios(),
            &patterns(&["*billing*", "refunds.yaml"]),
            &[],
        );
        assert_eq!(ids(&result), vec!["billing", "refunds", "slow"]);
    }

    #[test]
    fn test_exclude_applies_after_include() {
        let result = filter(
            &scenarios(),
            &patterns(&["*billing*"]),
            &patterns(&["slow-*"]),
        );
        assert_eq!(ids(&result), vec!["billing"]);
    }

    #[test]
    fn test_exclude_only() {
        let result = filter(&scenarios(), &[], &patterns(&["scenarios/*"]));
        assert_eq!(ids(&result), vec!["smoke"]);
    }

    #[test]
    fn test_invalid_pattern_matches_nothing() {
        let result = filter(&scenarios(), &patterns(&["[unclosed"]), &[]);
        assert!(result.is_empty());

        let result = filter(&scenarios(), &[], &patterns(&["[unclosed"]));
        assert_eq!(result.len(), 4);
    }
}
