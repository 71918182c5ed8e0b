//! Partition rules — validation, scoring and discard logic for requirement sets.
//!
//! Pure functions, no I/O. Classifier output is checked here before the state
//! machine is allowed to commit it.

use std::collections::HashSet;

use thiserror::Error;

use crate::evaluation::classifier::Classification;
use crate::models::evaluation::EvaluationRecord;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    #[error("no requirements were extracted from the offer")]
    NoRequirements,

    #[error("blank requirement in {0}")]
    BlankRequirement(&'static str),

    #[error("requirement '{0}' is classified more than once")]
    Duplicate(String),

    #[error("declared {declared} requirements but classified {classified}")]
    CountMismatch { declared: usize, classified: usize },

    #[error("mandatory requirement '{0}' is not among the classified requirements")]
    UnknownMandatory(String),

    #[error("requirement '{0}' was not part of the analyzed offer")]
    UnknownRequirement(String),

    #[error("requirement '{requirement}' was already {settled} and cannot be reclassified")]
    SettledRequirementMoved {
        requirement: String,
        settled: &'static str,
    },
}

/// The three disjoint requirement sets, trimmed and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementSets {
    pub matching: Vec<String>,
    pub unmatching: Vec<String>,
    pub not_found: Vec<String>,
}

impl RequirementSets {
    pub fn total(&self) -> usize {
        self.matching.len() + self.unmatching.len() + self.not_found.len()
    }

    pub fn contains(&self, requirement: &str) -> bool {
        self.matching
            .iter()
            .chain(&self.unmatching)
            .chain(&self.not_found)
            .any(|r| r == requirement)
    }
}

fn trimmed(items: &[String], set: &'static str) -> Result<Vec<String>, RuleViolation> {
    items
        .iter()
        .map(|item| {
            let item = item.trim();
            if item.is_empty() {
                Err(RuleViolation::BlankRequirement(set))
            } else {
                Ok(item.to_string())
            }
        })
        .collect()
}

/// Checks that the classification is a partition: no blanks, no requirement in
/// two places, and as many classified requirements as declared.
pub fn normalize_sets(classification: &Classification) -> Result<RequirementSets, RuleViolation> {
    let sets = RequirementSets {
        matching: trimmed(&classification.matching, "matching")?,
        unmatching: trimmed(&classification.unmatching, "unmatching")?,
        not_found: trimmed(&classification.not_found, "not_found")?,
    };

    let mut seen = HashSet::new();
    for requirement in sets
        .matching
        .iter()
        .chain(&sets.unmatching)
        .chain(&sets.not_found)
    {
        if !seen.insert(requirement.as_str()) {
            return Err(RuleViolation::Duplicate(requirement.clone()));
        }
    }

    let classified = sets.total();
    if classified != classification.requirements_total {
        return Err(RuleViolation::CountMismatch {
            declared: classification.requirements_total,
            classified,
        });
    }
    if classified == 0 {
        return Err(RuleViolation::NoRequirements);
    }

    Ok(sets)
}

/// Trims and de-duplicates the mandatory tags; each must name a classified requirement.
pub fn normalize_mandatory(
    mandatory: &[String],
    sets: &RequirementSets,
) -> Result<Vec<String>, RuleViolation> {
    let mut out: Vec<String> = Vec::with_capacity(mandatory.len());
    for requirement in trimmed(mandatory, "mandatory")? {
        if !sets.contains(&requirement) {
            return Err(RuleViolation::UnknownMandatory(requirement));
        }
        if !out.contains(&requirement) {
            out.push(requirement);
        }
    }
    Ok(out)
}

/// Checks an audit reconciliation against the committed record: the same
/// requirement units, and only `not_found` items may have moved.
pub fn check_reconciliation(
    before: &EvaluationRecord,
    after: &RequirementSets,
) -> Result<(), RuleViolation> {
    if after.total() != before.requirements_total {
        return Err(RuleViolation::CountMismatch {
            declared: before.requirements_total,
            classified: after.total(),
        });
    }

    let known: HashSet<&str> = before
        .matching
        .iter()
        .chain(&before.unmatching)
        .chain(&before.not_found)
        .map(String::as_str)
        .collect();
    for requirement in after
        .matching
        .iter()
        .chain(&after.unmatching)
        .chain(&after.not_found)
    {
        if !known.contains(requirement.as_str()) {
            return Err(RuleViolation::UnknownRequirement(requirement.clone()));
        }
    }

    if let Some(moved) = before.matching.iter().find(|r| !after.matching.contains(r)) {
        return Err(RuleViolation::SettledRequirementMoved {
            requirement: moved.clone(),
            settled: "matching",
        });
    }
    if let Some(moved) = before
        .unmatching
        .iter()
        .find(|r| !after.unmatching.contains(r))
    {
        return Err(RuleViolation::SettledRequirementMoved {
            requirement: moved.clone(),
            settled: "unmatching",
        });
    }

    Ok(())
}

/// `matching / total * 100`. Unmatching and not_found both count as zero.
pub fn compute_score(matching: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    matching as f64 / total as f64 * 100.0
}

/// True iff a mandatory requirement is unmatching. Not-found never discards.
pub fn compute_discarded(unmatching: &[String], mandatory: &[String]) -> bool {
    mandatory.iter().any(|m| unmatching.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluation::EvaluationStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn classification(matching: &[&str], unmatching: &[&str], not_found: &[&str]) -> Classification {
        Classification {
            requirements_total: matching.len() + unmatching.len() + not_found.len(),
            mandatory: vec![],
            matching: strings(matching),
            unmatching: strings(unmatching),
            not_found: strings(not_found),
            score: 0.0,
            discarded: false,
        }
    }

    fn record(matching: &[&str], unmatching: &[&str], not_found: &[&str]) -> EvaluationRecord {
        EvaluationRecord {
            id: Uuid::new_v4(),
            candidate_name: "Pedro Pascal".to_string(),
            candidate_identifier: "12345678Z".to_string(),
            requirements_total: matching.len() + unmatching.len() + not_found.len(),
            matching: strings(matching),
            unmatching: strings(unmatching),
            not_found: strings(not_found),
            mandatory: vec![],
            score: 0.0,
            discarded: false,
            status: EvaluationStatus::InterviewNeeded,
            key_points: vec![],
            red_flags: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
            audited_at: None,
        }
    }

    #[test]
    fn test_score_formula() {
        assert_eq!(compute_score(0, 4), 0.0);
        assert_eq!(compute_score(2, 4), 50.0);
        assert_eq!(compute_score(4, 4), 100.0);
        assert!((compute_score(1, 3) - 33.333).abs() < 0.01);
        assert_eq!(compute_score(0, 0), 0.0);
    }

    #[test]
    fn test_discarded_only_by_unmatching_mandatory() {
        let mandatory = strings(&["Docker", "FastAPI"]);
        assert!(compute_discarded(&strings(&["Docker"]), &mandatory));
        assert!(!compute_discarded(&strings(&["AWS"]), &mandatory));
        assert!(!compute_discarded(&[], &mandatory));
    }

    #[test]
    fn test_normalize_sets_trims_entries() {
        let sets = normalize_sets(&classification(&["  FastAPI "], &[], &["Docker\n"])).unwrap();
        assert_eq!(sets.matching, strings(&["FastAPI"]));
        assert_eq!(sets.not_found, strings(&["Docker"]));
        assert_eq!(sets.total(), 2);
    }

    #[test]
    fn test_normalize_sets_rejects_overlap() {
        let err = normalize_sets(&classification(&["Docker"], &[], &["Docker"])).unwrap_err();
        assert_eq!(err, RuleViolation::Duplicate("Docker".to_string()));
    }

    #[test]
    fn test_normalize_sets_rejects_count_mismatch() {
        let mut c = classification(&["FastAPI"], &["Docker"], &[]);
        c.requirements_total = 3;
        let err = normalize_sets(&c).unwrap_err();
        assert_eq!(
            err,
            RuleViolation::CountMismatch {
                declared: 3,
                classified: 2
            }
        );
    }

    #[test]
    fn test_normalize_sets_rejects_empty_and_blank() {
        assert_eq!(
            normalize_sets(&classification(&[], &[], &[])).unwrap_err(),
            RuleViolation::NoRequirements
        );
        assert_eq!(
            normalize_sets(&classification(&["  "], &[], &[])).unwrap_err(),
            RuleViolation::BlankRequirement("matching")
        );
    }

    #[test]
    fn test_normalize_mandatory_must_be_known() {
        let sets = normalize_sets(&classification(&["FastAPI"], &[], &["Docker"])).unwrap();
        assert_eq!(
            normalize_mandatory(&strings(&["Docker", " Docker "]), &sets).unwrap(),
            strings(&["Docker"])
        );
        assert_eq!(
            normalize_mandatory(&strings(&["Kubernetes"]), &sets).unwrap_err(),
            RuleViolation::UnknownMandatory("Kubernetes".to_string())
        );
    }

    #[test]
    fn test_reconciliation_allows_moves_out_of_not_found() {
        let before = record(&["FastAPI"], &["Docker"], &["LangChain", "AWS"]);
        let after = normalize_sets(&classification(
            &["FastAPI", "LangChain"],
            &["Docker", "AWS"],
            &[],
        ))
        .unwrap();
        assert!(check_reconciliation(&before, &after).is_ok());
    }

    #[test]
    fn test_reconciliation_rejects_moving_settled_items() {
        let before = record(&["FastAPI"], &["Docker"], &["LangChain"]);

        let after = normalize_sets(&classification(&[], &["Docker", "FastAPI"], &["LangChain"]))
            .unwrap();
        assert_eq!(
            check_reconciliation(&before, &after).unwrap_err(),
            RuleViolation::SettledRequirementMoved {
                requirement: "FastAPI".to_string(),
                settled: "matching"
            }
        );

        let after = normalize_sets(&classification(&["FastAPI", "Docker"], &[], &["LangChain"]))
            .unwrap();
        assert!(matches!(
            check_reconciliation(&before, &after).unwrap_err(),
            RuleViolation::SettledRequirementMoved { settled: "unmatching", .. }
        ));
    }

    #[test]
    fn test_reconciliation_rejects_changed_requirement_set() {
        let before = record(&["FastAPI"], &[], &["LangChain"]);

        let renamed = normalize_sets(&classification(&["FastAPI", "Langchain"], &[], &[])).unwrap();
        assert_eq!(
            check_reconciliation(&before, &renamed).unwrap_err(),
            RuleViolation::UnknownRequirement("Langchain".to_string())
        );

        let shrunk = normalize_sets(&classification(&["FastAPI"], &[], &[])).unwrap();
        assert!(matches!(
            check_reconciliation(&before, &shrunk).unwrap_err(),
            RuleViolation::CountMismatch { .. }
        ));
    }
}
