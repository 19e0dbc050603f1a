//! Job-description comparison: coverage percentage, missing and matched
//! canonical skills, and tailored recommendations. Reuses the feature
//! extractor's skill detection rather than duplicating it.

use std::collections::HashSet;

use serde::Serialize;

use crate::analysis::features::{detect_skills, SkillMatch};
use crate::analysis::lexicon::Lexicon;

/// Resume-side matches below this confidence do not count as coverage;
/// a marginal fuzzy hit is not evidence the skill is really there.
pub const RESUME_CONFIDENCE_FLOOR: f64 = 0.75;

pub const MAX_RECOMMENDATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdComparison {
    pub coverage_pct: u32,
    pub missing_skills: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Compares resume skills against a job description.
///
/// Coverage is 0 when the JD yields no detectable skills, by definition
/// rather than as a division error. Missing skills keep JD first-appearance
/// order; when a target-role profile is known, profile skills surface first.
pub fn compare(
    lexicon: &Lexicon,
    jd_text: &str,
    resume_skills: &[SkillMatch],
    role_profile: Option<&[String]>,
) -> JdComparison {
    let jd_lines: Vec<String> = jd_text.lines().map(str::to_string).collect();
    let jd_skills = detect_skills(lexicon, &jd_lines);

    if jd_skills.is_empty() {
        return JdComparison {
            coverage_pct: 0,
            missing_skills: Vec::new(),
            matched_keywords: Vec::new(),
            recommendations: Vec::new(),
        };
    }

    let covered: HashSet<&str> = resume_skills
        .iter()
        .filter(|s| s.confidence >= RESUME_CONFIDENCE_FLOOR)
        .map(|s| s.canonical.as_str())
        .collect();

    let mut matched_keywords = Vec::new();
    let mut missing_skills = Vec::new();
    for skill in &jd_skills {
        if covered.contains(skill.canonical.as_str()) {
            matched_keywords.push(skill.canonical.clone());
        } else {
            missing_skills.push(skill.canonical.clone());
        }
    }

    if let Some(profile) = role_profile {
        // Stable partition: role-profile skills first, JD order within each.
        missing_skills.sort_by_key(|s| !profile.contains(s));
    }

    let coverage_pct =
        (100.0 * matched_keywords.len() as f64 / jd_skills.len() as f64).round() as u32;

    let recommendations: Vec<String> = missing_skills
        .iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|s| format!("Add a bullet that shows {s} applied to a project with a measurable result."))
        .collect();

    JdComparison {
        coverage_pct,
        missing_skills,
        matched_keywords,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(canonical: &str, confidence: f64) -> SkillMatch {
        SkillMatch {
            canonical: canonical.to_string(),
            surface: canonical.to_lowercase(),
            confidence,
            line: 0,
        }
    }

    #[test]
    fn test_three_of_four_jd_skills_is_75_percent() {
        let lexicon = Lexicon::builtin().unwrap();
        let resume = vec![skill("Python", 1.0), skill("SQL", 1.0), skill("PowerBI", 1.0)];
        let comparison = compare(
            &lexicon,
            "We need SQL, Python, PowerBI, A/B testing",
            &resume,
            None,
        );
        assert_eq!(comparison.coverage_pct, 75);
        assert_eq!(comparison.missing_skills, vec!["A/B testing".to_string()]);
        assert_eq!(
            comparison.matched_keywords,
            vec!["SQL".to_string(), "Python".to_string(), "PowerBI".to_string()]
        );
        assert_eq!(comparison.recommendations.len(), 1);
        assert!(comparison.recommendations[0].contains("A/B testing"));
    }

    #[test]
    fn test_jd_without_detectable_skills_is_zero_coverage() {
        let lexicon = Lexicon::builtin().unwrap();
        let comparison = compare(
            &lexicon,
            "We want a friendly, motivated self-starter.",
            &[skill("Python", 1.0)],
            None,
        );
        assert_eq!(comparison.coverage_pct, 0);
        assert!(comparison.missing_skills.is_empty());
        assert!(comparison.recommendations.is_empty());
    }

    #[test]
    fn test_resume_superset_is_full_coverage() {
        let lexicon = Lexicon::builtin().unwrap();
        let resume = vec![
            skill("Python", 1.0),
            skill("SQL", 1.0),
            skill("Docker", 1.0),
            skill("Airflow", 1.0),
        ];
        let comparison = compare(&lexicon, "Python and SQL required.", &resume, None);
        assert_eq!(comparison.coverage_pct, 100);
        assert!(comparison.missing_skills.is_empty());
    }

    #[test]
    fn test_low_confidence_resume_hit_does_not_count() {
        let lexicon = Lexicon::builtin().unwrap();
        let resume = vec![skill("Python", 0.5)];
        let comparison = compare(&lexicon, "Python required.", &resume, None);
        assert_eq!(comparison.coverage_pct, 0);
        assert_eq!(comparison.missing_skills, vec!["Python".to_string()]);
    }

    #[test]
    fn test_role_profile_reorders_missing_skills() {
        let lexicon = Lexicon::builtin().unwrap();
        let profile = lexicon.role_profile("data analyst").unwrap();
        // JD mentions Docker before SQL; SQL is in the analyst profile.
        let comparison = compare(
            &lexicon,
            "Experience with Docker and SQL expected.",
            &[],
            Some(profile),
        );
        assert_eq!(comparison.missing_skills[0], "SQL");
        assert!(comparison.missing_skills.contains(&"Docker".to_string()));
    }

    #[test]
    fn test_recommendations_capped() {
        let lexicon = Lexicon::builtin().unwrap();
        let jd = "Python, SQL, Docker, Kubernetes, Airflow, Spark, Kafka, Tableau";
        let comparison = compare(&lexicon, jd, &[], None);
        assert!(comparison.missing_skills.len() > MAX_RECOMMENDATIONS);
        assert_eq!(comparison.recommendations.len(), MAX_RECOMMENDATIONS);
    }
}
