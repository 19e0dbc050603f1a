//! Rubric scoring: six fixed categories, each a deterministic function of
//! the feature set, each bounded by its category maximum. The maxima sum to
//! exactly 10.0 and the overall score is the clamped, rounded sum.
//!
//! Scoring is total over any feature set; the all-empty case yields a
//! near-zero score with reasons citing the absent structure.

use std::collections::BTreeMap;

use crate::analysis::features::{FeatureSet, WeaknessTag, BULLET_VERBOSE_WORDS};
use crate::analysis::normalize::SectionKind;

/// Fewer analyzed bullets than this caps the achievable impact score
/// proportionally, so sparse resumes cannot score as dense ones.
pub const MIN_BULLET_FLOOR: usize = 4;

/// Expected distinct-skill count when no target role resolves to a profile.
pub const GENERIC_EXPECTED_SKILLS: usize = 10;

/// Target reading-grade band for resume prose.
pub const GRADE_BAND: (f64, f64) = (10.0, 12.0);

/// Word count below which readability and tone signals are meaningless.
const NEAR_EMPTY_WORDS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RubricCategory {
    ImpactBullets,
    SkillAlignment,
    ClarityTone,
    StructureAts,
    Projects,
    Hygiene,
}

impl RubricCategory {
    pub const ALL: [RubricCategory; 6] = [
        RubricCategory::ImpactBullets,
        RubricCategory::SkillAlignment,
        RubricCategory::ClarityTone,
        RubricCategory::StructureAts,
        RubricCategory::Projects,
        RubricCategory::Hygiene,
    ];

    pub fn max_points(self) -> f64 {
        match self {
            RubricCategory::ImpactBullets => 3.0,
            RubricCategory::SkillAlignment => 2.0,
            RubricCategory::ClarityTone => 2.0,
            RubricCategory::StructureAts => 1.5,
            RubricCategory::Projects => 1.0,
            RubricCategory::Hygiene => 0.5,
        }
    }

    /// Serialized subscore key; part of the response contract.
    pub fn key(self) -> &'static str {
        match self {
            RubricCategory::ImpactBullets => "impact_bullets",
            RubricCategory::SkillAlignment => "skill_alignment",
            RubricCategory::ClarityTone => "clarity_tone",
            RubricCategory::StructureAts => "structure_ats",
            RubricCategory::Projects => "projects",
            RubricCategory::Hygiene => "hygiene",
        }
    }

    /// Resume section an improvement for this category should point at.
    pub fn section_label(self) -> &'static str {
        match self {
            RubricCategory::ImpactBullets => "Experience",
            RubricCategory::SkillAlignment => "Skills",
            RubricCategory::ClarityTone => "Experience",
            RubricCategory::StructureAts => "Structure",
            RubricCategory::Projects => "Projects",
            RubricCategory::Hygiene => "Contact",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryScore {
    pub category: RubricCategory,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl CategoryScore {
    /// Score as a fraction of the category maximum.
    pub fn ratio(&self) -> f64 {
        self.score / self.category.max_points()
    }
}

#[derive(Debug, Clone)]
pub struct RubricResult {
    pub overall_score: f64,
    /// One entry per category, in `RubricCategory::ALL` order.
    pub categories: Vec<CategoryScore>,
}

impl RubricResult {
    pub fn get(&self, category: RubricCategory) -> &CategoryScore {
        // ALL order is fixed, so position equals enumeration order.
        &self.categories[RubricCategory::ALL
            .iter()
            .position(|&c| c == category)
            .unwrap_or(0)]
    }

    pub fn subscores(&self) -> BTreeMap<&'static str, f64> {
        self.categories
            .iter()
            .map(|c| (c.category.key(), c.score))
            .collect()
    }

    pub fn reasons(&self) -> BTreeMap<&'static str, Vec<String>> {
        self.categories
            .iter()
            .map(|c| (c.category.key(), c.reasons.clone()))
            .collect()
    }
}

/// Evaluates every category uniformly and assembles the overall score.
pub fn score_rubric(features: &FeatureSet, role_profile: Option<&[String]>) -> RubricResult {
    let categories: Vec<CategoryScore> = RubricCategory::ALL
        .iter()
        .map(|&category| {
            let (raw, reasons) = evaluate(category, features, role_profile);
            CategoryScore {
                category,
                score: round2(raw.clamp(0.0, category.max_points())),
                reasons,
            }
        })
        .collect();

    let overall_score = round1(
        categories
            .iter()
            .map(|c| c.score)
            .sum::<f64>()
            .clamp(0.0, 10.0),
    );

    RubricResult {
        overall_score,
        categories,
    }
}

fn evaluate(
    category: RubricCategory,
    features: &FeatureSet,
    role_profile: Option<&[String]>,
) -> (f64, Vec<String>) {
    match category {
        RubricCategory::ImpactBullets => score_impact_bullets(features),
        RubricCategory::SkillAlignment => score_skill_alignment(features, role_profile),
        RubricCategory::ClarityTone => score_clarity_tone(features),
        RubricCategory::StructureAts => score_structure_ats(features),
        RubricCategory::Projects => score_projects(features),
        RubricCategory::Hygiene => score_hygiene(features),
    }
}

fn score_impact_bullets(features: &FeatureSet) -> (f64, Vec<String>) {
    let bullets = &features.bullets;
    let n = bullets.len();
    if n == 0 {
        return (0.0, vec!["No bullet points detected.".to_string()]);
    }

    let credit: f64 = bullets
        .iter()
        .map(|b| {
            let signals = [b.has_action_verb, b.has_metric, b.has_tech_context]
                .iter()
                .filter(|&&s| s)
                .count();
            match signals {
                3 => 1.0,
                2 => 0.6,
                1 => 0.25,
                _ => 0.0,
            }
        })
        .sum();

    let effective = n.max(MIN_BULLET_FLOOR);
    let score = credit / effective as f64 * RubricCategory::ImpactBullets.max_points();

    let mut reasons = Vec::new();
    let missing_metric = bullets.iter().filter(|b| !b.has_metric).count();
    let missing_verb = bullets.iter().filter(|b| !b.has_action_verb).count();
    if missing_metric > 0 {
        reasons.push(format!("{missing_metric} of {n} bullets lack a measurable result."));
    }
    if missing_verb > 0 {
        reasons.push(format!("{missing_verb} of {n} bullets do not open with an action verb."));
    }
    if n < MIN_BULLET_FLOOR {
        reasons.push(format!(
            "Only {n} accomplishment bullets found; thin evidence caps this score."
        ));
    }
    if reasons.is_empty() {
        reasons.push("Bullets consistently pair action verbs with quantified results.".to_string());
    }
    reasons.truncate(3);
    (score, reasons)
}

fn score_skill_alignment(
    features: &FeatureSet,
    role_profile: Option<&[String]>,
) -> (f64, Vec<String>) {
    let distinct = features.skills.len();
    let expected = role_profile
        .map(|p| p.len().max(1))
        .unwrap_or(GENERIC_EXPECTED_SKILLS);
    let ratio = (distinct as f64 / expected as f64).min(1.0);
    let score = ratio * RubricCategory::SkillAlignment.max_points();

    let reasons = if distinct == 0 {
        vec!["No recognizable skills detected.".to_string()]
    } else if role_profile.is_some() {
        vec![format!(
            "Detected {distinct} distinct skills against {expected} expected for the target role."
        )]
    } else {
        vec![format!(
            "Detected {distinct} distinct skills ({GENERIC_EXPECTED_SKILLS} expected for a strong resume)."
        )]
    };
    (score, reasons)
}

fn score_clarity_tone(features: &FeatureSet) -> (f64, Vec<String>) {
    let near_empty = features.readability.word_count < NEAR_EMPTY_WORDS;
    let mut reasons = Vec::new();

    // Readability: full credit inside the grade band, linear decay outside.
    let grade = features.readability.grade_level;
    let readability = if near_empty {
        0.0
    } else if (GRADE_BAND.0..=GRADE_BAND.1).contains(&grade) {
        0.8
    } else {
        let midpoint = (GRADE_BAND.0 + GRADE_BAND.1) / 2.0;
        (0.8 - (grade - midpoint).abs() * 0.1).max(0.0)
    };
    if !near_empty && !(GRADE_BAND.0..=GRADE_BAND.1).contains(&grade) {
        reasons.push(format!(
            "Estimated reading grade {grade:.0} sits outside the {:.0}-{:.0} target band.",
            GRADE_BAND.0, GRADE_BAND.1
        ));
    }

    // Concision: penalize the fraction of over-long bullets.
    let concision = if features.bullets.is_empty() {
        if near_empty {
            0.0
        } else {
            0.3
        }
    } else {
        let verbose = features
            .bullets
            .iter()
            .filter(|b| b.weakness_tags.contains(&WeaknessTag::TooVerbose))
            .count();
        let frac = verbose as f64 / features.bullets.len() as f64;
        if verbose > 0 {
            reasons.push(format!(
                "{verbose} bullets run past {BULLET_VERBOSE_WORDS} words."
            ));
        }
        0.7 * (1.0 - frac)
    };

    // Tone: weak phrasing reads as passive ownership.
    let weak_hits = features.weak_phrase_hits;
    let tone = if near_empty {
        0.0
    } else {
        (0.5 - 0.1 * weak_hits as f64).max(0.0)
    };
    if weak_hits > 0 {
        if let Some(phrase) = &features.weak_phrase_example {
            reasons.push(format!(
                "Weak phrasing detected {weak_hits} time(s), e.g. \"{phrase}\"."
            ));
        }
    }

    if reasons.is_empty() && !near_empty {
        reasons.push("Prose is concise and sits in the target reading band.".to_string());
    }
    if near_empty {
        reasons.push("Too little text to assess clarity.".to_string());
    }
    reasons.truncate(3);
    (readability + concision + tone, reasons)
}

fn score_structure_ats(features: &FeatureSet) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    let mut missing: Vec<&str> = Vec::new();

    for (present, name) in [
        (features.sections.experience, "Experience"),
        (features.sections.education, "Education"),
        (features.sections.skills, "Skills"),
        (features.sections.contact, "Contact"),
    ] {
        if present {
            score += 0.25;
        } else {
            missing.push(name);
        }
    }
    if !missing.is_empty() {
        reasons.push(format!("Missing standard section headers: {}.", missing.join(", ")));
    }

    // A bullet-dominant Experience section parses far better than paragraphs.
    if let Some(exp) = features.doc.section(SectionKind::Experience) {
        let bullet_count = features.doc.bullets_in(SectionKind::Experience).count();
        let content_lines = exp.lines.len().max(1);
        if bullet_count >= 3 && bullet_count * 2 >= content_lines {
            score += 0.5;
        } else {
            reasons.push(
                "Experience reads as paragraphs rather than bullet points.".to_string(),
            );
        }
    }

    if features.hygiene.had_tabs {
        score -= 0.2;
        reasons.push("Tabs or table layout may hurt ATS parsing.".to_string());
    }

    if reasons.is_empty() {
        reasons.push("All core sections present with a bullet-led Experience.".to_string());
    }
    reasons.truncate(3);
    (score, reasons)
}

fn score_projects(features: &FeatureSet) -> (f64, Vec<String>) {
    let Some(projects) = features.doc.section(SectionKind::Projects) else {
        return (0.0, vec!["No Projects section detected.".to_string()]);
    };

    let text_lower = projects.lines.join("\n").to_lowercase();
    let mut score = 0.3;
    let mut reasons = Vec::new();

    let project_bullets: Vec<_> = features
        .bullets
        .iter()
        .filter(|b| b.section == SectionKind::Projects)
        .collect();

    let has_problem = ["problem", "challenge", "goal"]
        .iter()
        .any(|k| text_lower.contains(k));
    let has_approach = ["approach", "method", "stack", "using", "with"]
        .iter()
        .any(|k| text_lower.contains(k))
        || project_bullets.iter().any(|b| b.has_tech_context);
    if has_problem || has_approach {
        score += 0.3;
    } else {
        reasons.push("Project entries do not show a problem-approach narrative.".to_string());
    }

    if project_bullets.iter().any(|b| b.has_metric) {
        score += 0.2;
    } else {
        reasons.push("No project cites a measurable result.".to_string());
    }

    if features.projects_have_link {
        score += 0.2;
    } else {
        reasons.push("No repository or demo link found in Projects.".to_string());
    }

    if reasons.is_empty() {
        reasons.push("Projects show approach, results, and links.".to_string());
    }
    reasons.truncate(3);
    (score, reasons)
}

fn score_hygiene(features: &FeatureSet) -> (f64, Vec<String>) {
    let h = &features.hygiene;
    let mut score = RubricCategory::Hygiene.max_points();
    let mut reasons = Vec::new();

    if !h.has_email {
        score -= 0.2;
        reasons.push("No email address found.".to_string());
    }
    if !h.has_phone {
        score -= 0.1;
        reasons.push("No phone number found.".to_string());
    }
    if h.too_short {
        score -= 0.1;
        reasons.push("Content is well under a single page.".to_string());
    } else if h.too_long {
        score -= 0.1;
        reasons.push("Content likely exceeds two pages.".to_string());
    }
    if h.repeated_word_typos > 0 {
        score -= 0.1;
        reasons.push(format!(
            "{} repeated-word typo(s) detected (e.g. \"the the\").",
            h.repeated_word_typos
        ));
    }

    if reasons.is_empty() {
        reasons.push("Contact details present and length is reasonable.".to_string());
    }
    reasons.truncate(3);
    (score, reasons)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{extract_features, Patterns};
    use crate::analysis::lexicon::Lexicon;
    use crate::analysis::normalize::normalize;
    use proptest::prelude::*;

    fn features_for(text: &str) -> FeatureSet {
        let lexicon = Lexicon::builtin().unwrap();
        let patterns = Patterns::new().unwrap();
        extract_features(&lexicon, &patterns, normalize(text))
    }

    const STRONG_RESUME: &str = "Jane Doe\njane@example.com | +1 415 555 0101\n\nExperience\nData Analyst, Acme Corp\n- Built PowerBI dashboards adopted by 12 teams, cutting reporting time 40%\n- Optimized SQL queries, reducing latency by 120ms\n- Automated ETL pipelines in Airflow, saving 6 hours weekly\n- Led migration to Snowflake, lowering costs 18%\n\nProjects\n- Shipped a Python pricing model, improving forecast accuracy 9% (github.com/janedoe/pricing)\n\nEducation\nB.S. Statistics\n\nSkills\nPython, SQL, PowerBI, Tableau, Excel, Statistics, A/B testing, ETL\n";

    #[test]
    fn test_category_maxima_sum_to_ten() {
        let total: f64 = RubricCategory::ALL.iter().map(|c| c.max_points()).sum();
        assert!((total - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overall_is_rounded_sum_of_subscores() {
        let rubric = score_rubric(&features_for(STRONG_RESUME), None);
        let sum: f64 = rubric.categories.iter().map(|c| c.score).sum();
        let expected = (sum.clamp(0.0, 10.0) * 10.0).round() / 10.0;
        assert!((rubric.overall_score - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_strong_resume_scores_well() {
        let rubric = score_rubric(&features_for(STRONG_RESUME), None);
        assert!(
            rubric.overall_score >= 6.0,
            "expected a strong score, got {}",
            rubric.overall_score
        );
        assert!(rubric.get(RubricCategory::ImpactBullets).score > 1.5);
        assert!(rubric.get(RubricCategory::StructureAts).score >= 1.0);
    }

    #[test]
    fn test_empty_features_score_near_zero() {
        let rubric = score_rubric(&features_for(""), None);
        assert!(rubric.overall_score <= 0.5);
        let impact = rubric.get(RubricCategory::ImpactBullets);
        assert_eq!(impact.score, 0.0);
        assert_eq!(impact.reasons, vec!["No bullet points detected.".to_string()]);
    }

    #[test]
    fn test_missing_headers_zero_structure_score() {
        let rubric = score_rubric(&features_for("just one line of plain text with no headers"), None);
        let structure = rubric.get(RubricCategory::StructureAts);
        assert!(structure.score <= 0.01);
        assert!(structure.reasons[0].contains("Missing standard section headers"));
    }

    #[test]
    fn test_sparse_bullets_are_floored() {
        // Two perfect bullets against a floor of four: at most half the max.
        let text = "Experience\n- Built PowerBI dashboards, cutting reporting time 40%\n- Optimized SQL queries, reducing latency by 120ms\n";
        let rubric = score_rubric(&features_for(text), None);
        let impact = rubric.get(RubricCategory::ImpactBullets);
        assert!(impact.score <= 1.5 + 0.01, "got {}", impact.score);
        assert!(impact.reasons.iter().any(|r| r.contains("thin evidence")));
    }

    #[test]
    fn test_role_profile_changes_alignment_expectation() {
        let features = features_for(STRONG_RESUME);
        let lexicon = Lexicon::builtin().unwrap();
        let profile = lexicon.role_profile("data analyst").unwrap();
        let with_role = score_rubric(&features, Some(profile));
        let generic = score_rubric(&features, None);
        // The resume covers the analyst profile size, so the role-aware
        // expectation can only help.
        assert!(
            with_role.get(RubricCategory::SkillAlignment).score
                >= generic.get(RubricCategory::SkillAlignment).score
        );
    }

    #[test]
    fn test_weak_phrases_cited_and_penalized() {
        let base = "Experience\n- Responsible for dashboards and reports for many internal teams every quarter\n- Responsible for maintaining legacy scripts across the whole company stack\n- Was part of the analytics group supporting leadership every planning cycle\n";
        let clarity = score_rubric(&features_for(base), None);
        let clarity = clarity.get(RubricCategory::ClarityTone);
        assert!(clarity
            .reasons
            .iter()
            .any(|r| r.contains("Weak phrasing")));
        // Three weak-phrase hits cost 0.3 of the 0.5 tone component.
        assert!(clarity.score < RubricCategory::ClarityTone.max_points() - 0.25);
    }

    #[test]
    fn test_projects_link_and_metric_bonus() {
        let with_link = "Projects\n- Shipped a Python pricing model, improving accuracy 9% (github.com/x/y)\n";
        let without = "Projects\n- A pricing model\n";
        let linked = score_rubric(&features_for(with_link), None)
            .get(RubricCategory::Projects)
            .score;
        let bare = score_rubric(&features_for(without), None)
            .get(RubricCategory::Projects)
            .score;
        assert!(linked > bare);
        assert!(linked <= 1.0);
    }

    #[test]
    fn test_hygiene_deductions() {
        let rubric = score_rubric(&features_for("Experience\n- Improved the the pipeline\n"), None);
        let hygiene = rubric.get(RubricCategory::Hygiene);
        assert!(hygiene.score < 0.5);
        assert!(hygiene
            .reasons
            .iter()
            .any(|r| r.contains("repeated-word")));
    }

    proptest! {
        /// Bound properties hold for arbitrary text, including garbage.
        #[test]
        fn prop_scores_stay_bounded(text in ".{0,2000}") {
            let rubric = score_rubric(&features_for(&text), None);
            prop_assert!(rubric.overall_score >= 0.0);
            prop_assert!(rubric.overall_score <= 10.0);
            for c in &rubric.categories {
                prop_assert!(c.score >= 0.0);
                prop_assert!(c.score <= c.category.max_points());
                prop_assert!(!c.reasons.is_empty());
            }
            let sum: f64 = rubric.categories.iter().map(|c| c.score).sum();
            let expected = (sum.clamp(0.0, 10.0) * 10.0).round() / 10.0;
            prop_assert!((rubric.overall_score - expected).abs() < 1e-9);
        }
    }
}
