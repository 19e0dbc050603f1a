//! Improvement generation: turns the weakest rubric categories into a short,
//! ordered list of concrete suggestions with example rewrites.

use serde::Serialize;

use crate::analysis::features::{FeatureSet, WeaknessTag, BULLET_VERBOSE_WORDS};
use crate::analysis::rubric::{RubricCategory, RubricResult};

/// Total suggestion cap; more than this stops being actionable.
pub const MAX_IMPROVEMENTS: usize = 5;

/// Per-category cap so one weak area cannot crowd out the rest.
const MAX_PER_CATEGORY: usize = 2;

/// Categories above this score/max ratio are healthy enough to skip.
const WEAKNESS_RATIO: f64 = 0.75;

const QUOTE_LEN: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub section: String,
    pub issue: String,
    pub fix_example: String,
}

/// Emits improvements for the weakest categories, ranked ascending by
/// score/max ratio; equally weak categories surface in rubric-weight order
/// (higher maximum first).
pub fn generate(
    features: &FeatureSet,
    rubric: &RubricResult,
    role_profile: Option<&[String]>,
) -> Vec<Improvement> {
    let mut ranked: Vec<_> = rubric
        .categories
        .iter()
        .filter(|c| c.ratio() < WEAKNESS_RATIO)
        .collect();
    ranked.sort_by(|a, b| {
        a.ratio()
            .partial_cmp(&b.ratio())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                b.category
                    .max_points()
                    .partial_cmp(&a.category.max_points())
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });

    let mut out = Vec::new();
    for scored in ranked {
        if out.len() >= MAX_IMPROVEMENTS {
            break;
        }
        let entries = category_improvements(scored.category, features, role_profile);
        for entry in entries.into_iter().take(MAX_PER_CATEGORY) {
            if out.len() >= MAX_IMPROVEMENTS {
                break;
            }
            out.push(entry);
        }
    }
    out
}

fn category_improvements(
    category: RubricCategory,
    features: &FeatureSet,
    role_profile: Option<&[String]>,
) -> Vec<Improvement> {
    let section = category.section_label().to_string();
    match category {
        RubricCategory::ImpactBullets => impact_entries(features, section),
        RubricCategory::SkillAlignment => skill_entries(features, role_profile, section),
        RubricCategory::ClarityTone => clarity_entries(features, section),
        RubricCategory::StructureAts => structure_entries(features, section),
        RubricCategory::Projects => projects_entries(features, section),
        RubricCategory::Hygiene => hygiene_entries(features, section),
    }
}

fn impact_entries(features: &FeatureSet, section: String) -> Vec<Improvement> {
    if features.bullets.is_empty() {
        return vec![Improvement {
            section,
            issue: "No accomplishment bullets detected".to_string(),
            fix_example: "Rewrite each role as 3-5 bullets: action verb, what you built, and a quantified result.".to_string(),
        }];
    }

    let mut entries = Vec::new();
    // Prefer a bullet where adding the metric is the whole fix; fall back to
    // any metric-less bullet.
    let metric_less = features
        .bullets
        .iter()
        .find(|b| b.has_action_verb && b.weakness_tags.contains(&WeaknessTag::MissingMetric))
        .or_else(|| {
            features
                .bullets
                .iter()
                .find(|b| b.weakness_tags.contains(&WeaknessTag::MissingMetric))
        });
    if let Some(bullet) = metric_less {
        let lead = bullet
            .text
            .split_whitespace()
            .next()
            .unwrap_or("Delivered");
        entries.push(Improvement {
            section: section.clone(),
            issue: format!(
                "Bullet lacks a measurable result: \"{}\"",
                truncate(&bullet.text, QUOTE_LEN)
            ),
            fix_example: format!(
                "{lead} ... resulting in a concrete metric (e.g. +23% conversion, -120ms latency, 2x throughput)."
            ),
        });
    }
    if let Some(bullet) = features
        .bullets
        .iter()
        .find(|b| b.weakness_tags.contains(&WeaknessTag::MissingActionVerb))
    {
        entries.push(Improvement {
            section,
            issue: format!(
                "Bullet does not open with an action verb: \"{}\"",
                truncate(&bullet.text, QUOTE_LEN)
            ),
            fix_example: "Open with a strong verb: Built, Reduced, Shipped, Automated.".to_string(),
        });
    }
    entries
}

fn skill_entries(
    features: &FeatureSet,
    role_profile: Option<&[String]>,
    section: String,
) -> Vec<Improvement> {
    if let Some(profile) = role_profile {
        let detected: Vec<&str> = features.skills.iter().map(|s| s.canonical.as_str()).collect();
        let missing: Vec<&str> = profile
            .iter()
            .map(String::as_str)
            .filter(|s| !detected.contains(s))
            .take(3)
            .collect();
        if !missing.is_empty() {
            return vec![Improvement {
                section,
                issue: "Skills list is thin for the target role".to_string(),
                fix_example: format!(
                    "Add role-relevant skills you can evidence, e.g. {}.",
                    missing.join(", ")
                ),
            }];
        }
    }
    vec![Improvement {
        section,
        issue: "Few recognizable skills detected".to_string(),
        fix_example: "Group skills as Languages / Frameworks / Tools with 4-6 concrete items each."
            .to_string(),
    }]
}

fn clarity_entries(features: &FeatureSet, section: String) -> Vec<Improvement> {
    let mut entries = Vec::new();
    if let Some(bullet) = features
        .bullets
        .iter()
        .find(|b| b.weakness_tags.contains(&WeaknessTag::TooVerbose))
    {
        entries.push(Improvement {
            section: section.clone(),
            issue: format!(
                "Bullet runs past {BULLET_VERBOSE_WORDS} words: \"{}\"",
                truncate(&bullet.text, QUOTE_LEN)
            ),
            fix_example: "Split into two bullets, each one verb, one outcome, one metric."
                .to_string(),
        });
    }
    if let Some(phrase) = &features.weak_phrase_example {
        entries.push(Improvement {
            section,
            issue: format!("Passive phrasing weakens ownership (\"{phrase}\")"),
            fix_example: format!(
                "Replace \"{phrase}\" with a direct action verb and the outcome it produced."
            ),
        });
    }
    entries
}

fn structure_entries(features: &FeatureSet, section: String) -> Vec<Improvement> {
    let mut missing = Vec::new();
    if !features.sections.experience {
        missing.push("Experience");
    }
    if !features.sections.education {
        missing.push("Education");
    }
    if !features.sections.skills {
        missing.push("Skills");
    }
    if !features.sections.contact {
        missing.push("Contact");
    }

    let mut entries = Vec::new();
    if !missing.is_empty() {
        entries.push(Improvement {
            section: section.clone(),
            issue: format!("Missing standard section headers: {}", missing.join(", ")),
            fix_example:
                "Add clear Experience, Education, and Skills headers so parsers can segment the resume."
                    .to_string(),
        });
    }
    if features.hygiene.had_tabs {
        entries.push(Improvement {
            section,
            issue: "Tabs or table layout detected".to_string(),
            fix_example: "Use simple headers and bullet lists; avoid tables and multi-column layouts.".to_string(),
        });
    }
    entries
}

fn projects_entries(features: &FeatureSet, section: String) -> Vec<Improvement> {
    if !features.sections.projects {
        return vec![Improvement {
            section,
            issue: "Missing or weak projects section".to_string(),
            fix_example:
                "Add 2 projects with problem, approach, and result, each with a repository or demo link."
                    .to_string(),
        }];
    }
    vec![Improvement {
        section,
        issue: "Projects do not show outcomes".to_string(),
        fix_example: "End each project bullet with the result it produced and link the repository."
            .to_string(),
    }]
}

fn hygiene_entries(features: &FeatureSet, section: String) -> Vec<Improvement> {
    let mut entries = Vec::new();
    if !features.hygiene.has_email || !features.hygiene.has_phone {
        entries.push(Improvement {
            section: section.clone(),
            issue: "Contact details incomplete".to_string(),
            fix_example: "Add a professional email and phone number at the top of the resume."
                .to_string(),
        });
    }
    if features.hygiene.repeated_word_typos > 0 {
        entries.push(Improvement {
            section,
            issue: "Repeated-word typos detected".to_string(),
            fix_example: "Proofread for doubled words (\"the the\") before submitting.".to_string(),
        });
    }
    entries
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{extract_features, Patterns};
    use crate::analysis::lexicon::Lexicon;
    use crate::analysis::normalize::normalize;
    use crate::analysis::rubric::score_rubric;

    fn improvements_for(text: &str) -> Vec<Improvement> {
        let lexicon = Lexicon::builtin().unwrap();
        let patterns = Patterns::new().unwrap();
        let features = extract_features(&lexicon, &patterns, normalize(text));
        let rubric = score_rubric(&features, None);
        generate(&features, &rubric, None)
    }

    #[test]
    fn test_never_exceeds_cap() {
        let improvements = improvements_for("");
        assert!(improvements.len() <= MAX_IMPROVEMENTS);
        assert!(!improvements.is_empty());
    }

    #[test]
    fn test_missing_headers_cited() {
        let improvements = improvements_for("plain text with no structure whatsoever here");
        assert!(
            improvements
                .iter()
                .any(|i| i.issue.contains("Missing standard section headers")),
            "got: {improvements:?}"
        );
    }

    #[test]
    fn test_weak_bullet_is_quoted() {
        let text = "Jane Doe\njane@example.com\n+1 415 555 0101\nExperience\n- Built a dashboard\n- Organized team processes\nEducation\nB.S.\nSkills\nPython\n";
        let improvements = improvements_for(text);
        assert!(improvements
            .iter()
            .any(|i| i.issue.contains("measurable result") && i.issue.contains("Built a dashboard")));
    }

    #[test]
    fn test_strong_resume_yields_few_suggestions() {
        let strong = "Jane Doe\njane@example.com | +1 415 555 0101\n\nExperience\n- Built PowerBI dashboards adopted by 12 teams, cutting reporting time 40%\n- Optimized SQL queries, reducing latency by 120ms\n- Automated ETL pipelines in Airflow, saving 6 hours weekly\n- Led migration to Snowflake, lowering costs 18%\n\nProjects\n- Shipped a Python pricing model, improving forecast accuracy 9% (github.com/janedoe/pricing)\n\nEducation\nB.S. Statistics\n\nSkills\nPython, SQL, PowerBI, Tableau, Excel, Statistics, A/B testing, ETL\n";
        let weak = "Experience\n- Worked on internal tooling for the data team\n";
        assert!(improvements_for(strong).len() < improvements_for(weak).len());
    }

    #[test]
    fn test_role_profile_names_missing_skills() {
        let lexicon = Lexicon::builtin().unwrap();
        let patterns = Patterns::new().unwrap();
        let features = extract_features(
            &lexicon,
            &patterns,
            normalize("Skills\nPython\n"),
        );
        let rubric = score_rubric(&features, lexicon.role_profile("data analyst"));
        let improvements = generate(&features, &rubric, lexicon.role_profile("data analyst"));
        assert!(improvements
            .iter()
            .any(|i| i.fix_example.contains("SQL") || i.fix_example.contains("PowerBI")));
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        let long = "a".repeat(80);
        let cut = truncate(&long, 60);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 63);
    }
}
