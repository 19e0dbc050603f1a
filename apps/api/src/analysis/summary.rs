//! Two-line professional summary: deterministic template composition from
//! the strongest detected skills, the most recent role signal, and the
//! target role when one was supplied. No generation call.

use crate::analysis::features::FeatureSet;
use crate::analysis::normalize::SectionKind;

const TOP_SKILLS: usize = 4;

/// A plausible role line is short and leads the Experience section.
const ROLE_LINE_MAX_WORDS: usize = 8;

pub fn two_line_summary(features: &FeatureSet, target_role: Option<&str>) -> String {
    let lead = target_role
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("technology");

    let mut top: Vec<&str> = {
        let mut ranked: Vec<_> = features.skills.iter().collect();
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.line.cmp(&b.line))
        });
        ranked
            .iter()
            .take(TOP_SKILLS)
            .map(|s| s.canonical.as_str())
            .collect()
    };
    if top.is_empty() {
        top.push("practical, well-scoped projects");
    }

    let first = format!(
        "{} candidate with hands-on experience in {}.",
        capitalize(lead),
        top.join(", ")
    );

    let second = match recent_role_line(features) {
        Some(role) => format!(
            "Most recently {role}, delivering measurable outcomes with clear, quantified results."
        ),
        None => "Delivers measurable outcomes through clear problem framing and clean execution."
            .to_string(),
    };

    format!("{first} {second}")
}

/// Best-effort most-recent-role signal: the first short, non-bullet line of
/// the Experience section.
fn recent_role_line(features: &FeatureSet) -> Option<String> {
    let experience = features.doc.section(SectionKind::Experience)?;
    experience
        .lines
        .iter()
        .find(|l| {
            let words = l.split_whitespace().count();
            (2..=ROLE_LINE_MAX_WORDS).contains(&words)
                && !l.starts_with(['-', '*', '\u{2022}'])
                && !l.contains('@')
        })
        .cloned()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{extract_features, Patterns};
    use crate::analysis::lexicon::Lexicon;
    use crate::analysis::normalize::normalize;

    fn features_for(text: &str) -> FeatureSet {
        let lexicon = Lexicon::builtin().unwrap();
        let patterns = Patterns::new().unwrap();
        extract_features(&lexicon, &patterns, normalize(text))
    }

    #[test]
    fn test_summary_names_target_role_and_skills() {
        let features = features_for("Skills\nPython, SQL, PowerBI\n");
        let summary = two_line_summary(&features, Some("data analyst"));
        assert!(summary.starts_with("Data analyst candidate"));
        assert!(summary.contains("Python"));
        assert!(summary.contains("SQL"));
    }

    #[test]
    fn test_summary_defaults_without_role() {
        let features = features_for("Skills\nPython\n");
        let summary = two_line_summary(&features, None);
        assert!(summary.starts_with("Technology candidate"));
    }

    #[test]
    fn test_summary_uses_recent_role_line() {
        let features = features_for("Experience\nData Analyst, Acme Corp\n- Built dashboards used by 12 teams\n");
        let summary = two_line_summary(&features, None);
        assert!(summary.contains("Most recently Data Analyst, Acme Corp"));
    }

    #[test]
    fn test_summary_is_two_sentences_even_when_empty() {
        let features = features_for("");
        let summary = two_line_summary(&features, None);
        assert_eq!(summary.matches(". ").count() + usize::from(summary.ends_with('.')), 2);
        assert!(summary.contains("practical, well-scoped projects"));
    }

    #[test]
    fn test_blank_target_role_falls_back() {
        let features = features_for("");
        let summary = two_line_summary(&features, Some("   "));
        assert!(summary.starts_with("Technology candidate"));
    }
}
