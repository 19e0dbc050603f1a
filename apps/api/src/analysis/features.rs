//! Feature extraction: turns a normalized document plus the lexicon into the
//! structured feature set that every scoring and generation component
//! consumes. Extraction never fails; malformed input yields empty structures.

use std::collections::BTreeSet;
use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;

use crate::analysis::lexicon::{normalize_term, Lexicon};
use crate::analysis::normalize::{NormalizedDocument, SectionKind};

/// A bullet longer than this earns the too-verbose weakness tag.
pub const BULLET_VERBOSE_WORDS: usize = 28;

/// Line-count thresholds for the length hygiene flags (single/two-page
/// heuristic over extracted text).
pub const SHORT_DOC_LINES: usize = 15;
pub const LONG_DOC_LINES: usize = 130;

/// Longest skill surface form, in tokens, scanned for in the document.
const MAX_NGRAM: usize = 3;

/// Compiled pattern set, built once at startup and shared read-only across
/// requests alongside the lexicon.
pub struct Patterns {
    metric: Regex,
    email: Regex,
    link: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            // Percentages, currency, counts with units, bare multipliers,
            // and comparative phrasing followed by a number.
            metric: Regex::new(
                r"(?ix)
                \d+(\.\d+)?\s*% |
                [$€£]\s*\d |
                \b\d+(\.\d+)?\s*(ms|sec|secs|seconds|min|mins|minutes|hr|hrs|hours|days?|weeks?|months?|k|m|million|billion|x)\b |
                \b\d+x\b |
                \b(reduc|increas|improv|decreas|accelerat|boost|grew|grow|cut|sav|doubl|tripl)\w*\b[^.\n]{0,40}?\d",
            )?,
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")?,
            link: Regex::new(r"(?i)https?://|www\.|github\.com/|linkedin\.com/")?,
        })
    }

    pub fn has_metric(&self, text: &str) -> bool {
        self.metric.is_match(text)
    }

    pub fn has_email(&self, text: &str) -> bool {
        self.email.is_match(text)
    }

    pub fn has_link(&self, text: &str) -> bool {
        self.link.is_match(text)
    }
}

/// One canonical skill found in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillMatch {
    pub canonical: String,
    /// Surface form as it appeared (normalized).
    pub surface: String,
    pub confidence: f64,
    /// Line of first appearance.
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessTag {
    MissingActionVerb,
    MissingMetric,
    TooVerbose,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletAnalysis {
    pub text: String,
    pub section: SectionKind,
    pub has_action_verb: bool,
    pub has_metric: bool,
    pub has_tech_context: bool,
    pub weakness_tags: BTreeSet<WeaknessTag>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SectionPresence {
    pub contact: bool,
    pub education: bool,
    pub experience: bool,
    pub skills: bool,
    pub projects: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Readability {
    pub word_count: usize,
    pub avg_words_per_bullet: f64,
    /// Flesch-Kincaid grade approximation; 0.0 for near-empty text.
    pub grade_level: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Hygiene {
    pub line_count: usize,
    pub has_email: bool,
    pub has_phone: bool,
    pub too_short: bool,
    pub too_long: bool,
    pub repeated_word_typos: usize,
    pub had_tabs: bool,
}

/// The sole input to scoring and generation. Fully determined by the raw
/// text and the lexicon; nothing here mutates after extraction.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub doc: NormalizedDocument,
    pub skills: Vec<SkillMatch>,
    pub bullets: Vec<BulletAnalysis>,
    pub sections: SectionPresence,
    pub readability: Readability,
    pub hygiene: Hygiene,
    /// Occurrences of weak phrasing across the document.
    pub weak_phrase_hits: usize,
    /// First weak phrase found, for citation in reasons.
    pub weak_phrase_example: Option<String>,
    /// A URL inside the Projects section earns an evidence bonus.
    pub projects_have_link: bool,
}

pub fn extract_features(
    lexicon: &Lexicon,
    patterns: &Patterns,
    doc: NormalizedDocument,
) -> FeatureSet {
    let skills = detect_skills(lexicon, &doc.lines);

    let bullets: Vec<BulletAnalysis> = doc
        .bullets
        .iter()
        .filter(|b| {
            matches!(
                b.section,
                SectionKind::Experience | SectionKind::Projects | SectionKind::Unsectioned
            )
        })
        .map(|b| analyze_bullet(lexicon, patterns, &b.text, b.section))
        .collect();

    let full_text = doc.lines.join("\n");
    let has_email = patterns.has_email(&full_text);
    let has_phone = doc.lines.iter().any(|l| {
        l.chars().filter(char::is_ascii_digit).count() >= 9 && l.split_whitespace().count() <= 6
    });

    let sections = SectionPresence {
        contact: doc.has_section(SectionKind::Contact) || has_email || has_phone,
        education: doc.has_section(SectionKind::Education),
        experience: doc.has_section(SectionKind::Experience),
        skills: doc.has_section(SectionKind::Skills),
        projects: doc.has_section(SectionKind::Projects),
    };

    let readability = compute_readability(&doc, &bullets);

    let line_count = doc.lines.len();
    let hygiene = Hygiene {
        line_count,
        has_email,
        has_phone,
        too_short: line_count < SHORT_DOC_LINES,
        too_long: line_count > LONG_DOC_LINES,
        repeated_word_typos: count_repeated_words(&doc.lines),
        had_tabs: doc.had_tabs,
    };

    let text_lower = full_text.to_lowercase();
    let weak_phrase_hits = lexicon.weak_phrase_hits(&text_lower);
    let weak_phrase_example = lexicon.first_weak_phrase(&text_lower).map(str::to_string);

    let projects_have_link = doc
        .section(SectionKind::Projects)
        .is_some_and(|s| s.lines.iter().any(|l| patterns.has_link(l)));

    FeatureSet {
        doc,
        skills,
        bullets,
        sections,
        readability,
        hygiene,
        weak_phrase_hits,
        weak_phrase_example,
        projects_have_link,
    }
}

/// Scans every 1..=3-gram of every line against the lexicon, exact match
/// first, fuzzy as fallback. Deduplicates by canonical name, keeping the
/// highest confidence and the earliest position.
pub fn detect_skills(lexicon: &Lexicon, lines: &[String]) -> Vec<SkillMatch> {
    let mut by_canonical: HashMap<String, usize> = HashMap::new();
    let mut found: Vec<SkillMatch> = Vec::new();

    for (line_idx, line) in lines.iter().enumerate() {
        let normalized = normalize_term(line);
        let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
        for start in 0..tokens.len() {
            for n in 1..=MAX_NGRAM.min(tokens.len() - start) {
                let phrase = tokens[start..start + n].join(" ");
                let Some(hit) = lexicon.lookup(&phrase) else {
                    continue;
                };
                match by_canonical.get(&hit.canonical) {
                    Some(&i) => {
                        if hit.confidence > found[i].confidence {
                            found[i].confidence = hit.confidence;
                            found[i].surface = phrase;
                        }
                    }
                    None => {
                        by_canonical.insert(hit.canonical.clone(), found.len());
                        found.push(SkillMatch {
                            canonical: hit.canonical,
                            surface: phrase,
                            confidence: hit.confidence,
                            line: line_idx,
                        });
                    }
                }
            }
        }
    }
    found
}

/// True when the text contains at least one detectable skill.
pub fn mentions_skill(lexicon: &Lexicon, text: &str) -> bool {
    !detect_skills(lexicon, &[text.to_string()]).is_empty()
}

pub fn analyze_bullet(
    lexicon: &Lexicon,
    patterns: &Patterns,
    text: &str,
    section: SectionKind,
) -> BulletAnalysis {
    let first_token = text
        .split_whitespace()
        .next()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .unwrap_or("");
    let has_action_verb = !first_token.is_empty() && lexicon.is_action_verb(first_token);
    let has_metric = patterns.has_metric(text);
    let has_tech_context = mentions_skill(lexicon, text);
    let word_count = text.split_whitespace().count();

    let mut weakness_tags = BTreeSet::new();
    if !has_action_verb {
        weakness_tags.insert(WeaknessTag::MissingActionVerb);
    }
    if !has_metric {
        weakness_tags.insert(WeaknessTag::MissingMetric);
    }
    if word_count > BULLET_VERBOSE_WORDS {
        weakness_tags.insert(WeaknessTag::TooVerbose);
    }

    BulletAnalysis {
        text: text.to_string(),
        section,
        has_action_verb,
        has_metric,
        has_tech_context,
        weakness_tags,
    }
}

fn compute_readability(doc: &NormalizedDocument, bullets: &[BulletAnalysis]) -> Readability {
    let words: Vec<&str> = doc
        .lines
        .iter()
        .flat_map(|l| l.split_whitespace())
        .collect();
    let word_count = words.len();
    if word_count == 0 {
        return Readability::default();
    }

    // Each line is at least one sentence; terminal punctuation splits more.
    let sentences: usize = doc
        .lines
        .iter()
        .map(|l| l.matches(['.', '!', '?']).count().max(1))
        .sum();
    let syllables: usize = words.iter().map(|w| estimate_syllables(w)).sum();

    let wps = word_count as f64 / sentences.max(1) as f64;
    let spw = syllables as f64 / word_count as f64;
    let grade = (0.39 * wps + 11.8 * spw - 15.59).max(0.0);

    let avg_words_per_bullet = if bullets.is_empty() {
        0.0
    } else {
        bullets
            .iter()
            .map(|b| b.text.split_whitespace().count())
            .sum::<usize>() as f64
            / bullets.len() as f64
    };

    Readability {
        word_count,
        avg_words_per_bullet,
        grade_level: grade,
    }
}

/// Vowel-group syllable heuristic; good enough for a grade-band signal.
fn estimate_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// Counts adjacent duplicated words ("the the"), a cheap typo signal. The
/// regex crate has no backreferences, so this is a token scan.
fn count_repeated_words(lines: &[String]) -> usize {
    let mut count = 0;
    for line in lines {
        let tokens: Vec<String> = line
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .collect();
        for pair in tokens.windows(2) {
            if pair[0].len() >= 2 && pair[0] == pair[1] && pair[0].chars().all(char::is_alphabetic)
            {
                count += 1;
            }
        }
    }
    count
}
