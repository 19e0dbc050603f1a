//! Lexicon and ontology store: canonical skill names with their surface-form
//! synonyms, an action-verb gazetteer, weak-phrase markers, and per-role
//! expected-skill profiles.
//!
//! Loaded once at process start and never mutated afterwards. A load failure
//! is fatal at startup, never a per-request condition.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Default ontology shipped with the binary. `LEXICON_PATH` overrides it.
const DEFAULT_ONTOLOGY: &str = include_str!("../../assets/ontology.json");

/// Similarity floor for a fuzzy synonym hit (Jaro-Winkler). Tunable.
pub const FUZZY_SIMILARITY_THRESHOLD: f64 = 0.92;

/// Phrases shorter than this never go through fuzzy matching; short tokens
/// ("go", "js") produce spurious high similarities against unrelated words.
pub const FUZZY_MIN_LEN: usize = 5;

/// Ordered lookup strategies. Exact is always evaluated before fuzzy so a
/// clean synonym hit can never be shadowed by a fuzzy one.
pub const MATCH_STRATEGIES: &[MatchStrategy] = &[
    MatchStrategy::Exact,
    MatchStrategy::Fuzzy {
        threshold: FUZZY_SIMILARITY_THRESHOLD,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchStrategy {
    Exact,
    Fuzzy { threshold: f64 },
}

/// A qualifying lexicon hit for one surface phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillHit {
    pub canonical: String,
    pub confidence: f64,
}

/// On-disk ontology shape. BTreeMaps keep iteration order stable so that
/// repeated runs over identical input produce identical output.
#[derive(Debug, Deserialize)]
struct OntologyFile {
    skills: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    action_verbs: Vec<String>,
    #[serde(default)]
    weak_phrases: Vec<String>,
    #[serde(default)]
    roles: BTreeMap<String, Vec<String>>,
}

pub struct Lexicon {
    canonical: Vec<String>,
    /// (normalized surface form, index into `canonical`), sorted by surface.
    synonyms: Vec<(String, usize)>,
    exact_index: HashMap<String, usize>,
    action_verbs: HashSet<String>,
    weak_phrases: Vec<String>,
    roles: BTreeMap<String, Vec<String>>,
}

impl Lexicon {
    /// Parses and indexes an ontology JSON document.
    ///
    /// Canonical names are display labels only; a skill is detectable through
    /// the surface forms its synonym list declares. This keeps ambiguous
    /// labels ("Go", "R") from matching ordinary prose.
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: OntologyFile =
            serde_json::from_str(raw).context("ontology is not valid JSON")?;
        if file.skills.is_empty() {
            bail!("ontology contains no skills");
        }

        let mut canonical = Vec::with_capacity(file.skills.len());
        let mut synonyms = Vec::new();
        let mut exact_index = HashMap::new();

        for (name, surfaces) in &file.skills {
            let idx = canonical.len();
            canonical.push(name.clone());
            for surface in surfaces {
                let key = normalize_term(surface);
                if key.is_empty() {
                    bail!("skill '{name}' has an empty surface form");
                }
                exact_index.entry(key.clone()).or_insert(idx);
                synonyms.push((key, idx));
            }
        }
        synonyms.sort();
        synonyms.dedup();

        let action_verbs = file
            .action_verbs
            .iter()
            .map(|v| v.trim().to_lowercase())
            .collect();
        let weak_phrases = file
            .weak_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .collect();
        let roles = file
            .roles
            .into_iter()
            .map(|(role, skills)| (normalize_term(&role), skills))
            .collect();

        Ok(Self {
            canonical,
            synonyms,
            exact_index,
            action_verbs,
            weak_phrases,
            roles,
        })
    }

    /// Loads the ontology embedded in the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(DEFAULT_ONTOLOGY)
    }

    pub fn skill_count(&self) -> usize {
        self.canonical.len()
    }

    pub fn action_verb_count(&self) -> usize {
        self.action_verbs.len()
    }

    /// Looks up a normalized phrase against the skill table, evaluating
    /// `MATCH_STRATEGIES` in order and returning the first qualifying hit.
    pub fn lookup(&self, phrase: &str) -> Option<SkillHit> {
        for strategy in MATCH_STRATEGIES {
            match strategy {
                MatchStrategy::Exact => {
                    if let Some(&idx) = self.exact_index.get(phrase) {
                        return Some(SkillHit {
                            canonical: self.canonical[idx].clone(),
                            confidence: 1.0,
                        });
                    }
                }
                MatchStrategy::Fuzzy { threshold } => {
                    if let Some(hit) = self.fuzzy_lookup(phrase, *threshold) {
                        return Some(hit);
                    }
                }
            }
        }
        None
    }

    fn fuzzy_lookup(&self, phrase: &str, threshold: f64) -> Option<SkillHit> {
        if phrase.len() < FUZZY_MIN_LEN {
            return None;
        }
        let mut best: Option<(f64, usize)> = None;
        for (surface, idx) in &self.synonyms {
            if surface.len() < FUZZY_MIN_LEN {
                continue;
            }
            let similarity = strsim::jaro_winkler(phrase, surface);
            if similarity >= threshold && best.map_or(true, |(b, _)| similarity > b) {
                best = Some((similarity, *idx));
            }
        }
        best.map(|(similarity, idx)| SkillHit {
            canonical: self.canonical[idx].clone(),
            confidence: similarity,
        })
    }

    /// First-token action-verb check, lemma-insensitive best effort: the raw
    /// token, a plural strip, and an "-ing" strip are each tried against the
    /// gazetteer.
    pub fn is_action_verb(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        if self.action_verbs.contains(token.as_str()) {
            return true;
        }
        if let Some(stem) = token.strip_suffix('s') {
            if self.action_verbs.contains(stem) {
                return true;
            }
        }
        if let Some(stem) = token.strip_suffix("ing") {
            if self.action_verbs.contains(stem) {
                return true;
            }
            let restored = format!("{stem}e");
            if self.action_verbs.contains(restored.as_str()) {
                return true;
            }
        }
        false
    }

    /// Total occurrences of weak phrasing ("responsible for", ...) in the
    /// given lowercase text.
    pub fn weak_phrase_hits(&self, text_lower: &str) -> usize {
        self.weak_phrases
            .iter()
            .map(|p| text_lower.match_indices(p.as_str()).count())
            .sum()
    }

    /// First weak phrase present in the text, for citation in reasons.
    pub fn first_weak_phrase(&self, text_lower: &str) -> Option<&str> {
        self.weak_phrases
            .iter()
            .find(|p| text_lower.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Expected-skill profile for a target role. Falls back to a substring
    /// match so "senior data analyst" resolves to the "data analyst" profile.
    pub fn role_profile(&self, role: &str) -> Option<&[String]> {
        let key = normalize_term(role);
        if key.is_empty() {
            return None;
        }
        if let Some(profile) = self.roles.get(&key) {
            return Some(profile);
        }
        self.roles
            .iter()
            .find(|(name, _)| key.contains(name.as_str()) || name.contains(&key))
            .map(|(_, profile)| profile.as_slice())
    }
}

/// Canonical token normalization shared by lexicon build and document scan:
/// lowercase, keep `[a-z0-9+.#]`, everything else collapses to single spaces.
/// Sentence-final periods are trimmed per token; internal dots ("node.js")
/// survive.
pub fn normalize_term(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '#') {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out.split(' ')
        .map(|t| t.trim_matches('.'))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
