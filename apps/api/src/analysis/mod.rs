//! Resume analysis engine: a pure function of the request inputs and the
//! read-only lexicon. The orchestrator here is the only component aware of
//! the full pipeline order: normalize, extract features, then score,
//! suggest, summarize, and optionally compare against a job description.

pub mod features;
pub mod handlers;
pub mod improvements;
pub mod jd_compare;
pub mod lexicon;
pub mod normalize;
pub mod rubric;
pub mod summary;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::features::{extract_features, Patterns};
use crate::analysis::improvements::Improvement;
use crate::analysis::jd_compare::JdComparison;
use crate::analysis::lexicon::Lexicon;
use crate::analysis::normalize::normalize;
use crate::analysis::rubric::score_rubric;

/// Analyzed-bullet sample size returned in highlights.
const BULLET_SAMPLE: usize = 10;

/// Engine inputs. Empty or non-resume-like text is a legitimate low-score
/// outcome, not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    #[serde(default)]
    pub target_role: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Highlights {
    pub skills_detected: Vec<String>,
    pub bullets_analyzed: Vec<String>,
}

/// Top-level analysis response; field names are the compatibility contract.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub subscores: BTreeMap<&'static str, f64>,
    pub subscore_reasons: BTreeMap<&'static str, Vec<String>>,
    pub highlights: Highlights,
    pub improvements: Vec<Improvement>,
    pub two_line_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jd_comparison: Option<JdComparison>,
}

/// The engine: the lexicon plus the compiled pattern set, built once at
/// startup and shared read-only across concurrent requests.
pub struct Analyzer {
    lexicon: Lexicon,
    patterns: Patterns,
}

impl Analyzer {
    pub fn new(lexicon: Lexicon) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: Patterns::new()?,
            lexicon,
        })
    }

    /// Runs the full pipeline. Never fails; degraded input degrades the
    /// scores, not the result shape.
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        let doc = normalize(&request.resume_text);
        let features = extract_features(&self.lexicon, &self.patterns, doc);

        let target_role = request
            .target_role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        let role_profile = target_role.and_then(|r| self.lexicon.role_profile(r));

        let rubric = score_rubric(&features, role_profile);
        let improvements = improvements::generate(&features, &rubric, role_profile);
        let two_line_summary = summary::two_line_summary(&features, target_role);

        let jd_comparison = request
            .job_description
            .as_deref()
            .map(str::trim)
            .filter(|jd| !jd.is_empty())
            .map(|jd| jd_compare::compare(&self.lexicon, jd, &features.skills, role_profile));

        let mut ranked_skills: Vec<_> = features.skills.iter().collect();
        ranked_skills.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.line.cmp(&b.line))
                .then(a.canonical.cmp(&b.canonical))
        });

        AnalysisResult {
            overall_score: rubric.overall_score,
            subscores: rubric.subscores(),
            subscore_reasons: rubric.reasons(),
            highlights: Highlights {
                skills_detected: ranked_skills
                    .iter()
                    .map(|s| s.canonical.clone())
                    .collect(),
                bullets_analyzed: features
                    .bullets
                    .iter()
                    .take(BULLET_SAMPLE)
                    .map(|b| b.text.clone())
                    .collect(),
            },
            improvements,
            two_line_summary,
            jd_comparison,
        }
    }
}
