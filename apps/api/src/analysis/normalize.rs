//! Text normalization: whitespace cleanup, section-boundary detection, and
//! bullet-line segmentation over raw extracted resume text.
//!
//! This stage has no failure mode. Text with no detectable structure degrades
//! to a single unsectioned bucket and stays analyzable downstream.

use serde::Serialize;

/// A header candidate line longer than this is treated as content.
const MAX_HEADER_LEN: usize = 40;

/// Word-count window for treating a plain line inside Experience/Projects as
/// an accomplishment bullet.
const DECLARATIVE_MIN_WORDS: usize = 3;
const DECLARATIVE_MAX_WORDS: usize = 30;

const BULLET_GLYPHS: &[char] = &['\u{2022}', '-', '*', '\u{2013}', '\u{2014}', '\u{25aa}', '\u{25e6}', '\u{00b7}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Unsectioned,
}

/// Header synonym table. A short line containing one of these phrases
/// (case-insensitive) opens the corresponding section. Order matters only
/// when one line could name two kinds; first listed wins.
const SECTION_HEADERS: &[(SectionKind, &[&str])] = &[
    (
        SectionKind::Experience,
        &["experience", "work history", "employment"],
    ),
    (SectionKind::Education, &["education", "academic background"]),
    (SectionKind::Projects, &["projects", "portfolio"]),
    (
        SectionKind::Skills,
        &["skills", "technologies", "core competencies"],
    ),
    (
        SectionKind::Summary,
        &["summary", "profile", "objective", "about me"],
    ),
    (
        SectionKind::Certifications,
        &["certifications", "certificates", "licenses"],
    ),
    (SectionKind::Contact, &["contact"]),
];

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    /// Content lines, header excluded.
    pub lines: Vec<String>,
    pub start_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone)]
pub struct Bullet {
    /// Bullet text with any leading glyph stripped.
    pub text: String,
    /// Owning section; a lookup relation, not ownership of the lines.
    pub section: SectionKind,
    pub line: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    /// Non-overlapping, ordered by position in the source text.
    pub sections: Vec<Section>,
    pub bullets: Vec<Bullet>,
    /// All non-blank lines after whitespace collapse.
    pub lines: Vec<String>,
    /// Recorded before collapse; tab-heavy layouts hurt ATS parsing.
    pub had_tabs: bool,
}

impl NormalizedDocument {
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    pub fn has_section(&self, kind: SectionKind) -> bool {
        self.section(kind).is_some()
    }

    pub fn bullets_in(&self, kind: SectionKind) -> impl Iterator<Item = &Bullet> {
        self.bullets.iter().filter(move |b| b.section == kind)
    }
}

/// Normalizes raw extracted text into sections and bullet candidates.
pub fn normalize(raw: &str) -> NormalizedDocument {
    let had_tabs = raw.contains('\t');

    let lines: Vec<String> = raw
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect();

    let mut sections: Vec<Section> = Vec::new();
    let mut seen: Vec<SectionKind> = Vec::new();
    let mut current: Option<Section> = None;

    for (idx, line) in lines.iter().enumerate() {
        if let Some(kind) = header_kind(line) {
            // First occurrence wins; a repeated header of an already-open
            // kind stays as a sub-heading inside the current section.
            if !seen.contains(&kind) {
                seen.push(kind);
                if let Some(mut open) = current.take() {
                    open.end_line = idx;
                    sections.push(open);
                }
                current = Some(Section {
                    kind,
                    lines: Vec::new(),
                    start_line: idx,
                    end_line: idx,
                });
                continue;
            }
        }

        match current.as_mut() {
            Some(open) => open.lines.push(line.clone()),
            None => {
                current = Some(Section {
                    kind: SectionKind::Unsectioned,
                    lines: vec![line.clone()],
                    start_line: idx,
                    end_line: idx,
                });
            }
        }
    }
    if let Some(mut open) = current.take() {
        open.end_line = lines.len();
        sections.push(open);
    }

    let bullets = segment_bullets(&sections);

    NormalizedDocument {
        sections,
        bullets,
        lines,
        had_tabs,
    }
}

fn header_kind(line: &str) -> Option<SectionKind> {
    let trimmed = line.trim();
    if trimmed.len() > MAX_HEADER_LEN {
        return None;
    }
    let lower = trimmed.to_lowercase();
    for (kind, synonyms) in SECTION_HEADERS {
        if synonyms.iter().any(|s| lower.contains(s)) {
            return Some(*kind);
        }
    }
    None
}

fn segment_bullets(sections: &[Section]) -> Vec<Bullet> {
    let mut bullets = Vec::new();
    for section in sections {
        for (offset, line) in section.lines.iter().enumerate() {
            // Header offset is not part of `lines`; content starts one past
            // the header for titled sections.
            let line_idx = section.start_line
                + offset
                + usize::from(section.kind != SectionKind::Unsectioned);
            if let Some(text) = bullet_text(line, section.kind) {
                bullets.push(Bullet {
                    text,
                    section: section.kind,
                    line: line_idx,
                });
            }
        }
    }
    bullets
}

/// Returns the stripped bullet text when the line qualifies as a bullet.
fn bullet_text(line: &str, section: SectionKind) -> Option<String> {
    if is_dates_only(line) || looks_like_contact(line) {
        return None;
    }

    if let Some(stripped) = strip_bullet_glyph(line) {
        if !stripped.is_empty() {
            return Some(stripped.to_string());
        }
        return None;
    }

    // Short declarative lines count as bullets only inside the sections
    // where accomplishments live.
    if !matches!(section, SectionKind::Experience | SectionKind::Projects) {
        return None;
    }
    let words = line.split_whitespace().count();
    if !(DECLARATIVE_MIN_WORDS..=DECLARATIVE_MAX_WORDS).contains(&words) {
        return None;
    }
    let starts_capitalized = line.chars().next().is_some_and(|c| c.is_uppercase());
    if starts_capitalized && header_kind(line).is_none() {
        return Some(line.to_string());
    }
    None
}

fn strip_bullet_glyph(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if BULLET_GLYPHS.contains(&first) {
        return Some(line[first.len_utf8()..].trim_start_matches(BULLET_GLYPHS).trim());
    }
    None
}

/// A line made of nothing but years, months, and range punctuation.
fn is_dates_only(line: &str) -> bool {
    const MONTHS: &[&str] = &[
        "jan", "january", "feb", "february", "mar", "march", "apr", "april", "may", "jun", "june",
        "jul", "july", "aug", "august", "sep", "sept", "september", "oct", "october", "nov",
        "november", "dec", "december",
    ];
    const RANGE_WORDS: &[&str] = &["to", "present", "current", "now", "since"];

    let mut saw_token = false;
    for token in line
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '\u{2013}' | '\u{2014}' | '/' | ',' | '.' | '(' | ')'))
        .filter(|t| !t.is_empty())
    {
        saw_token = true;
        let lower = token.to_lowercase();
        let is_year_like = token.chars().all(|c| c.is_ascii_digit()) && token.len() <= 4;
        if !is_year_like && !MONTHS.contains(&lower.as_str()) && !RANGE_WORDS.contains(&lower.as_str())
        {
            return false;
        }
    }
    saw_token
}

/// Email or phone-shaped lines are contact info, not accomplishments.
fn looks_like_contact(line: &str) -> bool {
    if line.contains('@') {
        return true;
    }
    let digits = line.chars().filter(char::is_ascii_digit).count();
    digits >= 9 && line.split_whitespace().count() <= 6
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Jane Doe\njane@example.com | +1 (415) 555-0101\n\nExperience\nData Analyst, Acme Corp\nJan 2021 - Present\n- Built dashboards in PowerBI\n- Reduced report latency by 40%\n\nEducation\nB.S. Computer Science\n\nSkills\nPython, SQL, Tableau\n";

    #[test]
    fn test_sections_detected_in_order() {
        let doc = normalize(SAMPLE);
        let kinds: Vec<SectionKind> = doc.sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Unsectioned,
                SectionKind::Experience,
                SectionKind::Education,
                SectionKind::Skills,
            ]
        );
    }

    #[test]
    fn test_sections_non_overlapping_and_ordered() {
        let doc = normalize(SAMPLE);
        for pair in doc.sections.windows(2) {
            assert!(pair[0].end_line <= pair[1].start_line);
        }
    }

    #[test]
    fn test_glyph_bullets_are_stripped() {
        let doc = normalize(SAMPLE);
        let texts: Vec<&str> = doc.bullets.iter().map(|b| b.text.as_str()).collect();
        assert!(texts.contains(&"Built dashboards in PowerBI"));
        assert!(texts.contains(&"Reduced report latency by 40%"));
    }

    #[test]
    fn test_declarative_line_in_experience_is_a_bullet() {
        let doc = normalize("Experience\nShipped a billing service used by 40 teams\n");
        assert_eq!(doc.bullets.len(), 1);
        assert_eq!(doc.bullets[0].section, SectionKind::Experience);
    }

    #[test]
    fn test_declarative_line_outside_experience_is_not_a_bullet() {
        let doc = normalize("Education\nStudied data structures and algorithms deeply\n");
        assert!(doc.bullets.is_empty());
    }

    #[test]
    fn test_dates_and_contact_lines_excluded_from_bullets() {
        let doc = normalize(SAMPLE);
        assert!(doc
            .bullets
            .iter()
            .all(|b| !b.text.contains("2021") || b.text.contains('%')));
        assert!(doc.bullets.iter().all(|b| !b.text.contains('@')));
    }

    #[test]
    fn test_duplicate_header_stays_in_open_section() {
        let doc = normalize("Experience\nAcme Corp\nExperience\nBeta LLC\n");
        assert_eq!(doc.sections.len(), 1);
        let exp = doc.section(SectionKind::Experience).unwrap();
        // The second "Experience" line is content, a sub-heading.
        assert_eq!(exp.lines.len(), 3);
    }

    #[test]
    fn test_no_headers_degrades_to_unsectioned() {
        let doc = normalize("just some text\nwith no structure at all\n");
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].kind, SectionKind::Unsectioned);
    }

    #[test]
    fn test_empty_input_yields_empty_document() {
        let doc = normalize("");
        assert!(doc.sections.is_empty());
        assert!(doc.bullets.is_empty());
        assert!(!doc.had_tabs);
    }

    #[test]
    fn test_tabs_recorded_before_collapse() {
        let doc = normalize("Skills\nPython\tSQL\n");
        assert!(doc.had_tabs);
        assert_eq!(doc.section(SectionKind::Skills).unwrap().lines[0], "Python SQL");
    }

    #[test]
    fn test_header_synonyms_map_to_canonical_kind() {
        let doc = normalize("Work History\nAcme Corp\n");
        assert!(doc.has_section(SectionKind::Experience));
        let doc = normalize("Technical Skills\nPython\n");
        assert!(doc.has_section(SectionKind::Skills));
    }

    #[test]
    fn test_long_line_containing_keyword_is_not_a_header() {
        let text = "My experience across several large organizations taught me resilience and patience\n";
        let doc = normalize(text);
        assert_eq!(doc.sections[0].kind, SectionKind::Unsectioned);
    }
}
