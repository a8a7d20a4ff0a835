//! Regex heuristics over completion text.
//!
//! Every extractor degrades to a documented default when the text does not
//! contain what it looks for. Markers are matched case-insensitively and may
//! be followed by markdown emphasis (`**Direct Costs**:`).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::RiskItem;
use crate::validation::MAX_RECOMMENDATIONS_LEN;

/// Numbers written as `1,250,000.50` or `1250000` (an optional leading `R`).
const AMOUNT: &str = r"R?\s*(\d+(?:,\d{3})*(?:\.\d+)?)";

/// What separates a marker from its value: colons, whitespace, markdown.
const SEP: &str = r"[*#:\s]+";

/// Like [`SEP`] but never crosses a line break.
const INLINE_SEP: &str = r"[*#: \t]+";

pub const DEFAULT_RISK_SCORE: f64 = 50.0;
pub const DEFAULT_RECOMMENDATIONS: &str = "See full analysis for details.";

const MAX_KEY_FINDINGS: usize = 5;
const MAX_MAINTENANCE_RISKS: usize = 10;
const MILLION_WINDOW_CHARS: usize = 50;

static TOTAL_COST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(AMOUNT).expect("valid regex"));

static RISK_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)risk\s+score[*:\s]+(\d+(?:\.\d+)?)").expect("valid regex"));

static CONFIDENCE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confidence(?:\s+level)?[^\n]{0,40}?\b(high|medium|low)\b")
        .expect("valid regex")
});

static RECOMMENDATIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)recommendations?:?\s*(.*?)(?:\n\s*\n|\z)").expect("valid regex")
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[•\-\*]\s*(.+?)\s*$").expect("valid regex"));

static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][^.!?]+[.!?]").expect("valid regex"));

/// A blank line followed by a word of three letters or more ends a section.
static SECTION_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n[A-Za-z*#]{3,}").expect("valid regex"));

static RISK_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:TOP|CRITICAL)\s+(?:\d+\s+)?RISKS?[*:\s]+").expect("valid regex")
});

static RISK_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[a-z]\)|[•\-\*]|\d+\.)\s*(.+?)(?:Risk Score|Score|Impact)[*:\s]+(\d+(?:\.\d+)?)")
        .expect("valid regex")
});

static PRIORITY_SECTION_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PRIORITY|REGIONAL").expect("valid regex"));

const DURATION_PATTERNS: &[(&str, i32)] = &[
    (r"(?i)(\d+)\s+months?", 30),
    (r"(?i)(\d+)\s+weeks?", 7),
    (r"(?i)(\d+)\s+days?", 1),
    (r"(?i)duration[*:\s]+(\d+)", 1),
];

const KEY_FINDING_SECTIONS: &[&str] = &["EXECUTIVE SUMMARY", "KEY FINDINGS", "SUMMARY", "HIGHLIGHTS"];

const BREAKDOWN_CATEGORIES: &[(&str, &[&str])] = &[
    ("Materials & Supplies", &["materials", "supplies"]),
    ("Labour", &["labour", "labor", "workforce"]),
    ("Equipment", &["equipment", "machinery", "plant"]),
    ("Subcontractors", &["subcontractor", "sub-contractor"]),
    ("Professional Fees", &["professional fees", "consulting"]),
    ("Permits & Compliance", &["permits", "regulatory", "compliance"]),
    ("Contingency", &["contingency", "reserve"]),
    ("Site Establishment", &["site establishment", "preliminaries"]),
];

/// `(section marker, severity, score)` in search order. Only numbered
/// priorities carry the higher scores; `IMMEDIATE` is Critical but scores 40.
const MAINTENANCE_PRIORITIES: &[(&str, &str, f64)] = &[
    ("PRIORITY 1", "Critical", 80.0),
    ("PRIORITY 2", "High", 60.0),
    ("PRIORITY 3", "Medium", 40.0),
    ("IMMEDIATE", "Critical", 40.0),
    ("CRITICAL", "Medium", 40.0),
];

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

/// The first number anywhere in the text, or zero.
pub fn total_cost(text: &str) -> f64 {
    TOTAL_COST_RE
        .captures(text)
        .and_then(|c| parse_amount(&c[1]))
        .unwrap_or(0.0)
}

/// `risk score: N`, defaulting to a medium score of 50.
pub fn risk_score(text: &str) -> f64 {
    RISK_SCORE_RE
        .captures(text)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_RISK_SCORE)
}

/// An explicit `Confidence: X` line wins; otherwise the first of High/Low
/// mentioned anywhere, else Medium.
pub fn confidence_level(text: &str) -> String {
    if let Some(c) = CONFIDENCE_LINE_RE.captures(text) {
        return capitalize(&c[1]);
    }
    let lower = text.to_lowercase();
    if lower.contains("high") {
        "High".to_string()
    } else if lower.contains("low") {
        "Low".to_string()
    } else {
        "Medium".to_string()
    }
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The paragraph following the first `Recommendation(s)` header.
pub fn recommendations(text: &str) -> String {
    let found = RECOMMENDATIONS_RE
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty());
    match found {
        Some(s) => s.chars().take(MAX_RECOMMENDATIONS_LEN).collect(),
        None => DEFAULT_RECOMMENDATIONS.to_string(),
    }
}

/// Whether `million` follows the figure at byte offset `start` on the same
/// line, within a short window.
fn mentions_million(text: &str, start: usize) -> bool {
    text[start..]
        .chars()
        .take_while(|&c| c != '\n')
        .take(MILLION_WINDOW_CHARS)
        .collect::<String>()
        .to_lowercase()
        .contains("million")
}

/// Amount following `marker`, scaled when written in millions.
fn amount_after(text: &str, marker_pattern: &str, multi_line: bool) -> Option<f64> {
    let (flags, sep) = if multi_line {
        ("(?is)", SEP)
    } else {
        ("(?i)", INLINE_SEP)
    };
    let re = Regex::new(&format!("{flags}(?:{marker_pattern}){sep}.*?{AMOUNT}")).ok()?;
    let caps = re.captures(text)?;
    let number = caps.get(1)?;
    let value = parse_amount(number.as_str())?;
    if mentions_million(text, number.start()) {
        Some(value * 1_000_000.0)
    } else {
        Some(value)
    }
}

/// Cost figure labelled by `marker` (e.g. `Direct Costs`), or zero.
pub fn cost_component(text: &str, marker: &str) -> f64 {
    amount_after(text, &regex::escape(marker), true).unwrap_or(0.0)
}

/// Duration in days: months count as 30, weeks as 7.
///
/// Patterns are tried in order (months, weeks, days, `duration: N`), so a
/// month figure anywhere beats a day figure earlier in the text.
pub fn project_duration_days(text: &str) -> i32 {
    for (pattern, multiplier) in DURATION_PATTERNS {
        let Ok(re) = Regex::new(pattern) else { continue };
        if let Some(n) = re.captures(text).and_then(|c| c[1].parse::<i32>().ok()) {
            return n.saturating_mul(*multiplier);
        }
    }
    0
}

/// Score for a named risk category, normalised to 0-100, default 50.
///
/// `labels` are alternatives (`Financial Risk`, `Budget Risk`). The value
/// must be on the same line and carry `%`, `/100` or `score`.
pub fn category_risk(text: &str, labels: &[&str]) -> f64 {
    let alternatives = labels
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r"(?i)(?:{alternatives}){INLINE_SEP}.*?(\d+(?:\.\d+)?)\s*(?:%|/100|score)");
    let score = Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|c| c[1].parse::<f64>().ok());
    match score {
        Some(s) if s > 100.0 => s / 10.0,
        Some(s) => s,
        None => DEFAULT_RISK_SCORE,
    }
}

// ---------------------------------------------------------------------------
// Lists and maps
// ---------------------------------------------------------------------------

/// Text following `marker_re`'s first match up to the next section break.
fn section_after<'a>(text: &'a str, marker_re: &Regex) -> Option<&'a str> {
    let m = marker_re.find(text)?;
    let rest = &text[m.end()..];
    let end = SECTION_END_RE.find(rest).map_or(rest.len(), |e| e.start());
    Some(&rest[..end])
}

fn bullets(section: &str) -> impl Iterator<Item = String> + '_ {
    BULLET_RE
        .captures_iter(section)
        .map(|c| c[1].trim().to_string())
}

/// Up to five findings from a summary section's bullets, falling back to the
/// first five sentences of the text.
pub fn key_findings(text: &str) -> Vec<String> {
    for section in KEY_FINDING_SECTIONS {
        let Ok(marker) = Regex::new(&format!("(?i){}{SEP}", regex::escape(section))) else {
            continue;
        };
        let Some(content) = section_after(text, &marker) else {
            continue;
        };
        let found: Vec<String> = bullets(content)
            .filter(|b| {
                let len = b.chars().count();
                len > 10 && len < 200
            })
            .take(MAX_KEY_FINDINGS)
            .collect();
        if !found.is_empty() {
            return found;
        }
    }

    SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .take(MAX_KEY_FINDINGS)
        .collect()
}

/// Amount per spending category, keyed by display name. Only categories
/// mentioned alongside a figure on the same line appear.
pub fn cost_breakdown(text: &str) -> BTreeMap<String, f64> {
    let mut breakdown = BTreeMap::new();
    for (category, keywords) in BREAKDOWN_CATEGORIES {
        let hit = keywords
            .iter()
            .find_map(|kw| amount_after(text, &regex::escape(kw), false));
        if let Some(amount) = hit {
            breakdown.insert((*category).to_string(), amount);
        }
    }
    breakdown
}

pub fn severity_for_score(score: f64) -> &'static str {
    if score >= 70.0 {
        "Critical"
    } else if score >= 50.0 {
        "High"
    } else if score >= 30.0 {
        "Medium"
    } else {
        "Low"
    }
}

/// Classify a risk description by keyword.
pub fn risk_category(description: &str) -> &'static str {
    let d = description.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| d.contains(w));
    if has(&["cost", "budget", "financial"]) {
        "Financial"
    } else if has(&["schedule", "delay", "timeline"]) {
        "Schedule"
    } else if has(&["quality", "defect", "standard"]) {
        "Quality"
    } else if has(&["safety", "injury", "accident"]) {
        "Safety"
    } else if has(&["regulatory", "compliance", "legal"]) {
        "Compliance"
    } else {
        "General"
    }
}

fn clean_description(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | ':' | ',' | '(' | '|' | '*'))
        .trim_start_matches('*')
        .trim()
        .to_string()
}

/// Scored risks listed under a `TOP N RISKS` / `CRITICAL RISKS` heading.
pub fn risk_factors(text: &str) -> Vec<RiskItem> {
    let Some(m) = RISK_SECTION_RE.find(text) else {
        return Vec::new();
    };
    RISK_ITEM_RE
        .captures_iter(&text[m.end()..])
        .filter_map(|c| {
            let description = clean_description(&c[1]);
            let score: f64 = c[2].parse().ok()?;
            if description.is_empty() {
                return None;
            }
            Some(RiskItem {
                category: risk_category(&description).to_string(),
                severity: severity_for_score(score).to_string(),
                description,
                score,
                mitigation: None,
            })
        })
        .collect()
}

/// Bulleted actions under the priority headings of a maintenance report.
///
/// Each heading contributes the bullets up to the next `PRIORITY` or
/// `REGIONAL` mention. Duplicates are dropped; at most ten are kept.
pub fn maintenance_risk_factors(text: &str) -> Vec<RiskItem> {
    let mut risks: Vec<RiskItem> = Vec::new();
    for (marker, severity, score) in MAINTENANCE_PRIORITIES {
        let Ok(re) = Regex::new(&format!("(?i){}{SEP}", regex::escape(marker))) else {
            continue;
        };
        let Some(m) = re.find(text) else { continue };
        let rest = &text[m.end()..];
        let end = PRIORITY_SECTION_END_RE
            .find(rest)
            .map_or(rest.len(), |e| e.start());
        for description in bullets(&rest[..end]) {
            if description.chars().count() <= 10
                || risks.iter().any(|r| r.description == description)
            {
                continue;
            }
            risks.push(RiskItem {
                category: "Maintenance".to_string(),
                description,
                score: *score,
                severity: (*severity).to_string(),
                mitigation: None,
            });
        }
    }
    risks.truncate(MAX_MAINTENANCE_RISKS);
    risks
}
