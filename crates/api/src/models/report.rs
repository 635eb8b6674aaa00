//! Content reports and their keyword triage.
//!
//! Reports are triaged by matching keywords in the submitted reasons. This is
//! best-effort: the derived type and priority seed the review queue and can be
//! overridden by an admin later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chirp_core::{LessonId, ReportId, UserId};

/// Category a report is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    AudioIssue,
    TranslationError,
    GrammarError,
    ContentError,
    InappropriateContent,
    TechnicalIssue,
    Other,
}

/// Review urgency derived from the report type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportPriority {
    Low,
    Medium,
    High,
}

/// Where a report sits in the review pipeline.
///
/// Transitions are driven by admins; no state machine is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// A submitted content report.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Report {
    pub id: ReportId,
    pub user_id: UserId,
    pub lesson_id: Option<LessonId>,
    /// Client-side exercise identifier; dedup key together with the user.
    pub exercise_id: Option<String>,
    pub reasons: Vec<String>,
    pub report_type: ReportType,
    pub priority: ReportPriority,
    pub status: ReportStatus,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derive the report type from the submitted reasons.
///
/// Reasons are joined and lowercased before matching; the first matching
/// keyword family wins, with safety and breakage checked before content
/// quality.
#[must_use]
pub fn determine_report_type(reasons: &[String]) -> ReportType {
    let haystack = joined(reasons);

    if contains_any(&haystack, &["inappropriate", "offensive", "abusive"]) {
        ReportType::InappropriateContent
    } else if contains_any(&haystack, &["crash", "bug", "broken", "freeze", "stuck"]) {
        ReportType::TechnicalIssue
    } else if contains_any(&haystack, &["audio", "sound", "pronunciation", "recording"]) {
        ReportType::AudioIssue
    } else if contains_any(&haystack, &["translation", "meaning", "should be accepted"]) {
        ReportType::TranslationError
    } else if contains_any(&haystack, &["grammar", "conjugation", "tense"]) {
        ReportType::GrammarError
    } else if contains_any(&haystack, &["typo", "spelling", "misspell"]) {
        ReportType::ContentError
    } else {
        ReportType::Other
    }
}

/// Derive the review priority from the report type.
#[must_use]
pub const fn determine_report_priority(report_type: ReportType) -> ReportPriority {
    match report_type {
        ReportType::InappropriateContent | ReportType::TechnicalIssue => ReportPriority::High,
        ReportType::AudioIssue
        | ReportType::TranslationError
        | ReportType::GrammarError
        | ReportType::ContentError => ReportPriority::Medium,
        ReportType::Other => ReportPriority::Low,
    }
}

fn joined(reasons: &[String]) -> String {
    reasons.join(" ").to_lowercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons(rs: &[&str]) -> Vec<String> {
        rs.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_audio_report_is_medium_priority() {
        // "Audio quality poor" with no lesson attached
        let rs = reasons(&["Audio quality poor"]);
        let ty = determine_report_type(&rs);
        assert_eq!(ty, ReportType::AudioIssue);
        assert_eq!(determine_report_priority(ty), ReportPriority::Medium);
    }

    #[test]
    fn test_translation_keywords() {
        let rs = reasons(&["My answer should be accepted"]);
        assert_eq!(determine_report_type(&rs), ReportType::TranslationError);
    }

    #[test]
    fn test_safety_outranks_content_quality() {
        // A reason matching both families resolves to the safety category
        let rs = reasons(&["Offensive audio clip"]);
        let ty = determine_report_type(&rs);
        assert_eq!(ty, ReportType::InappropriateContent);
        assert_eq!(determine_report_priority(ty), ReportPriority::High);
    }

    #[test]
    fn test_technical_is_high_priority() {
        let rs = reasons(&["App crashes on submit"]);
        let ty = determine_report_type(&rs);
        assert_eq!(ty, ReportType::TechnicalIssue);
        assert_eq!(determine_report_priority(ty), ReportPriority::High);
    }

    #[test]
    fn test_unmatched_reasons_are_other_low() {
        let rs = reasons(&["Just don't like this one"]);
        let ty = determine_report_type(&rs);
        assert_eq!(ty, ReportType::Other);
        assert_eq!(determine_report_priority(ty), ReportPriority::Low);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let rs = reasons(&["GRAMMAR is wrong here"]);
        assert_eq!(determine_report_type(&rs), ReportType::GrammarError);
    }

    #[test]
    fn test_empty_reasons() {
        assert_eq!(determine_report_type(&[]), ReportType::Other);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(ReportPriority::High > ReportPriority::Medium);
        assert!(ReportPriority::Medium > ReportPriority::Low);
    }
}
