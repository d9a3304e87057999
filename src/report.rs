//! Human-readable renderings of triage and text results.

use crate::detect::Detection;
use crate::footage::FootageSummary;
use crate::severity::{display_label, SeverityAssessment};
use crate::text::{TextAnalysisResult, TextOutput};

/// Join report lines, each terminated by a newline.
fn finish(lines: Vec<String>) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_assessment(assessment: &SeverityAssessment, detections: &[Detection]) -> String {
    let tier = assessment.severity_tier;
    let mut lines = vec![
        "### Detection Results".to_string(),
        String::new(),
        format!("Total Detections: {}", assessment.detection_count),
        format!("Coverage: {:.1}%", assessment.coverage_percent),
        format!("Severity: {} ({})", tier, tier.status_color()),
        String::new(),
        assessment.recommendation_text.clone(),
    ];

    if !detections.is_empty() {
        lines.push(String::new());
        lines.push("**Items Detected:**".to_string());
        lines.extend(detections.iter().map(|det| {
            format!(
                "- {} (confidence: {:.0}%)",
                display_label(det.label()),
                det.confidence() * 100.0
            )
        }));
    }
    if !assessment.category_counts.is_empty() {
        lines.push(String::new());
        lines.push("**By Category:**".to_string());
        lines.extend(
            assessment
                .category_counts
                .iter()
                .map(|(label, count)| format!("- {}: {}", display_label(label), count)),
        );
    }
    finish(lines)
}

pub fn render_footage(summary: &FootageSummary) -> String {
    let mut lines = vec![
        "### Video Analysis Complete".to_string(),
        String::new(),
        format!("Frames Analyzed: {}", summary.frames_analyzed),
        format!("Total Detections: {}", summary.total_detections),
        format!("Avg per Frame: {:.2}", summary.average_per_frame),
        String::new(),
    ];

    if summary.unique_categories.is_empty() {
        lines.push("No waste detected in the analysed frames.".to_string());
        return finish(lines);
    }
    lines.push(format!(
        "Found {} different types of garbage: {}",
        summary.unique_categories.len(),
        summary.unique_categories.join(", ")
    ));
    if !summary.sample_frames.is_empty() {
        let frames: Vec<String> = summary.sample_frames.iter().map(|i| i.to_string()).collect();
        lines.push(format!("Sample frames: {}", frames.join(", ")));
    }
    if let (Some(frame), Some(worst)) = (summary.worst_frame, &summary.worst_assessment) {
        lines.push(format!(
            "Worst frame: #{} ({}, {:.1}% coverage). {}",
            frame, worst.severity_tier, worst.coverage_percent, worst.recommendation_text
        ));
    }
    finish(lines)
}

pub fn render_text_result(result: &TextAnalysisResult) -> String {
    let mut lines = vec![
        format!("Operation: {}", result.operation.tag().to_uppercase()),
        format!("Word Count: {}", result.word_count),
        String::new(),
        "Result:".to_string(),
    ];
    match &result.result {
        TextOutput::Text(text) => lines.push(text.clone()),
        TextOutput::List(items) => lines.extend(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item)),
        ),
    }
    finish(lines)
}
