//! Projection of controller state into renderable blocks
//!
//! The renderer consumes plain data: which blocks exist, what text they
//! carry, which accent a bar or badge gets. Keeping the projection pure
//! makes the rendering contract testable without a terminal.

use crate::controller::Controller;
use emosense_common::api::{is_positive_emotion, resolve_audio_url, EmotionResult};

/// Accent applied to a bar or badge, keyed by the fixed positive label set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accent {
    Positive,
    Negative,
}

impl Accent {
    fn for_label(label: &str) -> Self {
        if is_positive_emotion(label) {
            Accent::Positive
        } else {
            Accent::Negative
        }
    }
}

/// The upload form, shown in every state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFormView {
    pub selected_file: Option<String>,
    pub error: Option<String>,
    pub submit_enabled: bool,
    pub analyzing: bool,
}

/// Original-audio block: the uploaded file with its play/pause control
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalBlock {
    pub file: String,
    pub duration: String,
    pub file_path: String,
    pub playing: bool,
}

/// Overall positive/negative split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewBlock {
    pub positive: String,
    pub negative: String,
}

/// One distribution bar; width is the percentage itself (0..=100 track)
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionBar {
    pub label: String,
    pub percentage: f64,
    pub display: String,
    pub accent: Accent,
}

/// One per-segment row with its own play/pause control
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRow {
    pub file: String,
    pub duration: String,
    pub emotion: String,
    pub accent: Accent,
    pub probability: String,
    pub file_path: String,
    pub playing: bool,
}

/// Result blocks, in rendering order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub original: OriginalBlock,
    pub overview: OverviewBlock,
    pub distribution: Vec<DistributionBar>,
    pub segments: Vec<SegmentRow>,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub form: UploadFormView,
    pub result: Option<ResultView>,
}

/// Project the controller state into a frame
pub fn project(controller: &Controller) -> View {
    View {
        form: UploadFormView {
            selected_file: controller.selected().map(|f| f.name.clone()),
            error: controller.error().map(|e| e.to_string()),
            submit_enabled: controller.can_submit(),
            analyzing: controller.is_loading(),
        },
        result: controller.result().map(|result| {
            project_result(result, controller.service_url(), controller.playing_url())
        }),
    }
}

/// Project one classification result.
///
/// The distribution block keeps only strictly positive percentages; the
/// payload is otherwise displayed as the service returned it.
pub fn project_result(
    result: &EmotionResult,
    service_url: &str,
    playing_url: Option<&str>,
) -> ResultView {
    let is_playing = |file_path: &str| {
        resolve_audio_url(service_url, file_path)
            .as_deref()
            .is_some_and(|url| playing_url == Some(url))
    };

    ResultView {
        original: OriginalBlock {
            file: result.original_file.clone(),
            duration: format_duration(result.original_duration),
            file_path: result.original_file_path.clone(),
            playing: is_playing(&result.original_file_path),
        },
        overview: OverviewBlock {
            positive: format_percentage(result.overview_percentage.positive_percentage),
            negative: format_percentage(result.overview_percentage.negative_percentage),
        },
        distribution: result
            .emotion_percentages
            .iter()
            .filter(|(_, percentage)| **percentage > 0.0)
            .map(|(label, percentage)| DistributionBar {
                label: label.clone(),
                percentage: *percentage,
                display: format_percentage(*percentage),
                accent: Accent::for_label(label),
            })
            .collect(),
        segments: result
            .predictions_details
            .iter()
            .map(|prediction| SegmentRow {
                file: prediction.file.clone(),
                duration: format_duration(prediction.duration),
                emotion: prediction.emotion.clone(),
                accent: Accent::for_label(&prediction.emotion),
                probability: format_percentage(prediction.probability),
                file_path: prediction.file_path.clone(),
                playing: is_playing(&prediction.file_path),
            })
            .collect(),
    }
}

fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value)
}

fn format_duration(seconds: f64) -> String {
    format!("{:.2}s", seconds)
}

/// Width of the distribution bar track, in characters
const BAR_TRACK: usize = 50;

/// Render one frame as terminal text
pub fn render(view: &View) -> String {
    let mut out = String::new();

    out.push_str("== Speech Emotion Recognition ==\n");
    match &view.form.selected_file {
        Some(name) => out.push_str(&format!("Selected: {}\n", name)),
        None => out.push_str("No file selected (use: open <path.wav>)\n"),
    }
    if let Some(error) = &view.form.error {
        out.push_str(&format!("! {}\n", error));
    }
    if view.form.analyzing {
        out.push_str("Analyzing...\n");
    } else if view.form.submit_enabled {
        out.push_str("Ready (use: analyze)\n");
    }

    let Some(result) = &view.result else {
        return out;
    };

    out.push_str("\n-- Original Audio --\n");
    out.push_str(&format!(
        "{} ({})  [{}]\n",
        result.original.file,
        result.original.duration,
        control_label(result.original.playing),
    ));

    out.push_str("\n-- Analysis Overview --\n");
    out.push_str(&format!("Positive: {}\n", result.overview.positive));
    out.push_str(&format!("Negative: {}\n", result.overview.negative));

    out.push_str("\n-- Emotion Distribution --\n");
    for bar in &result.distribution {
        let filled = ((bar.percentage / 100.0) * BAR_TRACK as f64).round() as usize;
        let filled = filled.min(BAR_TRACK);
        out.push_str(&format!(
            "{:<12} {}{} {}\n",
            bar.label,
            "█".repeat(filled),
            "░".repeat(BAR_TRACK - filled),
            bar.display,
        ));
    }

    out.push_str("\n-- Detailed Analysis --\n");
    for (index, segment) in result.segments.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}. {} ({})  {}  {}  [{}]\n",
            index + 1,
            segment.file,
            segment.duration,
            segment.emotion,
            segment.probability,
            control_label(segment.playing),
        ));
    }

    out
}

fn control_label(playing: bool) -> &'static str {
    if playing {
        "pause"
    } else {
        "play"
    }
}
