use super::{percentage, round2};
use crate::letters::{LetterInfo, LetterTable};
use crate::store::{PronunciationFeedback, PronunciationProgress, SUCCESS_THRESHOLD};
use serde::Serialize;
use std::collections::BTreeMap;

/// Number of most recent feedback rows considered for trends.
pub const TREND_WINDOW: usize = 20;
/// Minimum change in average accuracy that counts as a trend.
pub const TREND_THRESHOLD: f64 = 5.0;

const WEAK_AREA_THRESHOLD: f64 = 70.0;
const MAX_AREAS: usize = 5;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LetterTrend {
    pub trend: TrendDirection,
    /// Recent half average minus older half average.
    pub change: f64,
    pub recent_average: f64,
    pub attempts_count: usize,
}

#[derive(Serialize, Debug, Clone)]
pub struct LetterProgressEntry {
    #[serde(flatten)]
    pub progress: PronunciationProgress,
    pub letter_info: Option<LetterInfo>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OverallStatistics {
    pub total_letters_practiced: usize,
    pub mastered_letters: usize,
    pub average_accuracy: f64,
    /// Mastered letters over the whole letter table.
    pub mastery_percentage: u32,
}

/// A letter listed under weak or strong areas.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AreaEntry {
    pub letter_id: u32,
    pub letter: String,
    pub latin: String,
    pub accuracy: f64,
    pub attempts: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct ProgressReport {
    pub letter_progress: BTreeMap<u32, LetterProgressEntry>,
    pub trends: BTreeMap<u32, LetterTrend>,
    pub overall_statistics: OverallStatistics,
    pub weak_areas: Vec<AreaEntry>,
    pub strong_areas: Vec<AreaEntry>,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Builds the progress dashboard for one user.
///
/// `recent` must be ordered newest first; only the first [`TREND_WINDOW`]
/// rows are used.
pub fn progress_report(
    letters: &LetterTable,
    progress: Vec<PronunciationProgress>,
    recent: &[PronunciationFeedback],
) -> ProgressReport {
    let trends = trends(&recent[..recent.len().min(TREND_WINDOW)]);

    let practiced = progress.len();
    let mastered = progress
        .iter()
        .filter(|p| p.mastery_achieved_at.is_some())
        .count();
    let average = if practiced > 0 {
        progress.iter().map(|p| p.average_accuracy).sum::<f64>() / practiced as f64
    } else {
        0.0
    };

    let mut weak: Vec<&PronunciationProgress> = progress
        .iter()
        .filter(|p| p.average_accuracy < WEAK_AREA_THRESHOLD)
        .collect();
    weak.sort_by(|a, b| a.average_accuracy.total_cmp(&b.average_accuracy));
    let weak_areas: Vec<AreaEntry> = weak
        .into_iter()
        .take(MAX_AREAS)
        .map(|p| area_entry(letters, p))
        .collect();

    let mut strong: Vec<&PronunciationProgress> = progress
        .iter()
        .filter(|p| p.average_accuracy >= SUCCESS_THRESHOLD)
        .collect();
    strong.sort_by(|a, b| b.average_accuracy.total_cmp(&a.average_accuracy));
    let strong_areas: Vec<AreaEntry> = strong
        .into_iter()
        .take(MAX_AREAS)
        .map(|p| area_entry(letters, p))
        .collect();

    let insights = insights(mastered, weak_areas.first(), average);
    let recommendations = recommendations(weak_areas.first());

    let letter_progress = progress
        .into_iter()
        .map(|p| {
            (
                p.letter_id,
                LetterProgressEntry {
                    letter_info: letters.info(p.letter_id),
                    progress: p,
                },
            )
        })
        .collect();

    ProgressReport {
        letter_progress,
        trends,
        overall_statistics: OverallStatistics {
            total_letters_practiced: practiced,
            mastered_letters: mastered,
            average_accuracy: round2(average),
            mastery_percentage: percentage(mastered, letters.len()),
        },
        weak_areas,
        strong_areas,
        insights,
        recommendations,
    }
}

fn trends(recent: &[PronunciationFeedback]) -> BTreeMap<u32, LetterTrend> {
    let mut by_letter: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in recent {
        by_letter
            .entry(row.letter_id)
            .or_default()
            .push(row.pronunciation_accuracy);
    }

    by_letter
        .into_iter()
        .filter(|(_, scores)| scores.len() >= 2)
        .map(|(letter_id, scores)| {
            let split = scores.len().div_ceil(2);
            let (newer, older) = scores.split_at(split);
            let recent_average = mean(newer);
            let change = recent_average - mean(older);

            let trend = if change > TREND_THRESHOLD {
                TrendDirection::Improving
            } else if change < -TREND_THRESHOLD {
                TrendDirection::Declining
            } else {
                TrendDirection::Stable
            };

            (
                letter_id,
                LetterTrend {
                    trend,
                    change: round2(change),
                    recent_average: round2(recent_average),
                    attempts_count: scores.len(),
                },
            )
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn area_entry(letters: &LetterTable, progress: &PronunciationProgress) -> AreaEntry {
    let (letter, latin) = match letters.get(progress.letter_id) {
        Some(pattern) => (pattern.glyph.clone(), pattern.latin_name.clone()),
        None => ("?".to_string(), "Unknown".to_string()),
    };
    AreaEntry {
        letter_id: progress.letter_id,
        letter,
        latin,
        accuracy: progress.average_accuracy,
        attempts: progress.total_attempts,
    }
}

fn insights(mastered: usize, weakest: Option<&AreaEntry>, average: f64) -> Vec<String> {
    let mut insights = Vec::new();

    if mastered == 1 {
        insights.push("You have mastered 1 letter.".to_string());
    } else if mastered > 1 {
        insights.push(format!("You have mastered {} letters.", mastered));
    }

    if let Some(weakest) = weakest {
        insights.push(format!(
            "Focus your practice on {} ({}).",
            weakest.latin, weakest.letter
        ));
    }

    let overall = if average >= SUCCESS_THRESHOLD {
        "Excellent results, keep your practice consistent."
    } else if average >= 60.0 {
        "Good progress, practice regularly to improve further."
    } else {
        "Practice more often and focus on the correct makhraj technique."
    };
    insights.push(overall.to_string());

    insights
}

fn recommendations(weakest: Option<&AreaEntry>) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(weakest) = weakest {
        recommendations.push(format!(
            "Practice {} for 10 minutes every day.",
            weakest.latin
        ));
        recommendations
            .push("Use a mirror to watch the position of your mouth and tongue.".to_string());
    }
    recommendations.push("Listen to recordings of professional reciters for reference.".to_string());
    recommendations.push("Practice at a slow tempo and focus on accuracy.".to_string());

    recommendations
}
