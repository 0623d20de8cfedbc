//! Mood statistics for the `mood stats` view.

use crate::constants::DATE_FORMAT_ISO;
use crate::models::{Mood, MoodSample};
use serde::Serialize;

/// Series for plotting mood over time, one point per sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodChart {
    pub dates: Vec<String>,
    pub values: Vec<u8>,
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodSummary {
    pub entries: usize,
    pub most_common: Mood,
    pub average: Mood,
    pub chart: MoodChart,
}

/// Summarizes `moods`, which must be in chronological order.
///
/// The most common mood breaks ties in favour of the one seen first. The
/// average is the mean ordinal rounded half to even. Returns `None` when
/// there are no samples.
pub fn summarize_moods(moods: &[MoodSample]) -> Option<MoodSummary> {
    if moods.is_empty() {
        return None;
    }

    // (mood, count) in order of first appearance
    let mut counts: Vec<(Mood, usize)> = Vec::new();
    for sample in moods {
        match counts.iter_mut().find(|(mood, _)| *mood == sample.mood) {
            Some((_, count)) => *count += 1,
            None => counts.push((sample.mood, 1)),
        }
    }

    let mut most_common = counts[0];
    for &(mood, count) in &counts[1..] {
        if count > most_common.1 {
            most_common = (mood, count);
        }
    }

    let total: u32 = moods.iter().map(|m| u32::from(m.mood.ordinal())).sum();
    let mean = f64::from(total) / moods.len() as f64;
    let average = Mood::from_ordinal(mean.round_ties_even() as u8).unwrap_or(Mood::Neutral);

    let chart = MoodChart {
        dates: moods
            .iter()
            .map(|m| m.created_at.format(DATE_FORMAT_ISO).to_string())
            .collect(),
        values: moods.iter().map(|m| m.mood.ordinal()).collect(),
        labels: moods.iter().map(|m| m.mood.display_name()).collect(),
    };

    Some(MoodSummary {
        entries: moods.len(),
        most_common: most_common.0,
        average,
        chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(moods: &[Mood]) -> Vec<MoodSample> {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        moods
            .iter()
            .enumerate()
            .map(|(i, &mood)| MoodSample::new(mood, start + Duration::days(i as i64)))
            .collect()
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(summarize_moods(&[]), None);
    }

    #[test]
    fn test_most_common_and_average() {
        let summary =
            summarize_moods(&series(&[Mood::Happy, Mood::Sad, Mood::Happy, Mood::VeryHappy]))
                .unwrap();

        assert_eq!(summary.entries, 4);
        assert_eq!(summary.most_common, Mood::Happy);
        // (4 + 2 + 4 + 5) / 4 = 3.75
        assert_eq!(summary.average, Mood::Happy);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let summary = summarize_moods(&series(&[Mood::Sad, Mood::Happy, Mood::Happy, Mood::Sad]))
            .unwrap();
        assert_eq!(summary.most_common, Mood::Sad);
    }

    #[test]
    fn test_average_rounds_half_to_even() {
        // mean 2.5 -> 2
        let summary = summarize_moods(&series(&[Mood::Sad, Mood::Neutral])).unwrap();
        assert_eq!(summary.average, Mood::Sad);

        // mean 3.5 -> 4
        let summary = summarize_moods(&series(&[Mood::Neutral, Mood::Happy])).unwrap();
        assert_eq!(summary.average, Mood::Happy);
    }

    #[test]
    fn test_chart_series() {
        let summary = summarize_moods(&series(&[Mood::VerySad, Mood::Neutral])).unwrap();

        assert_eq!(summary.chart.dates, vec!["2024-05-01", "2024-05-02"]);
        assert_eq!(summary.chart.values, vec![1, 3]);
        assert_eq!(summary.chart.labels, vec!["Very Sad", "Neutral"]);
    }
}
