//! On-demand aggregate computations over review collections. Everything here
//! is a single pass over in-memory data; nothing is cached or maintained
//! incrementally.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::warn;

use ovation_types::api::{ActivityEntry, WordCount};

const TOP_WORDS: usize = 20;

const STOP_WORDS: [&str; 49] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "must", "can", "this", "that", "these", "those", "i", "you",
    "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

/// Mean of approved star ratings; 0 when there are none (never NaN).
pub fn average_rating(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
}

/// Counts per star value. All five keys are always present, zero-filled.
pub fn rating_distribution(ratings: &[u8]) -> BTreeMap<u8, u32> {
    let mut distribution: BTreeMap<u8, u32> = (1..=5).map(|star| (star, 0)).collect();
    for rating in ratings {
        if let Some(count) = distribution.get_mut(rating) {
            *count += 1;
        }
    }
    distribution
}

/// Submissions as a percentage of declared capacity. The numerator counts
/// every review, approved or not; 0 when capacity is unset or non-positive.
pub fn response_rate(total_reviews: usize, capacity: Option<i64>) -> f64 {
    match capacity {
        Some(cap) if cap > 0 => (total_reviews as f64 / cap as f64) * 100.0,
        _ => 0.0,
    }
}

/// Approved reviews from the trailing 7 days, reduced to (date, rating, name).
pub fn recent_activity(
    entries: &[(DateTime<Utc>, u8, String)],
    now: DateTime<Utc>,
) -> Vec<ActivityEntry> {
    let cutoff = now - Duration::days(7);
    entries
        .iter()
        .filter(|(submitted_at, _, _)| *submitted_at >= cutoff)
        .map(|(submitted_at, rating, reviewer)| ActivityEntry {
            date: submitted_at.format("%Y-%m-%d").to_string(),
            rating: *rating,
            reviewer: reviewer.clone(),
        })
        .collect()
}

/// Case-folded, alphanumeric-only word tally over review texts. Stop words
/// and tokens of length <= 2 are dropped; the top 20 come back by descending
/// count with ties in first-encounter order.
pub fn word_frequency<'a, I>(texts: I) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, (usize, u32)> = HashMap::new();
    for text in texts {
        for raw in text.to_lowercase().split_whitespace() {
            let word: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
            if word.chars().count() <= 2 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            let first_seen = counts.len();
            let entry = counts.entry(word).or_insert((first_seen, 0));
            entry.1 += 1;
        }
    }

    let mut tallied: Vec<(String, usize, u32)> = counts
        .into_iter()
        .map(|(word, (order, count))| (word, order, count))
        .collect();
    tallied.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    tallied.truncate(TOP_WORDS);
    tallied
        .into_iter()
        .map(|(word, _, count)| WordCount { word, count })
        .collect()
}

/// Human-readable age of a timestamp, newest bucket first.
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - at;
    let days = diff.num_days();
    let seconds = diff.num_seconds();
    if days > 0 {
        format!("{} day{} ago", days, if days > 1 { "s" } else { "" })
    } else if seconds > 3600 {
        let hours = seconds / 3600;
        format!("{} hour{} ago", hours, if hours > 1 { "s" } else { "" })
    } else if seconds > 60 {
        let minutes = seconds / 60;
        format!("{} minute{} ago", minutes, if minutes > 1 { "s" } else { "" })
    } else {
        "Just now".to_string()
    }
}

/// Stored timestamps are RFC 3339; tolerate SQLite's bare
/// "YYYY-MM-DD HH:MM:SS" form as well.
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", s, e);
            DateTime::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[4, 5, 3]), 4.0);
    }

    #[test]
    fn distribution_always_has_five_zero_filled_keys() {
        let empty = rating_distribution(&[]);
        assert_eq!(empty.len(), 5);
        assert!(empty.values().all(|v| *v == 0));

        let dist = rating_distribution(&[5, 5, 3, 1]);
        assert_eq!(dist[&5], 2);
        assert_eq!(dist[&3], 1);
        assert_eq!(dist[&1], 1);
        assert_eq!(dist[&2], 0);
        assert_eq!(dist[&4], 0);
        assert_eq!(dist.values().sum::<u32>(), 4);
    }

    #[test]
    fn response_rate_handles_missing_capacity() {
        assert_eq!(response_rate(10, None), 0.0);
        assert_eq!(response_rate(10, Some(0)), 0.0);
        assert_eq!(response_rate(10, Some(-5)), 0.0);
        assert_eq!(response_rate(25, Some(100)), 25.0);
        assert_eq!(response_rate(0, Some(100)), 0.0);
    }

    #[test]
    fn recent_activity_keeps_the_trailing_week() {
        let now = "2026-08-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let entries = vec![
            (now - Duration::days(1), 5, "Ada".to_string()),
            (now - Duration::days(6), 3, "Grace".to_string()),
            (now - Duration::days(8), 4, "Linus".to_string()),
        ];
        let activity = recent_activity(&entries, now);
        assert_eq!(activity.len(), 2);
        assert_eq!(activity[0].reviewer, "Ada");
        assert_eq!(activity[0].date, "2026-08-06");
        assert_eq!(activity[1].rating, 3);
    }

    #[test]
    fn word_frequency_strips_noise() {
        let texts = ["The sound was AMAZING!", "amazing venue, great sound."];
        let words = word_frequency(texts);
        // both hit count 2; "sound" was seen first so it leads the tie
        assert_eq!(words[0].word, "sound");
        assert_eq!(words[0].count, 2);
        assert_eq!(words[1].word, "amazing");
        assert_eq!(words[1].count, 2);
        // "the" and "was" are stop words; punctuation is stripped
        assert!(words.iter().all(|w| w.word != "the" && w.word != "was"));
        assert!(words.iter().any(|w| w.word == "venue"));
    }

    #[test]
    fn short_tokens_are_dropped() {
        let words = word_frequency(["ok so it go my gym day"]);
        let found: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(found, vec!["gym", "day"]);
    }

    #[test]
    fn ties_stay_in_first_encounter_order() {
        let words = word_frequency(["zebra apple zebra apple mango"]);
        assert_eq!(words[0].word, "zebra");
        assert_eq!(words[1].word, "apple");
        assert_eq!(words[2].word, "mango");
    }

    #[test]
    fn only_the_top_twenty_survive() {
        let text: String = (0..30)
            .map(|i| format!("word{i:02} "))
            .collect();
        // word00 appears twice so it must lead
        let doubled = format!("{text} word00");
        let words = word_frequency([doubled.as_str()]);
        assert_eq!(words.len(), 20);
        assert_eq!(words[0].word, "word00");
        assert_eq!(words[0].count, 2);
    }

    #[test]
    fn relative_times_match_the_display_buckets() {
        let now = "2026-08-07T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(format_relative(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_relative(now - Duration::days(1), now), "1 day ago");
        assert_eq!(format_relative(now - Duration::hours(2), now), "2 hours ago");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative(now - Duration::seconds(30), now), "Just now");
    }

    #[test]
    fn timestamps_parse_both_stored_forms() {
        let rfc = parse_timestamp("2026-08-07T12:00:00+00:00");
        assert_eq!(rfc.format("%H:%M").to_string(), "12:00");
        let bare = parse_timestamp("2026-08-07 09:30:00");
        assert_eq!(bare.format("%H:%M").to_string(), "09:30");
    }
}
