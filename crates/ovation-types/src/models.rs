//! Domain types shared between the API and DB layers.
//!
//! The stored string forms (DB columns, CSV cells) are the serde names, so
//! `as_str`/`parse` and serde stay in lockstep.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventCategory {
    Music,
    Comedy,
    Workshop,
    Conference,
    Sports,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Music,
        EventCategory::Comedy,
        EventCategory::Workshop,
        EventCategory::Conference,
        EventCategory::Sports,
        EventCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Music => "Music",
            EventCategory::Comedy => "Comedy",
            EventCategory::Workshop => "Workshop",
            EventCategory::Conference => "Conference",
            EventCategory::Sports => "Sports",
            EventCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Live,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub const ALL: [EventStatus; 4] = [
        EventStatus::Upcoming,
        EventStatus::Live,
        EventStatus::Completed,
        EventStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Live => "live",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendeeType {
    #[serde(rename = "First-time attendee")]
    FirstTime,
    #[serde(rename = "Regular attendee")]
    Regular,
    #[serde(rename = "VIP/Premium")]
    VipPremium,
    Student,
    Professional,
    Other,
}

impl AttendeeType {
    pub const ALL: [AttendeeType; 6] = [
        AttendeeType::FirstTime,
        AttendeeType::Regular,
        AttendeeType::VipPremium,
        AttendeeType::Student,
        AttendeeType::Professional,
        AttendeeType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendeeType::FirstTime => "First-time attendee",
            AttendeeType::Regular => "Regular attendee",
            AttendeeType::VipPremium => "VIP/Premium",
            AttendeeType::Student => "Student",
            AttendeeType::Professional => "Professional",
            AttendeeType::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// The four feedback tags a reviewer can tick, in their declared order.
/// "Would Recommend" is a separate boolean field on the review, not a tag.
pub const CATEGORY_LABELS: [&str; 4] =
    ["Great Sound", "Good Venue", "Worth the Price", "Well Organized"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCategories {
    #[serde(default)]
    pub great_sound: bool,
    #[serde(default)]
    pub good_venue: bool,
    #[serde(default)]
    pub worth_price: bool,
    #[serde(default)]
    pub well_organized: bool,
}

impl ReviewCategories {
    /// Ticked labels, always in `CATEGORY_LABELS` order.
    pub fn labels(&self) -> Vec<&'static str> {
        let flags = [
            self.great_sound,
            self.good_venue,
            self.worth_price,
            self.well_organized,
        ];
        CATEGORY_LABELS
            .iter()
            .zip(flags)
            .filter(|(_, set)| *set)
            .map(|(label, _)| *label)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.labels().len()
    }
}

/// Heuristic 0-100 richness score: rating x 10, plus 1 point per 10 text
/// characters (max 50), plus 5 per ticked category, plus 20 for a
/// recommendation, capped at 100.
pub fn quality_score(
    star_rating: u8,
    review_text: Option<&str>,
    category_count: usize,
    would_recommend: bool,
) -> u8 {
    let mut score = u32::from(star_rating) * 10;
    if let Some(text) = review_text {
        score += (text.chars().count() as u32 / 10).min(50);
    }
    score += category_count as u32 * 5;
    if would_recommend {
        score += 20;
    }
    score.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_stays_in_bounds() {
        assert_eq!(quality_score(1, None, 0, false), 10);
        let long_text = "x".repeat(1000);
        assert_eq!(quality_score(5, Some(&long_text), 4, true), 100);
    }

    #[test]
    fn quality_score_components_add_up() {
        // 3*10 + 25 chars/10 = 2 + 2*5 + 20 = 64
        let text = "a".repeat(25);
        assert_eq!(quality_score(3, Some(&text), 2, true), 64);
    }

    #[test]
    fn quality_score_is_monotone_in_each_input() {
        let text = "decent show overall";
        let base = quality_score(2, Some(text), 1, false);
        assert!(quality_score(3, Some(text), 1, false) > base);
        let longer = format!("{text} with much more detail about the night");
        assert!(quality_score(2, Some(&longer), 1, false) >= base);
        assert!(quality_score(2, Some(text), 2, false) > base);
        assert!(quality_score(2, Some(text), 1, true) > base);
    }

    #[test]
    fn text_bonus_caps_at_fifty() {
        let text = "y".repeat(5000);
        // 1*10 + 50 = 60; nothing else ticked
        assert_eq!(quality_score(1, Some(&text), 0, false), 60);
    }

    #[test]
    fn category_labels_keep_declared_order() {
        let cats = ReviewCategories {
            great_sound: true,
            good_venue: false,
            worth_price: true,
            well_organized: true,
        };
        assert_eq!(
            cats.labels(),
            vec!["Great Sound", "Worth the Price", "Well Organized"]
        );
        assert_eq!(cats.count(), 3);
        assert!(ReviewCategories::default().labels().is_empty());
    }

    #[test]
    fn enum_strings_round_trip() {
        for c in EventCategory::ALL {
            assert_eq!(EventCategory::parse(c.as_str()), Some(c));
        }
        for s in EventStatus::ALL {
            assert_eq!(EventStatus::parse(s.as_str()), Some(s));
        }
        for a in AttendeeType::ALL {
            assert_eq!(AttendeeType::parse(a.as_str()), Some(a));
        }
        assert_eq!(EventStatus::Upcoming.as_str(), "upcoming");
        assert_eq!(AttendeeType::VipPremium.as_str(), "VIP/Premium");
    }

    #[test]
    fn enum_serde_matches_stored_strings() {
        let json = serde_json::to_string(&AttendeeType::FirstTime).unwrap();
        assert_eq!(json, "\"First-time attendee\"");
        let back: AttendeeType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AttendeeType::FirstTime);
        assert_eq!(
            serde_json::to_string(&EventStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
