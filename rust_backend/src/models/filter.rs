//! Selection rules for reportable LARP events.

use serde::{Deserialize, Serialize};

/// Category name (compared case-insensitively) of reportable events.
pub const LARP_CATEGORY: &str = "LARP";

/// Event status of reportable events.
pub const ACTIVE_STATUS: &str = "active";

/// Signup state counted towards NPC headcount and early signups.
pub const CONFIRMED_STATE: &str = "confirmed";

/// Titles of non-game and administrative events that sit in the LARP
/// category but never count towards the statistics.
pub const EXEMPT_EVENT_TITLES: &[&str] = &[
    "Ops",
    "ConSuite",
    "Ops Track",
    "Ops!",
    "Intercon Sunday Breakfast",
    "NEIL Annual Board Meeting",
    "The Eclectic Dance Mix Party",
    "Friday Night Coffeehouse",
    "Toast to Brett",
    "Intercon: The Leaving",
    "Rising Phoenix Party",
    "[CANCELLED] Pendragon: Tales on a Winter's Morn",
    "A Toast to Dean Edgell",
];

/// Filter applied by every repository query that touches events.
///
/// An event is reportable when its category name equals [`Self::category`]
/// ignoring case, its status equals [`Self::status`] and its title is not one
/// of [`Self::exempt_titles`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    pub category: String,
    pub status: String,
    pub exempt_titles: Vec<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            category: LARP_CATEGORY.to_string(),
            status: ACTIVE_STATUS.to_string(),
            exempt_titles: EXEMPT_EVENT_TITLES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl EventFilter {
    /// Extend the exemption list with additional titles, skipping duplicates.
    pub fn with_extra_exemptions<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for title in titles {
            let title = title.into();
            if !self.exempt_titles.contains(&title) {
                self.exempt_titles.push(title);
            }
        }
        self
    }

    pub fn is_exempt(&self, title: &str) -> bool {
        self.exempt_titles.iter().any(|t| t == title)
    }

    pub fn matches_category(&self, category_name: &str) -> bool {
        category_name.to_uppercase() == self.category.to_uppercase()
    }

    /// Whether an event with the given category, status and title is reportable.
    pub fn accepts(&self, category_name: Option<&str>, status: &str, title: &str) -> bool {
        category_name.is_some_and(|c| self.matches_category(c))
            && status == self.status
            && !self.is_exempt(title)
    }
}
