//! Data Categorizer — sorts experience records into employment-type buckets.
//!
//! Rules are tested in a fixed order and the first match wins:
//! internship → research → freelance → volunteer → full-time → fallback.
//! Fallback: a record with a company (and no "intern" in its title) is full-time,
//! anything else is `Other`. Overlaps resolve by that order and nothing else.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::portfolio::models::ExperienceItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceCategory {
    Fulltime,
    Internship,
    Freelance,
    Volunteer,
    Research,
    Other,
}

impl ExperienceCategory {
    pub const ALL: [ExperienceCategory; 6] = [
        ExperienceCategory::Fulltime,
        ExperienceCategory::Internship,
        ExperienceCategory::Freelance,
        ExperienceCategory::Volunteer,
        ExperienceCategory::Research,
        ExperienceCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceCategory::Fulltime => "fulltime",
            ExperienceCategory::Internship => "internship",
            ExperienceCategory::Freelance => "freelance",
            ExperienceCategory::Volunteer => "volunteer",
            ExperienceCategory::Research => "research",
            ExperienceCategory::Other => "other",
        }
    }
}

/// Assigns exactly one category to a record. Keyword rules read the type and
/// `ExperienceItem::label`, never the `position` display fallback.
pub fn classify(item: &ExperienceItem) -> ExperienceCategory {
    let kind = item.kind.to_lowercase();
    let title = item.label.to_lowercase();
    let company = item.company.to_lowercase();

    let mentions = |needle: &str| kind.contains(needle) || title.contains(needle);

    if mentions("intern") || item.internship {
        ExperienceCategory::Internship
    } else if mentions("research") {
        ExperienceCategory::Research
    } else if mentions("freelance") {
        ExperienceCategory::Freelance
    } else if mentions("volunteer") {
        ExperienceCategory::Volunteer
    } else if kind.contains("full") || kind.contains("permanent") {
        ExperienceCategory::Fulltime
    } else if !company.trim().is_empty() && !title.contains("intern") {
        ExperienceCategory::Fulltime
    } else {
        ExperienceCategory::Other
    }
}

/// Bucketed experience. Every category is present, possibly empty; records
/// keep their original relative order inside each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedExperience {
    buckets: BTreeMap<ExperienceCategory, Vec<ExperienceItem>>,
}

impl CategorizedExperience {
    pub fn get(&self, category: ExperienceCategory) -> &[ExperienceItem] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExperienceCategory, &[ExperienceItem])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

pub fn categorize(items: &[ExperienceItem]) -> CategorizedExperience {
    let mut buckets: BTreeMap<ExperienceCategory, Vec<ExperienceItem>> = ExperienceCategory::ALL
        .iter()
        .map(|c| (*c, Vec::new()))
        .collect();

    for item in items {
        buckets.entry(classify(item)).or_default().push(item.clone());
    }

    CategorizedExperience { buckets }
}
