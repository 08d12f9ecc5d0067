//! Canonical portfolio records.
//!
//! Source JSON is heterogeneous (`title` vs `role` vs `position`, strings vs
//! arrays). Every fallback chain lives in this file; the categorizer and the
//! summarizer only ever see the typed records below.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::portfolio::loader::RawPortfolio;
use crate::portfolio::PortfolioError;

const DEFAULT_NAME: &str = "Restu Anggoro Kasih";
const DEFAULT_TITLE: &str = "Data Scientist & ML Engineer";
const DEFAULT_LOCATION: &str = "Indonesia";

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

/// Renders any JSON value as display text. Falsy values (null, false, 0, "")
/// render empty; arrays join with ", "; objects render as compact JSON.
pub fn text_of(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "true".to_string(),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                String::new()
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(text_of)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// First non-empty field among `keys`, or "".
pub fn first_text(record: &Value, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .map(text_of)
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

fn optional_text(record: &Value, keys: &[&str]) -> Option<String> {
    Some(first_text(record, keys)).filter(|s| !s.trim().is_empty())
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Array items of a list category. Missing or null → `Ok(None)`.
pub fn list_of<'a>(
    portfolio: &'a RawPortfolio,
    category: &str,
) -> Result<Option<&'a [Value]>, PortfolioError> {
    match portfolio.get(category) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.as_slice())),
        Some(_) => Err(PortfolioError::UnexpectedShape {
            category: category.to_string(),
            expected: "array",
        }),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub location: String,
    pub bio: Option<String>,
    pub email: Option<String>,
}

impl Profile {
    pub fn from_value(value: &Value) -> Result<Self, PortfolioError> {
        if !value.is_object() {
            return Err(PortfolioError::UnexpectedShape {
                category: "about".to_string(),
                expected: "object",
            });
        }
        Ok(Self {
            name: optional_text(value, &["name", "fullName"])
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            title: optional_text(value, &["title", "headline"])
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            location: optional_text(value, &["location"])
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            bio: optional_text(value, &["bio", "description", "summary"]),
            email: optional_text(value, &["email"]),
        })
    }
}

/// Skill names from either a flat list (`["Rust", {"name": "SQL"}]`) or a map of
/// groups (`{"skills": {"ml": {"title": "ML", "technologies": ["PyTorch"]}}}`).
pub fn skill_names(value: &Value) -> Result<Vec<String>, PortfolioError> {
    let names: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => first_text(other, &["name", "skill", "title"]),
            })
            .collect(),
        Value::Object(map) => {
            let groups = match map.get("skills") {
                Some(Value::Object(inner)) => inner,
                Some(Value::Array(_)) => return skill_names(&map["skills"]),
                _ => map,
            };
            flatten_skill_groups(groups)
        }
        _ => {
            return Err(PortfolioError::UnexpectedShape {
                category: "skills".to_string(),
                expected: "array or object",
            })
        }
    };

    Ok(names
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn flatten_skill_groups(groups: &Map<String, Value>) -> Vec<String> {
    groups
        .values()
        .flat_map(|group| match group.get("technologies") {
            Some(Value::Array(techs)) if !techs.is_empty() => {
                techs.iter().map(text_of).collect::<Vec<_>>()
            }
            _ => vec![first_text(group, &["title", "name"])],
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExperienceItem {
    /// Display title: `title`, `role` or `position`.
    pub title: String,
    /// Title used for categorization: `title` or `role` only. Records that
    /// only carry a `position` classify by type and company.
    pub label: String,
    pub company: String,
    pub institution: String,
    pub client: String,
    pub period: String,
    pub description: String,
    /// Raw `type`/`category` value, if any.
    pub kind: String,
    pub internship: bool,
}

impl ExperienceItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            title: first_text(value, &["title", "role", "position"]),
            label: first_text(value, &["title", "role"]),
            company: first_text(value, &["company", "organization"]),
            institution: first_text(value, &["institution"]),
            client: first_text(value, &["client"]),
            period: first_text(value, &["period", "duration", "date"]),
            description: first_text(value, &["description"]),
            kind: first_text(value, &["type", "category"]),
            internship: truthy(value.get("internship")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EducationItem {
    pub degree: String,
    pub field: String,
    pub institution: String,
    pub period: String,
    pub gpa: String,
}

impl EducationItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            degree: first_text(value, &["degree", "school", "institution"]),
            field: first_text(value, &["field", "major", "program"]),
            institution: first_text(value, &["institution", "university", "school"]),
            period: first_text(value, &["year", "period", "graduation"]),
            gpa: first_text(value, &["gpa", "grade"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OrganizationItem {
    pub name: String,
    pub role: String,
    pub period: String,
    pub description: String,
}

impl OrganizationItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: first_text(value, &["name", "organization", "title"]),
            role: first_text(value, &["role", "position"]),
            period: first_text(value, &["period", "duration", "date"]),
            description: first_text(value, &["description"]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectItem {
    pub name: String,
    pub technologies: String,
    pub description: String,
    pub link: String,
}

impl ProjectItem {
    pub fn from_value(value: &Value) -> Self {
        Self {
            name: first_text(value, &["name", "title"]),
            technologies: first_text(value, &["technologies", "tech", "stack", "tags"]),
            description: first_text(value, &["description"]),
            link: first_text(value, &["link", "url", "github"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CertificationItem {
    Plain(String),
    Detailed {
        name: String,
        issuer: String,
        date: String,
        credential_id: String,
    },
}

impl CertificationItem {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => CertificationItem::Plain(s.clone()),
            other => CertificationItem::Detailed {
                name: first_text(other, &["name", "title", "certification"]),
                issuer: first_text(other, &["issuer", "organization", "provider"]),
                date: first_text(other, &["date", "year", "issued"]),
                credential_id: first_text(other, &["id", "credential", "credentialId"]),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AchievementItem {
    Plain(String),
    Detailed {
        title: String,
        issuer: String,
        date: String,
        description: String,
    },
}

impl AchievementItem {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => AchievementItem::Plain(s.clone()),
            other => AchievementItem::Detailed {
                title: first_text(other, &["title", "achievement", "name"]),
                issuer: first_text(other, &["issuer", "organization"]),
                date: first_text(other, &["date", "year"]),
                description: first_text(other, &["description"]),
            },
        }
    }
}
