//! Context Summarizer — renders the portfolio as one bounded, human-readable block.
//!
//! Sections are composed in a fixed order. Long text fields are cut to a hard
//! character cap and lists are capped independently. If a section cannot be
//! composed (a category with an unexpected shape), the failure is logged and
//! the sections composed so far are returned.

use tracing::warn;

use crate::portfolio::categorizer::{categorize, ExperienceCategory};
use crate::portfolio::loader::RawPortfolio;
use crate::portfolio::models::{
    list_of, skill_names, AchievementItem, CertificationItem, EducationItem, ExperienceItem,
    OrganizationItem, Profile, ProjectItem,
};
use crate::portfolio::PortfolioError;

pub const BIO_MAX_CHARS: usize = 250;
pub const DESCRIPTION_MAX_CHARS: usize = 200;
pub const SHORT_DESCRIPTION_MAX_CHARS: usize = 150;
pub const CV_MAX_CHARS: usize = 3_000;
pub const MAX_SKILLS: usize = 30;
pub const MAX_PROJECTS: usize = 8;

pub const SUMMARY_HEADER: &str = "=== PORTFOLIO DATA BREAKDOWN ===\n";
pub const ORGANIZATIONS_HEADING: &str =
    "--- ORGANIZATIONAL EXPERIENCE (Student Organizations, Committees, etc.) ---";

type SectionFn = fn(&RawPortfolio) -> Result<Vec<String>, PortfolioError>;

/// Section order of the summary. Experience expands into one block per bucket.
const SECTIONS: &[(&str, SectionFn)] = &[
    ("personal_info", personal_info_section),
    ("skills", skills_section),
    ("experience", experience_section),
    ("education", education_section),
    ("organizations", organizations_section),
    ("projects", projects_section),
    ("certifications", certifications_section),
    ("achievements", achievements_section),
];

/// Hard character cut. Counts chars, not bytes, so multi-byte text never splits.
pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Builds the full portfolio summary, optionally followed by the CV text.
pub fn summarize_portfolio(portfolio: &RawPortfolio, cv_text: Option<&str>) -> String {
    let mut lines = vec![SUMMARY_HEADER.to_string()];

    for (name, section) in SECTIONS {
        match section(portfolio) {
            Ok(section_lines) => lines.extend(section_lines),
            Err(e) => {
                warn!("Portfolio summary stopped at section '{name}': {e}");
                return lines.join("\n");
            }
        }
    }

    if let Some(cv) = cv_text.map(str::trim).filter(|cv| !cv.is_empty()) {
        lines.push("--- CV/RESUME CONTENT ---".to_string());
        lines.push(truncate(cv, CV_MAX_CHARS));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn push_if(lines: &mut Vec<String>, label: &str, value: &str) {
    if !value.trim().is_empty() {
        lines.push(format!("  {label}: {value}"));
    }
}

fn personal_info_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(about) = portfolio.get("about") else {
        return Ok(Vec::new());
    };
    let profile = Profile::from_value(about)?;

    let mut lines = vec![
        "--- PERSONAL INFORMATION ---".to_string(),
        format!("NAME: {}", profile.name),
        format!("TITLE: {}", profile.title),
        format!("LOCATION: {}", profile.location),
    ];
    if let Some(bio) = &profile.bio {
        lines.push(format!("BIO: {}", truncate(bio, BIO_MAX_CHARS)));
    }
    if let Some(email) = &profile.email {
        lines.push(format!("EMAIL: {email}"));
    }
    lines.push(String::new());
    Ok(lines)
}

fn skills_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(skills) = portfolio.get("skills") else {
        return Ok(Vec::new());
    };
    let names = skill_names(skills)?;
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let capped: Vec<String> = names.into_iter().take(MAX_SKILLS).collect();
    Ok(vec![
        "--- SKILLS & EXPERTISE ---".to_string(),
        capped.join(", "),
        String::new(),
    ])
}

fn experience_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(items) = list_of(portfolio, "experience")? else {
        return Ok(Vec::new());
    };
    let records: Vec<ExperienceItem> = items.iter().map(ExperienceItem::from_value).collect();
    let categorized = categorize(&records);

    // Volunteer and uncategorized records are not rendered.
    let blocks = [
        (
            ExperienceCategory::Fulltime,
            "--- WORK EXPERIENCE (Full-time/Professional) ---",
        ),
        (ExperienceCategory::Research, "--- RESEARCH EXPERIENCE ---"),
        (ExperienceCategory::Internship, "--- INTERNSHIP EXPERIENCE ---"),
        (ExperienceCategory::Freelance, "--- FREELANCE/CONTRACT WORK ---"),
    ];

    let mut lines = Vec::new();
    for (category, heading) in blocks {
        let bucket = categorized.get(category);
        if bucket.is_empty() {
            continue;
        }
        lines.push(heading.to_string());
        for exp in bucket {
            lines.push(experience_headline(category, exp));
            push_if(&mut lines, "Period", &exp.period);
            push_if(
                &mut lines,
                "Description",
                &truncate(&exp.description, DESCRIPTION_MAX_CHARS),
            );
            lines.push(String::new());
        }
    }
    Ok(lines)
}

fn experience_headline(category: ExperienceCategory, exp: &ExperienceItem) -> String {
    let company = match category {
        ExperienceCategory::Research if exp.company.is_empty() => &exp.institution,
        ExperienceCategory::Freelance if exp.company.is_empty() => &exp.client,
        _ => &exp.company,
    };
    match (category, company.is_empty()) {
        (_, true) => format!("• {}", exp.title),
        (ExperienceCategory::Freelance, false) => format!("• {} for {}", exp.title, company),
        (_, false) => format!("• {} at {}", exp.title, company),
    }
}

fn education_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(items) = list_of(portfolio, "education")? else {
        return Ok(Vec::new());
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = vec!["--- EDUCATION ---".to_string()];
    for edu in items.iter().map(EducationItem::from_value) {
        if edu.field.is_empty() {
            lines.push(format!("• {}", edu.degree));
        } else {
            lines.push(format!("• {} in {}", edu.degree, edu.field));
        }
        push_if(&mut lines, "Institution", &edu.institution);
        push_if(&mut lines, "Period", &edu.period);
        push_if(&mut lines, "GPA", &edu.gpa);
        lines.push(String::new());
    }
    Ok(lines)
}

fn organizations_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(items) = list_of(portfolio, "organizations")? else {
        return Ok(Vec::new());
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = vec![ORGANIZATIONS_HEADING.to_string()];
    for org in items.iter().map(OrganizationItem::from_value) {
        let role = if org.role.is_empty() { "Member" } else { org.role.as_str() };
        lines.push(format!("• {role} at {}", org.name));
        push_if(&mut lines, "Period", &org.period);
        push_if(
            &mut lines,
            "Description",
            &truncate(&org.description, DESCRIPTION_MAX_CHARS),
        );
        lines.push(String::new());
    }
    Ok(lines)
}

fn projects_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(items) = list_of(portfolio, "projects")? else {
        return Ok(Vec::new());
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = vec!["--- PROJECTS ---".to_string()];
    for proj in items.iter().take(MAX_PROJECTS).map(ProjectItem::from_value) {
        lines.push(format!("• {}", proj.name));
        push_if(&mut lines, "Technologies", &proj.technologies);
        push_if(
            &mut lines,
            "Description",
            &truncate(&proj.description, SHORT_DESCRIPTION_MAX_CHARS),
        );
        push_if(&mut lines, "Link", &proj.link);
        lines.push(String::new());
    }
    Ok(lines)
}

fn certifications_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(items) = list_of(portfolio, "certifications")? else {
        return Ok(Vec::new());
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = vec!["--- CERTIFICATIONS ---".to_string()];
    for cert in items.iter().map(CertificationItem::from_value) {
        match cert {
            CertificationItem::Plain(name) => lines.push(format!("• {name}")),
            CertificationItem::Detailed {
                name,
                issuer,
                date,
                credential_id,
            } => {
                lines.push(format!("• {name}"));
                push_if(&mut lines, "Issued by", &issuer);
                push_if(&mut lines, "Date", &date);
                push_if(&mut lines, "Credential ID", &credential_id);
                lines.push(String::new());
            }
        }
    }
    Ok(lines)
}

fn achievements_section(portfolio: &RawPortfolio) -> Result<Vec<String>, PortfolioError> {
    let Some(items) = list_of(portfolio, "achievements")? else {
        return Ok(Vec::new());
    };
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = vec!["--- ACHIEVEMENTS & AWARDS ---".to_string()];
    for achievement in items.iter().map(AchievementItem::from_value) {
        match achievement {
            AchievementItem::Plain(title) => lines.push(format!("• {title}")),
            AchievementItem::Detailed {
                title,
                issuer,
                date,
                description,
            } => {
                lines.push(format!("• {title}"));
                push_if(&mut lines, "From", &issuer);
                push_if(&mut lines, "Date", &date);
                push_if(
                    &mut lines,
                    "Description",
                    &truncate(&description, SHORT_DESCRIPTION_MAX_CHARS),
                );
                lines.push(String::new());
            }
        }
    }
    Ok(lines)
}
