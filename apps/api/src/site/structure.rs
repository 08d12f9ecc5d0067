//! Structure Analyzer — maps portfolio categories to the pages that show them.
//!
//! A category goes to the page with the same name (case-insensitive). Failing
//! that, certifications and achievements go to `education`; any other
//! category is presented under a page named after itself. Categories whose
//! data is an empty array are left out. Output depends only on the inputs.

use std::collections::BTreeMap;

use crate::portfolio::RawPortfolio;

/// Orphan categories and the page they live on when no page matches by name.
const FALLBACK_PAGES: &[(&str, &str)] = &[
    ("certifications", "education"),
    ("achievements", "education"),
];

const WHERE_INSTRUCTIONS: &[&str] = &[
    "\n⚠️ CRITICAL INSTRUCTIONS for answering 'WHERE' questions:",
    "\nWhen users ask 'where can I see/find [something]', you MUST answer in this format:",
    "1. Start with: 'Kamu bisa lihat [item] di halaman [PAGE NAME]' (Indonesian) or 'You can see [item] on the [PAGE NAME] page' (English)",
    "2. If the page has multiple sections, add: 'di bagian [SECTION NAME]' (Indonesian) or 'in the [SECTION NAME] section' (English)",
    "\nEXAMPLES:",
    "❌ BAD: 'Anda bisa melihat daftar sertifikat Restu di bagian Certifications'",
    "✅ GOOD: 'Kamu bisa lihat sertifikat saya di halaman Education, di bagian Certifications'",
    "✅ GOOD: 'You can see my certifications on the Education page, in the Certifications section'",
    "\n❌ BAD: 'Check out the Projects section'",
    "✅ GOOD: 'Kamu bisa lihat projects saya di halaman Projects'",
    "✅ GOOD: 'You can see my projects on the Projects page'",
    "\nALWAYS mention the PAGE first, then the SECTION (if applicable). Be specific and clear!",
];

/// Page name → categories presented on it, both in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiteStructure {
    pages: BTreeMap<String, Vec<String>>,
}

impl SiteStructure {
    pub fn pages(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.pages.iter().map(|(p, s)| (p.as_str(), s.as_slice()))
    }

    pub fn sections(&self, page: &str) -> Option<&[String]> {
        self.pages.get(page).map(Vec::as_slice)
    }

    /// The page a category was mapped to, if it has data.
    pub fn page_of(&self, category: &str) -> Option<&str> {
        self.pages
            .iter()
            .find(|(_, sections)| sections.iter().any(|s| s == category))
            .map(|(page, _)| page.as_str())
    }

    /// Natural-language block for the system prompt: the page map followed by
    /// the page-then-section answer format.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "\n--- WEBSITE STRUCTURE ANALYSIS ---".to_string(),
            "\nWebsite Structure and Content Location:".to_string(),
        ];

        for (page, sections) in &self.pages {
            let page_name = capitalize(page);
            lines.push(format!("\n📄 PAGE: {page_name}"));
            if sections.len() == 1 && sections[0].eq_ignore_ascii_case(page) {
                lines.push(format!("   Contains: {page_name} information"));
            } else {
                lines.push("   Sections available:".to_string());
                for section in sections {
                    lines.push(format!("   - {}", capitalize(section)));
                }
            }
        }

        lines.extend(WHERE_INSTRUCTIONS.iter().map(|l| l.to_string()));
        lines.join("\n")
    }
}

pub fn analyze_structure(pages: &[String], portfolio: &RawPortfolio) -> SiteStructure {
    let mut mapping: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for category in portfolio.keys() {
        if !portfolio.has_data(category) {
            continue;
        }
        mapping
            .entry(target_page(pages, category))
            .or_default()
            .push(category.to_string());
    }

    for sections in mapping.values_mut() {
        sections.sort();
    }

    SiteStructure { pages: mapping }
}

fn target_page(pages: &[String], category: &str) -> String {
    let normalized = category.to_lowercase();

    if let Some(page) = pages.iter().find(|p| p.to_lowercase() == normalized) {
        return page.clone();
    }

    FALLBACK_PAGES
        .iter()
        .find(|(orphan, _)| *orphan == normalized)
        .map(|(_, page)| page.to_string())
        .unwrap_or(normalized)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
