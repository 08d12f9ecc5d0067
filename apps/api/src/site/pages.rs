//! Page discovery.
//!
//! A page is an immediate subdirectory of the pages root that holds a
//! `page.*` file (`about/page.tsx`, `education/page.html`, ...). The `api`
//! directory and hidden directories are never pages.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Pages of the portfolio site when no pages directory is configured.
pub const DEFAULT_PAGES: &[&str] = &["about", "contact", "education", "experience"];

const IGNORED_DIRS: &[&str] = &["api", "node_modules"];

#[derive(Debug, Clone)]
pub enum SiteLayout {
    Fixed(Vec<String>),
    /// Re-scanned on every request.
    Scanned(PathBuf),
}

impl SiteLayout {
    pub fn from_config(pages_dir: Option<PathBuf>) -> Self {
        match pages_dir {
            Some(dir) => SiteLayout::Scanned(dir),
            None => SiteLayout::Fixed(DEFAULT_PAGES.iter().map(|p| p.to_string()).collect()),
        }
    }

    /// Sorted page identifiers. A failed scan falls back to `DEFAULT_PAGES`.
    pub async fn pages(&self) -> Vec<String> {
        match self {
            SiteLayout::Fixed(pages) => pages.clone(),
            SiteLayout::Scanned(root) => match scan_pages(root).await {
                Ok(pages) => pages,
                Err(e) => {
                    warn!("Failed to scan pages under {}: {e}", root.display());
                    DEFAULT_PAGES.iter().map(|p| p.to_string()).collect()
                }
            },
        }
    }
}

pub async fn scan_pages(root: &Path) -> std::io::Result<Vec<String>> {
    let mut pages = Vec::new();
    let mut entries = tokio::fs::read_dir(root).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || IGNORED_DIRS.contains(&name.as_str()) {
            continue;
        }
        if has_page_file(&entry.path()).await? {
            pages.push(name);
        }
    }

    pages.sort();
    Ok(pages)
}

async fn has_page_file(dir: &Path) -> std::io::Result<bool> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if entry.path().file_stem().and_then(|s| s.to_str()) == Some("page") {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[tokio::test]
    async fn test_scan_finds_page_directories() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("education/page.tsx"));
        touch(&root.path().join("about/page.tsx"));
        touch(&root.path().join("about/components/Hero.tsx"));
        touch(&root.path().join("api/chat/route.ts"));
        touch(&root.path().join("api/page.ts"));
        touch(&root.path().join("components/Button.tsx"));
        touch(&root.path().join(".next/page.js"));
        touch(&root.path().join("layout.tsx"));
        touch(&root.path().join("blog/page/index.tsx"));

        let pages = scan_pages(root.path()).await.unwrap();
        assert_eq!(pages, vec!["about", "education"]);
    }

    #[tokio::test]
    async fn test_failed_scan_falls_back_to_defaults() {
        let root = tempfile::tempdir().unwrap();
        let layout = SiteLayout::Scanned(root.path().join("missing"));
        assert_eq!(layout.pages().await, DEFAULT_PAGES);
    }

    #[tokio::test]
    async fn test_fixed_layout() {
        let layout = SiteLayout::from_config(None);
        assert_eq!(layout.pages().await, DEFAULT_PAGES);
    }
}
