// Site structure: which pages exist and which portfolio categories each presents.

pub mod pages;
pub mod structure;

pub use pages::SiteLayout;
pub use structure::{analyze_structure, SiteStructure};
