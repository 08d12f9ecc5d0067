// Shared prompt fragments.
// Each module that talks to the model defines its own prompts.rs alongside it;
// this file holds the pieces every system prompt reuses.

/// Directive that keeps the reply in the visitor's language.
pub const LANGUAGE_MATCHING: &str = "\
1. LANGUAGE MATCHING (HIGHEST PRIORITY):
   - If user writes in English → respond in English
   - If user writes in Indonesian → respond in Indonesian
   - If user writes in French → respond in French
   - If user writes in any other language → respond in that same language
   - ALWAYS match the user's language exactly";

/// Directive against invented facts.
pub const NO_GUESSING: &str = "\
   a) NEVER assume or guess:
      - If you don't have information, say \"Saya tidak memiliki informasi tentang itu\" (ID) or \"I don't have that information\" (EN)
      - Don't make up dates, names, or details";
