//! Keyword tokens derived from free-text metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which characters separate keyword tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeywordSplit {
    /// Any character that is not alphanumeric, underscore included.
    #[default]
    Strict,
    /// Whitespace plus `-`, `_`, `;`, `,` and `.` only.
    Whitespace,
}

impl KeywordSplit {
    fn is_separator(self, c: char) -> bool {
        match self {
            KeywordSplit::Strict => !c.is_alphanumeric(),
            KeywordSplit::Whitespace => {
                c.is_whitespace() || matches!(c, '-' | '_' | ';' | ',' | '.')
            }
        }
    }
}

/// Lower-case `text`, split it on runs of separators and return the distinct
/// non-empty tokens.
pub fn derive_keywords(text: &str, split: KeywordSplit) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| split.is_separator(c))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
