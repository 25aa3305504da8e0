//! syntect-backed [`Highlighter`].
//!
//! Output is class-based (`<span class="hl-keyword">`) so colors live in
//! the stylesheet and follow the light/dark theme.

use super::{CollaboratorError, Highlighter};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
}

impl SyntectHighlighter {
    /// Highlighter over syntect's bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn find_syntax(&self, token: &str) -> Option<&SyntaxReference> {
        let lowercase = token.to_ascii_lowercase();
        self.syntax_set
            .find_syntax_by_token(&lowercase)
            .or_else(|| self.syntax_set.find_syntax_by_name(token))
            .or_else(|| self.syntax_set.find_syntax_by_extension(&lowercase))
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String, CollaboratorError> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| CollaboratorError::UnknownLanguage(language.to_string()))?;

        let mut source = code.to_string();
        if !source.ends_with('\n') {
            source.push('\n');
        }

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(source.as_str()) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|err| CollaboratorError::Highlight {
                    language: language.to_string(),
                    message: err.to_string(),
                })?;
        }
        Ok(generator.finalize())
    }
}
