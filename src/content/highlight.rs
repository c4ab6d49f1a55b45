use std::collections::HashMap;
use std::io;
use std::io::ErrorKind;
use std::sync::RwLock;

use lazy_static::lazy_static;
use spdlog::debug;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};

lazy_static! {
    static ref GRAMMARS: SyntaxSet = SyntaxSet::load_defaults_newlines();
}

/// Highlights code blocks with css classes. A language is resolved against the grammar set the
/// first time it is used and remembered afterwards.
pub struct CodeHighlighter {
    grammars: &'static SyntaxSet,
    // language token -> grammar name
    languages: RwLock<HashMap<String, String>>,
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeHighlighter {
    pub fn new() -> Self {
        CodeHighlighter {
            grammars: &*GRAMMARS,
            languages: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_loaded(&self, lang: &str) -> bool {
        let languages = self.languages.read().unwrap_or_else(|e| e.into_inner());
        languages.contains_key(lang)
    }

    pub fn preload(&self, lang: &str) -> io::Result<()> {
        self.grammar(lang).map(|_| ())
    }

    pub fn highlight(&self, code: &str, lang: &str) -> io::Result<String> {
        let syntax = self.grammar(lang)?;
        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            self.grammars,
            ClassStyle::Spaced,
        );

        for line in code.trim().lines() {
            if let Err(e) = generator.parse_html_for_line_which_includes_newline(&format!("{}\n", line)) {
                return Err(io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Error highlighting {} code: {}", lang, e),
                ));
            }
        }

        Ok(generator.finalize().trim().to_string())
    }

    fn grammar(&self, lang: &str) -> io::Result<&'static SyntaxReference> {
        let grammars: &'static SyntaxSet = self.grammars;

        {
            let languages = self.languages.read().unwrap_or_else(|e| e.into_inner());
            if let Some(name) = languages.get(lang) {
                if let Some(syntax) = grammars.find_syntax_by_name(name) {
                    return Ok(syntax);
                }
            }
        }

        debug!("Loading grammar for language {}", lang);
        let syntax = match grammars.find_syntax_by_token(lang) {
            Some(syntax) => syntax,
            None => return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("Unknown language for code highlighting: {}", lang),
            )),
        };

        let mut languages = self.languages.write().unwrap_or_else(|e| e.into_inner());
        languages.entry(lang.to_string()).or_insert_with(|| syntax.name.clone());

        Ok(syntax)
    }
}
