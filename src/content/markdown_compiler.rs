use std::io;
use std::mem;

use lazy_static::lazy_static;
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use quick_xml::escape::partial_escape;

use crate::content::heading::render_heading;
use crate::content::highlight::CodeHighlighter;

lazy_static! {
    static ref DEFAULT_COMPILER: MarkdownCompiler<PostRules> = MarkdownCompiler::new(PostRules::new());
}

/// Compiles a post with the process wide compiler. Grammars loaded by one post are reused by
/// the next ones.
pub fn compile_markdown(markdown: &str) -> io::Result<String> {
    DEFAULT_COMPILER.compile(markdown)
}

/// Block constructs whose html can be replaced. Anything not listed here, or not overridden,
/// is written by the markdown engine.
pub trait RenderRules {
    /// `text` is the heading content as escaped plain text.
    fn heading(&self, text: &str, level: usize) -> String {
        format!("<h{level}>{text}</h{level}>\n", level = level, text = text)
    }

    fn code_block(&self, code: &str, lang: Option<&str>) -> io::Result<String> {
        Ok(plain_code_block(code, lang))
    }
}

pub fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            partial_escape(lang),
            partial_escape(code)
        ),
        None => format!("<pre><code>{}</code></pre>\n", partial_escape(code)),
    }
}

/// Rules used for blog posts: anchored headings and highlighted code.
pub struct PostRules {
    highlighter: CodeHighlighter,
}

impl Default for PostRules {
    fn default() -> Self {
        Self::new()
    }
}

impl PostRules {
    pub fn new() -> Self {
        PostRules {
            highlighter: CodeHighlighter::new(),
        }
    }

    pub fn highlighter(&self) -> &CodeHighlighter {
        &self.highlighter
    }
}

impl RenderRules for PostRules {
    fn heading(&self, text: &str, level: usize) -> String {
        render_heading(text, level)
    }

    fn code_block(&self, code: &str, lang: Option<&str>) -> io::Result<String> {
        // Blocks without language are not highlighted
        let Some(lang) = lang else {
            return Ok(plain_code_block(code, None));
        };

        let highlighted = self.highlighter.highlight(code, lang)?;
        Ok(format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            partial_escape(lang),
            highlighted
        ))
    }
}

enum Capture {
    Idle,
    Heading(usize, String),
    Code(Option<String>, String),
}

pub struct MarkdownCompiler<R: RenderRules = PostRules> {
    rules: R,
}

impl<R: RenderRules> MarkdownCompiler<R> {
    pub fn new(rules: R) -> Self {
        MarkdownCompiler {
            rules,
        }
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// GFM tables, strikethrough and task lists. No smart punctuation, raw html is kept as is and
    /// a single newline does not break the line.
    pub fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }

    pub fn compile(&self, markdown: &str) -> io::Result<String> {
        let parser = Parser::new_ext(markdown, Self::options());
        let events = self.apply_rules(parser)?;

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        Ok(output)
    }

    // Overridden blocks are replaced by a single raw html event, so the engine keeps writing
    // everything else with its own state.
    fn apply_rules<'a>(&self, events: impl Iterator<Item = Event<'a>>) -> io::Result<Vec<Event<'a>>> {
        let mut output = vec![];
        let mut capture = Capture::Idle;

        for event in events {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    capture = Capture::Heading(level as usize, String::new());
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    capture = Capture::Code(lang, String::new());
                }
                Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::CodeBlock) => {
                    let rendered = match mem::replace(&mut capture, Capture::Idle) {
                        Capture::Heading(level, text) => self.rules.heading(&partial_escape(text.as_str()), level),
                        Capture::Code(lang, code) => self.rules.code_block(&code, lang.as_deref())?,
                        Capture::Idle => continue,
                    };
                    if !rendered.is_empty() {
                        output.push(Event::Html(rendered.into()));
                    }
                }
                event => match &mut capture {
                    Capture::Idle => output.push(event),
                    Capture::Heading(_, text) | Capture::Code(_, text) => match event {
                        Event::Text(t) | Event::Code(t) => text.push_str(&t),
                        Event::SoftBreak | Event::HardBreak => text.push(' '),
                        _ => {}
                    },
                },
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use regex::Regex;

    use crate::content::heading::decode_entities;
    use crate::test_data::POST_MARKDOWN;

    use super::*;

    struct EngineRules;

    impl RenderRules for EngineRules {}

    fn compile(markdown: &str) -> io::Result<String> {
        MarkdownCompiler::new(PostRules::new()).compile(markdown)
    }

    #[test]
    fn test_full_post() {
        let html = compile(POST_MARKDOWN).unwrap();
        assert_eq!(html, r##"<p>How to be a great software engineer?</p>
<p>Someone asked me this question today and I did not have an answer. After thinking for a while, I came up with a list of what I try to do myself.</p>
<h2><a href="#non-technical" id="non-technical"></a><span>Non technical</span></h2>
<h3><a href="#have-a-honest-image-of-yourself" id="have-a-honest-image-of-yourself"></a><span>Have a honest image of yourself</span></h3>
<p>You finished university and learned a lot. You solved many hard problems.
Some day in your life, you will find that you are not. <strong>The earlier you find that, the better.</strong></p>
"##);
        assert!(!html.contains("<h1"));
        assert!(!html.contains("What I learned"));
    }

    #[test]
    fn test_level_one_heading_is_dropped() {
        let html = compile("# Title\n\nBody\n\n# Another title\n").unwrap();
        assert_eq!(html, "<p>Body</p>\n");

        let html = compile("Title\n=====\n\nBody\n").unwrap();
        assert_eq!(html, "<p>Body</p>\n");
    }

    #[test]
    fn test_heading_levels() {
        for level in 2..=6 {
            let markdown = format!("{} Deep dive\n", "#".repeat(level));
            let html = compile(&markdown).unwrap();
            assert_eq!(html, format!(
                "<h{0}><a href=\"#deep-dive\" id=\"deep-dive\"></a><span>Deep dive</span></h{0}>\n",
                level
            ));
        }
    }

    #[test]
    fn test_heading_inline_markup_is_flattened() {
        let html = compile("## The `compile` *call*\n").unwrap();
        assert_eq!(html, "<h2><a href=\"#the-compile-call\" id=\"the-compile-call\"></a><span>The compile call</span></h2>\n");
    }

    #[test]
    fn test_heading_entities() {
        let html = compile("## Tom &amp; Jerry\n").unwrap();
        assert_eq!(html, "<h2><a href=\"#tom-jerry\" id=\"tom-jerry\"></a><span>Tom &amp; Jerry</span></h2>\n");

        let html = compile("## Option&lt;T&gt;\n").unwrap();
        assert_eq!(html, "<h2><a href=\"#option-t\" id=\"option-t\"></a><span>Option&lt;T&gt;</span></h2>\n");
    }

    #[test]
    fn test_duplicated_headings_share_id() {
        let html = compile("## Notes\n\n## Notes\n").unwrap();
        assert_eq!(html.matches("id=\"notes\"").count(), 2);
    }

    #[test]
    fn test_highlighted_code_block() {
        let html = compile("```rust\nfn main() {}\n```\n").unwrap();
        let highlighted = CodeHighlighter::new().highlight("fn main() {}", "rust").unwrap();
        assert_eq!(html, format!("<pre><code class=\"language-rust\">{}</code></pre>\n", highlighted));
    }

    #[test]
    fn test_info_string_uses_first_word() {
        let html = compile("```rust ignore\nlet a = 1;\n```\n").unwrap();
        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
    }

    #[test]
    fn test_code_block_without_language() {
        let html = compile("```\n<b>x</b>\n```\n").unwrap();
        assert_eq!(html, "<pre><code>&lt;b&gt;x&lt;/b&gt;\n</code></pre>\n");

        let html = compile("    indented & code\n").unwrap();
        assert_eq!(html, "<pre><code>indented &amp; code\n</code></pre>\n");
    }

    #[test]
    fn test_unknown_language_fails_compile() {
        let err = compile("Some text\n\n```klingon\nqapla'\n```\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_fixed_options() {
        assert_eq!(compile("one\ntwo\n").unwrap(), "<p>one\ntwo</p>\n");
        assert_eq!(compile("a -- b\n").unwrap(), "<p>a -- b</p>\n");
        assert_eq!(compile("~~gone~~\n").unwrap(), "<p><del>gone</del></p>\n");

        let html = compile("<div class=\"note\">kept</div>\n").unwrap();
        assert!(html.contains("<div class=\"note\">kept</div>"));

        let html = compile("- [x] done\n- [ ] todo\n").unwrap();
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn test_tables() {
        let html = compile("| a | b |\n|---|---|\n| 1 | 2 |\n").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>a</th>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("</table>"));
    }

    #[test]
    fn test_paragraph_text_round_trip() {
        let markdown = "Plain text with 5 < 6 & friends.\n\nA second paragraph\nspanning two lines.\n";
        let html = compile(markdown).unwrap();

        let tags = Regex::new(r"<[^>]+>").unwrap();
        let text = tags.replace_all(&html, " ");
        let text = decode_entities(&text);
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&text), normalize(markdown));
    }

    #[test]
    fn test_engine_rules_fall_back_to_defaults() {
        let compiler = MarkdownCompiler::new(EngineRules);
        assert_eq!(compiler.compile("# Title\n").unwrap(), "<h1>Title</h1>\n");
        assert_eq!(compiler.compile("```klingon\nx\n```\n").unwrap(), "<pre><code class=\"language-klingon\">x\n</code></pre>\n");
    }

    #[test]
    fn test_default_compiler_reuses_grammars() {
        let first = compile_markdown("```python\nx = 1\n```\n").unwrap();
        let second = compile_markdown("```python\nx = 1\n```\n").unwrap();
        assert_eq!(first, second);
        assert!(DEFAULT_COMPILER.rules().highlighter().is_loaded("python"));
    }
}
