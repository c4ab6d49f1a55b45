pub mod heading;
pub mod highlight;
pub mod markdown_compiler;

pub use markdown_compiler::{compile_markdown, MarkdownCompiler, PostRules, RenderRules};
