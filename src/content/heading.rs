use std::borrow::Cow;

use lazy_static::lazy_static;
use quick_xml::escape::{partial_escape, resolve_html5_entity};
use regex::{Captures, Regex};

use crate::text_utils::slugify;

fn resolve_entity(entity: &str) -> Option<String> {
    if let Some(number) = entity.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => number.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    resolve_html5_entity(entity).map(str::to_string)
}

/// Decodes named (HTML5) and numeric entities one at a time. Anything that is not a known
/// entity, like a lone `&` or `&bogus;`, is kept as it came.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    lazy_static! {
        static ref ENTITY_REGEX: Regex = Regex::new(
            r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);"
        ).unwrap();
    }

    ENTITY_REGEX.replace_all(text, |caps: &Captures| {
        resolve_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
}

/// Level 1 headings are dropped, the page template prints the post title.
/// Other levels get an empty anchor followed by the text:
/// `<h2><a href="#id" id="id"></a><span>text</span></h2>`
///
/// Ids are not deduplicated, two headings with the same text share the same anchor.
pub fn render_heading(text: &str, level: usize) -> String {
    if level == 1 {
        return String::new();
    }

    let heading_text = decode_entities(text);
    let id = slugify(&heading_text);
    format!(
        "<h{level}><a href=\"#{id}\" id=\"{id}\"></a><span>{text}</span></h{level}>\n",
        level = level,
        id = id,
        text = partial_escape(&*heading_text),
    )
}
