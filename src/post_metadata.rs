use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spdlog::info;

use crate::text_utils::{slugify, sort_tags};

pub const METADATA_FILE: &str = "metadata.yaml";
pub const MARKDOWN_FILE: &str = "markdown.md";

/// Content of `metadata.yaml`. Fields are declared in alphabetical order, which is the order
/// they are written in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    pub created_at: DateTime<Utc>,
    pub id: String,
    pub legacy_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub title: String,
}

impl PostMetadata {
    pub fn new(title: &str, created_at: DateTime<Utc>, tags: Vec<String>, legacy_name: Option<String>) -> Self {
        PostMetadata {
            created_at,
            id: slugify(title),
            legacy_name,
            tags: sort_tags(tags),
            title: title.to_string(),
        }
    }
}

/// `{date}-{slug}`, e.g. `2014-01-21-first-post`
pub fn post_folder_name(date: &str, slug: &str) -> String {
    format!("{}-{}", date, slug)
}

pub fn read_metadata(post_dir: &Path) -> Result<PostMetadata> {
    let path = post_dir.join(METADATA_FILE);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Error reading post metadata {}", path.display()))?;
    let metadata = serde_yaml::from_str::<PostMetadata>(&text)
        .with_context(|| format!("Error parsing post metadata {}", path.display()))?;
    Ok(metadata)
}

pub fn write_metadata(post_dir: &Path, metadata: &PostMetadata) -> Result<()> {
    let path = post_dir.join(METADATA_FILE);
    let text = serde_yaml::to_string(metadata)
        .with_context(|| format!("Error serializing post metadata for {}", metadata.id))?;
    fs::write(&path, text)
        .with_context(|| format!("Error writing post metadata {}", path.display()))?;
    Ok(())
}

fn render_body(title: &str) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "# {}", title);
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "This is a body example");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");

    buf
}

/// Creates a new post folder in the dated layout. Posts created this way have no legacy name.
pub fn new_post(posts_dir: &Path, title: &str, tags: Vec<String>, now: DateTime<Utc>) -> Result<PathBuf> {
    let metadata = PostMetadata::new(title, now, tags, None);
    if metadata.id.is_empty() {
        bail!("Title {:?} does not produce a valid post id", title);
    }

    let date = now.format("%Y-%m-%d").to_string();
    let post_dir = posts_dir.join(post_folder_name(&date, &metadata.id));
    if post_dir.join(METADATA_FILE).exists() {
        bail!("Post already exists: {}", post_dir.display());
    }

    fs::create_dir_all(&post_dir)
        .with_context(|| format!("Error creating post directory {}", post_dir.display()))?;
    write_metadata(&post_dir, &metadata)?;
    let markdown_path = post_dir.join(MARKDOWN_FILE);
    fs::write(&markdown_path, render_body(title))
        .with_context(|| format!("Error writing {}", markdown_path.display()))?;

    info!("Created post {}", post_dir.display());
    Ok(post_dir)
}
