use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use spdlog::info;

use crate::post_list::{dir_name, PostList};
use crate::post_metadata::{post_folder_name, write_metadata, PostMetadata, MARKDOWN_FILE};
use crate::text_utils::{date_part, parse_created_at};

/// Content of `<name>.meta.json` in the legacy layout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyMetadata {
    pub created_at: String,
    pub tags: Vec<String>,
    pub title: String,
}

/// A legacy post is a directory `<name>` holding `<name>.meta.json` and `<name>.md`
pub struct LegacyPost {
    pub name: String,
    pub dir: PathBuf,
}

impl LegacyPost {
    pub fn from_dir(dir: &Path) -> Result<LegacyPost> {
        let name = dir_name(dir)?;
        Ok(LegacyPost {
            name,
            dir: dir.to_path_buf(),
        })
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(format!("{}.meta.json", self.name))
    }

    pub fn markdown_path(&self) -> PathBuf {
        self.dir.join(format!("{}.md", self.name))
    }

    pub fn read_metadata(&self) -> Result<LegacyMetadata> {
        let path = self.meta_path();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Error reading legacy metadata {}", path.display()))?;
        let metadata = serde_json::from_str::<LegacyMetadata>(&text)
            .with_context(|| format!("Error parsing legacy metadata {}", path.display()))?;
        Ok(metadata)
    }
}

/// Migrates one legacy post and returns the new post directory.
/// Running it again for the same post overwrites the same files.
pub fn migrate_post(post: &LegacyPost, posts_dir: &Path) -> Result<PathBuf> {
    let legacy = post.read_metadata()?;
    let created_at = parse_created_at(&legacy.created_at)
        .map_err(|e| anyhow!("{} - file={}", e, post.meta_path().display()))?;

    let metadata = PostMetadata::new(&legacy.title, created_at, legacy.tags, Some(post.name.clone()));
    let post_dir = posts_dir.join(post_folder_name(date_part(&legacy.created_at), &metadata.id));

    fs::create_dir_all(&post_dir)
        .with_context(|| format!("Error creating post directory {}", post_dir.display()))?;
    write_metadata(&post_dir, &metadata)?;

    let markdown_path = post.markdown_path();
    fs::copy(&markdown_path, post_dir.join(MARKDOWN_FILE))
        .with_context(|| format!("Error copying {}", markdown_path.display()))?;

    info!("Migrated {} to {}", post.name, post_dir.display());
    Ok(post_dir)
}

/// Migrates every legacy post found under `legacy_dir`. Stops at the first failure, posts
/// migrated before it are left in place.
pub fn migrate_legacy(legacy_dir: &Path, posts_dir: &Path) -> Result<Vec<PathBuf>> {
    let dirs = PostList::new(legacy_dir).retrieve_sorted_dirs()
        .with_context(|| format!("Error listing legacy posts in {}", legacy_dir.display()))?;

    fs::create_dir_all(posts_dir)
        .with_context(|| format!("Error creating posts directory {}", posts_dir.display()))?;

    let mut migrated = vec![];
    for dir in dirs {
        let post = LegacyPost::from_dir(&dir)?;
        migrated.push(migrate_post(&post, posts_dir)?);
    }

    info!("Migrated {} legacy posts", migrated.len());
    Ok(migrated)
}
