use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use spdlog::info;

use crate::post_list::PostList;
use crate::post_metadata::{read_metadata, PostMetadata};

pub const PERMANENT_REDIRECT: u16 = 301;

/// `/posts/foo_bar_baz` => `/posts/foo-bar-baz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub destination: String,
    pub source: String,
    #[serde(rename = "type")]
    pub status: u16,
}

impl RedirectRule {
    /// Only posts that came from the legacy layout get a rule
    pub fn from_metadata(metadata: &PostMetadata) -> Option<RedirectRule> {
        let legacy_name = metadata.legacy_name.as_ref()?;
        Some(RedirectRule {
            destination: format!("posts/{}", metadata.id),
            source: format!("posts/{}", legacy_name),
            status: PERMANENT_REDIRECT,
        })
    }
}

/// Rules for every post under `posts_dir`, in directory listing order.
pub fn collect_redirect_rules(posts_dir: &Path) -> Result<Vec<RedirectRule>> {
    let dirs = PostList::new(posts_dir).retrieve_dirs()
        .with_context(|| format!("Error listing posts in {}", posts_dir.display()))?;

    let mut rules = vec![];
    for dir in dirs {
        let metadata = read_metadata(&dir)?;
        if let Some(rule) = RedirectRule::from_metadata(&metadata) {
            info!("Redirecting {} to {}", rule.source, rule.destination);
            rules.push(rule);
        }
    }

    Ok(rules)
}

/// Recomputes all rules and replaces `output` with them.
pub fn generate_redirect_rules(posts_dir: &Path, output: &Path) -> Result<Vec<RedirectRule>> {
    let rules = collect_redirect_rules(posts_dir)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Error creating data directory {}", parent.display()))?;
    }

    let text = serde_yaml::to_string(&rules).context("Error serializing redirect rules")?;
    fs::write(output, text)
        .with_context(|| format!("Error writing redirect rules {}", output.display()))?;

    info!("Wrote {} redirect rules to {}", rules.len(), output.display());
    Ok(rules)
}
