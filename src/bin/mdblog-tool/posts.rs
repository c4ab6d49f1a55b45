use anyhow::{Context, Result};
use chrono::Utc;

use mdblog::config::Config;
use mdblog::migration::migrate_legacy;
use mdblog::post_metadata::new_post;
use mdblog::redirects::generate_redirect_rules;
use mdblog::site_data::SiteData;

use crate::NewArgs;

pub(crate) fn migrate_cmd(config: &Config) -> Result<()> {
    let migrated = migrate_legacy(&config.paths.legacy_dir, &config.paths.posts_dir)?;
    for post_dir in migrated {
        println!("{}", post_dir.display());
    }
    Ok(())
}

pub(crate) fn redirects_cmd(config: &Config) -> Result<()> {
    let output = config.redirect_rules_path();
    let rules = generate_redirect_rules(&config.paths.posts_dir, &output)?;
    println!("Wrote {} redirect rules to {}", rules.len(), output.display());
    Ok(())
}

pub(crate) fn show_redirects_cmd(config: &Config) -> Result<()> {
    let site_data = SiteData::from_config(config);
    let rules = site_data.redirect_rules()
        .with_context(|| format!("Error loading {}", config.redirect_rules_path().display()))?;
    for rule in rules.iter() {
        println!("/{} -> /{} ({})", rule.source, rule.destination, rule.status);
    }
    Ok(())
}

pub(crate) fn new_post_cmd(config: &Config, args: NewArgs) -> Result<()> {
    let tags = args.tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();
    let post_dir = new_post(&config.paths.posts_dir, &args.title, tags, Utc::now())?;
    println!("Creating dir post {}", post_dir.display());
    Ok(())
}
