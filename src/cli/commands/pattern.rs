//! Pattern command implementations (seed, inspect and remove stored patterns).

use crate::cli::commands::open_storage;
use crate::cli::PatternCommands;
use crate::error::{Error, Result};
use crate::model::{
    NewPattern, Pattern, PostStatus, SyncStatus, PATTERN_POST_TYPE, SYNC_STATUS_META_KEY,
};
use crate::storage::{ContentStore, SqliteStorage};
use crate::sync::slugify;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

/// Output for pattern add.
#[derive(Serialize)]
struct PatternAddOutput {
    id: i64,
    slug: String,
    status: PostStatus,
    categories: Vec<String>,
    sync_status: SyncStatus,
}

/// Output for pattern list.
#[derive(Serialize)]
struct PatternListOutput {
    patterns: Vec<PatternItem>,
    count: usize,
}

#[derive(Serialize)]
struct PatternItem {
    id: i64,
    slug: String,
    title: String,
    status: PostStatus,
}

/// Output for pattern show.
#[derive(Serialize)]
struct PatternShowOutput {
    #[serde(rename = "type")]
    post_type: &'static str,
    #[serde(flatten)]
    pattern: Pattern,
    categories: Vec<String>,
    sync_status: SyncStatus,
}

/// Execute pattern commands.
pub fn execute(
    command: &PatternCommands,
    db_path: Option<&PathBuf>,
    actor: Option<&str>,
    json: bool,
) -> Result<()> {
    match command {
        PatternCommands::Add {
            title,
            content,
            slug,
            categories,
            unsynced,
            draft,
        } => {
            let status = if *draft {
                PostStatus::Draft
            } else {
                PostStatus::Publish
            };
            let sync_status = if *unsynced {
                SyncStatus::Unsynced
            } else {
                SyncStatus::Synced
            };
            let mut storage = open_storage(db_path, actor)?;
            add(
                &mut storage,
                title,
                content,
                slug.as_deref(),
                categories,
                status,
                sync_status,
                json,
            )
        }
        PatternCommands::List { all } => list(&open_storage(db_path, actor)?, *all, json),
        PatternCommands::Show { slug } => show(&open_storage(db_path, actor)?, slug, json),
        PatternCommands::Rm { slug } => remove(&mut open_storage(db_path, actor)?, slug, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    storage: &mut SqliteStorage,
    title: &str,
    content: &str,
    slug: Option<&str>,
    categories: &[String],
    status: PostStatus,
    sync_status: SyncStatus,
    json: bool,
) -> Result<()> {
    let slug = slugify(slug.unwrap_or(title));
    if slug.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "cannot derive a slug from '{title}'; pass --slug"
        )));
    }
    if content.is_empty() {
        return Err(Error::InvalidArgument("content cannot be empty".to_string()));
    }

    let pattern = NewPattern::published(&slug, title, content).with_status(status);
    let id = storage.create(&pattern)?;

    let mut names: Vec<String> = Vec::new();
    let mut term_ids = Vec::new();
    for name in categories.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if names.iter().any(|n| n == name) {
            continue;
        }
        term_ids.push(storage.find_or_create_term(name)?);
        names.push(name.to_string());
    }
    if !term_ids.is_empty() {
        storage.assign_terms(id, &term_ids)?;
    }
    if sync_status == SyncStatus::Unsynced {
        storage.set_meta(id, SYNC_STATUS_META_KEY, sync_status.as_str())?;
    }

    if json {
        let output = PatternAddOutput {
            id,
            slug,
            status,
            categories: names,
            sync_status,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Created pattern {slug} (#{id})");
    }

    Ok(())
}

fn list(storage: &SqliteStorage, all: bool, json: bool) -> Result<()> {
    let patterns = storage.list_patterns(all)?;

    if json {
        let items: Vec<PatternItem> = patterns
            .into_iter()
            .map(|p| PatternItem {
                id: p.id,
                slug: p.slug,
                title: p.title,
                status: p.status,
            })
            .collect();
        let output = PatternListOutput {
            count: items.len(),
            patterns: items,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if patterns.is_empty() {
        println!("No patterns found.");
        return Ok(());
    }

    println!("Patterns ({}):", patterns.len());
    for p in &patterns {
        let draft = if p.status == PostStatus::Draft {
            format!(" {}", "[draft]".dimmed())
        } else {
            String::new()
        };
        println!("  #{:<5} {:<32} {}{draft}", p.id, p.slug, p.title);
    }

    Ok(())
}

fn show(storage: &SqliteStorage, slug: &str, json: bool) -> Result<()> {
    let pattern = storage
        .find_by_slug(slug)?
        .ok_or_else(|| Error::PatternNotFound {
            slug: slug.to_string(),
        })?;
    let categories = storage.get_terms(pattern.id)?;
    let sync_status = SyncStatus::from_raw(storage.get_meta(pattern.id, SYNC_STATUS_META_KEY)?.as_deref());

    if json {
        let output = PatternShowOutput {
            post_type: PATTERN_POST_TYPE,
            pattern,
            categories,
            sync_status,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", pattern.title.bold(), format!("(#{})", pattern.id).dimmed());
    println!("  Slug:       {}", pattern.slug);
    println!("  Status:     {}", pattern.status.as_str());
    println!("  Sync:       {sync_status}");
    if categories.is_empty() {
        println!("  Categories: -");
    } else {
        println!("  Categories: {}", categories.join(", "));
    }
    println!();
    println!("{}", pattern.content);

    Ok(())
}

fn remove(storage: &mut SqliteStorage, slug: &str, json: bool) -> Result<()> {
    let pattern = storage
        .find_by_slug(slug)?
        .ok_or_else(|| Error::PatternNotFound {
            slug: slug.to_string(),
        })?;
    storage.delete(pattern.id)?;

    if json {
        let output = serde_json::json!({
            "deleted": true,
            "id": pattern.id,
            "slug": pattern.slug,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Deleted pattern {} (#{})", pattern.slug, pattern.id);
    }

    Ok(())
}
