//! Command-line front end: load a block tree and/or an HTML snapshot, run
//! the extractor, render JSON.

use anyhow::{Context, Result, bail};
use blockcard_core::{ExtractionConfig, ExtractionResult, to_json_string};
use blockcard_extract::{CardMeta, ContentExtractor, MemoryBlockSource, RootElement};
use clap::{ArgGroup, Parser};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Block share card extractor
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["tree", "html"])))]
pub struct Args {
    /// JSON block tree (one block or an array of blocks)
    #[arg(long, env = "BLOCKCARD_TREE")]
    pub tree: Option<PathBuf>,

    /// HTML snapshot of the share root
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Block uid of the share root, overriding the markup
    #[arg(short, long)]
    pub uid: Option<String>,

    /// YAML extraction config
    #[arg(short, long, env = "BLOCKCARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print compact JSON instead of pretty JSON
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub compact: bool,

    /// Include card metadata and the image file name
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub meta: bool,
}

/// What the CLI prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOutput {
    #[serde(flatten)]
    pub result: ExtractionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<CardMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

async fn read_file(path: &Path, what: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {} from {}", what, path.display()))
}

/// Run one extraction and return the rendered JSON.
pub async fn run(args: &Args) -> Result<String> {
    if args.tree.is_none() && args.html.is_none() {
        bail!("nothing to extract: pass --tree and/or --html");
    }

    let config = match &args.config {
        Some(path) => ExtractionConfig::load(path).await?,
        None => ExtractionConfig::default(),
    };

    let html = match &args.html {
        Some(path) => read_file(path, "HTML snapshot").await?,
        None => String::new(),
    };
    let mut root = RootElement::from_html(html);
    if let Some(uid) = &args.uid {
        root = root.with_uid(uid.clone());
    }

    let extractor = match &args.tree {
        Some(path) => {
            let json = read_file(path, "block tree").await?;
            let source = MemoryBlockSource::from_json(&json)
                .with_context(|| format!("Invalid block tree in {}", path.display()))?;
            log::debug!("Loaded {} blocks from {}", source.len(), path.display());
            ContentExtractor::new(source, config.clone())
        }
        None => ContentExtractor::dom_only(config.clone()),
    };

    let result = extractor.extract_block_content(&root).await;
    log::info!(
        "Extracted {} groups and {} images",
        result.segments.len(),
        result.images.len()
    );

    let meta = args.meta.then(|| {
        let uid = root
            .resolve_uid(&config)
            .unwrap_or_else(|| "unknown".to_string());
        CardMeta::from_html(&root.html, uid)
    });
    let output = CardOutput {
        result,
        file_name: meta.as_ref().map(CardMeta::file_name),
        meta,
    };

    Ok(to_json_string(&output, "card output", !args.compact)?)
}
