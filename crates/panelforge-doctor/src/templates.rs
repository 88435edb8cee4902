#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::Args;
use panelforge_layout::{Size, TemplateCatalog};
use serde_json::{Value, json};

use crate::error::Result;
use crate::util::{ensure_exists, load_config};

#[derive(Debug, Clone, Args)]
pub struct TemplatesArgs {
    /// Catalog JSON (`{"templates": [...]}`); the built-in presets otherwise.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Editor config whose page size the layouts are scaled to.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn load_catalog(path: Option<&std::path::Path>) -> Result<TemplateCatalog> {
    match path {
        Some(path) => {
            ensure_exists(path)?;
            let text = std::fs::read_to_string(path)?;
            Ok(TemplateCatalog::from_json_str(&text)?)
        }
        None => Ok(TemplateCatalog::builtin()),
    }
}

/// One JSON object per template, with its layout scaled to `page`.
#[must_use]
pub fn describe_catalog(catalog: &TemplateCatalog, page: Size, min_size: i32) -> Value {
    let templates: Vec<Value> = catalog
        .iter()
        .map(|template| {
            json!({
                "id": template.id,
                "name": template.name,
                "style": template.style,
                "panels": template.panels.len(),
                "layout": template.layout_for(page, min_size),
            })
        })
        .collect();
    json!({
        "page": page,
        "count": templates.len(),
        "templates": templates,
    })
}

pub fn run_templates(args: TemplatesArgs) -> Result<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;
    let rules = load_config(args.config.as_deref())?.layout_rules();
    let report = describe_catalog(&catalog, rules.page_size, rules.min_size);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
