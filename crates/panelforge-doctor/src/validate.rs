#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::Args;
use panelforge_layout::{LayoutRules, PageSnapshot, RestoreMode, RestoreReport, overlaps};
use serde_json::{Value, json};

use crate::error::{DoctorError, Result};
use crate::util::{load_config, read_json};

/// Exit code when a page loads only after clamping.
pub const EXIT_CLAMPED: i32 = 3;

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Page snapshot (JSON).
    #[arg(long)]
    pub page: PathBuf,

    /// Editor config (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail when any panel had to be clamped.
    #[arg(long)]
    pub strict: bool,
}

/// Check a saved page against the geometry rules.
///
/// Schema and duplicate-id problems are hard errors. Out-of-bounds or
/// undersized panels are listed with the rectangle they were clamped to.
/// Overlapping panels are reported but allowed.
pub fn validate_page(snapshot: &PageSnapshot, rules: &LayoutRules) -> Result<Value> {
    snapshot.validate()?;
    let mut report = RestoreReport::default();
    let page = snapshot
        .clone()
        .into_page(rules.min_size, RestoreMode::Clamp, &mut report)?;

    let clamped: Vec<Value> = report
        .clamped
        .iter()
        .map(|entry| {
            json!({
                "panel": entry.panel,
                "stored": entry.stored,
                "restored": entry.restored,
            })
        })
        .collect();

    let panels = page.panels();
    let mut overlapping = Vec::new();
    for (index, a) in panels.iter().enumerate() {
        for b in &panels[index + 1..] {
            if overlaps(a.rect, b.rect, 0) {
                overlapping.push(json!([a.id, b.id]));
            }
        }
    }

    Ok(json!({
        "status": if clamped.is_empty() { "ok" } else { "clamped" },
        "page": snapshot.id,
        "size": snapshot.size,
        "panels": panels.len(),
        "clamped": clamped,
        "overlapping": overlapping,
        "layout_hash": format!("{:016x}", PageSnapshot::capture(&page).layout_hash()),
    }))
}

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let snapshot: PageSnapshot = read_json(&args.page)?;
    let report = validate_page(&snapshot, &config.layout_rules())?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    let clamped = report["clamped"].as_array().map_or(0, Vec::len);
    if args.strict && clamped > 0 {
        return Err(DoctorError::exit(
            EXIT_CLAMPED,
            format!("{clamped} panel(s) needed clamping"),
        ));
    }
    Ok(())
}
