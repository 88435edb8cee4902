#![forbid(unsafe_code)]

//! Scripted editing sessions.
//!
//! A script is a JSON document `{"actions": [...]}`; each action is tagged by
//! `"action"`. Panels are referred to by index rather than id: first the
//! panels already on the starting page (in z-order), then every panel the
//! script creates, in creation order. Scripts therefore stay valid whatever
//! ids the loaded project happens to use.

use std::path::PathBuf;

use clap::Args;
use panelforge_core::event::InputEvent;
use panelforge_layout::{PageSnapshot, PanelId, Rect, RestoreMode};
use panelforge_runtime::{Editor, EditorConfig, InteractionEffect};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{DoctorError, Result};
use crate::util::{load_config, read_json};

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Script of editor actions (JSON).
    #[arg(long)]
    pub script: PathBuf,

    /// Editor config (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Page snapshot to start from instead of an empty page.
    #[arg(long)]
    pub page: Option<PathBuf>,

    /// Stop at the first action that does nothing.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddPage,
    /// Route input to the page at this index.
    ActivatePage { index: usize },
    AddPanel,
    DuplicatePanel { panel: usize },
    DeletePanel { panel: usize },
    SelectPanel { panel: Option<usize> },
    SetRect { panel: usize, rect: Rect },
    BringToFront { panel: usize },
    SendToBack { panel: usize },
    ApplyTemplate { template: String },
    /// Raw pointer or keyboard input, in page units.
    Input { event: InputEvent },
    Undo,
    Redo,
}

/// Result of one script action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: String,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Drives an [`Editor`] through a script, tracking panels by creation order.
#[derive(Debug)]
pub struct Replayer {
    editor: Editor,
    created: Vec<PanelId>,
    strict: bool,
}

impl Replayer {
    #[must_use]
    pub fn new(editor: Editor) -> Self {
        let created = editor.active_page().panels().iter().map(|panel| panel.id).collect();
        Self {
            editor,
            created,
            strict: false,
        }
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub const fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Addressable panels: the starting page's, then the script's.
    #[must_use]
    pub fn created(&self) -> &[PanelId] {
        &self.created
    }

    pub fn run(&mut self, script: &Script) -> Result<Vec<StepOutcome>> {
        let mut outcomes = Vec::with_capacity(script.actions.len());
        for (step, action) in script.actions.iter().enumerate() {
            let outcome = self.step(step, action)?;
            if self.strict && !outcome.applied {
                return Err(DoctorError::Script {
                    step,
                    message: format!("{} had no effect", outcome.action),
                });
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn panel(&self, step: usize, index: usize) -> Result<PanelId> {
        self.created.get(index).copied().ok_or_else(|| DoctorError::Script {
            step,
            message: format!(
                "panel #{index} was never created ({} so far)",
                self.created.len()
            ),
        })
    }

    fn step(&mut self, step: usize, action: &Action) -> Result<StepOutcome> {
        let label = action_label(action);
        let (applied, detail) = match action {
            Action::AddPage => {
                let page = self.editor.add_page();
                (true, Some(page.to_string()))
            }
            Action::ActivatePage { index } => {
                let Some(page) = self.editor.repository().page(*index).map(|page| page.id()) else {
                    return Err(DoctorError::Script {
                        step,
                        message: format!("no page at index {index}"),
                    });
                };
                (self.editor.set_active_page(page), None)
            }
            Action::AddPanel => {
                let page = self.editor.active_page_id();
                match self.editor.add_panel(page) {
                    Some(added) => {
                        self.created.push(added.id);
                        (true, Some(format!("{} at {:?}", added.id, added.placement)))
                    }
                    None => (false, None),
                }
            }
            Action::DuplicatePanel { panel } => {
                let source = self.panel(step, *panel)?;
                match self.editor.duplicate_panel(source) {
                    Some(copy) => {
                        self.created.push(copy);
                        (true, Some(copy.to_string()))
                    }
                    None => (false, None),
                }
            }
            Action::DeletePanel { panel } => {
                let id = self.panel(step, *panel)?;
                (self.editor.delete_panel(id), None)
            }
            Action::SelectPanel { panel } => {
                let id = panel.map(|index| self.panel(step, index)).transpose()?;
                (self.editor.select(id), None)
            }
            Action::SetRect { panel, rect } => {
                let id = self.panel(step, *panel)?;
                let stored = self.editor.set_panel_rect(id, *rect);
                (stored.is_some(), stored.map(|rect| format!("{rect:?}")))
            }
            Action::BringToFront { panel } => {
                let id = self.panel(step, *panel)?;
                (self.editor.bring_to_front(id), None)
            }
            Action::SendToBack { panel } => {
                let id = self.panel(step, *panel)?;
                (self.editor.send_to_back(id), None)
            }
            Action::ApplyTemplate { template } => {
                let page = self.editor.active_page_id();
                let created = self.editor.apply_template(page, template)?;
                let detail = format!("{} panels", created.len());
                self.created.extend(created);
                (true, Some(detail))
            }
            Action::Input { event } => {
                let effect = self.editor.handle_event(event).effect;
                let applied = !matches!(effect, InteractionEffect::Noop { .. });
                (applied, Some(format!("{effect:?}")))
            }
            Action::Undo => (self.editor.undo(), None),
            Action::Redo => (self.editor.redo(), None),
        };
        Ok(StepOutcome {
            step,
            action: label.to_owned(),
            applied,
            detail,
        })
    }
}

fn action_label(action: &Action) -> &'static str {
    match action {
        Action::AddPage => "add_page",
        Action::ActivatePage { .. } => "activate_page",
        Action::AddPanel => "add_panel",
        Action::DuplicatePanel { .. } => "duplicate_panel",
        Action::DeletePanel { .. } => "delete_panel",
        Action::SelectPanel { .. } => "select_panel",
        Action::SetRect { .. } => "set_rect",
        Action::BringToFront { .. } => "bring_to_front",
        Action::SendToBack { .. } => "send_to_back",
        Action::ApplyTemplate { .. } => "apply_template",
        Action::Input { .. } => "input",
        Action::Undo => "undo",
        Action::Redo => "redo",
    }
}

/// Build the starting editor, optionally seeded with a saved page.
pub fn start_editor(config: &EditorConfig, page: Option<PageSnapshot>) -> Result<Editor> {
    let mut editor = Editor::new(config);
    if let Some(snapshot) = page {
        let placeholder = editor.active_page_id();
        let (loaded, report) = editor.load_page(snapshot, RestoreMode::Clamp)?;
        if loaded != placeholder {
            editor.set_active_page(loaded);
            editor.delete_page(placeholder)?;
        }
        if !report.is_clean() {
            tracing::warn!(clamped = report.clamped.len(), "starting page needed clamping");
        }
    }
    Ok(editor)
}

/// Replay `script` and summarise the session as JSON.
pub fn replay(
    config: &EditorConfig,
    page: Option<PageSnapshot>,
    script: &Script,
    strict: bool,
) -> Result<Value> {
    let mut replayer = Replayer::new(start_editor(config, page)?).strict(strict);
    let steps = replayer.run(script)?;
    let project = replayer.editor().to_snapshot();
    Ok(json!({
        "status": "ok",
        "steps": steps,
        "layout_hash": format!("{:016x}", project.layout_hash()),
        "project": project,
    }))
}

pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let script: Script = read_json(&args.script)?;
    let page: Option<PageSnapshot> = args.page.as_deref().map(read_json::<PageSnapshot>).transpose()?;
    let report = replay(&config, page, &script, args.strict)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
