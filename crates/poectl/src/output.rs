//! Terminal output: the plan table and the interactive confirmation.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use poectl_core::{Action, Confirmer, CoreError, DesiredState};

// ── Color ────────────────────────────────────────────────────────────

/// Color only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

// ── Plan rendering ───────────────────────────────────────────────────

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Target")]
    target: String,
}

impl From<&Action> for PlanRow {
    fn from(a: &Action) -> Self {
        Self {
            port: a.port_index,
            name: a.port_name.clone(),
            current: a.from_mode.clone(),
            target: a.target_mode.clone(),
        }
    }
}

/// Header line plus a table of the pending changes.
pub fn render_plan(actions: &[Action], color: bool) -> String {
    let verb = match actions.first().map(|a| a.direction) {
        Some(DesiredState::Enable) if color => "enable".green().bold().to_string(),
        Some(DesiredState::Disable) if color => "disable".red().bold().to_string(),
        Some(direction) => direction.to_string(),
        None => "change".into(),
    };

    let rows: Vec<PlanRow> = actions.iter().map(PlanRow::from).collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();

    format!("About to {verb} PoE on {} ports:\n{table}", actions.len())
}

// ── Confirmation ─────────────────────────────────────────────────────

/// Shows the plan on stdout, then asks on the terminal unless `--yes`.
#[derive(Debug, Clone, Copy)]
pub struct PromptConfirmer {
    pub yes: bool,
    pub color: bool,
}

impl Confirmer for PromptConfirmer {
    async fn confirm(&self, actions: &[Action]) -> Result<bool, CoreError> {
        let plan = render_plan(actions, self.color);
        {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{plan}");
        }

        if self.yes {
            println!("Proceeding automatically with --yes flag...");
            return Ok(true);
        }

        // The prompt blocks on stdin; keep it off the runtime so Ctrl-C
        // can still abort the run.
        tokio::task::spawn_blocking(|| {
            dialoguer::Confirm::new()
                .with_prompt("Proceed?")
                .default(false)
                .interact()
        })
        .await
        .map_err(|e| CoreError::Prompt {
            message: e.to_string(),
        })?
        .map_err(prompt_error)
    }
}

/// The prompt holds the terminal in raw mode, so Ctrl-C arrives as a read
/// error instead of a signal.
fn prompt_error(err: dialoguer::Error) -> CoreError {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
            CoreError::Interrupted
        }
        dialoguer::Error::IO(e) => CoreError::Prompt {
            message: e.to_string(),
        },
    }
}
