use crate::config::Config;
use crate::core::orchestrator::journal_for;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use crate::utils::{Clock, SystemClock};

/// Handle the `rotate` command: one reconcile pass, no connection.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let settings = cfg.settings()?;
    let journal = journal_for(&settings)?;
    let now = SystemClock::new(settings.timezone).now();

    let report = journal.reconcile(now)?;

    if let Some(archive) = &report.archived {
        let how = if report.merged { "merged into" } else { "archived as" };
        info(format!("Active file {} {}", how, archive.display()));
    }
    for removed in &report.removed {
        info(format!("Removed {}", removed.display()));
    }
    if report.trimmed_rows > 0 {
        info(format!("Trimmed {} expired rows", report.trimmed_rows));
    }
    for (path, err) in &report.failed {
        warning(format!("Could not process {}: {}", path.display(), err));
    }

    if report.is_noop() {
        success("Log directory already up to date");
    } else {
        success(format!("Rotation done: {}", journal.active_path().display()));
    }
    Ok(())
}
