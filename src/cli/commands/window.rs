use crate::config::Config;
use crate::core::scheduler::RunWindow;
use crate::errors::AppResult;
use crate::models::record::TIMESTAMP_FORMAT;
use crate::utils::{Clock, SystemClock};

/// Handle the `window` command
pub fn handle(cfg: &Config) -> AppResult<()> {
    let settings = cfg.settings()?;
    let now = SystemClock::new(settings.timezone).now();
    let window = RunWindow::compute(now, settings.alignment_minute, settings.safety_margin_secs);

    println!("now:       {}", now.format(TIMESTAMP_FORMAT));
    println!("deadline:  {}", window.deadline.format(TIMESTAMP_FORMAT));
    println!("remaining: {}", window.seconds());
    if window.is_empty() {
        println!("(a run started now would be skipped)");
    }
    Ok(())
}
