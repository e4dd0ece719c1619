use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        if *print_config {
            println!("📄 Current configuration:\n");
            println!("{}", cfg.masked().to_yaml()?);
        }

        if *check {
            let settings = cfg.settings()?;
            success(format!(
                "Configuration is complete: topic '{}', zone {}, {} day(s) retained in {}",
                settings.broker.topic,
                settings.timezone,
                settings.retention_days,
                settings.log_dir.display()
            ));
        }
    }

    Ok(())
}
