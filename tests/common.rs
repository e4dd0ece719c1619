#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::DateTime;
use chrono_tz::Tz;
use statelog::core::journal::Journal;
use statelog::core::rotation::{RetentionPolicy, Rotator};
use statelog::core::store;
use statelog::models::LogLayout;
use statelog::utils::time::local_from_str;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const STEM: &str = "mqtt_log";

pub fn tz() -> Tz {
    chrono_tz::Europe::Prague
}

/// Local wall-clock instant in the test zone.
pub fn at(wall: &str) -> DateTime<Tz> {
    local_from_str(tz(), wall).expect("valid local time")
}

pub fn layout(dir: &Path) -> LogLayout {
    LogLayout::new(dir, STEM).expect("layout")
}

pub fn journal(dir: &Path, retention_days: u32, policy: RetentionPolicy) -> Journal {
    Journal::new(Rotator::new(layout(dir), tz(), retention_days, policy))
}

/// Names of every file in `dir`.
pub fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().to_string())
        .collect()
}

pub fn rows(path: &Path) -> Vec<[String; 3]> {
    store::read_rows(path).expect("read rows")
}

pub fn row(time: &str, topic: &str, value: &str) -> [String; 3] {
    [time.to_string(), topic.to_string(), value.to_string()]
}

/// Archive file for `date` holding the given data rows.
pub fn write_archive(dir: &Path, date: &str, data: &[[String; 3]]) {
    let mut content = String::from("time;topic;value\n");
    for r in data {
        content.push_str(&r.join(";"));
        content.push('\n');
    }
    fs::write(dir.join(format!("{STEM}_{date}.csv")), content).expect("write archive");
}

pub fn statelog() -> Command {
    let mut cmd = cargo_bin_cmd!("statelog");
    for key in [
        "MQTT_HOST",
        "MQTT_PORT",
        "MQTT_USER",
        "MQTT_PASS",
        "MQTT_TOPIC",
        "STATELOG_TZ",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// A complete configuration file pointing at `log_dir`.
pub fn write_full_config(path: &Path, log_dir: &Path) {
    let yaml = format!(
        "host: broker.invalid\n\
         port: 1883\n\
         username: logger\n\
         password: s3cret-value\n\
         topic: home/door/state\n\
         timezone: Europe/Prague\n\
         alignment_minute: 47\n\
         safety_margin_secs: 60\n\
         retention_days: 2\n\
         log_dir: \"{}\"\n",
        log_dir.display()
    );
    fs::write(path, yaml).expect("write config");
}
