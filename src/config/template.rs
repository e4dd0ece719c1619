//! Configuration template written by `statelog init`.

/// Credentials are deliberately left blank: `config --check` fails until they
/// are filled in.
pub const TEMPLATE: &str = r#"# statelog configuration
# Environment variables MQTT_HOST, MQTT_PORT, MQTT_USER, MQTT_PASS, MQTT_TOPIC
# and STATELOG_TZ override the values below.

# --- broker (required) ---
host: localhost
port: 1883
username:
password:
topic: home/door/state

# --- scheduling (required) ---
# IANA zone used for timestamps, day rotation and hour alignment.
timezone: Europe/Prague
# Minute of every hour at which the next scheduled invocation starts.
alignment_minute: 0
# Stop this many seconds before the alignment minute.
safety_margin_secs: 60

# --- retention (required) ---
# Days of files kept on disk, today included.
retention_days: 2
# daily: keep whole files; rolling: also drop archived rows older than the horizon.
retention_policy: daily

# --- files (optional) ---
log_dir: "."
file_stem: mqtt_log
"#;
