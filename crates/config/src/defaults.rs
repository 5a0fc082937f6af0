pub fn default_enabled() -> bool {
    true
}

pub fn default_symbol() -> String {
    "$SPX.X".to_string()
}

pub fn default_poll_interval_seconds() -> u64 {
    5
}

pub fn default_archive_path() -> String {
    "data/snapshots.jsonl".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}

pub fn default_log_filter() -> String {
    "info,gamma_engine=info".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}
