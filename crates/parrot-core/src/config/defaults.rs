//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Parrot".to_string()
}

pub fn default_data_dir() -> String {
    "~/.parrot".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_deny_message() -> String {
    "Not permitted.".to_string()
}

pub fn default_db_path() -> String {
    "~/.parrot/data/parrot.db".to_string()
}

pub fn default_reply_delay_secs() -> u64 {
    3
}

pub fn default_country_code() -> String {
    "91".to_string()
}

pub fn default_match_mode() -> String {
    "first".to_string()
}

pub fn default_send_timeout_secs() -> u64 {
    30
}

pub fn default_poll_interval_secs() -> u64 {
    2
}
