use anyhow::Result;
use hostname;

pub fn my_name() -> Result<String> {
    Ok(hostname::get()?.to_string_lossy().to_string())
}

/// Host name for log lines. Falls back to a placeholder when the OS will not
/// tell us.
pub fn display_name() -> String {
    my_name().unwrap_or_else(|_| "<unknown host>".to_string())
}
