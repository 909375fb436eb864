use std::time::Duration;

use crate::config::{ConfigError, ConfigResult};

/// 解析 `500ms`、`180s`、`2m`、`1h` 或纯秒数形式的时长
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let s = input.trim();
    let invalid = || ConfigError::Validation(format!("Invalid duration: {:?}", input));

    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    let duration = match unit.trim() {
        "" | "s" => Duration::from_secs(value),
        "ms" => Duration::from_millis(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(3600)),
        _ => return Err(invalid()),
    };
    Ok(duration)
}
