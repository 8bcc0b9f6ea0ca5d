/// Parse a duration like `30s`, `10m`, `2h`, `1d`, `1h30m`, or plain seconds.
/// Zero and overflowing values are rejected.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    if let Ok(seconds) = compact.parse::<u64>() {
        return (seconds > 0).then_some(seconds);
    }

    let mut total = 0_u64;
    let mut digits = String::new();

    for ch in compact.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let amount = digits.parse::<u64>().ok()?;
        digits.clear();
        total = total.checked_add(amount.checked_mul(unit_seconds(ch)?)?)?;
    }

    // A bare number after a unit segment (`1m30`) is ambiguous.
    if !digits.is_empty() {
        return None;
    }

    (total > 0).then_some(total)
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit.to_ascii_lowercase() {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        _ => None,
    }
}

/// Parse a raw id or a mention wrapped in one of `prefixes` (e.g. `<@&`).
fn parse_snowflake(raw: &str, prefixes: &[&str]) -> Option<u64> {
    let value = raw.trim();

    let inner = prefixes
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix)?.strip_suffix('>'))
        .unwrap_or(value);

    inner.parse::<u64>().ok().filter(|id| *id > 0)
}

/// Accepts `123`, `<@123>` or `<@!123>`.
pub fn parse_user_id(raw: &str) -> Option<u64> {
    parse_snowflake(raw, &["<@!", "<@"])
}

/// Accepts `123` or `<@&123>`.
pub fn parse_role_id(raw: &str) -> Option<u64> {
    parse_snowflake(raw, &["<@&"])
}

/// Accepts `123` or `<#123>`.
pub fn parse_channel_id(raw: &str) -> Option<u64> {
    parse_snowflake(raw, &["<#"])
}

/// Parse `on`/`off` style switches.
pub fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "enable" | "enabled" => Some(true),
        "off" | "false" | "no" | "disable" | "disabled" => Some(false),
        _ => None,
    }
}

/// Whether an optional free-text argument asks to clear a setting.
pub fn is_clear_keyword(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "clear" | "none" | "off" | "reset"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration_seconds("45"), Some(45));
        assert_eq!(parse_duration_seconds("30s"), Some(30));
        assert_eq!(parse_duration_seconds("10M"), Some(600));
        assert_eq!(parse_duration_seconds("1h30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("1d 2h"), Some(93_600));
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("0"), None);
        assert_eq!(parse_duration_seconds("0s"), None);
        assert_eq!(parse_duration_seconds("m"), None);
        assert_eq!(parse_duration_seconds("5w"), None);
        assert_eq!(parse_duration_seconds("1m30"), None);
        assert_eq!(parse_duration_seconds("99999999999999999999d"), None);
    }

    #[test]
    fn parses_mentions_and_raw_ids() {
        assert_eq!(parse_user_id("123"), Some(123));
        assert_eq!(parse_user_id("<@123>"), Some(123));
        assert_eq!(parse_user_id("<@!123>"), Some(123));
        assert_eq!(parse_role_id("<@&77>"), Some(77));
        assert_eq!(parse_channel_id(" <#9> "), Some(9));
        assert_eq!(parse_channel_id("<@&9>"), None);
        assert_eq!(parse_role_id("0"), None);
        assert_eq!(parse_user_id("someone"), None);
    }

    #[test]
    fn parses_toggles_and_clear() {
        assert_eq!(parse_toggle("ON"), Some(true));
        assert_eq!(parse_toggle("off"), Some(false));
        assert_eq!(parse_toggle("maybe"), None);
        assert!(is_clear_keyword("Clear"));
        assert!(!is_clear_keyword("#general"));
    }
}
