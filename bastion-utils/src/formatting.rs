/// Format seconds as at most two units, largest first (e.g. `10s`, `1m 5s`, `1d 2h`).
pub fn format_compact_duration(total_seconds: u64) -> String {
    const UNITS: [(u64, char); 4] = [(86_400, 'd'), (3_600, 'h'), (60, 'm'), (1, 's')];

    let mut remaining = total_seconds;
    let parts: Vec<String> = UNITS
        .iter()
        .filter_map(|&(size, suffix)| {
            let amount = remaining / size;
            remaining %= size;
            (amount > 0).then(|| format!("{amount}{suffix}"))
        })
        .take(2)
        .collect();

    if parts.is_empty() {
        "0s".to_owned()
    } else {
        parts.join(" ")
    }
}

pub fn user_mention(id: u64) -> String {
    format!("<@{id}>")
}

pub fn role_mention(id: u64) -> String {
    format!("<@&{id}>")
}

pub fn channel_mention(id: u64) -> String {
    format!("<#{id}>")
}

/// Join ids as mentions, or return `empty` when there are none.
pub fn mention_list<'a, I>(ids: I, mention: fn(u64) -> String, empty: &str) -> String
where
    I: IntoIterator<Item = &'a u64>,
{
    let joined = ids
        .into_iter()
        .map(|id| mention(*id))
        .collect::<Vec<_>>()
        .join(", ");

    if joined.is_empty() {
        empty.to_owned()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(0), "0s");
        assert_eq!(format_compact_duration(10), "10s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(65), "1m 5s");
        assert_eq!(format_compact_duration(3_670), "1h 1m");
        assert_eq!(format_compact_duration(3_605), "1h 5s");
        assert_eq!(format_compact_duration(93_600), "1d 2h");
    }

    #[test]
    fn mention_lists() {
        let ids = [1_u64, 2];
        assert_eq!(mention_list(&ids, user_mention, "(empty)"), "<@1>, <@2>");
        assert_eq!(mention_list(&[], role_mention, "(empty)"), "(empty)");
        assert_eq!(channel_mention(5), "<#5>");
    }
}
