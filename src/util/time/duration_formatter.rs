/// Renders a duration as e.g. `1d 2h 3m 4.005s`, omitting leading zero units.
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut parts: Vec<String> = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}.{millis:03}s"));

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1_500)), "1.500s");
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 1.000s");
        assert_eq!(format_duration(Duration::from_secs(3_600)), "1h 0m 0.000s");
        assert_eq!(
            format_duration(Duration::from_secs(86_400 + 3_661)),
            "1d 1h 1m 1.000s"
        );
    }
}
