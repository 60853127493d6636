// Protobuf duration strings ("300s", "0.5s") for TTL fields
// Author: kelexine (https://github.com/kelexine)

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Format a duration the way the API expects: whole seconds as `"300s"`,
/// fractional seconds with trailing zeros trimmed (`"1.5s"`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let nanos = duration.subsec_nanos();
    if nanos == 0 {
        format!("{}s", secs)
    } else {
        let fraction = format!("{:09}", nanos);
        format!("{}.{}s", secs, fraction.trim_end_matches('0'))
    }
}

/// Parse duration strings like `"0.457639761s"`, `"40s"`, `"1.5s"`.
pub fn parse_duration(duration_str: &str) -> Option<Duration> {
    let value = duration_str.trim().strip_suffix('s')?;
    let (secs, fraction) = value.split_once('.').unwrap_or((value, ""));
    if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Digits past nanosecond precision are dropped.
    let fraction = &fraction[..fraction.len().min(9)];
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse().ok()?
    };
    Some(Duration::new(secs.parse().ok()?, nanos))
}

/// `#[serde(with = "crate::utils::duration::option")]` for `Option<Duration>` fields.
pub mod option {
    use super::*;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_str(&format_duration(*duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            parse_duration(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {}", s)))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_seconds() {
        assert_eq!(format_duration(Duration::from_secs(300)), "300s");
    }

    #[test]
    fn test_format_fractional_seconds() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("40s"), Some(Duration::from_secs(40)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("40"), None);
        assert_eq!(parse_duration("-1s"), None);
        assert_eq!(
            parse_duration("0.457639761s"),
            Some(Duration::new(0, 457_639_761))
        );
    }
}
