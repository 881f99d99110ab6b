use chrono::{DateTime, NaiveDateTime, Utc};

/// Separator the feed uses between the two halves of a region name
const REGION_SEPARATOR: &str = ", ";

/// Turn the feed's inverted region name into display order.
///
/// `"A Coruña, Galicia"` becomes `"Galicia A Coruña"`; names without the
/// separator pass through; `None` and `""` give `None`.
pub fn format_region_name(region: Option<&str>) -> Option<String> {
    let region = region.filter(|r| !r.is_empty())?;

    match region.split_once(REGION_SEPARATOR) {
        Some((first, rest)) => {
            // Only the second segment counts when the name has more than one separator
            let second = rest.split(REGION_SEPARATOR).next().unwrap_or(rest);
            Some(format!("{} {}", second, first))
        }
        None => Some(region.to_string()),
    }
}

/// Parse a feed timestamp leniently.
///
/// Accepts RFC 3339, offsets written without a colon (`+0100`), and naive
/// timestamps, which are read as UTC. Anything else yields `None`.
pub fn parse_feed_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_region_name() {
        assert_eq!(format_region_name(Some("Madrid")).as_deref(), Some("Madrid"));
        assert_eq!(
            format_region_name(Some("A Coruña, Galicia")).as_deref(),
            Some("Galicia A Coruña")
        );
        assert_eq!(
            format_region_name(Some("Madrid, Comunidad de")).as_deref(),
            Some("Comunidad de Madrid")
        );
        assert_eq!(format_region_name(Some("")), None);
        assert_eq!(format_region_name(None), None);
    }

    #[test]
    fn test_format_region_name_needs_space_after_comma() {
        assert_eq!(format_region_name(Some("Araba,Álava")).as_deref(), Some("Araba,Álava"));
    }

    #[test]
    fn test_format_region_name_extra_segments_dropped() {
        assert_eq!(format_region_name(Some("a, b, c")).as_deref(), Some("b a"));
    }

    #[test]
    fn test_parse_feed_timestamp() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 10, 8, 30, 0).unwrap();

        assert_eq!(parse_feed_timestamp(Some("2025-01-10T08:30:00Z")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2025-01-10T09:30:00+01:00")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2025-01-10T09:30:00.000+0100")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2025-01-10T08:30:00")), Some(expected));
        assert_eq!(parse_feed_timestamp(Some("2025-01-10 08:30:00")), Some(expected));
    }

    #[test]
    fn test_parse_feed_timestamp_invalid() {
        assert_eq!(parse_feed_timestamp(Some("yesterday")), None);
        assert_eq!(parse_feed_timestamp(Some("  ")), None);
        assert_eq!(parse_feed_timestamp(None), None);
    }
}
