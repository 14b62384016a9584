//! Tolerant date decoding for user-submitted date fields.
//!
//! The service stores dates as free-form strings. Some entries only carry a
//! year, some carry dates that do not exist (February 30th), some are null.
//! Decoding is total: anything that is not a valid `YYYY-MM-DD` prefix becomes
//! `None`, so one bad record never fails a whole page.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Length of the `YYYY-MM-DD` prefix.
const DATE_PREFIX_LEN: usize = 10;

/// Placeholder the service writes for "no date": the zero timestamp,
/// `0001-01-01T00:00:00Z`.
const ZERO_DATE_PREFIX: &str = "0001-01-01";

/// Parse a raw date field into a calendar date.
///
/// `None` input, input shorter than ten characters, and input whose first ten
/// characters are not a real `YYYY-MM-DD` date all yield `None`, as does the
/// zero date `0001-01-01`. Anything after the first ten characters (time of
/// day, offsets) is ignored.
#[must_use]
pub fn parse_date_field(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;

    let prefix_end = match raw.char_indices().nth(DATE_PREFIX_LEN) {
        Some((idx, _)) => idx,
        None if raw.chars().count() == DATE_PREFIX_LEN => raw.len(),
        None => return None,
    };
    let prefix = &raw[..prefix_end];

    if !is_date_shaped(prefix) || prefix == ZERO_DATE_PREFIX {
        return None;
    }

    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Exact `DDDD-DD-DD` shape check, so single-digit months and signed years
/// are rejected the same way a strict layout parser would reject them.
fn is_date_shaped(prefix: &str) -> bool {
    let bytes = prefix.as_bytes();
    bytes.len() == DATE_PREFIX_LEN
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Serde adapter for date fields of any JSON shape.
///
/// Strings go through [`parse_date_field`]. Null is `None`. Other scalars
/// (a bare year such as `2015`) are rendered to text first, which in practice
/// makes them too short to be a date.
pub(crate) fn deserialize_lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => parse_date_field(Some(&s)),
        other => parse_date_field(Some(&other.to_string())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parses_plain_date() {
        assert_eq!(parse_date_field(Some("2019-11-08")), date(2019, 11, 8));
    }

    #[test]
    fn test_discards_time_of_day() {
        assert_eq!(
            parse_date_field(Some("2019-11-08T17:30:00.000Z")),
            date(2019, 11, 8)
        );
    }

    #[test]
    fn test_none_is_unknown() {
        assert_eq!(parse_date_field(None), None);
    }

    #[test]
    fn test_sentinel_inputs() {
        for raw in ["null", "", "2015-02-30", "2015", "2015-01-0", "abcdefghij", "2015/01/01"] {
            assert_eq!(parse_date_field(Some(raw)), None, "input {raw:?}");
        }
    }

    #[test]
    fn test_zero_date_is_unknown() {
        assert_eq!(parse_date_field(Some("0001-01-01T00:00:00Z")), None);
        assert_eq!(parse_date_field(Some("0001-01-01")), None);
        assert_eq!(parse_date_field(Some("0001-01-02")), date(1, 1, 2));
    }

    #[test]
    fn test_rejects_single_digit_fields() {
        assert_eq!(parse_date_field(Some("2015-1-011")), None);
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert_eq!(parse_date_field(Some("ééééééééééééé")), None);
        assert_eq!(parse_date_field(Some("2015-01-0é")), None);
    }

    #[test]
    fn test_arbitrary_bytes_never_panic() {
        // Every input must produce a value; lossy conversion covers invalid UTF-8.
        for len in 0..=24u8 {
            let bytes: Vec<u8> = (0..len).map(|i| i.wrapping_mul(37).wrapping_add(len)).collect();
            let text = String::from_utf8_lossy(&bytes);
            let _ = parse_date_field(Some(&text));
        }
    }

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "deserialize_lenient_date")]
        when: Option<NaiveDate>,
    }

    #[test]
    fn test_deserialize_handles_every_scalar_shape() {
        let cases = [
            (r#"{"when":"2020-02-29T00:00:00Z"}"#, date(2020, 2, 29)),
            (r#"{"when":null}"#, None),
            (r#"{"when":2015}"#, None),
            (r#"{"when":true}"#, None),
            (r#"{"when":"2015-02-30"}"#, None),
            (r#"{}"#, None),
        ];
        for (json, expected) in cases {
            let holder: Holder = serde_json::from_str(json).expect("scalar should decode");
            assert_eq!(holder.when, expected, "json {json}");
        }
    }
}
