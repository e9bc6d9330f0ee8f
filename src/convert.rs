//! Value coercion between cell text and typed field values.
//!
//! This module is the conversion core of the crate. Every field type that can
//! be bound to a column implements the [`CellValue`] trait, which fixes both
//! directions of the conversion: `to_text` produces the invariant default
//! textual form of a value, and `from_text` parses cell text back into the
//! value, surfacing a typed [`SerializationError`] on malformed input.
//!
//! The supported set is closed: strings, characters, booleans, the integer
//! and float primitives, high-precision decimals, the chrono date and time
//! types, UUIDs, base64 byte buffers, URLs, semver versions and IP addresses.
//! `Option<V>` is supported for every member of the set and is how a column
//! opts in to empty cells. Binding a field of any other type is rejected by
//! the compiler, not at runtime.
//!
//! Empty-cell policy, applied by [`parse_cell`] before type dispatch:
//!
//! - `Option<V>` targets yield `None`
//! - `String` targets yield the empty string
//! - every other target fails with [`SerializationError::RequiredValueMissing`]
//!
//! # Examples
//!
//! ```
//! use separated_text_rs::convert::parse_cell;
//!
//! let age: i32 = parse_cell("30").unwrap();
//! assert_eq!(age, 30);
//!
//! let missing: Option<i32> = parse_cell("").unwrap();
//! assert_eq!(missing, None);
//! ```

use std::{any::type_name, net::IpAddr, num::IntErrorKind};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::{Decimal, Error as DecimalError};
use semver::Version;
use url::Url;
use uuid::Uuid;

use crate::error::SerializationError;

/// A value that can live in one cell of a delimited row.
///
/// Implementations come in matched pairs: `from_text` must accept whatever
/// `to_text` produces, so that a serialized row parses back to the same
/// values. Parsing is invariant — no locale-dependent separators or month
/// names are ever consulted.
///
/// User-defined label enums get an implementation through the
/// [`cell_enum!`](crate::cell_enum) macro rather than by hand.
pub trait CellValue: Sized {
    /// Renders the value in its default round-trip textual form.
    fn to_text(&self) -> String;

    /// Parses non-empty cell text into a value.
    fn from_text(text: &str) -> Result<Self, SerializationError>;

    /// Result of an empty or whitespace-only cell.
    ///
    /// Value kinds are required by default; `String` and `Option<V>`
    /// override this to produce their "no value" form instead.
    fn from_empty() -> Result<Self, SerializationError> {
        Err(SerializationError::RequiredValueMissing(type_name::<Self>()))
    }
}

/// Converts one cell's text into a typed value, applying the empty-cell
/// policy before dispatching to the target type's parser.
pub fn parse_cell<V: CellValue>(text: &str) -> Result<V, SerializationError> {
    if text.trim().is_empty() {
        V::from_empty()
    } else {
        V::from_text(text)
    }
}

fn format_error<V>(text: &str) -> SerializationError {
    SerializationError::Format {
        value: text.to_string(),
        target: type_name::<V>(),
    }
}

fn overflow_error<V>(text: &str) -> SerializationError {
    SerializationError::Overflow {
        value: text.to_string(),
        target: type_name::<V>(),
    }
}

impl<V: CellValue> CellValue for Option<V> {
    fn to_text(&self) -> String {
        match self {
            Some(value) => value.to_text(),
            None => String::new(),
        }
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        V::from_text(text).map(Some)
    }

    fn from_empty() -> Result<Self, SerializationError> {
        Ok(None)
    }
}

impl CellValue for String {
    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        Ok(text.to_string())
    }

    // Strings are nullable by convention, an empty cell is just empty text.
    fn from_empty() -> Result<Self, SerializationError> {
        Ok(String::new())
    }
}

impl CellValue for char {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(format_error::<char>(text)),
        }
    }
}

impl CellValue for bool {
    fn to_text(&self) -> String {
        self.to_string()
    }

    /// Strict `true`/`false` first; when that fails, `1`, `yes`, `y`, `true`
    /// and `on` count as true regardless of case, and any other token is
    /// false rather than an error.
    fn from_text(text: &str) -> Result<Self, SerializationError> {
        if let Ok(value) = text.parse::<bool>() {
            return Ok(value);
        }
        Ok(matches!(
            text.to_ascii_lowercase().as_str(),
            "1" | "yes" | "y" | "true" | "on"
        ))
    }
}

macro_rules! integer_cell {
    ($($int:ty),+) => {$(
        impl CellValue for $int {
            fn to_text(&self) -> String {
                self.to_string()
            }

            fn from_text(text: &str) -> Result<Self, SerializationError> {
                text.parse::<$int>().map_err(|error| match error.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                        overflow_error::<$int>(text)
                    }
                    _ => format_error::<$int>(text),
                })
            }
        }
    )+};
}

integer_cell!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! float_cell {
    ($($float:ty),+) => {$(
        impl CellValue for $float {
            fn to_text(&self) -> String {
                self.to_string()
            }

            fn from_text(text: &str) -> Result<Self, SerializationError> {
                text.parse::<$float>().map_err(|_| format_error::<$float>(text))
            }
        }
    )+};
}

float_cell!(f32, f64);

impl CellValue for Decimal {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        text.parse::<Decimal>().map_err(|error| match error {
            DecimalError::ExceedsMaximumPossibleValue
            | DecimalError::LessThanMinimumPossibleValue
            | DecimalError::Underflow => overflow_error::<Decimal>(text),
            _ => format_error::<Decimal>(text),
        })
    }
}

/// Explicit formats tried in order before the general fallback, paired with
/// whether the format carries a time component. Date-only matches resolve to
/// midnight.
const DATE_TIME_LADDER: &[(&str, bool)] = &[
    ("%Y-%m-%d", true),
    ("%Y-%m-%d %H:%M:%S", false),
    ("%Y-%m-%dT%H:%M:%S", false),
    ("%Y-%m-%dT%H:%M:%S%.3f", false),
    ("%d/%m/%Y", true),
    ("%m/%d/%Y", true),
    ("%d-%m-%Y", true),
    ("%m-%d-%Y", true),
];

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    for (format, date_only) in DATE_TIME_LADDER {
        if *date_only {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(date.and_time(NaiveTime::MIN));
            }
        } else if let Ok(value) = NaiveDateTime::parse_from_str(text, format) {
            return Some(value);
        }
    }
    parse_date_time_general(text)
}

/// Invariant general parse used as the ladder fallback and as the sole parse
/// for the projected date-only and time-only targets.
fn parse_date_time_general(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%m/%d/%Y")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

impl CellValue for NaiveDateTime {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        parse_date_time(text).ok_or_else(|| format_error::<NaiveDateTime>(text))
    }
}

impl CellValue for NaiveDate {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        parse_date_time_general(text)
            .map(|value| value.date())
            .ok_or_else(|| format_error::<NaiveDate>(text))
    }
}

impl CellValue for NaiveTime {
    fn to_text(&self) -> String {
        self.to_string()
    }

    // A bare clock value has no date to anchor the general parse, so it is
    // tried on its own first.
    fn from_text(text: &str) -> Result<Self, SerializationError> {
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
            .ok()
            .or_else(|| parse_date_time_general(text).map(|value| value.time()))
            .ok_or_else(|| format_error::<NaiveTime>(text))
    }
}

impl CellValue for DateTime<FixedOffset> {
    fn to_text(&self) -> String {
        self.to_rfc3339()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        DateTime::parse_from_rfc3339(text)
            .or_else(|_| text.parse::<DateTime<FixedOffset>>())
            .map_err(|_| format_error::<DateTime<FixedOffset>>(text))
    }
}

impl CellValue for TimeDelta {
    /// Clock form, `d.hh:mm:ss` when the span reaches a full day, with a
    /// `.fff` millisecond suffix only when sub-second precision is present.
    fn to_text(&self) -> String {
        let negative = *self < TimeDelta::zero();
        let magnitude = if negative { -*self } else { *self };
        let total_seconds = magnitude.num_seconds();
        let days = total_seconds / 86_400;
        let hours = total_seconds % 86_400 / 3_600;
        let minutes = total_seconds % 3_600 / 60;
        let seconds = total_seconds % 60;
        let millis = magnitude.subsec_nanos() / 1_000_000;

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        if days > 0 {
            out.push_str(&format!("{days}."));
        }
        out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
        if millis > 0 {
            out.push_str(&format!(".{millis:03}"));
        }
        out
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        // A dot ahead of the first colon separates the day count from the
        // clock part; a dot after it is a fractional-second suffix.
        let (days, clock) = match rest.split_once('.') {
            Some((head, tail)) if !head.contains(':') && tail.contains(':') => {
                (head.parse::<i64>().map_err(|_| format_error::<TimeDelta>(text))?, tail)
            }
            _ => (0, rest),
        };

        let mut parts = clock.split(':');
        let (Some(hours), Some(minutes), Some(seconds)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(format_error::<TimeDelta>(text));
        };
        if parts.next().is_some() {
            return Err(format_error::<TimeDelta>(text));
        }

        let (seconds, millis) = match seconds.split_once('.') {
            Some((whole, fraction)) => {
                let padded = format!("{fraction:0<3}");
                let millis = padded
                    .get(..3)
                    .and_then(|digits| digits.parse::<i64>().ok())
                    .ok_or_else(|| format_error::<TimeDelta>(text))?;
                (whole, millis)
            }
            None => (seconds, 0),
        };

        let hours: i64 = hours.parse().map_err(|_| format_error::<TimeDelta>(text))?;
        let minutes: i64 = minutes.parse().map_err(|_| format_error::<TimeDelta>(text))?;
        let seconds: i64 = seconds.parse().map_err(|_| format_error::<TimeDelta>(text))?;
        if hours > 23 || minutes > 59 || seconds > 59 {
            return Err(format_error::<TimeDelta>(text));
        }

        let mut delta = TimeDelta::days(days)
            + TimeDelta::hours(hours)
            + TimeDelta::minutes(minutes)
            + TimeDelta::seconds(seconds)
            + TimeDelta::milliseconds(millis);
        if negative {
            delta = -delta;
        }
        Ok(delta)
    }
}

impl CellValue for Uuid {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        text.parse::<Uuid>().map_err(|_| format_error::<Uuid>(text))
    }
}

impl CellValue for Vec<u8> {
    fn to_text(&self) -> String {
        BASE64.encode(self)
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        BASE64.decode(text).map_err(|_| format_error::<Vec<u8>>(text))
    }
}

impl CellValue for Url {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        text.parse::<Url>().map_err(|_| format_error::<Url>(text))
    }
}

impl CellValue for Version {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        text.parse::<Version>().map_err(|_| format_error::<Version>(text))
    }
}

impl CellValue for IpAddr {
    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, SerializationError> {
        text.parse::<IpAddr>().map_err(|_| format_error::<IpAddr>(text))
    }
}

/// Defines a fieldless enum whose variants double as the closed label set of
/// a column, and implements [`CellValue`] for it with case-insensitive
/// parsing.
///
/// # Examples
///
/// ```
/// use separated_text_rs::{cell_enum, convert::{parse_cell, CellValue}};
///
/// cell_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Status {
///         Active,
///         Inactive,
///     }
/// }
///
/// assert_eq!(parse_cell::<Status>("ACTIVE").unwrap(), Status::Active);
/// assert_eq!(Status::Inactive.to_text(), "Inactive");
/// assert!(parse_cell::<Status>("archived").is_err());
/// ```
#[macro_export]
macro_rules! cell_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $crate::convert::CellValue for $name {
            fn to_text(&self) -> String {
                match self {
                    $(Self::$variant => stringify!($variant).to_string()),+
                }
            }

            fn from_text(text: &str) -> Result<Self, $crate::error::SerializationError> {
                $(
                    if text.eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok(Self::$variant);
                    }
                )+
                Err($crate::error::SerializationError::Format {
                    value: text.to_string(),
                    target: ::std::any::type_name::<Self>(),
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cell_is_none_for_optional_targets() {
        assert_eq!(parse_cell::<Option<i32>>("").unwrap(), None);
        assert_eq!(parse_cell::<Option<NaiveDate>>("   ").unwrap(), None);
    }

    #[test]
    fn empty_cell_fails_for_required_value_targets() {
        let error = parse_cell::<i32>("").unwrap_err();
        assert!(matches!(error, SerializationError::RequiredValueMissing(_)));

        let error = parse_cell::<bool>("  ").unwrap_err();
        assert!(matches!(error, SerializationError::RequiredValueMissing(_)));
    }

    #[test]
    fn empty_cell_is_empty_text_for_strings() {
        assert_eq!(parse_cell::<String>("").unwrap(), "");
        assert_eq!(parse_cell::<String>("   ").unwrap(), "");
    }

    #[test]
    fn string_cells_pass_through_unchanged() {
        assert_eq!(parse_cell::<String>(" padded ").unwrap(), " padded ");
    }

    #[test]
    fn boolean_accepts_permissive_true_tokens() {
        for token in ["1", "yes", "Y", "TRUE", "on", "On"] {
            assert!(parse_cell::<bool>(token).unwrap(), "token {token:?}");
        }
    }

    #[test]
    fn boolean_treats_unknown_tokens_as_false() {
        assert!(!parse_cell::<bool>("maybe").unwrap());
        assert!(!parse_cell::<bool>("0").unwrap());
        assert!(!parse_cell::<bool>("off").unwrap());
    }

    #[test]
    fn integer_overflow_is_distinguished_from_bad_format() {
        assert!(matches!(
            parse_cell::<u8>("300").unwrap_err(),
            SerializationError::Overflow { .. }
        ));
        assert!(matches!(
            parse_cell::<u8>("abc").unwrap_err(),
            SerializationError::Format { .. }
        ));
        assert!(matches!(
            parse_cell::<i8>("-200").unwrap_err(),
            SerializationError::Overflow { .. }
        ));
    }

    #[test]
    fn numeric_parsing_is_invariant() {
        assert_eq!(parse_cell::<i64>("-42").unwrap(), -42);
        assert_eq!(parse_cell::<f64>("3.25").unwrap(), 3.25);
        assert_eq!(
            parse_cell::<Decimal>("12345.6789").unwrap(),
            "12345.6789".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn date_only_text_parses_to_midnight() {
        let value = parse_cell::<NaiveDateTime>("2024-01-15").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(value, expected);
    }

    #[test]
    fn date_time_ladder_prefers_day_first_for_slash_dates() {
        // 01/02/2024 is ambiguous; the dd/MM entry sits ahead of MM/dd.
        let value = parse_cell::<NaiveDateTime>("01/02/2024").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(value, expected);
    }

    #[test]
    fn date_time_accepts_t_separator_and_millis() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_milli_opt(10, 30, 0, 123)
            .unwrap();
        assert_eq!(
            parse_cell::<NaiveDateTime>("2024-01-15T10:30:00.123").unwrap(),
            expected
        );
    }

    #[test]
    fn date_time_display_round_trips() {
        let value = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_cell::<NaiveDateTime>(&value.to_text()).unwrap(), value);
    }

    #[test]
    fn unparseable_date_is_a_format_error() {
        assert!(matches!(
            parse_cell::<NaiveDateTime>("next tuesday").unwrap_err(),
            SerializationError::Format { .. }
        ));
    }

    #[test]
    fn date_and_time_projections() {
        assert_eq!(
            parse_cell::<NaiveDate>("2024-01-15 10:30:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_cell::<NaiveTime>("10:30:00").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
        assert_eq!(
            parse_cell::<NaiveTime>("2024-01-15 10:30:00").unwrap(),
            NaiveTime::from_hms_opt(10, 30, 0).unwrap()
        );
    }

    #[test]
    fn offset_date_time_round_trips_through_rfc3339() {
        let value = parse_cell::<DateTime<FixedOffset>>("2024-01-15T10:30:00+02:00").unwrap();
        assert_eq!(
            parse_cell::<DateTime<FixedOffset>>(&value.to_text()).unwrap(),
            value
        );
    }

    #[test]
    fn duration_clock_form_round_trips() {
        let cases = [
            TimeDelta::hours(2) + TimeDelta::minutes(3) + TimeDelta::seconds(4),
            TimeDelta::days(1) + TimeDelta::hours(2),
            TimeDelta::seconds(90061) + TimeDelta::milliseconds(250),
            -(TimeDelta::minutes(5) + TimeDelta::seconds(30)),
        ];
        for value in cases {
            let text = value.to_text();
            assert_eq!(parse_cell::<TimeDelta>(&text).unwrap(), value, "text {text:?}");
        }
    }

    #[test]
    fn duration_parses_day_prefixed_clock_text() {
        let value = parse_cell::<TimeDelta>("1.02:03:04").unwrap();
        assert_eq!(
            value,
            TimeDelta::days(1) + TimeDelta::hours(2) + TimeDelta::minutes(3) + TimeDelta::seconds(4)
        );
        assert!(parse_cell::<TimeDelta>("25:00:00").is_err());
        assert!(parse_cell::<TimeDelta>("02:03").is_err());
    }

    #[test]
    fn char_requires_exactly_one_character() {
        assert_eq!(parse_cell::<char>("x").unwrap(), 'x');
        assert!(matches!(
            parse_cell::<char>("xy").unwrap_err(),
            SerializationError::Format { .. }
        ));
    }

    #[test]
    fn uuid_parses_canonical_form() {
        let id = Uuid::new_v4();
        assert_eq!(parse_cell::<Uuid>(&id.to_text()).unwrap(), id);
        assert!(parse_cell::<Uuid>("not-a-uuid").is_err());
    }

    #[test]
    fn byte_buffers_use_standard_base64() {
        let bytes = vec![0u8, 1, 2, 254, 255];
        let text = bytes.to_text();
        assert_eq!(parse_cell::<Vec<u8>>(&text).unwrap(), bytes);
        assert!(parse_cell::<Vec<u8>>("!!not base64!!").is_err());
    }

    #[test]
    fn url_version_and_ip_have_single_canonical_parses() {
        assert_eq!(
            parse_cell::<Url>("https://example.com/a").unwrap().as_str(),
            "https://example.com/a"
        );
        assert_eq!(
            parse_cell::<Version>("1.2.3").unwrap(),
            Version::new(1, 2, 3)
        );
        assert_eq!(
            parse_cell::<IpAddr>("192.168.0.1").unwrap(),
            "192.168.0.1".parse::<IpAddr>().unwrap()
        );
        assert!(parse_cell::<IpAddr>("not an address").is_err());
    }

    cell_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Color {
            Red,
            Green,
            Blue,
        }
    }

    #[test]
    fn enum_labels_match_case_insensitively() {
        for text in ["red", "Red", "RED"] {
            assert_eq!(parse_cell::<Color>(text).unwrap(), Color::Red);
        }
        assert!(matches!(
            parse_cell::<Color>("purple").unwrap_err(),
            SerializationError::Format { .. }
        ));
    }

    #[test]
    fn enum_renders_declared_variant_name() {
        assert_eq!(Color::Green.to_text(), "Green");
    }
}
