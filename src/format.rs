//! Text and date helpers shared by the renderers.

use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Uppercase the first character of a value, leaving the rest untouched.
///
/// Used for meal-time labels and for `diet_type`/`goal` values coming back
/// from the backend (`"breakfast"` -> `"Breakfast"`).
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format an ISO-8601 calendar date as a long display date,
/// e.g. `"2024-01-15"` -> `"Monday, January 15, 2024"`.
///
/// Backend payload keys are not guaranteed to be well-formed, so an
/// unparseable input falls back to the raw string instead of failing the
/// whole render.
pub fn format_long_date(iso_date: &str) -> String {
    match Date::parse(iso_date, ISO_DATE) {
        Ok(date) => format!(
            "{}, {} {}, {}",
            date.weekday(),
            date.month(),
            date.day(),
            date.year()
        ),
        Err(_) => iso_date.to_string(),
    }
}

/// Today's date as an ISO-8601 calendar date, used to seed the date field.
pub fn today_iso() -> String {
    time::OffsetDateTime::now_utc()
        .date()
        .format(ISO_DATE)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_first_character_only() {
        assert_eq!(capitalize_first("breakfast"), "Breakfast");
        assert_eq!(capitalize_first("lose_weight"), "Lose_weight");
        assert_eq!(capitalize_first("Vegan"), "Vegan");
    }

    #[test]
    fn capitalize_handles_empty_input() {
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn formats_iso_date_as_long_date() {
        assert_eq!(format_long_date("2024-01-15"), "Monday, January 15, 2024");
        assert_eq!(format_long_date("2025-12-25"), "Thursday, December 25, 2025");
    }

    #[test]
    fn malformed_date_falls_back_to_raw_string() {
        assert_eq!(format_long_date("not-a-date"), "not-a-date");
        assert_eq!(format_long_date(""), "");
    }

    #[test]
    fn today_is_iso_formatted() {
        let today = today_iso();
        assert_eq!(today.len(), 10);
        assert_eq!(today.as_bytes()[4], b'-');
        assert_eq!(today.as_bytes()[7], b'-');
    }
}
