use fluxdone_core::category::{INBOX, NEXT_7_DAYS, TODAY};
use fluxdone_core::{Category, Priority, SortMode};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time, UtcOffset};

/// Error returned while turning user-facing tokens into domain values.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("category must not be empty")]
    EmptyCategory,
    #[error("invalid sort mode: {token} (expected custom, priority, due-date or title)")]
    InvalidSortMode { token: String },
    #[error("invalid priority: {token} (expected 1-4 or high, medium, low, none)")]
    InvalidPriority { token: String },
    #[error("invalid UTC offset: {token} (expected +HH:MM)")]
    InvalidOffset { token: String },
    #[error("invalid {field} timestamp: {source}")]
    InvalidTimestamp {
        field: &'static str,
        #[source]
        source: time::error::Parse,
    },
}

/// Result alias for token parsing helpers.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a category token. Built-in names are case-insensitive and
/// `next-7-days` is accepted as an alias; any other token names a list verbatim.
///
/// # Errors
/// Returns [`ParseError::EmptyCategory`] for blank input.
pub fn parse_category(token: &str) -> ParseResult<Category> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyCategory);
    }
    let category = match trimmed.to_ascii_lowercase().as_str() {
        INBOX => Category::Inbox,
        TODAY => Category::Today,
        NEXT_7_DAYS | "next-7-days" => Category::Next7Days,
        _ => Category::List(trimmed.to_owned()),
    };
    Ok(category)
}

/// Parse a sort mode token (`due_date` and `duedate` are accepted for `due-date`).
///
/// # Errors
/// Returns an error if the token does not name a sort mode.
pub fn parse_sort_mode(token: &str) -> ParseResult<SortMode> {
    let normalized = token.trim().to_ascii_lowercase().replace('_', "-");
    let normalized = if normalized == "duedate" { "due-date".to_owned() } else { normalized };
    SortMode::ALL
        .into_iter()
        .find(|mode| mode.as_str() == normalized)
        .ok_or_else(|| ParseError::InvalidSortMode {
            token: token.to_owned(),
        })
}

/// Parse a priority given as its wire number or its label.
///
/// # Errors
/// Returns an error for anything other than 1-4 or a known label.
pub fn parse_priority(token: &str) -> ParseResult<Priority> {
    let normalized = token.trim().to_ascii_lowercase();
    let invalid = || ParseError::InvalidPriority {
        token: token.to_owned(),
    };
    if let Ok(value) = normalized.parse::<u8>() {
        return Priority::try_from(value).map_err(|_| invalid());
    }
    Priority::ALL
        .into_iter()
        .find(|priority| priority.descriptor().label.eq_ignore_ascii_case(&normalized))
        .ok_or_else(invalid)
}

/// Parse a `+HH:MM` / `-HH:MM` offset; `Z` and `UTC` mean zero.
///
/// # Errors
/// Returns an error if the token is not a valid offset.
pub fn parse_utc_offset(token: &str) -> ParseResult<UtcOffset> {
    let trimmed = token.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| ParseError::InvalidOffset {
        token: token.to_owned(),
    })
}

/// Parse an RFC3339 timestamp string.
///
/// # Errors
/// Returns an error if the string does not conform to RFC3339.
pub fn parse_timestamp(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s.trim(), &Rfc3339)
}

/// Parse a due date given either as RFC3339 or as a bare `YYYY-MM-DD`, which
/// is read as local midnight in `offset`.
///
/// # Errors
/// Returns an error when neither form parses.
pub fn parse_due_date(raw: &str, offset: UtcOffset) -> ParseResult<OffsetDateTime> {
    let trimmed = raw.trim();
    if let Ok(date) = Date::parse(trimmed, format_description!("[year]-[month]-[day]")) {
        return Ok(date.with_time(Time::MIDNIGHT).assume_offset(offset));
    }
    parse_timestamp(trimmed)
        .map(|due| due.to_offset(offset))
        .map_err(|source| ParseError::InvalidTimestamp {
            field: "due",
            source,
        })
}
