use time::{
    format_description::{well_known::Rfc3339, BorrowedFormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime,
};

/// What a `datetime-local` style input holds.
const INPUT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]T[hour]:[minute]");
const DISPLAY: &[BorrowedFormatItem<'static>] = format_description!("[day]-[month]-[year] [hour]:[minute]");

fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Local time rounded to minutes, as a form default.
pub fn now_input() -> String {
    now().format(INPUT).unwrap_or_default()
}

pub fn now_iso() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Short day-month-year time rendering; unparsable input is shown verbatim.
pub fn display(stamp: &str) -> String {
    if let Ok(parsed) = OffsetDateTime::parse(stamp, &Rfc3339) {
        return parsed.format(DISPLAY).unwrap_or_else(|_| stamp.to_owned());
    }
    stamp
        .get(..16)
        .and_then(|minutes| PrimitiveDateTime::parse(minutes, INPUT).ok())
        .and_then(|parsed| parsed.format(DISPLAY).ok())
        .unwrap_or_else(|| stamp.to_owned())
}

/// Accepts both `2024-05-01T06:30` and full RFC 3339 timestamps.
pub fn is_valid_input(stamp: &str) -> bool {
    OffsetDateTime::parse(stamp, &Rfc3339).is_ok()
        || stamp
            .get(..16)
            .is_some_and(|minutes| PrimitiveDateTime::parse(minutes, INPUT).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_local_inputs() {
        assert_eq!(display("2024-05-01T06:30"), "01-05-2024 06:30");
        assert_eq!(display("2024-05-01T06:30:59.123"), "01-05-2024 06:30");
    }

    #[test]
    fn displays_rfc3339() {
        assert_eq!(display("2024-11-03T18:05:00Z"), "03-11-2024 18:05");
    }

    #[test]
    fn garbage_is_verbatim() {
        assert_eq!(display("gisteren"), "gisteren");
        assert_eq!(display(""), "");
    }

    #[test]
    fn input_default_parses() {
        assert!(is_valid_input(&now_input()));
        assert!(is_valid_input(&now_iso()));
        assert!(!is_valid_input("2024-13-01T06:30"));
    }
}
