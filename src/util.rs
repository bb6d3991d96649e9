use chrono::{Datelike, Duration, NaiveDate};

pub const WEEKLY_SUFFIX: &str = "Re-Discover Weekly";

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Name of the dated weekly playlist, e.g. "March 03 '25 Re-Discover Weekly".
pub fn weekly_playlist_name(today: NaiveDate) -> String {
    format!("{} {}", start_of_week(today).format("%B %d '%y"), WEEKLY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monday_is_its_own_start_of_week() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(start_of_week(monday), monday);
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(start_of_week(sunday), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }
}
