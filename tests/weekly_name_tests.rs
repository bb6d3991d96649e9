use chrono::NaiveDate;
use rediscover_weekly::util::{start_of_week, weekly_playlist_name};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn wednesday_uses_that_weeks_monday() {
    assert_eq!(
        weekly_playlist_name(date(2025, 3, 5)),
        "March 03 '25 Re-Discover Weekly"
    );
}

#[test]
fn every_day_of_a_week_shares_one_name() {
    let names: Vec<String> = (3..=9).map(|d| weekly_playlist_name(date(2025, 3, d))).collect();
    assert!(names.iter().all(|n| n == "March 03 '25 Re-Discover Weekly"));
    assert_eq!(
        weekly_playlist_name(date(2025, 3, 10)),
        "March 10 '25 Re-Discover Weekly"
    );
}

#[test]
fn week_start_can_fall_in_previous_month_and_year() {
    // Thursday 2026-01-01 belongs to the week of Monday 2025-12-29
    assert_eq!(start_of_week(date(2026, 1, 1)), date(2025, 12, 29));
    assert_eq!(
        weekly_playlist_name(date(2026, 1, 1)),
        "December 29 '25 Re-Discover Weekly"
    );
}
