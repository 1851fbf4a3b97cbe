// ==============================
// tests/unit/birthday_tests.rs
// ==============================
//! Upcoming-birthday window over month and year boundaries
use backend_lib::contacts::{birthday_notice, upcoming_birthdays, BirthdayWindow};
use backend_lib::error::AppError;
use backend_lib::models::Contact;
use chrono::NaiveDate;
use contacts_common::ContactCreate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn contact(id: u64, first_name: &str, birthday: NaiveDate) -> Contact {
    Contact::new(
        id,
        1,
        ContactCreate {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            phone_number: None,
            birthday,
            additional_data: None,
        },
    )
}

#[test]
fn test_new_year_window() {
    let contacts = vec![
        contact(1, "Jan", date(1991, 1, 2)),
        contact(2, "Dec", date(1975, 12, 20)),
        contact(3, "Late", date(2001, 12, 29)),
    ];
    let found = upcoming_birthdays(&contacts, date(2024, 12, 28), 7).unwrap();
    let names: Vec<&str> = found.iter().map(|c| c.first_name.as_str()).collect();
    assert_eq!(names, ["Jan", "Late"]);
}

#[test]
fn test_same_month_window() {
    let contacts = vec![
        contact(1, "Ten", date(1990, 6, 10)),
        contact(2, "Three", date(1990, 6, 3)),
    ];
    let found = upcoming_birthdays(&contacts, date(2024, 6, 1), 5).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].first_name, "Three");
}

#[test]
fn test_window_bounds_are_inclusive() {
    let window = BirthdayWindow::new(date(2024, 3, 10), 1).unwrap();
    assert!(window.contains(date(1990, 3, 10)));
    assert!(window.contains(date(1990, 3, 11)));
    assert!(!window.contains(date(1990, 3, 12)));
    assert!(!window.contains(date(1990, 3, 9)));
}

#[test]
fn test_zero_span_is_invalid() {
    let contacts = vec![contact(1, "Any", date(1990, 1, 1))];
    assert!(matches!(
        upcoming_birthdays(&contacts, date(2024, 1, 1), 0),
        Err(AppError::InvalidWindow(0))
    ));
}

#[test]
fn test_notice_message() {
    let ann = contact(12, "Ann", date(1990, 1, 2));
    assert_eq!(
        birthday_notice(&ann).message,
        "Ann Doe's birthday is on JAN-02 (ID: 12)"
    );
}
