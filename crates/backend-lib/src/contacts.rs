// ============================
// crates/backend-lib/src/contacts.rs
// ============================
//! Upcoming-birthday selection over a forward-looking date window.
use chrono::{Datelike, Days, NaiveDate};
use contacts_common::BirthdayResponse;

use crate::error::AppError;
use crate::models::Contact;

/// Default look-ahead for upcoming birthdays
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// The days from `anchor` through `anchor + span`, compared by month and day
/// only.
///
/// Windows that roll into the next month or year are handled. Spans longer
/// than a month are not: the match is then approximate and may include or
/// miss days in the months in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayWindow {
    anchor: NaiveDate,
    end: NaiveDate,
}

impl BirthdayWindow {
    /// Build a window; `span_days` below 1 or an end past the calendar's range is refused
    pub fn new(anchor: NaiveDate, span_days: i64) -> Result<Self, AppError> {
        let span = u64::try_from(span_days)
            .ok()
            .filter(|span| *span >= 1)
            .ok_or(AppError::InvalidWindow(span_days))?;
        let end = anchor
            .checked_add_days(Days::new(span))
            .ok_or(AppError::InvalidWindow(span_days))?;
        Ok(Self { anchor, end })
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether a birthday (any year) falls inside the window
    pub fn contains(&self, birthday: NaiveDate) -> bool {
        let rolls_over = self.end.month() != self.anchor.month();

        let in_anchor_month = birthday.month() == self.anchor.month()
            && birthday.day() >= self.anchor.day()
            && (rolls_over || birthday.day() <= self.end.day());

        let in_end_month =
            rolls_over && birthday.month() == self.end.month() && birthday.day() <= self.end.day();

        in_anchor_month || in_end_month
    }
}

/// Contacts whose birthday falls within `span_days` of `anchor`, in input order
pub fn upcoming_birthdays<'a>(
    contacts: &'a [Contact],
    anchor: NaiveDate,
    span_days: i64,
) -> Result<Vec<&'a Contact>, AppError> {
    let window = BirthdayWindow::new(anchor, span_days)?;
    Ok(contacts
        .iter()
        .filter(|contact| window.contains(contact.birthday))
        .collect())
}

/// Human-readable notice, e.g. `Kim Philby's birthday is on MAY-06 (ID: 3)`
pub fn birthday_notice(contact: &Contact) -> BirthdayResponse {
    let day = contact.birthday.format("%b-%d").to_string().to_uppercase();
    BirthdayResponse {
        message: format!(
            "{} {}'s birthday is on {} (ID: {})",
            contact.first_name, contact.last_name, day, contact.id
        ),
    }
}
