//! Opening-hours evaluation.
//!
//! The shop runs a fixed weekly schedule: weekdays 6:00–21:00, weekends
//! 7:00–22:00, both ends inclusive at minute resolution. The current time is
//! always passed in; nothing here reads the clock.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::Serialize;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Opening window for one day, in minutes after midnight (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayWindow {
    pub open: u32,
    pub close: u32,
}

impl DayWindow {
    pub const fn new(open: u32, close: u32) -> Self {
        Self { open, close }
    }

    pub fn contains(&self, minute_of_day: u32) -> bool {
        minute_of_day >= self.open && minute_of_day <= self.close
    }
}

/// Opening windows for Monday through Sunday. `None` means closed all day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklySchedule {
    days: [Option<DayWindow>; 7],
}

impl WeeklySchedule {
    pub fn new(days: [Option<DayWindow>; 7]) -> Self {
        Self { days }
    }

    /// Mon–Fri 6:00 AM – 9:00 PM, Sat–Sun 7:00 AM – 10:00 PM.
    pub fn standard() -> Self {
        let weekday = Some(DayWindow::new(6 * 60, 21 * 60));
        let weekend = Some(DayWindow::new(7 * 60, 22 * 60));
        Self::new([weekday, weekday, weekday, weekday, weekday, weekend, weekend])
    }

    pub fn window_for(&self, day: Weekday) -> Option<DayWindow> {
        self.days[day.num_days_from_monday() as usize]
    }

    pub fn is_open(&self, at: NaiveDateTime) -> bool {
        self.window_for(at.weekday())
            .is_some_and(|w| w.contains(minute_of_day(at)))
    }

    /// The next open/close transition as seen from `at`.
    /// `None` if the schedule has no open days at all, or the transition
    /// would fall past the last representable date.
    pub fn next_change(&self, at: NaiveDateTime) -> Option<NextChange> {
        let minute = minute_of_day(at);
        let today = at.date();

        if let Some(w) = self.window_for(at.weekday()) {
            if w.contains(minute) {
                return Some(NextChange { kind: ChangeKind::Closes, at: at_minute(today, w.close) });
            }
            if minute < w.open {
                return Some(NextChange { kind: ChangeKind::Opens, at: at_minute(today, w.open) });
            }
        }

        (1..=7).find_map(|offset| {
            let date = today.checked_add_days(Days::new(offset))?;
            self.window_for(date.weekday())
                .map(|w| NextChange { kind: ChangeKind::Opens, at: at_minute(date, w.open) })
        })
    }

    /// One line per day, Monday first: "Monday: 6:00 AM - 9:00 PM".
    pub fn display_lines(&self) -> Vec<String> {
        WEEKDAYS
            .iter()
            .map(|&day| match self.window_for(day) {
                Some(w) => format!("{}: {} - {}", day_name(day), clock_12h(w.open), clock_12h(w.close)),
                None => format!("{}: Closed", day_name(day)),
            })
            .collect()
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::standard()
    }
}

/// Whether the shop is open at local time `at`.
///
/// `hours` is accepted for call-site compatibility with
/// [`BusinessLocation::hours`](crate::BusinessLocation) but is **not parsed**:
/// the answer always comes from [`WeeklySchedule::standard`], whatever the
/// strings say.
pub fn is_open_at(hours: &[String], at: NaiveDateTime) -> bool {
    let _ = hours;
    WeeklySchedule::standard().is_open(at)
}

/// Parse a shop-local time given as `YYYY-MM-DD HH:MM` or `YYYY-MM-DDTHH:MM`,
/// optionally with seconds.
pub fn parse_local_time(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Opens,
    Closes,
}

/// An upcoming open/close transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextChange {
    pub kind: ChangeKind,
    pub at: NaiveDateTime,
}

impl NextChange {
    /// Short hint relative to `now`: "Closes at 9:00 PM", "Opens Saturday at 7:00 AM".
    pub fn describe(&self, now: NaiveDateTime) -> String {
        let verb = match self.kind {
            ChangeKind::Opens => "Opens",
            ChangeKind::Closes => "Closes",
        };
        let clock = clock_12h(minute_of_day(self.at));
        let days_ahead = (self.at.date() - now.date()).num_days();
        match days_ahead {
            0 => format!("{} at {}", verb, clock),
            1 => format!("{} tomorrow at {}", verb, clock),
            _ => format!("{} {} at {}", verb, day_name(self.at.weekday()), clock),
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────

fn minute_of_day(at: NaiveDateTime) -> u32 {
    at.hour() * 60 + at.minute()
}

fn at_minute(date: chrono::NaiveDate, minute: u32) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

fn clock_12h(minute: u32) -> String {
    let (h, m) = (minute / 60, minute % 60);
    let suffix = if h < 12 { "AM" } else { "PM" };
    let h12 = match h % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", h12, m, suffix)
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
