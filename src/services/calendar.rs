// anistream calendar widget
// Builds Monday-first month grids with `chrono`.

use chrono::{Datelike, NaiveDate};

/// One week row; `None` pads days outside the month.
pub type Week = [Option<u32>; 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week>,
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days() as u32)
}

/// Returns `None` for an invalid month.
pub fn month_grid(year: i32, month: u32) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;
    let offset = first.weekday().num_days_from_monday() as usize;

    let mut weeks = Vec::new();
    let mut week: Week = [None; 7];
    let mut col = offset;
    for day in 1..=days {
        week[col] = Some(day);
        col += 1;
        if col == 7 {
            weeks.push(week);
            week = [None; 7];
            col = 0;
        }
    }
    if col > 0 {
        weeks.push(week);
    }

    Some(MonthGrid { year, month, weeks })
}
