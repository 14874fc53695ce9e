use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::dates::{days_until, parse_amount, parse_date};
use crate::models::{AggregationWindow, ExpiringStudent, ProfitTotals, RosterEntry, StudentRow};

pub const WEEK_DAYS: u64 = 7;
pub const MONTH_DAYS: u64 = 30;

/// Students whose membership ends within `[0, window_days]` days of `today`.
/// Rows with an unparseable end date are skipped and logged.
pub fn find_expiring(rows: &[StudentRow], today: NaiveDate, window_days: i64) -> Vec<ExpiringStudent> {
    rows.iter()
        .filter_map(|row| match parse_date(&row.end_date) {
            Ok(end) => Some((row, days_until(end, today))),
            Err(e) => {
                warn!("Skipping {:?} in expiry check: {}", row.full_name, e);
                None
            }
        })
        .filter(|(_, days_left)| (0..=window_days).contains(days_left))
        .map(|(row, days_left)| ExpiringStudent {
            name: row.full_name.clone(),
            days_left,
            telegram_id: row.telegram_id.clone(),
        })
        .collect()
}

/// Payment totals bucketed by start date. The week and month windows include both
/// ends, so a payment made today counts in all three buckets.
pub fn compute_profit(rows: &[StudentRow], today: NaiveDate) -> ProfitTotals {
    let week_ago = today.checked_sub_days(Days::new(WEEK_DAYS)).unwrap_or(NaiveDate::MIN);
    let month_ago = today.checked_sub_days(Days::new(MONTH_DAYS)).unwrap_or(NaiveDate::MIN);

    let mut totals = ProfitTotals::default();
    for row in rows {
        let parsed = parse_date(&row.start_date)
            .and_then(|start| parse_amount(&row.payment_amount).map(|amount| (start, amount)));
        let (start, amount) = match parsed {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping {:?} in profit report: {}", row.full_name, e);
                continue;
            }
        };

        let add = |total: i64, counted: bool| if counted { total.checked_add(amount) } else { Some(total) };
        let summed = add(totals.today, start == today).and_then(|today_total| {
            let week = add(totals.week, (week_ago..=today).contains(&start))?;
            let month = add(totals.month, (month_ago..=today).contains(&start))?;
            Some(ProfitTotals {
                today: today_total,
                week,
                month,
            })
        });
        match summed {
            Some(next) => totals = next,
            None => warn!(
                "Skipping {:?} in profit report: amount {} overflows the totals",
                row.full_name, amount
            ),
        }
    }
    totals
}

/// Roster lines with days left recomputed from the end date. The stored
/// "Days Left" column is only a fallback for rows whose end date does not parse.
pub fn roster(rows: &[StudentRow], today: NaiveDate) -> Vec<RosterEntry> {
    rows.iter()
        .map(|row| {
            let days_left = match parse_date(&row.end_date) {
                Ok(end) => Some(days_until(end, today)),
                Err(_) => row.days_left.trim().parse::<i64>().ok(),
            };
            RosterEntry {
                name: row.full_name.clone(),
                days_left,
            }
        })
        .collect()
}

impl AggregationWindow {
    pub fn compute(rows: &[StudentRow], today: NaiveDate, window_days: i64) -> Self {
        Self {
            profit: compute_profit(rows, today),
            expiring: find_expiring(rows, today, window_days),
        }
    }
}
