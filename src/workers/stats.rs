//! Dashboard overview statistics
//!
//! Host dashboard numbers computed from the host's hotels and bookings.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingStatus, Hotel};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsTask {
    #[serde(default)]
    pub hotels: Vec<Hotel>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_hotels: usize,
    pub total_rooms: usize,
    pub total_bookings: usize,
    /// CONFIRMED, CHECKED_IN or COMPLETED
    pub confirmed_bookings: usize,
    pub total_revenue: f64,
    pub upcoming_bookings: usize,
    pub pending_check_ins: usize,
    pub pending_check_outs: usize,
    pub this_month_revenue: f64,
    pub last_month_revenue: f64,
}

/// Computes the dashboard numbers as of `now`.
///
/// Monthly revenue is attributed by `checkedOutAt`; last month runs from its
/// first day up to, not including, the first day of the current month.
pub fn calculate_stats(task: StatsTask, now: NaiveDateTime) -> DashboardStats {
    let StatsTask { hotels, bookings } = task;

    let today = now.date();
    let start_of_month = first_of_month(today);
    let start_of_last_month = first_of_month(start_of_month.pred_opt().unwrap_or(start_of_month));
    let start_of_month = midnight(start_of_month);
    let start_of_last_month = midnight(start_of_last_month);
    let today = midnight(today);

    let completed: Vec<&Booking> = bookings.iter().filter(|b| b.is_completed()).collect();
    let revenue_between = |from: NaiveDateTime, until: Option<NaiveDateTime>| -> f64 {
        completed
            .iter()
            .filter(|b| {
                b.checked_out()
                    .is_some_and(|at| at >= from && until.map_or(true, |until| at < until))
            })
            .fold(0.0, |total, b| total + b.total_price)
    };

    DashboardStats {
        total_hotels: hotels.len(),
        total_rooms: hotels.iter().map(Hotel::room_count).sum(),
        total_bookings: bookings.len(),
        confirmed_bookings: bookings
            .iter()
            .filter(|b| {
                matches!(
                    b.status,
                    BookingStatus::Confirmed | BookingStatus::CheckedIn | BookingStatus::Completed
                )
            })
            .count(),
        total_revenue: completed.iter().fold(0.0, |total, b| total + b.total_price),
        upcoming_bookings: bookings
            .iter()
            .filter(|b| matches!(b.status, BookingStatus::Confirmed | BookingStatus::CheckedIn))
            .filter(|b| b.check_in().is_some_and(|at| at >= now))
            .count(),
        pending_check_ins: bookings
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .filter(|b| b.check_in().is_some_and(|at| at <= today))
            .count(),
        pending_check_outs: bookings
            .iter()
            .filter(|b| b.status == BookingStatus::CheckedIn)
            .filter(|b| b.check_out().is_some_and(|at| at <= today))
            .count(),
        this_month_revenue: revenue_between(start_of_month, None),
        last_month_revenue: revenue_between(start_of_last_month, Some(start_of_month)),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
