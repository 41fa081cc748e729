//! Booking analytics: revenue, earnings and status breakdowns.
//!
//! Only COMPLETED bookings contribute money. Date filters apply to the
//! check-in date for revenue/analytics and to the check-out date for
//! earnings, each falling back to the creation time.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::booking::{month_key, parse_datetime};
use crate::models::{Booking, PeriodFilters};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsTask {
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<PeriodFilters>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEarnings {
    pub month: String,
    pub earnings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub revenue: f64,
    pub bookings_count: usize,
    pub average_booking_value: f64,
    /// Chronological
    pub revenue_by_month: Vec<MonthlyRevenue>,
    pub bookings_by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsResult {
    pub total_earnings: f64,
    pub completed_count: usize,
    pub average_booking_value: f64,
    pub earnings_by_hotel: BTreeMap<String, f64>,
    /// Chronological
    pub earnings_by_month: Vec<MonthlyEarnings>,
}

pub fn calculate_analytics(task: AnalyticsTask) -> AnalyticsResult {
    let bookings = in_period(&task.bookings, task.filters.as_ref(), Booking::check_in_or_created);
    let completed: Vec<&Booking> = bookings.iter().copied().filter(|b| b.is_completed()).collect();

    let revenue = sum_prices(&completed);

    let mut bookings_by_status = BTreeMap::new();
    for booking in &bookings {
        *bookings_by_status
            .entry(booking.status.to_string())
            .or_insert(0) += 1;
    }

    AnalyticsResult {
        revenue,
        bookings_count: bookings.len(),
        average_booking_value: average(revenue, completed.len()),
        revenue_by_month: by_month(&completed, Booking::check_in_or_created)
            .into_iter()
            .map(|(month, revenue)| MonthlyRevenue { month, revenue })
            .collect(),
        bookings_by_status,
    }
}

pub fn calculate_earnings(task: AnalyticsTask) -> EarningsResult {
    let bookings = in_period(&task.bookings, task.filters.as_ref(), Booking::check_out_or_created);
    let completed: Vec<&Booking> = bookings.into_iter().filter(|b| b.is_completed()).collect();

    let total_earnings = sum_prices(&completed);

    let mut earnings_by_hotel = BTreeMap::new();
    for booking in &completed {
        *earnings_by_hotel.entry(booking.hotel_label()).or_insert(0.0) += booking.total_price;
    }

    EarningsResult {
        total_earnings,
        completed_count: completed.len(),
        average_booking_value: average(total_earnings, completed.len()),
        earnings_by_hotel,
        earnings_by_month: by_month(&completed, Booking::check_out_or_created)
            .into_iter()
            .map(|(month, earnings)| MonthlyEarnings { month, earnings })
            .collect(),
    }
}

pub fn calculate_revenue(task: AnalyticsTask) -> f64 {
    let bookings = in_period(&task.bookings, task.filters.as_ref(), Booking::check_in_or_created);
    let completed: Vec<&Booking> = bookings.into_iter().filter(|b| b.is_completed()).collect();
    sum_prices(&completed)
}

/// Applies hotel and date-range filters. Bookings whose date cannot be read
/// are kept; unreadable filter bounds are ignored.
fn in_period<'a>(
    bookings: &'a [Booking],
    filters: Option<&PeriodFilters>,
    date_of: fn(&Booking) -> Option<NaiveDateTime>,
) -> Vec<&'a Booking> {
    let Some(filters) = filters else {
        return bookings.iter().collect();
    };
    let start = filters.start_date.as_deref().and_then(parse_datetime);
    let end = filters.end_date.as_deref().and_then(parse_datetime);

    bookings
        .iter()
        .filter(|booking| filters.hotel_id.map_or(true, |id| booking.hotel_id == Some(id)))
        .filter(|booking| match date_of(booking) {
            Some(date) => {
                start.map_or(true, |start| date >= start) && end.map_or(true, |end| date <= end)
            }
            None => true,
        })
        .collect()
}

fn sum_prices(bookings: &[&Booking]) -> f64 {
    bookings.iter().fold(0.0, |total, b| total + b.total_price)
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Bookings without a readable date are left out of the monthly buckets.
fn by_month(
    bookings: &[&Booking],
    date_of: fn(&Booking) -> Option<NaiveDateTime>,
) -> BTreeMap<String, f64> {
    let mut months = BTreeMap::new();
    for booking in bookings {
        if let Some(date) = date_of(booking) {
            *months.entry(month_key(&date)).or_insert(0.0) += booking.total_price;
        }
    }
    months
}
