//! Off-request-path computation
//!
//! Hotel filtering, record filter/sort/search, booking analytics and
//! dashboard statistics, run on a [`WorkerPool`] behind a typed
//! `{taskId, type, payload}` message protocol.

pub mod analytics;
pub mod data_filter;
pub mod hotel_search;
pub mod pool;
pub mod protocol;
pub mod stats;

pub use analytics::{AnalyticsResult, AnalyticsTask, EarningsResult, MonthlyEarnings, MonthlyRevenue};
pub use data_filter::{DataFilterTask, FilterOptions, SearchTask, SortOrder, SortTask};
pub use hotel_search::{HotelFilterResult, HotelFilterTask, HotelFilters};
pub use pool::{PoolStatus, WorkerPool, MAX_WORKERS};
pub use protocol::{Task, TaskEnvelope, TaskId, TaskOutcome, TaskOutput, TaskRequest, TaskResponse};
pub use stats::{DashboardStats, StatsTask};
