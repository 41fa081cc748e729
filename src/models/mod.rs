//! Data models
//!
//! Typed views of backend payloads plus the DTOs of the local HTTP surface.

pub mod booking;
pub mod hotel;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use booking::{Booking, BookingStatus};
pub use hotel::{Amenity, AmenityRef, Hotel, Room};
pub use requests::{HostBookingFilters, PeriodFilters, SearchParams};
pub use responses::{ErrorResponse, HealthResponse, InvalidateResponse, StatsResponse};
