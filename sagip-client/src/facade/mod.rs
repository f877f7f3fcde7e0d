//! What each kind of user works with: guests, barangay officials and administrators.

pub mod admin;
pub mod barangay;
pub mod guest;

pub use admin::{AdminConsole, AdminSummary};
pub use barangay::{BarangayDashboard, BarangayPortal, DailyCount};
pub use guest::GuestView;
