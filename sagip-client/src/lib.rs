//! Client-side data layer for Sagip.
//!
//! [`Stores`] mirrors each server collection in memory, [`backend::Backend`]
//! decides whether the server is reachable before any request is made, and
//! the [`facade`] types give guests, barangay officials and administrators
//! the operations their screens need.

pub mod audit;
pub mod backend;
pub mod config;
pub mod entities;
pub mod error;
pub mod facade;
pub mod store;
pub mod stores;

pub use backend::{Availability, Backend};
pub use config::ClientConfig;
pub use error::ClientError;
pub use store::{Editable, Entity, Placement, SharedStore};
pub use stores::Stores;
