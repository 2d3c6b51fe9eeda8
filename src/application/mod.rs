//! Application Layer
//!
//! Business logic services (auth, friends, rooms, admin) and the data
//! transfer objects the HTTP layer serializes. This layer orchestrates
//! the flow of data between the presentation and domain layers.

pub mod dto;
pub mod services;
