//! # GameConnecting Library
//!
//! This crate provides a game lobby server with:
//! - RESTful HTTP API for accounts, friends, rooms, and moderation
//! - WebSocket gateway relaying chat, presence, and voice signaling
//! - PostgreSQL for persistent storage
//! - Redis for caching the public room listing
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, cache, and metrics implementations
//! - **Presentation Layer**: HTTP handlers, middleware, and the WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! gameconnecting/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities and repository traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, cache, and metrics implementations
//! +-- presentation/  HTTP routes and WebSocket handlers
//! +-- shared/        Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
