//! # Meetsync Core
//!
//! Domain types and pure logic for the meetsync scheduling core.
//!
//! This crate has no I/O: it defines the appointment, attendee, and profile
//! models, the error taxonomy, the participation state machine that decides
//! which attendee transitions are legal for which actor, and the read-only
//! view aggregators. Everything that touches a store lives in the
//! `meetsync-store` and `meetsync-service` crates.

/// Error taxonomy shared by all crates
pub mod errors;
/// Appointment, attendee, profile, and identity models
pub mod models;
/// The participation state machine
pub mod participation;
/// Read-only view aggregators
pub mod views;
