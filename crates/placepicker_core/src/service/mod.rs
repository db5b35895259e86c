//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repositories, catalog and timers into host-level use-cases.
//! - Keep UI/FFI layers decoupled from storage and timer details.

pub mod picker_service;
pub mod selection_service;
