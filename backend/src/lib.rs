//! Fitness RPG storage backend
//!
//! Embedded persistence for workout and nutrition logs, plus the services
//! that sit between it and a UI. This library exposes the modules for the
//! status binary and the integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod services;
pub mod state;
