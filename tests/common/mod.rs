//! Common test utilities for iacdeploy CLI tests.
//!
//! This module provides:
//! - `TestEnv`: isolated project, home and local provider state directories
//! - Fixtures: ARM templates and parameter files used across tests

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
