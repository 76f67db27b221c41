//! Public API for gctracer.
//!
//! This module contains all user-facing types and functions.
//! Most users should only interact with [`tracer::GcTracer`].

pub mod allocation;
pub mod clock;
pub mod config;
pub mod event;
pub mod scope;
pub mod shared;
pub mod stats;
pub mod tracer;
