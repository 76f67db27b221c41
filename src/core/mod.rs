//! Fixed-capacity history and speed estimation.

pub mod ring_buffer;
pub mod speed;
