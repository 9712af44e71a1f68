//! Task scheduling primitives

pub mod invalidate;

pub use invalidate::InvalidateSync;
