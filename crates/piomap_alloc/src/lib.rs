//! Port-to-register allocation for memory-mapped PIO bridges.
//!
//! This crate turns a design's declared port list into a physical bus-address
//! map. Each port is parsed into a [`SignalDescriptor`], then the
//! [`allocate`] pass packs the descriptors into 64-bit, direction-typed
//! [`Register`]s at byte addresses `0, 8, 16, ...`.
//!
//! The resulting [`Allocation`] is the only input the artifact generators
//! accept, so every generated file sees the same addresses and bit slices.

#![warn(missing_docs)]

pub mod allocator;
pub mod error;
pub mod register;
pub mod signal;

pub use allocator::{allocate, Allocation, Allocator, Binding, Connection};
pub use error::AllocError;
pub use register::{Register, ADDRESS_STRIDE, REGISTER_WIDTH};
pub use signal::{
    extract_signals, is_hdl_identifier, Direction, ExtractedSignals, RawSignal, SignalDescriptor,
    SignalType,
};
