//! Fixed-width PIO registers on the memory-mapped bus.

use crate::error::AllocError;
use crate::signal::Direction;

/// Bits per register.
pub const REGISTER_WIDTH: u32 = 64;

/// Byte distance between consecutive register addresses.
pub const ADDRESS_STRIDE: u64 = 8;

/// One 64-bit register slot on the bus.
///
/// Ports are packed from bit 63 downward; `remaining` is both the number of
/// free bits and the index one above the next free bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    index: usize,
    direction: Direction,
    remaining: u32,
}

impl Register {
    /// Creates an empty register at creation index `index`.
    pub fn new(index: usize, direction: Direction) -> Self {
        Self {
            index,
            direction,
            remaining: REGISTER_WIDTH,
        }
    }

    /// Zero-based creation index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Direction as seen from the bus master.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Byte address on the bus: `8 * index`.
    pub fn address(&self) -> u64 {
        ADDRESS_STRIDE * self.index as u64
    }

    /// Bits not yet connected.
    pub fn remaining_capacity(&self) -> u32 {
        self.remaining
    }

    /// Bits already connected.
    pub fn used_bits(&self) -> u32 {
        REGISTER_WIDTH - self.remaining
    }

    /// Instance name in the bus system, e.g. `pio_in_0`.
    pub fn name(&self) -> String {
        format!("pio_{}_{}", self.direction, self.index)
    }

    /// Name of the exported conduit and of the top-level wire.
    pub fn export_name(&self) -> String {
        format!("{}_export", self.name())
    }

    /// Bus component type implementing this register, e.g. `pio64_in`.
    pub fn component(&self) -> String {
        format!("pio64_{}", self.direction)
    }

    /// Returns `true` if `width` more bits fit.
    pub fn has_capacity_for(&self, width: u32) -> bool {
        self.remaining >= width
    }

    /// Claims the next `width` bits and returns the highest claimed bit.
    ///
    /// The claimed range is `[start - width + 1, start]`. Fails with
    /// [`AllocError::RegisterOverflow`] if the bits are not available.
    pub fn connect(&mut self, width: u32) -> Result<u32, AllocError> {
        if width == 0 || !self.has_capacity_for(width) {
            return Err(AllocError::RegisterOverflow {
                register: self.name(),
                remaining: self.remaining,
                width,
            });
        }
        let start_bit = self.remaining - 1;
        self.remaining -= width;
        Ok(start_bit)
    }
}
