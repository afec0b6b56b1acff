//! Error types for signal parsing and register allocation.

/// Errors raised while parsing port declarations or allocating registers.
///
/// Any of these aborts the whole run: skipping a single bad port would shift
/// the address of every port declared after it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// A port name that is not an HDL identifier.
    #[error("port name '{name}' is not a valid HDL identifier")]
    InvalidSignalName {
        /// The name as written in the declaration.
        name: String,
    },

    /// The port mode is neither `in` nor `out`.
    #[error("port '{name}': unsupported direction '{direction}' (expected 'in' or 'out')")]
    UnsupportedDirection {
        /// The port name.
        name: String,
        /// The mode string as written in the declaration.
        direction: String,
    },

    /// The type expression is neither `single bit` nor `bus(H downto L)`.
    #[error(
        "port '{name}': unsupported signal type '{type_expr}' (expected 'single bit' or 'bus(H downto L)')"
    )]
    UnsupportedSignalType {
        /// The port name.
        name: String,
        /// The type expression as written in the declaration.
        type_expr: String,
    },

    /// A bus whose high bit index is below its low bit index.
    #[error("port '{name}': invalid bit range {high} downto {low} (high bit is below low bit)")]
    InvalidBitRange {
        /// The port name.
        name: String,
        /// The declared high bit.
        high: u32,
        /// The declared low bit.
        low: u32,
    },

    /// A bus wider than one register.
    #[error("port '{name}': width {width} exceeds the {max}-bit register width")]
    SignalTooWide {
        /// The port name.
        name: String,
        /// The computed width.
        width: u64,
        /// The register width.
        max: u32,
    },

    /// Two ports share the same name.
    #[error("port '{name}' is declared more than once")]
    DuplicateSignal {
        /// The repeated port name.
        name: String,
    },

    /// A connect request exceeded a register's remaining capacity.
    ///
    /// The allocator checks capacity before connecting, so this only occurs
    /// if that check and [`Register::connect`](crate::Register::connect)
    /// disagree.
    #[error(
        "internal allocator error: register '{register}' has {remaining} free bits, cannot connect {width}"
    )]
    RegisterOverflow {
        /// Name of the register that rejected the request.
        register: String,
        /// Free bits left in the register.
        remaining: u32,
        /// Requested width.
        width: u32,
    },
}

impl AllocError {
    /// Returns `true` if this error indicates a bug in the allocator rather
    /// than malformed input.
    pub fn is_internal(&self) -> bool {
        matches!(self, AllocError::RegisterOverflow { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unsupported_direction() {
        let err = AllocError::UnsupportedDirection {
            name: "data".to_string(),
            direction: "inout".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "port 'data': unsupported direction 'inout' (expected 'in' or 'out')"
        );
    }

    #[test]
    fn display_invalid_bit_range() {
        let err = AllocError::InvalidBitRange {
            name: "bus_a".to_string(),
            high: 3,
            low: 5,
        };
        assert_eq!(
            format!("{err}"),
            "port 'bus_a': invalid bit range 3 downto 5 (high bit is below low bit)"
        );
    }

    #[test]
    fn display_invalid_signal_name() {
        let err = AllocError::InvalidSignalName {
            name: "a b".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "port name 'a b' is not a valid HDL identifier"
        );
    }

    #[test]
    fn display_register_overflow() {
        let err = AllocError::RegisterOverflow {
            register: "pio_in_0".to_string(),
            remaining: 4,
            width: 8,
        };
        assert!(format!("{err}").starts_with("internal allocator error"));
    }

    #[test]
    fn only_overflow_is_internal() {
        let overflow = AllocError::RegisterOverflow {
            register: "pio_out_1".to_string(),
            remaining: 0,
            width: 1,
        };
        let duplicate = AllocError::DuplicateSignal {
            name: "a".to_string(),
        };
        assert!(overflow.is_internal());
        assert!(!duplicate.is_internal());
    }
}
