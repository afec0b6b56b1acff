//! Port declarations, their direction and width.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AllocError;
use crate::register::REGISTER_WIDTH;

/// Direction of a port or register.
///
/// For a port this is the direction seen from the user design. For a
/// register it is the direction seen from the bus master, which is always
/// the opposite of the ports it carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Flows into the design (or, for a register, into the bus master).
    In,
    /// Flows out of the design (or, for a register, out of the bus master).
    Out,
}

impl Direction {
    /// Parses the exact strings `"in"` and `"out"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in" => Some(Direction::In),
            "out" => Some(Direction::Out),
            _ => None,
        }
    }

    /// Returns the other direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }

    /// Returns the lowercase keyword for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape of a port as written in its type expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// `single bit`
    SingleBit,
    /// `bus(high downto low)`, with `high >= low`.
    Bus {
        /// Most significant bit index.
        high: u32,
        /// Least significant bit index.
        low: u32,
    },
}

impl SignalType {
    /// Number of bits covered by this type.
    pub fn width(self) -> u64 {
        match self {
            SignalType::SingleBit => 1,
            SignalType::Bus { high, low } => u64::from(high) - u64::from(low) + 1,
        }
    }
}

/// Why a type expression was rejected.
enum TypeExprError {
    Unsupported,
    Reversed { high: u32, low: u32 },
}

/// Parses `single bit` or `bus(H downto L)`.
///
/// Whitespace is allowed around the whole expression and around the tokens
/// inside the parentheses; nothing may follow the closing parenthesis.
fn parse_type_expr(expr: &str) -> Result<SignalType, TypeExprError> {
    let expr = expr.trim();
    if expr == "single bit" {
        return Ok(SignalType::SingleBit);
    }

    let inner = expr
        .strip_prefix("bus")
        .map(str::trim_start)
        .and_then(|s| s.strip_prefix('('))
        .and_then(|s| s.strip_suffix(')'))
        .ok_or(TypeExprError::Unsupported)?;

    let (high, low) = inner
        .split_once("downto")
        .ok_or(TypeExprError::Unsupported)?;
    let high = parse_bit_index(high)?;
    let low = parse_bit_index(low)?;

    if high < low {
        return Err(TypeExprError::Reversed { high, low });
    }
    Ok(SignalType::Bus { high, low })
}

fn parse_bit_index(s: &str) -> Result<u32, TypeExprError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TypeExprError::Unsupported);
    }
    s.parse().map_err(|_| TypeExprError::Unsupported)
}

/// Returns `true` for a letter followed by letters, digits or underscores.
///
/// Port and design names are written unquoted into Tcl and Verilog, so
/// anything outside this set is rejected before generation.
pub fn is_hdl_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A parsed port: name, direction and width.
///
/// Built once per declared port by [`SignalDescriptor::parse`] and never
/// mutated afterwards. The width is always in `1..=64`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalDescriptor {
    name: String,
    direction: Direction,
    signal_type: SignalType,
    width: u32,
    description: String,
}

impl SignalDescriptor {
    /// Parses one port declaration.
    ///
    /// `name` must be an HDL identifier (see [`is_hdl_identifier`]).
    /// `direction` must be exactly `"in"` or `"out"`. `type_expr` must be
    /// `single bit` or `bus(H downto L)` with `H >= L`, and the resulting
    /// width must fit in one register.
    pub fn parse(
        name: &str,
        direction: &str,
        type_expr: &str,
        description: &str,
    ) -> Result<Self, AllocError> {
        if !is_hdl_identifier(name) {
            return Err(AllocError::InvalidSignalName {
                name: name.to_string(),
            });
        }
        let dir = Direction::parse(direction).ok_or_else(|| AllocError::UnsupportedDirection {
            name: name.to_string(),
            direction: direction.to_string(),
        })?;

        let signal_type = parse_type_expr(type_expr).map_err(|e| match e {
            TypeExprError::Unsupported => AllocError::UnsupportedSignalType {
                name: name.to_string(),
                type_expr: type_expr.to_string(),
            },
            TypeExprError::Reversed { high, low } => AllocError::InvalidBitRange {
                name: name.to_string(),
                high,
                low,
            },
        })?;

        let width = signal_type.width();
        if width > u64::from(REGISTER_WIDTH) {
            return Err(AllocError::SignalTooWide {
                name: name.to_string(),
                width,
                max: REGISTER_WIDTH,
            });
        }

        Ok(Self {
            name: name.to_string(),
            direction: dir,
            signal_type,
            // Bounded by REGISTER_WIDTH above.
            width: width as u32,
            description: description.to_string(),
        })
    }

    /// The port name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The port direction as seen from the user design.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The parsed type expression.
    pub fn signal_type(&self) -> SignalType {
        self.signal_type
    }

    /// Number of bits, in `1..=64`.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Free-form description carried over from the declaration.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A port declaration as handed over by a project-file reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSignal<'a> {
    /// Port name.
    pub name: &'a str,
    /// `"in"` or `"out"`.
    pub direction: &'a str,
    /// `"single bit"` or `"bus(H downto L)"`.
    pub type_expr: &'a str,
    /// Free-form description.
    pub description: &'a str,
}

/// The ports of a design after clock removal and parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedSignals {
    /// Name of the global clock port, if the design declares one.
    pub clock: Option<String>,
    /// All other ports in declaration order.
    pub signals: Vec<SignalDescriptor>,
}

/// Parses every declaration in order, dropping the global clock port.
///
/// The clock is recognized by exact name match before its type is looked
/// at; it is routed directly and never occupies a register. Declarations
/// with an empty name are skipped. Names, the clock included, must be HDL
/// identifiers and unique. The first malformed declaration aborts
/// extraction.
pub fn extract_signals<'a, I>(decls: I, clock_name: &str) -> Result<ExtractedSignals, AllocError>
where
    I: IntoIterator<Item = RawSignal<'a>>,
{
    let mut clock = None;
    let mut signals = Vec::new();
    let mut seen = BTreeSet::new();

    for decl in decls {
        if decl.name.is_empty() {
            tracing::warn!("skipping port declaration without a name");
            continue;
        }
        if !is_hdl_identifier(decl.name) {
            return Err(AllocError::InvalidSignalName {
                name: decl.name.to_string(),
            });
        }
        if !seen.insert(decl.name) {
            return Err(AllocError::DuplicateSignal {
                name: decl.name.to_string(),
            });
        }
        if decl.name == clock_name {
            tracing::info!(port = decl.name, "global clock detected, routed directly");
            clock = Some(decl.name.to_string());
            continue;
        }

        let signal =
            SignalDescriptor::parse(decl.name, decl.direction, decl.type_expr, decl.description)?;
        tracing::debug!(
            port = signal.name(),
            direction = %signal.direction(),
            width = signal.width(),
            "parsed port"
        );
        signals.push(signal);
    }

    Ok(ExtractedSignals { clock, signals })
}
