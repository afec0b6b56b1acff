//! Single-pass, last-fit register allocation.
//!
//! Ports are placed strictly in declaration order. Only the most recently
//! created register is ever reused: a port goes there when the register has
//! the right direction and enough free bits, otherwise a new register is
//! opened at the next address. A register that is passed over is never
//! revisited, so the address layout depends only on the port order.

use crate::error::AllocError;
use crate::register::Register;
use crate::signal::SignalDescriptor;

/// Records that one port occupies bits `[bit_low, bit_high]` of a register.
///
/// Only [`Allocator`] creates connections; the port and register indices
/// refer to the allocation that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    signal: usize,
    register: usize,
    bit_high: u32,
    bit_low: u32,
}

impl Connection {
    /// Index into [`Allocation::signals`].
    pub fn signal(&self) -> usize {
        self.signal
    }

    /// Index into [`Allocation::registers`].
    pub fn register(&self) -> usize {
        self.register
    }

    /// Highest bit occupied by the port.
    pub fn bit_high(&self) -> u32 {
        self.bit_high
    }

    /// Lowest bit occupied by the port.
    pub fn bit_low(&self) -> u32 {
        self.bit_low
    }
}

/// A connection with its port and register resolved.
#[derive(Clone, Copy, Debug)]
pub struct Binding<'a> {
    /// The connected port.
    pub signal: &'a SignalDescriptor,
    /// The register holding it.
    pub register: &'a Register,
    /// Highest occupied bit.
    pub bit_high: u32,
    /// Lowest occupied bit.
    pub bit_low: u32,
}

impl Binding<'_> {
    /// Bus address of the owning register.
    pub fn address(&self) -> u64 {
        self.register.address()
    }

    /// Number of bits in the slice.
    pub fn width(&self) -> u32 {
        self.bit_high - self.bit_low + 1
    }
}

/// The finished allocation: ports, registers and the connections between
/// them, all in creation order.
///
/// This is the single input of every artifact generator. It can only be
/// built by [`Allocator`], so its contents always satisfy the packing
/// invariants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    signals: Vec<SignalDescriptor>,
    registers: Vec<Register>,
    connections: Vec<Connection>,
}

impl Allocation {
    /// Ports in declaration order.
    pub fn signals(&self) -> &[SignalDescriptor] {
        &self.signals
    }

    /// Registers in creation order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Connections in port declaration order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Returns `true` if no port was allocated.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Resolves a connection against this allocation.
    ///
    /// Returns `None` if the connection belongs to a different allocation
    /// and points past its ports or registers.
    pub fn binding(&self, connection: &Connection) -> Option<Binding<'_>> {
        Some(Binding {
            signal: self.signals.get(connection.signal)?,
            register: self.registers.get(connection.register)?,
            bit_high: connection.bit_high,
            bit_low: connection.bit_low,
        })
    }

    /// All connections, resolved, in port declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = Binding<'_>> + '_ {
        self.connections.iter().map(move |c| self.resolve(c))
    }

    /// The connections of one register, in port declaration order.
    pub fn bindings_for(&self, register: usize) -> impl Iterator<Item = Binding<'_>> + '_ {
        self.connections
            .iter()
            .filter(move |c| c.register == register)
            .map(move |c| self.resolve(c))
    }

    // Own connections always index in bounds: `Allocator::place` pushes the
    // port and, when needed, the register before recording the connection.
    fn resolve(&self, connection: &Connection) -> Binding<'_> {
        Binding {
            signal: &self.signals[connection.signal],
            register: &self.registers[connection.register],
            bit_high: connection.bit_high,
            bit_low: connection.bit_low,
        }
    }
}

/// Incremental allocator. Owns the growing register list for one run.
#[derive(Debug, Default)]
pub struct Allocator {
    allocation: Allocation,
}

impl Allocator {
    /// Creates an allocator with no registers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places one port and returns its connection.
    pub fn place(&mut self, signal: SignalDescriptor) -> Result<Connection, AllocError> {
        let reg_dir = signal.direction().opposite();
        let width = signal.width();
        let registers = &mut self.allocation.registers;

        let reuse = registers
            .last()
            .is_some_and(|r| r.direction() == reg_dir && r.has_capacity_for(width));
        if !reuse {
            let reg = Register::new(registers.len(), reg_dir);
            tracing::debug!(
                register = %reg.name(),
                address = reg.address(),
                "opened register"
            );
            registers.push(reg);
        }

        let register = registers.len() - 1;
        let start_bit = registers[register].connect(width)?;
        let connection = Connection {
            signal: self.allocation.signals.len(),
            register,
            bit_high: start_bit,
            bit_low: start_bit + 1 - width,
        };
        tracing::debug!(
            port = signal.name(),
            register = %registers[register].name(),
            bit_high = connection.bit_high,
            bit_low = connection.bit_low,
            "connected port"
        );

        self.allocation.signals.push(signal);
        self.allocation.connections.push(connection);
        Ok(connection)
    }

    /// Finishes the run and hands out the allocation.
    pub fn finish(self) -> Allocation {
        self.allocation
    }
}

/// Allocates every port in order.
///
/// Any error aborts the whole allocation. [`AllocError::RegisterOverflow`]
/// here means the allocator itself is broken.
pub fn allocate<I>(signals: I) -> Result<Allocation, AllocError>
where
    I: IntoIterator<Item = SignalDescriptor>,
{
    let mut allocator = Allocator::new();
    for signal in signals {
        allocator.place(signal)?;
    }
    let allocation = allocator.finish();
    tracing::info!(
        ports = allocation.connections().len(),
        registers = allocation.registers().len(),
        "allocation complete"
    );
    Ok(allocation)
}
