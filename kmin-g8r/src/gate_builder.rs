// SPDX-License-Identifier: Apache-2.0

//! The `GateBuilder` wraps a [`Netlist`] while a generator is wiring gates
//! into it. It adds gates with the fail-fast wiring rules of the netlist,
//! provides the half adder used at the low end of every carry chain, and
//! instantiates child generators by splicing their INPUT ports onto driver
//! gates that already exist in the parent.
//!
//! Basic example usage:
//! ```
//! use kmin_g8r::gate_builder::GateBuilder;
//! use kmin_g8r::netlist::Netlist;
//!
//! let mut netlist = Netlist::new();
//! let mut gb = GateBuilder::new(&mut netlist);
//! let mut circuit = gb.new_circuit(2, 2);
//! let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
//! let ha = gb.add_half_adder(a, b).unwrap();
//! circuit.set_output(0, ha.sum).unwrap();
//! circuit.set_output(1, ha.carry).unwrap();
//! assert_eq!(circuit.evaluate(&mut netlist, &[true, true]).unwrap(), vec![false, true]);
//! ```

use std::fmt;

use crate::circuit::Circuit;
use crate::gate::{GateKind, GateRef, Violation};
use crate::netlist::{ConnectError, Netlist};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    InvalidWidth {
        generator: &'static str,
        width: usize,
    },
    /// A child circuit was instantiated with the wrong number of drivers.
    PortCount { expected: usize, got: usize },
    Connect(ConnectError),
    Structure(Violation),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidWidth { generator, width } => {
                write!(f, "{} does not support width {}", generator, width)
            }
            BuildError::PortCount { expected, got } => {
                write!(f, "expected {} driver gates, got {}", expected, got)
            }
            BuildError::Connect(e) => write!(f, "connect failed: {}", e),
            BuildError::Structure(v) => write!(f, "malformed circuit: {}", v),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<ConnectError> for BuildError {
    fn from(e: ConnectError) -> Self {
        BuildError::Connect(e)
    }
}

impl From<Violation> for BuildError {
    fn from(v: Violation) -> Self {
        BuildError::Structure(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfAdderOutput {
    pub sum: GateRef,
    pub carry: GateRef,
}

pub struct GateBuilder<'a> {
    netlist: &'a mut Netlist,
}

impl<'a> GateBuilder<'a> {
    pub fn new(netlist: &'a mut Netlist) -> Self {
        Self { netlist }
    }

    /// Allocates `fanin` INPUT gates and `fanout` unassigned output ports.
    pub fn new_circuit(&mut self, fanin: usize, fanout: usize) -> Circuit {
        Circuit::new(self.netlist, fanin, fanout)
    }

    pub fn add_and(&mut self, a: GateRef, b: GateRef) -> Result<GateRef, BuildError> {
        Ok(self.netlist.add_binary(GateKind::And, a, b)?)
    }

    pub fn add_or(&mut self, a: GateRef, b: GateRef) -> Result<GateRef, BuildError> {
        Ok(self.netlist.add_binary(GateKind::Or, a, b)?)
    }

    pub fn add_xor(&mut self, a: GateRef, b: GateRef) -> Result<GateRef, BuildError> {
        Ok(self.netlist.add_binary(GateKind::Xor, a, b)?)
    }

    pub fn add_not(&mut self, a: GateRef) -> Result<GateRef, BuildError> {
        Ok(self.netlist.add_not(a)?)
    }

    /// One XOR for the sum and one AND for the carry.
    pub fn add_half_adder(
        &mut self,
        a: GateRef,
        b: GateRef,
    ) -> Result<HalfAdderOutput, BuildError> {
        let sum = self.add_xor(a, b)?;
        let carry = self.add_and(a, b)?;
        Ok(HalfAdderOutput { sum, carry })
    }

    /// Runs `generator` against the same netlist and splices its input ports
    /// onto `drivers` (in port order). Returns the child's output gates in
    /// port order; the child's port lists are discarded.
    pub fn instantiate<F>(
        &mut self,
        generator: F,
        drivers: &[GateRef],
    ) -> Result<Vec<GateRef>, BuildError>
    where
        F: FnOnce(&mut Netlist) -> Result<Circuit, BuildError>,
    {
        let child = generator(&mut *self.netlist)?;
        child.splice(self.netlist, drivers)
    }
}
