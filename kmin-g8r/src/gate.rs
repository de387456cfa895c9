// SPDX-License-Identifier: Apache-2.0

//! Gate-level data model: the closed set of gate kinds, the gate node itself,
//! and the structural violations a gate (or a circuit built from gates) can
//! exhibit.

use std::fmt;

/// Stable handle to a gate slot in a [`crate::netlist::Netlist`].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct GateRef {
    pub id: usize,
}

impl fmt::Display for GateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.id)
    }
}

/// Whether a gate is a circuit output is a role (membership in a circuit's
/// output list), not a kind.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum GateKind {
    And,
    Or,
    Xor,
    Not,
    Input,
}

impl GateKind {
    /// Number of input slots the kind requires to be connected.
    pub fn arity(&self) -> usize {
        match self {
            GateKind::And | GateKind::Or | GateKind::Xor => 2,
            GateKind::Not => 1,
            GateKind::Input => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
            GateKind::Not => "NOT",
            GateKind::Input => "INPUT",
        }
    }

    /// Computes the gate function; `b` is ignored for unary kinds. Returns
    /// `None` for `Input`, which never computes.
    pub fn apply(&self, a: bool, b: bool) -> Option<bool> {
        match self {
            GateKind::And => Some(a && b),
            GateKind::Or => Some(a || b),
            GateKind::Xor => Some(a ^ b),
            GateKind::Not => Some(!a),
            GateKind::Input => None,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub kind: GateKind,
    /// Ordered operand slots; `Not` only uses slot 0 and `Input` uses neither.
    pub inputs: [Option<GateRef>; 2],
    /// Consumers of this gate's value. Unordered; only used for traversal and
    /// integrity checks.
    pub fanout: Vec<GateRef>,
    /// Operands that have produced a value during the current evaluation.
    pub ready_count: usize,
    /// Last computed value.
    pub value: bool,
}

impl Gate {
    pub fn new(kind: GateKind) -> Self {
        Self {
            kind,
            inputs: [None, None],
            fanout: Vec::new(),
            ready_count: 0,
            value: false,
        }
    }

    /// Operands still outstanding in the current evaluation round.
    pub fn pending_count(&self) -> usize {
        self.kind.arity().saturating_sub(self.ready_count)
    }

    /// Iterates the connected operand slots in slot order.
    pub fn operands(&self) -> impl Iterator<Item = GateRef> + '_ {
        self.inputs.iter().flatten().copied()
    }

    pub fn connected_count(&self) -> usize {
        self.inputs.iter().filter(|slot| slot.is_some()).count()
    }

    /// Checks the per-kind structural invariant of the gate at `at`.
    ///
    /// * `Input`: no operand connected and at least one consumer.
    /// * `Not`: exactly slot 0 connected.
    /// * `And` / `Or` / `Xor`: both slots connected.
    pub fn validate(&self, at: GateRef) -> Result<(), Violation> {
        match self.kind {
            GateKind::Input => {
                if self.connected_count() != 0 {
                    return Err(Violation::ExtraInput(at));
                }
                if self.fanout.is_empty() {
                    return Err(Violation::UnusedInput(at));
                }
            }
            GateKind::Not => {
                if self.inputs[0].is_none() {
                    return Err(Violation::MissingInput(at));
                }
                if self.inputs[1].is_some() {
                    return Err(Violation::ExtraInput(at));
                }
            }
            GateKind::And | GateKind::Or | GateKind::Xor => {
                if self.inputs.iter().any(Option::is_none) {
                    return Err(Violation::MissingInput(at));
                }
            }
        }
        Ok(())
    }
}

/// A structural invariant that a gate or circuit fails to uphold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A required operand slot is empty.
    MissingInput(GateRef),
    /// A slot is connected that the kind does not allow.
    ExtraInput(GateRef),
    /// An `Input` gate that nothing consumes.
    UnusedInput(GateRef),
    /// A non-output gate with no consumers.
    VoidGate(GateRef),
    /// `consumer` names `producer` in an operand slot but `producer`'s fanout
    /// does not list `consumer`, or the other way around.
    FanoutMismatch { producer: GateRef, consumer: GateRef },
    /// An input port holds a gate whose kind is not `Input`.
    NonInputPort { index: usize, gate: GateRef },
    /// An `Input` gate reachable from the circuit that is not one of its
    /// input ports.
    UnexpectedInputGate(GateRef),
    /// An output port that was reserved but never populated.
    UnassignedOutput(usize),
    /// An output port index past the end of the circuit's output list.
    NoSuchOutput { index: usize, ports: usize },
    /// A reference to a gate slot that has been freed or never existed.
    DanglingRef(GateRef),
    /// The operand graph contains a cycle through this gate.
    Cycle(GateRef),
    /// Pruning found an `Input` gate with no consumers.
    DeadInput(GateRef),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingInput(g) => write!(f, "gate {} is missing a required input", g),
            Violation::ExtraInput(g) => {
                write!(f, "gate {} has more inputs connected than its kind allows", g)
            }
            Violation::UnusedInput(g) => write!(f, "input gate {} has no consumers", g),
            Violation::VoidGate(g) => {
                write!(f, "gate {} has no consumers and is not a circuit output", g)
            }
            Violation::FanoutMismatch { producer, consumer } => write!(
                f,
                "fanout of {} and input slots of {} disagree",
                producer, consumer
            ),
            Violation::NonInputPort { index, gate } => write!(
                f,
                "input port {} holds gate {} which is not an INPUT gate",
                index, gate
            ),
            Violation::UnexpectedInputGate(g) => {
                write!(f, "INPUT gate {} is not one of the circuit's input ports", g)
            }
            Violation::UnassignedOutput(i) => write!(f, "output port {} was never assigned", i),
            Violation::NoSuchOutput { index, ports } => write!(
                f,
                "output port {} is out of range for a circuit with {} outputs",
                index, ports
            ),
            Violation::DanglingRef(g) => write!(f, "reference to freed gate {}", g),
            Violation::Cycle(g) => write!(f, "cycle detected through gate {}", g),
            Violation::DeadInput(g) => write!(f, "INPUT gate {} became dead", g),
        }
    }
}

impl std::error::Error for Violation {}
