// SPDX-License-Identifier: Apache-2.0

//! Arena that owns every gate. Circuits are views over it (ordered port
//! lists of [`GateRef`]s), so handing gates from a child generator to its
//! parent is just a matter of which port lists mention them.
//!
//! Every mutating wiring operation checks its preconditions up front and
//! returns an error without touching the arena when one fails.
//!
//! ```
//! use kmin_g8r::gate::GateKind;
//! use kmin_g8r::netlist::Netlist;
//!
//! let mut netlist = Netlist::new();
//! let a = netlist.add_input();
//! let b = netlist.add_input();
//! let and = netlist.add_binary(GateKind::And, a, b).unwrap();
//! assert_eq!(netlist.get(a).unwrap().fanout, vec![and]);
//! ```

use std::fmt;

use crate::gate::{Gate, GateKind, GateRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The gate being wired does not exist.
    MissingGate(GateRef),
    /// The operand being attached does not exist.
    MissingTarget(GateRef),
    SelfConnection(GateRef),
    /// `target` already occupies the other operand slot of `gate`.
    DuplicateInput { gate: GateRef, target: GateRef },
    /// Every slot the kind allows is already occupied.
    NoRoom(GateRef),
    ForbiddenKind { gate: GateRef, kind: GateKind },
    AlreadyConnected(GateRef),
    /// An INPUT placeholder with no consumers cannot be spliced.
    InputHasNoConsumers(GateRef),
    NotConnected { gate: GateRef, target: GateRef },
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::MissingGate(g) => write!(f, "gate {} does not exist", g),
            ConnectError::MissingTarget(t) => write!(f, "target gate {} does not exist", t),
            ConnectError::SelfConnection(g) => write!(f, "gate {} cannot consume itself", g),
            ConnectError::DuplicateInput { gate, target } => {
                write!(f, "gate {} is already connected to {}", gate, target)
            }
            ConnectError::NoRoom(g) => write!(f, "gate {} has no free input slot", g),
            ConnectError::ForbiddenKind { gate, kind } => {
                write!(f, "gate {} of kind {} cannot be wired that way", gate, kind)
            }
            ConnectError::AlreadyConnected(g) => {
                write!(f, "gate {} already has an input connected", g)
            }
            ConnectError::InputHasNoConsumers(g) => {
                write!(f, "input gate {} has no consumers to rewire", g)
            }
            ConnectError::NotConnected { gate, target } => {
                write!(f, "gate {} is not connected to {}", gate, target)
            }
        }
    }
}

impl std::error::Error for ConnectError {}

/// Gate storage addressed by stable indices. Freed slots are never reused, so
/// a stale [`GateRef`] reliably resolves to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    slots: Vec<Option<Gate>>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gate(&mut self, kind: GateKind) -> GateRef {
        let gate_ref = GateRef {
            id: self.slots.len(),
        };
        self.slots.push(Some(Gate::new(kind)));
        gate_ref
    }

    pub fn add_input(&mut self) -> GateRef {
        self.add_gate(GateKind::Input)
    }

    /// Allocates a binary gate wired to `a` (slot 0) and `b` (slot 1). On
    /// failure the new gate is released again.
    pub fn add_binary(
        &mut self,
        kind: GateKind,
        a: GateRef,
        b: GateRef,
    ) -> Result<GateRef, ConnectError> {
        let gate_ref = self.add_gate(kind);
        if let Err(e) = self.connect2(gate_ref, a, b) {
            self.slots[gate_ref.id] = None;
            return Err(e);
        }
        Ok(gate_ref)
    }

    pub fn add_not(&mut self, a: GateRef) -> Result<GateRef, ConnectError> {
        let gate_ref = self.add_gate(GateKind::Not);
        if let Err(e) = self.connect(gate_ref, a) {
            self.slots[gate_ref.id] = None;
            return Err(e);
        }
        Ok(gate_ref)
    }

    pub fn get(&self, gate_ref: GateRef) -> Option<&Gate> {
        self.slots.get(gate_ref.id).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, gate_ref: GateRef) -> Option<&mut Gate> {
        self.slots.get_mut(gate_ref.id).and_then(Option::as_mut)
    }

    pub fn contains(&self, gate_ref: GateRef) -> bool {
        self.get(gate_ref).is_some()
    }

    /// Frees the slot without touching neighbours' slot or fanout lists;
    /// callers are responsible for unlinking first (or freeing the whole
    /// connected region at once).
    pub fn remove(&mut self, gate_ref: GateRef) -> Option<Gate> {
        self.slots.get_mut(gate_ref.id).and_then(Option::take)
    }

    /// Number of live gates.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One past the largest index ever handed out.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GateRef, &Gate)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|g| (GateRef { id }, g)))
    }

    /// Attaches `target` as an operand of `gate` in its first free slot.
    ///
    /// When `gate` is an INPUT placeholder this instead splices: every
    /// consumer of `gate` is rewired to consume `target` and `gate` is freed.
    pub fn connect(&mut self, gate: GateRef, target: GateRef) -> Result<(), ConnectError> {
        let kind = self.get(gate).ok_or(ConnectError::MissingGate(gate))?.kind;
        if !self.contains(target) {
            return Err(ConnectError::MissingTarget(target));
        }
        if gate == target {
            return Err(ConnectError::SelfConnection(gate));
        }
        if kind == GateKind::Input {
            return self.splice_input(gate, target);
        }

        let g = self.get(gate).ok_or(ConnectError::MissingGate(gate))?;
        let slot = (0..kind.arity())
            .find(|&i| g.inputs[i].is_none())
            .ok_or(ConnectError::NoRoom(gate))?;
        if g.inputs.contains(&Some(target)) {
            return Err(ConnectError::DuplicateInput { gate, target });
        }
        self.link(gate, slot, target);
        Ok(())
    }

    /// Wires both operand slots of a binary gate at once.
    pub fn connect2(&mut self, gate: GateRef, a: GateRef, b: GateRef) -> Result<(), ConnectError> {
        let g = self.get(gate).ok_or(ConnectError::MissingGate(gate))?;
        if g.kind.arity() != 2 {
            return Err(ConnectError::ForbiddenKind {
                gate,
                kind: g.kind,
            });
        }
        if g.connected_count() != 0 {
            return Err(ConnectError::AlreadyConnected(gate));
        }
        for target in [a, b] {
            if !self.contains(target) {
                return Err(ConnectError::MissingTarget(target));
            }
            if target == gate {
                return Err(ConnectError::SelfConnection(gate));
            }
        }
        if a == b {
            return Err(ConnectError::DuplicateInput { gate, target: b });
        }
        self.link(gate, 0, a);
        self.link(gate, 1, b);
        Ok(())
    }

    /// Removes `target` from whichever operand slot of `gate` holds it.
    pub fn disconnect(&mut self, gate: GateRef, target: GateRef) -> Result<(), ConnectError> {
        let g = self.get_mut(gate).ok_or(ConnectError::MissingGate(gate))?;
        let slot = g
            .inputs
            .iter()
            .position(|s| *s == Some(target))
            .ok_or(ConnectError::NotConnected { gate, target })?;
        g.inputs[slot] = None;
        if let Some(t) = self.get_mut(target) {
            if let Some(pos) = t.fanout.iter().position(|c| *c == gate) {
                t.fanout.swap_remove(pos);
            }
        }
        Ok(())
    }

    fn link(&mut self, gate: GateRef, slot: usize, target: GateRef) {
        if let Some(g) = self.get_mut(gate) {
            g.inputs[slot] = Some(target);
        }
        if let Some(t) = self.get_mut(target) {
            t.fanout.push(gate);
        }
    }

    fn splice_input(&mut self, input: GateRef, target: GateRef) -> Result<(), ConnectError> {
        let consumers = match self.get(input) {
            Some(g) => g.fanout.clone(),
            None => return Err(ConnectError::MissingGate(input)),
        };
        if consumers.is_empty() {
            return Err(ConnectError::InputHasNoConsumers(input));
        }
        for &consumer in &consumers {
            if consumer == target {
                return Err(ConnectError::SelfConnection(target));
            }
            let c = self
                .get(consumer)
                .ok_or(ConnectError::MissingGate(consumer))?;
            if c.inputs.contains(&Some(target)) {
                return Err(ConnectError::DuplicateInput {
                    gate: consumer,
                    target,
                });
            }
        }

        let mut rewired = consumers;
        rewired.sort();
        rewired.dedup();
        for consumer in rewired {
            let mut hits = 0;
            if let Some(c) = self.get_mut(consumer) {
                for slot in c.inputs.iter_mut() {
                    if *slot == Some(input) {
                        *slot = Some(target);
                        hits += 1;
                    }
                }
            }
            if let Some(t) = self.get_mut(target) {
                t.fanout.extend(std::iter::repeat_n(consumer, hits));
            }
        }
        log::trace!("spliced input {} onto {}", input, target);
        self.slots[input.id] = None;
        Ok(())
    }
}
