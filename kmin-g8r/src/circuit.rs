// SPDX-License-Identifier: Apache-2.0

//! A [`Circuit`] is an ordered list of input ports and an ordered list of
//! output ports over a [`Netlist`]. The gates it "owns" are the ones
//! reachable from those ports; there is no separate ownership record.
//!
//! [`CircuitFn`] bundles a private netlist with a circuit for callers that
//! just want a self-contained function of bits.

use std::collections::HashSet;

use crate::dce;
use crate::emit;
use crate::gate::{Gate, GateKind, GateRef, Violation};
use crate::gate_builder::BuildError;
use crate::gate_sim::{self, Collect, EvalError};
use crate::get_summary_stats::{self, SummaryStats};
use crate::netlist::Netlist;
use crate::topo;

/// Port lists of a circuit whose outputs have all been assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ports {
    pub inputs: Vec<GateRef>,
    pub outputs: Vec<GateRef>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Circuit {
    pub inputs: Vec<GateRef>,
    /// `None` until the generator building the circuit fills the port in.
    pub outputs: Vec<Option<GateRef>>,
}

impl Circuit {
    pub fn new(netlist: &mut Netlist, fanin: usize, fanout: usize) -> Self {
        let inputs = (0..fanin).map(|_| netlist.add_input()).collect();
        Self {
            inputs,
            outputs: vec![None; fanout],
        }
    }

    /// Adopts gates that already exist in the netlist as this circuit's
    /// ports, e.g. the input ports of detached children.
    pub fn from_ports(inputs: Vec<GateRef>, outputs: Vec<GateRef>) -> Self {
        Self {
            inputs,
            outputs: outputs.into_iter().map(Some).collect(),
        }
    }

    pub fn set_output(&mut self, index: usize, gate: GateRef) -> Result<(), Violation> {
        let ports = self.outputs.len();
        let slot = self
            .outputs
            .get_mut(index)
            .ok_or(Violation::NoSuchOutput { index, ports })?;
        *slot = Some(gate);
        Ok(())
    }

    pub fn output_refs(&self) -> Result<Vec<GateRef>, Violation> {
        self.outputs
            .iter()
            .enumerate()
            .map(|(i, o)| o.ok_or(Violation::UnassignedOutput(i)))
            .collect()
    }

    /// Drops the view and hands its port lists to the caller; no gate is
    /// touched.
    pub fn detach(self) -> Result<Ports, Violation> {
        let outputs = self.output_refs()?;
        Ok(Ports {
            inputs: self.inputs,
            outputs,
        })
    }

    /// Splices every input port onto the matching driver gate (see
    /// [`Netlist::connect`]) and detaches, returning the output gates in port
    /// order.
    pub fn splice(
        self,
        netlist: &mut Netlist,
        drivers: &[GateRef],
    ) -> Result<Vec<GateRef>, BuildError> {
        if drivers.len() != self.inputs.len() {
            return Err(BuildError::PortCount {
                expected: self.inputs.len(),
                got: drivers.len(),
            });
        }
        let ports = self.detach()?;
        for (&input, &driver) in ports.inputs.iter().zip(drivers) {
            netlist.connect(input, driver)?;
        }
        // An output that was an input port now lives on as its driver.
        let outputs = ports
            .outputs
            .iter()
            .map(|o| match ports.inputs.iter().position(|i| i == o) {
                Some(p) => drivers[p],
                None => *o,
            })
            .collect();
        Ok(outputs)
    }

    /// Every gate reachable from the ports, in breadth-first order.
    pub fn gates(&self, netlist: &Netlist) -> Result<Vec<GateRef>, Violation> {
        let outputs: Vec<GateRef> = self.outputs.iter().flatten().copied().collect();
        topo::reachable(netlist, &self.inputs, &outputs)
    }

    /// Copies the circuit's gates from `src` into fresh slots of `dst`,
    /// preserving topology and port order.
    pub fn clone_into(&self, src: &Netlist, dst: &mut Netlist) -> Result<Circuit, Violation> {
        let snapshot = self.snapshot(src)?;
        Ok(self.rebuild(snapshot, dst))
    }

    /// [`Circuit::clone_into`] with source and destination being the same
    /// netlist.
    pub fn clone_within(&self, netlist: &mut Netlist) -> Result<Circuit, Violation> {
        let snapshot = self.snapshot(netlist)?;
        Ok(self.rebuild(snapshot, netlist))
    }

    fn snapshot(&self, netlist: &Netlist) -> Result<Vec<(GateRef, Gate)>, Violation> {
        self.gates(netlist)?
            .into_iter()
            .map(|r| {
                netlist
                    .get(r)
                    .map(|g| (r, g.clone()))
                    .ok_or(Violation::DanglingRef(r))
            })
            .collect()
    }

    fn rebuild(&self, snapshot: Vec<(GateRef, Gate)>, dst: &mut Netlist) -> Circuit {
        let mut old_to_new = std::collections::HashMap::new();
        for (old, gate) in &snapshot {
            old_to_new.insert(*old, dst.add_gate(gate.kind));
        }
        let remap = |r: GateRef| old_to_new[&r];
        for (old, gate) in snapshot {
            if let Some(new_gate) = dst.get_mut(remap(old)) {
                new_gate.inputs = gate.inputs.map(|slot| slot.map(remap));
                new_gate.fanout = gate.fanout.iter().map(|&c| remap(c)).collect();
                new_gate.value = gate.value;
            }
        }
        Circuit {
            inputs: self.inputs.iter().map(|&r| remap(r)).collect(),
            outputs: self.outputs.iter().map(|o| o.map(remap)).collect(),
        }
    }

    /// Checks port assignment, every gate's per-kind invariant, fanout and
    /// operand-slot agreement, the absence of void gates, and acyclicity.
    /// Reports the first violation found.
    pub fn validate(&self, netlist: &Netlist) -> Result<(), Violation> {
        let outputs = self.output_refs()?;
        for (index, &input) in self.inputs.iter().enumerate() {
            let gate = netlist.get(input).ok_or(Violation::DanglingRef(input))?;
            if gate.kind != GateKind::Input {
                return Err(Violation::NonInputPort { index, gate: input });
            }
        }
        let input_set: HashSet<GateRef> = self.inputs.iter().copied().collect();
        let output_set: HashSet<GateRef> = outputs.iter().copied().collect();

        for current in topo::reachable(netlist, &self.inputs, &outputs)? {
            let gate = netlist
                .get(current)
                .ok_or(Violation::DanglingRef(current))?;
            gate.validate(current)?;
            if gate.kind == GateKind::Input && !input_set.contains(&current) {
                return Err(Violation::UnexpectedInputGate(current));
            }
            if gate.fanout.is_empty() && !output_set.contains(&current) {
                return Err(Violation::VoidGate(current));
            }
            for producer in gate.operands() {
                let p = netlist
                    .get(producer)
                    .ok_or(Violation::DanglingRef(producer))?;
                let listed = p.fanout.iter().filter(|&&c| c == current).count();
                let wired = gate.operands().filter(|&o| o == producer).count();
                if listed != wired {
                    return Err(Violation::FanoutMismatch {
                        producer,
                        consumer: current,
                    });
                }
            }
            for &consumer in &gate.fanout {
                let c = netlist
                    .get(consumer)
                    .ok_or(Violation::DanglingRef(consumer))?;
                if !c.inputs.contains(&Some(current)) {
                    return Err(Violation::FanoutMismatch {
                        producer: current,
                        consumer,
                    });
                }
            }
        }
        topo::topo_order(netlist, &outputs)?;
        Ok(())
    }

    /// Resets the per-evaluation counters of every reachable gate.
    pub fn clear_state(&self, netlist: &mut Netlist) -> Result<(), Violation> {
        for r in self.gates(netlist)? {
            if let Some(g) = netlist.get_mut(r) {
                g.ready_count = 0;
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, netlist: &mut Netlist, inputs: &[bool]) -> Result<Vec<bool>, EvalError> {
        Ok(gate_sim::eval(self, netlist, inputs, Collect::None)?.outputs)
    }

    /// Number of reachable gates that are neither INPUT nor NOT.
    pub fn size(&self, netlist: &Netlist) -> Result<usize, Violation> {
        let mut count = 0;
        for r in self.gates(netlist)? {
            let g = netlist.get(r).ok_or(Violation::DanglingRef(r))?;
            if !matches!(g.kind, GateKind::Input | GateKind::Not) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Frees every reachable gate. Returns how many were freed.
    pub fn destroy(self, netlist: &mut Netlist) -> Result<usize, Violation> {
        let gates = self.gates(netlist)?;
        for &r in &gates {
            netlist.remove(r);
        }
        log::debug!("destroyed {} gates", gates.len());
        Ok(gates.len())
    }

    /// Removes gates that feed nothing and are not outputs, cascading into
    /// their operands. Returns how many were removed.
    pub fn prune_dead(&self, netlist: &mut Netlist) -> Result<usize, Violation> {
        dce::prune_dead(self, netlist)
    }
}

/// A circuit together with the netlist that holds its gates.
#[derive(Debug)]
pub struct CircuitFn {
    pub name: String,
    pub netlist: Netlist,
    pub circuit: Circuit,
}

impl CircuitFn {
    pub fn build<F>(name: &str, generator: F) -> Result<Self, BuildError>
    where
        F: FnOnce(&mut Netlist) -> Result<Circuit, BuildError>,
    {
        let mut netlist = Netlist::new();
        let circuit = generator(&mut netlist)?;
        log::debug!(
            "built {}: {} inputs, {} outputs, {} gates",
            name,
            circuit.inputs.len(),
            circuit.outputs.len(),
            netlist.len()
        );
        Ok(Self {
            name: name.to_string(),
            netlist,
            circuit,
        })
    }

    pub fn input_count(&self) -> usize {
        self.circuit.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.circuit.outputs.len()
    }

    pub fn evaluate(&mut self, inputs: &[bool]) -> Result<Vec<bool>, EvalError> {
        self.circuit.evaluate(&mut self.netlist, inputs)
    }

    pub fn validate(&self) -> Result<(), Violation> {
        self.circuit.validate(&self.netlist)
    }

    pub fn size(&self) -> Result<usize, Violation> {
        self.circuit.size(&self.netlist)
    }

    pub fn prune_dead(&mut self) -> Result<usize, Violation> {
        self.circuit.prune_dead(&mut self.netlist)
    }

    /// Structure-preserving copy into a fresh, compact netlist.
    pub fn deep_clone(&self) -> Result<CircuitFn, Violation> {
        let mut netlist = Netlist::new();
        let circuit = self.circuit.clone_into(&self.netlist, &mut netlist)?;
        Ok(CircuitFn {
            name: self.name.clone(),
            netlist,
            circuit,
        })
    }

    pub fn summary_stats(&self) -> Result<SummaryStats, Violation> {
        get_summary_stats::get_summary_stats(&self.circuit, &self.netlist)
    }

    pub fn to_text(&self) -> Result<String, Violation> {
        emit::emit_text(&self.name, &self.circuit, &self.netlist)
    }
}
