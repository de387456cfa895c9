// SPDX-License-Identifier: Apache-2.0

//! Event-driven evaluation: INPUT gates are seeded and queued, and a consumer
//! is computed (and queued in turn) once as many of its operands have
//! produced a value as its kind requires. Termination relies on the graph
//! being acyclic.

use std::collections::VecDeque;
use std::fmt;

use bitvec::vec::BitVec;

use crate::circuit::Circuit;
use crate::gate::{GateKind, GateRef, Violation};
use crate::netlist::Netlist;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    InputLengthMismatch { expected: usize, got: usize },
    NoOutputs,
    /// A gate of this kind turned up where it cannot be computed.
    UnexpectedKind { gate: GateRef, kind: GateKind },
    /// Propagation finished without reaching this output port.
    UnresolvedOutput { index: usize, gate: GateRef },
    Structure(Violation),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::InputLengthMismatch { expected, got } => {
                write!(f, "expected {} input bits, got {}", expected, got)
            }
            EvalError::NoOutputs => write!(f, "circuit has no outputs"),
            EvalError::UnexpectedKind { gate, kind } => {
                write!(f, "unexpected {} gate {} during propagation", kind, gate)
            }
            EvalError::UnresolvedOutput { index, gate } => {
                write!(f, "output port {} (gate {}) was never computed", index, gate)
            }
            EvalError::Structure(v) => write!(f, "malformed circuit: {}", v),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<Violation> for EvalError {
    fn from(v: Violation) -> Self {
        EvalError::Structure(v)
    }
}

pub struct GateSimResult {
    /// One bit per output port, in port order.
    pub outputs: Vec<bool>,
    /// Value of every netlist slot, indexed by gate id (freed or unreached
    /// slots read as false).
    pub all_values: Option<BitVec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    None,
    All,
}

pub fn eval(
    circuit: &Circuit,
    netlist: &mut Netlist,
    inputs: &[bool],
    collect: Collect,
) -> Result<GateSimResult, EvalError> {
    if inputs.len() != circuit.inputs.len() {
        return Err(EvalError::InputLengthMismatch {
            expected: circuit.inputs.len(),
            got: inputs.len(),
        });
    }
    if circuit.outputs.is_empty() {
        return Err(EvalError::NoOutputs);
    }
    let outputs = circuit.output_refs()?;
    circuit.clear_state(netlist)?;

    let mut resolved: BitVec = BitVec::repeat(false, netlist.capacity());
    let mut worklist: VecDeque<GateRef> = VecDeque::new();

    for (&port, &bit) in circuit.inputs.iter().zip(inputs) {
        let gate = netlist
            .get_mut(port)
            .ok_or(Violation::DanglingRef(port))?;
        if gate.kind != GateKind::Input {
            return Err(EvalError::UnexpectedKind {
                gate: port,
                kind: gate.kind,
            });
        }
        gate.value = bit;
        resolved.set(port.id, true);
        worklist.push_back(port);
    }

    while let Some(current) = worklist.pop_front() {
        // Index into the producer's fanout afresh each step; the body needs
        // the netlist mutably.
        for index in 0.. {
            let producer = netlist
                .get(current)
                .ok_or(Violation::DanglingRef(current))?;
            let Some(&consumer) = producer.fanout.get(index) else {
                break;
            };
            let c = netlist
                .get_mut(consumer)
                .ok_or(Violation::DanglingRef(consumer))?;
            if c.kind == GateKind::Input {
                return Err(EvalError::UnexpectedKind {
                    gate: consumer,
                    kind: c.kind,
                });
            }
            c.ready_count += 1;
            if c.ready_count < c.kind.arity() {
                continue;
            }
            if c.ready_count > c.kind.arity() {
                return Err(Violation::ExtraInput(consumer).into());
            }

            let (kind, slots) = (c.kind, c.inputs);
            let mut operand_values = [false; 2];
            for (value, slot) in operand_values.iter_mut().zip(slots) {
                if let Some(r) = slot {
                    *value = netlist.get(r).ok_or(Violation::DanglingRef(r))?.value;
                }
            }
            let value = kind
                .apply(operand_values[0], operand_values[1])
                .ok_or(EvalError::UnexpectedKind {
                    gate: consumer,
                    kind,
                })?;
            log::trace!("{} {} = {}", kind, consumer, value);
            if let Some(c) = netlist.get_mut(consumer) {
                c.value = value;
            }
            resolved.set(consumer.id, true);
            worklist.push_back(consumer);
        }
    }

    let mut values = Vec::with_capacity(outputs.len());
    for (index, &gate) in outputs.iter().enumerate() {
        if !resolved[gate.id] {
            return Err(EvalError::UnresolvedOutput { index, gate });
        }
        let g = netlist.get(gate).ok_or(Violation::DanglingRef(gate))?;
        values.push(g.value);
    }

    let all_values = match collect {
        Collect::None => None,
        Collect::All => {
            let mut bits = BitVec::repeat(false, netlist.capacity());
            for (r, g) in netlist.iter() {
                bits.set(r.id, resolved[r.id] && g.value);
            }
            Some(bits)
        }
    };

    Ok(GateSimResult {
        outputs: values,
        all_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::Netlist;
    use test_case::test_case;

    fn single_gate(kind: GateKind) -> (Netlist, Circuit) {
        let mut nl = Netlist::new();
        let fanin = kind.arity();
        let mut circuit = Circuit::new(&mut nl, fanin, 1);
        let g = match kind {
            GateKind::Not => nl.add_not(circuit.inputs[0]).unwrap(),
            _ => nl
                .add_binary(kind, circuit.inputs[0], circuit.inputs[1])
                .unwrap(),
        };
        circuit.set_output(0, g).unwrap();
        (nl, circuit)
    }

    #[test_case(GateKind::And, &[true, true], true)]
    #[test_case(GateKind::And, &[true, false], false)]
    #[test_case(GateKind::Or, &[false, true], true)]
    #[test_case(GateKind::Or, &[false, false], false)]
    #[test_case(GateKind::Xor, &[true, true], false)]
    #[test_case(GateKind::Xor, &[false, true], true)]
    #[test_case(GateKind::Not, &[false], true)]
    #[test_case(GateKind::Not, &[true], false)]
    fn test_single_gate(kind: GateKind, inputs: &[bool], want: bool) {
        let (mut nl, circuit) = single_gate(kind);
        let result = eval(&circuit, &mut nl, inputs, Collect::None).unwrap();
        assert_eq!(result.outputs, vec![want]);
        assert!(result.all_values.is_none());
    }

    #[test]
    fn test_input_length_mismatch() {
        let (mut nl, circuit) = single_gate(GateKind::And);
        assert_eq!(
            circuit.evaluate(&mut nl, &[true]),
            Err(EvalError::InputLengthMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_no_outputs() {
        let mut nl = Netlist::new();
        let circuit = Circuit::new(&mut nl, 1, 0);
        assert_eq!(circuit.evaluate(&mut nl, &[true]), Err(EvalError::NoOutputs));
    }

    #[test]
    fn test_unresolved_output_is_an_error() {
        let (mut nl, circuit) = single_gate(GateKind::And);
        let out = circuit.outputs[0].unwrap();
        nl.disconnect(out, circuit.inputs[1]).unwrap();
        assert_eq!(
            circuit.evaluate(&mut nl, &[true, true]),
            Err(EvalError::UnresolvedOutput {
                index: 0,
                gate: out
            })
        );
    }

    #[test]
    fn test_collect_all_values() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 1);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let x = nl.add_binary(GateKind::Xor, a, b).unwrap();
        let n = nl.add_not(x).unwrap();
        circuit.set_output(0, n).unwrap();
        let result = eval(&circuit, &mut nl, &[true, false], Collect::All).unwrap();
        let all = result.all_values.unwrap();
        assert!(all[a.id]);
        assert!(!all[b.id]);
        assert!(all[x.id]);
        assert!(!all[n.id]);
        assert_eq!(result.outputs, vec![false]);
    }

    #[test]
    fn test_wide_fanout_reaches_every_consumer() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 4);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let kinds = [GateKind::And, GateKind::Or, GateKind::Xor];
        for (i, kind) in kinds.into_iter().enumerate() {
            let g = nl.add_binary(kind, a, b).unwrap();
            circuit.set_output(i, g).unwrap();
        }
        let inv = nl.add_not(a).unwrap();
        circuit.set_output(3, inv).unwrap();
        assert_eq!(nl.get(a).unwrap().fanout.len(), 4);

        for (inputs, want) in [
            ([false, false], [false, false, false, true]),
            ([true, false], [false, true, true, false]),
            ([true, true], [true, true, false, false]),
        ] {
            let result = eval(&circuit, &mut nl, &inputs, Collect::None).unwrap();
            assert_eq!(result.outputs, want.to_vec());
        }
    }
}
