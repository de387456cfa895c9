// SPDX-License-Identifier: Apache-2.0

use crate::circuit::Circuit;
use crate::gate::{GateKind, GateRef, Violation};
use crate::netlist::Netlist;
use crate::topo;
use std::collections::HashSet;

/// Worklist-based pruning: removes every reachable gate that has no
/// consumers and is not an output port, then revisits its operands since
/// they may have just lost their last consumer. Returns the number of gates
/// removed.
///
/// The whole dead cone is collected and checked before any gate is freed, so
/// on error the netlist is left untouched.
pub fn prune_dead(circuit: &Circuit, netlist: &mut Netlist) -> Result<usize, Violation> {
    let dead = find_dead(circuit, netlist)?;
    for &current in &dead {
        let Some(gate) = netlist.remove(current) else {
            continue;
        };
        log::trace!("pruned dead gate {}", current);
        for operand in gate.operands() {
            if let Some(p) = netlist.get_mut(operand) {
                p.fanout.retain(|&c| c != current);
            }
        }
    }
    log::debug!("prune_dead removed {} gates", dead.len());
    Ok(dead.len())
}

/// Returns the cascading dead set in discovery order (consumers before their
/// operands) without modifying the netlist.
fn find_dead(circuit: &Circuit, netlist: &Netlist) -> Result<Vec<GateRef>, Violation> {
    let outputs = circuit.output_refs()?;
    let output_set: HashSet<GateRef> = outputs.iter().copied().collect();
    let mut dead: HashSet<GateRef> = HashSet::new();
    let mut order: Vec<GateRef> = Vec::new();
    let is_dead = |dead: &HashSet<GateRef>, r: GateRef| {
        !output_set.contains(&r)
            && netlist
                .get(r)
                .is_some_and(|g| g.fanout.iter().all(|c| dead.contains(c)))
    };

    let mut worklist: Vec<GateRef> = topo::reachable(netlist, &circuit.inputs, &outputs)?
        .into_iter()
        .filter(|&r| is_dead(&dead, r))
        .collect();

    while let Some(current) = worklist.pop() {
        if dead.contains(&current) || !is_dead(&dead, current) {
            continue;
        }
        let gate = netlist
            .get(current)
            .ok_or(Violation::DanglingRef(current))?;
        if gate.kind == GateKind::Input {
            return Err(Violation::DeadInput(current));
        }
        if gate.connected_count() < gate.kind.arity() {
            return Err(Violation::MissingInput(current));
        }
        dead.insert(current);
        order.push(current);
        for operand in gate.operands() {
            if !dead.contains(&operand) && is_dead(&dead, operand) {
                worklist.push(operand);
            }
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_collapses_unused_chain() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 1);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let kept = nl.add_binary(GateKind::And, a, b).unwrap();
        let x = nl.add_binary(GateKind::Xor, a, b).unwrap();
        let n = nl.add_not(x).unwrap();
        let _tail = nl.add_binary(GateKind::Or, n, kept).unwrap();
        circuit.set_output(0, kept).unwrap();

        assert_eq!(prune_dead(&circuit, &mut nl).unwrap(), 3);
        assert_eq!(nl.len(), 3);
        assert!(nl.get(kept).unwrap().fanout.is_empty());
        circuit.validate(&nl).unwrap();
    }

    #[test]
    fn test_prune_is_idempotent() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 1);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let o = nl.add_binary(GateKind::Or, a, b).unwrap();
        nl.add_binary(GateKind::And, a, b).unwrap();
        circuit.set_output(0, o).unwrap();
        assert_eq!(prune_dead(&circuit, &mut nl).unwrap(), 1);
        let size = circuit.size(&nl).unwrap();
        assert_eq!(prune_dead(&circuit, &mut nl).unwrap(), 0);
        assert_eq!(circuit.size(&nl).unwrap(), size);
    }

    #[test]
    fn test_prune_refuses_to_drop_an_input() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 1);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let o = nl.add_not(a).unwrap();
        let and = nl.add_binary(GateKind::And, a, b).unwrap();
        circuit.set_output(0, o).unwrap();
        // Dropping the unused AND leaves `b` without consumers.
        let before = nl.len();
        assert_eq!(prune_dead(&circuit, &mut nl), Err(Violation::DeadInput(b)));
        assert_eq!(nl.len(), before);
        assert!(nl.contains(and));
        assert!(nl.get(a).unwrap().fanout.contains(&and));
        assert_eq!(nl.get(b).unwrap().fanout, vec![and]);
    }

    #[test]
    fn test_prune_frees_shared_operand_once_all_consumers_die() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 1);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let o = nl.add_binary(GateKind::Or, a, b).unwrap();
        let shared = nl.add_binary(GateKind::Xor, a, b).unwrap();
        nl.add_not(shared).unwrap();
        nl.add_binary(GateKind::And, shared, b).unwrap();
        circuit.set_output(0, o).unwrap();
        assert_eq!(prune_dead(&circuit, &mut nl).unwrap(), 3);
        assert!(!nl.contains(shared));
        circuit.validate(&nl).unwrap();
    }
}
