// SPDX-License-Identifier: Apache-2.0

use crate::gate::{GateRef, Violation};
use crate::netlist::Netlist;
use std::collections::{HashMap, HashSet, VecDeque};

/// Breadth-first walk from `inputs` and `outputs` following both fanout edges
/// and operand slots. Returns every gate found, in visit order.
pub fn reachable(
    netlist: &Netlist,
    inputs: &[GateRef],
    outputs: &[GateRef],
) -> Result<Vec<GateRef>, Violation> {
    let mut seen: HashSet<GateRef> = HashSet::new();
    let mut order = Vec::new();
    let mut worklist: VecDeque<GateRef> = VecDeque::new();
    for &start in inputs.iter().chain(outputs.iter()) {
        if seen.insert(start) {
            worklist.push_back(start);
        }
    }
    while let Some(current) = worklist.pop_front() {
        let gate = netlist
            .get(current)
            .ok_or(Violation::DanglingRef(current))?;
        order.push(current);
        for next in gate.fanout.iter().copied().chain(gate.operands()) {
            if seen.insert(next) {
                worklist.push_back(next);
            }
        }
    }
    Ok(order)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Returns the gates in the operand cones of `roots` with every gate after
/// all of its operands. Fails with [`Violation::Cycle`] on a back edge.
pub fn topo_order(netlist: &Netlist, roots: &[GateRef]) -> Result<Vec<GateRef>, Violation> {
    let mut marks: HashMap<GateRef, Mark> = HashMap::new();
    let mut order = Vec::new();
    // (gate, index of the next operand slot to explore)
    let mut stack: Vec<(GateRef, usize)> = Vec::new();

    for &root in roots {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        stack.push((root, 0));
        while let Some((current, next_slot)) = stack.pop() {
            let gate = netlist
                .get(current)
                .ok_or(Violation::DanglingRef(current))?;
            let operand = gate.inputs[next_slot..]
                .iter()
                .enumerate()
                .find_map(|(i, slot)| slot.map(|r| (next_slot + i, r)));
            match operand {
                Some((slot, dep)) => {
                    stack.push((current, slot + 1));
                    match marks.get(&dep) {
                        Some(Mark::Visiting) => {
                            log::error!("cycle found through {} while ordering {}", dep, current);
                            return Err(Violation::Cycle(dep));
                        }
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(dep, Mark::Visiting);
                            stack.push((dep, 0));
                        }
                    }
                }
                None => {
                    marks.insert(current, Mark::Done);
                    order.push(current);
                }
            }
        }
    }
    Ok(order)
}

pub fn debug_assert_no_cycles(netlist: &Netlist, roots: &[GateRef], context: &str) {
    if cfg!(debug_assertions) {
        if let Err(e) = topo_order(netlist, roots) {
            log::error!("{}: {}", context, e);
            debug_assert!(false, "{}: {}", context, e);
        }
    }
}
