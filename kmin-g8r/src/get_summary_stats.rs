// SPDX-License-Identifier: Apache-2.0

use crate::circuit::Circuit;
use crate::gate::{GateKind, GateRef, Violation};
use crate::netlist::Netlist;
use crate::topo;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SummaryStats {
    /// Gates other than INPUT and NOT; see [`Circuit::size`].
    pub size: usize,
    pub live_gates: usize,
    pub input_gates: usize,
    pub not_gates: usize,
    /// Longest operand chain from an input to an output, in gates.
    pub deepest_path: usize,
}

/// Returns the depth of every gate in the output cones, INPUT gates being at
/// depth zero.
pub fn get_gate_depth(
    circuit: &Circuit,
    netlist: &Netlist,
) -> Result<HashMap<GateRef, usize>, Violation> {
    let outputs = circuit.output_refs()?;
    let mut depths: HashMap<GateRef, usize> = HashMap::new();
    for r in topo::topo_order(netlist, &outputs)? {
        let gate = netlist.get(r).ok_or(Violation::DanglingRef(r))?;
        let depth = match gate.kind {
            GateKind::Input => 0,
            _ => 1 + gate
                .operands()
                .map(|o| depths.get(&o).copied().unwrap_or(0))
                .max()
                .unwrap_or(0),
        };
        depths.insert(r, depth);
    }
    Ok(depths)
}

pub fn get_summary_stats(circuit: &Circuit, netlist: &Netlist) -> Result<SummaryStats, Violation> {
    let gates = circuit.gates(netlist)?;
    let mut input_gates = 0;
    let mut not_gates = 0;
    for &r in &gates {
        match netlist.get(r).ok_or(Violation::DanglingRef(r))?.kind {
            GateKind::Input => input_gates += 1,
            GateKind::Not => not_gates += 1,
            _ => {}
        }
    }
    let depths = get_gate_depth(circuit, netlist)?;
    let deepest_path = circuit
        .output_refs()?
        .iter()
        .filter_map(|o| depths.get(o).copied())
        .max()
        .unwrap_or(0);
    log::debug!("deepest primary output depth: {}", deepest_path);
    Ok(SummaryStats {
        size: gates.len() - input_gates - not_gates,
        live_gates: gates.len(),
        input_gates,
        not_gates,
        deepest_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adders::full_adder;
    use crate::selector::selector;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_adder_stats() {
        let mut nl = Netlist::new();
        let fa = full_adder(&mut nl).unwrap();
        let stats = get_summary_stats(&fa, &nl).unwrap();
        assert_eq!(
            stats,
            SummaryStats {
                size: 5,
                live_gates: 8,
                input_gates: 3,
                not_gates: 0,
                deepest_path: 3,
            }
        );
    }

    #[test]
    fn test_selector_stats_serialize() {
        let mut nl = Netlist::new();
        let sel = selector(&mut nl, 2).unwrap();
        let stats = get_summary_stats(&sel, &nl).unwrap();
        assert_eq!(stats.not_gates, 1);
        assert_eq!(stats.deepest_path, 3);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"size":6,"live_gates":12,"input_gates":5,"not_gates":1,"deepest_path":3}"#
        );
    }
}
