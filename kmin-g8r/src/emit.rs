// SPDX-License-Identifier: Apache-2.0

//! Human-readable dump of a circuit's gates, meant for logs and debugging.
//!
//! Gates get display indices in breadth-first order from the ports. Each line
//! shows index, kind, last value, consumer indices, and an `OUTPUT` or `VOID`
//! marker where one applies.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;

use crate::circuit::Circuit;
use crate::gate::{GateRef, Violation};
use crate::netlist::Netlist;

pub fn emit_text(name: &str, circuit: &Circuit, netlist: &Netlist) -> Result<String, Violation> {
    let gates = circuit.gates(netlist)?;
    let index: HashMap<GateRef, usize> = gates.iter().enumerate().map(|(i, &g)| (g, i)).collect();
    let display = |r: &GateRef| match index.get(r) {
        Some(i) => i.to_string(),
        None => "?".to_string(),
    };
    let join = |refs: &mut dyn Iterator<Item = String>| refs.collect::<Vec<_>>().join(" ");

    let mut out = String::new();
    let _ = writeln!(out, "circuit {}", name);
    let _ = writeln!(out, "inputs: [{}]", join(&mut circuit.inputs.iter().map(display)));
    let _ = writeln!(
        out,
        "outputs: [{}]",
        join(&mut circuit.outputs.iter().map(|o| match o {
            Some(r) => display(r),
            None => "_".to_string(),
        }))
    );
    for (i, &r) in gates.iter().enumerate() {
        let gate = netlist.get(r).ok_or(Violation::DanglingRef(r))?;
        let is_output = circuit.outputs.contains(&Some(r));
        let marker = if is_output {
            " OUTPUT"
        } else if gate.fanout.is_empty() {
            " VOID"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{}: {} {} -> [{}]{}",
            i,
            gate.kind,
            u8::from(gate.value),
            join(&mut gate.fanout.iter().map(display)),
            marker
        );
    }
    Ok(out)
}

pub fn save_text(name: &str, circuit: &Circuit, netlist: &Netlist, path: &Path) -> anyhow::Result<()> {
    let text = emit_text(name, circuit, netlist)?;
    std::fs::write(path, text).with_context(|| format!("writing dump to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adders::full_adder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_half_adder_like_circuit() {
        let mut nl = Netlist::new();
        let mut circuit = Circuit::new(&mut nl, 2, 1);
        let (a, b) = (circuit.inputs[0], circuit.inputs[1]);
        let x = nl.add_binary(crate::gate::GateKind::Xor, a, b).unwrap();
        let _void = nl.add_not(x).unwrap();
        circuit.set_output(0, x).unwrap();
        circuit.evaluate(&mut nl, &[true, false]).unwrap();
        let text = emit_text("t", &circuit, &nl).unwrap();
        assert_eq!(
            text,
            "circuit t\n\
             inputs: [0 1]\n\
             outputs: [2]\n\
             0: INPUT 1 -> [2]\n\
             1: INPUT 0 -> [2]\n\
             2: XOR 1 -> [3] OUTPUT\n\
             3: NOT 0 -> [] VOID\n"
        );
    }

    #[test]
    fn test_save_text_writes_file() {
        let mut nl = Netlist::new();
        let fa = full_adder(&mut nl).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fa.txt");
        save_text("full_adder", &fa, &nl, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("circuit full_adder\n"));
        assert_eq!(text.lines().count(), 3 + 8);
        assert_eq!(text.matches("OUTPUT").count(), 2);
    }
}
