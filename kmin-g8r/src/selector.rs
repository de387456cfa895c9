// SPDX-License-Identifier: Apache-2.0

use crate::circuit::Circuit;
use crate::gate_builder::{BuildError, GateBuilder};
use crate::netlist::Netlist;

/// 2-to-1 multiplexer over `n`-bit lanes. Ports are `op0[0..n]`,
/// `op1[0..n]`, then `select`; output `i` is `op1[i]` when `select` is set
/// and `op0[i]` otherwise. The inverted select is shared by all lanes.
pub fn selector(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    if n == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "selector",
            width: n,
        });
    }
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(2 * n + 1, n);
    let select = circuit.inputs[2 * n];
    let keep = gb.add_not(select)?;
    for i in 0..n {
        let (op0, op1) = (circuit.inputs[i], circuit.inputs[n + i]);
        let from0 = gb.add_and(op0, keep)?;
        let from1 = gb.add_and(op1, select)?;
        let out = gb.add_or(from0, from1)?;
        circuit.set_output(i, out)?;
    }
    Ok(circuit)
}
