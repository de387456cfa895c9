// SPDX-License-Identifier: Apache-2.0

//! Adder family generators.
//!
//! Bit orders at the port boundary:
//! * [`bit_counter`] outputs are LSB-first (port 0 is the ones digit).
//! * [`int_adder`] and [`exint_adder`] are MSB-first: operand A on ports
//!   `0..n`, operand B on ports `n..2n`, outputs MSB-first.

use crate::circuit::Circuit;
use crate::gate_builder::{BuildError, GateBuilder};
use crate::netlist::Netlist;

/// Number of binary digits needed to write `n`; `count_bits(0) == 1`.
pub fn count_bits(n: usize) -> usize {
    ((usize::BITS - n.leading_zeros()) as usize).max(1)
}

/// Three inputs, outputs `[sum, carry]`. Five gates.
pub fn full_adder(netlist: &mut Netlist) -> Result<Circuit, BuildError> {
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(3, 2);
    let (a, b, c) = (circuit.inputs[0], circuit.inputs[1], circuit.inputs[2]);
    let xor0 = gb.add_xor(a, b)?;
    let and0 = gb.add_and(a, b)?;
    let sum = gb.add_xor(xor0, c)?;
    let and1 = gb.add_and(xor0, c)?;
    let carry = gb.add_or(and0, and1)?;
    circuit.set_output(0, sum)?;
    circuit.set_output(1, carry)?;
    Ok(circuit)
}

/// Counts the true bits among `n >= 2` inputs. Outputs `count_bits(n)` bits,
/// LSB-first.
///
/// Splits the inputs in two halves, counts each recursively and merges the
/// two partial counts with a half adder followed by a chain of spliced full
/// adders. Once the narrower count runs out of bits the merge continues with
/// half adders on the carry. For `n = 2^k` this costs
/// `F(k) = 2·F(k-1) + 5k - 3` gates with `F(1) = 2`.
pub fn bit_counter(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    match n {
        0 | 1 => Err(BuildError::InvalidWidth {
            generator: "bit_counter",
            width: n,
        }),
        2 => {
            let mut gb = GateBuilder::new(netlist);
            let mut circuit = gb.new_circuit(2, 2);
            let ha = gb.add_half_adder(circuit.inputs[0], circuit.inputs[1])?;
            circuit.set_output(0, ha.sum)?;
            circuit.set_output(1, ha.carry)?;
            Ok(circuit)
        }
        3 => full_adder(netlist),
        _ => {
            let width = count_bits(n);
            let low = bit_counter(netlist, n / 2)?.detach()?;
            let high = bit_counter(netlist, n - n / 2)?.detach()?;
            // The second half is never the narrower one.
            let (lw, hw) = (low.outputs.len(), high.outputs.len());
            debug_assert!(lw <= hw && hw <= width);

            let mut gb = GateBuilder::new(netlist);
            let mut outputs = Vec::with_capacity(width);
            let ha = gb.add_half_adder(low.outputs[0], high.outputs[0])?;
            outputs.push(ha.sum);
            let mut carry = ha.carry;
            for i in 1..hw {
                if i < lw {
                    let fa =
                        gb.instantiate(full_adder, &[low.outputs[i], high.outputs[i], carry])?;
                    outputs.push(fa[0]);
                    carry = fa[1];
                } else {
                    outputs.push(gb.add_xor(carry, high.outputs[i])?);
                    // No AND for a carry that would have nowhere to go.
                    if i + 1 < hw || hw < width {
                        carry = gb.add_and(carry, high.outputs[i])?;
                    }
                }
            }
            if hw < width {
                outputs.push(carry);
            }

            let mut inputs = low.inputs;
            inputs.extend(high.inputs);
            log::trace!("bit_counter({}): {} output bits", n, outputs.len());
            Ok(Circuit::from_ports(inputs, outputs))
        }
    }
}

/// `n`-bit adder without carry-out. Outputs `n` bits MSB-first; a carry out
/// of the top bit is dropped.
pub fn int_adder(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    if n == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "int_adder",
            width: n,
        });
    }
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(2 * n, n);
    let a = circuit.inputs[..n].to_vec();
    let b = circuit.inputs[n..].to_vec();
    if n == 1 {
        let sum = gb.add_xor(a[0], b[0])?;
        circuit.set_output(0, sum)?;
        return Ok(circuit);
    }

    let ha = gb.add_half_adder(a[n - 1], b[n - 1])?;
    circuit.set_output(n - 1, ha.sum)?;
    let mut carry = ha.carry;
    for i in (1..n - 1).rev() {
        let fa = gb.instantiate(full_adder, &[a[i], b[i], carry])?;
        circuit.set_output(i, fa[0])?;
        carry = fa[1];
    }
    let top = gb.add_xor(a[0], b[0])?;
    let sum = gb.add_xor(top, carry)?;
    circuit.set_output(0, sum)?;
    Ok(circuit)
}

/// `n`-bit adder with carry-out. Outputs `n + 1` bits MSB-first, port 0
/// being the carry.
pub fn exint_adder(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    if n == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "exint_adder",
            width: n,
        });
    }
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(2 * n, n + 1);
    let a = circuit.inputs[..n].to_vec();
    let b = circuit.inputs[n..].to_vec();

    let ha = gb.add_half_adder(a[n - 1], b[n - 1])?;
    circuit.set_output(n, ha.sum)?;
    let mut carry = ha.carry;
    for i in (0..n - 1).rev() {
        let fa = gb.instantiate(full_adder, &[a[i], b[i], carry])?;
        circuit.set_output(i + 1, fa[0])?;
        carry = fa[1];
    }
    circuit.set_output(0, carry)?;
    Ok(circuit)
}
