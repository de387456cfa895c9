// SPDX-License-Identifier: Apache-2.0

//! Magnitude comparators over two `n`-bit operands given MSB-first, operand A
//! on ports `0..n` and operand B on ports `n..2n`.

use crate::circuit::Circuit;
use crate::gate_builder::{BuildError, GateBuilder};
use crate::netlist::Netlist;

/// Outputs `[a < b, a > b]`.
///
/// Scans from the most significant bit keeping two accumulators. An operand
/// bit is ORed with its own side's accumulator before being compared, so once
/// one side has won, the other side can never be flagged by a lower bit.
pub fn compare_circuit(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    if n == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "compare_circuit",
            width: n,
        });
    }
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(2 * n, 2);
    let a = circuit.inputs[..n].to_vec();
    let b = circuit.inputs[n..].to_vec();

    let not_b = gb.add_not(b[0])?;
    let not_a = gb.add_not(a[0])?;
    let mut larger = gb.add_and(a[0], not_b)?;
    let mut lesser = gb.add_and(b[0], not_a)?;
    for i in 1..n {
        let va = gb.add_or(a[i], larger)?;
        let vb = gb.add_or(b[i], lesser)?;
        let na = gb.add_not(va)?;
        let nb = gb.add_not(vb)?;
        let a_wins = gb.add_and(va, nb)?;
        let b_wins = gb.add_and(vb, na)?;
        larger = gb.add_or(larger, a_wins)?;
        lesser = gb.add_or(lesser, b_wins)?;
    }
    circuit.set_output(0, lesser)?;
    circuit.set_output(1, larger)?;
    Ok(circuit)
}

/// Single output `a < b`, cheaper than [`compare_circuit`].
///
/// XORs the operands, prefix-ORs the differences from the top, XORs adjacent
/// prefix bits so that only the most significant difference survives, and
/// reports whether B holds a one there.
pub fn less_circuit(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    if n == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "less_circuit",
            width: n,
        });
    }
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(2 * n, 1);
    let a = circuit.inputs[..n].to_vec();
    let b = circuit.inputs[n..].to_vec();

    let mut prefix = Vec::with_capacity(n);
    for i in 0..n {
        let diff = gb.add_xor(a[i], b[i])?;
        let seen = match prefix.last() {
            Some(&above) => gb.add_or(above, diff)?,
            None => diff,
        };
        prefix.push(seen);
    }

    let mut result = None;
    for i in 0..n {
        let first_diff = if i == 0 {
            prefix[0]
        } else {
            gb.add_xor(prefix[i - 1], prefix[i])?
        };
        let hit = gb.add_and(first_diff, b[i])?;
        result = Some(match result {
            Some(acc) => gb.add_or(acc, hit)?,
            None => hit,
        });
    }
    if let Some(less) = result {
        circuit.set_output(0, less)?;
    }
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_utils::to_bits_msb;
    use crate::circuit::CircuitFn;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use test_case::test_case;

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(3)]
    #[test_case(4)]
    fn test_compare_exhaustive(n: usize) {
        let mut f = CircuitFn::build("compare", |nl| compare_circuit(nl, n)).unwrap();
        f.validate().unwrap();
        let limit = 1u64 << n;
        for a in 0..limit {
            for b in 0..limit {
                let inputs = [to_bits_msb(a, n), to_bits_msb(b, n)].concat();
                let got = f.evaluate(&inputs).unwrap();
                assert_eq!(got, vec![a < b, a > b], "{} vs {}", a, b);
            }
        }
    }

    #[test_case(1)]
    #[test_case(2)]
    #[test_case(3)]
    #[test_case(4)]
    fn test_less_exhaustive(n: usize) {
        let mut f = CircuitFn::build("less", |nl| less_circuit(nl, n)).unwrap();
        f.validate().unwrap();
        let limit = 1u64 << n;
        for a in 0..limit {
            for b in 0..limit {
                let inputs = [to_bits_msb(a, n), to_bits_msb(b, n)].concat();
                assert_eq!(f.evaluate(&inputs).unwrap(), vec![a < b], "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_wide_operands_agree_with_each_other() {
        let n = 24;
        let mut cmp = CircuitFn::build("compare", |nl| compare_circuit(nl, n)).unwrap();
        let mut less = CircuitFn::build("less", |nl| less_circuit(nl, n)).unwrap();
        assert!(less.size().unwrap() < cmp.size().unwrap());
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        for _ in 0..200 {
            let a = rng.gen_range(0..1u64 << n);
            let b = if rng.gen_bool(0.2) {
                a
            } else {
                rng.gen_range(0..1u64 << n)
            };
            let inputs = [to_bits_msb(a, n), to_bits_msb(b, n)].concat();
            let both = cmp.evaluate(&inputs).unwrap();
            assert_eq!(both, vec![a < b, a > b]);
            assert!(!(both[0] && both[1]));
            assert_eq!(less.evaluate(&inputs).unwrap(), vec![a < b]);
        }
    }
}
