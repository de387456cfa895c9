// SPDX-License-Identifier: Apache-2.0

//! Circuit that selects the k-th smallest of `n` unsigned `l`-bit values.
//!
//! Port layout (all multi-bit fields MSB-first):
//! * ports `j*l .. (j+1)*l`: value `j`;
//! * the next `count_bits(n)` ports: `k`, counting from 1;
//! * the final port: a wire the caller must drive with `false`.
//!
//! Outputs the `l` bits of the answer, MSB-first.
//!
//! The answer is decided one bit-plane at a time from the top. Between planes
//! the circuit carries a `dead` flag per candidate (it already differs from
//! the answer in a higher bit) and `strict_less`, the number of candidates
//! already known to be smaller than the answer. At each plane the live
//! candidates with a zero bit are counted; if adding them to `strict_less`
//! stays below `k` the answer has a one here and they all become smaller.

use crate::adders::{bit_counter, count_bits, int_adder};
use crate::circuit::Circuit;
use crate::compare::compare_circuit;
use crate::gate_builder::{BuildError, GateBuilder};
use crate::netlist::Netlist;
use crate::selector::selector;
use crate::topo;

pub fn kmin_circuit(netlist: &mut Netlist, n: usize, l: usize) -> Result<Circuit, BuildError> {
    if n == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "kmin_circuit",
            width: n,
        });
    }
    if l == 0 {
        return Err(BuildError::InvalidWidth {
            generator: "kmin_circuit",
            width: l,
        });
    }
    let logn = count_bits(n);
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(n * l + logn + 1, l);
    let zero = circuit.inputs[n * l + logn];
    let k = circuit.inputs[n * l..n * l + logn].to_vec();
    let mut val = circuit.inputs[..n * l].to_vec();
    let mut strict_less = vec![zero; logn];
    let mut dead = vec![zero; n];

    for i in 0..l {
        let zeros = (0..n)
            .map(|j| gb.add_not(val[j * l + i]))
            .collect::<Result<Vec<_>, _>>()?;
        // With a single candidate the inverted bit already is the count.
        let count = if n == 1 {
            zeros
        } else {
            let mut lsb_first = gb.instantiate(|nl| bit_counter(nl, n), &zeros)?;
            lsb_first.reverse();
            lsb_first
        };

        let sum = gb.instantiate(|nl| int_adder(nl, logn), &[strict_less.clone(), count].concat())?;
        let cmp = gb.instantiate(
            |nl| compare_circuit(nl, logn),
            &[sum.clone(), k.clone()].concat(),
        )?;
        let bit = cmp[0];
        circuit.set_output(i, bit)?;
        strict_less = gb.instantiate(
            |nl| selector(nl, logn),
            &[strict_less, sum, vec![bit]].concat(),
        )?;

        if i + 1 < l {
            for j in 0..n {
                let differs = gb.add_xor(val[j * l + i], bit)?;
                dead[j] = gb.add_or(dead[j], differs)?;
                val[j * l + i + 1] = gb.add_or(val[j * l + i + 1], dead[j])?;
            }
        }
    }

    // The comparators' "greater" taps and the final strict_less update have
    // no consumers.
    let pruned = circuit.prune_dead(netlist)?;
    topo::debug_assert_no_cycles(netlist, &circuit.output_refs()?, "kmin_circuit");
    log::debug!(
        "kmin_circuit(n={}, l={}): pruned {} gates, {} remain",
        n,
        l,
        pruned,
        netlist.len()
    );
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_utils::{from_bits_msb, kmin_inputs};
    use crate::circuit::CircuitFn;
    use crate::reference::kth_min_value;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_worked_example() {
        let mut f = CircuitFn::build("kmin", |nl| kmin_circuit(nl, 4, 2)).unwrap();
        f.validate().unwrap();
        assert_eq!(f.input_count(), 4 * 2 + 3 + 1);
        let got = f.evaluate(&kmin_inputs(&[2, 0, 3, 1], 2, 2)).unwrap();
        assert_eq!(got, vec![false, true]);
    }

    #[test_case(1, 3)]
    #[test_case(2, 2)]
    #[test_case(3, 2)]
    #[test_case(4, 2)]
    #[test_case(5, 1)]
    fn test_exhaustive_small(n: usize, l: usize) {
        let mut f = CircuitFn::build("kmin", |nl| kmin_circuit(nl, n, l)).unwrap();
        f.validate().unwrap();
        let limit = 1u64 << l;
        let combos = limit.pow(n as u32);
        for code in 0..combos {
            let values: Vec<u64> = (0..n)
                .map(|j| (code / limit.pow(j as u32)) % limit)
                .collect();
            for k in 1..=n {
                let got = f.evaluate(&kmin_inputs(&values, l, k)).unwrap();
                let want = kth_min_value(&values, k).unwrap();
                assert_eq!(from_bits_msb(&got), want, "values {:?} k {}", values, k);
            }
        }
    }

    #[test]
    fn test_rejects_empty_dimensions() {
        let mut nl = Netlist::new();
        assert!(matches!(
            kmin_circuit(&mut nl, 0, 4),
            Err(BuildError::InvalidWidth { width: 0, .. })
        ));
        assert!(matches!(
            kmin_circuit(&mut nl, 4, 0),
            Err(BuildError::InvalidWidth { width: 0, .. })
        ));
    }

    #[test]
    fn test_already_pruned() {
        let mut f = CircuitFn::build("kmin", |nl| kmin_circuit(nl, 6, 3)).unwrap();
        let size = f.size().unwrap();
        assert_eq!(f.prune_dead().unwrap(), 0);
        assert_eq!(f.size().unwrap(), size);
    }
}
