// SPDX-License-Identifier: Apache-2.0

//! Gate counts of each generator, as measured by `Circuit::size` (INPUT and
//! NOT gates excluded).

use kmin_g8r::adders::{bit_counter, count_bits, exint_adder, full_adder, int_adder};
use kmin_g8r::bit_utils::{from_bits_lsb, to_bits_lsb};
use kmin_g8r::circuit::{Circuit, CircuitFn};
use kmin_g8r::compare::{compare_circuit, less_circuit};
use kmin_g8r::gate::GateRef;
use kmin_g8r::gate_builder::{BuildError, GateBuilder};
use kmin_g8r::netlist::Netlist;
use kmin_g8r::selector::selector;
use test_case::test_case;

/// Recurrence for `n = 2^k` inputs: `F(k) = 2·F(k-1) + 5k - 3`, `F(1) = 2`.
fn counter_recurrence(k: u32) -> usize {
    if k == 1 {
        2
    } else {
        2 * counter_recurrence(k - 1) + 5 * k as usize - 3
    }
}

#[test_case(1, 2)]
#[test_case(2, 11)]
#[test_case(3, 34)]
#[test_case(4, 85)]
#[test_case(5, 192)]
fn test_bit_counter_power_of_two_sizes(k: u32, want: usize) {
    let n = 1usize << k;
    let f = CircuitFn::build("bit_counter", |nl| bit_counter(nl, n)).unwrap();
    f.validate().unwrap();
    assert_eq!(f.size().unwrap(), want);
    assert_eq!(counter_recurrence(k), want);
    // Closed form of the recurrence.
    assert_eq!(want, 7 * (1usize << k) - 5 * k as usize - 7);
}

/// Naive population count: each input is rippled into a `count_bits(n)`-bit
/// accumulator through a chain of half adders. Accumulator bits that have not
/// been driven yet take the incoming carry directly.
fn ripple_counter(netlist: &mut Netlist, n: usize) -> Result<Circuit, BuildError> {
    let width = count_bits(n);
    let mut gb = GateBuilder::new(netlist);
    let mut circuit = gb.new_circuit(n, width);
    let mut acc: Vec<Option<GateRef>> = vec![None; width];
    for &input in &circuit.inputs {
        let mut carry = input;
        for (j, slot) in acc.iter_mut().enumerate() {
            let Some(bit) = *slot else {
                *slot = Some(carry);
                break;
            };
            if j + 1 == width {
                *slot = Some(gb.add_xor(bit, carry)?);
            } else {
                let ha = gb.add_half_adder(bit, carry)?;
                *slot = Some(ha.sum);
                carry = ha.carry;
            }
        }
    }
    for (j, bit) in acc.into_iter().enumerate() {
        if let Some(bit) = bit {
            circuit.set_output(j, bit)?;
        }
    }
    Ok(circuit)
}

#[test]
fn test_ripple_counter_counts() {
    let n = 8;
    let mut ripple = CircuitFn::build("ripple_counter", |nl| ripple_counter(nl, n)).unwrap();
    let mut counter = CircuitFn::build("bit_counter", |nl| bit_counter(nl, n)).unwrap();
    ripple.validate().unwrap();
    for pattern in 0u64..(1 << n) {
        let inputs = to_bits_lsb(pattern, n);
        let want = u64::from(pattern.count_ones());
        assert_eq!(from_bits_lsb(&ripple.evaluate(&inputs).unwrap()), want);
        assert_eq!(from_bits_lsb(&counter.evaluate(&inputs).unwrap()), want);
    }
}

#[test_case(3, 40)]
#[test_case(4, 119)]
#[test_case(5, 316)]
#[test_case(6, 783)]
#[test_case(7, 1856)]
fn test_bit_counter_beats_ripple_counter(k: u32, ripple_size: usize) {
    let n = 1usize << k;
    let ripple = CircuitFn::build("ripple_counter", |nl| ripple_counter(nl, n)).unwrap();
    let counter = CircuitFn::build("bit_counter", |nl| bit_counter(nl, n)).unwrap();
    assert_eq!(ripple.size().unwrap(), ripple_size);
    assert!(counter.size().unwrap() < ripple_size, "n = {}", n);
}

#[test]
fn test_full_adder_size() {
    let f = CircuitFn::build("full_adder", full_adder).unwrap();
    assert_eq!(f.size().unwrap(), 5);
}

#[test_case(1, 1)]
#[test_case(2, 4)]
#[test_case(5, 19)]
#[test_case(8, 34)]
fn test_int_adder_size(n: usize, want: usize) {
    let f = CircuitFn::build("int_adder", |nl| int_adder(nl, n)).unwrap();
    assert_eq!(f.size().unwrap(), want);
}

#[test_case(1)]
#[test_case(4)]
#[test_case(9)]
fn test_exint_adder_size(n: usize) {
    let f = CircuitFn::build("exint_adder", |nl| exint_adder(nl, n)).unwrap();
    assert_eq!(f.size().unwrap(), 5 * n - 3);
}

#[test_case(1)]
#[test_case(3)]
#[test_case(16)]
fn test_comparator_sizes(n: usize) {
    let cmp = CircuitFn::build("compare", |nl| compare_circuit(nl, n)).unwrap();
    let less = CircuitFn::build("less", |nl| less_circuit(nl, n)).unwrap();
    assert_eq!(cmp.size().unwrap(), 6 * n - 4);
    assert_eq!(less.size().unwrap(), 5 * n - 3);
}

#[test_case(1)]
#[test_case(7)]
fn test_selector_size(n: usize) {
    let f = CircuitFn::build("selector", |nl| selector(nl, n)).unwrap();
    assert_eq!(f.size().unwrap(), 3 * n);
    assert_eq!(f.summary_stats().unwrap().not_gates, 1);
}
