// SPDX-License-Identifier: Apache-2.0

//! Conversions between integers and port-ordered bit vectors.

use crate::adders::count_bits;

/// `width` bits of `value`, most significant first. Bits above `width` are
/// dropped.
pub fn to_bits_msb(value: u64, width: usize) -> Vec<bool> {
    (0..width)
        .rev()
        .map(|i| i < 64 && (value >> i) & 1 == 1)
        .collect()
}

pub fn to_bits_lsb(value: u64, width: usize) -> Vec<bool> {
    let mut bits = to_bits_msb(value, width);
    bits.reverse();
    bits
}

pub fn from_bits_msb(bits: &[bool]) -> u64 {
    bits.iter().fold(0, |acc, &b| (acc << 1) | u64::from(b))
}

pub fn from_bits_lsb(bits: &[bool]) -> u64 {
    bits.iter().rev().fold(0, |acc, &b| (acc << 1) | u64::from(b))
}

/// Input vector for a k-th-minimum circuit over `values` of `width` bits:
/// every value MSB-first, then `k` in `count_bits(values.len())` bits
/// MSB-first, then the constant-false wire.
pub fn kmin_inputs(values: &[u64], width: usize, k: usize) -> Vec<bool> {
    let mut bits: Vec<bool> = values
        .iter()
        .flat_map(|&v| to_bits_msb(v, width))
        .collect();
    bits.extend(to_bits_msb(k as u64, count_bits(values.len())));
    bits.push(false);
    bits
}
