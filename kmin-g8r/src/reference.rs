// SPDX-License-Identifier: Apache-2.0

//! Plain software k-th-minimum, used as the oracle for the generated circuit.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    NoValues,
    /// Value `index` has a different bit width than value 0.
    LengthMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },
    /// `k` counts from 1 and must not exceed the number of values.
    KOutOfRange { k: usize, n: usize },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NoValues => write!(f, "no values given"),
            DomainError::LengthMismatch {
                index,
                expected,
                got,
            } => write!(
                f,
                "value {} has {} bits, expected {}",
                index, got, expected
            ),
            DomainError::KOutOfRange { k, n } => {
                write!(f, "k = {} is outside 1..={}", k, n)
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// Bit-plane elimination over MSB-first values, mirroring what the circuit
/// computes. Returns the answer MSB-first.
pub fn kth_min_bits(values: &[Vec<bool>], k: usize) -> Result<Vec<bool>, DomainError> {
    let width = values.first().ok_or(DomainError::NoValues)?.len();
    for (index, v) in values.iter().enumerate() {
        if v.len() != width {
            return Err(DomainError::LengthMismatch {
                index,
                expected: width,
                got: v.len(),
            });
        }
    }
    if k == 0 || k > values.len() {
        return Err(DomainError::KOutOfRange { k, n: values.len() });
    }

    let mut dead = vec![false; values.len()];
    let mut strict_less = 0;
    let mut answer = Vec::with_capacity(width);
    for i in 0..width {
        let zeros = values
            .iter()
            .zip(&dead)
            .filter(|(v, d)| !v[i] && !**d)
            .count();
        let bit = strict_less + zeros < k;
        if bit {
            strict_less += zeros;
        }
        answer.push(bit);
        for (v, d) in values.iter().zip(dead.iter_mut()) {
            *d |= v[i] != bit;
        }
    }
    Ok(answer)
}

/// Sort-based k-th smallest (k counts from 1).
pub fn kth_min_value(values: &[u64], k: usize) -> Result<u64, DomainError> {
    if values.is_empty() {
        return Err(DomainError::NoValues);
    }
    if k == 0 || k > values.len() {
        return Err(DomainError::KOutOfRange { k, n: values.len() });
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    Ok(sorted[k - 1])
}
