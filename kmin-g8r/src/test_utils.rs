// SPDX-License-Identifier: Apache-2.0

//! Seeded stimulus for tests, benches and the `check-kmin` command.

use rand::Rng;

use crate::bit_utils::{from_bits_msb, kmin_inputs};
use crate::circuit::CircuitFn;
use crate::gate_builder::BuildError;
use crate::kmin::kmin_circuit;
use crate::reference::{DomainError, kth_min_value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KminInstance {
    pub values: Vec<u64>,
    pub width: usize,
    /// Counts from 1.
    pub k: usize,
}

impl KminInstance {
    pub fn random<R: Rng>(rng: &mut R, n: usize, width: usize) -> Self {
        let values = random_values(rng, n, width);
        let k = rng.gen_range(1..=n.max(1));
        Self { values, width, k }
    }

    pub fn circuit_inputs(&self) -> Vec<bool> {
        kmin_inputs(&self.values, self.width, self.k)
    }

    pub fn expected(&self) -> Result<u64, DomainError> {
        kth_min_value(&self.values, self.k)
    }
}

pub fn random_values<R: Rng>(rng: &mut R, n: usize, width: usize) -> Vec<u64> {
    (0..n)
        .map(|_| {
            (0..width.min(64)).fold(0u64, |acc, i| acc | (u64::from(rng.gen_bool(0.5)) << i))
        })
        .collect()
}

pub fn random_bits<R: Rng>(rng: &mut R, len: usize) -> Vec<bool> {
    (0..len).map(|_| rng.gen_bool(0.5)).collect()
}

pub fn build_kmin(n: usize, width: usize) -> Result<CircuitFn, BuildError> {
    CircuitFn::build(&format!("kmin_{}x{}", n, width), |nl| {
        kmin_circuit(nl, n, width)
    })
}

/// Outcome of running one instance through a k-th-min circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KminCheck {
    pub got: u64,
    pub want: u64,
}

impl KminCheck {
    pub fn passed(&self) -> bool {
        self.got == self.want
    }
}

pub fn check_instance(f: &mut CircuitFn, instance: &KminInstance) -> anyhow::Result<KminCheck> {
    let bits = f.evaluate(&instance.circuit_inputs())?;
    Ok(KminCheck {
        got: from_bits_msb(&bits),
        want: instance.expected()?,
    })
}
