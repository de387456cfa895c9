// SPDX-License-Identifier: Apache-2.0

//! Combinational gate netlists built from small generators (adders, bit
//! counters, comparators, multiplexers), with event-driven simulation,
//! structural validation and dead-gate pruning. The `kmin` module composes
//! them into a circuit that selects the k-th smallest of `n` values.

pub mod adders;
pub mod bit_utils;
pub mod circuit;
pub mod compare;
pub mod dce;
pub mod emit;
pub mod gate;
pub mod gate_builder;
pub mod gate_sim;
pub mod get_summary_stats;
pub mod kmin;
pub mod netlist;
pub mod reference;
pub mod selector;
pub mod test_utils;
pub mod topo;
