// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use kmin_g8r::adders::{bit_counter, exint_adder, full_adder, int_adder};
use kmin_g8r::bit_utils::{from_bits_msb, kmin_inputs};
use kmin_g8r::circuit::CircuitFn;
use kmin_g8r::compare::{compare_circuit, less_circuit};
use kmin_g8r::emit::save_text;
use kmin_g8r::selector::selector;
use kmin_g8r::test_utils::{KminInstance, build_kmin, check_instance};

/// Builds and exercises k-th-minimum gate circuits.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Selects the 2nd smallest of [2, 0, 3, 1] with a 4x2-bit circuit.
    Demo,
    /// Compares the circuit against the software oracle on random instances.
    CheckKmin {
        /// Number of values.
        #[arg(long, default_value_t = 8)]
        n: usize,
        /// Bits per value.
        #[arg(long, default_value_t = 8)]
        width: usize,
        #[arg(long, default_value_t = 100)]
        trials: usize,
        /// Seed for the random instances (default 0)
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Prints gate-count statistics for one generator.
    Stats {
        #[arg(long, value_enum)]
        generator: Generator,
        /// Operand width (or number of inputs for the bit counter).
        #[arg(long, default_value_t = 8)]
        width: usize,
        /// Number of values; only used by the kmin generator.
        #[arg(long, default_value_t = 8)]
        n: usize,
        /// Emit the statistics as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Dumps the gates of a k-th-minimum circuit.
    Dump {
        #[arg(long, default_value_t = 4)]
        n: usize,
        #[arg(long, default_value_t = 2)]
        width: usize,
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Generator {
    FullAdder,
    BitCounter,
    IntAdder,
    ExintAdder,
    Compare,
    Less,
    Selector,
    Kmin,
}

fn build_generator(generator: Generator, width: usize, n: usize) -> Result<CircuitFn> {
    let name = format!("{:?}", generator);
    let f = match generator {
        Generator::FullAdder => CircuitFn::build(&name, full_adder),
        Generator::BitCounter => CircuitFn::build(&name, |nl| bit_counter(nl, width)),
        Generator::IntAdder => CircuitFn::build(&name, |nl| int_adder(nl, width)),
        Generator::ExintAdder => CircuitFn::build(&name, |nl| exint_adder(nl, width)),
        Generator::Compare => CircuitFn::build(&name, |nl| compare_circuit(nl, width)),
        Generator::Less => CircuitFn::build(&name, |nl| less_circuit(nl, width)),
        Generator::Selector => CircuitFn::build(&name, |nl| selector(nl, width)),
        Generator::Kmin => build_kmin(n, width),
    };
    f.with_context(|| format!("building {} (width {}, n {})", name, width, n))
}

fn demo() -> Result<()> {
    let values = [2u64, 0, 3, 1];
    let (width, k) = (2, 2);
    let mut f = build_kmin(values.len(), width)?;
    f.validate()?;
    let bits = f.evaluate(&kmin_inputs(&values, width, k))?;
    println!(
        "values {:?} (width {}), k = {}: {} = {}",
        values,
        width,
        k,
        bits.iter().map(|&b| if b { '1' } else { '0' }).collect::<String>(),
        from_bits_msb(&bits)
    );
    println!("circuit size: {}", f.size()?);
    Ok(())
}

fn check_kmin(n: usize, width: usize, trials: usize, seed: u64) -> Result<()> {
    let mut f = build_kmin(n, width)?;
    f.validate()?;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut failures = 0;
    for trial in 0..trials {
        let instance = KminInstance::random(&mut rng, n, width);
        let check = check_instance(&mut f, &instance)?;
        if !check.passed() {
            failures += 1;
            log::error!(
                "trial {}: values {:?} k {}: circuit {} oracle {}",
                trial,
                instance.values,
                instance.k,
                check.got,
                check.want
            );
        }
    }
    println!(
        "{} / {} trials matched (n = {}, width = {}, size = {})",
        trials - failures,
        trials,
        n,
        width,
        f.size()?
    );
    if failures > 0 {
        bail!("{} mismatches against the oracle", failures);
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();
    let args = Args::parse();
    match args.command {
        Command::Demo => demo(),
        Command::CheckKmin {
            n,
            width,
            trials,
            seed,
        } => check_kmin(n, width, trials, seed),
        Command::Stats {
            generator,
            width,
            n,
            json,
        } => {
            let f = build_generator(generator, width, n)?;
            f.validate()?;
            let stats = f.summary_stats()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{:#?}", stats);
            }
            Ok(())
        }
        Command::Dump { n, width, output } => {
            let f = build_kmin(n, width)?;
            match output {
                Some(path) => save_text(&f.name, &f.circuit, &f.netlist, &path),
                None => {
                    print!("{}", f.to_text()?);
                    Ok(())
                }
            }
        }
    }
}
