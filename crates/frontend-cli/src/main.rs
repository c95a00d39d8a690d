mod demos;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use nemo_core::{diag::DEFAULT_ERROR_LIMIT, BudgetState, ErrorBudget, Nemo, NemoConfig, ROM_BANK_COUNT};

use demos::Demo;

/// Headless runner for the Nemo byte-code VM.
#[derive(Debug, Parser)]
#[command(name = "nemo-emu", version, about)]
struct Args {
    /// Built-in program to load (ignored when --rom is given)
    #[arg(long, value_enum, default_value = "add")]
    demo: Demo,

    /// Raw bank image, one per bank in order (repeatable, up to four)
    #[arg(long = "rom", value_name = "FILE")]
    roms: Vec<PathBuf>,

    /// Number of cycles to step
    #[arg(long, default_value_t = 16)]
    cycles: u64,

    /// Start paused; steps are then no-ops
    #[arg(long)]
    paused: bool,

    /// Echo every executed instruction and diagnostic
    #[arg(long)]
    debug: bool,

    /// Stop after this many diagnostics
    #[arg(long, default_value_t = DEFAULT_ERROR_LIMIT)]
    max_errors: u32,

    /// Print the final state as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also print the data panel and the active bank
    #[arg(long)]
    dump: bool,

    /// Data panel shows VRAM instead of RAM
    #[arg(long)]
    vram: bool,

    /// Bank panel shows hex cells instead of mnemonics
    #[arg(long)]
    hex: bool,
}

fn main() -> Result<()> {
    run(&Args::parse())
}

/// Build the engine and put the selected program into it.
fn load_program(args: &Args) -> Result<Nemo> {
    if args.roms.len() > ROM_BANK_COUNT {
        bail!("at most {} --rom images, got {}", ROM_BANK_COUNT, args.roms.len());
    }

    let mut nemo = Nemo::with_config(NemoConfig { debug: args.debug, start_paused: args.paused });
    nemo.view.show_vram = args.vram;
    nemo.view.instruction_view = !args.hex;
    if args.roms.is_empty() {
        args.demo.load(&mut nemo);
    } else {
        let images = args.roms.iter()
            .map(|p| fs::read(p).with_context(|| format!("failed to read {}", p.display())))
            .collect::<Result<Vec<_>>>()?;
        let slices: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();
        nemo.load_all_banks(&slices).context("failed to load program banks")?;
    }
    Ok(nemo)
}

/// Load, run and report. Errors when loading fails or the budget runs out.
fn run(args: &Args) -> Result<()> {
    let mut nemo = load_program(args)?;
    let mut budget = ErrorBudget::new(args.max_errors);
    let executed = run_headless(&mut nemo, &mut budget, args.cycles);
    if args.debug {
        eprintln!("[HOST] {} of {} cycles, {} diagnostics", executed, args.cycles, budget.count());
    }

    if args.json {
        let report = serde_json::json!({
            "cycles": nemo.cycles(),
            "paused": nemo.is_paused(),
            "diagnostics": budget.count(),
            "halted": budget.state() == BudgetState::Exhausted,
            "snapshot": nemo.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", nemo.disasm_at_pc());
        println!("{}", nemo.dump_regs());
        print!("{}", nemo.dump_stack());
        if args.dump {
            println!("--- {} ---", if nemo.view.show_vram { "VRAM" } else { "RAM" });
            print!("{}", nemo.dump_data());
            println!("--- bank {} ---", nemo.active_bank_index());
            println!("{}", nemo.dump_bank(nemo.active_bank_index()));
        }
    }

    if budget.state() == BudgetState::Exhausted {
        bail!("stopped after {} diagnostics", budget.count());
    }
    Ok(())
}

/// Step up to `cycles` times, draining diagnostics after each step.
///
/// Returns the number of steps taken before the budget ran out.
fn run_headless(nemo: &mut Nemo, budget: &mut ErrorBudget, cycles: u64) -> u64 {
    for n in 0..cycles {
        nemo.step();
        for d in nemo.take_diagnostics() {
            eprintln!("{}", d);
            if budget.record(&d) == BudgetState::Exhausted {
                return n + 1;
            }
        }
    }
    cycles
}
