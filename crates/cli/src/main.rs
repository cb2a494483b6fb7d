//! Self-test harness for the tlbsim TLB model.

use clap::{Parser, Subcommand};
use std::process;

use tlbsim::selftest::{self, REFERENCE_TRACE};
use tlbsim::{ReferencePageTable, SetAssociativeTlb, TlbConfig, VirtAddr};

#[derive(Parser, Debug)]
#[command(
    name = "tlbsim",
    author,
    version,
    about = "Set-associative TLB model",
    long_about = None,
)]
struct Cli {
    /// JSON file with the TLB geometry (sets, ways, page_size, address_bits).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay the reference trace and report every check.
    Selftest {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Translate addresses through the reference page table.
    Run {
        /// Highest mapped virtual address (exclusive).
        #[arg(long, value_parser = parse_addr, default_value = "0x1234000")]
        limit: u64,

        /// Offset added to every mapped virtual address. Must be page-aligned.
        #[arg(long, value_parser = parse_addr, default_value = "0x20000")]
        displacement: u64,

        /// Print final statistics as JSON.
        #[arg(long)]
        json: bool,

        /// Virtual addresses, hex (0x...) or decimal.
        #[arg(required = true, value_parser = parse_addr)]
        addrs: Vec<u64>,
    },
}

fn parse_addr(s: &str) -> Result<u64, String> {
    let s = s.replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn load_config(path: Option<&str>) -> TlbConfig {
    let Some(path) = path else {
        return TlbConfig::default();
    };
    TlbConfig::load(path).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: Could not load config '{}': {}", path, e);
        process::exit(1);
    })
}

fn build_tlb(config: TlbConfig, table: ReferencePageTable) -> SetAssociativeTlb<ReferencePageTable> {
    SetAssociativeTlb::new(config, table).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: Invalid TLB geometry: {}", e);
        process::exit(1);
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Selftest { json } => cmd_selftest(config, json),
        Command::Run {
            limit,
            displacement,
            json,
            addrs,
        } => cmd_run(config, ReferencePageTable::new(limit, displacement), &addrs, json),
    }
}

fn cmd_selftest(config: TlbConfig, json: bool) {
    let mut tlb = build_tlb(config, ReferencePageTable::default());
    let report = selftest::run(&mut tlb, REFERENCE_TRACE);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("[!] Could not serialize report: {}", e);
                process::exit(1);
            }
        }
    } else {
        for check in &report.checks {
            let mark = if check.passed { "ok" } else { "FAIL" };
            println!(
                "[{:>4}] {:<24} expected {:<10} got {}",
                mark, check.op, check.expected, check.actual
            );
        }
    }

    if !report.passed() {
        let failed = report.failures().count();
        eprintln!("\n[!] {} of {} checks failed", failed, report.checks.len());
        log::debug!("final state: {:?}", tlb);
        process::exit(1);
    }
    if !json {
        println!("\n[*] All {} checks passed", report.checks.len());
    }
}

fn cmd_run(config: TlbConfig, table: ReferencePageTable, addrs: &[u64], json: bool) {
    if !table.preserves_offset(config.page_size) {
        eprintln!(
            "\n[!] FATAL: displacement {:#x} is not aligned to the {:#x}-byte page size",
            table.displacement, config.page_size
        );
        process::exit(1);
    }
    let mut tlb = build_tlb(config, table);

    for &addr in addrs {
        let va = VirtAddr::new(addr);
        match tlb.translate(va) {
            Ok(pa) => println!("{:#014x} -> {:#014x}  (rank {})", addr, pa, tlb.peek(va)),
            Err(e) => println!("{:#014x} -> miss: {}", addr, e),
        }
    }

    log::debug!("final state: {:?}", tlb);
    if !json {
        println!();
        tlb.stats().print();
        return;
    }
    match serde_json::to_string_pretty(tlb.stats()) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("[!] Could not serialize stats: {}", e);
            process::exit(1);
        }
    }
}
