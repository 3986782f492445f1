//! Hack Emulator - CLI Entry Point
//!
//! Commands:
//! - `hack-emu run <program>` - Assemble and run an ASM file
//! - `hack-emu debug <program>` - Interactive debugger
//! - `hack-emu asm <source>` - Print an assembly listing
//! - `hack-emu disasm <word>...` - Decode instruction words

use clap::{Parser, Subcommand, ValueEnum};
use hack::{Cpu, Program, Wiring};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hack-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An emulator of the 16-bit Hack computer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it parks or hits the cycle limit
    Run {
        /// Path to the ASM file to execute
        program: String,
        /// Maximum number of cycles to run (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_cycles: u64,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// ALU wiring to execute with
        #[arg(short, long, value_enum, default_value = "canonical")]
        wiring: WiringArg,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the ASM file to debug
        program: String,
    },
    /// Assemble source and print a listing
    Asm {
        /// Path to the source file
        source: String,
    },
    /// Decode instruction words (decimal or 0b binary)
    Disasm {
        /// Words to decode
        #[arg(required = true)]
        words: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum WiringArg {
    Canonical,
    Legacy,
}

impl From<WiringArg> for Wiring {
    fn from(arg: WiringArg) -> Self {
        match arg {
            WiringArg::Canonical => Wiring::Canonical,
            WiringArg::Legacy => Wiring::Legacy,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let trace = matches!(cli.command, Some(Commands::Run { trace: true, .. }));
    init_logging(trace);

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, wiring, json }) => {
            run_program(&program, max_cycles, trace, wiring.into(), json);
        }
        Some(Commands::Debug { program }) => {
            debug_program(&program);
        }
        Some(Commands::Asm { source }) => {
            assemble_file(&source);
        }
        Some(Commands::Disasm { words }) => {
            disassemble_words(&words);
        }
        None => {
            println!("Hack Emulator v0.1.0");
            println!("A 16-bit Hack computer emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read and assemble a source file, exiting on failure.
fn read_program(path: &str) -> Program {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };

    match hack::assemble(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, max_cycles: u64, trace: bool, wiring: Wiring, json: bool) {
    let program = read_program(path);

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut cpu = Cpu::new().wiring(wiring);
    if let Err(e) = cpu.load_program(&program.words) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    if !json {
        println!("🔧 Running: {} ({} instructions, {} wiring)", path, program.len(), wiring);
        println!();
        println!("━━━ Execution ━━━");
    }

    // Run until the program parks
    let mut parked = false;
    while cpu.cycles < max_cycles {
        let pc = cpu.pc();
        let instr = cpu.step();
        if trace && !json {
            println!("{:05}: {:<16} A={} D={} M={}",
                pc, instr.to_string(), cpu.a(), cpu.d(), cpu.snapshot().m);
        }
        if cpu.is_parked(pc, &instr) {
            parked = true;
            break;
        }
    }

    let snapshot = cpu.snapshot();
    if json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", snapshot.cycles);
    println!("A:  {} ({})", snapshot.a, snapshot.a as i16);
    println!("D:  {} ({})", snapshot.d, snapshot.d as i16);
    println!("PC: {}", snapshot.pc);
    println!("M:  {} ({})", snapshot.m, snapshot.m as i16);

    if parked {
        println!();
        println!("✓ Parked at PC={}", snapshot.pc);
    } else {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) {
    use hack::tui::run_debugger;

    println!("🔍 Loading: {}", path);
    let program = read_program(path);

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    println!("📝 Assembled {} instructions", program.len());
    println!("🚀 Launching debugger...");

    if let Err(e) = run_debugger(program) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

fn assemble_file(source_path: &str) {
    let program = read_program(source_path);

    println!("📝 Assembled {}: {} instructions", source_path, program.len());
    println!();
    print!("{}", hack::disassemble(&program.words));

    let vars = program.variables();
    if !vars.is_empty() {
        println!();
        println!("// Variables");
        for (name, addr) in vars {
            println!("{:>5}  {}", addr, name);
        }
    }
}

fn disassemble_words(words: &[String]) {
    for text in words {
        let parsed = match text.strip_prefix("0b") {
            Some(bits) => u32::from_str_radix(&bits.replace('_', ""), 2),
            None => text.parse::<u32>(),
        };
        let value = match parsed {
            Ok(v) => v,
            Err(e) => {
                eprintln!("❌ Invalid word {:?}: {}", text, e);
                std::process::exit(1);
            }
        };
        match hack::cpu::decode(value) {
            Ok(instr) => println!("{:016b}  {}", value, instr),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }
}
