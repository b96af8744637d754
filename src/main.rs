//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu run <program>` - Run a `.ls8` image or `.asm` source
//! - `ls8-emu asm <source>` - Assemble to a `.ls8` image
//! - `ls8-emu disasm <program>` - Disassemble a `.ls8` image
//!
//! Exit codes: 1 for a malformed program, 2 for a missing or unreadable
//! file, 3 for a CPU error at runtime.

use clap::{Parser, Subcommand};
use ls8::asm::LoadError;

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(version = "0.1.0")]
#[command(about = "An emulator for the LS-8, an 8-bit educational stored-program computer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the .ls8 image or .asm source to execute
        program: String,
        /// Maximum number of cycles to run (default: 100000)
        #[arg(short, long, default_value = "100000")]
        max_cycles: u64,
        /// Show a trace line before each instruction
        #[arg(short, long)]
        trace: bool,
        /// Write the final machine state as JSON to this file
        #[arg(long)]
        dump_state: Option<String>,
    },
    /// Assemble source to a .ls8 image
    Asm {
        /// Path to the source file
        source: String,
        /// Output .ls8 file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble a .ls8 image to readable text
    Disasm {
        /// Path to the .ls8 image
        program: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, dump_state }) => {
            run_program(&program, max_cycles, trace, dump_state.as_deref());
        }
        Some(Commands::Asm { source, output }) => {
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        None => {
            println!("LS-8 Emulator v0.1.0");
            println!("An 8-bit educational stored-program computer");
            println!();
            println!("Use --help for available commands");
        }
    }
}

/// Load program bytes from either an assembly source or a binary-text image.
fn load_bytes(path: &str) -> Vec<u8> {
    use ls8::asm::{assemble, load_program_file};

    if path.ends_with(".asm") {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read file: {}", e);
                std::process::exit(2);
            }
        };

        match assemble(&source) {
            Ok(bytes) => {
                println!("📝 Assembled {} bytes", bytes.len());
                bytes
            }
            Err(e) => {
                eprintln!("❌ Assembly error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match load_program_file(path) {
            Ok(bytes) => {
                println!("📂 Loaded {} bytes", bytes.len());
                bytes
            }
            Err(e @ LoadError::Io(_)) => {
                eprintln!("❌ Failed to load program: {}", e);
                std::process::exit(2);
            }
            Err(e) => {
                eprintln!("❌ Failed to load program: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_program(path: &str, max_cycles: u64, trace: bool, dump_state: Option<&str>) {
    use ls8::Cpu;

    println!("🔧 Running: {}", path);

    let program = load_bytes(path);

    if program.is_empty() {
        eprintln!("❌ No instructions to execute");
        std::process::exit(1);
    }

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load_program(&program) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    println!();
    println!("━━━ Execution ━━━");

    while cpu.is_running() && cpu.cycles < max_cycles {
        if trace {
            println!("{}", cpu.trace_line());
        }

        let pc = cpu.pc;
        if let Err(e) = cpu.step() {
            eprintln!("❌ CPU error at PC={}: {}", pc, e);
            std::process::exit(3);
        }

        // PRN output, one decimal line per value, in program order.
        for value in cpu.drain_output() {
            println!("{}", value);
        }
    }

    for diag in cpu.diagnostics() {
        eprintln!("⚠️  {}", diag);
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cpu.cycles);
    println!("State: {:?}", cpu.state);
    print!("Registers:");
    for (i, value) in cpu.regs.as_slice().iter().enumerate() {
        print!(" R{}={}", i, value);
    }
    println!();
    println!(
        "Flags: equal={} greater={} less={}",
        cpu.flags.equal, cpu.flags.greater, cpu.flags.less
    );

    if cpu.is_running() {
        println!();
        println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
    }

    if let Some(state_path) = dump_state {
        match serde_json::to_string_pretty(&cpu) {
            Ok(json) => {
                if let Err(e) = std::fs::write(state_path, json) {
                    eprintln!("❌ Failed to write state dump: {}", e);
                    std::process::exit(2);
                }
                println!("💾 State written to {}", state_path);
            }
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(2);
            }
        }
    }
}

fn assemble_file(source_path: &str, output: Option<String>) {
    use ls8::asm::{assemble, save_program_file};

    let out_path = output.unwrap_or_else(|| source_path.replace(".asm", ".ls8"));

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let source = match std::fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(2);
        }
    };

    let program = match assemble(&source) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    println!("✓ Assembled {} bytes", program.len());

    if let Err(e) = save_program_file(&out_path, &program) {
        eprintln!("❌ Failed to save program: {}", e);
        std::process::exit(2);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(path: &str) {
    use ls8::asm::disassemble;

    println!("📖 Disassembling: {}", path);
    println!();

    let program = load_bytes(path);
    println!("{}", disassemble(&program));
}
