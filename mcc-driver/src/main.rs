//! MicroC Compiler Driver
//!
//! Reads a typed program as JSON, lowers it, allocates registers and writes
//! assembly. `blocks` dumps the basic blocks and live sets instead.

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};
use mcc_backend::{
    analyze_block, compile_program, emit_three_address, exit_live_set, split_blocks, AllocOptions,
};
use mcc_codegen::emit_line;
use mcc_common::CompilerError;
use mcc_frontend::{Frontend, LoweredProgram};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mcc")]
#[command(about = "MicroC Compiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Register-allocated assembly
    Asm,
    /// Lowered code with symbolic temporaries
    ThreeAddress,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a typed program (JSON) to assembly
    Compile {
        /// Input program
        input: PathBuf,

        /// Output assembly file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to emit
        #[arg(long, value_enum, default_value_t = Emit::Asm)]
        emit: Emit,

        /// Size of the integer register bank
        #[arg(long)]
        int_regs: Option<usize>,

        /// Size of the float register bank
        #[arg(long)]
        float_regs: Option<usize>,

        /// Allocator options as JSON; command-line sizes override it
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the basic blocks and live sets of every function
    Blocks {
        /// Input program
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Compile {
            input,
            output,
            emit,
            int_regs,
            float_regs,
            config,
        } => load_options(config.as_deref(), int_regs, float_regs)
            .and_then(|options| compile_file(&input, output.as_deref(), emit, &options)),
        Commands::Blocks { input } => dump_blocks(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose && std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn load_options(
    config: Option<&Path>,
    int_regs: Option<usize>,
    float_regs: Option<usize>,
) -> Result<AllocOptions, CompilerError> {
    let mut options = match config {
        Some(path) => AllocOptions::from_json(&fs::read_to_string(path)?)?,
        None => AllocOptions::default(),
    };
    if let Some(n) = int_regs {
        options.int_registers = n;
    }
    if let Some(n) = float_regs {
        options.float_registers = n;
    }
    options.validate()?;
    debug!("Allocator options: {:?}", options);
    Ok(options)
}

fn lower_file(input: &Path) -> Result<LoweredProgram, CompilerError> {
    let source = fs::read_to_string(input)?;
    Frontend::lower_json(&source)
}

fn compile_file(
    input: &Path,
    output: Option<&Path>,
    emit: Emit,
    options: &AllocOptions,
) -> Result<(), CompilerError> {
    debug!("Compiling {}", input.display());
    let lowered = lower_file(input)?;

    let text = match emit {
        Emit::Asm => compile_program(&lowered, options)?.to_assembly(),
        Emit::ThreeAddress => emit_three_address(&lowered),
    };

    match output {
        Some(path) => {
            fs::write(path, &text)?;
            debug!("Assembly written to {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn dump_blocks(input: &Path) -> Result<(), CompilerError> {
    let lowered = lower_file(input)?;
    let mut out = String::new();

    for function in &lowered.functions {
        let blocks = split_blocks(&function.body)
            .map_err(|e| CompilerError::block_error(&function.name, e.to_string()))?;
        let exit_live = exit_live_set(&function.scope_homes, &lowered.globals);

        let _ = writeln!(out, "function {} ({} blocks)", function.name, blocks.len());
        for (n, block) in blocks.iter().enumerate() {
            let liveness = analyze_block(&block.instructions, &exit_live);
            let live_in = format_set(&liveness.live_in);
            let _ = writeln!(out, "  block {} @{}  live in: {}", n, block.start, live_in);
            for (inst, live) in block.instructions.iter().zip(&liveness.live_after) {
                let _ = writeln!(out, "  {:<32} ; {}", emit_line(inst), format_set(live));
            }
        }
        out.push('\n');
    }

    print!("{}", out);
    Ok(())
}

fn format_set(live: &mcc_backend::LiveSet) -> String {
    let names: Vec<String> = live.iter().map(ToString::to_string).collect();
    format!("{{{}}}", names.join(", "))
}
