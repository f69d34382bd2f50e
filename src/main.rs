//! Intcode command-line tool.
//!
//! # Usage
//! ```text
//! intcode run <program> [--input v1,v2,...] [--max-steps N]
//! intcode network <program> [--size N] [--nat A] [--max-ticks N]
//! intcode asm <source> [-o <output>]
//! intcode disasm <program>
//! ```
//!
//! Program files hold one line of comma-separated integers; assembly sources use the
//! syntax described in [`intcode::virtual_machine::assembler`].

use intcode::network::fabric::{Network, NetworkConfig};
use intcode::utils::log;
use intcode::virtual_machine::Word;
use intcode::virtual_machine::assembler::assemble_file;
use intcode::virtual_machine::disasm::disassemble;
use intcode::virtual_machine::program::Program;
use intcode::virtual_machine::vm::{Status, Vm};
use intcode::{error, info, warn};
use std::env;
use std::fs;
use std::path::Path;
use std::process;
use std::str::FromStr;

fn main() {
    log::init_from_env();
    let args: Vec<String> = env::args().collect();

    let help = args.len() > 1 && (args[1] == "--help" || args[1] == "-h");
    if help || args.len() < 3 {
        print_usage(&args[0]);
        process::exit(if help { 0 } else { 1 });
    }

    let command = args[1].as_str();
    let path = &args[2];
    let rest = &args[3..];

    if !Path::new(path).exists() {
        error!("Input file does not exist: {}", path);
        process::exit(1);
    }

    match command {
        "run" => run(&args[0], path, rest),
        "network" => network(&args[0], path, rest),
        "asm" => asm(&args[0], path, rest),
        "disasm" => {
            if let Some(arg) = rest.first() {
                unexpected(&args[0], arg);
            }
            print!("{}", disassemble(&load_program(path)));
        }
        other => {
            error!("Unknown command: {}\n", other);
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

fn run(program_name: &str, path: &str, args: &[String]) {
    let mut inputs: Vec<Word> = Vec::new();
    let mut max_steps: Option<u64> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--input" | "-i") => {
                let value = flag_value(args, &mut i, k);
                inputs = value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| parse_number(k, v))
                    .collect();
            }
            k @ "--max-steps" => max_steps = Some(parse_number(k, flag_value(args, &mut i, k))),
            other => unexpected(program_name, other),
        }
    }

    let mut vm = Vm::new(&load_program(path), None);
    vm.extend_input(inputs);
    let result = match max_steps {
        Some(limit) => vm.run_bounded(limit),
        None => vm.run(),
    };

    for value in vm.drain_output() {
        println!("{value}");
    }

    match result {
        Ok(Status::Halted) => info!("Halted after {} steps", vm.steps()),
        Ok(_) => {
            warn!(
                "Program is waiting for input at address {} after {} steps",
                vm.pc(),
                vm.steps()
            );
            process::exit(2);
        }
        Err(e) => {
            error!("Execution failed: {}", e);
            process::exit(1);
        }
    }
}

fn network(program_name: &str, path: &str, args: &[String]) {
    let mut config = NetworkConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            k @ "--size" => config.size = parse_number(k, flag_value(args, &mut i, k)),
            k @ "--nat" => config.nat_address = parse_number(k, flag_value(args, &mut i, k)),
            k @ "--max-ticks" => {
                config.max_ticks = Some(parse_number(k, flag_value(args, &mut i, k)))
            }
            other => unexpected(program_name, other),
        }
    }

    let outcome = Network::new(&load_program(path), config).and_then(|mut n| n.run());
    match outcome {
        Ok(outcome) => {
            match outcome.first_broadcast {
                Some(packet) => println!("first broadcast y: {}", packet.y),
                None => println!("first broadcast y: none"),
            }
            println!("nat y: {}", outcome.answer);
            info!(
                "Converged after {} ticks and {} injections",
                outcome.ticks, outcome.injections
            );
        }
        Err(e) => {
            error!("Network failed: {}", e);
            process::exit(1);
        }
    }
}

fn asm(program_name: &str, path: &str, args: &[String]) {
    let mut output_path: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--output" | "-o") => output_path = Some(flag_value(args, &mut i, k).to_string()),
            other => unexpected(program_name, other),
        }
    }

    let program = match assemble_file(path) {
        Ok(p) => p,
        Err(e) => {
            error!("Assembly failed: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        None => println!("{program}"),
        Some(out) => {
            if let Err(e) = fs::write(&out, format!("{program}\n")) {
                error!("Failed to write {}: {}", out, e);
                process::exit(1);
            }
            info!("Assembled {} words to {}", program.len(), out);
        }
    }
}

fn load_program(path: &str) -> Program {
    Program::from_file(path).unwrap_or_else(|e| {
        error!("Failed to load program: {}", e);
        process::exit(1);
    })
}

/// Returns the argument following the flag at `args[*i]` and moves past both.
fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    if *i >= args.len() {
        error!("{flag} requires an argument");
        process::exit(1);
    }
    let value = &args[*i];
    *i += 1;
    value
}

fn parse_number<T: FromStr>(flag: &str, value: &str) -> T {
    value.parse::<T>().unwrap_or_else(|_| {
        error!("Invalid value for {flag}: '{value}' is not a valid number");
        process::exit(1);
    })
}

fn unexpected(program_name: &str, arg: &str) -> ! {
    error!("Unexpected argument: {}\n", arg);
    print_usage(program_name);
    process::exit(1);
}

const USAGE: &str = "\
Intcode virtual machine

USAGE:
    {program} run <program> [--input v1,v2,...] [--max-steps N]
    {program} network <program> [--size N] [--nat A] [--max-ticks N]
    {program} asm <source> [-o <output>]
    {program} disasm <program>

COMMANDS:
    run        Run one instance and print its output, one value per line
    network    Run a packet network and print the first broadcast and NAT answers
    asm        Assemble a source file into a program image
    disasm     Print the disassembly of a program image

OPTIONS:
    -i, --input <values>    Comma-separated input values
    --max-steps <n>         Fail after n instructions without halting or blocking
    --size <n>              Number of network instances (default 50)
    --nat <address>         NAT address (default 255)
    --max-ticks <n>         Fail if the network has not converged after n ticks
    -o, --output <file>     Write the assembled image to a file instead of stdout
    -h, --help              Print this help message

ENVIRONMENT:
    INTCODE_LOG              Minimum log level: debug, info, warn or error (default info)
    INTCODE_LOG_TIMESTAMP    Set to 0 to hide log timestamps

EXAMPLES:
    {program} run day9.txt --input 1
    {program} network day23.txt
    {program} asm echo.asm -o echo.txt
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}
