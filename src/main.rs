use std::env;
use std::process;

use ebc::codec::{block_image, pack_text, unblock_image, unpack_text, vq_expand_image};
use ebc::ebf::Ebf;
use ebc::{CodebookSize, EbContext, EbError, Image, Result, Variant};

/// An error and the operand it is reported against.
type Failure<'a> = (EbError, &'a str);

fn print_usage() {
    println!("Usage:");
    println!("  ebc compress <input.ebf> <output.ebc>");
    println!("  ebc decompress <input.ebc> <output.ebf>");
    println!("  ebc block <input.ebc> <output.ebc>");
    println!("  ebc unblock <input.ebc> <output.ebc>");
    println!("  ebc r32|r128 <input.ebc> <output.ebc> <seed>");
    println!("  ebc u32|u128 <input.ebc> <output.ebc>");
    println!("  ebc compare <file1.ebc> <file2.ebc>");
    println!();
    println!("Set RUST_LOG=ebc=debug for pipeline logging.");
}

fn print_command_usage(command: &str, operands: &str) {
    println!("Usage: ebc {} {}", command, operands);
}

fn report(error: &EbError, file: &str) -> i32 {
    if error.names_file() {
        println!("ERROR: {} ({})", error, file);
    } else {
        println!("ERROR: {}", error);
    }
    error.exit_code()
}

fn parse_seed(arg: &str) -> Result<u64> {
    arg.trim()
        .parse::<i64>()
        .map(|seed| seed as u64)
        .map_err(|_| EbError::BadArgs)
}

fn run<'a>(
    command: &str,
    operands: &'a [String],
) -> std::result::Result<&'static str, Failure<'a>> {
    let input = operands[0].as_str();
    let output = operands[1].as_str();
    // Reading and processing failures name the input, saving failures the output
    let read = |e: EbError| (e, input);
    let write = |e: EbError| (e, output);

    match command {
        "compress" => {
            let image = Ebf::open(input).and_then(pack_text).map_err(read)?;
            image.save(output).map_err(write)?;
            Ok("COMPRESSED")
        }
        "decompress" => {
            let ebf = Image::open_as(input, Variant::Raw)
                .and_then(unpack_text)
                .map_err(read)?;
            ebf.save(output).map_err(write)?;
            Ok("DECOMPRESSED")
        }
        "block" => {
            let image = Image::open_as(input, Variant::Raw)
                .and_then(|image| block_image(&image))
                .map_err(read)?;
            image.save(output).map_err(write)?;
            Ok("COMPRESSED")
        }
        "unblock" => {
            let image = Image::open_as(input, Variant::BlockAverage)
                .and_then(|image| unblock_image(&image))
                .map_err(read)?;
            image.save(output).map_err(write)?;
            Ok("DECOMPRESSED")
        }
        "r32" | "r128" => {
            let size = if command == "r32" {
                CodebookSize::K32
            } else {
                CodebookSize::K128
            };
            let seed = parse_seed(&operands[2]).map_err(|e| (e, ""))?;
            let ctx = EbContext::new(None).map_err(|e| (e, ""))?;
            let image = Image::open_as(input, Variant::Raw)
                .and_then(|image| ctx.compress_vq(image.data(), size, seed))
                .map_err(read)?;
            image.save(output).map_err(write)?;
            Ok("COMPRESSED")
        }
        "u32" | "u128" => {
            let size = if command == "u32" {
                CodebookSize::K32
            } else {
                CodebookSize::K128
            };
            let image = Image::open_as(input, size.variant())
                .and_then(|image| vq_expand_image(&image))
                .map_err(read)?;
            image.save(output).map_err(write)?;
            Ok("DECOMPRESSED")
        }
        "compare" => {
            let a = Image::open(input).map_err(read)?;
            let b = Image::open(output).map_err(write)?;
            Ok(if a.same_as(&b) {
                "IDENTICAL"
            } else {
                "DIFFERENT"
            })
        }
        _ => Err((EbError::BadArgs, "")),
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(0);
    }

    let command = args[1].as_str();
    let operands = &args[2..];
    let (usage, arity) = match command {
        "compress" | "decompress" | "block" | "unblock" | "u32" | "u128" => {
            ("<input file> <output file>", 2)
        }
        "r32" | "r128" => ("<input file> <output file> <seed>", 3),
        "compare" => ("<file1> <file2>", 2),
        _ => {
            eprintln!("Invalid command: {}", command);
            print_usage();
            process::exit(EbError::BadArgs.exit_code());
        }
    };

    if operands.is_empty() {
        print_command_usage(command, usage);
        process::exit(0);
    }
    if operands.len() != arity {
        process::exit(report(&EbError::BadArgs, ""));
    }

    match run(command, operands) {
        Ok(outcome) => println!("{}", outcome),
        Err((e, file)) => process::exit(report(&e, file)),
    }
}
