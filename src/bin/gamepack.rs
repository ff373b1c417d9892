/// Command-line driver for the codecs.
///
/// Usage:
///     gamepack compress <format> <in> <out> [--seed N] [--name NAME] [--ext EXT]
///     gamepack decompress <format|auto> <in> <out>
///     gamepack identify <in>
///
/// Set `RUST_LOG=debug` to see per-call sizes, `RUST_LOG=trace` for detection probes.

use anyhow::{anyhow, bail, Context, Result};
use gamepack::{CompressionConfiguration, CompressionFormat};
use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::process;

const USAGE: &str = "Usage:
    gamepack compress <format> <in> <out> [--seed N] [--name NAME] [--ext EXT]
    gamepack decompress <format|auto> <in> <out>
    gamepack identify <in>

Formats: lz10 cxlz cmpr lz11 onz lz01 lz00 cnx prs";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(err) = run(&args) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("compress") if args.len() >= 4 => {
            let format: CompressionFormat = args[1].parse()?;
            let config = parse_options(&args[4..])?;
            compress(format, &args[2], &args[3], &config)
        }
        Some("decompress") if args.len() == 4 => decompress(&args[1], &args[2], &args[3]),
        Some("identify") if args.len() == 2 => identify(&args[1]),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    }
}

fn parse_options(options: &[String]) -> Result<CompressionConfiguration> {
    let mut config = CompressionConfiguration::default();
    let mut iter = options.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| anyhow!("missing value for {}", flag))?;
        config = match flag.as_str() {
            "--seed" => config.with_key_seed(
                value
                    .parse()
                    .with_context(|| format!("invalid seed {:?}", value))?,
            ),
            "--name" => config.with_file_name(value.as_str()),
            "--ext" => config.with_extension(value),
            other => bail!("unknown option {}", other),
        };
    }
    Ok(config)
}

fn compress(
    format: CompressionFormat,
    input: &str,
    output: &str,
    config: &CompressionConfiguration,
) -> Result<()> {
    let file = File::open(input).with_context(|| format!("cannot open {}", input))?;
    let packed = format
        .compress_from(&mut BufReader::new(file), config)
        .with_context(|| format!("compressing {} as {}", input, format))?;
    fs::write(output, &packed).with_context(|| format!("cannot write {}", output))?;
    println!("{}: {} bytes as {}", output, packed.len(), format);
    Ok(())
}

fn decompress(format: &str, input: &str, output: &str) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("cannot read {}", input))?;
    let format = if format.eq_ignore_ascii_case("auto") {
        CompressionFormat::detect(&data)
            .ok_or_else(|| anyhow!("{} is not in a recognised format", input))?
    } else {
        format.parse()?
    };
    let unpacked = format
        .decompress(&data)
        .with_context(|| format!("decompressing {} as {}", input, format))?;
    fs::write(output, &unpacked).with_context(|| format!("cannot write {}", output))?;
    println!("{}: {} bytes from {}", output, unpacked.len(), format);
    Ok(())
}

fn identify(input: &str) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("cannot read {}", input))?;
    match CompressionFormat::detect(&data) {
        Some(format) => println!("{}: {}", input, format),
        None => println!("{}: unknown", input),
    }
    Ok(())
}
