//! # sh4a-run
//!
//! Loads a raw SH-4A program image into RAM, runs it headless and prints
//! the final processor state as JSON.
//!
//! ```text
//! sh4a-run <image> [--config FILE] [--load ADDR] [--entry ADDR]
//!                  [--steps N] [--trace] [--save-state FILE]
//! ```

use anyhow::{bail, Context, Result};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

use sh4a_core::snapshot;
use sh4a_core::{Cpu, CoreConfig, Ram, Sh4a};

#[derive(Debug, Default, PartialEq)]
struct RunOptions {
    image: PathBuf,
    config: Option<PathBuf>,
    load: Option<u32>,
    entry: Option<u32>,
    steps: Option<u64>,
    trace: bool,
    save_state: Option<PathBuf>,
}

fn parse_u32(text: &str) -> Result<u32> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => text.replace('_', "").parse(),
    };
    parsed.with_context(|| format!("invalid address: {text}"))
}

impl RunOptions {
    fn from_args(args: &[String]) -> Result<Self> {
        let mut opts = Self::default();
        let mut image = None;
        let mut iter = args.iter().skip(1);

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{flag} needs a value"))
            };
            match arg.as_str() {
                "--config" => opts.config = Some(value("--config")?.into()),
                "--load" => opts.load = Some(parse_u32(&value("--load")?)?),
                "--entry" => opts.entry = Some(parse_u32(&value("--entry")?)?),
                "--steps" => {
                    let text = value("--steps")?;
                    opts.steps = Some(text.parse().with_context(|| format!("invalid step count: {text}"))?);
                }
                "--save-state" => opts.save_state = Some(value("--save-state")?.into()),
                "--trace" => opts.trace = true,
                flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
                path => {
                    if image.replace(PathBuf::from(path)).is_some() {
                        bail!("only one image may be given");
                    }
                }
            }
        }

        opts.image = image.context("usage: sh4a-run <image> [--config FILE] [--load ADDR] [--entry ADDR] [--steps N] [--trace] [--save-state FILE]")?;
        Ok(opts)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sh4a_run=info".parse()?)
                .add_directive("sh4a_core=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let opts = RunOptions::from_args(&args)?;

    let mut config = match &opts.config {
        Some(path) => CoreConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoreConfig::default(),
    };
    if opts.trace {
        config.trace_instructions = true;
    }

    let image = std::fs::read(&opts.image)
        .with_context(|| format!("reading image {}", opts.image.display()))?;
    let load_addr = opts.load.unwrap_or(config.ram_base);

    let mut ram = Ram::new(config.ram_base, config.ram_size);
    let copied = ram.load(load_addr, &image);
    if copied < image.len() {
        bail!(
            "image is {} bytes but only {} fit in RAM at {:#010x}",
            image.len(),
            copied,
            load_addr
        );
    }

    info!(
        "sh4a-run v{}: {} bytes loaded at {:#010x}",
        env!("CARGO_PKG_VERSION"),
        image.len(),
        load_addr
    );

    let mut cpu = Sh4a::with_config(ram, &config);
    cpu.set_pc(opts.entry.unwrap_or(load_addr));

    let max_steps = opts.steps.unwrap_or(config.max_steps);
    let outcome = cpu.run(max_steps);

    println!("{}", serde_json::to_string_pretty(cpu.state())?);

    if let Some(path) = &opts.save_state {
        let bytes = snapshot::save_state(cpu.state())?;
        std::fs::write(path, bytes).with_context(|| format!("writing snapshot {}", path.display()))?;
        info!("Snapshot written to {}", path.display());
    }

    match outcome {
        Ok(summary) => {
            info!(
                "{} after {} steps ({} instructions retired)",
                if summary.halted { "Halted" } else { "Step limit reached" },
                summary.steps,
                cpu.retired()
            );
            Ok(())
        }
        Err(e) => {
            error!("Execution stopped: {}", e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("sh4a-run").chain(list.iter().copied()).map(String::from).collect()
    }

    #[test]
    fn test_parse_full_command_line() {
        let opts = RunOptions::from_args(&args(&[
            "prog.bin", "--load", "0x8800_1000", "--entry", "0x88001004", "--steps", "500", "--trace",
        ]))
        .unwrap();
        assert_eq!(opts.image, PathBuf::from("prog.bin"));
        assert_eq!(opts.load, Some(0x8800_1000));
        assert_eq!(opts.entry, Some(0x8800_1004));
        assert_eq!(opts.steps, Some(500));
        assert!(opts.trace);
        assert!(opts.config.is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(RunOptions::from_args(&args(&[])).is_err());
        assert!(RunOptions::from_args(&args(&["a.bin", "b.bin"])).is_err());
        assert!(RunOptions::from_args(&args(&["a.bin", "--steps"])).is_err());
        assert!(RunOptions::from_args(&args(&["a.bin", "--bogus"])).is_err());
        assert!(RunOptions::from_args(&args(&["a.bin", "--load", "0xZZ"])).is_err());
    }

    #[test]
    fn test_parse_u32_decimal_and_hex() {
        assert_eq!(parse_u32("4096").unwrap(), 4096);
        assert_eq!(parse_u32("0XA0000000").unwrap(), 0xA000_0000);
    }
}
