use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rust_qris::codec::crc;
use rust_qris::tools::{
    batch_stats, edit_all, format_info, format_tree, format_validation, read_payloads,
    read_payloads_from, validate_all,
};
use rust_qris::{Edit, EditorConfig, Payload, Tag};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "qristool", version, about = "QRIS payload inspection and editing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Where payloads come from; stdin when neither flag is given
#[derive(Args)]
struct Input {
    /// A single raw payload string
    #[arg(long, conflicts_with = "file")]
    payload: Option<String>,
    /// Text file with one payload per line
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print merchant information
    Inspect {
        #[command(flatten)]
        input: Input,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate structure and checksum; exits 1 if anything is invalid
    Validate {
        #[command(flatten)]
        input: Input,
    },
    /// Edit merchant fields and recompute the checksum
    Edit {
        #[command(flatten)]
        input: Input,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        postal: Option<String>,
        /// Arbitrary leaf edit, e.g. `62.07=KASIR02`
        #[arg(long = "set", value_name = "PATH=VALUE")]
        sets: Vec<String>,
        /// Write edited payloads here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the tag tree
    Tree {
        #[command(flatten)]
        input: Input,
    },
    /// Print the CRC-16/IBM-3740 of a string
    Crc { data: String },
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();
    let config = EditorConfig::from_env();

    match cli.command {
        Command::Inspect { input, json } => inspect_cmd(&input, json, &config),
        Command::Validate { input } => validate_cmd(&input, &config),
        Command::Edit {
            input,
            name,
            city,
            postal,
            sets,
            output,
        } => {
            let mut edits = Vec::new();
            if let Some(name) = name {
                edits.push(Edit::merchant_name(name));
            }
            if let Some(city) = city {
                edits.push(Edit::merchant_city(city));
            }
            if let Some(postal) = postal {
                edits.push(Edit::postal_code(postal));
            }
            for set in &sets {
                edits.push(parse_set(set)?);
            }
            edit_cmd(&input, &edits, output, &config)
        }
        Command::Tree { input } => tree_cmd(&input, &config),
        Command::Crc { data } => {
            println!("{}", crc::checksum_hex(data.as_bytes()));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(input: &Input) -> Result<Vec<String>> {
    let payloads = match (&input.payload, &input.file) {
        (Some(raw), _) => vec![raw.trim().to_string()],
        (None, Some(path)) => read_payloads(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => read_payloads_from(io::stdin().lock()).context("failed to read stdin")?,
    };
    if payloads.is_empty() {
        bail!("no payloads given");
    }
    log::info!("loaded {} payload(s)", payloads.len());
    Ok(payloads)
}

/// `26.02=VALUE` -> leaf edit
fn parse_set(arg: &str) -> Result<Edit> {
    let (path, value) = arg
        .split_once('=')
        .with_context(|| format!("expected PATH=VALUE, got {arg:?}"))?;
    let path = path
        .split('.')
        .map(|part| part.trim().parse::<Tag>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("bad tag path {path:?}"))?;
    Ok(Edit::leaf(&path, value))
}

fn inspect_cmd(input: &Input, json: bool, config: &EditorConfig) -> Result<ExitCode> {
    let codec = config.codec();
    let mut infos = Vec::new();
    for raw in load(input)? {
        let payload = Payload::parse_with(&raw, &codec)
            .with_context(|| format!("failed to parse payload {raw:?}"))?;
        if json {
            infos.push(payload.info());
        } else {
            print!("{}", format_info(&payload.info(), &raw));
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
    }
    Ok(ExitCode::SUCCESS)
}

fn validate_cmd(input: &Input, config: &EditorConfig) -> Result<ExitCode> {
    let payloads = load(input)?;
    let results = validate_all(&payloads, config);
    for (raw, result) in payloads.iter().zip(&results) {
        println!("{}", raw);
        print!("{}", format_validation(result));
    }

    let stats = batch_stats(&results);
    if stats.total > 1 {
        println!(
            "{} payloads: {} valid, {} broken",
            stats.total, stats.valid, stats.broken
        );
    }
    Ok(if stats.valid == stats.total {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn edit_cmd(
    input: &Input,
    edits: &[Edit],
    output: Option<PathBuf>,
    config: &EditorConfig,
) -> Result<ExitCode> {
    if edits.is_empty() {
        bail!("nothing to edit; pass --name, --city, --postal or --set");
    }
    let payloads = load(input)?;
    let outcomes = edit_all(&payloads, edits, config);

    let mut lines = Vec::new();
    let mut failed = false;
    for (raw, outcome) in payloads.iter().zip(outcomes) {
        match outcome {
            Ok(outcome) => {
                for issue in &outcome.source_warnings {
                    eprintln!("warning: {}", issue);
                }
                for err in &outcome.rejected {
                    eprintln!("rejected edit: {}", err);
                }
                if !outcome.edited {
                    log::info!("payload unchanged: {}", raw);
                }
                lines.push(outcome.payload);
            }
            Err(err) => {
                eprintln!("cannot edit {:?}: {}", raw, err);
                failed = true;
            }
        }
    }

    match output {
        Some(path) => {
            let mut text = lines.join("\n");
            text.push('\n');
            fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {} payload(s) to {}", lines.len(), path.display());
        }
        None => {
            for line in &lines {
                println!("{}", line);
            }
        }
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn tree_cmd(input: &Input, config: &EditorConfig) -> Result<ExitCode> {
    let codec = config.codec();
    for raw in load(input)? {
        let payload = Payload::parse_with(&raw, &codec)
            .with_context(|| format!("failed to parse payload {raw:?}"))?;
        print!("{}", format_tree(&payload));
        println!();
    }
    Ok(ExitCode::SUCCESS)
}
