use anyhow::{anyhow, Context, Result};
use log::info;
use mbytev_disasm::{BytecodeDecoder, DisasmConfig, ListingFormatter, ProgramLoader};
use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

const USAGE: &str = "Usage: mbytev-disasm [--config FILE] [--json] [--bytes] [--targets] \
[--header] [--unpack] [--truncate] <bytecode_file>";

/// Arguments de ligne de commande
#[derive(Debug, Default)]
struct CliArgs {
    path: String,
    config_path: Option<String>,
    json: bool,
    show_bytes: bool,
    annotate_targets: bool,
    header: bool,
    unpack: bool,
    truncate: bool,
}

/// Analyse les arguments; `Ok(None)` pour `--help`
fn parse_args(args: &[String]) -> Result<Option<CliArgs>> {
    let mut cli = CliArgs::default();
    let mut path = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a file argument"))?;
                cli.config_path = Some(value.clone());
            }
            "--json" => cli.json = true,
            "--bytes" => cli.show_bytes = true,
            "--targets" => cli.annotate_targets = true,
            "--header" => cli.header = true,
            "--unpack" => cli.unpack = true,
            "--truncate" => cli.truncate = true,
            other if other.starts_with("--") => return Err(anyhow!("unknown option '{}'", other)),
            other => {
                if path.is_some() {
                    return Err(anyhow!("unexpected argument '{}'", other));
                }
                path = Some(other.to_string());
            }
        }
    }

    cli.path = path.ok_or_else(|| anyhow!("missing bytecode file"))?;
    Ok(Some(cli))
}

fn run(cli: &CliArgs) -> Result<()> {
    let mut config = match &cli.config_path {
        Some(path) => DisasmConfig::load_from_file(path)?,
        None => DisasmConfig::default(),
    };

    // Les options de ligne de commande s'ajoutent au fichier de configuration
    config.listing.show_bytes |= cli.show_bytes;
    config.listing.annotate_targets |= cli.annotate_targets;
    config.listing.header |= cli.header;
    config.loader.unpack |= cli.unpack;
    config.loader.truncate_to_vm_limit |= cli.truncate;

    let loader = ProgramLoader::new(config.loader.clone());
    let program = loader.load_file(&cli.path)?;
    info!("loaded '{}' ({} bytes)", program.name(), program.size());

    let decoded = BytecodeDecoder::new()
        .decode(program.data())
        .with_context(|| format!("cannot disassemble '{}'", program.name()))?;
    info!("decoded {} instruction(s)", decoded.len());

    let output = if cli.json {
        let mut json = serde_json::to_string_pretty(&decoded)?;
        json.push('\n');
        json
    } else {
        ListingFormatter::new(config.listing.clone()).render_program(&program, &decoded)
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(output.as_bytes())?;
    handle.flush()?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(Some(cli)) => cli,
        Ok(None) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(1)
        }
    }
}
