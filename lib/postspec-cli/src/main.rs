#![allow(missing_docs)]
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use postspec_core::load::{load_collection, write_document};
use postspec_core::split::{ROOT_FILE, SplitPathsByTag, split_files};
use postspec_core::{ConversionReport, Converter};

const HELP: &str = "\
postspec: convert Postman collections into OpenAPI specifications

USAGE:
  postspec convert <collection.json> [-o <spec.yaml>] [--split <dir>]
  postspec split <spec.yaml|spec.json>... [-o <dir>]

OPTIONS:
  -o, --output <path>  Output file (convert) or directory (split)
  --split <dir>        Also write the converted document split by path
  -h, --help           Print this help
";

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    match Command::parse().context("parsing arguments")? {
        Command::Help => print_help(),
        Command::Convert {
            collection,
            output,
            split_dir,
        } => convert(&collection, output, split_dir)?,
        Command::Split { inputs, output } => split(&inputs, &output)?,
    }

    info!("Bye!");
    Ok(())
}

#[derive(Debug)]
enum Command {
    Help,
    Convert {
        collection: PathBuf,
        output: Option<PathBuf>,
        split_dir: Option<PathBuf>,
    },
    Split {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
}

impl Command {
    fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        if pargs.contains(["-h", "--help"]) {
            return Ok(Self::Help);
        }

        let result = match pargs.subcommand().context("parsing command")?.as_deref() {
            Some("convert") => {
                let output = pargs
                    .opt_value_from_str(["-o", "--output"])
                    .context("parsing output argument")?;
                let split_dir = pargs
                    .opt_value_from_str("--split")
                    .context("parsing split argument")?;
                let collection = pargs
                    .free_from_str()
                    .context("parsing collection argument")?;
                Self::Convert {
                    collection,
                    output,
                    split_dir,
                }
            }
            Some("split") => {
                let output = pargs
                    .opt_value_from_str(["-o", "--output"])
                    .context("parsing output argument")?
                    .unwrap_or_else(|| PathBuf::from("specs"));
                let inputs: Vec<PathBuf> = pargs.finish().into_iter().map(PathBuf::from).collect();
                if inputs.is_empty() {
                    bail!("missing input documents");
                }
                return Ok(Self::Split { inputs, output });
            }
            Some(other) => bail!("unknown command '{other}'"),
            None => return Ok(Self::Help),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "Warning: unused arguments left");
        }
        Ok(result)
    }
}

#[allow(clippy::print_stdout)]
fn print_help() {
    print!("{HELP}");
}

fn convert(
    collection_path: &Path,
    output: Option<PathBuf>,
    split_dir: Option<PathBuf>,
) -> Result<()> {
    let collection = load_collection(collection_path)
        .with_context(|| format!("loading collection {}", collection_path.display()))?;

    let conversion = Converter::default().convert(&collection);
    log_report(&conversion.report);

    let output = match (output, &split_dir) {
        (Some(output), _) => Some(output),
        (None, Some(_)) => None,
        (None, None) => Some(PathBuf::from("openapi.yaml")),
    };

    if let Some(output) = output {
        write_document(&conversion.document, &output)
            .with_context(|| format!("writing {}", output.display()))?;
        info!(output = %output.display(), "document written");
    }

    if let Some(dir) = split_dir {
        let files = conversion
            .split(SplitPathsByTag::default())
            .write_to(&dir, ROOT_FILE)
            .with_context(|| format!("writing split document to {}", dir.display()))?;
        info!(dir = %dir.display(), files = files.len(), "split document written");
    }

    Ok(())
}

fn log_report(report: &ConversionReport) {
    info!(
        leaves = report.leaves,
        folders = report.folders,
        skipped = report.skipped.len(),
        overwrites = report.overwrites.len(),
        collisions = report.collisions.len(),
        "conversion report"
    );
}

fn split(inputs: &[PathBuf], output: &Path) -> Result<()> {
    let report = split_files(inputs, output, &SplitPathsByTag::default());

    for outcome in report.succeeded() {
        info!(
            input = %outcome.input.display(),
            output = %outcome.output_dir.display(),
            "document split"
        );
    }

    let failed = report.failed().count();
    if failed > 0 {
        bail!("{failed} of {} documents could not be split", report.outcomes.len());
    }
    Ok(())
}
