#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fare-control report exporter.
//!
//! ```text
//! fare_control [--settings settings.toml] inspection records.json --format pdf
//! fare_control inspection records.json --format html --from 2025-03-01 --to 2025-03-31
//! fare_control inspection records.json --format text --outbox mail/
//! fare_control embarkment missions.json --format pdf --grouped
//! ```
//!
//! Log output is filtered with `RUST_LOG`.

use std::io::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fare_control_cli::{
    CliError, Output, OutputFormat, ReportMeta, apply_settings, load_missions, load_records,
    render_embarkment_artifacts, render_inspection_output,
};
use fare_control_export::{
    Artifact, DispatchMode, Dispatched, FileSystemSink, MailLauncher as _, OutboxLauncher,
    PreviewRegistry, dispatch,
};
use fare_control_pdf::{Orientation, PdfOptions};
use fare_control_thresholds::global;

#[derive(Parser)]
#[command(name = "fare_control", about = "Export fare-control reports")]
struct Cli {
    /// TOML settings file holding the severity thresholds
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Directory artifacts are saved to
    #[arg(long, global = true, default_value = ".")]
    out: PathBuf,

    /// Write the artifact to stdout instead of saving it
    #[arg(long, global = true)]
    preview: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report over a JSON array of inspection records
    Inspection {
        /// Records file
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Pdf)]
        format: FormatArg,
        /// Report title
        #[arg(long)]
        title: Option<String>,
        /// File name prefix
        #[arg(long)]
        subject: Option<String>,
        /// Location shown in the header
        #[arg(long)]
        location: Option<String>,
        /// First day of the period (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day of the period (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OrientationArg::Auto)]
        orientation: OrientationArg,
        /// Include the location, category, amount and trend sections
        #[arg(long)]
        stats: bool,
        /// Directory mail drafts are dropped into
        #[arg(long, default_value = "outbox")]
        outbox: PathBuf,
    },
    /// Report over a JSON array of embarkment missions
    Embarkment {
        /// Missions file
        input: PathBuf,
        /// Only pdf and html apply here
        #[arg(long, value_enum, default_value_t = FormatArg::Pdf)]
        format: FormatArg,
        /// One document with a cover page and every mission
        #[arg(long)]
        grouped: bool,
        /// Report title
        #[arg(long)]
        title: Option<String>,
        /// File name prefix
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, value_enum, default_value_t = OrientationArg::Auto)]
        orientation: OrientationArg,
    },
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Pdf,
    Html,
    Text,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Pdf => Self::Pdf,
            FormatArg::Html => Self::Html,
            FormatArg::Text => Self::Text,
        }
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrientationArg {
    /// Landscape for long or statistics reports
    Auto,
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(value: OrientationArg) -> Self {
        match value {
            OrientationArg::Auto => Self::Auto,
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

fn deliver(
    artifact: Artifact,
    mode: DispatchMode,
    sink: &FileSystemSink,
    previews: &PreviewRegistry,
) -> std::io::Result<()> {
    match dispatch(artifact, mode, sink, previews) {
        Dispatched::Saved { path, .. } => {
            println!("{}", path.display());
        }
        Dispatched::Preview(handle) => {
            if let Some(artifact) = previews.get(handle.id) {
                std::io::stdout().write_all(artifact.bytes())?;
            }
            previews.release(handle.id);
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &cli.settings {
        apply_settings(path).map_err(CliError::from)?;
    }
    let thresholds = global().snapshot();

    let sink = FileSystemSink::new(&cli.out);
    let previews = PreviewRegistry::new();
    let mode = if cli.preview {
        DispatchMode::Preview
    } else {
        DispatchMode::Download
    };

    match cli.command {
        Commands::Inspection {
            input,
            format,
            title,
            subject,
            location,
            from,
            to,
            orientation,
            stats,
            outbox,
        } => {
            let records = load_records(&input).map_err(CliError::from)?;
            let meta = ReportMeta {
                title,
                subject,
                location,
                from,
                to,
                generated_at: None,
            };
            let pdf = PdfOptions {
                orientation: orientation.into(),
                include_stats: stats,
            };

            match render_inspection_output(&records, format.into(), &meta, &pdf, &thresholds)? {
                Output::Artifact(artifact) => deliver(artifact, mode, &sink, &previews)?,
                Output::Mail(draft) if cli.preview => {
                    println!("Subject: {}\n\n{}", draft.subject, draft.body);
                }
                Output::Mail(draft) => OutboxLauncher::new(outbox)
                    .launch(&draft)
                    .map_err(CliError::from)?,
            }
        }
        Commands::Embarkment {
            input,
            format,
            grouped,
            title,
            subject,
            orientation,
        } => {
            let missions = load_missions(&input).map_err(CliError::from)?;
            let meta = ReportMeta {
                title,
                subject,
                ..ReportMeta::default()
            };
            let pdf = PdfOptions {
                orientation: orientation.into(),
                include_stats: false,
            };

            for artifact in render_embarkment_artifacts(
                &missions,
                format.into(),
                grouped,
                &meta,
                &pdf,
                &thresholds,
            )? {
                deliver(artifact, mode, &sink, &previews)?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    // Handle release timers need a runtime to be spawned on.
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    match run(cli) {
        Err(e) if e.downcast_ref::<CliError>().is_some_and(CliError::is_empty_input) => {
            log::warn!("{e}");
            std::process::exit(1);
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_pdf_with_auto_orientation() {
        let cli = Cli::try_parse_from(["fare_control", "inspection", "records.json"]).unwrap();
        let Commands::Inspection {
            format,
            orientation,
            ..
        } = cli.command
        else {
            panic!("expected the inspection command");
        };
        assert_eq!(OutputFormat::from(format), OutputFormat::Pdf);
        assert_eq!(Orientation::from(orientation), Orientation::Auto);
    }

    #[test]
    fn parses_format_and_orientation_values() {
        let cli = Cli::try_parse_from([
            "fare_control",
            "embarkment",
            "missions.json",
            "--format",
            "html",
            "--orientation",
            "landscape",
        ])
        .unwrap();
        let Commands::Embarkment {
            format,
            orientation,
            ..
        } = cli.command
        else {
            panic!("expected the embarkment command");
        };
        assert_eq!(OutputFormat::from(format), OutputFormat::Html);
        assert_eq!(Orientation::from(orientation), Orientation::Landscape);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Cli::try_parse_from([
            "fare_control",
            "inspection",
            "records.json",
            "--format",
            "docx",
        ]);
        assert!(result.is_err());
    }
}
