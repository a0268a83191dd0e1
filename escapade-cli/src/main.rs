mod cli;
mod compare;
mod error;
mod settings;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use escapade_render::{export_png, render, ExportMetadata};

use crate::cli::{Cli, Command, RenderArgs};
use crate::error::AppError;
use crate::settings::RenderSettings;

fn run_render(args: &RenderArgs) -> Result<(), AppError> {
    let settings = RenderSettings::resolve(args)?;
    let request = settings.to_request()?;
    info!(
        backend = %request.backend,
        formula = request.formula.name(),
        palette = request.palette.name(),
        width = request.raster.width,
        height = request.raster.height,
        "Rendering"
    );

    let out = render(&request)?;
    let meta = ExportMetadata::from_request(&request).with_elapsed_ms(out.elapsed.as_millis());
    export_png(&out.buffer, &settings.output, &meta)?;
    info!(
        path = %settings.output.display(),
        elapsed_ms = out.elapsed.as_millis(),
        "Wrote image"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Render(args) => run_render(args),
        Command::Compare(args) => compare::run(args).map(|reports| {
            println!("{}", compare::format_report(&reports));
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
