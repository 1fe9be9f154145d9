//! analemma command-line entry point.
//!
//! Without a subcommand, performs one check-and-capture pass.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use analemma::animation::AnimationFormat;
use analemma::registry::{CameraDirection, CelestialObject};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "analemma", version, about = "Scheduled sun and moon webcam captures")]
struct Cli {
    /// Settings file (default: analemma.toml, or $ANALEMMA_CONFIG)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every location and capture whatever is due in this window
    Run,

    /// Capture a location right away, skipping the schedule
    Capture {
        /// Location id
        #[arg(long, short)]
        location: String,

        /// sun or moon
        #[arg(long, short, default_value = "sun")]
        object: CelestialObject,
    },

    /// Print resolved schedule entries
    Schedule {
        /// Only this location
        #[arg(long, short)]
        location: Option<String>,

        /// First local date (default: today on the host clock)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Number of local dates
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export upcoming captures as an iCalendar file
    Calendar {
        /// First local date (default: today on the host clock)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Number of local dates
        #[arg(long, default_value_t = 365)]
        days: u32,

        /// Output file
        #[arg(long, short, default_value = "analemma.ics")]
        output: PathBuf,
    },

    /// Build animations from captured images with ffmpeg
    Animate {
        /// Only this location
        #[arg(long, short)]
        location: Option<String>,

        /// Only this object
        #[arg(long)]
        object: Option<CelestialObject>,

        /// Only this camera direction
        #[arg(long)]
        camera: Option<CameraDirection>,

        /// gif or mp4
        #[arg(long, short, default_value = "gif")]
        format: AnimationFormat,

        /// Frames per second
        #[arg(long, default_value_t = analemma::constants::DEFAULT_ANIMATION_FPS)]
        fps: u32,

        /// Output directory (default: settings animations_dir)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = commands::App::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(&app).await,
        Commands::Capture { location, object } => {
            commands::capture::execute(&app, &location, object).await
        },
        Commands::Schedule {
            location,
            from,
            days,
            json,
        } => commands::schedule::execute(&app, location.as_deref(), from, days, json).await,
        Commands::Calendar { from, days, output } => {
            commands::calendar::execute(&app, from, days, &output).await
        },
        Commands::Animate {
            location,
            object,
            camera,
            format,
            fps,
            output,
        } => {
            let filter = commands::animate::Filter {
                location,
                object,
                camera,
            };
            commands::animate::execute(&app, &filter, format, fps, output).await
        },
    }
}
