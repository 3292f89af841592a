use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use facetrace_core::capture::infrastructure::temp_store_frame_source::{
    cleanup_captures, default_capture_dir, TempStoreFrameSource,
};
use facetrace_core::pipeline::enroll_person_use_case::{EnrollPersonUseCase, EnrollmentOutcome};
use facetrace_core::pipeline::identify_person_use_case::IdentifyPersonUseCase;
use facetrace_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facetrace_core::pipeline::result_sink::{LogResultSink, LoopOutcome};
use facetrace_core::pipeline::retry_policy::ConstantDelay;
use facetrace_core::recognition::infrastructure::http_recognition_client::HttpRecognitionClient;

mod settings;
use settings::Settings;

/// Live person identification against a remote recognition service.
#[derive(Parser)]
#[command(name = "facetrace")]
struct Cli {
    /// Base URL of the recognition service (overrides settings file).
    #[arg(long)]
    endpoint: Option<String>,

    /// Subscription key for the recognition service (overrides settings file).
    #[arg(long)]
    key: Option<String>,

    /// Identity group to match against (overrides settings file).
    #[arg(long)]
    group: Option<String>,

    /// Persist the effective endpoint/key/group back to the settings file.
    #[arg(long)]
    save_settings: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the identification loop over a sequence of still frames.
    Identify {
        /// Input images, captured in order as the frame stream.
        #[arg(required = true)]
        frames: Vec<PathBuf>,

        /// Delay between capture attempts in milliseconds.
        #[arg(long)]
        retry_delay_ms: Option<u64>,
    },
    /// Enroll a person from one captured frame.
    Enroll {
        /// Display name of the person to enroll or update.
        name: String,

        /// Input image to capture the face from.
        frame: PathBuf,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = Settings::load();
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(key) = &cli.key {
        settings.subscription_key = key.clone();
    }
    if let Some(group) = &cli.group {
        settings.group_id = group.clone();
    }
    validate(&settings, &cli.command)?;

    if cli.save_settings {
        settings.save();
        log::info!("Settings saved");
    }

    match cli.command {
        Command::Identify {
            frames,
            retry_delay_ms,
        } => run_identify(&settings, frames, retry_delay_ms),
        Command::Enroll { name, frame } => run_enroll(&settings, &name, frame),
    }
}

fn run_identify(
    settings: &Settings,
    frames: Vec<PathBuf>,
    retry_delay_ms: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpRecognitionClient::new(&settings.endpoint, &settings.subscription_key)?;
    let capture_dir = default_capture_dir()?;
    let source = TempStoreFrameSource::with_capture_dir(frames, capture_dir.clone())?;
    let delay = Duration::from_millis(retry_delay_ms.unwrap_or(settings.retry_delay_ms));

    let mut use_case = IdentifyPersonUseCase::new(
        Box::new(source),
        Box::new(client),
        Box::new(LogResultSink),
        &settings.group_id,
        Some(Box::new(ConstantDelay::new(delay))),
        Some(Box::new(StdoutPipelineLogger::default())),
        None,
    );
    let outcome = use_case.execute();

    // Capture files are the host's mess to sweep up, whatever happened.
    if let Err(e) = cleanup_captures(&capture_dir) {
        log::warn!("Failed to clean capture directory: {e}");
    }

    match outcome? {
        LoopOutcome::Matched {
            name,
            age,
            confidence,
        } => {
            let pct = confidence * 100.0;
            match age {
                Some(age) => println!("{name} (age {age:.0})  confidence {pct:.1}%"),
                None => println!("{name}  confidence {pct:.1}%"),
            }
            Ok(())
        }
        LoopOutcome::Failed { code, message } => match code {
            Some(code) => Err(format!("identification failed ({code}): {message}").into()),
            None => Err(format!("identification failed: {message}").into()),
        },
        LoopOutcome::Cancelled => {
            println!("No match before the frame stream ended");
            Ok(())
        }
    }
}

fn run_enroll(
    settings: &Settings,
    name: &str,
    frame: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpRecognitionClient::new(&settings.endpoint, &settings.subscription_key)?;
    let capture_dir = default_capture_dir()?;
    let source = TempStoreFrameSource::with_capture_dir(vec![frame], capture_dir.clone())?;

    let mut use_case =
        EnrollPersonUseCase::new(Box::new(source), Box::new(client), &settings.group_id);
    let outcome = use_case.execute(name);

    if let Err(e) = cleanup_captures(&capture_dir) {
        log::warn!("Failed to clean capture directory: {e}");
    }

    match outcome? {
        EnrollmentOutcome::Enrolled {
            person_id,
            newly_created,
            ..
        } => {
            if newly_created {
                println!("Enrolled {name} as {person_id}");
            } else {
                println!("Added face to {name} ({person_id})");
            }
            Ok(())
        }
        EnrollmentOutcome::NoFaceDetected => Err("no face detected in the captured frame".into()),
    }
}

fn validate(settings: &Settings, command: &Command) -> Result<(), Box<dyn std::error::Error>> {
    if settings.endpoint.is_empty() {
        return Err("Service endpoint is required (--endpoint or settings file)".into());
    }
    if settings.subscription_key.is_empty() {
        return Err("Subscription key is required (--key or settings file)".into());
    }
    if settings.group_id.is_empty() {
        return Err("Identity group is required (--group or settings file)".into());
    }

    let inputs: Vec<&PathBuf> = match command {
        Command::Identify { frames, .. } => frames.iter().collect(),
        Command::Enroll { frame, .. } => vec![frame],
    };
    for input in inputs {
        if !input.exists() {
            return Err(format!("Input frame not found: {}", input.display()).into());
        }
    }
    Ok(())
}
