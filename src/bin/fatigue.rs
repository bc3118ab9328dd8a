//! Fatigue CLI - Command-line interface for Fatigue Check
//!
//! Commands:
//! - assess: Score sleep history and shift timing (optionally recording it)
//! - validate: Check an input file without scoring it
//! - history / show: Read the audit trail
//! - guidelines: Print the action required at each level
//! - doctor: Diagnose configuration and audit log health

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use fatigue_check::audit::{AuditStore, JsonlAuditStore};
use fatigue_check::config::{CliOverrides, OutputFormat, Settings};
use fatigue_check::guidelines;
use fatigue_check::pipeline::{self, FatigueProcessor};
use fatigue_check::types::{AssessmentRecord, FatigueInput, FatigueResult};
use fatigue_check::validation::validate_value;
use fatigue_check::{ComputeError, ENGINE_VERSION, PRODUCER_NAME};

/// Environment variable holding the log filter
const LOG_ENV: &str = "FATIGUE_LOG";

/// Fatigue - Pre-shift fatigue risk check
#[derive(Parser)]
#[command(name = "fatigue")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score fatigue risk from sleep history and shift timing", long_about = None)]
struct Cli {
    /// Config file (defaults to ./fatigue.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an input and show the 24-hour projection
    Assess {
        /// JSON input file (use - for stdin); overrides the field flags
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Hours slept in the last 24 hours
        #[arg(long)]
        sleep_last_24: Option<f64>,

        /// Hours slept in the 24 hours before that
        #[arg(long)]
        sleep_previous_24: Option<f64>,

        /// Wake time (HH:MM)
        #[arg(long)]
        wake: Option<String>,

        /// Work start time (HH:MM)
        #[arg(long)]
        start: Option<String>,

        /// Output format
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Append the assessment to the audit log
        #[arg(long)]
        record: bool,

        /// Audit log path
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },

    /// Validate a JSON input without scoring it
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded assessments, newest first
    History {
        /// Number of rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Audit log path
        #[arg(long)]
        audit_log: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one recorded assessment
    Show {
        /// Assessment id
        id: String,

        /// Audit log path
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },

    /// Print the action required at each fatigue level
    Guidelines {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and audit log health
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Assessment input
    Input,
    /// Assessment result
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), FatigueCliError> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Assess {
            input,
            sleep_last_24,
            sleep_previous_24,
            wake,
            start,
            output_format,
            record,
            audit_log,
        } => {
            let settings = Settings::load(
                config,
                &CliOverrides {
                    audit_log,
                    output_format,
                    ..Default::default()
                },
            )?;
            let input = match input {
                Some(path) => pipeline::parse_input(&read_input(&path)?)?,
                None => input_from_flags(sleep_last_24, sleep_previous_24, wake, start)?,
            };
            cmd_assess(&settings, &input, record)
        }

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::History {
            limit,
            audit_log,
            json,
        } => {
            let settings = Settings::load(
                config,
                &CliOverrides {
                    audit_log,
                    history_limit: limit,
                    ..Default::default()
                },
            )?;
            cmd_history(&settings, json)
        }

        Commands::Show { id, audit_log } => {
            let settings = Settings::load(
                config,
                &CliOverrides {
                    audit_log,
                    ..Default::default()
                },
            )?;
            cmd_show(&settings, &id)
        }

        Commands::Guidelines { json } => cmd_guidelines(json),

        Commands::Doctor { json } => cmd_doctor(config, json),

        Commands::Schema { schema_type, json_schema } => cmd_schema(schema_type, json_schema),
    }
}

fn input_from_flags(
    sleep_last_24: Option<f64>,
    sleep_previous_24: Option<f64>,
    wake: Option<String>,
    start: Option<String>,
) -> Result<FatigueInput, FatigueCliError> {
    match (sleep_last_24, sleep_previous_24, wake, start) {
        (Some(last), Some(previous), Some(wake), Some(start)) => {
            let input = FatigueInput::parse(last, previous, &wake, &start)?;
            input.validate().map_err(ComputeError::from)?;
            Ok(input)
        }
        (last, previous, wake, start) => {
            let missing: Vec<&str> = [
                ("--sleep-last-24", last.is_none()),
                ("--sleep-previous-24", previous.is_none()),
                ("--wake", wake.is_none()),
                ("--start", start.is_none()),
            ]
            .into_iter()
            .filter_map(|(flag, absent)| absent.then_some(flag))
            .collect();
            Err(FatigueCliError::MissingInput(missing.join(", ")))
        }
    }
}

fn cmd_assess(settings: &Settings, input: &FatigueInput, record: bool) -> Result<(), FatigueCliError> {
    let (result, stored) = if record {
        let path = settings.audit_log.as_ref().ok_or(FatigueCliError::AuditDisabled)?;
        let mut processor = FatigueProcessor::new(JsonlAuditStore::new(path));
        let (result, stored) = processor.process(input)?;
        (result, Some(stored))
    } else {
        (pipeline::assess(input)?, None)
    };

    debug!(score = result.score, level = %result.level, "assessment complete");

    match settings.output_format {
        OutputFormat::Text => {
            print_assessment(&result);
            if let Some(stored) = stored {
                println!("\nRecorded as {}", stored.id);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&result)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&result)?),
    }

    Ok(())
}

fn print_assessment(result: &FatigueResult) {
    let guideline = guidelines::action_for(result.level);

    println!("Fatigue Assessment");
    println!("==================");
    println!("Score:            {} / 10", result.score);
    println!("Level:            {}", result.level);
    println!("Total sleep 48h:  {:.1} h", result.total_sleep_48);
    println!("Hours awake:      {:.1} h", result.hours_awake);
    println!("\nAction: {}", guideline.full_text());
    println!("\nProjection (next 24 hours):");
    for slot in &result.projections {
        println!("  {}  {:>2}  {}", slot.time, slot.score, slot.level);
    }
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), FatigueCliError> {
    let value: serde_json::Value = serde_json::from_str(&read_input(input)?)?;
    let errors = validate_value(&value);

    let report = ValidationReport {
        valid: errors.is_empty(),
        errors: errors.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Valid: {}", if report.valid { "yes" } else { "no" });

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {err}");
            }
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(FatigueCliError::ValidationFailed(report.errors.len()))
    }
}

fn cmd_history(settings: &Settings, json: bool) -> Result<(), FatigueCliError> {
    let store = audit_store(settings)?;
    let records = store.recent(settings.history_limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No recorded assessments in {}", store.path().display());
        return Ok(());
    }

    println!("{:<17}  {:<36}  {:>5}  {:<8}  {:<5}  {:<5}", "CREATED (UTC)", "ID", "SCORE", "LEVEL", "WAKE", "START");
    for record in &records {
        println!(
            "{:<17}  {:<36}  {:>5}  {:<8}  {:<5}  {:<5}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.id,
            record.score,
            record.level,
            record.wake_time,
            record.work_start_time
        );
    }

    Ok(())
}

fn cmd_show(settings: &Settings, id: &str) -> Result<(), FatigueCliError> {
    let id = uuid::Uuid::parse_str(id).map_err(|_| FatigueCliError::InvalidId(id.to_string()))?;
    let store = audit_store(settings)?;

    let record: AssessmentRecord = store
        .get(id)?
        .ok_or_else(|| FatigueCliError::NotFound(id.to_string()))?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn cmd_guidelines(json: bool) -> Result<(), FatigueCliError> {
    let all = guidelines::all();

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("Fatigue Level Actions");
    println!("=====================");
    for guideline in &all {
        println!("\n{}", guideline.level);
        println!("  {}", guideline.full_text());
    }

    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), FatigueCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Fatigue Check version {}", ENGINE_VERSION),
    });

    match Settings::load(config, &CliOverrides::default()) {
        Ok(settings) => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!("Configuration valid (history limit {})", settings.history_limit),
            });
            checks.push(check_audit_log(settings.audit_log.as_deref()));
        }
        Err(e) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        }),
    }

    checks.push(check_stdin(atty::is(atty::Stream::Stdin)));

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Fatigue Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(FatigueCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_audit_log(path: Option<&Path>) -> DoctorCheck {
    let name = "audit_log".to_string();

    let Some(path) = path else {
        return DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: "No audit log configured; assessments cannot be recorded".to_string(),
        };
    };

    if !path.exists() {
        return DoctorCheck {
            name,
            status: CheckStatus::Warning,
            message: format!("{} does not exist yet", path.display()),
        };
    }

    match JsonlAuditStore::new(path).load_all() {
        Ok(records) => DoctorCheck {
            name,
            status: CheckStatus::Ok,
            message: format!("{} readable ({} assessments)", path.display(), records.len()),
        },
        Err(e) => DoctorCheck {
            name,
            status: CheckStatus::Error,
            message: format!("Cannot read {}: {}", path.display(), e),
        },
    }
}

/// `--input -` blocks on an interactive terminal until EOF is typed
fn check_stdin(is_tty: bool) -> DoctorCheck {
    if is_tty {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Warning,
            message: "stdin is a TTY; --input - will wait for typed input until EOF".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), FatigueCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input: one pre-shift check");
                println!();
                println!("- sleepLast24: hours slept in the last 24 hours (0-24)");
                println!("- sleepPrevious24: hours slept in the 24 hours before that (0-24)");
                println!("- wakeTime: local wake time, H:MM or HH:MM (24-hour)");
                println!("- workStartTime: local shift start, H:MM or HH:MM (24-hour)");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output: fatigue assessment");
                println!();
                println!("- score: fatigue at work start (0-10)");
                println!("- level: Low (0-3), Moderate (4-6), High (7-8), Extreme (9-10)");
                println!("- totalSleep48: sleepLast24 + sleepPrevious24");
                println!("- hoursAwake: wake to work start, one decimal");
                println!("- projections: 24 hourly slots from work start");
                println!("  - time (HH:MM), score, level; scores never decrease");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, FatigueCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn audit_store(settings: &Settings) -> Result<JsonlAuditStore, FatigueCliError> {
    settings
        .audit_log
        .as_ref()
        .map(JsonlAuditStore::new)
        .ok_or(FatigueCliError::AuditDisabled)
}

fn get_input_json_schema() -> String {
    let clock = serde_json::json!({
        "type": "string",
        "pattern": "^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$"
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "fatigue.input",
        "type": "object",
        "required": ["sleepLast24", "sleepPrevious24", "wakeTime", "workStartTime"],
        "properties": {
            "sleepLast24": { "type": "number", "minimum": 0, "maximum": 24 },
            "sleepPrevious24": { "type": "number", "minimum": 0, "maximum": 24 },
            "wakeTime": clock,
            "workStartTime": clock
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let level = serde_json::json!({
        "type": "string",
        "enum": ["Low", "Moderate", "High", "Extreme"]
    });

    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "fatigue.result",
        "type": "object",
        "required": ["score", "level", "totalSleep48", "hoursAwake", "projections"],
        "properties": {
            "score": { "type": "integer", "minimum": 0, "maximum": 10 },
            "level": level,
            "totalSleep48": { "type": "number" },
            "hoursAwake": { "type": "number" },
            "projections": {
                "type": "array",
                "minItems": 24,
                "maxItems": 24,
                "items": {
                    "type": "object",
                    "required": ["time", "level", "score"],
                    "properties": {
                        "time": { "type": "string" },
                        "level": level,
                        "score": { "type": "integer", "minimum": 0, "maximum": 10 }
                    }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum FatigueCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    MissingInput(String),
    ValidationFailed(usize),
    AuditDisabled,
    InvalidId(String),
    NotFound(String),
    DoctorFailed,
}

impl From<io::Error> for FatigueCliError {
    fn from(e: io::Error) -> Self {
        FatigueCliError::Io(e)
    }
}

impl From<ComputeError> for FatigueCliError {
    fn from(e: ComputeError) -> Self {
        FatigueCliError::Compute(e)
    }
}

impl From<serde_json::Error> for FatigueCliError {
    fn from(e: serde_json::Error) -> Self {
        FatigueCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FatigueCliError> for CliError {
    fn from(e: FatigueCliError) -> Self {
        match e {
            FatigueCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FatigueCliError::Compute(ComputeError::Validation(e)) => CliError {
                code: "INVALID_INPUT".to_string(),
                message: e.to_string(),
                hint: Some("Run 'fatigue validate' for details".to_string()),
            },
            FatigueCliError::Compute(ComputeError::InvalidClockTime(value)) => CliError {
                code: "INVALID_INPUT".to_string(),
                message: format!("Invalid clock time: {value}"),
                hint: Some("Use 24-hour HH:MM, e.g. 06:30 or 22:00".to_string()),
            },
            FatigueCliError::Compute(ComputeError::Config(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check fatigue.toml and FATIGUE_* variables".to_string()),
            },
            FatigueCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FatigueCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FatigueCliError::MissingInput(flags) => CliError {
                code: "MISSING_INPUT".to_string(),
                message: format!("Missing required values: {flags}"),
                hint: Some("Pass all four field flags or --input <file>".to_string()),
            },
            FatigueCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} validation errors", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            FatigueCliError::AuditDisabled => CliError {
                code: "AUDIT_DISABLED".to_string(),
                message: "No audit log configured".to_string(),
                hint: Some("Pass --audit-log, set FATIGUE_AUDIT_LOG or audit_log in fatigue.toml".to_string()),
            },
            FatigueCliError::InvalidId(id) => CliError {
                code: "INVALID_ID".to_string(),
                message: format!("Not an assessment id: {id}"),
                hint: Some("Ids are UUIDs as listed by 'fatigue history'".to_string()),
            },
            FatigueCliError::NotFound(id) => CliError {
                code: "NOT_FOUND".to_string(),
                message: format!("No assessment with id {id}"),
                hint: Some("Run 'fatigue history' to list ids".to_string()),
            },
            FatigueCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Debug, PartialEq, serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
