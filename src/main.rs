//! Ice plant attendance - shift classification and attendance statistics.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use iceplant_attendance as app;

use app::attendance::DateRange;
use app::auth::{Resource, Session, SessionStore, can_access, require_access};
use app::client::ApiClient;
use app::config::{AppConfig, ConfigLoadResult};
use app::models::{ClassifiedRecord, ShiftConfig};
use app::report::{EmployeeReport, ReportService};
use app::time::{BusinessClock, format_clock};

/// Attendance statistics for the ice plant admin portal.
#[derive(Parser)]
#[command(name = "iceplant-attendance")]
struct Cli {
    /// Use config.toml from current directory (dev mode)
    #[arg(long)]
    dev: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        username: String,
        /// Falls back to ICEPLANT_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user and what they can access
    Whoami,
    /// Show or change an employee's shift window
    #[command(subcommand)]
    Shift(ShiftCommand),
    /// Attendance statistics for one employee
    Report(ReportArgs),
    /// Config file management
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command reads the loaded config. `config init` must run
    /// even when the current file is broken, since it is how it gets replaced.
    fn needs_config(&self) -> bool {
        !matches!(self, Command::Config(ConfigCommand::Init { .. }) | Command::Logout)
    }
}

#[derive(Subcommand)]
enum ShiftCommand {
    Show {
        #[arg(long)]
        employee: i64,
    },
    Set {
        #[arg(long)]
        employee: i64,
        /// Shift start, HH:mm
        #[arg(long)]
        start: String,
        /// Shift end, HH:mm
        #[arg(long)]
        end: String,
        #[arg(long)]
        night: bool,
        #[arg(long, default_value_t = 1.0)]
        break_hours: f64,
    },
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    employee: i64,
    /// Start date (defaults to first of the month)
    #[arg(long)]
    from: Option<String>,
    /// End date (defaults to today)
    #[arg(long)]
    to: Option<String>,
    /// Also print one line per punch
    #[arg(long)]
    records: bool,
    /// Write an Excel workbook; a directory gets a generated file name
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Determine config path based on mode
    let config_path = if cli.dev {
        PathBuf::from("config.toml")
    } else {
        AppConfig::default_path()
    };

    let load_result = AppConfig::try_load(&config_path);
    let config = match &load_result {
        ConfigLoadResult::Loaded(config) => config.clone(),
        _ => AppConfig::default(),
    };

    // Initialize logging
    let _log_guard = app::logging::init(&config.logging);
    tracing::debug!("Config path: {:?}", config_path);

    match load_result {
        ConfigLoadResult::Loaded(_) => tracing::debug!("Config loaded successfully"),
        ConfigLoadResult::Missing => tracing::warn!("Config missing, using defaults"),
        ConfigLoadResult::Invalid(e) if cli.command.needs_config() => {
            bail!("Config invalid ({}): {e}", config_path.display())
        }
        ConfigLoadResult::Invalid(e) => tracing::warn!("Config invalid, ignoring: {e}"),
    }

    let store = SessionStore::new(SessionStore::default_path());

    match cli.command {
        Command::Config(ConfigCommand::Init { force }) => init_config(&config_path, force),
        Command::Login { username, password } => login(&config, &store, &username, password).await,
        Command::Logout => {
            if store.clear()? {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
            Ok(())
        }
        Command::Whoami => {
            let session = require_session(&store)?;
            print_whoami(&session);
            Ok(())
        }
        Command::Shift(cmd) => {
            let session = require_session(&store)?;
            run_shift(&config, &session, cmd).await
        }
        Command::Report(args) => {
            let session = require_session(&store)?;
            run_report(&config, &session, args).await
        }
    }
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    AppConfig::default()
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn require_session(store: &SessionStore) -> anyhow::Result<Session> {
    store
        .load()
        .context("reading stored session")?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `iceplant-attendance login` first."))
}

async fn login(
    config: &AppConfig,
    store: &SessionStore,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => std::env::var("ICEPLANT_PASSWORD").context("no --password given and ICEPLANT_PASSWORD not set")?,
    };

    let client = ApiClient::new(&config.api)?;
    let session = client.login(username, &password).await?;
    store.save(&session)?;

    tracing::info!("Session stored at {:?}", store.path());
    println!("Logged in as {}", session.user.username);
    Ok(())
}

fn print_whoami(session: &Session) {
    let user = &session.user;
    println!("{} (id {})", user.username, user.id);
    if user.is_superuser {
        println!("Superuser");
    }
    if !user.groups.is_empty() {
        println!("Groups: {}", user.groups.join(", "));
    }

    let allowed: Vec<&str> = Resource::ALL
        .iter()
        .filter(|r| can_access(user, **r))
        .map(|r| r.name())
        .collect();
    println!("Access: {}", allowed.join(", "));
}

async fn run_shift(config: &AppConfig, session: &Session, cmd: ShiftCommand) -> anyhow::Result<()> {
    require_access(session, Resource::EmployeeShift)?;
    let client = ApiClient::new(&config.api)?.with_session(session);

    match cmd {
        ShiftCommand::Show { employee } => {
            let shift = client.get_shift(employee).await?;
            println!("Employee {employee}: {}", shift.describe());
            println!("Break: {} h", shift.break_duration_hours);
        }
        ShiftCommand::Set {
            employee,
            start,
            end,
            night,
            break_hours,
        } => {
            let mut shift = ShiftConfig::from_strs(&start, &end, night)?;
            shift.break_duration_hours = break_hours;
            client.save_shift(employee, &shift).await?;
            println!("Employee {employee}: {}", shift.describe());
        }
    }
    Ok(())
}

async fn run_report(config: &AppConfig, session: &Session, args: ReportArgs) -> anyhow::Result<()> {
    require_access(session, Resource::Attendance)?;

    let today = Local::now().date_naive();
    let default_range = DateRange::month_to_date(today);
    let from = args.from.unwrap_or_else(|| default_range.start.to_string());
    let to = args.to.unwrap_or_else(|| default_range.end.to_string());
    let range = DateRange::parse(&from, &to)?;

    let clock = BusinessClock::new(config.business.offset()?);
    let client = ApiClient::new(&config.api)?.with_session(session);
    let report = ReportService::new(&client, clock)
        .employee_report(args.employee, range)
        .await?;

    print_report(&config.business.name, &report, args.records);

    if let Some(target) = args.export {
        let path = if target.is_dir() {
            target.join(app::export::generate_export_filename(&format!(
                "attendance_{}",
                report.employee_id
            )))
        } else {
            target
        };
        app::export::export_attendance_report(&report.records, &report.stats, &path)
            .with_context(|| format!("exporting to {}", path.display()))?;
        println!("Exported to {}", path.display());
    }

    Ok(())
}

fn print_report(business: &str, report: &EmployeeReport, with_records: bool) {
    println!("{business} - employee {}", report.employee_id);
    println!(
        "Period: {} to {} ({} days)",
        report.range.start,
        report.range.end,
        report.range.days()
    );
    println!("Shift: {}", report.shift.describe());
    println!();

    for (label, value) in report.stats.summary_rows() {
        println!("{label:<20} {value}");
    }

    if report.rejected > 0 {
        println!();
        println!("{} records skipped (unreadable check-in)", report.rejected);
    }

    if with_records {
        println!();
        for record in &report.records {
            println!("{}", record_line(record));
        }
    }
}

fn record_line(record: &ClassifiedRecord) -> String {
    let punch = &record.punch;
    let date = punch.check_in.format("%Y-%m-%d");
    if punch.is_no_show() {
        return format!("{date}  NO SHOW");
    }

    let mut flags = Vec::new();
    if record.is_late {
        flags.push("late");
    }
    if record.is_missing_checkout {
        flags.push("missing checkout");
    }

    format!(
        "{date}  {} - {:<8}  {:<20} {}",
        format_clock(Some(punch.check_in.time())),
        format_clock(punch.check_out.map(|t| t.time())),
        record.shift_type.label(),
        flags.join(", ")
    )
    .trim_end()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_init_runs_with_invalid_config() {
        let cli = Cli::parse_from(["iceplant-attendance", "--dev", "config", "init", "--force"]);
        assert!(!cli.command.needs_config());
    }

    #[test]
    fn test_api_commands_need_valid_config() {
        let report = Cli::parse_from(["iceplant-attendance", "report", "--employee", "3"]);
        assert!(report.command.needs_config());

        let login = Cli::parse_from(["iceplant-attendance", "login", "--username", "admin"]);
        assert!(login.command.needs_config());
    }

    #[test]
    fn test_init_config_overwrites_only_with_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"ftp://x\"\n").unwrap();

        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();
        assert!(matches!(AppConfig::try_load(&path), ConfigLoadResult::Loaded(_)));
    }

    fn punch(check_in: &str, check_out: Option<&str>, department: &str) -> app::models::AttendancePunch {
        let parse = |s: &str| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
        app::models::AttendancePunch {
            employee_id: 3,
            check_in: parse(check_in),
            check_out: check_out.map(parse),
            department: department.to_string(),
        }
    }

    #[test]
    fn test_record_line_placeholder_and_flags() {
        let record = app::attendance::classify_punch(
            &punch("2025-03-01 07:30", None, "Production"),
            &ShiftConfig::default(),
        );
        assert_eq!(
            record_line(&record),
            "2025-03-01  07:30 AM - -         Morning Shift        late, missing checkout"
        );
    }

    #[test]
    fn test_record_line_on_time_and_no_show() {
        let shift = ShiftConfig::default();
        let on_time = app::attendance::classify_punch(
            &punch("2025-03-02 06:10", Some("2025-03-02 18:05"), "Production"),
            &shift,
        );
        assert_eq!(
            record_line(&on_time),
            "2025-03-02  06:10 AM - 06:05 PM  Morning Shift"
        );

        let no_show = app::attendance::classify_punch(&punch("2025-03-03 00:00", None, "NO SHOW"), &shift);
        assert_eq!(record_line(&no_show), "2025-03-03  NO SHOW");
    }
}
