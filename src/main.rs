// NexusHealth - main.rs
//
// Command-line host for the shell state layer. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Choosing the auth API (HTTP or offline demo) and appearance probe
// 4. Running one command against the persisted client state

use clap::{Parser, Subcommand};
use nexushealth::app::navigation::NavOutcome;
use nexushealth::app::state::{self, AppState, ShellEvent};
use nexushealth::core::access;
use nexushealth::core::catalog;
use nexushealth::core::model::{MenuGroup, Role, SectionId, ThemePreference};
use nexushealth::platform::api::{AuthApi, Credentials, DemoAuthApi, HttpAuthApi, Registration};
use nexushealth::platform::appearance::{AppearanceProbe, EnvProbe, FixedProbe};
use nexushealth::platform::config::{self, PlatformPaths};
use nexushealth::util;
use nexushealth::util::error::{AuthError, ShellError};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// NexusHealth - session, access and theme state for the hospital dashboard.
///
/// Each invocation loads the persisted client state, runs one command and
/// saves any changes.
#[derive(Parser, Debug)]
#[command(name = "NexusHealth", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Directory for client storage (theme, token, login history).
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    /// Use the offline demo accounts instead of the HTTP API.
    #[arg(long = "demo", global = true)]
    demo: bool,

    /// Override the OS colour-scheme signal (true = dark).
    #[arg(long = "prefers-dark", value_name = "BOOL", global = true)]
    prefers_dark: Option<bool>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with email and password.
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from stdin when omitted.
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and sign in as it.
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long, default_value = "Doctor")]
        role: Role,
    },
    /// Sign out and close the current login record.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// List login history.
    Sessions {
        /// Include records that have already logged out.
        #[arg(short, long)]
        all: bool,
    },
    /// Show the navigation menu for the signed-in user or a given role.
    Menu {
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// List every role and how many sections it can see.
    Roles,
    /// Show or change the theme.
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Navigate to a section and report what would be shown.
    Open { section: String },
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    /// Print preference, OS signal and resolved theme.
    Show,
    /// Set the preference: light, dark or system.
    Set { mode: ThemePreference },
    /// Advance light -> dark -> system.
    Cycle,
    /// Follow the OS colour scheme and print each change.
    Watch {
        #[arg(short, long, default_value_t = 30)]
        seconds: u64,
    },
}

/// Upper bound on waiting for the background session restore.
const RESTORE_WAIT: Duration = Duration::from_secs(30);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = PlatformPaths::resolve();
    let (app_config, config_warnings) = config::load_config(&paths.config_dir);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "NexusHealth starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let api: Arc<dyn AuthApi> = if cli.demo || app_config.demo_mode {
        tracing::info!("Using offline demo accounts");
        Arc::new(DemoAuthApi::new())
    } else {
        match HttpAuthApi::new(
            &app_config.api_base_url,
            Duration::from_secs(app_config.api_timeout_secs),
        ) {
            Ok(api) => Arc::new(api),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build API client");
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let probe: Arc<dyn AppearanceProbe> = match cli.prefers_dark {
        Some(flag) => Arc::new(FixedProbe(Some(flag))),
        None => Arc::new(EnvProbe),
    };

    let data_dir = cli.data_dir.clone().unwrap_or(paths.data_dir);
    let store = state::open_store(&data_dir);
    let mut shell = AppState::new(store, api, probe, app_config);

    let result = run(&mut shell, cli.command);
    shell.dispose();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(shell: &mut AppState, command: Command) -> Result<(), ShellError> {
    match command {
        Command::Login { email, password } => {
            let password = password_or_stdin(password)?;
            let identity = shell.login(&Credentials { email, password })?;
            println!("Signed in as {} ({})", identity.name, identity.role);
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let password = password_or_stdin(password)?;
            let identity = shell.register(&Registration {
                name,
                email,
                password,
                role,
            })?;
            println!("Registered and signed in as {} ({})", identity.name, identity.role);
        }
        Command::Logout => match shell.logout() {
            Some(record) => println!("Signed out (closed session {record})"),
            None => println!("Signed out"),
        },
        Command::Whoami => {
            restore(shell);
            match shell.session().current_identity() {
                Some(identity) => {
                    println!("{} <{}>", identity.name, identity.email.as_deref().unwrap_or("-"));
                    println!("Role: {}", identity.role);
                }
                None => println!("Not signed in"),
            }
        }
        Command::Sessions { all } => {
            let records: Vec<_> = if all {
                shell.session().history().iter().collect()
            } else {
                shell.session().active_sessions()
            };
            if records.is_empty() {
                println!("No sessions");
            }
            for r in records {
                let logout = r
                    .logout_timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<24} {:<18} {}  {:<10} {}  {}  {}",
                    r.id,
                    r.user_name,
                    r.user_role.label(),
                    r.login_timestamp.format("%Y-%m-%d %H:%M:%S"),
                    r.status.label(),
                    logout,
                    r.device_label.as_deref().unwrap_or("-"),
                    r.network_address.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Menu { role } => {
            let role = match role {
                Some(role) => Some(role),
                None => {
                    restore(shell);
                    shell.navigation().role().cloned()
                }
            };
            match role {
                Some(role) => print_menu(&shell.navigation().visible_menu(&role)),
                None => println!("Not signed in; pass --role to preview a menu"),
            }
        }
        Command::Roles => {
            let total: usize = catalog::master_catalog().iter().map(|g| g.items.len()).sum();
            for role in Role::all() {
                let visible: usize = catalog::visible_menu(role)
                    .iter()
                    .map(|g| g.items.len())
                    .sum();
                let scope = if access::sections_for(role).is_all() {
                    "all".to_string()
                } else {
                    format!("{visible}/{total}")
                };
                println!("{:<18} {scope}", role.label());
            }
        }
        Command::Theme { action } => run_theme(shell, action.unwrap_or(ThemeAction::Show)),
        Command::Open { section } => {
            restore(shell);
            match shell.set_active_tab(SectionId::new(section)) {
                NavOutcome::RedirectToLogin => println!("Not signed in; showing login"),
                NavOutcome::Unchanged | NavOutcome::Switched { .. } => {
                    let requested = shell.navigation().active_tab().cloned();
                    let shown = shell.navigation().content_tab();
                    match (requested, shown) {
                        (Some(req), Some(shown)) if req == shown => {
                            println!("Showing {}", describe_section(&shown))
                        }
                        (Some(req), Some(shown)) => println!(
                            "'{req}' is not in your menu; showing {}",
                            describe_section(&shown)
                        ),
                        _ => println!("Nothing to show"),
                    }
                }
            }
        }
    }
    Ok(())
}

fn run_theme(shell: &mut AppState, action: ThemeAction) {
    match action {
        ThemeAction::Show => {}
        ThemeAction::Set { mode } => shell.theme_mut().set_preference(mode),
        ThemeAction::Cycle => {
            shell.theme_mut().cycle_preference();
        }
        ThemeAction::Watch { seconds } => {
            print_theme(shell);
            shell.start_appearance_watch();
            let deadline = Instant::now() + Duration::from_secs(seconds);
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                if let Some(ShellEvent::OsSignalChanged { signal, theme }) =
                    shell.wait_os_signal(remaining)
                {
                    println!("OS signal: {signal} -> resolved {}", theme.resolved);
                }
            }
            return;
        }
    }
    print_theme(shell);
}

fn print_theme(shell: &AppState) {
    let theme = shell.theme();
    println!("Preference: {}", theme.preference());
    println!("OS signal:  {}", theme.os_signal());
    println!(
        "Resolved:   {} (chrome {})",
        theme.resolved(),
        theme.resolved().chrome_colour()
    );
}

fn print_menu(groups: &[MenuGroup]) {
    if groups.is_empty() {
        println!("(no sections)");
    }
    for group in groups {
        println!("{}", group.title);
        for item in &group.items {
            println!("  {:<16} {}", item.id.as_str(), item.label);
        }
    }
}

/// Catalog label plus id, or the bare id for sections outside the catalog.
fn describe_section(id: &SectionId) -> String {
    match catalog::find_item(id) {
        Some(item) => format!("{} ({id})", item.label),
        None => id.to_string(),
    }
}

/// Run the background restore to completion so the command sees the
/// signed-in user, if any.
fn restore(shell: &mut AppState) {
    if !shell.start_restore() {
        return;
    }
    match shell.wait_restore(RESTORE_WAIT) {
        Some(ShellEvent::SessionRestoreFailed(e)) => {
            eprintln!("Stored session is no longer valid: {e}");
        }
        Some(_) => {}
        None => tracing::warn!("Session restore did not finish in time"),
    }
}

fn password_or_stdin(password: Option<String>) -> Result<String, ShellError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|source| AuthError::InvalidCredentials {
            reason: format!("cannot read password: {source}"),
        })?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_section_uses_catalog_label() {
        assert_eq!(describe_section(&SectionId::from("beds")), "Bed Management (beds)");
        assert_eq!(describe_section(&SectionId::from("vitals")), "vitals");
    }

    #[test]
    fn test_cli_parses_open_and_menu_role() {
        let cli = Cli::try_parse_from(["nexushealth", "open", "beds"]).unwrap();
        assert!(matches!(cli.command, Command::Open { section } if section == "beds"));
        let cli = Cli::try_parse_from(["nexushealth", "menu", "--role", "Lab Technician"]).unwrap();
        assert!(matches!(cli.command, Command::Menu { role: Some(Role::LabTechnician) }));
        assert!(Cli::try_parse_from(["nexushealth", "menu", "--role", "Staff"]).is_err());
    }
}
