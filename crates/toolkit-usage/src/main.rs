use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    DefaultTerminal, Frame,
};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::interval;
use toolkit_usage_ledger::prelude::*;
use toolkit_usage_ledger::{LedgerConfig, ToolDescriptor, UsageStore};

mod tools;
mod widgets;
use widgets::*;

#[derive(Debug, Clone, PartialEq)]
pub enum PopupType {
    ToolDetails,
    Account,
}

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Log gate decisions and store access to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Data directory (defaults to $TOOLKIT_USAGE_DIR, then ~/.toolkit-usage)
    #[arg(short = 'd', long = "data-dir")]
    data_dir: Option<String>,

    /// Sign in as this user; without it the session is anonymous and not saved
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// Display name used when the user's profile is first created
    #[arg(long = "name")]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show today's usage and remaining quota per tool
    Status {
        #[arg(long = "json")]
        json: bool,
    },
    /// List tools and which variants the current plan unlocks
    Tools,
    /// Run a tool through the usage gate
    Run {
        tool: String,
        #[arg(long = "variant")]
        variant: Option<String>,
        /// Input text; read from stdin when omitted
        input: Option<String>,
    },
    /// Switch the signed-in user to Pro
    Upgrade,
    /// Switch the signed-in user back to Free
    Downgrade,
    /// Live quota dashboard
    Dashboard,
}

#[derive(Serialize, Debug)]
struct StatusReport {
    user: String,
    signed_in: bool,
    tier: Tier,
    day: String,
    resets_in_minutes: i64,
    month_total_uses: u64,
    month_distinct_tools: usize,
    tools: Vec<ToolStatus>,
}

#[derive(Serialize, Debug)]
struct ToolStatus {
    id: String,
    used: u32,
    limit: u32,
    /// `None` means unlimited
    remaining: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ToolRow {
    pub id: String,
    pub name: String,
    pub used: u32,
    pub limit: u32,
    pub remaining: Remaining,
}

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_filter = match (verbose, log_file.is_some()) {
        (true, _) => "toolkit_usage=debug,toolkit_usage_ledger=debug",
        (false, true) => "toolkit_usage=info,toolkit_usage_ledger=info",
        (false, false) => "toolkit_usage=warn,toolkit_usage_ledger=warn",
    };
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    if let Some(path) = log_file {
        // the dashboard owns the terminal, so its logs go to a file
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn open_session(args: &Args, data_dir: &Path, config: &LedgerConfig) -> Result<Session> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match &args.user {
        Some(user_id) => Session::sign_in(
            config.catalog(),
            clock,
            UsageStore::new(data_dir),
            user_id,
            args.name.as_deref(),
            config.default_tier,
        ),
        None => Ok(Session::anonymous(config.catalog(), clock)),
    }
}

fn tool_rows(session: &Session) -> Vec<ToolRow> {
    session
        .catalog()
        .tools()
        .into_iter()
        .map(|tool| ToolRow {
            id: tool.id().to_string(),
            name: tool.name().to_string(),
            used: session.usage_today(tool.id()),
            limit: tool.daily_limit(),
            remaining: session.get_remaining_usage(tool.id(), tool.daily_limit()),
        })
        .collect()
}

fn status_report(session: &Session) -> StatusReport {
    let monthly = session.usage_this_month();
    StatusReport {
        user: session.name().to_string(),
        signed_in: session.is_signed_in(),
        tier: session.tier(),
        day: session.today().to_string(),
        resets_in_minutes: session.time_until_reset().num_minutes(),
        month_total_uses: monthly.total_uses(),
        month_distinct_tools: monthly.distinct_tools(),
        tools: tool_rows(session)
            .into_iter()
            .map(|row| ToolStatus {
                id: row.id,
                used: row.used,
                limit: row.limit,
                remaining: row.remaining.finite(),
            })
            .collect(),
    }
}

fn print_status(session: &Session, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&status_report(session))?);
        return Ok(());
    }

    if session.is_signed_in() {
        println!("Signed in as {} ({})", session.name(), session.tier().description());
    } else {
        println!("Guest ({}) - usage is not saved", session.tier().description());
    }
    println!();
    println!("{:<18} {:>6} {:>6} {:>10}", "TOOL", "USED", "LIMIT", "REMAINING");
    for row in tool_rows(session) {
        println!(
            "{:<18} {:>6} {:>6} {:>10}",
            row.id, row.used, row.limit, row.remaining
        );
    }

    let monthly = session.usage_this_month();
    let reset = session.time_until_reset();
    println!();
    println!(
        "This month: {} uses across {} tools",
        monthly.total_uses(),
        monthly.distinct_tools()
    );
    println!(
        "Daily limits reset in {}h {}m (UTC midnight)",
        reset.num_hours(),
        reset.num_minutes() % 60
    );
    Ok(())
}

fn print_tools(session: &Session) {
    for tool in session.catalog().tools() {
        println!("{} ({}) - {} free uses per day", tool.name(), tool.id(), tool.daily_limit());
        if let Some(variants) = session.variants(tool.id()) {
            for (variant, unlocked) in variants {
                let marker = if unlocked { "" } else { "  [Pro]" };
                println!("  - {}{}", variant.id(), marker);
            }
        }
    }
}

fn read_input(input: Option<String>) -> Result<String> {
    match input {
        Some(input) => Ok(input),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read input from stdin")?;
            Ok(buffer.trim_end_matches('\n').to_string())
        }
    }
}

fn run_tool(
    session: &mut Session,
    tool_id: &str,
    variant: Option<&str>,
    input: Option<String>,
) -> Result<()> {
    let input = read_input(input)?;

    match session.run_tool(tool_id, variant, |variant| tools::run(tool_id, variant, &input)) {
        Ok(output) => {
            println!("{}", output);
            if let Some(limit) = session.catalog().daily_limit(tool_id) {
                eprintln!(
                    "{} uses left today",
                    session.get_remaining_usage(tool_id, limit)
                );
            }
            Ok(())
        }
        Err(e) if e.wants_upgrade() => {
            eprintln!("{}", e);
            eprintln!("Upgrade to Pro for unlimited use and every variant: toolkit-usage -u <user> upgrade");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

pub struct AppState {
    pub session: Session,
    pub last_update: DateTime<Utc>,
    pub is_loading: bool,
    pub spinner_state: usize,
    pub error_message: Option<String>,
    pub active_popup: Option<PopupType>,
    pub selected: usize,
}

impl AppState {
    fn new(session: Session) -> Self {
        Self {
            session,
            last_update: Utc::now(),
            is_loading: false,
            spinner_state: 0,
            error_message: None,
            active_popup: None,
            selected: 0,
        }
    }

    fn refresh(&mut self) {
        self.is_loading = true;

        match self.session.refresh() {
            Ok(()) => self.error_message = None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to reload usage");
                self.error_message = Some(e.to_string());
            }
        }

        self.is_loading = false;
        self.last_update = Utc::now();
    }

    fn update_spinner(&mut self) {
        self.spinner_state = (self.spinner_state + 1) % 10;
    }

    pub fn get_spinner_char(&self) -> char {
        match self.spinner_state {
            0 => '⠋',
            1 => '⠙',
            2 => '⠹',
            3 => '⠸',
            4 => '⠼',
            5 => '⠴',
            6 => '⠦',
            7 => '⠧',
            8 => '⠇',
            9 => '⠏',
            _ => '⠋',
        }
    }

    pub fn tool_rows(&self) -> Vec<ToolRow> {
        tool_rows(&self.session)
    }

    pub fn selected_tool(&self) -> Option<&ToolDescriptor> {
        self.session.catalog().tools().get(self.selected).copied()
    }

    fn select_next(&mut self) {
        let count = self.session.catalog().len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    fn select_previous(&mut self) {
        let count = self.session.catalog().len();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    /// Share of the selected tool's free limit used today; 0 on Pro.
    pub fn get_usage_percentage(&self) -> f64 {
        match self.selected_tool() {
            Some(tool) if !self.session.tier().is_unlimited() && tool.daily_limit() > 0 => {
                self.session.usage_today(tool.id()) as f64 / tool.daily_limit() as f64 * 100.0
            }
            _ => 0.0,
        }
    }

    /// Time left until UTC midnight and the fraction of the day remaining.
    pub fn get_time_to_reset_formatted(&self) -> (String, f64) {
        let remaining = self.session.time_until_reset();
        let total_seconds = remaining.num_seconds().max(0);
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let remaining_fraction = total_seconds as f64 / chrono::Duration::days(1).num_seconds() as f64;

        (format!("{}:{:02}", hours, minutes), remaining_fraction.min(1.0))
    }
}

pub struct App {
    state: Arc<Mutex<AppState>>,
    exit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::new(session))),
            exit: false,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let state_clone = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(5));
            loop {
                interval.tick().await;

                if let Ok(mut state) = state_clone.lock() {
                    // Reload usage every 5 seconds to pick up other sessions
                    state.refresh();
                }
            }
        });

        let mut tick_interval = interval(Duration::from_millis(100));

        loop {
            tick_interval.tick().await;

            if let Ok(mut state) = self.state.lock() {
                state.update_spinner();
            }

            terminal.draw(|frame| self.draw(frame))?;

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event);
            }

            if self.exit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        if let Ok(state) = self.state.lock() {
            HeaderWidget::render(frame, chunks[0], &state);
            ProgressBarsWidget::render(frame, chunks[1], &state);
            StatisticsWidget::render(frame, chunks[2], &state);
            ToolListWidget::render(frame, chunks[3], &state);
            ShortcutsWidget::render(frame, chunks[4], &state);

            match &state.active_popup {
                Some(PopupType::ToolDetails) => {
                    ToolDetailsPopupWidget::render(frame, area, &state);
                }
                Some(PopupType::Account) => {
                    AccountPopupWidget::render(frame, area, &state);
                }
                None => {}
            }
        }
    }

    fn toggle_popup(&self, popup: PopupType) {
        if let Ok(mut state) = self.state.lock() {
            state.active_popup = if state.active_popup.as_ref() == Some(&popup) {
                None
            } else {
                Some(popup)
            };
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key_event) = event {
            if key_event.kind != KeyEventKind::Press {
                return;
            }
            match key_event.code {
                KeyCode::Char('q') => self.exit = true,
                KeyCode::Char('r') => {
                    if let Ok(mut state) = self.state.lock() {
                        state.refresh();
                    }
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if let Ok(mut state) = self.state.lock() {
                        state.select_next();
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    if let Ok(mut state) = self.state.lock() {
                        state.select_previous();
                    }
                }
                KeyCode::Char('d') | KeyCode::Enter => self.toggle_popup(PopupType::ToolDetails),
                KeyCode::Char('s') => self.toggle_popup(PopupType::Account),
                KeyCode::Esc => {
                    if let Ok(mut state) = self.state.lock() {
                        state.active_popup = None;
                    }
                }
                _ => {}
            }
        }
    }
}

fn change_tier(session: &mut Session, tier: Tier) -> Result<()> {
    if !session.is_signed_in() {
        bail!("Changing plans needs a signed-in user (--user <id>)");
    }
    session.set_tier(tier)?;
    println!("{} is now on {}", session.name(), session.tier().description());
    Ok(())
}

fn dashboard_log_path(data_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;
    Ok(data_dir.join("dashboard.log"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = LedgerConfig::resolve_data_dir(args.data_dir.as_deref());

    if matches!(args.command, Command::Dashboard) {
        init_tracing(args.verbose, Some(&dashboard_log_path(&data_dir)?))?;
    } else {
        init_tracing(args.verbose, None)?;
    }

    let config = LedgerConfig::load(&data_dir)?;
    let mut session = open_session(&args, &data_dir, &config)?;

    match args.command {
        Command::Status { json } => print_status(&session, json),
        Command::Tools => {
            print_tools(&session);
            Ok(())
        }
        Command::Run {
            tool,
            variant,
            input,
        } => run_tool(&mut session, &tool, variant.as_deref(), input),
        Command::Upgrade => change_tier(&mut session, Tier::Pro),
        Command::Downgrade => change_tier(&mut session, Tier::Free),
        Command::Dashboard => {
            let mut terminal = ratatui::init();
            let mut app = App::new(session);

            let result = app.run(&mut terminal).await;

            ratatui::restore();

            result
        }
    }
}
