use anyhow::{Context, Result};
use clap::Parser;
use labyrinth_core::{
    Action, Conditions, Direction, InventoryMatch, LoaderConfig, MapCell, MapLoader, Outcome,
    PlayerState, RulesConfig, Session, TileCatalog,
};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::{Path, PathBuf},
    time::Duration,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Name of the map to play, without extension
    #[arg(short, long, default_value = "example_map")]
    map: String,

    /// Player name
    #[arg(short, long, default_value = "MacGyver")]
    player: String,

    /// Extra directory to search for maps, before the configured ones
    #[arg(long = "maps-dir", value_name = "DIR")]
    maps_dirs: Vec<PathBuf>,

    /// JSON condition document to win the game
    #[arg(short, long, value_name = "FILE")]
    conditions: Option<PathBuf>,

    /// Seed for random item placement
    #[arg(long)]
    seed: Option<u64>,

    /// Accept collecting more items than the conditions ask for
    #[arg(long)]
    at_least: bool,

    /// Directory for the log file
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

struct App {
    /// The game session being played.
    session: Session,
    /// Last event worth telling the player about.
    message: String,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(session: Session) -> Self {
        App {
            session,
            message: String::from("Find the exit."),
            should_quit: false,
        }
    }

    /// Handles one key press.
    fn on_key(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Char('q') | KeyCode::Esc) {
            self.quit();
            return;
        }
        if self.session.is_finished() {
            return;
        }

        let outcome = self.session.apply(action_for(code));
        if let Some(item) = outcome.picked_up {
            self.message = format!("Picked up {item}.");
        }
        match self.session.outcome() {
            Outcome::Won => self.message = String::from("You escaped! Press 'q' to leave."),
            Outcome::Lost => {
                self.message = String::from("The exit is guarded and you are unprepared. Press 'q'.")
            }
            Outcome::InProgress | Outcome::Quit => {}
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        if !self.session.is_finished() {
            self.session.quit();
        }
        self.should_quit = true;
    }
}

/// Maps a key to a player action; anything unrecognized waits.
fn action_for(code: KeyCode) -> Action {
    let direction = match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(Direction::Right),
        _ => None,
    };
    Action::from(direction)
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    let _log_guard = setup_logging(args.log_dir.clone())?;

    let mut loader_config = LoaderConfig::from_env();
    for dir in args.maps_dirs.iter().rev() {
        loader_config.prepend_root(dir);
    }
    let mut rules = RulesConfig::from_env();
    if args.seed.is_some() {
        rules.seed = args.seed;
    }
    if args.at_least {
        rules.inventory_match = InventoryMatch::AtLeast;
    }

    let conditions =
        load_conditions(args.conditions.as_deref())?.with_inventory_match(rules.inventory_match);
    let mut rng = match rules.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // Build the session before touching the terminal so errors print normally
    let loader = MapLoader::new(loader_config, TileCatalog::default());
    let mut session = Session::create(&loader, &args.map, conditions, &args.player, &mut rng)
        .with_context(|| format!("Failed to create a session for map '{}'", args.map))?;
    session
        .begin()
        .with_context(|| format!("Map '{}' cannot be played", args.map))?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;
    let mut app = App::new(session);

    // Run the main application loop, restoring the terminal even on error
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result?;

    println!("{}", summary(&app.session));
    Ok(())
}

fn load_conditions(path: Option<&Path>) -> Result<Conditions> {
    let Some(path) = path else {
        return Ok(Conditions::new());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read conditions {}", path.display()))?;
    Conditions::from_json(&json)
        .with_context(|| format!("Failed to parse conditions {}", path.display()))
}

/// Logs to a file; the terminal belongs to the UI.
fn setup_logging(log_dir: Option<PathBuf>) -> Result<WorkerGuard> {
    let log_dir = log_dir.unwrap_or_else(|| std::env::temp_dir().join("labyrinth"));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "labyrinth.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    tracing::info!("Log file: {}/labyrinth.log", log_dir.display());
    Ok(guard)
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let poll_rate = Duration::from_millis(250);

    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }
    }
    Ok(())
}

fn summary(session: &Session) -> String {
    match session.outcome() {
        Outcome::Won => format!("{} escaped from {}.", session.player().name, session.name()),
        Outcome::Lost => format!("{} was caught by the guard.", session.player().name),
        Outcome::Quit | Outcome::InProgress => format!("{} gave up.", session.player().name),
    }
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Percentage(65), // Area for the map
            Constraint::Percentage(20), // Area for inventory
            Constraint::Percentage(15), // Area for status/help
        ])
        .split(frame.area());

    render_map(frame, main_layout[0], &app.session);
    render_inventory(frame, main_layout[1], app.session.player());

    let mut status = vec![Line::from(app.message.as_str())];
    let goals = app.session.conditions().to_string();
    if !goals.is_empty() {
        status.push(Line::from(format!("Goal: {goals}")).style(Style::default().fg(Color::Cyan)));
    }
    status.push(Line::from("Arrows/hjkl/wasd to move, 'q' or 'Esc' to quit."));
    let help_text = Paragraph::new(status)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders the player's inventory.
fn render_inventory(frame: &mut Frame, area: Rect, player: &PlayerState) {
    let inventory_items: Vec<ListItem> = player
        .inventory
        .iter()
        .map(|(name, count)| {
            let style = if *count > 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::from(Line::from(Span::styled(format!("{name}: {count}"), style)))
        })
        .collect();

    let title = format!("{}'s inventory", player.name);
    let inventory_widget =
        List::new(inventory_items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(inventory_widget, area);
}

/// Renders the labyrinth with the player on top.
fn render_map(frame: &mut Frame, area: Rect, session: &Session) {
    let rows: Vec<Vec<Span>> = session
        .cells()
        .into_iter()
        .map(|row| row.into_iter().map(cell_span).collect())
        .collect();

    let lines: Vec<Line> = rows.into_iter().map(Line::from).collect();
    let map_paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(session.name().to_string())
                .borders(Borders::ALL),
        )
        .alignment(Alignment::Center);

    frame.render_widget(map_paragraph, area);
}

fn cell_span(cell: MapCell<'_>) -> Span<'static> {
    let style = match cell {
        MapCell::Player(_) => Style::default().fg(Color::Red).bold(),
        MapCell::Tile(tile) if !tile.is_walkable() => Style::default().fg(Color::DarkGray),
        MapCell::Tile(tile) if tile.is_pickable() => Style::default().fg(Color::Yellow),
        MapCell::Tile(tile) if tile.is_exit() => Style::default().fg(Color::Green),
        MapCell::Tile(_) => Style::default(),
    };
    Span::styled(cell.symbol().to_string(), style)
}
