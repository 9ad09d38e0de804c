//! ncwin-demo - a toy scene drawn through ncwin
//!
//! Three windows share the terminal:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Str: 1     Dex: 1            │  stats (10 rows)
//! │ Spd: 1     Mag: 1            │
//! └──────────────────────────────┘
//! ┌──────────────────────────────┐
//! │######......................##│  world
//! │######..........@...........##│
//! └──────────────────────────────┘
//! ┌──────────────────────────────┐
//! │ Screen is 24x80  Player at   │  status bar (3 rows)
//! └──────────────────────────────┘
//! ```
//!
//! Arrow keys move the `@`, `q` quits.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ncwin::{Border, Color, Colors, Coord, InputMode, Key, Screen, ScreenConfig, Window};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

const STATS_HEIGHT: u16 = 10;
const BAR_HEIGHT: u16 = 3;

/// Smallest terminal the scene fits in
const MIN_ROWS: u16 = STATS_HEIGHT + BAR_HEIGHT + 3;
const MIN_COLS: u16 = 30;

/// Pair indices, in registration order
const STATS_PAIR: u16 = 1;
const WORLD_PAIR: u16 = 2;
const BAR_PAIR: u16 = 3;
const PLAYER_PAIR: u16 = 4;

struct Options {
    /// Force raw input instead of the configured mode
    raw: bool,
}

fn print_version() {
    eprintln!("ncwin-demo {}", VERSION);
}

fn print_help() {
    eprintln!("ncwin-demo {} - walk an @ around the terminal", VERSION);
    eprintln!();
    eprintln!("Usage: ncwin-demo [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -r, --raw             Raw input mode (Ctrl+C is a plain key)");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  Arrow keys            Move");
    eprintln!("  q                     Quit");
    eprintln!();
    eprintln!("Configuration: ~/.ncwin/config.toml");
    eprintln!("Log file:      ~/.ncwin/ncwin.log (level from RUST_LOG)");
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options { raw: false };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-r" | "--raw" => options.raw = true,
            arg => return Err(format!("Unknown argument: {}. Use -h for help.", arg)),
        }
    }
    Ok(options)
}

/// Send logs to a file; the terminal itself is being drawn on.
fn init_logging() {
    let log_path = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .map(|h| h.join(".ncwin").join("ncwin.log"))
        .unwrap_or_else(|| PathBuf::from("ncwin.log"));

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() {
    let options = match parse_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("ncwin-demo {} starting", VERSION);

    // The screen is gone by the time we get here, so the message lands on a
    // restored terminal
    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(options: Options) -> anyhow::Result<()> {
    let mut config = ScreenConfig::load();
    if options.raw {
        config.input_mode = InputMode::Raw;
    }
    let mut screen = Screen::from_config(&config).context("could not start terminal session")?;

    if !screen.has_key(Key::Up) {
        screen.print("No UP key :(")?;
        screen.refresh()?;
        screen.getch()?;
        return Ok(());
    }

    let mut game = Game::new(&mut screen)?;
    while game.step()? {}

    info!("quit with player at {}", game.player);
    drop(game);
    screen.end().context("could not restore terminal")?;
    Ok(())
}

/// The scene: three windows and the player position inside the world
struct Game {
    stats: Window,
    world: Window,
    bar: Window,
    player: Coord,
    screen_size: (u16, u16),
}

impl Game {
    fn new(screen: &mut Screen) -> anyhow::Result<Self> {
        let (rows, cols) = (screen.height(), screen.width());
        if rows < MIN_ROWS || cols < MIN_COLS {
            bail!("terminal is {}x{}, need at least {}x{}", rows, cols, MIN_ROWS, MIN_COLS);
        }

        let mut cs = Colors::new();
        cs.add_pair(Color::Red, Color::Black)?;
        cs.add_pair(Color::Blue, Color::Black)?;
        cs.add_pair(Color::Green, Color::Black)?;
        cs.add_pair(Color::Yellow, Color::Black)?;
        screen.set_colors(cs)?;

        let mut stats = Window::create(screen, STATS_HEIGHT, cols, 0, 0)?;
        stats.attrs().color(STATS_PAIR);
        stats.border(&Border::line())?;
        stats.print_at("Str: 1", 1, 5)?;
        stats.print_at("Dex: 1", 1, 16)?;
        stats.print_at("Spd: 1", 2, 5)?;
        stats.print_at("Mag: 1", 2, 16)?;

        let world_height = rows - STATS_HEIGHT - BAR_HEIGHT;
        let mut world = Window::create(screen, world_height, cols, STATS_HEIGHT, 0)?;
        world.keypad(true)?;
        world.attrs().color(WORLD_PAIR);
        world.border(&Border::line())?;
        world.fill('#')?;

        // A clearing in the middle of the rock
        let mid = Coord::new(world_height / 2, cols / 2);
        let half_h = (world_height.saturating_sub(2) / 2).min(15);
        let half_w = (cols.saturating_sub(2) / 2).min(30);
        for row in mid.row - half_h..mid.row + half_h {
            if row >= 1 && row < world_height - 1 {
                world.hline('.', Coord::new(row, mid.col - half_w), half_w * 2)?;
            }
        }

        let bar = Window::create(screen, BAR_HEIGHT, cols, rows - BAR_HEIGHT, 0)?;

        let mut game = Self {
            stats,
            world,
            bar,
            player: mid,
            screen_size: (rows, cols),
        };
        game.draw_player(mid)?;
        game.bar.attrs().color(BAR_PAIR);
        game.bar.border(&Border::line())?;
        game.draw_status()?;

        game.stats.refresh()?;
        game.world.refresh()?;
        game.bar.refresh()?;
        debug!("scene ready: {}x{}, player at {}", rows, cols, mid);
        Ok(game)
    }

    /// Read one key and react. Returns false once the player quits.
    fn step(&mut self) -> anyhow::Result<bool> {
        let key = self.world.getch()?;
        if key == Key::Char('q') {
            return Ok(false);
        }

        let last = self.player;
        match key {
            Key::Up => self.player.row = self.player.row.saturating_sub(1),
            Key::Down => self.player.row = self.player.row.saturating_add(1),
            Key::Left => self.player.col = self.player.col.saturating_sub(1),
            Key::Right => self.player.col = self.player.col.saturating_add(1),
            other => self.show_pressed(other)?,
        }
        self.clamp_player();

        self.world.attrs().color(WORLD_PAIR);
        self.world.addch_at('.', last)?;
        self.draw_player(self.player)?;
        self.world.refresh()?;

        self.draw_status()?;
        self.bar.refresh()?;
        Ok(true)
    }

    /// Keep the player off the world's border.
    fn clamp_player(&mut self) {
        let max_row = self.world.height().saturating_sub(2).max(1);
        let max_col = self.world.width().saturating_sub(2).max(1);
        self.player.row = self.player.row.clamp(1, max_row);
        self.player.col = self.player.col.clamp(1, max_col);
    }

    fn draw_player(&mut self, at: Coord) -> ncwin::Result<()> {
        self.world.attrs().color(PLAYER_PAIR);
        self.world.addch_at('@', at)
    }

    fn draw_status(&mut self) -> ncwin::Result<()> {
        let (rows, cols) = self.screen_size;
        let text = format!("Screen is {}x{}     Player at: {}", rows, cols, self.player);
        let room = usize::from(cols.saturating_sub(6));
        let text: String = text.chars().take(room).collect();
        self.bar.print_at(&text, 1, 4)
    }

    fn show_pressed(&mut self, key: Key) -> ncwin::Result<()> {
        let Key::Char(ch) = key else {
            return Ok(());
        };
        if ch.is_control() || self.screen_size.1 < 62 {
            return Ok(());
        }
        self.bar.print_at("Pressed: ", 1, 50)?;
        self.bar.addch(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncwin::backend::{Call, RecordingBackend};

    fn scene(keys: Vec<Key>) -> (Screen, Game, ncwin::backend::CallLog) {
        let backend = RecordingBackend::new().with_keys(keys);
        let log = backend.log();
        let mut screen = Screen::with_backend(backend, InputMode::Raw, true, false).unwrap();
        let game = Game::new(&mut screen).unwrap();
        (screen, game, log)
    }

    #[test]
    fn test_scene_layout() {
        let (_screen, game, log) = scene(vec![]);
        assert_eq!((game.world.height(), game.world.width()), (11, 80));
        assert_eq!(game.bar.beg(), Coord::new(21, 0));
        assert_eq!(game.player, Coord::new(5, 40));

        assert!(log.row_text(game.stats.id(), 1).unwrap().contains("Str: 1     Dex: 1"));
        assert!(log.row_text(game.world.id(), 5).unwrap().contains("@"));
        assert!(log
            .row_text(game.bar.id(), 1)
            .unwrap()
            .contains("Screen is 24x80     Player at: (5,40)"));
        assert_eq!(log.pair(PLAYER_PAIR), Some((Color::Yellow, Color::Black)));
    }

    #[test]
    fn test_arrows_move_player() {
        let (_screen, mut game, log) = scene(vec![Key::Up, Key::Left, Key::Char('q')]);
        assert!(game.step().unwrap());
        assert!(game.step().unwrap());
        assert_eq!(game.player, Coord::new(4, 39));
        assert_eq!(log.cell_attr(game.world.id(), 4, 39).map(|a| a.pair()), Some(PLAYER_PAIR));
        assert_eq!(log.cell_attr(game.world.id(), 5, 40).map(|a| a.pair()), Some(WORLD_PAIR));
        assert!(!game.step().unwrap());
    }

    #[test]
    fn test_player_stays_inside_world() {
        let (_screen, mut game, _log) = scene(vec![Key::Up; 20]);
        for _ in 0..20 {
            game.step().unwrap();
        }
        assert_eq!(game.player.row, 1);
    }

    #[test]
    fn test_other_keys_are_reported() {
        let (_screen, mut game, log) = scene(vec![Key::Char('x')]);
        game.step().unwrap();
        assert!(log.row_text(game.bar.id(), 1).unwrap().contains("Pressed: x"));
    }

    #[test]
    fn test_small_terminal_is_rejected() {
        let backend = RecordingBackend::new().with_size(10, 20);
        let log = backend.log();
        let mut screen = Screen::with_backend(backend, InputMode::Raw, true, false).unwrap();
        assert!(Game::new(&mut screen).is_err());
        assert!(!log.calls().iter().any(|c| matches!(c, Call::NewSurface { .. })));
    }
}
