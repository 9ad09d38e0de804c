//! End-to-end session tests against the recording backend

use ncwin::backend::{Call, RecordingBackend};
use ncwin::{
    AttrRestorer, Border, Color, Colors, Coord, Error, InputMode, Key, Rect, Screen, ScreenConfig, Window,
    MAX_PAIRS,
};

fn is_drawing(call: &Call) -> bool {
    !matches!(call, Call::AttrSet(..) | Call::Keypad { .. } | Call::Echo(_) | Call::StartColor)
}

#[test]
fn stats_window_call_sequence() {
    let backend = RecordingBackend::new();
    let log = backend.log();
    {
        let screen = Screen::with_backend(backend, InputMode::Raw, true, false).unwrap();
        let mut stats = Window::create(&screen, 10, 40, 0, 0).unwrap();
        stats.border(&Border::line()).unwrap();
        stats.print_at("Str: 1", 1, 5).unwrap();
        stats.refresh().unwrap();

        let id = stats.id();
        let calls: Vec<Call> = log.calls().into_iter().filter(is_drawing).collect();
        assert_eq!(
            calls,
            vec![
                Call::Init,
                Call::Raw(true),
                Call::NewSurface { height: 10, width: 40, row: 0, col: 0 },
                Call::Border { surface: id, glyphs: Border::line().glyphs() },
                Call::MvAddStr { surface: id, row: 1, col: 5, text: "Str: 1".to_string() },
                Call::Refresh(id),
            ]
        );
    }

    // Window released before the session ends
    let calls = log.calls();
    let n = calls.len();
    assert!(matches!(calls[n - 2], Call::DelSurface(_)));
    assert_eq!(calls[n - 1], Call::End);
    assert_eq!(log.live_surfaces(), 1);
}

#[test]
fn ninth_color_pair_is_rejected() {
    let mut cs = Colors::new();
    for (i, fg) in Color::ALL.iter().enumerate() {
        assert_eq!(cs.add_pair(*fg, Color::Black).unwrap(), i as u16 + 1);
    }
    assert_eq!(cs.len(), MAX_PAIRS);
    assert!(matches!(cs.add_pair(Color::White, Color::Blue), Err(Error::Assertion(_))));

    assert_eq!(cs.len(), MAX_PAIRS);
    for (i, fg) in Color::ALL.iter().enumerate() {
        let pair = cs.get(i + 1).unwrap();
        assert_eq!((pair.fg, pair.bg), (*fg, Color::Black));
    }
}

#[test]
fn config_drives_session_setup() {
    let config = ScreenConfig::parse(
        r#"
        input_mode = "line"
        echo = true

        [[colors]]
        fg = "magenta"
        bg = "white"
        "#,
    )
    .unwrap();
    let backend = RecordingBackend::new();
    let log = backend.log();
    let screen = Screen::from_config_with_backend(backend, &config).unwrap();

    let calls = log.calls();
    assert!(calls.contains(&Call::Raw(false)));
    assert!(calls.contains(&Call::Cbreak(false)));
    assert!(calls.contains(&Call::Echo(true)));
    assert_eq!(log.pair(1), Some((Color::Magenta, Color::White)));
    assert_eq!(screen.colors().len(), 1);
}

#[test]
fn oversized_palette_never_starts_a_session() {
    let config = ScreenConfig {
        colors: vec![ncwin::config::PairConfig { fg: Color::Red, bg: Color::Black }; MAX_PAIRS + 1],
        ..ScreenConfig::default()
    };
    let backend = RecordingBackend::new();
    let log = backend.log();
    assert!(matches!(
        Screen::from_config_with_backend(backend, &config),
        Err(Error::Assertion(_))
    ));
    assert!(log.calls().is_empty());
}

#[test]
fn end_is_called_once() {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let screen = Screen::with_backend(backend, InputMode::Cbreak, true, false).unwrap();
    screen.end().unwrap();
    assert!(!log.is_active());
    assert_eq!(log.calls().iter().filter(|c| **c == Call::End).count(), 1);
}

#[test]
fn drawing_after_end_is_an_operation_fault() {
    let backend = RecordingBackend::new();
    let log = backend.log();
    let screen = Screen::with_backend(backend, InputMode::Cbreak, true, false).unwrap();
    let mut win = Window::create(&screen, 3, 10, 0, 0).unwrap();
    screen.end().unwrap();

    assert_eq!(win.print_at("late", 0, 0), Err(Error::Operation));
    drop(win);
    assert_eq!(log.live_surfaces(), 1);
}

#[test]
fn windows_from_rects_and_keys() {
    let backend = RecordingBackend::new().with_keys([Key::Down, Key::Char('q')]);
    let log = backend.log();
    let mut screen = Screen::with_backend(backend, InputMode::Raw, true, false).unwrap();
    let mut cs = Colors::new();
    let hi = cs.add_pair(Color::Cyan, Color::Black).unwrap();
    screen.set_colors(cs).unwrap();

    let bounds = Rect::from_size(Coord::new(2, 4), 5, 12).unwrap();
    let mut win = Window::create_in(&screen, bounds).unwrap();
    win.keypad(true).unwrap();
    {
        let mut guard = AttrRestorer::new(&mut win);
        guard.attrs().color(hi).bold(true);
        guard.border(&Border::line()).unwrap();
    }
    win.print_at("ok", 1, 1).unwrap();

    assert_eq!(log.cell_attr(win.id(), 0, 0).map(|a| a.pair()), Some(hi));
    assert_eq!(log.cell_attr(win.id(), 1, 1).map(|a| a.pair()), Some(0));
    assert_eq!(win.getch(), Ok(Key::Down));
    assert_eq!(win.getch(), Ok(Key::Char('q')));
}
