//! Live mode: redraw a frame on a fixed interval until the user quits.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;

/// Decides, between frames, whether the loop should stop.
pub trait QuitSignal {
    /// Waits at most `timeout`; returns `true` to stop.
    fn wait(&mut self, timeout: Duration) -> io::Result<bool>;
}

/// Quits on `q`, Esc or Ctrl-C. Holds the terminal in raw mode while alive.
pub struct KeyboardQuit {
    _raw: RawModeGuard,
}

impl KeyboardQuit {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            _raw: RawModeGuard::enable()?,
        })
    }
}

impl QuitSignal for KeyboardQuit {
    fn wait(&mut self, timeout: Duration) -> io::Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining)? {
                return Ok(false);
            }
            if let Event::Key(key) = event::read()? {
                if is_quit_key(&key) {
                    return Ok(true);
                }
            }
        }
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Re-runs a frame on a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveLoop {
    pub interval: Duration,
}

impl LiveLoop {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Runs `frame`, then waits on `quit`, until `quit` fires or `frame`
    /// fails. A frame that has started always completes. Returns the number
    /// of frames drawn.
    pub fn run<F, Q>(&self, mut frame: F, quit: &mut Q) -> io::Result<usize>
    where
        F: FnMut() -> io::Result<()>,
        Q: QuitSignal + ?Sized,
    {
        let mut frames = 0;
        loop {
            frame()?;
            frames += 1;
            if quit.wait(self.interval)? {
                log::debug!("live loop stopped after {} frames", frames);
                return Ok(frames);
            }
        }
    }
}

/// Clears the screen and writes `lines` from the top-left corner.
///
/// Rows end in `\r\n` since raw mode does not translate newlines.
pub fn draw<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for line in lines {
        write!(out, "{}\r\n", line)?;
    }
    out.flush()
}
