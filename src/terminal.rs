use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Double-buffered terminal: draw into the back buffer, then `present`
/// writes only the cells that changed since the last frame.
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    front: Vec<Vec<Cell>>,
    force_redraw: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Enter raw mode on the alternate screen
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        Ok(Self {
            width,
            height,
            buffer: blank(width, height),
            front: blank(width, height),
            force_redraw: true,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = blank(width, height);
        self.front = blank(width, height);
        self.force_redraw = true;
    }

    /// Clear the back buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        self.force_redraw = true;
        Ok(())
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.ch = ch;
            cell.fg = fg;
            cell.bold = bold;
        }
    }

    /// Background only; keeps whatever glyph is already in the cell
    pub fn set_bg(&mut self, x: i32, y: i32, bg: Option<Color>) {
        if let Some(cell) = self.cell_mut(x, y) {
            cell.bg = bg;
        }
    }

    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Blank a rectangle, background included
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u16, h: u16, bg: Option<Color>) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                if let Some(cell) = self.cell_mut(x + dx, y + dy) {
                    *cell = Cell { bg, ..Cell::default() };
                }
            }
        }
    }

    /// Write changed cells to the screen
    pub fn present(&mut self) -> io::Result<()> {
        let mut out = stdout().lock();
        let mut last_fg: Option<Option<Color>> = None;
        let mut last_bg: Option<Option<Color>> = None;
        let mut last_bold = false;
        let mut cursor: Option<(u16, u16)> = None;

        for (y, (row, front_row)) in self.buffer.iter().zip(self.front.iter_mut()).enumerate() {
            for (x, (cell, shown)) in row.iter().zip(front_row.iter_mut()).enumerate() {
                if !self.force_redraw && cell == shown {
                    continue;
                }
                let (x, y) = (x as u16, y as u16);
                if cursor != Some((x, y)) {
                    queue!(out, MoveTo(x, y))?;
                }
                if cell.bold != last_bold {
                    queue!(out, SetAttribute(if cell.bold { Attribute::Bold } else { Attribute::NormalIntensity }))?;
                    last_bold = cell.bold;
                }
                if last_fg != Some(cell.fg) {
                    queue!(out, SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
                    last_fg = Some(cell.fg);
                }
                if last_bg != Some(cell.bg) {
                    queue!(out, SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
                    last_bg = Some(cell.bg);
                }
                queue!(out, Print(cell.ch))?;
                cursor = Some((x + 1, y));
                *shown = cell.clone();
            }
        }

        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
        out.flush()?;
        self.force_redraw = false;
        Ok(())
    }

    /// Non-blocking key check, returns (code, modifiers)
    pub fn check_key(&self) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
        if poll(Duration::from_millis(0))? {
            if let Event::Key(KeyEvent { code, modifiers, kind, .. }) = read()? {
                if kind != KeyEventKind::Release {
                    return Ok(Some((code, modifiers)));
                }
            }
        }
        Ok(None)
    }

    pub fn sleep(&self, step: Duration) {
        std::thread::sleep(step);
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.buffer.get_mut(y as usize).and_then(|row| row.get_mut(x as usize))
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(stdout(), ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn blank(width: u16, height: u16) -> Vec<Vec<Cell>> {
    vec![vec![Cell::default(); width as usize]; height as usize]
}
