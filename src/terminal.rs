// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Tracks the fg/bg/bold state of the wire so we only emit changes.
struct Pen {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
    bold: Option<bool>,
}

impl Pen {
    fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: None,
        }
    }

    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if self.fg != Some(cell.fg) {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = Some(cell.bg);
        }
        if self.bold != Some(cell.bold) {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = Some(cell.bold);
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    last: Vec<Cell>,
    last_size: (u16, u16),
    run_buf: String,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(event::EnableMouseCapture)?;
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            last: Vec::new(),
            last_size: (0, 0),
            run_buf: String::with_capacity(128),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: std::time::Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        if size != self.last_size {
            self.last.clear();
            self.last_size = size;
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
        }

        let full = self.last.len() != frame.cells().len();
        let mut pen = Pen::new();

        let width = frame.width as usize;
        let cells = frame.cells();

        if full {
            self.last = cells.to_vec();
            for y in 0..frame.height {
                self.stdout.queue(cursor::MoveTo(0, y))?;
                for x in 0..width {
                    let cell = &cells[y as usize * width + x];
                    pen.apply(&mut self.stdout, cell)?;
                    self.stdout.queue(Print(cell.ch))?;
                }
            }
            return self.finish();
        }

        for y in 0..frame.height as usize {
            let row = y * width;
            let mut x = 0usize;
            while x < width {
                let idx = row + x;
                if cells[idx] == self.last[idx] {
                    x += 1;
                    continue;
                }

                // Open a run of changed cells sharing one style.
                let style = cells[idx];
                self.run_buf.clear();
                let start = x;
                while x < width {
                    let i = row + x;
                    let c = cells[i];
                    if c == self.last[i] {
                        break;
                    }
                    if c.fg != style.fg || c.bg != style.bg || c.bold != style.bold {
                        break;
                    }
                    self.run_buf.push(c.ch);
                    self.last[i] = c;
                    x += 1;
                }

                self.stdout.queue(cursor::MoveTo(start as u16, y as u16))?;
                pen.apply(&mut self.stdout, &style)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
            }
        }
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(event::DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
