use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use galton::scene::{Backend, Rgb};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
}

impl Cell {
    fn blank(bg: Color) -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg,
        }
    }
}

pub(crate) struct CellBuffer {
    w: u16,
    h: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::blank(Color::Black); w as usize * h as usize],
        }
    }

    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            self.cells[y as usize * self.w as usize + x as usize] = c;
        }
    }

    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell::blank(bg));
    }
}

/// Braille sub-pixel grid, two columns by four rows per terminal cell.
pub(crate) struct PixelCanvas {
    w: u32,
    h: u32,
    px: Vec<Option<Rgb>>,
}

impl PixelCanvas {
    fn for_cells(cols: u16, rows: u16) -> Self {
        let (w, h) = (cols as u32 * 2, rows as u32 * 4);
        Self {
            w,
            h,
            px: vec![None; w as usize * h as usize],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.px.fill(None);
    }

    fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x < self.w && y < self.h {
            self.px[y as usize * self.w as usize + x as usize]
        } else {
            None
        }
    }

    fn plot(&mut self, x: i32, y: i32, c: Rgb) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < self.w && y < self.h {
            self.px[y as usize * self.w as usize + x as usize] = Some(c);
        }
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    pub(crate) canvas: PixelCanvas,
    restored: bool,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            canvas: PixelCanvas::for_cells(cols, rows),
            restored: false,
        })
    }

    /// Hands the shell back. Safe to call twice; `Drop` calls it as well.
    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(
            self.out,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<()> {
        let (cols, rows) = terminal::size()?;
        if (cols, rows) != (self.cols, self.rows) {
            self.cols = cols;
            self.rows = rows;
            self.prev = CellBuffer::new(cols, rows);
            self.cur = CellBuffer::new(cols, rows);
            self.canvas = PixelCanvas::for_cells(cols, rows);
            queue!(self.out, Clear(ClearType::All))?;
        }
        Ok(())
    }

    /// Writes only the cells that changed since the last frame.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let width = self.cur.w as usize;
        let mut pen: Option<(u16, u16)> = None;
        let mut colors: Option<(Color, Color)> = None;

        for (i, (c, old)) in self.cur.cells.iter().zip(&self.prev.cells).enumerate() {
            if c == old {
                continue;
            }
            let at = ((i % width) as u16, (i / width) as u16);
            if pen != Some(at) {
                queue!(self.out, cursor::MoveTo(at.0, at.1))?;
            }
            if colors != Some((c.fg, c.bg)) {
                queue!(self.out, SetForegroundColor(c.fg), SetBackgroundColor(c.bg))?;
                colors = Some((c.fg, c.bg));
            }
            queue!(self.out, Print(c.ch))?;
            pen = Some((at.0 + 1, at.1));
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.end();
    }
}

// dot bits for (dx, dy) within a cell, U+2800 based
const BRAILLE_DOTS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

/// Packs the canvas into braille cells, each tinted with the mean colour of its dots.
/// Cells with no ink are left as they are.
pub(crate) fn canvas_to_cells(canvas: &PixelCanvas, out: &mut CellBuffer, bg: Color) {
    for cy in 0..out.h {
        for cx in 0..out.w {
            let mut mask = 0u8;
            let mut sum = [0u32; 3];
            let mut dots = 0u32;
            for (dx, column) in BRAILLE_DOTS.iter().enumerate() {
                for (dy, bit) in column.iter().enumerate() {
                    let x = cx as u32 * 2 + dx as u32;
                    let y = cy as u32 * 4 + dy as u32;
                    if let Some(c) = canvas.get(x, y) {
                        mask |= bit;
                        sum[0] += c.r as u32;
                        sum[1] += c.g as u32;
                        sum[2] += c.b as u32;
                        dots += 1;
                    }
                }
            }
            if dots == 0 {
                continue;
            }
            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            let fg = Color::Rgb {
                r: (sum[0] / dots) as u8,
                g: (sum[1] / dots) as u8,
                b: (sum[2] / dots) as u8,
            };
            out.set(cx, cy, Cell { ch, fg, bg });
        }
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    for (ch, xx) in s.chars().zip(x..buf.w) {
        buf.set(xx, y, Cell { ch, fg, bg });
    }
}

/// Terminal background is black, so the machine's black ink becomes grey.
fn ink(c: Rgb) -> Rgb {
    if c.r < 40 && c.g < 40 && c.b < 40 {
        Rgb::new(170, 170, 170)
    } else {
        c
    }
}

fn to_color(c: Rgb) -> Color {
    let c = ink(c);
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

/* -----------------------------
   Scene backend: machine pixels -> braille subpixels
------------------------------ */

/// Cell column, cell row, text, colour.
pub(crate) type Label = (i32, i32, String, Color);

pub(crate) struct BrailleBackend<'a> {
    canvas: &'a mut PixelCanvas,
    scale: f32,
    ox: f32,
    oy: f32,
    labels: Vec<Label>,
}

impl<'a> BrailleBackend<'a> {
    /// Fits a `(w, h)` machine-pixel scene into the canvas below `top_rows` text rows.
    pub(crate) fn fit(canvas: &'a mut PixelCanvas, extent: (f32, f32), top_rows: u32) -> Self {
        let top = (top_rows * 4) as f32;
        let avail_w = canvas.w as f32;
        let avail_h = (canvas.h as f32 - top).max(1.0);
        let scale = (avail_w / extent.0.max(1.0)).min(avail_h / extent.1.max(1.0));
        let ox = ((avail_w - extent.0 * scale) / 2.0).max(0.0);
        Self {
            canvas,
            scale,
            ox,
            oy: top,
            labels: Vec::new(),
        }
    }

    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.ox + x * self.scale, self.oy + y * self.scale)
    }

    fn stroke_segment(&mut self, a: (f32, f32), b: (f32, f32), p: Rgb) {
        let (x0, y0) = self.map(a.0, a.1);
        let (x1, y1) = self.map(b.0, b.1);
        let n = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i32;
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let x = x0 + (x1 - x0) * t;
            let y = y0 + (y1 - y0) * t;
            self.canvas.plot(x.round() as i32, y.round() as i32, p);
        }
    }

    /// Hands back the text labels; they are laid over the braille cells
    /// once the canvas has been converted.
    pub(crate) fn finish(self) -> Vec<Label> {
        self.labels
    }
}

pub(crate) fn draw_labels(buf: &mut CellBuffer, labels: &[Label], bg: Color) {
    for (cx, cy, s, fg) in labels {
        if *cx >= 0 && *cy >= 0 {
            draw_text(buf, *cx as u16, *cy as u16, s, *fg, bg);
        }
    }
}

impl Backend for BrailleBackend<'_> {
    fn circle(&mut self, x: f32, y: f32, radius: f32, fill: Rgb, _stroke: Rgb) {
        let (cx, cy) = self.map(x, y);
        let r = (radius * self.scale).max(0.75);
        let p = fill;
        let ri = r.ceil() as i32;
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                let (fx, fy) = (dx as f32, dy as f32);
                if fx * fx + fy * fy <= r * r {
                    self.canvas
                        .plot(cx.round() as i32 + dx, cy.round() as i32 + dy, p);
                }
            }
        }
    }

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb) {
        let (x0, y0) = self.map(x, y);
        let (x1, y1) = self.map(x + w, y + h);
        let p = fill;
        for py in y0.round() as i32..y1.round().max(y0.round() + 1.0) as i32 {
            for px in x0.round() as i32..x1.round().max(x0.round() + 1.0) as i32 {
                self.canvas.plot(px, py, p);
            }
        }
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb) {
        self.stroke_segment(from, to, ink(color));
    }

    fn polyline(&mut self, points: &[(f32, f32)], color: Rgb) {
        let p = ink(color);
        for w in points.windows(2) {
            self.stroke_segment(w[0], w[1], p);
        }
    }

    fn polygon(&mut self, points: &[(f32, f32)], fill: Rgb, _stroke: Rgb) {
        if points.len() < 3 {
            return;
        }
        let mapped: Vec<(f32, f32)> = points.iter().map(|&(x, y)| self.map(x, y)).collect();
        let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
        for &(_, y) in &mapped {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let p = fill;

        // even-odd scanline fill
        for py in min_y.floor() as i32..=max_y.ceil() as i32 {
            let sy = py as f32 + 0.5;
            let mut xs = Vec::new();
            for i in 0..mapped.len() {
                let (ax, ay) = mapped[i];
                let (bx, by) = mapped[(i + 1) % mapped.len()];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    xs.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
            xs.sort_by(|a, b| a.total_cmp(b));
            for pair in xs.chunks(2) {
                if let [a, b] = pair {
                    for px in a.round() as i32..=b.round() as i32 {
                        self.canvas.plot(px, py, p);
                    }
                }
            }
        }
    }

    fn text(&mut self, x: f32, y: f32, s: &str, color: Rgb) {
        let (px, py) = self.map(x, y);
        self.labels
            .push(((px / 2.0) as i32, (py / 4.0) as i32, s.to_string(), to_color(color)));
    }
}
