//! Braille dot canvas: 2x4 dots per terminal cell

use crossterm::style::Color;

use crate::terminal::Terminal;

/// Dot offsets within a cell, indexed like the braille bit order
const DOT_OFFSETS: [(usize, usize); 8] = [
    (0, 0), (1, 0), (2, 0),
    (0, 1), (1, 1), (2, 1),
    (3, 0), (3, 1),
];
const DOT_BITS: [u8; 8] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80];

/// Draw order; higher layers win the cell colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Star = 1,
    Graticule,
    Atmosphere,
    Coastline,
    Topology,
    Arc,
    Particle,
    Marker,
    Selected,
}

#[derive(Clone, Copy, Default)]
struct Dot {
    layer: u8,
    color: Option<Color>,
}

pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    dots: Vec<Dot>,
    backgrounds: Vec<Option<Color>>,
}

impl BrailleCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let (cols, rows) = (cols as usize, rows as usize);
        Self {
            cols,
            rows,
            dots: vec![Dot::default(); cols * 2 * rows * 4],
            backgrounds: vec![None; cols * rows],
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Self::new(cols, rows);
    }

    /// Size in dots
    pub fn dot_size(&self) -> (usize, usize) {
        (self.cols * 2, self.rows * 4)
    }

    pub fn clear(&mut self) {
        self.dots.fill(Dot::default());
        self.backgrounds.fill(None);
    }

    /// Plot one dot; a dot on a lower layer never overwrites a higher one
    pub fn plot(&mut self, x: i32, y: i32, color: Color, layer: Layer) {
        let (w, h) = self.dot_size();
        if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
            return;
        }
        let dot = &mut self.dots[y as usize * w + x as usize];
        if layer as u8 >= dot.layer {
            *dot = Dot { layer: layer as u8, color: Some(color) };
        }
    }

    pub fn plot_f(&mut self, x: f64, y: f64, color: Color, layer: Layer) {
        self.plot(x.round() as i32, y.round() as i32, color, layer);
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, layer: Layer) {
        self.pattern_line(from, to, color, layer, None);
    }

    /// `dash` is (on, off) run lengths in dots
    pub fn dashed_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, layer: Layer, dash: (usize, usize)) {
        self.pattern_line(from, to, color, layer, Some(dash));
    }

    fn pattern_line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, layer: Layer, dash: Option<(usize, usize)>) {
        let (mut x0, mut y0) = (from.0.round() as i32, from.1.round() as i32);
        let (x1, y1) = (to.0.round() as i32, to.1.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut step = 0usize;

        loop {
            let on = match dash {
                Some((on, off)) => step % (on + off).max(1) < on,
                None => true,
            };
            if on {
                self.plot(x0, y0, color, layer);
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1;
        }
    }

    pub fn disc(&mut self, cx: f64, cy: f64, radius: f64, color: Color, layer: Layer) {
        let r = radius.max(0.0);
        let ri = r.ceil() as i32;
        let (cxi, cyi) = (cx.round() as i32, cy.round() as i32);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f64) <= r * r + 0.5 {
                    self.plot(cxi + dx, cyi + dy, color, layer);
                }
            }
        }
    }

    pub fn set_background(&mut self, col: usize, row: usize, color: Color) {
        if col < self.cols && row < self.rows {
            self.backgrounds[row * self.cols + col] = Some(color);
        }
    }

    /// Glyph and colour for a cell, `None` when no dot is set
    pub fn cell(&self, col: usize, row: usize) -> Option<(char, Color)> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let w = self.cols * 2;
        let (bx, by) = (col * 2, row * 4);
        let mut bits = 0u8;
        let mut top = Dot::default();

        for (i, &(oy, ox)) in DOT_OFFSETS.iter().enumerate() {
            let dot = self.dots[(by + oy) * w + bx + ox];
            if dot.layer > 0 {
                bits |= DOT_BITS[i];
                if dot.layer >= top.layer {
                    top = dot;
                }
            }
        }

        if bits == 0 {
            return None;
        }
        let ch = char::from_u32(0x2800 + bits as u32).unwrap_or(' ');
        Some((ch, top.color.unwrap_or(Color::White)))
    }

    pub fn background(&self, col: usize, row: usize) -> Option<Color> {
        if col < self.cols && row < self.rows {
            self.backgrounds[row * self.cols + col]
        } else {
            None
        }
    }

    pub fn render(&self, term: &mut Terminal) {
        self.render_at(term, 0, 0);
    }

    /// Copy onto the terminal with the top-left cell at (x0, y0)
    pub fn render_at(&self, term: &mut Terminal, x0: i32, y0: i32) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let (x, y) = (x0 + col as i32, y0 + row as i32);
                if let Some(bg) = self.background(col, row) {
                    term.set_bg(x, y, Some(bg));
                }
                if let Some((ch, color)) = self.cell(col, row) {
                    term.set(x, y, ch, Some(color), false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_bits_follow_braille_order() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.plot(0, 0, Color::Red, Layer::Arc);
        assert_eq!(canvas.cell(0, 0), Some(('\u{2801}', Color::Red)));

        canvas.plot(1, 3, Color::Red, Layer::Arc);
        assert_eq!(canvas.cell(0, 0).map(|c| c.0), Some('\u{2881}'));

        canvas.plot(2, 3, Color::Blue, Layer::Arc);
        assert_eq!(canvas.cell(1, 0), Some(('\u{2840}', Color::Blue)));
        assert_eq!(canvas.cell(5, 5), None);
    }

    #[test]
    fn higher_layer_wins() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.plot(0, 0, Color::Green, Layer::Marker);
        canvas.plot(0, 0, Color::Grey, Layer::Graticule);
        assert_eq!(canvas.cell(0, 0).unwrap().1, Color::Green);

        canvas.plot(1, 1, Color::Grey, Layer::Graticule);
        assert_eq!(canvas.cell(0, 0).unwrap().1, Color::Green);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.plot(-1, 0, Color::Red, Layer::Arc);
        canvas.plot(2, 0, Color::Red, Layer::Arc);
        canvas.plot(0, 4, Color::Red, Layer::Arc);
        assert_eq!(canvas.cell(0, 0), None);
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let mut solid = BrailleCanvas::new(10, 1);
        solid.line((0.0, 0.0), (19.0, 0.0), Color::White, Layer::Topology);
        let mut dashed = BrailleCanvas::new(10, 1);
        dashed.dashed_line((0.0, 0.0), (19.0, 0.0), Color::White, Layer::Topology, (2, 2));

        let lit = |c: &BrailleCanvas| (0..20).filter(|&x| c.dots[x].layer > 0).count();
        assert_eq!(lit(&solid), 20);
        assert_eq!(lit(&dashed), 10);
    }

    #[test]
    fn clear_resets_backgrounds() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_background(1, 1, Color::Blue);
        assert_eq!(canvas.background(1, 1), Some(Color::Blue));
        canvas.clear();
        assert_eq!(canvas.background(1, 1), None);
    }
}
