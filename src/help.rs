use crate::colors::palette;
use crate::terminal::Terminal;

pub const HELP: &str = "\
LATENCY GLOBE
──────────────────────────────
q/Esc      Quit
?          Toggle this help
Space      Pause
p          Toggle side panel
1/2/3      Toggle AWS/GCP/Azure
v          Heatmap / topology view
o          Order flow particles
[ ]        Min latency -/+ 10 ms
{ }        Max latency -/+ 10 ms
/          Search locations
Tab        Select next link
Shift-Tab  Select previous link
Enter      Link history
t          Cycle history range
e          Export CSV
←→↑↓/hjkl  Rotate globe
+/-        Zoom
0          Reset view";

/// Draw a centered box with the given text into the back buffer
pub fn render_help_overlay(term: &mut Terminal, help_text: &str) {
    if help_text.is_empty() {
        return;
    }
    let (width, height) = term.size();

    let lines: Vec<&str> = help_text.lines().collect();
    let max_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines.len() + 2;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;

    draw_box(term, start_x as i32, start_y as i32, box_width, box_height);

    for (i, line) in lines.iter().enumerate() {
        let y = (start_y + 1 + i) as i32;
        let color = if i == 0 { palette::TITLE } else { palette::TEXT };
        term.set_str(start_x as i32 + 2, y, line, Some(color), i == 0);
    }
}

/// Bordered box with a cleared interior
pub fn draw_box(term: &mut Terminal, x: i32, y: i32, w: usize, h: usize) {
    if w < 2 || h < 2 {
        return;
    }
    let border = Some(palette::BORDER);
    let (right, bottom) = (x + w as i32 - 1, y + h as i32 - 1);

    term.fill_rect(x, y, w as u16, h as u16, Some(crossterm::style::Color::Black));
    term.set(x, y, '┌', border, false);
    term.set(right, y, '┐', border, false);
    term.set(x, bottom, '└', border, false);
    term.set(right, bottom, '┘', border, false);
    for cx in x + 1..right {
        term.set(cx, y, '─', border, false);
        term.set(cx, bottom, '─', border, false);
    }
    for cy in y + 1..bottom {
        term.set(x, cy, '│', border, false);
        term.set(right, cy, '│', border, false);
    }
}
