//! Side panel, header, search box and status line

use crossterm::style::Color;

use crate::colors::{band_color, hex_color, palette, provider_color, StatusColor};
use crate::dashboard::Dashboard;
use crate::data::{LatencyBand, Location, Provider};
use crate::filter::{LatencyRange, ViewMode, RANGE_LIMIT_MS};
use crate::help::draw_box;
use crate::metrics::format_count;
use crate::terminal::Terminal;

pub const PANEL_WIDTH: u16 = 32;
pub const HEADER_HEIGHT: u16 = 2;

const BAR_GLYPHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Four pulsing bars, each offset by 0.15 s
pub fn signal_bars(t: f64) -> String {
    (0..4)
        .map(|i| {
            let phase = ((t - i as f64 * 0.15) / 1.2 * std::f64::consts::TAU).sin() * 0.5 + 0.5;
            let level = (i as f64 * 1.5 + phase * 2.0).round() as usize;
            BAR_GLYPHS[level.min(BAR_GLYPHS.len() - 1)]
        })
        .collect()
}

/// `width` cells filled in proportion to `percent`
pub fn gauge(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut s = "█".repeat(filled);
    s.push_str(&"░".repeat(width - filled));
    s
}

/// Range slider over `[0, RANGE_LIMIT_MS]`: `─` outside, `━` inside, `●` handles
pub fn slider(range: LatencyRange, width: usize) -> String {
    if width < 2 {
        return String::new();
    }
    let to_col = |ms: u32| ((ms as f64 / RANGE_LIMIT_MS as f64) * (width - 1) as f64).round() as usize;
    let (lo, hi) = (to_col(range.min), to_col(range.max));
    (0..width)
        .map(|i| {
            if i == lo || i == hi {
                '●'
            } else if i > lo && i < hi {
                '━'
            } else {
                '─'
            }
        })
        .collect()
}

fn section(term: &mut Terminal, x: i32, y: &mut i32, title: &str) {
    *y += 1;
    term.set_str(x, *y, title, Some(palette::ACCENT), true);
    *y += 1;
}

pub fn render_side_panel(term: &mut Terminal, d: &Dashboard, t: f64) {
    let (_, height) = term.size();
    let w = PANEL_WIDTH as usize;
    draw_box(term, 0, 0, w, height as usize);

    let x = 2;
    let inner = w - 4;
    let mut y = 1;

    term.set_str(x, y, "LATENCY VISUALIZER", Some(palette::TITLE), true);
    y += 1;
    term.set_str(x, y, "Simulated exchange latency", Some(palette::MUTED), false);
    y += 1;

    section(term, x, &mut y, "CLOUD PROVIDERS");
    for (i, provider) in Provider::ALL.iter().enumerate() {
        let active = d.providers.is_active(*provider);
        let mark = if active { "[x]" } else { "[ ]" };
        let color = if active { provider_color(*provider) } else { palette::MUTED };
        term.set_str(x, y, &format!("{} {} {}", i + 1, mark, provider.name()), Some(color), active);
        if active {
            term.set_str(x + inner as i32 - 4, y, &signal_bars(t + i as f64 * 0.4), Some(color), false);
        }
        y += 1;
    }
    let flow = if d.order_flow { "on" } else { "off" };
    term.set_str(x, y, &format!("o Order flow: {flow}"), Some(palette::TEXT), false);
    if d.order_flow {
        let count = format_count(d.particles.len() as u32);
        term.set_str(x + inner as i32 - count.chars().count() as i32, y, &count, Some(palette::MUTED), false);
    }
    y += 1;
    term.set_str(x, y, &format!("v View: {}", d.view.label()), Some(palette::TEXT), false);
    y += 1;

    section(term, x, &mut y, "LATENCY CONTROLS");
    term.set_str(x, y, &format!("Min {:>3} ms  [ ]", d.latency_range.min), Some(palette::TEXT), false);
    y += 1;
    term.set_str(x, y, &format!("Max {:>3} ms  {{ }}", d.latency_range.max), Some(palette::TEXT), false);
    y += 1;
    term.set_str(x, y, &slider(d.latency_range, inner), Some(palette::ACCENT), false);
    y += 1;

    section(term, x, &mut y, "LIVE STATUS");
    let m = &d.metrics;
    let rows = [
        ("Average", format!("{:.1} ms", m.avg_latency), palette::TEXT),
        ("Min", format!("{:.1} ms", m.min_latency), palette::TEXT),
        ("Max", format!("{:.1} ms", m.max_latency), StatusColor::Critical.color()),
        ("Links", m.active_connections.to_string(), palette::TEXT),
        ("Packets/sec", format_count(m.packets_per_second), StatusColor::Info.color()),
    ];
    for (label, value, color) in rows {
        term.set_str(x, y, label, Some(palette::MUTED), false);
        term.set_str(x + inner as i32 - value.chars().count() as i32, y, &value, Some(color), false);
        y += 1;
    }
    let percent = m.threshold_percent();
    term.set_str(x, y, "Avg vs 200 ms threshold", Some(palette::MUTED), false);
    y += 1;
    let bar_w = inner.saturating_sub(5);
    term.set_str(x, y, &gauge(percent, bar_w), Some(StatusColor::for_percent(percent).color()), false);
    term.set_str(x + bar_w as i32 + 1, y, &format!("{percent:>3.0}%"), Some(palette::TEXT), false);
    y += 1;

    section(term, x, &mut y, "LATENCY RANGES");
    for band in LatencyBand::ALL {
        term.set(x, y, '●', Some(band_color(band)), false);
        term.set_str(x + 2, y, band.label(), Some(palette::TEXT), false);
        y += 1;
    }

    if y + 1 < height as i32 {
        term.set_str(x, height as i32 - 2, "? help  q quit", Some(palette::MUTED), false);
    }
}

/// Title, view switch, search box; `left` is the first column after the panel
pub fn render_header(term: &mut Terminal, d: &Dashboard, left: i32) {
    let (width, _) = term.size();
    let y = 0;

    let (heat, topo) = match d.view {
        ViewMode::Heatmap => (Some(palette::SELECTED), Some(palette::MUTED)),
        ViewMode::Topology => (Some(palette::MUTED), Some(palette::SELECTED)),
    };
    let switch_x = width as i32 - 22;
    term.set_str(switch_x, y, "Heatmap", heat, d.view == ViewMode::Heatmap);
    term.set_str(switch_x + 8, y, "|", Some(palette::BORDER), false);
    term.set_str(switch_x + 10, y, "Topology", topo, d.view == ViewMode::Topology);

    let search_x = left + 1;
    if d.search.active {
        let text = format!("/ {}_", d.search.query);
        term.set_str(search_x, y, &text, Some(palette::TITLE), true);
        render_search_results(term, d, search_x, y + 1);
    } else {
        term.set_str(search_x, y, "/ search exchanges and regions", Some(palette::MUTED), false);
    }

    if d.paused {
        term.set_str(switch_x - 10, y, "PAUSED", Some(StatusColor::Warning.color()), true);
    }
}

fn render_search_results(term: &mut Terminal, d: &Dashboard, x: i32, y: i32) {
    if d.search.query.trim().is_empty() {
        return;
    }
    if d.search.results.is_empty() {
        term.set_str(x, y, "No results", Some(palette::MUTED), false);
        return;
    }
    for (i, loc) in d.search.results.iter().enumerate() {
        let selected = i == d.search.cursor;
        let marker = if selected { '›' } else { ' ' };
        let line = format!("{marker} {:<18} {:<6} {}", loc.name(), loc.provider().name(), loc.kind());
        let color = if selected { palette::SELECTED } else { palette::TEXT };
        term.set_str(x, y + i as i32, &line, Some(color), selected);
    }
}

/// Bottom line: selected link, then status message or hints
pub fn render_status_line(term: &mut Terminal, d: &Dashboard, left: i32) {
    let (_, height) = term.size();
    let y = height as i32 - 1;

    let mut x = left + 1;
    if let Some(link) = d.selected_link() {
        let text = format!("{} → {}  {:.2} ms", link.from, link.to, link.latency);
        term.set_str(x, y, &text, Some(band_color(link.band())), true);
        x += text.chars().count() as i32 + 3;
    }

    match d.status() {
        Some(msg) => term.set_str(x, y, msg, Some(StatusColor::Info.color()), false),
        None => {
            let hint = format!("Tab link  Enter history ({})  e export", d.history_range);
            term.set_str(x, y, &hint, Some(palette::MUTED), false);
        }
    }
}

/// Details card for the focused location
pub fn render_tooltip(term: &mut Terminal, location: &Location, x: i32, y: i32) {
    let pos = location.position();
    let mut lines = vec![
        location.name().to_string(),
        format!("Provider: {}", location.provider()),
    ];
    match location {
        Location::Exchange(e) => lines.push(format!("Region: {}", e.region)),
        Location::Region(r) => {
            lines.push(format!("Code: {}", r.code));
            lines.push(format!("Servers: {}", r.server_count));
        }
    }
    lines.push(format!("({:.2}, {:.2})", pos.lat, pos.lon));

    let w = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let (tw, th) = term.size();
    let x = x.min(tw as i32 - w as i32).max(0);
    let y = y.min(th as i32 - lines.len() as i32 - 2).max(0);
    draw_box(term, x, y, w, lines.len() + 2);
    let accent: Color = hex_color(location.color_hex());
    for (i, line) in lines.iter().enumerate() {
        let color = if i == 0 { accent } else { palette::TEXT };
        term.set_str(x + 2, y + 1 + i as i32, line, Some(color), i == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_fill() {
        assert_eq!(gauge(0.0, 4), "░░░░");
        assert_eq!(gauge(50.0, 4), "██░░");
        assert_eq!(gauge(250.0, 4), "████");
    }

    #[test]
    fn slider_handles() {
        let full = slider(LatencyRange::default(), 11);
        assert_eq!(full.chars().next(), Some('●'));
        assert_eq!(full.chars().last(), Some('●'));
        assert_eq!(full.chars().filter(|c| *c == '━').count(), 9);

        let narrow = slider(LatencyRange::new(100, 200), 11);
        assert_eq!(narrow, "──●━●──────");
    }

    #[test]
    fn signal_bars_rise_left_to_right() {
        for step in 0..24 {
            let bars: Vec<char> = signal_bars(step as f64 * 0.1).chars().collect();
            assert_eq!(bars.len(), 4);
            let idx = |c: char| BAR_GLYPHS.iter().position(|g| *g == c).unwrap();
            assert!(idx(bars[0]) <= idx(bars[3]));
        }
    }
}
