//! Link history modal: braille line chart with min/max/avg

use crate::colors::{band_color, palette};
use crate::data::LatencyBand;
use crate::help::draw_box;
use crate::history::{HistoryPoint, HistoryView, TimeRange};
use crate::terminal::Terminal;

use super::braille::{BrailleCanvas, Layer};

const AXIS_WIDTH: usize = 8;

/// Map a series onto a `w` x `h` dot grid, oldest at x = 0, highest latency at y = 0
pub fn scale_series(series: &[HistoryPoint], w: usize, h: usize) -> Vec<(f64, f64)> {
    if series.is_empty() || w == 0 || h == 0 {
        return Vec::new();
    }
    let (lo, hi) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.latency), hi.max(p.latency)));
    let span = (hi - lo).max(1e-9);
    let last = (series.len() - 1).max(1) as f64;

    series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = i as f64 / last * (w - 1) as f64;
            let y = (hi - p.latency) / span * (h - 1) as f64;
            (x, y)
        })
        .collect()
}

fn time_label(range: TimeRange, p: &HistoryPoint) -> String {
    match range {
        TimeRange::Hour | TimeRange::Day => p.timestamp.format("%H:%M").to_string(),
        TimeRange::Week | TimeRange::Month => p.timestamp.format("%m-%d").to_string(),
    }
}

pub fn render_history(term: &mut Terminal, view: &HistoryView) {
    let (tw, th) = term.size();
    let w = (tw as usize).saturating_sub(8).clamp(30, 90);
    let h = (th as usize).saturating_sub(4).clamp(12, 24);
    let x0 = (tw as usize).saturating_sub(w) as i32 / 2;
    let y0 = (th as usize).saturating_sub(h) as i32 / 2;
    draw_box(term, x0, y0, w, h);

    let title = format!("{} → {}", view.link.from, view.link.to);
    term.set_str(x0 + 2, y0 + 1, &title, Some(palette::TITLE), true);

    let mut rx = x0 + w as i32 - 2;
    for range in TimeRange::ALL.iter().rev() {
        let label = range.label();
        rx -= label.len() as i32 + 1;
        let selected = *range == view.range;
        let color = if selected { palette::SELECTED } else { palette::MUTED };
        term.set_str(rx, y0 + 1, label, Some(color), selected);
    }

    let current = view.series.last().map(|p| p.latency).unwrap_or(view.link.latency);
    let stats = [
        ("Current", current),
        ("Min", view.stats.min),
        ("Max", view.stats.max),
        ("Avg", view.stats.avg),
    ];
    let mut sx = x0 + 2;
    for (label, value) in stats {
        let text = format!("{label} {value:.2} ms");
        term.set_str(sx, y0 + 2, &text, Some(band_color(LatencyBand::of(value))), false);
        sx += text.chars().count() as i32 + 3;
    }

    let chart_cols = w.saturating_sub(AXIS_WIDTH + 3);
    let chart_rows = h.saturating_sub(7);
    if chart_cols < 4 || chart_rows < 2 {
        return;
    }
    let chart_x = x0 + AXIS_WIDTH as i32 + 2;
    let chart_y = y0 + 4;

    let mut canvas = BrailleCanvas::new(chart_cols as u16, chart_rows as u16);
    let (dw, dh) = canvas.dot_size();
    let points = scale_series(&view.series, dw, dh);
    let color = band_color(view.link.band());
    for pair in points.windows(2) {
        canvas.line(pair[0], pair[1], color, Layer::Arc);
    }
    canvas.render_at(term, chart_x, chart_y);

    let axis = Some(palette::MUTED);
    term.set_str(x0 + 2, chart_y, &format!("{:>6.1}", view.stats.max), axis, false);
    term.set_str(x0 + 2, chart_y + chart_rows as i32 - 1, &format!("{:>6.1}", view.stats.min), axis, false);

    let label_y = chart_y + chart_rows as i32;
    if let (Some(first), Some(last)) = (view.series.first(), view.series.last()) {
        term.set_str(chart_x, label_y, &time_label(view.range, first), axis, false);
        let end = time_label(view.range, last);
        term.set_str(chart_x + chart_cols as i32 - end.len() as i32, label_y, &end, axis, false);
    }

    term.set_str(x0 + 2, y0 + h as i32 - 2, "t range  Esc close", Some(palette::MUTED), false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(latency: f64) -> HistoryPoint {
        HistoryPoint { timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap(), latency }
    }

    #[test]
    fn scaled_series_spans_the_grid() {
        let series = vec![point(10.0), point(30.0), point(20.0)];
        let pts = scale_series(&series, 21, 11);
        assert_eq!(pts, vec![(0.0, 10.0), (10.0, 0.0), (20.0, 5.0)]);
    }

    #[test]
    fn flat_series_stays_finite() {
        let series = vec![point(5.0); 4];
        assert!(scale_series(&series, 10, 10).iter().all(|(x, y)| x.is_finite() && y.is_finite()));
        assert!(scale_series(&[], 10, 10).is_empty());
    }

    #[test]
    fn labels_follow_range() {
        assert_eq!(time_label(TimeRange::Hour, &point(1.0)), "12:30");
        assert_eq!(time_label(TimeRange::Month, &point(1.0)), "01-01");
    }
}
