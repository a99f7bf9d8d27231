//! Trajectory Rendering
//!
//! Draws the price path of an episode with the held position marked on every
//! tick, into an off-screen ratatui buffer that is returned as text.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use crate::rl::core::Position;

/// Default chart width in terminal cells
pub const CHART_WIDTH: u16 = 100;

/// Default chart height in terminal cells
pub const CHART_HEIGHT: u16 = 24;

/// Headline shown above the chart
pub fn trajectory_title(total_reward: f64, total_profit: f64) -> String {
    format!(
        "Total Reward: {:.6} ~ Total Profit: {:.6}",
        total_reward, total_profit
    )
}

/// Render prices with Short ticks and Long ticks as separate scatter series.
///
/// `position_history[i]` is the position held at tick `i`; `None` marks ticks
/// that belong to the initial observation window.
pub fn render_trajectory(
    prices: &[f64],
    position_history: &[Option<Position>],
    total_reward: f64,
    total_profit: f64,
    width: u16,
    height: u16,
) -> String {
    let title = trajectory_title(total_reward, total_profit);

    let price_points: Vec<(f64, f64)> = prices
        .iter()
        .enumerate()
        .map(|(i, &p)| (i as f64, p))
        .collect();

    let marked = |wanted: Position| -> Vec<(f64, f64)> {
        position_history
            .iter()
            .enumerate()
            .filter(|(_, pos)| **pos == Some(wanted))
            .filter_map(|(tick, _)| prices.get(tick).map(|p| (tick as f64, *p)))
            .collect()
    };
    let short_points = marked(Position::Short);
    let long_points = marked(Position::Long);

    let (y_min, y_max) = price_bounds(prices);
    let x_max = (prices.len().saturating_sub(1) as f64).max(1.0);

    let datasets = vec![
        Dataset::default()
            .name("Price")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&price_points),
        Dataset::default()
            .name("Short")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&short_points),
        Dataset::default()
            .name("Long")
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Green))
            .data(&long_points),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .x_axis(
            Axis::default()
                .title("Tick")
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{}", prices.len() / 2)),
                    Span::raw(format!("{}", prices.len().saturating_sub(1))),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Price")
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{:.2}", y_min)),
                    Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
                    Span::raw(format!("{:.2}", y_max)),
                ]),
        );

    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    chart.render(area, &mut buf);

    let mut out = String::with_capacity((width as usize + 1) * (height as usize + 1));
    out.push_str(&title);
    out.push('\n');
    for y in 0..area.height {
        let line: String = (0..area.width).map(|x| buf[(x, y)].symbol()).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn price_bounds(prices: &[f64]) -> (f64, f64) {
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(0.01);
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_format() {
        assert_eq!(
            trajectory_title(-1.5, 1.25),
            "Total Reward: -1.500000 ~ Total Profit: 1.250000"
        );
    }

    #[test]
    fn test_render_has_header_and_requested_height() {
        let prices = [10.0, 11.0, 12.0, 11.0, 13.0];
        let history = [
            None,
            None,
            Some(Position::Short),
            Some(Position::Long),
            Some(Position::Short),
        ];
        let out = render_trajectory(&prices, &history, 0.5, 1.1, 60, 12);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "Total Reward: 0.500000 ~ Total Profit: 1.100000");
        assert_eq!(lines.len(), 13);
        assert!(lines.iter().skip(1).all(|l| l.chars().count() <= 60));
    }

    #[test]
    fn test_price_bounds_pad_flat_series() {
        let (lo, hi) = price_bounds(&[5.0, 5.0]);
        assert!(lo < 5.0 && hi > 5.0);
        assert_eq!(price_bounds(&[]), (0.0, 1.0));
    }
}
