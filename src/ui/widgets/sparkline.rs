//! Duty cycle sparkline widget for the secondary panel

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different duty levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-row sparkline of fan duty cycle fractions
///
/// Samples are averaged into one bucket per column so the whole cook fits
/// the available width.
pub struct DutySparkline<'a> {
    /// Duty cycle fractions, oldest first
    values: &'a [f64],
    /// Value drawn as a full block
    max_value: f64,
    /// Style for the sparkline
    style: Style,
    /// Style for the most recent column
    latest_style: Style,
}

impl<'a> DutySparkline<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self {
            values,
            max_value: 1.0,
            style: Style::default().fg(Color::Green),
            latest_style: Style::default().fg(Color::LightGreen),
        }
    }

    pub fn max_value(mut self, max_value: f64) -> Self {
        self.max_value = max_value;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn value_to_block(&self, value: f64) -> char {
        if self.max_value <= 0.0 {
            return BLOCKS[0];
        }
        let normalized = (value / self.max_value).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

/// Averages `values` into at most `width` buckets
pub fn resample(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 || values.is_empty() {
        return Vec::new();
    }
    if values.len() <= width {
        return values.to_vec();
    }

    (0..width)
        .map(|i| {
            let start = i * values.len() / width;
            let end = ((i + 1) * values.len() / width).max(start + 1);
            let bucket = &values[start..end];
            bucket.iter().sum::<f64>() / bucket.len() as f64
        })
        .collect()
}

impl<'a> Widget for DutySparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let columns = resample(self.values, area.width as usize);
        let last = columns.len().saturating_sub(1);

        for (i, value) in columns.iter().enumerate() {
            let block = self.value_to_block(*value);
            let x = area.x + i as u16;
            let y = area.y;

            let style = if i == last {
                self.latest_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
