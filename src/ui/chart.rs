//! Cook chart view
//!
//! Temperature series, the linear projection overlay, the meat target line,
//! the optional duty cycle panel and a status bar with the latest error.

use chrono::{FixedOffset, TimeZone};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::pipeline::CookSnapshot;
use crate::ui::help_overlay;
use crate::ui::widgets::DutySparkline;

const SET_COLOR: Color = Color::Blue;
const PIT_COLOR: Color = Color::Red;
const MEAT_COLOR: Color = Color::Yellow;
const PROJECTION_COLOR: Color = Color::Cyan;
const TARGET_COLOR: Color = Color::Gray;

/// Height of the duty cycle panel including its border
const DUTY_PANEL_HEIGHT: u16 = 3;

/// Plot-ready points and bounds derived from a snapshot
#[derive(Debug, Clone, Default)]
pub struct ChartData {
    pub set_temp: Vec<(f64, f64)>,
    pub pit_temp: Vec<(f64, f64)>,
    pub meat_temp: Vec<(f64, f64)>,
    /// Line from the first reference point to the predicted arrival
    pub projection: Vec<(f64, f64)>,
    /// The three reference points
    pub reference_points: Vec<(f64, f64)>,
    /// Horizontal line at the target, from the first sample to the arrival
    pub target: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartData {
    pub fn from_snapshot(snapshot: &CookSnapshot) -> Self {
        let readings = &snapshot.readings;
        let points = |f: fn(&crate::data::Reading) -> f64| -> Vec<(f64, f64)> {
            readings.iter().map(|r| (r.time as f64, f(r))).collect()
        };

        let set_temp = points(|r| r.set_temp);
        let pit_temp = points(|r| r.pit_temp);
        let meat_temp = points(|r| r.meat_temp);

        let first_time = readings.first().map(|r| r.time as f64);
        let last_time = readings.last().map(|r| r.time as f64);

        let (projection, reference_points, target_end) = match &snapshot.projection {
            Ok(p) if p.predicted_time().is_finite() => {
                let [start, latest, predicted] = p.overlay_points();
                (
                    vec![start, predicted],
                    vec![start, latest, predicted],
                    Some(predicted.0),
                )
            }
            _ => (Vec::new(), Vec::new(), last_time),
        };

        let target = match (first_time, target_end) {
            (Some(start), Some(end)) => {
                vec![(start, snapshot.target_temp), (end, snapshot.target_temp)]
            }
            _ => Vec::new(),
        };

        let all = set_temp
            .iter()
            .chain(&pit_temp)
            .chain(&meat_temp)
            .chain(&reference_points)
            .chain(&target);

        let mut x_bounds = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y_bounds = [snapshot.target_temp, snapshot.target_temp];
        for &(x, y) in all {
            x_bounds[0] = x_bounds[0].min(x);
            x_bounds[1] = x_bounds[1].max(x);
            y_bounds[0] = y_bounds[0].min(y);
            y_bounds[1] = y_bounds[1].max(y);
        }
        if !x_bounds[0].is_finite() {
            x_bounds = [0.0, 60.0];
        } else if x_bounds[1] - x_bounds[0] < 60.0 {
            x_bounds[1] = x_bounds[0] + 60.0;
        }
        // Round outward to 10°F
        y_bounds[0] = (y_bounds[0] / 10.0).floor() * 10.0 - 10.0;
        y_bounds[1] = (y_bounds[1] / 10.0).ceil() * 10.0 + 10.0;

        Self {
            set_temp,
            pit_temp,
            meat_temp,
            projection,
            reference_points,
            target,
            x_bounds,
            y_bounds,
        }
    }
}

/// Formats an epoch timestamp as a short axis label
fn time_label(secs: f64, offset: &FixedOffset) -> String {
    offset
        .timestamp_opt(secs as i64, 0)
        .single()
        .map(|t| t.format("%m/%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Renders the cook view
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let duty_height = if app.show_duty_cycle && app.has_data() {
        DUTY_PANEL_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(duty_height),
            Constraint::Length(2),
        ])
        .split(area);

    match &app.snapshot {
        Some(snapshot) => {
            render_chart(frame, chunks[0], snapshot, &app.utc_offset);
            if duty_height > 0 {
                render_duty_cycle(frame, chunks[1], snapshot);
            }
        }
        None => render_waiting(frame, chunks[0], app.cook_id),
    }

    render_status(frame, chunks[2], app);

    if app.show_help {
        help_overlay::render(frame, app);
    }
}

/// Renders a placeholder until the first cycle completes
fn render_waiting(frame: &mut Frame, area: Rect, cook_id: u64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new(format!("Loading cook {}...", cook_id))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

fn render_chart(frame: &mut Frame, area: Rect, snapshot: &CookSnapshot, offset: &FixedOffset) {
    let data = ChartData::from_snapshot(snapshot);

    let mut datasets = vec![
        Dataset::default()
            .name("set temp")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(SET_COLOR))
            .data(&data.set_temp),
        Dataset::default()
            .name("pit temp")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(PIT_COLOR))
            .data(&data.pit_temp),
        Dataset::default()
            .name("meat temp")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(MEAT_COLOR))
            .data(&data.meat_temp),
    ];

    if !data.projection.is_empty() {
        datasets.push(
            Dataset::default()
                .name("linear projection")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(PROJECTION_COLOR))
                .data(&data.projection),
        );
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(
                    Style::default()
                        .fg(PROJECTION_COLOR)
                        .add_modifier(Modifier::BOLD),
                )
                .data(&data.reference_points),
        );
    }

    if !data.target.is_empty() {
        datasets.push(
            Dataset::default()
                .name("meat target")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(TARGET_COLOR))
                .data(&data.target),
        );
    }

    let [x_min, x_max] = data.x_bounds;
    let x_labels = vec![
        Span::raw(time_label(x_min, offset)),
        Span::raw(time_label((x_min + x_max) / 2.0, offset)),
        Span::raw(time_label(x_max, offset)),
    ];

    let [y_min, y_max] = data.y_bounds;
    let y_labels = vec![
        Span::raw(format!("{:.0}", y_min)),
        Span::raw(format!("{:.0}", (y_min + y_max) / 2.0)),
        Span::raw(format!("{:.0}", y_max)),
    ];

    let title = format!(
        " Cook {} | Updated at {} ",
        snapshot.cook_id,
        snapshot
            .last_updated
            .with_timezone(offset)
            .format("%Y-%m-%d %H:%M:%S")
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(data.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("°F")
                .style(Style::default().fg(Color::Gray))
                .bounds(data.y_bounds)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}

fn render_duty_cycle(frame: &mut Frame, area: Rect, snapshot: &CookSnapshot) {
    let values: Vec<f64> = snapshot.readings.iter().map(|r| r.duty_cycle).collect();
    let latest = values.last().copied().unwrap_or(0.0);
    let max_value = values.iter().copied().fold(1.0_f64, f64::max);

    let block = Block::default()
        .title(format!(" Fan duty cycle {:.2} ", latest))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    frame.render_widget(
        DutySparkline::new(&values)
            .max_value(max_value)
            .style(Style::default().fg(Color::Green)),
        inner,
    );
}

/// Builds the projection summary line
fn projection_line(app: &App) -> Line<'static> {
    let Some(snapshot) = &app.snapshot else {
        return Line::from(Span::styled(
            "Waiting for data",
            Style::default().fg(Color::DarkGray),
        ));
    };

    let mut spans = match &snapshot.projection {
        Ok(p) if p.is_converging() => vec![Span::styled(
            p.describe(&app.utc_offset),
            Style::default().fg(PROJECTION_COLOR),
        )],
        Ok(p) => vec![
            Span::styled(
                p.describe(&app.utc_offset),
                Style::default().fg(PROJECTION_COLOR),
            ),
            Span::styled(" (meat cooling)", Style::default().fg(Color::Yellow)),
        ],
        Err(e) => vec![Span::styled(
            e.to_string(),
            Style::default().fg(Color::Yellow),
        )],
    };

    if let Some(latest) = snapshot.latest() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("pit {:.1}°F", latest.pit_temp),
            Style::default().fg(PIT_COLOR),
        ));
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("meat {:.1}°F", latest.meat_temp),
            Style::default().fg(MEAT_COLOR),
        ));
    }

    Line::from(spans)
}

/// Builds the stage / error / key hint line
fn status_line(app: &App) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!("[{}]", app.stage.label()),
        Style::default().fg(Color::DarkGray),
    )];

    if let Some(snapshot) = &app.snapshot {
        spans.push(Span::styled(
            format!(" {}", snapshot.source),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(report) = &app.last_error {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            report.to_string(),
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }

    spans.push(Span::styled(
        "  r refresh  d duty  ? help  q quit",
        Style::default().fg(Color::DarkGray),
    ));

    Line::from(spans)
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let paragraph = Paragraph::new(vec![projection_line(app), status_line(app)]);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::config::{Config, FileConfig};
    use crate::data::{project_linear, LoadSource, ProjectionError, Reading};
    use crate::error::{ErrorKind, ErrorReport};
    use crate::pipeline::CycleStage;
    use chrono::Local;
    use clap::Parser;
    use ratatui::{backend::TestBackend, Terminal};

    fn reading(time: i64, meat_temp: f64) -> Reading {
        Reading {
            time,
            set_temp: 225.0,
            pit_temp: 230.0,
            meat_temp,
            duty_cycle: 0.35,
        }
    }

    fn test_app() -> App {
        let cli = Cli::parse_from(["pitwatch", "4115257", "--utc-offset", "0"]);
        let config = Config::merge(&cli, FileConfig::default(), "test").unwrap();
        App::new(&config)
    }

    fn snapshot_with(readings: Vec<Reading>) -> CookSnapshot {
        let projection = project_linear(&readings, 203.0, 0.0);
        CookSnapshot {
            cook_id: 4115257,
            readings,
            projection,
            target_temp: 203.0,
            last_updated: Local::now(),
            source: LoadSource::Remote,
        }
    }

    fn rising_snapshot() -> CookSnapshot {
        snapshot_with(vec![
            reading(1721390000, 100.0),
            reading(1721393600, 130.0),
            reading(1721397200, 160.0),
        ])
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn test_chart_data_includes_projection_overlay() {
        let data = ChartData::from_snapshot(&rising_snapshot());

        assert_eq!(data.meat_temp.len(), 3);
        assert_eq!(data.projection.len(), 2);
        assert_eq!(data.reference_points.len(), 3);
        assert_eq!(data.target.len(), 2);
        assert_eq!(data.target[0], (1721390000.0, 203.0));
        // Arrival extends the x range beyond the last sample
        assert!(data.x_bounds[1] > 1721397200.0);
        assert!(data.y_bounds[0] <= 100.0);
        assert!(data.y_bounds[1] >= 230.0);
    }

    #[test]
    fn test_chart_data_without_projection() {
        let snapshot = snapshot_with(vec![reading(0, 150.0), reading(60, 150.0)]);
        assert!(matches!(
            snapshot.projection,
            Err(ProjectionError::NoTemperatureTrend(_))
        ));

        let data = ChartData::from_snapshot(&snapshot);

        assert!(data.projection.is_empty());
        assert!(data.reference_points.is_empty());
        assert_eq!(data.target, vec![(0.0, 203.0), (60.0, 203.0)]);
    }

    #[test]
    fn test_chart_data_empty_series() {
        let data = ChartData::from_snapshot(&snapshot_with(Vec::new()));
        assert!(data.target.is_empty());
        assert!(data.x_bounds[0] < data.x_bounds[1]);
        assert!(data.y_bounds[0] < data.y_bounds[1]);
    }

    #[test]
    fn test_render_waiting_before_first_snapshot() {
        let app = test_app();
        let content = draw(&app);
        assert!(content.contains("Loading cook 4115257"));
    }

    #[test]
    fn test_render_title_and_legend() {
        let mut app = test_app();
        app.snapshot = Some(rising_snapshot());

        let content = draw(&app);

        assert!(content.contains("Cook 4115257"));
        assert!(content.contains("Updated at"));
        assert!(content.contains("meat temp"));
        assert!(content.contains("linear projection"));
    }

    #[test]
    fn test_render_projection_summary() {
        let mut app = test_app();
        app.snapshot = Some(rising_snapshot());

        let content = draw(&app);

        // 100°F -> 160°F over 2h puts 203°F at 15:19 UTC
        assert!(content.contains("203.00°F at 2024-07-19"), "{}", content);
    }

    #[test]
    fn test_render_falling_meat_marked_cooling() {
        let mut app = test_app();
        app.snapshot = Some(snapshot_with(vec![
            reading(1721390000, 180.0),
            reading(1721393600, 170.0),
        ]));

        let content = draw(&app);

        assert!(content.contains("(meat cooling)"), "{}", content);
    }

    #[test]
    fn test_render_shows_data_source() {
        let mut app = test_app();
        let mut snapshot = rising_snapshot();
        snapshot.source = LoadSource::Cache {
            age: std::time::Duration::from_secs(42),
        };
        app.snapshot = Some(snapshot);

        assert!(draw(&app).contains("from cache (42s old)"));
    }

    #[test]
    fn test_render_updated_time_uses_configured_offset() {
        let cli = Cli::parse_from(["pitwatch", "4115257", "--utc-offset", "-6"]);
        let app_config = Config::merge(&cli, FileConfig::default(), "test").unwrap();
        let mut app = App::new(&app_config);
        let mut snapshot = rising_snapshot();
        snapshot.last_updated = Local.timestamp_opt(1721414557, 0).unwrap();
        app.snapshot = Some(snapshot);

        let content = draw(&app);

        assert!(content.contains("Updated at 2024-07-19 12:42:37"), "{}", content);
    }

    #[test]
    fn test_render_projection_error_message() {
        let mut app = test_app();
        app.snapshot = Some(snapshot_with(vec![reading(0, 150.0), reading(60, 150.0)]));

        let content = draw(&app);

        assert!(content.contains("No temperature trend"));
    }

    #[test]
    fn test_render_error_banner() {
        let mut app = test_app();
        app.snapshot = Some(rising_snapshot());
        app.last_error = Some(ErrorReport::new(ErrorKind::Network, &"HTTP 503"));

        let content = draw(&app);

        assert!(content.contains("network error: HTTP 503"));
        assert!(content.contains("Cook 4115257"), "Old data stays visible");
    }

    #[test]
    fn test_render_duty_panel_toggle() {
        let mut app = test_app();
        app.snapshot = Some(rising_snapshot());
        assert!(draw(&app).contains("Fan duty cycle"));

        app.show_duty_cycle = false;
        assert!(!draw(&app).contains("Fan duty cycle"));
    }

    #[test]
    fn test_render_stage_label() {
        let mut app = test_app();
        app.stage = CycleStage::Fetching;
        assert!(draw(&app).contains("[fetching]"));
    }

    #[test]
    fn test_time_label_uses_offset() {
        let offset = FixedOffset::west_opt(6 * 3600).unwrap();
        assert_eq!(time_label(1721414557.0, &offset), "07/19 12:42");
    }
}
