use crate::app::{App, ChartPanel, PanelStatus};
use crate::ui::widgets::popup::Popup;
use crate::ui::widgets::radial::{chart_area, render_radial, series_color, RadialView};
use monsoon_radial::tooltip::DISPLAY_SCALE;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use tachyonfx::EffectRenderer;
use throbber_widgets_tui::{Throbber, BRAILLE_SIX};

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let main_layout = build_main_layout(f);

    render_title_section(app, f, main_layout[0]);
    render_content_section(app, f, main_layout[1]);
    render_scrubber(app, f, main_layout[2]);
    render_status_section(app, f, main_layout[3]);
    render_shortcuts(f, main_layout[4]);

    if app.show_help {
        render_help_popup(f, main_layout[1]);
    }
}

fn build_main_layout(f: &Frame<'_>) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Chart tabs
            Constraint::Min(8),    // Chart and side panel
            Constraint::Length(3), // Year scrubber
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(2, 1)))
        .to_vec()
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = app
        .panels
        .iter()
        .enumerate()
        .map(|(index, panel)| TextLine::from(format!("{} {}", index + 1, panel.title())))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title("== Monsoon Radial ==")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .select(app.selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(panel) = app.selected_panel() else {
        return;
    };

    let horizontal_split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let chart_block = Block::default()
        .title(format!(" {} ", panel.title()))
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let chart_inner = chart_block.inner(horizontal_split[0]);
    f.render_widget(chart_block, horizontal_split[0]);

    match &panel.status {
        PanelStatus::Loading => render_loading(app, panel, f, chart_inner),
        PanelStatus::Failed(error) => render_message(
            f,
            chart_inner,
            &format!("Could not load chart data: {error}"),
            Color::Red,
        ),
        PanelStatus::Empty => render_message(
            f,
            chart_inner,
            "No valid rows in the configured CSV files",
            Color::Gray,
        ),
        PanelStatus::Ready => render_chart(app, panel, f, chart_inner),
    }

    render_side_panel(panel, f, horizontal_split[1]);
}

fn render_loading(app: &App, panel: &ChartPanel, f: &mut Frame<'_>, area: Rect) {
    let files = panel
        .chart
        .config()
        .series
        .iter()
        .map(|series| series.csv_file.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let throbber = Throbber::default()
        .label(format!("Loading {files}..."))
        .style(Style::default().fg(Color::Gray))
        .throbber_style(Style::default().fg(Color::Cyan))
        .throbber_set(BRAILLE_SIX);

    let line = Rect {
        x: area.x + 1,
        y: area.y + area.height / 2,
        width: area.width.saturating_sub(2),
        height: 1.min(area.height),
    };
    let mut state = app.throbber.clone();
    f.render_stateful_widget(throbber, line, &mut state);
}

fn render_message(f: &mut Frame<'_>, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_chart(app: &App, panel: &ChartPanel, f: &mut Frame<'_>, area: Rect) {
    let (Some(axes), Some(frame)) = (panel.chart.axes(), panel.frame()) else {
        return;
    };

    let view = RadialView {
        geometry: panel.chart.geometry(),
        axes,
        frame: &frame,
        entrance: panel.chart.entrance().frame_at(app.now()),
        cursor: panel.month_cursor,
    };
    render_radial(f, area, &view);

    if let Ok(mut effect) = panel.fill_fx.lock() {
        if let Some(effect) = effect.as_mut() {
            let buffer = f.buffer_mut();
            buffer.render_effect(effect, chart_area(area, view.geometry), app.last_tick);
        }
    }
}

fn render_side_panel(panel: &ChartPanel, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let label_style = Style::default().fg(Color::Gray);
    let value_style = Style::default().fg(Color::Yellow);
    let timeline = panel.chart.timeline();

    let mut lines = vec![
        info_line(
            "Year",
            &timeline
                .current_year()
                .map_or_else(|| "-".to_string(), |year| year.to_string()),
            label_style,
            value_style.add_modifier(Modifier::BOLD),
        ),
        info_line(
            "Control",
            timeline.state().button_label(),
            label_style,
            value_style,
        ),
        info_line(
            "Peak",
            &format!("{:.2} mm/day", panel.chart.data().global_max() * DISPLAY_SCALE),
            label_style,
            value_style,
        ),
        TextLine::from(""),
        TextLine::from(Span::styled(
            "Series",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    for (index, series) in panel.chart.config().series.iter().enumerate() {
        let mut spans = vec![
            Span::styled("■ ", Style::default().fg(series_color(index))),
            Span::raw(series.csv_file.clone()),
        ];
        if let Some(report) = panel.reports.get(index) {
            spans.push(Span::styled(
                format!(" ({} rows, {} skipped)", report.accepted, report.discarded),
                label_style,
            ));
        }
        lines.push(TextLine::from(spans));
    }

    let tooltips = panel.tooltips();
    if !tooltips.is_empty() {
        lines.push(TextLine::from(""));
        lines.push(TextLine::from(Span::styled(
            "Tooltip",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for (index, text) in tooltips.into_iter().enumerate() {
            lines.push(TextLine::from(Span::styled(
                text,
                Style::default().fg(series_color(index)),
            )));
        }
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_scrubber(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(panel) = app.selected_panel() else {
        return;
    };
    let timeline = panel.chart.timeline();

    let label = match (timeline.first_year(), timeline.current_year(), timeline.last_year()) {
        (Some(first), Some(current), Some(last)) => format!("{first} ◂ {current} ▸ {last}"),
        _ => "no years".to_string(),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" Year ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .gauge_style(Style::default().fg(Color::Blue).bg(Color::Black))
        .ratio(timeline.progress().clamp(0.0, 1.0))
        .label(label);

    f.render_widget(gauge, area);
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status_text = if app.status_message.is_empty() {
        Text::from(Span::styled(
            match app.clock_mode {
                monsoon_radial::entrance::ClockMode::Paused => "Animation paused",
                monsoon_radial::entrance::ClockMode::Running => "",
            },
            Style::default().fg(Color::Gray),
        ))
    } else {
        let style = if app.status_message.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        Text::from(Span::styled(&app.status_message, style))
    };

    let status_paragraph = Paragraph::new(status_text)
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let shortcuts = shortcuts_line();
    let shortcuts_paragraph = Paragraph::new(shortcuts).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

fn info_line<'a>(
    label: &'a str,
    value: &str,
    label_style: Style,
    value_style: Style,
) -> TextLine<'a> {
    TextLine::from(vec![
        Span::styled(format!("{label}: "), label_style),
        Span::styled(value.to_string(), value_style),
    ])
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn shortcuts_line() -> TextLine<'static> {
    let hint = Style::default().fg(Color::Gray);
    TextLine::from(vec![
        key_span("?"),
        Span::styled(": Help | ", hint),
        key_span("Space"),
        Span::styled(": Play/Pause | ", hint),
        key_span("←/→"),
        Span::styled(": Year | ", hint),
        key_span("↑/↓"),
        Span::styled(": Month | ", hint),
        key_span("Tab"),
        Span::styled(": Chart | ", hint),
        key_span("q"),
        Span::styled(": Quit", hint),
    ])
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup = Popup::new("== Help & Keyboard Shortcuts ==", Text::from(build_help_lines()))
        .hint("Press ? or Esc to close");
    f.render_widget(popup, area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let shortcut = |key: &'static str, text: &'static str| {
        TextLine::from(vec![
            Span::styled(
                format!("  {key}"),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" - {text}")),
        ])
    };

    vec![
        TextLine::from(vec![Span::styled(
            "Monsoon Radial",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        TextLine::from(""),
        TextLine::from(
            "Each year of monthly precipitation is drawn as a closed outline around twelve month spokes. The radius scale is shared by every year and series of a chart.",
        ),
        TextLine::from(""),
        TextLine::from(vec![Span::styled(
            "Keyboard Shortcuts:",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        shortcut("Space", "Play or pause the year animation"),
        shortcut("Left/Right", "Previous or next year (stops playback)"),
        shortcut("Home/End", "First or last year"),
        shortcut("Up/Down", "Move the month tooltip"),
        shortcut("Tab/1-9", "Switch chart"),
        shortcut("r", "Replay the entrance animation"),
        shortcut("?", "Toggle this help popup"),
        shortcut("q/Esc", "Quit"),
    ]
}
