//! Main UI layout and rendering
//!
//! Composes the heatmap, the side panel and the status bar

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::app::{App, StatusLevel};
use super::heatmap::Heatmap;
use crate::region::CutMode;

/// Draw the complete UI
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Main layout: header, body, footer
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header/title
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Status/help bar
        ])
        .split(area);

    render_header(frame, main_layout[0], app);
    render_body(frame, main_layout[1], app);
    render_footer(frame, main_layout[2], app);

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let output = app
        .engine
        .output_path()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let title = Paragraph::new(format!("gridcut - cuts saved to {}", output))
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, area);
}

fn render_body(frame: &mut Frame, area: Rect, app: &mut App) {
    let body_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
        .split(area);

    render_heatmap(frame, body_layout[0], app);
    render_side_panel(frame, body_layout[1], app);
}

fn render_heatmap(frame: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.engine.current_mode() {
        Some(mode) => format!(" {} [{}] ", app.display.name(), mode),
        None => format!(" {} ", app.display.name()),
    };
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).bold())
        .borders(Borders::ALL)
        .border_style(if app.engine.current_mode().is_some() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Store heatmap area for mouse to data conversion
    app.surface.set_area(inner);

    let marker = app.pointer.and_then(|pointer| app.surface.to_cell(pointer));
    let heatmap = Heatmap::new(&app.display, &app.cut_mask, app.surface.view())
        .preview(app.surface.preview())
        .marker(marker);
    frame.render_widget(heatmap, inner);
}

fn render_side_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Cuts ")
        .title_style(Style::default().fg(Color::Cyan).bold())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let store = app.engine.store();
    let mut lines: Vec<Line> = vec![];

    let current = app.engine.current_mode();
    lines.push(Line::from(Span::styled(
        format!("[0] off{}", if current.is_none() { "  <" } else { "" }),
        if current.is_none() {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        },
    )));
    for mode in CutMode::ALL {
        let is_current = current == Some(mode);
        let style = if is_current {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        };
        let mut spans = vec![
            Span::styled(format!("[{}] {:<18}", mode.key(), mode.label()), style),
            Span::styled(
                format!("{:>3}", store.count(mode)),
                Style::default().fg(Color::Cyan),
            ),
        ];
        if store.has_pending(mode) {
            spans.push(Span::styled(
                format!(" {}", app.spinner()),
                Style::default().fg(Color::Magenta),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let registry = app.engine.registry();
    lines.push(Line::from(vec![
        Span::styled("Grid: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!(
                "{} ({}/{})",
                app.display.name(),
                app.surface.displayed_grid() + 1,
                registry.len()
            ),
            Style::default().fg(Color::White),
        ),
    ]));
    let binning = app.display.binning();
    lines.push(Line::from(Span::styled(
        format!(
            "X: {} bins [{}, {}]",
            binning.x.nbins(),
            binning.x.low(),
            binning.x.high()
        ),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "Y: {} bins [{}, {}]",
            binning.y.nbins(),
            binning.y.low(),
            binning.y.high()
        ),
        Style::default().fg(Color::DarkGray),
    )));
    let lost_style = if app.data_lost > 0.5 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    lines.push(Line::from(vec![
        Span::styled("Data lost: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:.2}%", 100.0 * app.data_lost), lost_style),
    ]));
    if app.engine.has_file_mask() {
        lines.push(Line::from(Span::styled(
            "Loaded mask applied",
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }

    if let Some(pointer) = app.pointer {
        lines.push(Line::from(""));
        let bin = match (binning.x.find_bin(pointer.x), binning.y.find_bin(pointer.y)) {
            (Some(ix), Some(iy)) => format!(" bin ({}, {})", ix, iy),
            _ => String::new(),
        };
        lines.push(Line::from(Span::styled(
            format!("x={:.4} y={:.4}{}", pointer.x, pointer.y, bin),
            Style::default().fg(Color::White),
        )));
    }
    if app.surface.is_zoomed() {
        lines.push(Line::from(Span::styled(
            "zoomed (r: reset)",
            Style::default().fg(Color::Yellow),
        )));
    }

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let content = if let Some(ref msg) = app.status_message {
        let style = match msg.level {
            StatusLevel::Info => Style::default().fg(Color::White),
            StatusLevel::Warning => Style::default().fg(Color::Yellow),
            StatusLevel::Error => Style::default().fg(Color::Red),
            StatusLevel::Success => Style::default().fg(Color::Green),
        };
        Paragraph::new(msg.text.as_str())
            .style(style)
            .wrap(Wrap { trim: true })
    } else {
        Paragraph::new("0-6: mode | click: point | u: undo | s: next grid | p: save | ?: help")
            .style(Style::default().fg(Color::DarkGray))
    };

    let block = Block::default().borders(Borders::TOP);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(content.alignment(Alignment::Center), inner);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_width = 56u16;
    let popup_height = 24u16;
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(
        popup_x,
        popup_y,
        popup_width.min(area.width),
        popup_height.min(area.height),
    );

    frame.render_widget(Clear, popup_area);

    let help_text = r#"
 gridcut - Keyboard & Mouse

 MODES
   0                No mode (clicks are ignored)
   1                Rectangle
   2                X band
   3                Y band
   4                Inverse rectangle (keep inside)
   5                Angled band (two lines)
   6                Single bin

 MOUSE
   Click            Place a point of the current mode
   Scroll wheel     Zoom in / out

 OTHER
   u                Undo last point or region of the mode
   s                Show next grid
   r                Reset zoom
   p                Save cuts to the output file
   ? / F1           Toggle this help
   q                Quit
"#;

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .title(" Help ")
                .title_style(Style::default().fg(Color::Cyan).bold())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(help, popup_area);
}
