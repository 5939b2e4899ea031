use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(action),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("s", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Enter", Style::default().fg(Color::Magenta)),
            Span::raw("   Start analysis"),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("x", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Esc", Style::default().fg(Color::Magenta)),
            Span::raw("     Stop analysis"),
        ]),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        Line::from(""),
        Line::from("Notifications stay visible for a few seconds, fade, then disappear."),
        Line::from("Timings and language can be set with flags or the config file:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(
                "forge-progress --help",
                Style::default().fg(Color::Cyan),
            ),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
