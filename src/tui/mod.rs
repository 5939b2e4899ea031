mod help;
mod state;

use crate::cli::Cli;
use crate::config::Settings;
use crate::model::ProgressEvent;
use crate::orchestrator::{self, UiCommand};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{notification_line, UiState};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli, settings: Settings) -> Result<()> {
    // Unbounded channels avoid backpressure and task switching in the hot path.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_settings = settings.clone();
    let ui_handle = std::thread::spawn(move || run_threaded(ui_settings, event_rx, cmd_tx));

    let res = orchestrator::run_controller(&settings, args.auto_start, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
pub fn run_threaded(
    settings: Settings,
    mut event_rx: UnboundedReceiver<ProgressEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::new(&settings);

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            state.apply_event(ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char('s')) | (_, KeyCode::Enter) => {
                        let _ = cmd_tx.send(UiCommand::Start);
                    }
                    (_, KeyCode::Char('x')) | (_, KeyCode::Esc) => {
                        let _ = cmd_tx.send(UiCommand::Stop);
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % 2;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = 1;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Dashboard"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("forge-progress"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        0 => draw_dashboard(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_dashboard(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Progress gauge
                Constraint::Length(3), // Phase / outcome
                Constraint::Min(0),    // Results + notifications (side-by-side)
                Constraint::Length(3), // Status row
            ]
            .as_ref(),
        )
        .split(area);

    let gauge_color = match (state.running, state.last_report.is_some()) {
        (_, true) => Color::Green,
        (true, false) => Color::Cyan,
        (false, false) if state.last_stop.is_some() => Color::Yellow,
        (false, false) => Color::DarkGray,
    };
    let gauge_title = match state.run_started_at.as_deref() {
        Some(ts) => format!("Analysis progress (started {ts})"),
        None => "Analysis progress".to_string(),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(gauge_title))
        .gauge_style(Style::default().fg(gauge_color))
        .percent(u16::from(state.progress.min(100)))
        .label(format!("{}%", state.progress));
    f.render_widget(gauge, main[0]);

    let phase = Paragraph::new(Line::from(Span::styled(
        state.status_text(),
        Style::default().fg(gauge_color),
    )))
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(phase, main[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(main[2]);

    draw_results(body[0], f, state);
    draw_notifications(body[1], f, state);

    let status = Paragraph::new(Line::from(vec![
        Span::styled("Info: ", Style::default().fg(Color::Gray)),
        Span::raw(state.info.clone()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("s start · x stop · ? help · q quit"),
    );
    f.render_widget(status, main[3]);
}

fn draw_results(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let lines: Vec<Line> = if let Some(report) = state.last_report.as_ref() {
        crate::text_summary::build_text_summary(report, &state.sim)
            .lines
            .into_iter()
            .map(Line::from)
            .collect()
    } else if let Some((progress, ticks)) = state.last_stop {
        vec![Line::from(state.locale.stopped_after(progress, ticks))]
    } else {
        vec![Line::from(Span::styled(
            state.locale.no_results(),
            Style::default().fg(Color::DarkGray),
        ))]
    };
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Results"));
    f.render_widget(p, area);
}

fn draw_notifications(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let entries = state.notifications.snapshot();
    // Newest at the bottom; keep the tail when the panel is too short.
    let visible_rows = area.height.saturating_sub(2) as usize;
    let skip = entries.len().saturating_sub(visible_rows);
    let items: Vec<ListItem> = entries
        .iter()
        .skip(skip)
        .map(|e| ListItem::new(notification_line(e)))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Notifications ({})", entries.len())),
    );
    f.render_widget(list, area);
}
