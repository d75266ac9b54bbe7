use std::env;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use props_terminal::provider;
use props_terminal::state::{
    apply_delta, AppState, Delta, Pane, ProviderCommand, ResultsModal, ResultsView, StatusStyle,
};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(state: AppState, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        // Alerts block everything; any key dismisses.
        if self.state.alert.is_some() {
            self.state.alert = None;
            return;
        }

        if self.state.results.is_some() {
            self.on_modal_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.state.focus_next(),
            KeyCode::BackTab => self.state.focus_prev(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_current(),
            KeyCode::Char('s') => self.submit(),
            KeyCode::Char('v') => self.view_results(),
            KeyCode::Char('d') => self.download_selected(),
            _ => {}
        }
    }

    fn on_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = &mut self.state.results else {
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('b') => {
                self.state.results = None;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                let max = modal.rows.len().saturating_sub(1).min(u16::MAX as usize) as u16;
                modal.scroll = modal.scroll.saturating_add(1).min(max);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                modal.scroll = modal.scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn toggle_current(&mut self) {
        match self.state.focus {
            Pane::Leagues => self.state.toggle_league(),
            Pane::Statistics => self.state.choose_statistic(),
            Pane::Jobs => self.view_results(),
        }
    }

    fn submit(&mut self) {
        // Submit control stays disabled while a start request is in flight.
        if self.state.submitting {
            return;
        }
        let request = match self.state.submission() {
            Ok(request) => request,
            Err(message) => {
                self.state.alert = Some(message.to_string());
                return;
            }
        };
        self.state.submitting = true;
        let sent = self.cmd_tx.send(ProviderCommand::StartScrape {
            leagues: request.leagues,
            statistic: request.statistic,
        });
        if sent.is_err() {
            self.state.submitting = false;
            self.state.alert = Some("An error occurred while starting the scrape".to_string());
        }
    }

    fn view_results(&mut self) {
        let Some(filename) = self
            .state
            .selected_job()
            .and_then(|job| job.output_file.clone())
        else {
            return;
        };
        let _ = self.cmd_tx.send(ProviderCommand::FetchResults { filename });
    }

    fn download_selected(&mut self) {
        let Some(filename) = self
            .state
            .selected_job()
            .and_then(|job| job.output_file.clone())
        else {
            return;
        };
        let _ = self.cmd_tx.send(ProviderCommand::DownloadCsv { filename });
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let base_url = env::var("SCRAPER_API_URL")
        .ok()
        .map(|val| val.trim().trim_end_matches('/').to_string())
        .filter(|val| !val.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    provider::spawn_provider(base_url.clone(), tx, cmd_rx);

    let mut app = App::new(AppState::new(base_url), cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(8)])
        .split(chunks[1]);

    let form = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Min(30),
        ])
        .split(body[0]);

    render_leagues(frame, form[0], &app.state);
    render_statistics(frame, form[1], &app.state);
    render_jobs(frame, form[2], &app.state);
    render_console(frame, body[1], &app.state);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if let Some(modal) = &app.state.results {
        render_results_modal(frame, area, modal);
    }
    if let Some(message) = &app.state.alert {
        render_alert(frame, area, message);
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = "  PROP SCRAPER TERMINAL".to_string();
    let line2 = format!("  Server: {}", state.base_url);
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.alert.is_some() {
        return "Any key to dismiss".to_string();
    }
    if state.results.is_some() {
        return "Esc/b Close | j/k/↑/↓ Scroll".to_string();
    }
    let keys =
        "Tab Pane | j/k/↑/↓ Move | Space Toggle | s Start scrape | v View results | d Download CSV | q Quit";
    if state.submitting {
        format!("Starting... | {keys}")
    } else {
        keys.to_string()
    }
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_leagues(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Pane::Leagues;
    let block = pane_block("Leagues", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let options = state.league_options();
    if options.is_empty() {
        let empty = Paragraph::new("No leagues loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.league_cursor, options.len(), visible);
    let mut lines: Vec<Line> = Vec::with_capacity(end - start);
    for (idx, (name, checked)) in options.iter().enumerate().take(end).skip(start) {
        let marker = if *checked { "[x]" } else { "[ ]" };
        let mut style = Style::default();
        if focused && idx == state.league_cursor {
            style = style.fg(Color::White).bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(format!("{marker} {name}"), style)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_statistics(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Pane::Statistics;
    let block = pane_block("Statistics", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let options = state.statistic_options();
    if options.is_empty() {
        let empty =
            Paragraph::new("No statistics loaded").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(state.statistic_cursor, options.len(), visible);
    let mut lines: Vec<Line> = Vec::with_capacity(end - start);
    for (idx, (name, checked)) in options.iter().enumerate().take(end).skip(start) {
        let marker = if *checked { "(x)" } else { "( )" };
        let mut style = Style::default();
        if focused && idx == state.statistic_cursor {
            style = style.fg(Color::White).bg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(format!("{marker} {name}"), style)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_jobs(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Pane::Jobs;
    let block = pane_block("Jobs", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = state.job_rows();
    if rows.is_empty() {
        let empty = Paragraph::new("No active jobs.").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_line = 0usize;
    for (idx, row) in rows.iter().enumerate() {
        let selected = focused && idx == state.job_cursor;
        if idx == state.job_cursor {
            cursor_line = lines.len();
        }
        let prefix = if selected { "▸ " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw(prefix),
            Span::styled(
                format!("Job {}", row.id),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("[{}]", row.status_label), status_text_style(row.style)),
        ]));
        lines.push(Line::raw(format!("    Leagues: {}", row.leagues)));
        lines.push(Line::raw(format!("    Statistic: {}", row.statistic)));
        if let Some(file) = &row.output_file {
            lines.push(Line::raw(format!("    Results: {file}  (v view, d download)")));
            if let Some(url) = &row.download_url {
                lines.push(Line::styled(
                    format!("    {url}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
        }
        if let Some(error) = &row.error {
            lines.push(Line::styled(
                format!("    Error: {error}"),
                Style::default().fg(Color::Red),
            ));
        }
        lines.push(Line::raw(""));
    }

    // Keep the selected job's first line inside the pane.
    let height = inner.height as usize;
    let offset = if height == 0 || cursor_line < height {
        0
    } else {
        (cursor_line + 1 - height).min(u16::MAX as usize)
    };
    frame.render_widget(Paragraph::new(lines).scroll((offset as u16, 0)), inner);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title("Console")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let text = state
        .logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n");
    let console = Paragraph::new(text).style(Style::default().fg(Color::Gray));
    frame.render_widget(console, inner);
}

fn results_columns() -> [Constraint; 6] {
    [
        Constraint::Min(16),
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(8),
    ]
}

fn render_results_modal(frame: &mut Frame, area: Rect, modal: &ResultsModal) {
    let popup = centered_rect(84, 70, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!(" Results: {} ", modal.filename))
        .borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let widths = results_columns();
    render_results_header(frame, sections[0], &widths);

    match modal.view() {
        ResultsView::Placeholder(text) => {
            let placeholder = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(placeholder, sections[1]);
        }
        ResultsView::Rows(rows) => {
            let list_area = sections[1];
            let visible = list_area.height as usize;
            let start = (modal.scroll as usize).min(rows.len().saturating_sub(1));
            let end = (start + visible).min(rows.len());
            for (i, row) in rows.iter().enumerate().take(end).skip(start) {
                let row_area = Rect {
                    x: list_area.x,
                    y: list_area.y + (i - start) as u16,
                    width: list_area.width,
                    height: 1,
                };
                let cols = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints(widths)
                    .split(row_area);
                render_cell_text(frame, cols[0], &row.game, Style::default());
                render_cell_text(frame, cols[1], &row.player, Style::default());
                render_cell_text(frame, cols[2], &row.team, Style::default());
                render_cell_text(frame, cols[3], &row.statistic, Style::default());
                render_cell_text(frame, cols[4], &row.value, Style::default());
                render_cell_text(frame, cols[5], &row.odds, Style::default());
            }
        }
    }

    let footer = Paragraph::new(format!("Download: {}", modal.download_url))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, sections[2]);
}

fn render_results_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Game", style);
    render_cell_text(frame, cols[1], "Player", style);
    render_cell_text(frame, cols[2], "Team", style);
    render_cell_text(frame, cols[3], "Statistic", style);
    render_cell_text(frame, cols[4], "Value", style);
    render_cell_text(frame, cols[5], "Odds", style);
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(50, 24, area);
    frame.render_widget(Clear, popup);
    let text = format!("{message}\n\nPress any key to continue");
    let alert = Paragraph::new(text)
        .block(Block::default().title("Alert").borders(Borders::ALL))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(alert, popup);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn status_text_style(style: StatusStyle) -> Style {
    match style {
        StatusStyle::Running => Style::default().fg(Color::Yellow),
        StatusStyle::Completed => Style::default().fg(Color::Green),
        StatusStyle::Failed => Style::default().fg(Color::Red),
        StatusStyle::None => Style::default(),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if visible == 0 || total == 0 {
        return (0, 0);
    }
    let start = if selected >= visible {
        selected + 1 - visible
    } else {
        0
    };
    let end = (start + visible).min(total);
    (start, end)
}
