use std::{
    error::Error,
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    config::{self, Settings},
    core::Simulation,
    render::{self, Board, ColorId, FrameBuffer},
    reveal::RevealSchedule,
    surface::Container,
    types::ElementId,
};

pub fn run(labels: Vec<String>, settings: Settings) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, labels, settings);
    shutdown_terminal(&mut terminal)?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    labels: Vec<String>,
    settings: Settings,
) -> Result<(), Box<dyn Error>> {
    let mut board = Board::new(&labels);
    let area = terminal.size()?;
    let (cols, rows) = viewport_cells(area.width, area.height);
    board.set_viewport(cols, rows);

    let elements: Vec<ElementId> = board.elements().collect();
    let mut sim = Simulation::spawn(elements, board.bounds(), &board, settings);

    let mut reveal = RevealSchedule::from_settings(sim.bodies().len(), &settings);
    for (idx, body) in sim.bodies().iter().enumerate() {
        board.set_visible(body.element(), reveal.is_visible(idx));
    }
    sim.sync(&mut board);
    info!(
        "session started: {} boxes in {}x{} cells",
        sim.bodies().len(),
        cols,
        rows
    );

    let mut ui_state = UiState::new();
    let frame_interval = Duration::from_secs_f32(1.0 / config::FRAME_HZ);
    let started = Instant::now();
    let mut last_frame = Instant::now();
    let mut frame_counter = 0_u32;
    let mut last_fps_sample = Instant::now();
    let mut fps = 0.0_f32;

    while sim.is_active() {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        sim.stop();
                    }
                }
                CrosstermEvent::Resize(width, height) => {
                    let (cols, rows) = viewport_cells(width, height);
                    debug!("viewport resized to {cols}x{rows} cells");
                    board.set_viewport(cols, rows);
                }
                _ => {}
            }
        }

        if last_frame.elapsed() < frame_interval {
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }
        last_frame = Instant::now();

        if !reveal.is_done() {
            let shown = reveal.advance(started.elapsed());
            for idx in shown {
                board.set_visible(sim.bodies()[idx].element(), true);
            }
        }

        if sim.tick(&board, &board).is_none() {
            break;
        }
        sim.sync(&mut board);
        frame_counter += 1;

        if last_fps_sample.elapsed() >= Duration::from_secs(1) {
            fps = frame_counter as f32 / last_fps_sample.elapsed().as_secs_f32();
            frame_counter = 0;
            last_fps_sample = Instant::now();
        }

        let stats = sim.stats();
        let report = sim.last_report();
        terminal.draw(|frame| {
            let size = frame.size();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(3),
                    Constraint::Length(3),
                ])
                .split(size);

            let header = Paragraph::new(format!(
                "frame: {} | boxes: {}/{} | overlapping: {} | pushes: {} | clamped: {} | fps: {:.1}",
                stats.frame,
                board.visible_count(),
                stats.bodies,
                stats.overlapping_pairs,
                report.pushes,
                report.clamped,
                fps
            ))
            .block(Block::default().borders(Borders::ALL).title("toybox"));
            frame.render_widget(header, chunks[0]);

            render::draw(&board, &mut ui_state.framebuf);
            let viewport = Paragraph::new(ui_state.lines())
                .block(Block::default().borders(Borders::ALL).title("Surface"));
            frame.render_widget(viewport, chunks[1]);

            let footer = Paragraph::new(format!(
                "push: {:.1} | scatter: {:.0} | q: quit",
                settings.push_speed, settings.scatter_radius
            ))
            .block(Block::default().borders(Borders::ALL).title("Controls"));
            frame.render_widget(footer, chunks[2]);
        })?;
    }

    info!("session ended after {} frames", sim.frame());
    Ok(())
}

/// Cells inside the bordered middle pane for a terminal of the given size.
fn viewport_cells(width: u16, height: u16) -> (u16, u16) {
    (width.saturating_sub(2), height.saturating_sub(3 + 3 + 2))
}

fn shutdown_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

struct UiState {
    framebuf: FrameBuffer,
}

impl UiState {
    fn new() -> Self {
        Self {
            framebuf: FrameBuffer::new(0, 0),
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let framebuf = &self.framebuf;
        (0..framebuf.height())
            .map(|y| {
                let spans: Vec<Span> = (0..framebuf.width())
                    .map(|x| {
                        let cell = framebuf.get(x, y);
                        Span::styled(cell.ch.to_string(), Style::default().fg(color_for(cell.color)))
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn color_for(color: ColorId) -> Color {
    match color {
        ColorId::White => Color::White,
        ColorId::Border => Color::Cyan,
        ColorId::Raised => Color::Yellow,
        ColorId::Trail => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_excludes_header_footer_and_borders() {
        assert_eq!(viewport_cells(80, 24), (78, 16));
    }

    #[test]
    fn tiny_terminal_saturates_to_zero() {
        assert_eq!(viewport_cells(1, 4), (0, 0));
    }

    #[test]
    fn empty_framebuffer_has_no_lines() {
        assert!(UiState::new().lines().is_empty());
    }
}
