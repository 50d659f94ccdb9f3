use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Cell, Grid};
use crate::metrics::GameMetrics;
use crate::modes::PlaybackSpeed;
use crate::rl::{Episode, EpisodeStatus};

/// Everything drawn for one playback frame
pub struct PlaybackView<'a> {
    pub episode: &'a Episode,
    pub metrics: &'a GameMetrics,
    pub paused: bool,
    pub speed: PlaybackSpeed,
}

pub struct Renderer {
    cell_width: usize,
}

impl Renderer {
    pub fn new(cell_width: usize) -> Self {
        Self {
            cell_width: cell_width.max(1),
        }
    }

    pub fn render(&self, frame: &mut Frame, view: &PlaybackView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Grid
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(view), chunks[0]);
        frame.render_widget(self.render_grid(view), chunks[1]);
        frame.render_widget(self.render_controls(), chunks[2]);
    }

    /// One styled line per grid row
    pub fn grid_lines(&self, grid: &Grid) -> Vec<Line<'static>> {
        grid.rows()
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|&cell| self.cell_span(cell))
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    fn cell_span(&self, cell: Cell) -> Span<'static> {
        let (symbol, style) = match cell {
            Cell::Empty => ('.', Style::default().fg(Color::DarkGray)),
            Cell::Wall => ('#', Style::default().fg(Color::Gray).bg(Color::DarkGray)),
            Cell::Seeker => (
                'S',
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            Cell::Hider => (
                'H',
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        };
        Span::styled(format!("{:<width$}", symbol, width = self.cell_width), style)
    }

    fn render_grid(&self, view: &PlaybackView) -> Paragraph<'static> {
        let (title, border) = match view.episode.status() {
            EpisodeStatus::Running => (" Hide & Seek ", Color::White),
            EpisodeStatus::Caught => (" Seeker found the hider! ", Color::Red),
            EpisodeStatus::Truncated => (" Hider escaped ", Color::Green),
        };

        Paragraph::new(self.grid_lines(&view.episode.state().grid))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, view: &PlaybackView) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);
        let speed = if view.paused {
            "Paused".to_string()
        } else {
            view.speed.as_str().to_string()
        };

        let fastest = match view.metrics.fastest_catch {
            Some(steps) => format!(" (best {})", steps),
            None => String::new(),
        };

        let text = vec![Line::from(vec![
            Span::styled("Turn: ", label),
            Span::styled(
                view.episode.steps().to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Episodes: ", label),
            Span::styled(view.metrics.episodes_played.to_string(), value),
            Span::raw("    "),
            Span::styled("Caught: ", label),
            Span::styled(view.metrics.catches.to_string(), value),
            Span::styled(fastest, value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(view.metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Speed: ", label),
            Span::styled(speed, value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" new layout | "),
            Span::styled("1-4", Style::default().fg(Color::Cyan)),
            Span::raw(" speed | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameState, Position};
    use ratatui::{Terminal, backend::TestBackend};

    fn episode() -> Episode {
        let layout = GameState::with_layout(
            4,
            &[Position::new(1, 1)],
            Position::new(0, 0),
            Position::new(3, 3),
        )
        .unwrap();
        Episode::new(layout, &GameConfig::open(4))
    }

    #[test]
    fn test_grid_lines() {
        let renderer = Renderer::new(2);
        let episode = episode();
        let lines = renderer.grid_lines(&episode.state().grid);

        assert_eq!(lines.len(), 4);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(first, "S . . . ");
        let second: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(second, ". # . . ");
    }

    #[test]
    fn test_render_frame() {
        let renderer = Renderer::default();
        let episode = episode();
        let metrics = GameMetrics::new();
        let view = PlaybackView {
            episode: &episode,
            metrics: &metrics,
            paused: true,
            speed: PlaybackSpeed::Normal,
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 16)).unwrap();
        terminal.draw(|frame| renderer.render(frame, &view)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Hide & Seek"));
        assert!(text.contains("Paused"));
        assert!(text.contains('S'));
        assert!(text.contains('H'));
    }
}
