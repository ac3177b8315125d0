// Terminal Module - Live view of the sketch in the terminal using half-block cells
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use ratatui::Terminal;
use std::io;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::animation::AnimationController;
use crate::config::{Args, SketchConfig};
use crate::palettes::PaletteCatalog;
use crate::policy::RandomPolicy;
use crate::raster::Raster;
use crate::types::{ModeExitReason, Rgba};

/// Draws a raster with one '▀' per cell: foreground is the upper pixel, background the lower.
/// Each of those pixels is the average of a `supersample` x `supersample` raster block.
pub struct HalfBlockCanvas<'a> {
    raster: &'a Raster,
    supersample: u32,
}

impl<'a> HalfBlockCanvas<'a> {
    pub fn new(raster: &'a Raster, supersample: u32) -> Self {
        HalfBlockCanvas { raster, supersample: supersample.max(1) }
    }
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

impl Widget for HalfBlockCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let ss = self.supersample;
        for row in 0..area.height {
            for col in 0..area.width {
                let px = col as u32 * ss;
                let py = row as u32 * 2 * ss;
                let top = self.raster.average(px, py, ss, ss);
                let bottom = self.raster.average(px, py + ss, ss, ss);
                buf.get_mut(area.x + col, area.y + row)
                    .set_char('▀')
                    .set_fg(to_color(top))
                    .set_bg(to_color(bottom));
            }
        }
    }
}

// Header, canvas, footer
fn split_screen(full: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Canvas
            Constraint::Length(3), // Footer
        ])
        .split(full);
    [chunks[0], chunks[1], chunks[2]]
}

/// Raster size for a canvas area
pub fn canvas_pixels(area: Rect, supersample: u32) -> (u32, u32) {
    let ss = supersample.max(1);
    ((area.width as u32 * ss).max(1), (area.height as u32 * 2 * ss).max(1))
}

pub fn run_live_mode(
    config: &SketchConfig,
    args: &Args,
    catalog: PaletteCatalog,
    config_change_rx: Receiver<()>,
) -> Result<ModeExitReason> {
    // Setup terminal for TUI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    terminal.hide_cursor()?;

    let result = live_loop(&mut terminal, config, args, catalog, config_change_rx);

    // Restore the terminal whatever happened inside the loop
    let restored = restore_terminal(&mut terminal);
    let exit = result?;
    restored?;
    Ok(exit)
}

// Every step runs even if an earlier one failed; the first error is returned
fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> Result<()> {
    let raw = disable_raw_mode();
    let screen = terminal.backend_mut().execute(LeaveAlternateScreen).map(|_| ());
    let cursor = terminal.show_cursor();
    raw?;
    screen?;
    cursor?;
    Ok(())
}

fn live_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &SketchConfig,
    args: &Args,
    catalog: PaletteCatalog,
    config_change_rx: Receiver<()>,
) -> Result<ModeExitReason> {
    let mut current_config = config.clone();
    let mut supersample = current_config.supersample;

    let mut canvas_area = split_screen(terminal.size()?)[1];
    let (w, h) = canvas_pixels(canvas_area, supersample);
    let mut raster = Raster::new(w, h);
    let mut controller = AnimationController::new(
        w as f64,
        h as f64,
        &current_config.scene_settings()?,
        catalog,
        Box::new(RandomPolicy::new(current_config.seed)),
    );

    // Frame timing
    let mut frame_duration = Duration::from_secs_f64(1.0 / current_config.fps);
    let mut last_frame = Instant::now();
    let mut frame_count = 0u64;
    let mut fps_timer = Instant::now();
    let mut actual_fps = 0.0;
    let mut status = String::new();

    loop {
        let loop_start = Instant::now();

        // Check for keyboard and resize input
        if event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(ModeExitReason::UserQuit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(ModeExitReason::UserQuit);
                    }
                    KeyCode::Char(c) => {
                        controller.handle_key(c);
                    }
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    let area = split_screen(Rect::new(0, 0, cols, rows))[1];
                    if area != canvas_area {
                        canvas_area = area;
                        let (w, h) = canvas_pixels(area, supersample);
                        raster.resize(w, h);
                        controller.resize(w as f64, h as f64);
                    }
                }
                _ => {}
            }
        }

        // Check for config changes
        if config_change_rx.try_recv().is_ok() {
            match reload_config(&current_config, args) {
                Ok(new_config) => {
                    if new_config.fps != current_config.fps {
                        frame_duration = Duration::from_secs_f64(1.0 / new_config.fps);
                    }
                    if let Ok(color) = new_config.background() {
                        controller.set_background(color);
                    }
                    controller.set_density(new_config.density);
                    if new_config.supersample != supersample {
                        supersample = new_config.supersample;
                        let (w, h) = canvas_pixels(canvas_area, supersample);
                        raster.resize(w, h);
                        controller.resize(w as f64, h as f64);
                    }
                    status = "config reloaded".to_string();
                    current_config = new_config;
                }
                Err(e) => {
                    log::debug!("config reload failed: {:#}", e);
                    status = format!("config error: {}", e);
                }
            }
        }

        // Render frame if it's time
        if loop_start.duration_since(last_frame) >= frame_duration {
            last_frame = loop_start;

            let render_start = Instant::now();
            controller.frame(&mut raster);
            let render_time = render_start.elapsed();

            frame_count += 1;
            if fps_timer.elapsed() >= Duration::from_secs(1) {
                actual_fps = frame_count as f64 / fps_timer.elapsed().as_secs_f64();
                frame_count = 0;
                fps_timer = Instant::now();
            }

            draw_screen(
                terminal,
                &raster,
                supersample,
                &controller,
                &current_config,
                actual_fps,
                render_time,
                &status,
            )?;
        }

        // Small sleep to avoid spinning
        std::thread::sleep(Duration::from_micros(500));
    }
}

fn reload_config(current: &SketchConfig, args: &Args) -> Result<SketchConfig> {
    let path = current
        .config_path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no config file in use"))?;
    let mut config = SketchConfig::load_file(path)?;
    // Command-line values keep winning over the file
    config.merge_with_args(args);
    config.scene_settings()?;
    Ok(config)
}

#[allow(clippy::too_many_arguments)]
fn draw_screen<B: Backend>(
    terminal: &mut Terminal<B>,
    raster: &Raster,
    supersample: u32,
    controller: &AnimationController,
    config: &SketchConfig,
    actual_fps: f64,
    render_time: Duration,
    status: &str,
) -> Result<()> {
    let animating = controller.state().is_enabled();

    terminal.draw(|f| {
        let [header_area, canvas_area, footer_area] = split_screen(f.size());

        let header_spans = vec![
            Span::styled("Wheels", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" | "),
            Span::styled(
                if animating { "Animating" } else { "Paused" },
                Style::default().fg(if animating { Color::Green } else { Color::Yellow }),
            ),
            Span::raw(" | "),
            Span::raw(format!("{} palettes", controller.palette_count())),
            Span::raw("    "),
            Span::styled("'a' pause/resume, 'q' or Ctrl+C quit", Style::default().fg(Color::DarkGray)),
        ];
        let header = Paragraph::new(Line::from(header_spans)).block(Block::default().borders(Borders::ALL));
        f.render_widget(header, header_area);

        f.render_widget(HalfBlockCanvas::new(raster, supersample), canvas_area);

        let (w, h) = raster.dimensions();
        let mut footer_text = format!(
            "Canvas: {}x{} | Wheels: {} (r {:.1}) | Particles: {} | FPS: {:.1} / {:.1} | Render: {:.2}ms | Frame: {}",
            w,
            h,
            controller.wheels().len(),
            controller.grid().base_radius,
            controller.particle_count(),
            actual_fps,
            config.fps,
            render_time.as_secs_f64() * 1000.0,
            controller.frame_count(),
        );
        if !status.is_empty() {
            footer_text.push_str(" | ");
            footer_text.push_str(status);
        }
        let footer = Paragraph::new(footer_text).block(Block::default().borders(Borders::ALL));
        f.render_widget(footer, footer_area);
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;
    use crate::types::Point;
    use ratatui::{TerminalOptions, Viewport};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_canvas_pixels() {
        assert_eq!(canvas_pixels(Rect::new(0, 3, 80, 20), 3), (240, 120));
        assert_eq!(canvas_pixels(Rect::new(0, 0, 0, 0), 0), (1, 1));
    }

    #[test]
    fn test_split_screen_reserves_header_and_footer() {
        let [header, canvas, footer] = split_screen(Rect::new(0, 0, 100, 40));
        assert_eq!(header.height, 3);
        assert_eq!(footer.height, 3);
        assert_eq!(canvas, Rect::new(0, 3, 100, 34));
    }

    // Writer whose every write fails, counting the attempts
    struct BrokenWriter(Rc<Cell<usize>>);

    impl io::Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.0.set(self.0.get() + 1);
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn fixed_terminal<W: io::Write>(writer: W) -> Terminal<CrosstermBackend<W>> {
        let options = TerminalOptions { viewport: Viewport::Fixed(Rect::new(0, 0, 10, 5)) };
        Terminal::with_options(CrosstermBackend::new(writer), options).unwrap()
    }

    #[test]
    fn test_restore_runs_every_step_after_a_failure() {
        let attempts = Rc::new(Cell::new(0));
        let mut terminal = fixed_terminal(BrokenWriter(attempts.clone()));

        assert!(restore_terminal(&mut terminal).is_err());
        // Leaving the alternate screen and showing the cursor were both attempted
        assert!(attempts.get() >= 2, "attempts: {}", attempts.get());
    }

    #[test]
    fn test_restore_succeeds_on_a_working_writer() {
        let mut terminal = fixed_terminal(Vec::new());
        assert!(restore_terminal(&mut terminal).is_ok());
    }

    #[test]
    fn test_half_block_widget() {
        // 4x8 raster, white except a black band over pixel rows 4 and 5
        let mut raster = Raster::new(4, 8);
        raster.background(Rgba::WHITE);
        raster.stroke_line(Point::new(-100.0, 5.0), Point::new(100.0, 5.0), 2.0, Rgba::BLACK);

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        HalfBlockCanvas::new(&raster, 2).render(area, &mut buf);

        let top = buf.get(0, 0);
        assert_eq!(top.symbol(), "▀");
        assert_eq!(top.fg, Color::Rgb(255, 255, 255));
        assert_eq!(top.bg, Color::Rgb(255, 255, 255));

        let band = buf.get(1, 1);
        assert_eq!(band.fg, Color::Rgb(0, 0, 0));
        assert_eq!(band.bg, Color::Rgb(255, 255, 255));
    }
}
