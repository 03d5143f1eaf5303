//! # Console Monitor
//!
//! Terminal view of a running bench: every placed component with its
//! energized state, the wire list and run status. Push buttons on the
//! bench can be pressed from the keyboard.
//!
//! The monitor shares the current thread with the tick scheduler, so
//! [`ConsoleApp::run`] is async and must be driven inside the same
//! `tokio::task::LocalSet`.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::component::ComponentKind;
use crate::execution::{CompileRequest, CompileService, ExecutionCore};
use crate::hex::ProgramImage;
use crate::netlist::NetState;
use crate::scheduler::TickScheduler;
use crate::types::ComponentId;
use crate::workspace::Workspace;

/// Console configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub refresh_rate_ms: u64,
    pub show_wires: bool,
    pub show_idle_components: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_rate_ms: 100,
            show_wires: true,
            show_idle_components: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Quit,
    Restart,
    Stop,
    ToggleButton,
    NextButton,
    ToggleHelp,
    None,
}

/// Key bindings, independent of any terminal state.
pub fn action_for_key(key: KeyCode) -> ConsoleAction {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => ConsoleAction::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => ConsoleAction::Restart,
        KeyCode::Char('s') | KeyCode::Char('S') => ConsoleAction::Stop,
        KeyCode::Char(' ') => ConsoleAction::ToggleButton,
        KeyCode::Tab => ConsoleAction::NextButton,
        KeyCode::Char('h') | KeyCode::Char('H') => ConsoleAction::ToggleHelp,
        _ => ConsoleAction::None,
    }
}

/// One row per placed component: id, kind and state.
///
/// Sinks show `ON`/`off`, pressed buttons `PRESSED`, everything else `-`.
pub fn component_rows(
    workspace: &Workspace,
    net_state: &NetState,
    pressed: &BTreeSet<ComponentId>,
    show_idle: bool,
) -> Vec<String> {
    workspace
        .placement()
        .iter()
        .filter_map(|c| {
            let state = if c.kind.is_sink() {
                if net_state.is_energized(&c.id) {
                    "ON"
                } else {
                    "off"
                }
            } else if pressed.contains(&c.id) {
                "PRESSED"
            } else {
                "-"
            };
            if !show_idle && state == "-" {
                return None;
            }
            Some(format!("{:<16} {:<14} {}", c.id.as_str(), c.kind.display_name(), state))
        })
        .collect()
}

pub type CoreFactory = Rc<dyn Fn(ProgramImage) -> Box<dyn ExecutionCore>>;

/// Console UI application state
pub struct ConsoleApp {
    scheduler: TickScheduler,
    compiler: Box<dyn CompileService>,
    request: CompileRequest,
    make_core: CoreFactory,
    config: ConsoleConfig,
    running: bool,
    show_help: bool,
    selected_button: usize,
    pressed: BTreeSet<ComponentId>,
    status: String,
}

impl ConsoleApp {
    pub fn new(
        scheduler: TickScheduler,
        compiler: Box<dyn CompileService>,
        request: CompileRequest,
        make_core: CoreFactory,
        config: ConsoleConfig,
    ) -> Self {
        Self {
            scheduler,
            compiler,
            request,
            make_core,
            config,
            running: false,
            show_help: false,
            selected_button: 0,
            pressed: BTreeSet::new(),
            status: "Stopped".to_string(),
        }
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    fn buttons(&self) -> Vec<ComponentId> {
        let workspace = self.scheduler.workspace();
        let buttons = workspace
            .borrow()
            .placement()
            .of_kind(ComponentKind::PushButton)
            .map(|c| c.id.clone())
            .collect();
        buttons
    }

    pub fn selected_button(&self) -> Option<ComponentId> {
        let buttons = self.buttons();
        if buttons.is_empty() {
            return None;
        }
        buttons.get(self.selected_button % buttons.len()).cloned()
    }

    pub fn start_simulation(&mut self) {
        let make_core = Rc::clone(&self.make_core);
        self.pressed.clear();
        match self
            .scheduler
            .start(self.compiler.as_ref(), &self.request, |image| make_core(image))
        {
            Ok(()) => self.status = "Running".to_string(),
            Err(err) => self.status = format!("Error: {}", err),
        }
    }

    /// Apply one console action. Returns `false` once the console should exit.
    pub fn apply(&mut self, action: ConsoleAction) -> bool {
        match action {
            ConsoleAction::Quit => {
                info!("quit requested from console");
                self.scheduler.stop();
                self.running = false;
            }
            ConsoleAction::Restart => self.start_simulation(),
            ConsoleAction::Stop => {
                if self.scheduler.stop() {
                    self.status = "Stopped".to_string();
                }
            }
            ConsoleAction::ToggleButton => {
                if let Some(button) = self.selected_button() {
                    let pins = if self.pressed.remove(&button) {
                        self.scheduler.release_button(&button)
                    } else {
                        self.pressed.insert(button.clone());
                        self.scheduler.press_button(&button)
                    };
                    debug!(button = %button, ?pins, "button toggled");
                }
            }
            ConsoleAction::NextButton => {
                self.selected_button = self.selected_button.wrapping_add(1);
            }
            ConsoleAction::ToggleHelp => self.show_help = !self.show_help,
            ConsoleAction::None => {}
        }
        self.running
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.running = true;
        self.start_simulation();
        let refresh = Duration::from_millis(self.config.refresh_rate_ms);
        let mut last_draw: Option<Instant> = None;

        while self.running {
            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && !self.apply(action_for_key(key.code)) {
                        break;
                    }
                }
            }

            if last_draw.map_or(true, |t| t.elapsed() >= refresh) {
                terminal.draw(|f| self.draw_ui(f))?;
                last_draw = Some(Instant::now());
            }

            // Lets the tick loop run between frames.
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        self.scheduler.shutdown().await;

        disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;
        terminal
            .show_cursor()
            .map_err(|e| format!("Failed to show cursor: {}", e))?;

        Ok(())
    }

    fn draw_ui(&self, f: &mut Frame) {
        let size = f.size();

        if self.show_help {
            self.draw_help_screen(f);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(size);

        let title_text = vec![
            Line::from(vec![Span::styled(
                "Circuit Bench Monitor",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![
                Span::styled("q", Style::default().fg(Color::Yellow)),
                Span::raw("=quit, "),
                Span::styled("r", Style::default().fg(Color::Yellow)),
                Span::raw("=restart, "),
                Span::styled("s", Style::default().fg(Color::Yellow)),
                Span::raw("=stop, "),
                Span::styled("space", Style::default().fg(Color::Yellow)),
                Span::raw("=button, "),
                Span::styled("h", Style::default().fg(Color::Yellow)),
                Span::raw("=help"),
            ]),
        ];
        let title = Paragraph::new(title_text)
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        f.render_widget(title, chunks[0]);

        let panes = if self.config.show_wires {
            vec![Constraint::Percentage(55), Constraint::Percentage(45)]
        } else {
            vec![Constraint::Percentage(100)]
        };
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(panes)
            .split(chunks[1]);

        self.draw_components(f, content[0]);
        if self.config.show_wires {
            self.draw_wires(f, content[1]);
        }

        let selected = self
            .selected_button()
            .map(|b| b.to_string())
            .unwrap_or_else(|| "none".to_string());
        let status_line = format!(
            "{} | ticks: {} | button: {}",
            self.status,
            self.scheduler.ticks(),
            selected
        );
        let status = Paragraph::new(status_line)
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Run"));
        f.render_widget(status, chunks[2]);
    }

    fn draw_components(&self, f: &mut Frame, area: Rect) {
        let workspace = self.scheduler.workspace();
        let net_state = self.scheduler.net_state();
        let rows = component_rows(
            &workspace.borrow(),
            &net_state,
            &self.pressed,
            self.config.show_idle_components,
        );

        let lines: Vec<Line> = rows
            .into_iter()
            .map(|row| {
                let style = if row.ends_with(" ON") {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else if row.ends_with("PRESSED") {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                Line::from(vec![Span::styled(row, style)])
            })
            .collect();

        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Components"))
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }

    fn draw_wires(&self, f: &mut Frame, area: Rect) {
        let workspace = self.scheduler.workspace();
        let workspace = workspace.borrow();
        let lines: Vec<Line> = workspace
            .wires()
            .iter()
            .map(|w| Line::from(vec![Span::raw(format!("{} -> {}", w.start, w.end))]))
            .collect();

        let title = format!("Wires ({})", workspace.wires().len());
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        f.render_widget(widget, area);
    }

    fn draw_help_screen(&self, f: &mut Frame) {
        let size = f.size();
        let key = |k: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(k, Style::default().fg(Color::Yellow)),
                Span::raw(text),
            ])
        };
        let help_text = vec![
            Line::from(vec![Span::styled(
                "Circuit Bench Monitor Help",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            key("  q, Esc", " - Stop the run and exit"),
            key("  r", " - Recompile and restart the run"),
            key("  s", " - Stop the run"),
            key("  space", " - Press or release the selected push button"),
            key("  Tab", " - Select the next push button"),
            key("  h", " - Show/hide this help"),
            Line::from(""),
            Line::from(vec![Span::raw("Press h to return to the main view...")]),
        ];

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, size);
    }
}
