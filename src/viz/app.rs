use std::{
    io,
    sync::mpsc::{Receiver, TryRecvError},
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode};
use ratatui::{prelude::*, widgets::*};

use super::{
    components::{key_press, Component, Logs, Plots},
    tui,
};

const TABS: [&str; 2] = ["Plots", "Logs"];

/// Per-episode metrics, in the order of the plot names given to [`App::new`]
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub episode: u32,
    pub data: Vec<f64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Phase {
    #[default]
    Training,
    /// The sender hung up, usually because training finished
    Done,
    Quit,
}

/// The root TUI component which holds the main app state and runs the render loop
pub struct App {
    phase: Phase,
    episode: u32,
    total_episodes: u32,
    selected_tab: usize,
    plots: Plots,
    logs: Logs,
}

impl App {
    pub fn new(plots: &[&'static str], episodes: u32) -> Self {
        Self {
            phase: Phase::default(),
            episode: 0,
            total_episodes: episodes,
            selected_tab: 0,
            plots: Plots::new(plots, episodes),
            logs: Logs::new(),
        }
    }

    fn receive(&mut self, rx: &Receiver<Update>) {
        while self.phase == Phase::Training {
            match rx.try_recv() {
                Ok(update) => {
                    self.episode = update.episode + 1;
                    self.plots.update(&update);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.phase = Phase::Done,
            }
        }
    }

    fn handle_event(&mut self, event: &Event) {
        match key_press(event) {
            Some(KeyCode::Char('q')) => self.phase = Phase::Quit,
            Some(KeyCode::Tab) => self.selected_tab = (self.selected_tab + 1) % TABS.len(),
            Some(KeyCode::Left) if self.selected_tab == 0 => self.plots.prev_plot(),
            Some(KeyCode::Right) if self.selected_tab == 0 => self.plots.next_plot(),
            _ if self.selected_tab == 1 => {
                self.logs.handle_ui_event(event);
            }
            _ => {}
        }
    }

    /// Take over the terminal and run the main loop until the user presses `q`
    ///
    /// The terminal is restored on exit, including when drawing fails
    pub fn run(&mut self, rx: Receiver<Update>) -> io::Result<()> {
        let mut terminal = tui::Session::enter()?;

        while self.phase != Phase::Quit {
            self.receive(&rx);
            terminal.draw(|frame| frame.render_widget(&*self, frame.size()))?;

            if event::poll(Duration::from_millis(16))? {
                let event = event::read()?;
                self.handle_event(&event);
            }
        }

        terminal.exit()
    }

    fn progress(&self) -> f64 {
        if self.total_episodes == 0 {
            return 1.0;
        }
        (self.episode as f64 / self.total_episodes as f64).clamp(0.0, 1.0)
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [menu_area, main_area, progress_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        Tabs::new(TABS)
            .block(Block::default().padding(Padding::uniform(1)))
            .white()
            .bold()
            .highlight_style(Style::default().light_green())
            .select(self.selected_tab)
            .render(menu_area, buf);

        match self.selected_tab {
            0 => self.plots.render(main_area, buf),
            _ => self.logs.render_ref(main_area, buf),
        }

        let title = match self.phase {
            Phase::Training => "Training",
            Phase::Done | Phase::Quit => "Done (q to quit)",
        };
        Gauge::default()
            .block(Block::bordered().border_type(BorderType::Rounded).title(title))
            .gauge_style(Color::Cyan)
            .label(format!("{}/{} episodes", self.episode, self.total_episodes))
            .ratio(self.progress())
            .render(progress_area, buf);
    }
}
