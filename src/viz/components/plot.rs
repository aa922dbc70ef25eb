use std::collections::VecDeque;

use ratatui::{prelude::*, style::Stylize, widgets::*};

use crate::viz::Update;

/// Episodes averaged by the smoothed line
const WINDOW: usize = 100;

/// A single metric over episodes, drawn as raw points plus a moving average
pub struct Plot {
    title: &'static str,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
    smoothed: Vec<(f64, f64)>,
    window: VecDeque<f64>,
    window_sum: f64,
}

impl Plot {
    pub fn new(title: &'static str, episodes: u32) -> Self {
        Self {
            title,
            x_bounds: [0.0, episodes as f64],
            y_bounds: [f64::MAX, f64::MIN],
            data: Vec::new(),
            smoothed: Vec::new(),
            window: VecDeque::with_capacity(WINDOW),
            window_sum: 0.0,
        }
    }

    pub fn update(&mut self, point: (f64, f64)) {
        let (x, y) = point;
        self.x_bounds[1] = self.x_bounds[1].max(x);
        self.y_bounds = [self.y_bounds[0].min(y), self.y_bounds[1].max(y)];

        if self.window.len() == WINDOW {
            self.window_sum -= self.window.pop_front().unwrap_or_default();
        }
        self.window.push_back(y);
        self.window_sum += y;

        self.data.push(point);
        self.smoothed
            .push((x, self.window_sum / self.window.len() as f64));
    }

    /// The latest moving average, if any point was recorded
    pub fn average(&self) -> Option<f64> {
        self.smoothed.last().map(|&(_, y)| y)
    }

    fn labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
        bounds.iter().map(|x| format!("{x:.1}").bold()).collect()
    }
}

impl Widget for &Plot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let y_bounds = if self.data.is_empty() {
            [0.0, 1.0]
        } else {
            self.y_bounds
        };

        let raw = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Scatter)
            .dark_gray()
            .data(&self.data);
        let smoothed = Dataset::default()
            .name(format!("{WINDOW}-episode mean"))
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .cyan()
            .data(&self.smoothed);

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(Plot::labels(self.x_bounds))
            .bounds(self.x_bounds);
        let y_axis = Axis::default()
            .title(self.title)
            .dark_gray()
            .labels(Plot::labels(y_bounds))
            .bounds(y_bounds);

        let title = match self.average() {
            Some(avg) => format!("{} (mean {avg:.2})", self.title),
            None => self.title.to_string(),
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(title)
            .padding(Padding::uniform(1));

        Chart::new(vec![raw, smoothed])
            .block(block)
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// One [`Plot`] per metric, one shown at a time
pub struct Plots {
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: &[&'static str], episodes: u32) -> Self {
        Self {
            plots: names.iter().map(|&k| Plot::new(k, episodes)).collect(),
            selected: 0,
        }
    }

    pub fn next_plot(&mut self) {
        if !self.plots.is_empty() {
            self.selected = (self.selected + 1) % self.plots.len();
        }
    }

    pub fn prev_plot(&mut self) {
        let len = self.plots.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn update(&mut self, update: &Update) {
        for (plot, &metric) in self.plots.iter_mut().zip(&update.data) {
            plot.update((update.episode as f64, metric));
        }
    }
}

impl Widget for &Plots {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [tabs_area, plot_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        Tabs::new(self.plots.iter().map(|p| p.title))
            .white()
            .highlight_style(Style::default().light_green())
            .select(self.selected)
            .render(tabs_area, buf);

        if let Some(plot) = self.plots.get(self.selected) {
            plot.render(plot_area, buf);
        }
    }
}
