//! Terminal dashboard for watching a training run
//!
//! The dashboard runs on its own thread and receives one [`Update`] per episode over a channel.
//! It also installs [`tui_logger`] as the `log` backend, so records emitted by the agent show up
//! in its "Logs" tab.

use std::{
    io,
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

use log::LevelFilter;

mod app;
mod components;
mod tui;

pub use app::{App, Update};

/// Start the dashboard with one plot per metric name
///
/// **Returns** the handle of the render thread, which finishes when the user quits, and the
/// sender to feed it [`Update`]s. Dropping the sender leaves the final state on screen.
pub fn init(plots: &[&'static str], episodes: u32) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    // A logger may already be installed, e.g. when the dashboard is restarted
    let _ = tui_logger::init_logger(LevelFilter::Trace);
    tui_logger::set_default_level(LevelFilter::Info);

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(plots, episodes);
    let handle = thread::spawn(move || app.run(rx));
    (handle, tx)
}
