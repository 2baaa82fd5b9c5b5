use std::time::Duration;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod controller;
mod ui;

use backend_bridge::{commands::BackendCommand, runtime::spawn_backend_thread};
use controller::events::UiEvent;
use ui::{StartupConfig, TodoApp};

#[derive(Parser, Debug)]
#[command(name = "todo-desktop", about = "Desktop todo list")]
struct Args {
    /// Base URL of the todo server, optionally with a path prefix such as `/api`.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,
    /// Keep the list in this process only.
    #[arg(long)]
    memory: bool,
    #[arg(long, default_value_t = 300)]
    removal_delay_ms: u64,
}

impl Args {
    fn into_startup(self) -> StartupConfig {
        StartupConfig {
            server_url: self.server_url,
            memory: self.memory,
            removal_delay: Duration::from_millis(self.removal_delay_ms),
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let startup = Args::parse().into_startup();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    spawn_backend_thread(startup.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Todo List")
            .with_inner_size([480.0, 640.0])
            .with_min_inner_size([360.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Todo List",
        options,
        Box::new(move |_cc| Ok(Box::new(TodoApp::new(cmd_tx, ui_rx, &startup)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let startup = Args::parse_from(["todo-desktop"]).into_startup();
        assert_eq!(startup.server_url, "http://127.0.0.1:3000");
        assert!(!startup.memory);
        assert_eq!(startup.removal_delay, Duration::from_millis(300));
    }

    #[test]
    fn memory_flag_and_delay_override() {
        let startup =
            Args::parse_from(["todo-desktop", "--memory", "--removal-delay-ms", "50"]).into_startup();
        assert!(startup.memory);
        assert_eq!(startup.controller_config().removal_delay, Duration::from_millis(50));
    }
}
