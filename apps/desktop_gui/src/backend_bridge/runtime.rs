//! Worker thread that owns the tokio runtime and the list controller.

use std::{sync::Arc, thread};

use client_core::{ClientEvent, TodoListController};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::app::StartupConfig;

pub fn spawn_backend_thread(
    startup: StartupConfig,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let config = startup.controller_config();
            let controller = if startup.memory {
                TodoListController::in_memory(config)
            } else {
                match TodoListController::over_http(&startup.server_url, config) {
                    Ok(controller) => controller,
                    Err(err) => {
                        let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                            UiErrorContext::BackendStartup,
                            &err,
                        )));
                        tracing::error!(server_url = %startup.server_url, "invalid server url: {err}");
                        return;
                    }
                }
            };

            forward_client_events(&controller, ui_tx.clone());
            let _ = ui_tx.try_send(UiEvent::Info(if startup.memory {
                "Session-only list; nothing is saved".to_string()
            } else {
                format!("Connected to {}", startup.server_url)
            }));
            let _ = controller.refresh().await;

            while let Ok(cmd) = cmd_rx.recv() {
                let controller = Arc::clone(&controller);
                let ui_tx = ui_tx.clone();
                // Each intent runs on its own task so a delete waiting out its
                // removal delay never blocks the next command.
                tokio::spawn(async move {
                    run_command(&controller, cmd, &ui_tx).await;
                });
            }
            tracing::info!("ui command queue closed; backend worker stopping");
        });
    });
}

async fn run_command(controller: &TodoListController, cmd: BackendCommand, ui_tx: &Sender<UiEvent>) {
    let name = cmd.name();
    let result = match cmd {
        BackendCommand::Add { content } => controller.add(&content).await.map(|record| {
            let _ = ui_tx.try_send(UiEvent::Added(record));
        }),
        BackendCommand::Toggle { id } => controller.toggle(id).await.map(|_| ()),
        BackendCommand::Delete { id } => controller.delete(id).await,
        BackendCommand::Reorder {
            source,
            destination,
        } => controller.reorder(source, destination).await,
        BackendCommand::Refresh => controller.refresh().await,
        BackendCommand::ClearError => {
            controller.clear_error().await;
            Ok(())
        }
    };

    if let Err(err) = result {
        // Sync failures already reach the UI through `ClientEvent::SyncFailed`.
        if !err.is_sync_failure() {
            tracing::debug!(command = name, "intent rejected: {err}");
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client(
                UiErrorContext::for_command(name),
                &err,
            )));
        }
    }
}

fn forward_client_events(controller: &TodoListController, ui_tx: Sender<UiEvent>) {
    let mut events = controller.subscribe_events();
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "ui event forwarder lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let forwarded = match event {
                ClientEvent::ListChanged(snapshot) => UiEvent::ListUpdated(snapshot),
                ClientEvent::SyncFailed(message) => {
                    UiEvent::Error(UiError::from_message(UiErrorContext::Sync, message))
                }
                ClientEvent::RemovalStarted { id, delay } => {
                    tracing::debug!(todo_id = id.0, delay_ms = delay.as_millis() as u64, "removal started");
                    continue;
                }
            };
            if ui_tx.send(forwarded).is_err() {
                break;
            }
        }
    });
}
