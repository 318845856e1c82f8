pub mod config;
pub mod console;
pub mod port;
pub mod storage;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use digit_telemetry::{
    Collected, CollectionSession, Presenter, SessionController, SessionError, Tick,
};

use config::HostConfig;
use console::ConsolePresenter;
use port::SerialRx;

/// Set up a Ctrl-C handler that clears the returned flag.
pub fn setup_ctrl_c_handler() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })
    .context("failed to install Ctrl-C handler")?;
    Ok(running)
}

/// Live recognition: stream coordinates until the device reports a result,
/// show it, start over. Runs until Ctrl-C or a transport failure.
pub fn run_live(config: &HostConfig, running: &AtomicBool) -> Result<()> {
    let rx = SerialRx::open(config.serial.require_port()?, config.serial.baud)?;
    let mut session = SessionController::new(rx);
    let mut presenter = ConsolePresenter::new();
    let tick = Duration::from_millis(config.session.tick_ms);

    while running.load(Ordering::SeqCst) {
        match session.tick() {
            Ok(Tick::Streaming(stream)) => presenter.show_coordinates(stream),
            Ok(Tick::Result(record)) => presenter.show_result(&record),
            Err(SessionError::Decode(e)) => {
                presenter.show_progress(&format!("Result discarded: {e}"));
            }
            Err(SessionError::Transport(e)) => {
                return Err(e).context("serial transport failed");
            }
        }
        thread::sleep(tick);
    }
    log::info!("live session stopped");
    Ok(())
}

/// Dataset collection: append every sample line to the CSV until the
/// device sends `###` or the operator interrupts.
pub fn run_collect(config: &HostConfig, running: &AtomicBool) -> Result<()> {
    let sink = storage::open_dataset(&config.session.output)?;
    let rx = SerialRx::open(config.serial.require_port()?, config.serial.baud)?;
    let mut session = CollectionSession::start(rx, sink)
        .map_err(|e| anyhow!("failed to write dataset header: {e}"))?;
    let mut presenter = ConsolePresenter::new();
    let tick = Duration::from_millis(config.session.tick_ms);

    loop {
        if !running.load(Ordering::SeqCst) {
            presenter.show_progress("Process interrupted by user.");
            return Ok(());
        }
        match session.poll() {
            Ok(Collected::Sample { progress, .. }) => {
                presenter.show_progress(&progress.to_string());
            }
            Ok(Collected::EndOfSession) => {
                presenter.show_progress("End of acquisition!");
                return Ok(());
            }
            Err(nb::Error::WouldBlock) => thread::sleep(tick),
            Err(nb::Error::Other(e)) if e.is_fatal() => {
                return Err(anyhow!("collection stopped: {e}"));
            }
            Err(nb::Error::Other(e)) => log::warn!("skipping line: {e}"),
        }
    }
}
