use anyhow::{Context, Result};
use chrono::Local;
use log::info;
use std::io;
use std::path::PathBuf;

use student_tracker::backend::io::StudentController;
use student_tracker::backend::storage::{ConfigRepository, JsonConnection};
use student_tracker::backend::Backend;
use student_tracker::ui::{TerminalPresenter, TerminalShell};

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting Student Tracker");

    let connection = match std::env::args().nth(1) {
        Some(dir) => JsonConnection::new(PathBuf::from(dir)),
        None => JsonConnection::new_default(),
    }
    .context("Failed to open the data directory")?;
    info!("Data directory: {}", connection.base_directory().display());

    let config = ConfigRepository::new(connection.clone())
        .load_or_create()
        .context("Failed to load tracker configuration")?;
    let connection = connection.with_quota(config.storage_quota_bytes);

    let today = Local::now().date_naive();
    let backend = Backend::new(&connection, config);
    let mut controller = StudentController::new(backend, TerminalPresenter::new(io::stdout()));
    controller.start(today);

    let mut shell = TerminalShell::new(controller, today);
    shell.run(io::stdin().lock())?;

    info!("Student Tracker exiting");
    Ok(())
}
