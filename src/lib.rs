pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tauri::Manager;

use crate::services::evaluator_client::EvaluatorConfig;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    if let Err(error) = try_run() {
        eprintln!("failed to launch application: {error}");
    }
}

fn try_run() -> Result<(), Box<dyn std::error::Error>> {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let handle = app.handle();

            crate::utils::logger::init_logging(handle)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;

            let config = EvaluatorConfig::from_env();
            tracing::info!(
                target: "app::config",
                base_url = %config.base_url,
                timeout_secs = config.http_timeout.as_secs(),
                max_retries = config.max_retries,
                "evaluator configured"
            );

            let state = crate::commands::AppState::new(config)
                .map_err(|err| Box::new(err) as Box<dyn std::error::Error>)?;
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            crate::commands::evaluation::evaluation_submit,
            crate::commands::evaluation::evaluation_current,
            crate::commands::evaluation::evaluation_preview,
            crate::commands::evaluation::evaluation_status,
            crate::commands::evaluation::evaluation_reset,
            crate::commands::evaluation::evaluator_health,
        ])
        .run(tauri::generate_context!())?;

    Ok(())
}
