pub mod analysis;
pub mod commands;
pub mod models;
pub mod reports;
pub mod storage;

#[cfg(feature = "desktop")]
use commands::{
    contracts::{api_crud, import_specification, portfolio_summary, register_specification, restore_api_snapshot, snapshot_api},
    entries::{auto_map_pcm_fields, backlog_crud, issue_crud, milestone_crud, pcm_crud},
    lifecycle::{get_lifecycle_status, set_lifecycle_phase},
    reports::export_pcm_report_pdf,
    settings::{get_settings, save_settings},
    transfer::{export_all_apis, export_api, import_apis},
    validation::{export_validation_pdf, validate_csv, validate_csv_file},
};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            api_crud,
            register_specification,
            import_specification,
            snapshot_api,
            restore_api_snapshot,
            portfolio_summary,
            issue_crud,
            backlog_crud,
            milestone_crud,
            pcm_crud,
            auto_map_pcm_fields,
            get_lifecycle_status,
            set_lifecycle_phase,
            export_api,
            export_all_apis,
            import_apis,
            validate_csv,
            validate_csv_file,
            export_validation_pdf,
            export_pcm_report_pdf,
            get_settings,
            save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
