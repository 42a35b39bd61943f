//! Endless Runner - Tauri Backend
//!
//! Provides the game server and, with the `desktop` feature, the commands
//! and events the frontend talks to.

pub mod game_server;

#[cfg(feature = "desktop")]
mod desktop {
    use std::sync::Mutex;

    use tauri::{Emitter, Manager, State};

    use crate::game_server::leaderboard::Leaderboard;
    use crate::game_server::{GameConfig, GameServer, GameSnapshot, GameState, InputAction, ServerStats};

    /// Start a new run
    #[tauri::command]
    fn start_run(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.start_run();
        Ok(())
    }

    /// Perform a simulation tick and return the current state
    #[tauri::command]
    fn tick(server: State<'_, Mutex<GameServer>>) -> Result<Option<GameSnapshot>, String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.tick())
    }

    /// Apply an input action
    #[tauri::command]
    fn send_input(server: State<'_, Mutex<GameServer>>, action: InputAction) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.handle_input(action);
        Ok(())
    }

    /// Turn from a signed axis value (-1 left, +1 right)
    #[tauri::command]
    fn send_turn_axis(server: State<'_, Mutex<GameServer>>, value: f32) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.turn_axis(value);
        Ok(())
    }

    /// Apply whatever action the key is bound to
    #[tauri::command]
    fn press_key(server: State<'_, Mutex<GameServer>>, key: String) -> Result<bool, String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.press_key(&key))
    }

    /// Get current snapshot without advancing simulation
    #[tauri::command]
    fn get_snapshot(server: State<'_, Mutex<GameServer>>) -> Result<Option<GameSnapshot>, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_snapshot())
    }

    /// Get server statistics
    #[tauri::command]
    fn get_stats(server: State<'_, Mutex<GameServer>>) -> Result<ServerStats, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_stats())
    }

    /// Get current game state
    #[tauri::command]
    fn get_game_state(server: State<'_, Mutex<GameServer>>) -> Result<GameState, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_state())
    }

    /// Board fetched after the last game over
    #[tauri::command]
    fn get_leaderboard(server: State<'_, Mutex<GameServer>>) -> Result<Option<Leaderboard>, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.leaderboard().cloned())
    }

    #[tauri::command]
    fn set_player_name(server: State<'_, Mutex<GameServer>>, name: String) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("player name cannot be empty".to_string());
        }
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.set_player_name(name);
        Ok(())
    }

    /// Pause the simulation
    #[tauri::command]
    fn pause_run(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.pause();
        log::info!("Run paused");
        Ok(())
    }

    /// Resume the simulation
    #[tauri::command]
    fn resume_run(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.resume();
        log::info!("Run resumed");
        Ok(())
    }

    #[tauri::command]
    fn restart_run(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.restart();
        Ok(())
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        tauri::Builder::default()
            .setup(|app| {
                if cfg!(debug_assertions) {
                    app.handle().plugin(
                        tauri_plugin_log::Builder::default()
                            .level(log::LevelFilter::Info)
                            .build(),
                    )?;
                }

                // Built after the log plugin so start-up is logged
                let mut server = GameServer::new(GameConfig::from_env());
                let handle = app.handle().clone();
                server.subscribe(move |event| {
                    if let Err(e) = handle.emit(event.name(), event) {
                        log::warn!("Failed to emit {}: {}", event.name(), e);
                    }
                });
                app.manage(Mutex::new(server));

                log::info!("Endless runner game server initialized");
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                start_run,
                tick,
                send_input,
                send_turn_axis,
                press_key,
                get_snapshot,
                get_stats,
                get_game_state,
                get_leaderboard,
                set_player_name,
                pause_run,
                resume_run,
                restart_run,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}

#[cfg(feature = "desktop")]
pub use desktop::run;
