//! Application State
//!
//! Holds the services shared by every entry point: configuration, database
//! and the assistant built from them. The assistant is rebuilt whenever the
//! configuration changes.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::services::assistant::Assistant;
use crate::storage::{ConfigService, Database};
use crate::utils::error::{AppError, AppResult};
use crate::utils::logging::init_logging;

/// Application state shared across entry points
pub struct AppState {
    /// SQLite database with connection pool
    database: Arc<RwLock<Option<Database>>>,
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Assistant built from the current configuration
    assistant: Arc<RwLock<Option<Arc<Assistant>>>>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            database: Arc::new(RwLock::new(None)),
            config: Arc::new(RwLock::new(None)),
            assistant: Arc::new(RwLock::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize from ~/.mentor
    pub async fn initialize(&self) -> AppResult<()> {
        if *self.initialized.read().await {
            return Ok(());
        }
        let config = ConfigService::new()?;
        init_logging(config.get_config().debug_mode);
        self.initialize_with(config, Database::new()?).await
    }

    /// Initialize from explicit services (used by tests and embedders)
    pub async fn initialize_with(&self, config: ConfigService, database: Database) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let assistant = Assistant::from_config(config.get_config(), database.clone())?;
        *self.database.write().await = Some(database);
        *self.config.write().await = Some(config);
        *self.assistant.write().await = Some(Arc::new(assistant));

        *initialized = true;
        info!("application state initialized");
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Check if database is healthy
    pub fn is_database_healthy(&self) -> bool {
        if let Ok(guard) = self.database.try_read() {
            if let Some(ref db) = *guard {
                return db.is_healthy();
            }
        }
        false
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// The current assistant
    pub async fn assistant(&self) -> AppResult<Arc<Assistant>> {
        let guard = self.assistant.read().await;
        guard
            .clone()
            .ok_or_else(|| AppError::config("Assistant not initialized"))
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration and rebuild the assistant.
    ///
    /// Interview sessions live in the assistant and do not survive a rebuild.
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let updated = {
            let mut guard = self.config.write().await;
            match &mut *guard {
                Some(config) => config.update_config(update)?,
                None => return Err(AppError::config("Config service not initialized")),
            }
        };

        let database = self
            .database
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::database("Database not initialized"))?;
        let assistant = Assistant::from_config(&updated, database)?;
        *self.assistant.write().await = Some(Arc::new(assistant));
        info!("configuration updated, assistant rebuilt");
        Ok(updated)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
