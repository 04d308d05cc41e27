use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::usecase::contracts::SettingsRepository;
use crate::usecase::error::UsecaseError;

const SYSTEM_SETTINGS_KEY: &str = "system_settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub company_name: String,
    pub currency: String,
    pub date_format: String,
    pub time_format: String,
    pub low_stock_threshold: i32,
    pub enable_notifications: bool,
    pub default_language: String,
    pub session_timeout_minutes: i32,
    pub backup_frequency: String,
    pub last_updated: DateTime<Utc>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            company_name: "Inventory Management System".to_string(),
            currency: "USD".to_string(),
            date_format: "MM/DD/YYYY".to_string(),
            time_format: "12h".to_string(),
            low_stock_threshold: 10,
            enable_notifications: true,
            default_language: "en".to_string(),
            session_timeout_minutes: 30,
            backup_frequency: "daily".to_string(),
            last_updated: Utc::now(),
        }
    }
}

/// Partial update; unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SystemSettingsUpdate {
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub date_format: Option<String>,
    pub time_format: Option<String>,
    pub low_stock_threshold: Option<i32>,
    pub enable_notifications: Option<bool>,
    pub default_language: Option<String>,
    pub session_timeout_minutes: Option<i32>,
    pub backup_frequency: Option<String>,
}

pub struct SettingsUseCase<R: SettingsRepository> {
    settings_repository: R,
}

impl<R: SettingsRepository> SettingsUseCase<R> {
    pub fn new(settings_repository: R) -> Self {
        Self { settings_repository }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_settings(&self) -> Result<SystemSettings, UsecaseError> {
        tracing::debug!("getting system settings");

        let value = self.settings_repository.get_value(SYSTEM_SETTINGS_KEY).await?;

        match value {
            Some(v) => {
                let settings: SystemSettings = serde_json::from_value(v).map_err(|e| {
                    UsecaseError::Internal(format!("failed to deserialize system settings: {}", e))
                })?;
                Ok(settings)
            }
            None => {
                tracing::info!("no system settings found, returning defaults");
                Ok(SystemSettings::default())
            }
        }
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_settings(
        &self,
        update: SystemSettingsUpdate,
    ) -> Result<SystemSettings, UsecaseError> {
        tracing::debug!("updating system settings");

        let mut settings = self.get_settings().await?;

        if let Some(company_name) = update.company_name {
            settings.company_name = company_name;
        }
        if let Some(currency) = update.currency {
            settings.currency = currency;
        }
        if let Some(date_format) = update.date_format {
            settings.date_format = date_format;
        }
        if let Some(time_format) = update.time_format {
            settings.time_format = time_format;
        }
        if let Some(low_stock_threshold) = update.low_stock_threshold {
            settings.low_stock_threshold = low_stock_threshold;
        }
        if let Some(enable_notifications) = update.enable_notifications {
            settings.enable_notifications = enable_notifications;
        }
        if let Some(default_language) = update.default_language {
            settings.default_language = default_language;
        }
        if let Some(session_timeout_minutes) = update.session_timeout_minutes {
            settings.session_timeout_minutes = session_timeout_minutes;
        }
        if let Some(backup_frequency) = update.backup_frequency {
            settings.backup_frequency = backup_frequency;
        }
        settings.last_updated = Utc::now();

        self.save(&settings).await?;

        tracing::info!("system settings updated");
        Ok(settings)
    }

    #[tracing::instrument(skip(self))]
    pub async fn reset_settings(&self) -> Result<SystemSettings, UsecaseError> {
        tracing::debug!("resetting system settings");

        let settings = SystemSettings::default();
        self.save(&settings).await?;

        tracing::info!("system settings reset to defaults");
        Ok(settings)
    }

    async fn save(&self, settings: &SystemSettings) -> Result<(), UsecaseError> {
        let value = serde_json::to_value(settings).map_err(|e| {
            UsecaseError::Internal(format!("failed to serialize system settings: {}", e))
        })?;
        self.settings_repository
            .set_value(SYSTEM_SETTINGS_KEY, &value)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::MockSettingsRepository;

    #[tokio::test]
    async fn test_defaults_when_no_settings_stored() {
        let mut settings_repo = MockSettingsRepository::new();

        settings_repo
            .expect_get_value()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = SettingsUseCase::new(settings_repo);
        let settings = usecase.get_settings().await.unwrap();

        assert_eq!(settings.low_stock_threshold, 10);
        assert!(settings.enable_notifications);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let mut settings_repo = MockSettingsRepository::new();

        settings_repo
            .expect_get_value()
            .times(1)
            .returning(|_| Ok(None));
        settings_repo
            .expect_set_value()
            .withf(|key, value| {
                key == "system_settings" && value["currency"] == "EUR" && value["low_stock_threshold"] == 10
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = SettingsUseCase::new(settings_repo);
        let update = SystemSettingsUpdate {
            currency: Some("EUR".to_string()),
            ..Default::default()
        };

        let settings = usecase.update_settings(update).await.unwrap();
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.company_name, "Inventory Management System");
    }

    #[tokio::test]
    async fn test_reset_writes_defaults() {
        let mut settings_repo = MockSettingsRepository::new();

        settings_repo
            .expect_set_value()
            .withf(|_, value| value["currency"] == "USD")
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = SettingsUseCase::new(settings_repo);
        let settings = usecase.reset_settings().await.unwrap();

        assert_eq!(settings.currency, "USD");
    }
}
