//! User settings operations

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{validate_target, UserSettings};
use crate::store::SettingsStore;

impl Database {
    /// Read a user's settings without creating them
    pub fn get_settings(&self, user_id: i64) -> Result<Option<UserSettings>> {
        let conn = self.conn()?;
        let settings = conn
            .query_row(
                "SELECT user_id, monthly_target, updated_at FROM user_settings WHERE user_id = ?",
                params![user_id],
                |row| {
                    let updated_at: String = row.get(2)?;
                    Ok(UserSettings {
                        user_id: row.get(0)?,
                        monthly_target: row.get(1)?,
                        updated_at: parse_datetime(&updated_at),
                    })
                },
            )
            .optional()?;
        Ok(settings)
    }
}

impl SettingsStore for Database {
    fn get_or_create_settings(&self, user_id: i64) -> Result<UserSettings> {
        {
            let conn = self.conn()?;
            let created = conn.execute(
                "INSERT OR IGNORE INTO user_settings (user_id, monthly_target) VALUES (?, ?)",
                params![user_id, self.default_target],
            )?;
            if created > 0 {
                info!(user_id, target = self.default_target, "Created default settings");
            }
        }

        self.get_settings(user_id)?
            .ok_or_else(|| Error::NotFound(format!("settings for user {}", user_id)))
    }

    fn set_monthly_target(&self, user_id: i64, value: f64) -> Result<UserSettings> {
        let value = validate_target(value)?;

        {
            let conn = self.conn()?;
            conn.execute(
                r#"
                INSERT INTO user_settings (user_id, monthly_target, updated_at)
                VALUES (?, ?, datetime('now'))
                ON CONFLICT(user_id) DO UPDATE SET
                    monthly_target = excluded.monthly_target,
                    updated_at = excluded.updated_at
                "#,
                params![user_id, value],
            )?;
        }
        info!(user_id, target = value, "Monthly target updated");

        self.get_settings(user_id)?
            .ok_or_else(|| Error::NotFound(format!("settings for user {}", user_id)))
    }
}
