use sqlx::SqliteConnection;

use super::{Applied, ExecError};
use crate::db;
use crate::models::action::SettingValue;

pub async fn add(conn: &mut SqliteConnection, setting: &SettingValue) -> Result<Applied, ExecError> {
    if setting.key.trim().is_empty() {
        return Err(ExecError::Invalid("setting key is required".to_string()));
    }
    if db::settings::find_by_key(&mut *conn, &setting.key)
        .await?
        .is_some()
    {
        return Err(ExecError::Conflict(format!(
            "setting {} already exists",
            setting.key
        )));
    }

    let created = db::settings::create(&mut *conn, &setting.key, &setting.value).await?;
    Ok(Applied::entity(created.key))
}

pub async fn update(
    conn: &mut SqliteConnection,
    setting: &SettingValue,
) -> Result<Applied, ExecError> {
    let updated = db::settings::update(&mut *conn, &setting.key, &setting.value)
        .await?
        .ok_or_else(|| ExecError::not_found("Setting", &setting.key))?;
    Ok(Applied::entity(updated.key))
}

pub async fn delete(conn: &mut SqliteConnection, key: &str) -> Result<Applied, ExecError> {
    if !db::settings::delete(&mut *conn, key).await? {
        return Err(ExecError::not_found("Setting", key));
    }
    Ok(Applied::entity(key))
}
