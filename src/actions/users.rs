use sqlx::SqliteConnection;
use uuid::Uuid;

use super::{Applied, ExecError};
use crate::db;
use crate::models::action::{NewUser, UserUpdate};

pub async fn add(conn: &mut SqliteConnection, new: &NewUser) -> Result<Applied, ExecError> {
    if new.username.trim().is_empty() {
        return Err(ExecError::Invalid("username is required".to_string()));
    }
    if db::users::find_by_username(&mut *conn, &new.username)
        .await?
        .is_some()
    {
        return Err(ExecError::Conflict(format!(
            "username {} is already taken",
            new.username
        )));
    }

    let user = db::users::create(&mut *conn, Uuid::now_v7(), new).await?;
    Ok(Applied::entity(user.id))
}

pub async fn update(conn: &mut SqliteConnection, update: &UserUpdate) -> Result<Applied, ExecError> {
    let user = db::users::update(&mut *conn, update)
        .await?
        .ok_or_else(|| ExecError::not_found("User", update.id))?;
    Ok(Applied::entity(user.id))
}

pub async fn delete(conn: &mut SqliteConnection, id: Uuid) -> Result<Applied, ExecError> {
    if !db::users::delete(&mut *conn, id).await? {
        return Err(ExecError::not_found("User", id));
    }
    Ok(Applied::entity(id))
}
