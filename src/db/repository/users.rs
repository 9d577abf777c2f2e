use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Role;
use crate::models::User;

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, username, password_hash, role, email, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.username,
            user.password_hash,
            user.role.as_str(),
            user.email,
            user.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, role, email, created_at
         FROM users WHERE username = ?1",
    )?;

    let result = stmt.query_row(params![username], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: row.get(3)?,
            email: row.get(4)?,
            created_at: row.get(5)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(user_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, role, email, created_at
         FROM users WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: row.get(3)?,
            email: row.get(4)?,
            created_at: row.get(5)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(user_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List accounts, optionally narrowed by username substring and/or role.
/// This is the admin user-management table.
pub fn list_users(
    conn: &Connection,
    username_contains: Option<&str>,
    role: Option<Role>,
) -> Result<Vec<User>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, username, password_hash, role, email, created_at FROM users WHERE 1=1",
    );
    let mut bindings: Vec<String> = Vec::new();

    if let Some(fragment) = username_contains {
        sql.push_str(" AND username LIKE ?");
        bindings.push(format!("%{fragment}%"));
    }
    if let Some(role) = role {
        sql.push_str(" AND role = ?");
        bindings.push(role.as_str().to_string());
    }
    sql.push_str(" ORDER BY username ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(bindings.iter()), |row| {
        Ok(UserRow {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            role: row.get(3)?,
            email: row.get(4)?,
            created_at: row.get(5)?,
        })
    })?;

    let mut users = Vec::new();
    for row in rows {
        users.push(user_from_row(row?)?);
    }
    Ok(users)
}

pub fn update_user_role(conn: &Connection, id: &Uuid, role: Role) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET role = ?2 WHERE id = ?1",
        params![id.to_string(), role.as_str()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "user".into(),
            key: id.to_string(),
        });
    }
    Ok(())
}

pub fn update_user_password(
    conn: &Connection,
    username: &str,
    new_hash: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE users SET password_hash = ?2 WHERE username = ?1",
        params![username, new_hash],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "user".into(),
            key: username.into(),
        });
    }
    Ok(())
}

pub fn delete_user(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "user".into(),
            key: id.to_string(),
        });
    }
    Ok(())
}

pub fn count_users(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
    email: Option<String>,
    created_at: String,
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        username: row.username,
        password_hash: row.password_hash,
        role: Role::from_str(&row.role)?,
        email: row.email,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_default(),
    })
}
