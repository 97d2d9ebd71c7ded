use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::User;

const USER_COLUMNS: &str = "id, email, name, role, phone, address, specialization, experience,
     education, languages, bio, age, has_active_chat, created_at";

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, email, name, role, phone, address, specialization, experience,
         education, languages, bio, age, has_active_chat, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            user.id.to_string(),
            user.email,
            user.name,
            user.role.as_str(),
            user.phone,
            user.address,
            user.specialization,
            user.experience,
            user.education,
            serde_json::to_string(&user.languages)?,
            user.bio,
            user.age,
            user.has_active_chat as i32,
            format_datetime(&user.created_at),
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!("user {} already exists", user.email))
        }
        other => other.into(),
    })?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.to_string()],
            read_user_row,
        )
        .optional()?;
    row.map(user_from_row).transpose()
}

/// All users with the given role, ordered by name.
pub fn list_users_by_role(conn: &Connection, role: UserRole) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = ?1 ORDER BY name ASC"
    ))?;
    let rows = stmt.query_map(params![role.as_str()], read_user_row)?;
    rows.map(|r| user_from_row(r?)).collect()
}

pub fn set_active_chat(conn: &Connection, id: &Uuid, active: bool) -> Result<(), DatabaseError> {
    let affected = conn.execute(
        "UPDATE users SET has_active_chat = ?2 WHERE id = ?1",
        params![id.to_string(), active as i32],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "user".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════
// Doctor-patient links
// ═══════════════════════════════════════════

/// Link two users in both directions. Linking twice is a no-op.
pub fn connect_users(
    conn: &Connection,
    a: &Uuid,
    b: &Uuid,
    at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    let at = format_datetime(at);
    for (user, other) in [(a, b), (b, a)] {
        conn.execute(
            "INSERT OR IGNORE INTO user_connections (user_id, other_id, connected_at)
             VALUES (?1, ?2, ?3)",
            params![user.to_string(), other.to_string(), at],
        )?;
    }
    Ok(())
}

pub fn are_connected(conn: &Connection, a: &Uuid, b: &Uuid) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_connections WHERE user_id = ?1 AND other_id = ?2",
        params![a.to_string(), b.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Users linked to `id`, ordered by name.
pub fn get_connected_users(conn: &Connection, id: &Uuid) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.email, u.name, u.role, u.phone, u.address, u.specialization, u.experience,
         u.education, u.languages, u.bio, u.age, u.has_active_chat, u.created_at
         FROM user_connections c
         JOIN users u ON u.id = c.other_id
         WHERE c.user_id = ?1
         ORDER BY u.name ASC",
    )?;
    let rows = stmt.query_map(params![id.to_string()], read_user_row)?;
    rows.map(|r| user_from_row(r?)).collect()
}

// Internal row type for User mapping
struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    phone: Option<String>,
    address: Option<String>,
    specialization: Option<String>,
    experience: Option<u32>,
    education: Option<String>,
    languages: String,
    bio: Option<String>,
    age: Option<u32>,
    has_active_chat: i32,
    created_at: String,
}

fn read_user_row(row: &rusqlite::Row) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        phone: row.get(4)?,
        address: row.get(5)?,
        specialization: row.get(6)?,
        experience: row.get(7)?,
        education: row.get(8)?,
        languages: row.get(9)?,
        bio: row.get(10)?,
        age: row.get(11)?,
        has_active_chat: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
    Ok(User {
        id: parse_uuid(&row.id)?,
        email: row.email,
        name: row.name,
        role: UserRole::from_str(&row.role)?,
        phone: row.phone,
        address: row.address,
        specialization: row.specialization,
        experience: row.experience,
        education: row.education,
        languages: serde_json::from_str(&row.languages)?,
        bio: row.bio,
        age: row.age,
        has_active_chat: row.has_active_chat != 0,
        created_at: parse_datetime(&row.created_at)?,
    })
}
