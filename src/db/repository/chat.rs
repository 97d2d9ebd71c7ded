use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::ChatMessage;

pub fn insert_chat_message(conn: &Connection, message: &ChatMessage) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO chat_messages (id, sender_id, recipient_id, content, sent_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            message.id.to_string(),
            message.sender_id.to_string(),
            message.recipient_id.to_string(),
            message.content,
            format_datetime(&message.sent_at),
        ],
    )?;
    Ok(())
}

/// The last `limit` messages exchanged between two users, oldest first.
pub fn get_conversation(
    conn: &Connection,
    a: &Uuid,
    b: &Uuid,
    limit: usize,
) -> Result<Vec<ChatMessage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, sender_id, recipient_id, content, sent_at FROM (
             SELECT id, sender_id, recipient_id, content, sent_at, rowid AS seq
             FROM chat_messages
             WHERE (sender_id = ?1 AND recipient_id = ?2)
                OR (sender_id = ?2 AND recipient_id = ?1)
             ORDER BY sent_at DESC, seq DESC
             LIMIT ?3
         )
         ORDER BY sent_at ASC, seq ASC",
    )?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt.query_map(params![a.to_string(), b.to_string(), limit], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    rows.map(|r| {
        let (id, sender, recipient, content, sent_at) = r?;
        Ok::<_, DatabaseError>(ChatMessage {
            id: parse_uuid(&id)?,
            sender_id: parse_uuid(&sender)?,
            recipient_id: parse_uuid(&recipient)?,
            content,
            sent_at: parse_datetime(&sent_at)?,
        })
    })
    .collect()
}
