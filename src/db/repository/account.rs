use rusqlite::{params, Connection};

use crate::db::DatabaseError;

/// Stored login account: bare username + PBKDF2 password hash.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,
}

pub fn insert_account(conn: &Connection, account: &UserAccount) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO user_accounts (username, password_hash, created_at)
         VALUES (?1, ?2, datetime('now'))",
        params![account.username, account.password_hash],
    )?;
    Ok(())
}

pub fn get_account(conn: &Connection, username: &str) -> Result<Option<UserAccount>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT username, password_hash FROM user_accounts WHERE username = ?1")?;

    let result = stmt.query_row(params![username], |row| {
        Ok(UserAccount {
            username: row.get(0)?,
            password_hash: row.get(1)?,
        })
    });

    match result {
        Ok(account) => Ok(Some(account)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_get_account() {
        let conn = open_memory_database().unwrap();
        let account = UserAccount {
            username: "frontdesk".to_string(),
            password_hash: "$pbkdf2-sha256$...".to_string(),
        };
        insert_account(&conn, &account).unwrap();

        let loaded = get_account(&conn, "frontdesk").unwrap().unwrap();
        assert_eq!(loaded.username, "frontdesk");
    }

    #[test]
    fn unknown_username_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_account(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let conn = open_memory_database().unwrap();
        let account = UserAccount {
            username: "frontdesk".to_string(),
            password_hash: "h1".to_string(),
        };
        insert_account(&conn, &account).unwrap();
        assert!(insert_account(&conn, &account).is_err());
    }
}
