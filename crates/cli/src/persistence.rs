//! Chats, messages and uploaded-file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Chat {0} not found")]
    ChatNotFound(i64),

    #[error("Invalid storage path '{0}'")]
    InvalidStoragePath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub chat_id: i64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub chat_id: i64,
    pub file_name: String,
    /// Storage path relative to the uploads area
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Storage for chat metadata. Failures here never affect retrieval; callers
/// log them and carry on.
pub trait Persistence: Send + Sync {
    fn create_chat(&self, title: &str) -> Result<ChatRecord>;

    /// Newest first.
    fn list_chats(&self) -> Result<Vec<ChatRecord>>;

    fn update_chat_title(&self, chat_id: i64, title: &str) -> Result<()>;

    fn save_message(&self, chat_id: i64, role: Role, content: &str) -> Result<MessageRecord>;

    /// Oldest first.
    fn fetch_history(&self, chat_id: i64) -> Result<Vec<MessageRecord>>;

    fn save_file_record(
        &self,
        chat_id: i64,
        file_name: &str,
        storage_path: &str,
        bytes: &[u8],
    ) -> Result<FileRecord>;

    /// Remove the chat with its messages and file records.
    fn delete_chat(&self, chat_id: i64) -> Result<()>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Database {
    next_chat_id: i64,
    chats: Vec<ChatRecord>,
    messages: Vec<MessageRecord>,
    files: Vec<FileRecord>,
}

impl Database {
    fn chat_mut(&mut self, chat_id: i64) -> Result<&mut ChatRecord> {
        self.chats
            .iter_mut()
            .find(|chat| chat.id == chat_id)
            .ok_or(PersistenceError::ChatNotFound(chat_id))
    }

    fn has_chat(&self, chat_id: i64) -> bool {
        self.chats.iter().any(|chat| chat.id == chat_id)
    }
}

/// Single JSON document under a data directory; uploads are copied to
/// `<data>/uploads/<storage path>`.
pub struct JsonPersistence {
    root: PathBuf,
    db: Mutex<Database>,
}

const DB_FILE: &str = "ragchat.json";

impl JsonPersistence {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| PersistenceError::Io {
            path: root.clone(),
            source,
        })?;

        let db_path = root.join(DB_FILE);
        let db = if db_path.exists() {
            let raw = std::fs::read(&db_path).map_err(|source| PersistenceError::Io {
                path: db_path.clone(),
                source,
            })?;
            serde_json::from_slice(&raw).map_err(|source| PersistenceError::Serialization {
                path: db_path.clone(),
                source,
            })?
        } else {
            Database::default()
        };

        log::debug!("Opened chat store at {}", db_path.display());
        Ok(Self {
            root,
            db: Mutex::new(db),
        })
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    /// Apply `f` to a copy of the store and publish it only once it is on
    /// disk, so a failed write leaves memory and file in agreement.
    fn with_db<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let mut db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = db.clone();
        let out = f(&mut next)?;
        self.flush(&next)?;
        *db = next;
        Ok(out)
    }

    // Write-then-rename so a crash never leaves a half-written store.
    fn flush(&self, db: &Database) -> Result<()> {
        let db_path = self.root.join(DB_FILE);
        let tmp_path = self.root.join(format!("{DB_FILE}.tmp"));
        let raw = serde_json::to_vec_pretty(db).map_err(|source| {
            PersistenceError::Serialization {
                path: db_path.clone(),
                source,
            }
        })?;
        std::fs::write(&tmp_path, raw).map_err(|source| PersistenceError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &db_path).map_err(|source| PersistenceError::Io {
            path: db_path,
            source,
        })
    }

    fn upload_path(&self, storage_path: &str) -> Result<PathBuf> {
        let rel = Path::new(storage_path);
        let valid = !storage_path.is_empty()
            && rel
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(PersistenceError::InvalidStoragePath(
                storage_path.to_string(),
            ));
        }
        Ok(self.uploads_dir().join(rel))
    }
}

impl Persistence for JsonPersistence {
    fn create_chat(&self, title: &str) -> Result<ChatRecord> {
        self.with_db(|db| {
            db.next_chat_id += 1;
            let chat = ChatRecord {
                id: db.next_chat_id,
                title: title.to_string(),
                created_at: Utc::now(),
            };
            db.chats.push(chat.clone());
            Ok(chat)
        })
    }

    fn list_chats(&self) -> Result<Vec<ChatRecord>> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        let mut chats = db.chats.clone();
        chats.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(chats)
    }

    fn update_chat_title(&self, chat_id: i64, title: &str) -> Result<()> {
        self.with_db(|db| {
            db.chat_mut(chat_id)?.title = title.to_string();
            Ok(())
        })
    }

    fn save_message(&self, chat_id: i64, role: Role, content: &str) -> Result<MessageRecord> {
        self.with_db(|db| {
            if !db.has_chat(chat_id) {
                return Err(PersistenceError::ChatNotFound(chat_id));
            }
            let message = MessageRecord {
                chat_id,
                role,
                content: content.to_string(),
                timestamp: Utc::now(),
            };
            db.messages.push(message.clone());
            Ok(message)
        })
    }

    fn fetch_history(&self, chat_id: i64) -> Result<Vec<MessageRecord>> {
        let db = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        // Insertion order is chronological; the stable sort keeps equal
        // timestamps in that order.
        let mut history: Vec<MessageRecord> = db
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        history.sort_by_key(|m| m.timestamp);
        Ok(history)
    }

    fn save_file_record(
        &self,
        chat_id: i64,
        file_name: &str,
        storage_path: &str,
        bytes: &[u8],
    ) -> Result<FileRecord> {
        let target = self.upload_path(storage_path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&target, bytes).map_err(|source| PersistenceError::Io {
            path: target.clone(),
            source,
        })?;

        self.with_db(|db| {
            let record = FileRecord {
                chat_id,
                file_name: file_name.to_string(),
                path: storage_path.to_string(),
                uploaded_at: Utc::now(),
            };
            db.files.push(record.clone());
            Ok(record)
        })
    }

    fn delete_chat(&self, chat_id: i64) -> Result<()> {
        let removed_files = self.with_db(|db| {
            if !db.has_chat(chat_id) {
                return Err(PersistenceError::ChatNotFound(chat_id));
            }
            db.chats.retain(|chat| chat.id != chat_id);
            db.messages.retain(|m| m.chat_id != chat_id);
            let (removed, kept): (Vec<FileRecord>, Vec<FileRecord>) = std::mem::take(&mut db.files)
                .into_iter()
                .partition(|f| f.chat_id == chat_id);
            db.files = kept;
            Ok(removed)
        })?;

        for file in removed_files {
            if let Ok(path) = self.upload_path(&file.path) {
                if let Err(err) = std::fs::remove_file(&path) {
                    log::debug!("Could not remove upload {}: {err}", path.display());
                }
            }
        }
        Ok(())
    }
}
