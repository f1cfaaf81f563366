//! Database layer.
//!
//! # Architecture
//!
//! - `error`: storage-agnostic error types
//! - `models`: domain entities (User, Todo, Tag, Task) and query types
//! - `sqlite`: SQLx-backed repositories, all scoped by owner id
//!
//! Every repository read and mutation is filtered by `user_id`; a row that
//! exists but belongs to another user is indistinguishable from a row that
//! does not exist.

mod error;
mod models;
pub mod utils;

mod sqlite;


pub use error::{DbError, DbResult};
pub use models::*;
pub use sqlite::{
    SqliteDatabase, SqliteTagRepository, SqliteTaskRepository, SqliteTodoRepository,
    SqliteUserRepository,
};
