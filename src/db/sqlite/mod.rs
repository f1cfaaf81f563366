//! SQLite implementation of the data access layer.

mod connection;
mod tag;
mod task;
mod todo;
mod user;

#[cfg(test)]
mod todo_test;

pub use connection::SqliteDatabase;
pub use tag::SqliteTagRepository;
pub use task::SqliteTaskRepository;
pub use todo::SqliteTodoRepository;
pub use user::SqliteUserRepository;
