//! anistream database layer.
//!
//! SQLite connection management and schema migrations.
//!
//! ```no_run
//! use anistream::database::Database;
//!
//! let db = Database::open("anistream.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
