use crate::db::migrations;
use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;

pub const DB_FILE_NAME: &str = "taskrank.db";

/// Connection wrapper that opens the database at its platform data path and
/// brings the schema up to date.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    pub fn new() -> Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        let mut conn = Connection::open(db_file_path)?;
        migrations::init_with_migrations(&mut conn)?;

        Ok(Db { conn })
    }
}
