mod pet;
mod role;
mod user;

pub mod config;

use std::path::Path;

use anyhow::Result;
use pawmart_misc::api::pet::{GetPetRequest, PatchPetRequest, Pet};
use pawmart_misc::api::role::{GetRoleRequest, Role};
use pawmart_misc::api::user::{GetUserRequest, User};
use pawmart_misc::api::Value;
use rusqlite::types::Value as DbValue;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use crate::db::types::{
    Connection, CreatePetParams, CreateUserParams, Transaction, UserPassword,
};

/// SQLite-based database implementation. This is the simplest database type,
/// perfect for single-node deployments. Supports both file-based and in-memory
/// database types.
pub struct SqliteConnection {
    conn: RawConnection,
}

/// SQLite transaction for executing database operations
pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl SqliteConnection {
    /// Opens a SQLite database file. Creates one if it doesn't exist.
    /// Also initializes all required database tables.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates a new in-memory database. Database content will be lost when
    /// the program exits. This method is recommended for testing only.
    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    fn init_tables(conn: &RawConnection) -> Result<()> {
        user::create_tables(conn)?;
        role::create_tables(conn)?;
        pet::create_tables(conn)?;
        Ok(())
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for SqliteConnection {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_user(&self, params: CreateUserParams) -> Result<()> {
        user::create(&self.tx, params)
    }

    fn update_user_password(&self, name: &str, password: &str, update_time: u64) -> Result<()> {
        user::update_password(&self.tx, name, password, update_time)
    }

    fn delete_user(&self, name: &str) -> Result<()> {
        user::delete(&self.tx, name)
    }

    fn has_user(&self, name: String) -> Result<bool> {
        user::has(&self.tx, name)
    }

    fn get_user_password(&self, name: String) -> Result<UserPassword> {
        user::get_user_password(&self.tx, name)
    }

    fn count_users(&self, req: GetUserRequest) -> Result<u64> {
        user::count_users(&self.tx, req)
    }

    fn get_users(&self, req: GetUserRequest) -> Result<Vec<User>> {
        user::get_users(&self.tx, req)
    }

    fn create_user_role(&self, name: &str, role: &str) -> Result<()> {
        user::create_user_role(&self.tx, name, role)
    }

    fn delete_user_roles(&self, name: &str) -> Result<()> {
        user::delete_user_roles(&self.tx, name)
    }

    fn list_user_roles(&self, name: &str) -> Result<Vec<String>> {
        user::list_user_roles(&self.tx, name)
    }

    fn is_role_in_use(&self, role: &str) -> Result<bool> {
        user::is_role_in_use(&self.tx, role)
    }

    fn create_role(&self, name: &str, update_time: u64) -> Result<()> {
        role::create(&self.tx, name, update_time)
    }

    fn delete_role(&self, name: &str) -> Result<()> {
        role::delete(&self.tx, name)
    }

    fn is_role_exists(&self, name: &str) -> Result<bool> {
        role::has(&self.tx, name)
    }

    fn count_roles(&self, req: GetRoleRequest) -> Result<u64> {
        role::count_roles(&self.tx, req)
    }

    fn get_roles(&self, req: GetRoleRequest) -> Result<Vec<Role>> {
        role::get_roles(&self.tx, req)
    }

    fn create_pet(&self, params: CreatePetParams) -> Result<u64> {
        pet::create(&self.tx, params)
    }

    fn update_pet(&self, patch: PatchPetRequest, update_time: u64) -> Result<()> {
        pet::update(&self.tx, patch, update_time)
    }

    fn delete_pet(&self, id: u64) -> Result<()> {
        pet::delete(&self.tx, id)
    }

    fn delete_pets_by_owner(&self, owner: &str) -> Result<u64> {
        pet::delete_by_owner(&self.tx, owner)
    }

    fn has_pet(&self, id: u64) -> Result<bool> {
        pet::has(&self.tx, id)
    }

    fn get_pet(&self, id: u64) -> Result<Pet> {
        pet::get(&self.tx, id)
    }

    fn count_pets(&self, req: GetPetRequest) -> Result<u64> {
        pet::count_pets(&self.tx, req)
    }

    fn get_pets(&self, req: GetPetRequest) -> Result<Vec<Pet>> {
        pet::get_pets(&self.tx, req)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

/// Converts api values into SQLite parameter values.
pub fn convert_values(values: Vec<Value>) -> Vec<DbValue> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Text(text) => DbValue::Text(text),
            Value::Integer(integer) => DbValue::Integer(integer as i64),
            Value::Bool(boolean) => DbValue::Integer(boolean as i64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::db::tests::run_all_db_tests;
    use crate::db::{Database, UnionConnection};

    use super::*;

    #[test]
    fn test_memory() {
        let sqlite = SqliteConnection::memory().unwrap();
        let conn = UnionConnection::Sqlite(sqlite);
        let db = Database::new(conn);

        run_all_db_tests(&db);
    }

    #[test]
    fn test_file() {
        let path = "/tmp/test_pawmart.db";
        let _ = fs::remove_file(path);

        let sqlite = SqliteConnection::open(Path::new(path)).unwrap();
        let conn = UnionConnection::Sqlite(sqlite);
        let db = Database::new(conn);

        run_all_db_tests(&db);

        fs::remove_file(path).unwrap();
    }
}
