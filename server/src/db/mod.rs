mod sql;
mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod types;

use std::cell::RefCell;
use std::sync::Mutex;

use anyhow::{bail, Result};
use pawmart_misc::api::pet::{GetPetRequest, PatchPetRequest, Pet};
use pawmart_misc::api::role::{GetRoleRequest, Role};
use pawmart_misc::api::user::{GetUserRequest, User};
use sqlite::{SqliteConnection, SqliteTransaction};
use types::{Connection, CreatePetParams, CreateUserParams, Transaction, UserPassword};

pub struct Database {
    conn: Mutex<RefCell<UnionConnection>>,
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(RefCell::new(conn)),
        }
    }

    #[cfg(test)]
    pub fn new_test() -> Self {
        let conn = SqliteConnection::memory().unwrap();
        Self::new(UnionConnection::Sqlite(conn))
    }

    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock connection: {:#}", e),
        };
        let mut conn = conn.borrow_mut();
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }
}

pub enum UnionConnection {
    Sqlite(SqliteConnection),
}

pub enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(conn) => conn.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn create_user(&self, params: CreateUserParams) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_user(params),
        }
    }

    fn update_user_password(&self, name: &str, password: &str, update_time: u64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_user_password(name, password, update_time),
        }
    }

    fn delete_user(&self, name: &str) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_user(name),
        }
    }

    fn has_user(&self, name: String) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.has_user(name),
        }
    }

    fn get_user_password(&self, name: String) -> Result<UserPassword> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_user_password(name),
        }
    }

    fn count_users(&self, req: GetUserRequest) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_users(req),
        }
    }

    fn get_users(&self, req: GetUserRequest) -> Result<Vec<User>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_users(req),
        }
    }

    fn create_user_role(&self, name: &str, role: &str) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_user_role(name, role),
        }
    }

    fn delete_user_roles(&self, name: &str) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_user_roles(name),
        }
    }

    fn list_user_roles(&self, name: &str) -> Result<Vec<String>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_user_roles(name),
        }
    }

    fn is_role_in_use(&self, role: &str) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.is_role_in_use(role),
        }
    }

    fn create_role(&self, name: &str, update_time: u64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_role(name, update_time),
        }
    }

    fn delete_role(&self, name: &str) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_role(name),
        }
    }

    fn is_role_exists(&self, name: &str) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.is_role_exists(name),
        }
    }

    fn count_roles(&self, req: GetRoleRequest) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_roles(req),
        }
    }

    fn get_roles(&self, req: GetRoleRequest) -> Result<Vec<Role>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_roles(req),
        }
    }

    fn create_pet(&self, params: CreatePetParams) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_pet(params),
        }
    }

    fn update_pet(&self, patch: PatchPetRequest, update_time: u64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_pet(patch, update_time),
        }
    }

    fn delete_pet(&self, id: u64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_pet(id),
        }
    }

    fn delete_pets_by_owner(&self, owner: &str) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_pets_by_owner(owner),
        }
    }

    fn has_pet(&self, id: u64) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.has_pet(id),
        }
    }

    fn get_pet(&self, id: u64) -> Result<Pet> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_pet(id),
        }
    }

    fn count_pets(&self, req: GetPetRequest) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_pets(req),
        }
    }

    fn get_pets(&self, req: GetPetRequest) -> Result<Vec<Pet>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_pets(req),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}
