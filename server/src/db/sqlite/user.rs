use anyhow::Result;
use log::debug;
use pawmart_misc::api::user::{GetUserRequest, User};
use pawmart_misc::api::Value;
use rusqlite::types::Value as DbValue;
use rusqlite::{params, params_from_iter, Connection, Transaction};

use crate::db::sql::{Select, Update};
use crate::db::types::{CreateUserParams, UserPassword};

use super::convert_values;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    name TEXT PRIMARY KEY NOT NULL,
    password TEXT NOT NULL,
    salt TEXT NOT NULL,
    update_time INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS user_role (
    user_name TEXT NOT NULL,
    role_name TEXT NOT NULL,
    PRIMARY KEY (user_name, role_name)
);

CREATE INDEX IF NOT EXISTS idx_user_role_role ON user_role(role_name);
"#;

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreateUserParams) -> Result<()> {
    let sql = r#"
    INSERT INTO user (name, password, salt, update_time)
    VALUES (?, ?, ?, ?)
    "#;
    debug!("Database create_user: {sql}, {params:?}");
    tx.execute(
        sql,
        params![
            params.user.name,
            params.user.password,
            params.salt,
            params.update_time,
        ],
    )?;

    Ok(())
}

pub fn update_password(
    tx: &Transaction,
    name: &str,
    password: &str,
    update_time: u64,
) -> Result<()> {
    let mut update = Update::new("user");
    update.add_field("password", Value::Text(password.to_string()));
    update.add_field("update_time", Value::Integer(update_time));
    update.add_where("name = ?", Value::Text(name.to_string()));

    let (sql, values) = update.build();
    let values = convert_values(values);

    debug!("Database update_user_password: {sql}, user: {name}");
    tx.execute(&sql, params_from_iter(values.iter()))?;

    Ok(())
}

pub fn delete(tx: &Transaction, name: &str) -> Result<()> {
    let sql = "DELETE FROM user WHERE name = ?";
    debug!("Database delete_user: {sql}, {name}");
    tx.execute(sql, params![name])?;
    Ok(())
}

pub fn has(tx: &Transaction, name: String) -> Result<bool> {
    debug!("Database has_user: {name}");
    let req = GetUserRequest {
        name: Some(name),
        ..Default::default()
    };
    let count = count_users(tx, req)?;
    Ok(count > 0)
}

pub fn get_user_password(tx: &Transaction, name: String) -> Result<UserPassword> {
    let mut select = Select::new(vec!["name", "password", "salt"], "user");
    select.add_where("name = ?", Value::Text(name));

    let (sql, values) = select.build();
    let values = convert_values(values);

    debug!("Database get_user_password: {sql}");
    let mut stmt = tx.prepare(&sql)?;
    let up = stmt.query_row(params_from_iter(values), |row| {
        Ok(UserPassword {
            name: row.get(0)?,
            password: row.get(1)?,
            salt: row.get(2)?,
        })
    })?;

    Ok(up)
}

pub fn count_users(tx: &Transaction, req: GetUserRequest) -> Result<u64> {
    let (sql, values) = build_select_sql(true, req);
    debug!("Database count_users: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;

    let count: i64 = stmt.query_row(params_from_iter(values.iter()), |row| row.get(0))?;

    Ok(count as u64)
}

pub fn get_users(tx: &Transaction, req: GetUserRequest) -> Result<Vec<User>> {
    let (sql, values) = build_select_sql(false, req);
    debug!("Database get_users: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;

    let users = stmt
        .query_map(params_from_iter(values), |row| {
            Ok(User {
                name: row.get(0)?,
                roles: Default::default(),
                update_time: row.get(1)?,
            })
        })?
        .map(|r| r.unwrap())
        .collect::<Vec<_>>();

    let mut users = users;
    for user in users.iter_mut() {
        let roles = list_user_roles(tx, &user.name)?;
        user.roles = roles.into_iter().collect();
    }

    Ok(users)
}

pub fn create_user_role(tx: &Transaction, name: &str, role: &str) -> Result<()> {
    let sql = "INSERT INTO user_role (user_name, role_name) VALUES (?, ?)";
    debug!("Database create_user_role: {sql}, {name}, {role}");
    tx.execute(sql, params![name, role])?;
    Ok(())
}

pub fn delete_user_roles(tx: &Transaction, name: &str) -> Result<()> {
    let sql = "DELETE FROM user_role WHERE user_name = ?";
    debug!("Database delete_user_roles: {sql}, {name}");
    tx.execute(sql, params![name])?;
    Ok(())
}

pub fn list_user_roles(tx: &Transaction, name: &str) -> Result<Vec<String>> {
    let sql = "SELECT role_name FROM user_role WHERE user_name = ?";
    debug!("Database list_user_roles: {sql}, {name}");

    let mut stmt = tx.prepare(sql)?;
    let roles = stmt
        .query_map(params![name], |row| row.get(0))?
        .map(|r| r.unwrap())
        .collect::<Vec<String>>();

    Ok(roles)
}

pub fn is_role_in_use(tx: &Transaction, role: &str) -> Result<bool> {
    let sql = "SELECT COUNT(1) FROM user_role WHERE role_name = ?";
    debug!("Database is_role_in_use: {sql}, {role}");

    let mut stmt = tx.prepare(sql)?;
    let count: i64 = stmt.query_row(params![role], |row| row.get(0))?;

    Ok(count > 0)
}

fn build_select_sql(count: bool, req: GetUserRequest) -> (String, Vec<DbValue>) {
    let mut select = if count {
        Select::count("user")
    } else {
        Select::new(vec!["name", "update_time"], "user")
    };

    if let Some(name) = req.name {
        select.add_where("name = ?", Value::Text(name));
    }

    select.set_query(req.query, "name");

    select.add_order_by("update_time DESC");

    let (sql, values) = select.build();
    let values = convert_values(values);

    (sql, values)
}
