use anyhow::Result;
use log::debug;
use pawmart_misc::api::role::{GetRoleRequest, Role};
use pawmart_misc::api::Value;
use rusqlite::types::Value as DbValue;
use rusqlite::{params, params_from_iter, Connection, Transaction};

use crate::db::sql::Select;

use super::convert_values;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS role (
    name TEXT PRIMARY KEY NOT NULL,
    update_time INTEGER NOT NULL
);
"#;

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, name: &str, update_time: u64) -> Result<()> {
    // Re-creating an existing role just refreshes its timestamp.
    let sql = r#"
    INSERT INTO role (name, update_time) VALUES (?, ?)
    ON CONFLICT(name) DO UPDATE SET update_time = excluded.update_time
    "#;
    debug!("Database create_role: {sql}, {name}");
    tx.execute(sql, params![name, update_time])?;
    Ok(())
}

pub fn delete(tx: &Transaction, name: &str) -> Result<()> {
    let sql = "DELETE FROM role WHERE name = ?";
    debug!("Database delete_role: {sql}, {name}");
    tx.execute(sql, params![name])?;
    Ok(())
}

pub fn has(tx: &Transaction, name: &str) -> Result<bool> {
    debug!("Database is_role_exists: {name}");
    let req = GetRoleRequest {
        name: Some(name.to_string()),
        ..Default::default()
    };
    let count = count_roles(tx, req)?;
    Ok(count > 0)
}

pub fn count_roles(tx: &Transaction, req: GetRoleRequest) -> Result<u64> {
    let (sql, values) = build_select_sql(true, req);
    debug!("Database count_roles: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;

    let count: i64 = stmt.query_row(params_from_iter(values.iter()), |row| row.get(0))?;

    Ok(count as u64)
}

pub fn get_roles(tx: &Transaction, req: GetRoleRequest) -> Result<Vec<Role>> {
    let (sql, values) = build_select_sql(false, req);
    debug!("Database get_roles: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;

    let roles = stmt
        .query_map(params_from_iter(values), |row| {
            Ok(Role {
                name: row.get(0)?,
                update_time: row.get(1)?,
            })
        })?
        .map(|r| r.unwrap())
        .collect::<Vec<_>>();

    Ok(roles)
}

fn build_select_sql(count: bool, req: GetRoleRequest) -> (String, Vec<DbValue>) {
    let mut select = if count {
        Select::count("role")
    } else {
        Select::new(vec!["name", "update_time"], "role")
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
