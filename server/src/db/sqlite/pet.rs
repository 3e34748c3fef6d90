use anyhow::Result;
use log::debug;
use pawmart_misc::api::pet::{GetPetRequest, PatchPetRequest, Pet};
use pawmart_misc::api::Value;
use rusqlite::types::Value as DbValue;
use rusqlite::{params, params_from_iter, Connection, Transaction};

use crate::db::sql::{Select, Update};
use crate::db::types::CreatePetParams;

use super::convert_values;

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS pet (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    price INTEGER NOT NULL,
    sold INTEGER NOT NULL,
    owner TEXT NOT NULL,
    create_time INTEGER NOT NULL,
    update_time INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pet_owner ON pet(owner);
"#;

const FIELDS: [&str; 8] = [
    "id",
    "name",
    "category",
    "price",
    "sold",
    "owner",
    "create_time",
    "update_time",
];

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE_SQL)?;
    Ok(())
}

pub fn create(tx: &Transaction, params: CreatePetParams) -> Result<u64> {
    let sql = r#"
    INSERT INTO pet (name, category, price, sold, owner, create_time, update_time)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    "#;
    debug!("Database create_pet: {sql}, {params:?}");
    tx.execute(
        sql,
        params![
            params.pet.name,
            params.pet.category,
            params.pet.price,
            false,
            params.owner,
            params.create_time,
            params.update_time,
        ],
    )?;

    let id = tx.last_insert_rowid();
    Ok(id as u64)
}

pub fn update(tx: &Transaction, patch: PatchPetRequest, update_time: u64) -> Result<()> {
    let mut update = Update::new("pet");

    if let Some(name) = patch.name {
        update.add_field("name", Value::Text(name));
    }

    if let Some(category) = patch.category {
        update.add_field("category", Value::Text(category));
    }

    if let Some(price) = patch.price {
        update.add_field("price", Value::Integer(price));
    }

    if let Some(sold) = patch.sold {
        update.add_field("sold", Value::Bool(sold));
    }

    update.add_field("update_time", Value::Integer(update_time));

    update.add_where("id = ?", Value::Integer(patch.id));

    let (sql, values) = update.build();
    if sql.is_empty() {
        return Ok(());
    }
    let values = convert_values(values);

    debug!("Database update_pet: {sql}, {values:?}");
    tx.execute(&sql, params_from_iter(values.iter()))?;

    Ok(())
}

pub fn delete(tx: &Transaction, id: u64) -> Result<()> {
    let sql = "DELETE FROM pet WHERE id = ?";
    debug!("Database delete_pet: {sql}, {id}");
    tx.execute(sql, params![id])?;
    Ok(())
}

pub fn delete_by_owner(tx: &Transaction, owner: &str) -> Result<u64> {
    let sql = "DELETE FROM pet WHERE owner = ?";
    debug!("Database delete_pets_by_owner: {sql}, {owner}");
    let count = tx.execute(sql, params![owner])?;
    Ok(count as u64)
}

pub fn has(tx: &Transaction, id: u64) -> Result<bool> {
    debug!("Database has_pet: {id}");
    let req = GetPetRequest {
        id: Some(id),
        ..Default::default()
    };
    let count = count_pets(tx, req)?;
    Ok(count > 0)
}

pub fn get(tx: &Transaction, id: u64) -> Result<Pet> {
    let mut select = Select::new(FIELDS.to_vec(), "pet");
    select.add_where("id = ?", Value::Integer(id));

    let (sql, values) = select.build();
    let values = convert_values(values);

    debug!("Database get_pet: {sql}, {id}");
    let mut stmt = tx.prepare(&sql)?;
    let pet = stmt.query_row(params_from_iter(values), map_pet_row)?;

    Ok(pet)
}

pub fn count_pets(tx: &Transaction, req: GetPetRequest) -> Result<u64> {
    let (sql, values) = build_select_sql(true, req);
    debug!("Database count_pets: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;

    let count: i64 = stmt.query_row(params_from_iter(values.iter()), |row| row.get(0))?;

    Ok(count as u64)
}

pub fn get_pets(tx: &Transaction, req: GetPetRequest) -> Result<Vec<Pet>> {
    let (sql, values) = build_select_sql(false, req);
    debug!("Database get_pets: {sql}, {values:?}");

    let mut stmt = tx.prepare(&sql)?;

    let pets = stmt
        .query_map(params_from_iter(values), map_pet_row)?
        .map(|r| r.unwrap())
        .collect::<Vec<_>>();

    Ok(pets)
}

fn map_pet_row(row: &rusqlite::Row) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        sold: row.get(4)?,
        owner: row.get(5)?,
        create_time: row.get(6)?,
        update_time: row.get(7)?,
    })
}

fn build_select_sql(count: bool, req: GetPetRequest) -> (String, Vec<DbValue>) {
    let mut select = if count {
        Select::count("pet")
    } else {
        Select::new(FIELDS.to_vec(), "pet")
    };

    if let Some(id) = req.id {
        select.add_where("id = ?", Value::Integer(id));
    }

    if let Some(owner) = req.owner {
        select.add_where("owner = ?", Value::Text(owner));
    }

    select.set_query(req.query, "name");

    select.add_order_by("update_time DESC");

    let (sql, values) = select.build();
    let values = convert_values(values);

    (sql, values)
}
