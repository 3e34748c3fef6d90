mod pet;

use anyhow::{bail, Result};
use pawmart_misc::api::user::PutUserRequest;

use super::types::CreateUserParams;
use super::Database;

pub fn run_all_db_tests(db: &Database) {
    user::run_user_tests(db);
    role::run_role_tests(db);
    pet::run_pet_tests(db);

    test_rollback(db);
}

fn test_rollback(db: &Database) {
    let result: Result<()> = db.with_transaction(|tx| {
        tx.create_user(CreateUserParams {
            user: PutUserRequest {
                name: String::from("none"),
                password: String::from("test123"),
            },
            salt: String::from("test_salt"),
            update_time: 50,
        })
        .unwrap();

        bail!("rollback");
    });
    assert!(result.is_err());

    db.with_transaction(|tx| {
        assert!(!tx.has_user(String::from("none"))?);
        Ok(())
    })
    .unwrap();
}
