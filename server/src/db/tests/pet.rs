use pawmart_misc::api::pet::{GetPetRequest, PatchPetRequest, Pet, PutPetRequest};
use pawmart_misc::api::QueryRequest;

use crate::db::types::CreatePetParams;
use crate::db::Database;

pub fn run_pet_tests(db: &Database) {
    test_create(db);
    test_get(db);
    test_update(db);
    test_delete(db);
}

fn test_create(db: &Database) {
    let pets = [
        CreatePetParams {
            pet: PutPetRequest {
                name: String::from("Tom"),
                category: String::from("cat"),
                price: 12500,
            },
            owner: String::from("black"),
            create_time: 50,
            update_time: 50,
        },
        CreatePetParams {
            pet: PutPetRequest {
                name: String::from("Rex"),
                category: String::from("dog"),
                price: 30000,
            },
            owner: String::from("black"),
            create_time: 100,
            update_time: 100,
        },
        CreatePetParams {
            pet: PutPetRequest {
                name: String::from("Goldie"),
                category: String::from("fish"),
                price: 500,
            },
            owner: String::from("other"),
            create_time: 150,
            update_time: 150,
        },
    ];

    db.with_transaction(|tx| {
        let mut ids = Vec::new();
        for pet in pets {
            ids.push(tx.create_pet(pet)?);
        }
        assert_eq!(ids, vec![1, 2, 3]);
        Ok(())
    })
    .unwrap();
}

fn test_get(db: &Database) {
    db.with_transaction(|tx| {
        assert!(tx.has_pet(1)?);
        assert!(tx.has_pet(3)?);
        assert!(!tx.has_pet(100)?);

        let pet = tx.get_pet(1)?;
        assert_eq!(
            pet,
            Pet {
                id: 1,
                name: String::from("Tom"),
                category: String::from("cat"),
                price: 12500,
                sold: false,
                owner: String::from("black"),
                create_time: 50,
                update_time: 50,
            }
        );

        let count = tx.count_pets(GetPetRequest::default())?;
        assert_eq!(count, 3);

        let pets = tx.get_pets(GetPetRequest::default())?;
        assert_eq!(pets.len(), 3);
        assert_eq!(pets[0].name, "Goldie");
        assert_eq!(pets[2].name, "Tom");

        let pets = tx.get_pets(GetPetRequest {
            owner: Some(String::from("black")),
            ..Default::default()
        })?;
        assert_eq!(pets.len(), 2);

        let count = tx.count_pets(GetPetRequest {
            owner: Some(String::from("black")),
            ..Default::default()
        })?;
        assert_eq!(count, 2);

        let pets = tx.get_pets(GetPetRequest {
            query: QueryRequest {
                search: Some(String::from("re")),
                ..Default::default()
            },
            ..Default::default()
        })?;
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "Rex");

        let pets = tx.get_pets(GetPetRequest {
            query: QueryRequest {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            },
            ..Default::default()
        })?;
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "Rex");

        let result = tx.get_pet(100);
        assert!(result.is_err());

        Ok(())
    })
    .unwrap();
}

fn test_update(db: &Database) {
    db.with_transaction(|tx| {
        tx.update_pet(
            PatchPetRequest {
                id: 1,
                sold: Some(true),
                price: Some(11000),
                ..Default::default()
            },
            4000,
        )?;

        let pet = tx.get_pet(1)?;
        assert!(pet.sold);
        assert_eq!(pet.price, 11000);
        assert_eq!(pet.update_time, 4000);
        assert_eq!(pet.create_time, 50);
        assert_eq!(pet.name, "Tom");

        Ok(())
    })
    .unwrap();
}

fn test_delete(db: &Database) {
    db.with_transaction(|tx| {
        tx.delete_pet(3)?;
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        assert!(!tx.has_pet(3)?);

        let deleted = tx.delete_pets_by_owner("black")?;
        assert_eq!(deleted, 2);
        Ok(())
    })
    .unwrap();

    db.with_transaction(|tx| {
        let count = tx.count_pets(GetPetRequest::default())?;
        assert_eq!(count, 0);
        Ok(())
    })
    .unwrap();
}
