use chrono::Utc;
use log::{debug, error};
use pawmart_misc::api::pet::{
    DeletePetRequest, GetPetRequest, PatchPetRequest, Pet, PutPetRequest,
};
use pawmart_misc::api::{ListResponse, Response};

use crate::auth::identity::Identity;
use crate::context::ServerContext;
use crate::db::types::CreatePetParams;
use crate::register_handlers;

register_handlers!(put_pet, get_pet, patch_pet, delete_pet);

async fn put_pet(req: PutPetRequest, op: Identity, sc: &ServerContext) -> Response<Pet> {
    debug!("Create pet: {req:?}");

    let now = Utc::now().timestamp() as u64;
    let result = sc.db.with_transaction(|tx| {
        let id = tx.create_pet(CreatePetParams {
            pet: req,
            owner: op.name.clone(),
            create_time: now,
            update_time: now,
        })?;
        tx.get_pet(id)
    });

    match result {
        Ok(pet) => Response::with_data(pet),
        Err(e) => {
            error!("Failed to create pet: {e:#}");
            Response::database_error()
        }
    }
}

async fn get_pet(
    mut req: GetPetRequest,
    op: Identity,
    sc: &ServerContext,
) -> Response<ListResponse<Pet>> {
    if req.id.is_none() && !op.is_admin() {
        // Non-admin listings are always scoped to the caller, whatever
        // owner filter was requested.
        req.owner = Some(op.name.clone());
    }
    debug!("Get pets: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        if let Some(id) = req.id {
            if !tx.has_pet(id)? {
                return Ok(Response::resource_not_found());
            }
            let pet = tx.get_pet(id)?;
            if !op.can_access_owned(&pet.owner) {
                return Ok(Response::forbidden());
            }
            return Ok(Response::with_data(ListResponse {
                items: vec![pet],
                total: 1,
            }));
        }

        let total = tx.count_pets(req.clone())?;
        let pets = tx.get_pets(req.clone())?;
        Ok(Response::with_data(ListResponse {
            total,
            items: pets,
        }))
    });

    match result {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed to get pets: {e:#}");
            Response::database_error()
        }
    }
}

async fn patch_pet(req: PatchPetRequest, op: Identity, sc: &ServerContext) -> Response<()> {
    debug!("Patch pet: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        if !tx.has_pet(req.id)? {
            return Ok(Response::resource_not_found());
        }

        let pet = tx.get_pet(req.id)?;
        if !op.can_access_owned(&pet.owner) {
            return Ok(Response::forbidden());
        }

        let now = Utc::now().timestamp() as u64;
        tx.update_pet(req, now)?;
        Ok(Response::ok())
    });

    match result {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed to patch pet: {e:#}");
            Response::database_error()
        }
    }
}

async fn delete_pet(req: DeletePetRequest, op: Identity, sc: &ServerContext) -> Response<()> {
    debug!("Delete pet: {req:?}");

    let result = sc.db.with_transaction(|tx| {
        if !tx.has_pet(req.id)? {
            return Ok(Response::resource_not_found());
        }

        let pet = tx.get_pet(req.id)?;
        if !op.can_access_owned(&pet.owner) {
            return Ok(Response::forbidden());
        }

        tx.delete_pet(req.id)?;
        Ok(Response::ok())
    });

    match result {
        Ok(resp) => resp,
        Err(e) => {
            error!("Failed to delete pet: {e:#}");
            Response::database_error()
        }
    }
}
