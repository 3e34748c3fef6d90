use anyhow::Result;
use pawmart_misc::api::pet::{GetPetRequest, PatchPetRequest, Pet, PutPetRequest};
use pawmart_misc::api::role::{GetRoleRequest, Role};
use pawmart_misc::api::user::{GetUserRequest, PutUserRequest, User};

pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    fn transaction(&'a mut self) -> Result<T>;
}

pub trait Transaction {
    fn create_user(&self, params: CreateUserParams) -> Result<()>;
    fn update_user_password(&self, name: &str, password: &str, update_time: u64) -> Result<()>;
    fn delete_user(&self, name: &str) -> Result<()>;
    fn has_user(&self, name: String) -> Result<bool>;
    fn get_user_password(&self, name: String) -> Result<UserPassword>;
    fn count_users(&self, req: GetUserRequest) -> Result<u64>;
    fn get_users(&self, req: GetUserRequest) -> Result<Vec<User>>;

    fn create_user_role(&self, name: &str, role: &str) -> Result<()>;
    fn delete_user_roles(&self, name: &str) -> Result<()>;
    fn list_user_roles(&self, name: &str) -> Result<Vec<String>>;
    fn is_role_in_use(&self, role: &str) -> Result<bool>;

    fn create_role(&self, name: &str, update_time: u64) -> Result<()>;
    fn delete_role(&self, name: &str) -> Result<()>;
    fn is_role_exists(&self, name: &str) -> Result<bool>;
    fn count_roles(&self, req: GetRoleRequest) -> Result<u64>;
    fn get_roles(&self, req: GetRoleRequest) -> Result<Vec<Role>>;

    fn create_pet(&self, params: CreatePetParams) -> Result<u64>;
    fn update_pet(&self, patch: PatchPetRequest, update_time: u64) -> Result<()>;
    fn delete_pet(&self, id: u64) -> Result<()>;
    fn delete_pets_by_owner(&self, owner: &str) -> Result<u64>;
    fn has_pet(&self, id: u64) -> Result<bool>;
    fn get_pet(&self, id: u64) -> Result<Pet>;
    fn count_pets(&self, req: GetPetRequest) -> Result<u64>;
    fn get_pets(&self, req: GetPetRequest) -> Result<Vec<Pet>>;

    fn commit(self) -> Result<()>;
    fn rollback(self) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct CreateUserParams {
    pub user: PutUserRequest,
    pub salt: String,
    pub update_time: u64,
}

#[derive(Debug, Default)]
pub struct CreatePetParams {
    pub pet: PutPetRequest,
    pub owner: String,
    pub create_time: u64,
    pub update_time: u64,
}

#[derive(Debug, Default, PartialEq)]
pub struct UserPassword {
    pub name: String,
    pub password: String,
    pub salt: String,
}
