use std::collections::HashMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::parse_from_map;

use super::{QueryRequest, Request};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Pet {
    pub id: u64,

    pub name: String,
    pub category: String,

    /// Price in cents.
    pub price: u64,

    pub sold: bool,

    /// The user that listed this pet.
    pub owner: String,

    pub create_time: u64,
    pub update_time: u64,
}

#[derive(Debug, Default, PartialEq)]
pub struct PutPetRequest {
    pub name: String,
    pub category: String,
    pub price: u64,
}

impl Request for PutPetRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.name = fields.remove("name").unwrap_or_default();
        if self.name.is_empty() {
            bail!("name is required to put pet");
        }

        self.category = fields.remove("category").unwrap_or_default();
        if self.category.is_empty() {
            bail!("category is required to put pet");
        }

        self.price = match parse_from_map!(fields, "price") {
            Some(price) => price,
            None => bail!("price is required to put pet"),
        };

        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GetPetRequest {
    pub id: Option<u64>,

    pub owner: Option<String>,

    pub query: QueryRequest,
}

impl Request for GetPetRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.id = parse_from_map!(fields, "id");
        if self.id.is_some() {
            return Ok(());
        }

        self.owner = fields.remove("owner");
        self.query.complete(fields)?;

        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct PatchPetRequest {
    pub id: u64,

    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<u64>,
    pub sold: Option<bool>,
}

impl Request for PatchPetRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.id = match parse_from_map!(fields, "id") {
            Some(id) => id,
            None => bail!("id is required to patch pet"),
        };

        self.name = fields.remove("name");
        self.category = fields.remove("category");
        self.price = parse_from_map!(fields, "price");
        self.sold = parse_from_map!(fields, "sold");

        if self.name.is_none() && self.category.is_none() && self.price.is_none() && self.sold.is_none()
        {
            bail!("nothing to patch");
        }

        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DeletePetRequest {
    pub id: u64,
}

impl Request for DeletePetRequest {
    fn complete(&mut self, mut fields: HashMap<String, String>) -> Result<()> {
        self.id = match parse_from_map!(fields, "id") {
            Some(id) => id,
            None => bail!("id is required to delete pet"),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_put_pet_request() {
        let mut req = PutPetRequest::default();
        req.complete(fields(&[
            ("name", "Tom"),
            ("category", "cat"),
            ("price", "12500"),
        ]))
        .unwrap();
        assert_eq!(
            req,
            PutPetRequest {
                name: String::from("Tom"),
                category: String::from("cat"),
                price: 12500,
            }
        );

        let mut req = PutPetRequest::default();
        assert!(req
            .complete(fields(&[("name", "Tom"), ("category", "cat")]))
            .is_err());

        let mut req = PutPetRequest::default();
        assert!(req
            .complete(fields(&[
                ("name", "Tom"),
                ("category", "cat"),
                ("price", "free")
            ]))
            .is_err());
    }

    #[test]
    fn test_get_pet_request() {
        let mut req = GetPetRequest::default();
        req.complete(fields(&[("id", "123")])).unwrap();
        assert_eq!(req.id, Some(123));
        assert_eq!(req.owner, None);

        let mut req = GetPetRequest::default();
        req.complete(fields(&[("owner", "alice"), ("limit", "20")]))
            .unwrap();
        assert_eq!(req.id, None);
        assert_eq!(req.owner, Some(String::from("alice")));
        assert_eq!(req.query.limit, Some(20));
    }

    #[test]
    fn test_patch_pet_request() {
        let mut req = PatchPetRequest::default();
        req.complete(fields(&[("id", "5"), ("sold", "true"), ("price", "99")]))
            .unwrap();
        assert_eq!(req.id, 5);
        assert_eq!(req.sold, Some(true));
        assert_eq!(req.price, Some(99));

        let mut req = PatchPetRequest::default();
        assert!(req.complete(fields(&[("id", "5")])).is_err());

        let mut req = PatchPetRequest::default();
        assert!(req.complete(fields(&[("sold", "true")])).is_err());
    }
}
