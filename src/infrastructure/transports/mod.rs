pub mod function;
pub mod proxy;

use anyhow::Result;

use crate::domain::models::TransportBox;
use crate::domain::models::TransportName;

pub struct TransportManager {}

impl TransportManager {
    pub fn get(name: TransportName) -> Result<TransportBox> {
        match name {
            TransportName::Proxy => return Ok(Box::<proxy::Proxy>::default()),
            TransportName::Function => return Ok(Box::<function::Function>::default()),
        }
    }
}
