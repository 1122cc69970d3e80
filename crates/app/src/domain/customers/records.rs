//! Customer Records

use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Customer UUID
pub type CustomerUuid = TypedUuid<CustomerRecord>;

/// Customer Record
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRecord {
    pub uuid: CustomerUuid,
    pub name: String,
    pub email: String,
    pub loyalty_points: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
