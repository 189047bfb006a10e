use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::QueueItem;
use crate::workflow::ItemStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdvanceItemRequest {
    /// `preparing` or `ready`.
    pub status: ItemStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct QueueList {
    #[schema(value_type = Vec<QueueItem>)]
    pub items: Vec<QueueItem>,
}
