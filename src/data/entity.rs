//! Entity id decoding.
//!
//! Entity ids look like `stock_sz_000338`: entity type, exchange, then the
//! code. Everything after the exchange belongs to the code.

use crate::error::DataError;

/// A decoded entity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityId {
    pub entity_type: String,
    pub exchange: String,
    pub code: String,
}

/// Split an entity id into type, exchange and code.
pub fn decode_entity_id(entity_id: &str) -> Result<EntityId, DataError> {
    let parts: Vec<&str> = entity_id.split('_').collect();
    if parts.len() < 3 || parts.iter().take(3).any(|p| p.is_empty()) {
        return Err(DataError::InvalidEntityId(entity_id.to_string()));
    }

    Ok(EntityId {
        entity_type: parts[0].to_string(),
        exchange: parts[1].to_string(),
        code: parts[2..].concat(),
    })
}

/// Label used for traces: the decoded code, or the raw id when it can't be decoded.
pub fn display_code(entity_id: &str) -> String {
    decode_entity_id(entity_id)
        .map(|id| id.code)
        .unwrap_or_else(|_| entity_id.to_string())
}
