use uuid::Uuid;

use crate::schema::{one_of, AnyId, NonEmptyText, ObjectReader, Schema};

use super::MarketingEntityType;

#[derive(Clone, Debug, PartialEq)]
pub struct CreateLink {
    pub marketing_entity_type: MarketingEntityType,
    pub marketing_entity_id: Uuid,
    pub linked_entity_kind: String,
    pub linked_entity_id: Uuid,
}

impl Schema for CreateLink {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<CreateLink> {
        let marketing_entity_type =
            reader.required("marketingEntityType", one_of::<MarketingEntityType>());
        let marketing_entity_id = reader.required("marketingEntityId", AnyId);
        let linked_entity_kind = reader.required("linkedEntityKind", NonEmptyText);
        let linked_entity_id = reader.required("linkedEntityId", AnyId);

        Some(CreateLink {
            marketing_entity_type: marketing_entity_type?,
            marketing_entity_id: marketing_entity_id?,
            linked_entity_kind: linked_entity_kind?,
            linked_entity_id: linked_entity_id?,
        })
    }
}
