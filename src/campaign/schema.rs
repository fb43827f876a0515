use chrono::{DateTime, Utc};

use crate::catalog::CatalogEntryId;
use crate::schema::{id, NonEmptyText, NonNegativeNumber, ObjectReader, Patch, Schema, Text, Timestamp};

use super::Campaign;

#[derive(Clone, Debug, PartialEq)]
pub struct CreateCampaign {
    pub title: String,
    pub type_id: Option<CatalogEntryId>,
    pub budget: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl Schema for CreateCampaign {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<CreateCampaign> {
        let title = reader.required("title", NonEmptyText);
        let type_id = reader.nullable("typeId", id());
        let budget = reader.nullable("budget", NonNegativeNumber);
        let start_date = reader.nullable("startDate", Timestamp);
        let end_date = reader.nullable("endDate", Timestamp);
        let description = reader.nullable("description", Text);

        Some(CreateCampaign {
            title: title?,
            type_id: type_id.into_option(),
            budget: budget.into_option(),
            start_date: start_date.into_option(),
            end_date: end_date.into_option(),
            description: description.into_option(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateCampaign {
    pub title: Option<String>,
    pub type_id: Patch<CatalogEntryId>,
    pub budget: Patch<f64>,
    pub start_date: Patch<DateTime<Utc>>,
    pub end_date: Patch<DateTime<Utc>>,
    pub description: Patch<String>,
}

impl Schema for UpdateCampaign {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<UpdateCampaign> {
        Some(UpdateCampaign {
            title: reader.optional("title", NonEmptyText),
            type_id: reader.nullable("typeId", id()),
            budget: reader.nullable("budget", NonNegativeNumber),
            start_date: reader.nullable("startDate", Timestamp),
            end_date: reader.nullable("endDate", Timestamp),
            description: reader.nullable("description", Text),
        })
    }
}

impl UpdateCampaign {
    pub fn apply(self, campaign: &mut Campaign) {
        if let Some(title) = self.title {
            campaign.title = title;
        }
        self.type_id.apply_to(&mut campaign.type_id);
        self.budget.apply_to(&mut campaign.budget);
        self.start_date.apply_to(&mut campaign.start_date);
        self.end_date.apply_to(&mut campaign.end_date);
        self.description.apply_to(&mut campaign.description);
    }
}
