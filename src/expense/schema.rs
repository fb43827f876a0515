use chrono::{DateTime, Utc};

use crate::catalog::CatalogEntryId;
use crate::plan::PlanId;
use crate::schema::{id, ObjectReader, Patch, PositiveNumber, Schema, Text, Timestamp};
use crate::vendor::VendorId;

use super::Expense;

#[derive(Clone, Debug, PartialEq)]
pub struct CreateExpense {
    pub plan_id: PlanId,
    pub type_id: Option<CatalogEntryId>,
    pub vendor_id: Option<VendorId>,
    pub occurred_at: DateTime<Utc>,
    pub amount: f64,
    pub notes: Option<String>,
    pub attachment_url: Option<String>,
}

impl Schema for CreateExpense {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<CreateExpense> {
        let plan_id = reader.required("planId", id());
        let type_id = reader.nullable("typeId", id());
        let vendor_id = reader.nullable("vendorId", id());
        let occurred_at = reader.required("occurredAt", Timestamp);
        let amount = reader.required("amount", PositiveNumber);
        let notes = reader.nullable("notes", Text);
        let attachment_url = reader.nullable("attachmentUrl", Text);

        Some(CreateExpense {
            plan_id: plan_id?,
            type_id: type_id.into_option(),
            vendor_id: vendor_id.into_option(),
            occurred_at: occurred_at?,
            amount: amount?,
            notes: notes.into_option(),
            attachment_url: attachment_url.into_option(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateExpense {
    pub plan_id: Option<PlanId>,
    pub type_id: Patch<CatalogEntryId>,
    pub vendor_id: Patch<VendorId>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub amount: Option<f64>,
    pub notes: Patch<String>,
    pub attachment_url: Patch<String>,
}

impl Schema for UpdateExpense {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<UpdateExpense> {
        Some(UpdateExpense {
            plan_id: reader.optional("planId", id()),
            type_id: reader.nullable("typeId", id()),
            vendor_id: reader.nullable("vendorId", id()),
            occurred_at: reader.optional("occurredAt", Timestamp),
            amount: reader.optional("amount", PositiveNumber),
            notes: reader.nullable("notes", Text),
            attachment_url: reader.nullable("attachmentUrl", Text),
        })
    }
}

impl UpdateExpense {
    pub fn apply(self, expense: &mut Expense) {
        if let Some(plan_id) = self.plan_id {
            expense.plan_id = plan_id;
        }
        self.type_id.apply_to(&mut expense.type_id);
        self.vendor_id.apply_to(&mut expense.vendor_id);
        if let Some(occurred_at) = self.occurred_at {
            expense.occurred_at = occurred_at;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        self.notes.apply_to(&mut expense.notes);
        self.attachment_url.apply_to(&mut expense.attachment_url);
    }
}
