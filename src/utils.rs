use chrono::{DateTime, Utc};
use mongodb::bson::{self, Document};
use serde::Serialize;

use crate::error::Error;

pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const MAX_PAGE_LIMIT: u32 = 200;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u64,
}

impl Page {
    pub fn new(limit: Option<u32>, offset: Option<u64>) -> Result<Page, Error> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(Error::InvalidPageLimit {
                limit,
                maximum: MAX_PAGE_LIMIT,
            });
        }

        Ok(Page {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// An inclusive range over a datetime field. Either end may be left open.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<DateRange, Error> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(Error::InvalidDateRange { from, to });
            }
        }

        Ok(DateRange { from, to })
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, value: Option<DateTime<Utc>>) -> bool {
        if self.is_open() {
            return true;
        }

        match value {
            Some(value) => {
                self.from.map_or(true, |from| from <= value) && self.to.map_or(true, |to| value <= to)
            }
            None => false,
        }
    }

    pub fn to_bson(&self) -> Option<Document> {
        if self.is_open() {
            return None;
        }

        let mut condition = Document::new();
        if let Some(from) = self.from {
            condition.insert("$gte", bson::DateTime::from_chrono(from));
        }
        if let Some(to) = self.to {
            condition.insert("$lte", bson::DateTime::from_chrono(to));
        }

        Some(condition)
    }
}

/// Envelope for list responses. Only paginated lists fill in the counts.
#[derive(Clone, Debug, Serialize)]
pub struct ListBody<T> {
    pub items: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl<T> ListBody<T> {
    pub fn items(items: Vec<T>) -> ListBody<T> {
        ListBody {
            items,
            total: None,
            limit: None,
            offset: None,
        }
    }

    pub fn page(items: Vec<T>, total: u64, page: Page) -> ListBody<T> {
        ListBody {
            items,
            total: Some(total),
            limit: Some(page.limit),
            offset: Some(page.offset),
        }
    }
}

pub mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(bson::DateTime::from_chrono).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<bson::DateTime>::deserialize(deserializer)?;
        Ok(value.map(|datetime| datetime.to_chrono()))
    }
}
