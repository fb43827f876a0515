use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::campaign::CampaignId;
use crate::catalog::{CatalogEntryId, CatalogKind};
use crate::expense::ExpenseId;
use crate::link::MarketingEntityType;
use crate::plan::PlanId;
use crate::schema::FieldError;
use crate::vendor::VendorId;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    ValidationFailed {
        errors: Vec<FieldError>,
    },
    InvalidPageLimit {
        limit: u32,
        maximum: u32,
    },
    InvalidDateRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    // 401
    AuthenticationRequired,

    // 403
    PermissionDenied {
        action: String,
    },

    // 404
    PathNotFound,
    CampaignNotFound {
        campaign_id: CampaignId,
    },
    PlanNotFound {
        plan_id: PlanId,
    },
    ExpenseNotFound {
        expense_id: ExpenseId,
    },
    VendorNotFound {
        vendor_id: VendorId,
    },
    CatalogEntryNotFound {
        kind: CatalogKind,
        entry_id: CatalogEntryId,
    },

    // 409
    ConcurrentModificationDetected,
    CatalogKeyAlreadyExists {
        kind: CatalogKind,
        key: String,
    },
    ReorderDoesNotMatchCatalog {
        kind: CatalogKind,
        unknown_ids: Vec<CatalogEntryId>,
        missing_ids: Vec<CatalogEntryId>,
    },
    LinkAlreadyExists {
        marketing_entity_type: MarketingEntityType,
        marketing_entity_id: String,
        linked_entity_kind: String,
        linked_entity_id: String,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001003",
            Error::ValidationFailed { .. } => "E4001004",
            Error::InvalidPageLimit { .. } => "E4001005",
            Error::InvalidDateRange { .. } => "E4001006",
            Error::AuthenticationRequired => "E4011000",
            Error::PermissionDenied { .. } => "E4031000",
            Error::PathNotFound => "E4041000",
            Error::CampaignNotFound { .. } => "E4041001",
            Error::PlanNotFound { .. } => "E4041002",
            Error::ExpenseNotFound { .. } => "E4041003",
            Error::VendorNotFound { .. } => "E4041004",
            Error::CatalogEntryNotFound { .. } => "E4041005",
            Error::ConcurrentModificationDetected => "E4091000",
            Error::CatalogKeyAlreadyExists { .. } => "E4091001",
            Error::ReorderDoesNotMatchCatalog { .. } => "E4091002",
            Error::LinkAlreadyExists { .. } => "E4091003",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::ValidationFailed { .. } => "The given body failed validation",
            Error::InvalidPageLimit { .. } => "The requested page limit is out of range",
            Error::InvalidDateRange { .. } => "The requested date range ends before it starts",
            Error::AuthenticationRequired => "The request did not carry any credentials",
            Error::PermissionDenied { .. } => {
                "The caller does not have permission for this operation"
            }
            Error::PathNotFound => "The requested path was not found",
            Error::CampaignNotFound { .. } => "The requested campaign was not found",
            Error::PlanNotFound { .. } => "The requested plan was not found",
            Error::ExpenseNotFound { .. } => "The requested expense was not found",
            Error::VendorNotFound { .. } => "The requested vendor was not found",
            Error::CatalogEntryNotFound { .. } => "The requested type was not found",
            Error::ConcurrentModificationDetected => {
                "The server detected a concurrent modification"
            }
            Error::CatalogKeyAlreadyExists { .. } => {
                "A type with the requested key already exists"
            }
            Error::ReorderDoesNotMatchCatalog { .. } => {
                "The requested order must list every type exactly once"
            }
            Error::LinkAlreadyExists { .. } => "The requested link already exists",
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidPageLimit { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidDateRange { .. } => StatusCode::BAD_REQUEST,
            Error::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::CampaignNotFound { .. } => StatusCode::NOT_FOUND,
            Error::PlanNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ExpenseNotFound { .. } => StatusCode::NOT_FOUND,
            Error::VendorNotFound { .. } => StatusCode::NOT_FOUND,
            Error::CatalogEntryNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ConcurrentModificationDetected => StatusCode::CONFLICT,
            Error::CatalogKeyAlreadyExists { .. } => StatusCode::CONFLICT,
            Error::ReorderDoesNotMatchCatalog { .. } => StatusCode::CONFLICT,
            Error::LinkAlreadyExists { .. } => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Dummy<'a> {
            error: &'static str,
            error_code: &'static str,
            error_meta: Option<&'a Error>,
        }

        let status = self.status_code();

        // server-side details stay in the logs
        let error_meta = if status.is_server_error() {
            tracing::error!(error_code = self.error_code(), "{}", self);
            None
        } else {
            Some(self)
        };

        HttpResponse::build(status).json(&Dummy {
            error: self.error_message(),
            error_code: self.error_code(),
            error_meta,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let error = Error::ValidationFailed {
            errors: vec![FieldError::new("kind", "expected one of Platform, Agency")],
        };

        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.error_code(), "E4001004");
    }

    #[test]
    fn metadata_uses_camel_case_keys() {
        let entry_id: CatalogEntryId = "0d9e3c55-2f4b-4b7f-9d51-8f5a1c2e7b10".parse().unwrap();
        let error = Error::CatalogEntryNotFound {
            kind: CatalogKind::PlanType,
            entry_id,
        };

        let meta = serde_json::to_value(&error).unwrap();

        assert_eq!(
            meta,
            serde_json::json!({
                "kind": "plan-type",
                "entryId": "0d9e3c55-2f4b-4b7f-9d51-8f5a1c2e7b10",
            })
        );
    }

    #[test]
    fn server_errors_hide_their_details() {
        let error = Error::ExistentialState("lock poisoned".into());

        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
