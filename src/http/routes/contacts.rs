//! Contact endpoints.
//!
//! Handlers own the SQL templates and hand them to the record store with
//! positional parameters; the store never sees unvalidated input in statement
//! text. The `LIKE` search wraps the user's term in wildcards but still binds
//! it as a parameter.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::{RowMap, SqlParam};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::ContactInput;

const LIST_SQL: &str = "SELECT * FROM contacts ORDER BY created_at DESC";

const SEARCH_SQL: &str = "SELECT * FROM contacts \
     WHERE name LIKE ? OR phone LIKE ? OR email LIKE ? \
     ORDER BY created_at DESC";

const INSERT_SQL: &str = "INSERT INTO contacts (name, phone, email, address) VALUES (?, ?, ?, ?)";

const UPDATE_SQL: &str =
    "UPDATE contacts SET name = ?, phone = ?, email = ?, address = ? WHERE id = ?";

const DELETE_SQL: &str = "DELETE FROM contacts WHERE id = ?";

/// Contact request body for create and update
#[derive(Debug, Deserialize, Default)]
pub struct ContactBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ContactBody {
    fn validate(self) -> Result<ContactInput, ApiError> {
        Ok(ContactInput::new(
            self.name,
            self.phone,
            self.email,
            self.address,
        )?)
    }
}

/// List query params
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub search: Option<String>,
}

/// Success message body
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Create success body, carrying the generated row id
#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: u64,
}

/// GET /api/contacts - list contacts, optionally filtered by substring match
async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RowMap>>, ApiError> {
    let rows = match params.search.as_deref().filter(|term| !term.is_empty()) {
        Some(term) => {
            let pattern = like_pattern(term);
            let params = [
                SqlParam::Text(pattern.clone()),
                SqlParam::Text(pattern.clone()),
                SqlParam::Text(pattern),
            ];
            state.store.fetch_all(SEARCH_SQL, &params).await?
        }
        None => state.store.fetch_all(LIST_SQL, &[]).await?,
    };

    Ok(Json(rows))
}

/// POST /api/contacts - create a contact
async fn create_contact(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ContactBody>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let input = body.validate()?;

    let result = state
        .store
        .execute(
            INSERT_SQL,
            &[
                input.name().into(),
                input.phone().into(),
                input.email().into(),
                input.address().into(),
            ],
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "contact created",
            id: result.last_insert_id,
        }),
    ))
}

/// PUT /api/contacts/{id} - replace a contact's mutable fields wholesale
async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ContactBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = body.validate()?;

    state
        .store
        .execute(
            UPDATE_SQL,
            &[
                input.name().into(),
                input.phone().into(),
                input.email().into(),
                input.address().into(),
                id.into(),
            ],
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "contact updated",
    }))
}

/// DELETE /api/contacts/{id} - remove a contact
///
/// Idempotent: deleting an id that does not exist affects zero rows and still
/// answers with success.
async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.execute(DELETE_SQL, &[id.into()]).await?;

    Ok(Json(MessageResponse {
        message: "contact deleted",
    }))
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

/// Contact routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/{id}", put(update_contact).delete(delete_contact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    #[test]
    fn like_pattern_wraps_term() {
        assert_eq!(like_pattern("ada"), "%ada%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn body_validation_rejects_missing_name() {
        let body = ContactBody::default();
        let err = ContactInput::new(body.name, body.phone, body.email, body.address).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "name" });
    }

    #[test]
    fn body_deserializes_with_partial_fields() {
        let body: ContactBody = serde_json::from_str(r#"{"name":"Ada","phone":"555"}"#).unwrap();
        assert_eq!(body.name.as_deref(), Some("Ada"));
        assert_eq!(body.phone.as_deref(), Some("555"));
        assert!(body.email.is_none());
        assert!(body.address.is_none());
    }
}
