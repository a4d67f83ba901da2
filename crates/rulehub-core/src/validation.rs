//! Request body validation
//!
//! [`ValidatedJson`] deserializes and validates a JSON body before the
//! handler runs, so handlers receive an already-checked, strongly typed value.

use std::collections::BTreeMap;

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error_builder;
use crate::problemdetails::Problem;

/// JSON body that has passed its `validator` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                error_builder::bad_request()
                    .detail(rejection.body_text())
                    .build()
            })?;

        value.validate().map_err(validation_problem)?;

        Ok(ValidatedJson(value))
    }
}

/// Convert `validator` errors into a 400 problem listing messages per field
pub fn validation_problem(errors: ValidationErrors) -> Problem {
    let fields = field_messages(&errors);
    let detail = fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");

    error_builder::validation_error()
        .detail(detail)
        .value("errors", fields)
        .build()
}

fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}
