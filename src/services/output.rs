//! Response envelope written by the binary

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T: Serialize> {
    pub status_code: u16,
    pub data: T,
}

impl<T: Serialize> Response<T> {
    pub fn ok(data: T) -> Self {
        Self { status_code: 200, data }
    }
}

impl Response<Value> {
    pub fn error(err: &AppError) -> Self {
        Self {
            status_code: err.status_code(),
            data: json!({ "message": err.to_string() }),
        }
    }
}
