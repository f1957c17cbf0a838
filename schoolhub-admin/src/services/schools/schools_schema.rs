use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchool {
    #[validate(length(min = 2, message = "name must be at least 2 chars"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub school_type: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchSchool {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "name must be at least 2 chars"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub school_type: Option<String>,
}
