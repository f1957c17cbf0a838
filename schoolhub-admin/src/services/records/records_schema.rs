//! Write schemas for the tenant-scoped record kinds.
//!
//! `Create*` types guard create and full update, `Patch*` types guard patch.
//! Only the fields declared here reach the store.

use std::borrow::Cow;

use chrono::NaiveDate;
use schoolhub_core::Role;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn iso_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| {
            ValidationError::new("date").with_message(Cow::Borrowed("must be a date (YYYY-MM-DD)"))
        })
}

fn staff_role(value: &str) -> Result<(), ValidationError> {
    match value.parse::<Role>() {
        Ok(role) if role.is_super_admin() => Err(ValidationError::new("role")
            .with_message(Cow::Borrowed("system-admin is a platform role, not a staff record"))),
        Ok(_) => Ok(()),
        Err(_) => {
            Err(ValidationError::new("role").with_message(Cow::Borrowed("must be a known role")))
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDisciplinary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,

    #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
    pub student_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[validate(length(min = 1, message = "incident is required"))]
    pub incident: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,

    #[validate(custom(function = "iso_date"))]
    pub incident_date: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchDisciplinary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "studentId must not be empty"))]
    pub student_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
    pub student_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "incident must not be empty"))]
    pub incident: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "iso_date"))]
    pub incident_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCounselling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,

    #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
    pub student_name: String,

    #[validate(custom(function = "iso_date"))]
    pub session_date: String,

    #[validate(length(min = 1, message = "counsellor is required"))]
    pub counsellor: String,

    #[validate(length(min = 1, max = 4000, message = "notes must be 1 to 4000 chars"))]
    pub notes: String,

    #[serde(default)]
    pub follow_up_required: bool,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchCounselling {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "studentId must not be empty"))]
    pub student_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
    pub student_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "iso_date"))]
    pub session_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "counsellor must not be empty"))]
    pub counsellor: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 4000, message = "notes must be 1 to 4000 chars"))]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_required: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[validate(length(min = 1, message = "studentId is required"))]
    pub student_id: String,

    #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
    pub student_name: String,

    #[validate(length(min = 1, message = "subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, message = "term is required"))]
    pub term: String,

    #[validate(range(min = 1990, max = 2100, message = "year is out of range"))]
    pub year: i32,

    #[validate(range(min = 0.0, max = 100.0, message = "score must be between 0 and 100"))]
    pub score: f64,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchExamResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "studentId must not be empty"))]
    pub student_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "studentName must be at least 2 chars"))]
    pub student_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "subject must not be empty"))]
    pub subject: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "term must not be empty"))]
    pub term: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1990, max = 2100, message = "year is out of range"))]
    pub year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 100.0, message = "score must be between 0 and 100"))]
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[validate(length(min = 1, message = "itemName is required"))]
    pub item_name: String,

    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,

    #[validate(range(min = 0, max = 1_000_000_000, message = "quantityAdded is out of range"))]
    pub quantity_added: i64,

    #[serde(default)]
    #[validate(range(min = 0, max = 1_000_000_000, message = "quantityLost is out of range"))]
    pub quantity_lost: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "unitCost must not be negative"))]
    pub unit_cost: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchInventoryItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "itemName must not be empty"))]
    pub item_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 1_000_000_000, message = "quantityAdded is out of range"))]
    pub quantity_added: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 1_000_000_000, message = "quantityLost is out of range"))]
    pub quantity_lost: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "unitCost must not be negative"))]
    pub unit_cost: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[validate(length(min = 2, message = "name must be at least 2 chars"))]
    pub name: String,

    #[validate(custom(function = "staff_role"))]
    pub role: String,

    #[validate(email(message = "email must be a valid email"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchStaffMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, message = "name must be at least 2 chars"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "staff_role"))]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "email must be a valid email"))]
    pub email: Option<String>,
}
