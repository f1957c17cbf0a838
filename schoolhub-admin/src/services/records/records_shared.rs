use schoolhub_core::HubApp;
use serde_json::Value;

use crate::kinds::{COUNSELLING, DISCIPLINARY, EXAM_RESULTS, INVENTORY, STAFF};
use crate::services::AdminParams;

use super::records_schema::*;

pub fn register_hooks(app: &HubApp<Value, AdminParams>) -> anyhow::Result<()> {
    schoolhub_schema::register::<CreateDisciplinary, PatchDisciplinary, AdminParams>(
        app,
        DISCIPLINARY.name,
        "Disciplinary schema validation failed",
    )?;
    schoolhub_schema::register::<CreateCounselling, PatchCounselling, AdminParams>(
        app,
        COUNSELLING.name,
        "Counselling schema validation failed",
    )?;
    schoolhub_schema::register::<CreateExamResult, PatchExamResult, AdminParams>(
        app,
        EXAM_RESULTS.name,
        "Exam result schema validation failed",
    )?;
    schoolhub_schema::register::<CreateInventoryItem, PatchInventoryItem, AdminParams>(
        app,
        INVENTORY.name,
        "Inventory schema validation failed",
    )?;
    schoolhub_schema::register::<CreateStaffMember, PatchStaffMember, AdminParams>(
        app,
        STAFF.name,
        "Staff schema validation failed",
    )?;

    Ok(())
}
