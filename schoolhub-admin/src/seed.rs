//! Demo data for development environments.
//!
//! Everything is written through the [`MutationGateway`] as the platform
//! administrator, so the same gate, schemas and timestamps apply as for
//! requests.

use std::collections::BTreeMap;

use anyhow::Result;
use schoolhub_core::TenantContext;
use serde::Serialize;
use serde_json::{json, Value};

use crate::gateway::MutationGateway;
use crate::kinds::{COUNSELLING, DISCIPLINARY, EXAM_RESULTS, INVENTORY, SCHOOLS, STAFF};

/// `app.env` values in which seeding is refused.
pub fn is_production(env: &str) -> bool {
    matches!(env.trim().to_ascii_lowercase().as_str(), "production" | "prod")
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub school_ids: Vec<String>,
    /// Records created per record type.
    pub created: BTreeMap<String, usize>,
}

impl SeedReport {
    fn count(&mut self, record_type: &str) {
        *self.created.entry(record_type.to_string()).or_default() += 1;
    }
}

struct DemoSchool {
    name: &'static str,
    address: &'static str,
    kind: &'static str,
    scores: [f64; 4],
}

const DEMO_SCHOOLS: [DemoSchool; 2] = [
    DemoSchool {
        name: "Riverside Primary",
        address: "12 River Road",
        kind: "primary",
        scores: [88.0, 45.0, 60.0, 92.0],
    },
    DemoSchool {
        name: "Hilltop Academy",
        address: "3 Summit Lane",
        kind: "secondary",
        scores: [71.0, 38.0, 55.0, 49.5],
    },
];

const STUDENTS: [(&str, &str); 4] = [
    ("stu-001", "Ama Mensah"),
    ("stu-002", "Kofi Boateng"),
    ("stu-003", "Esi Owusu"),
    ("stu-004", "Yaw Asante"),
];

async fn put(
    gateway: &MutationGateway,
    session: &TenantContext,
    report: &mut SeedReport,
    record_type: &str,
    payload: Value,
) -> Result<Value> {
    let record = gateway.write(record_type, payload, session).await?;
    report.count(record_type);
    Ok(record)
}

pub async fn seed_demo(gateway: &MutationGateway) -> Result<SeedReport> {
    let admin = TenantContext::all_tenants();
    let mut report = SeedReport::default();

    for school in &DEMO_SCHOOLS {
        let created = put(
            gateway,
            &admin,
            &mut report,
            SCHOOLS.name,
            json!({"name": school.name, "address": school.address, "type": school.kind}),
        )
        .await?;
        let school_id = created
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("school '{}' was stored without an id", school.name))?;

        let staff = [
            ("Grace Appiah", "head-teacher"),
            ("Daniel Ofori", "teacher"),
            ("Linda Addo", "librarian"),
            ("Samuel Tetteh", "counsellor"),
        ];
        for (i, (name, role)) in staff.iter().enumerate() {
            let email = format!("staff{}@{}.example", i + 1, school.kind);
            put(gateway, &admin, &mut report, STAFF.name, json!({
                "schoolId": school_id, "name": name, "role": role, "email": email,
            }))
            .await?;
        }

        for ((student_id, student_name), score) in STUDENTS.iter().zip(school.scores) {
            put(gateway, &admin, &mut report, EXAM_RESULTS.name, json!({
                "schoolId": school_id, "studentId": student_id, "studentName": student_name,
                "subject": "Mathematics", "term": "Term 1", "year": 2024, "score": score,
            }))
            .await?;
        }

        put(gateway, &admin, &mut report, DISCIPLINARY.name, json!({
            "schoolId": school_id, "studentId": STUDENTS[1].0, "studentName": STUDENTS[1].1,
            "className": "Basic 5", "incident": "Late to class three times",
            "actionTaken": "Parent notified", "incidentDate": "2024-02-14",
            "reportedBy": "Daniel Ofori",
        }))
        .await?;

        put(gateway, &admin, &mut report, COUNSELLING.name, json!({
            "schoolId": school_id, "studentId": STUDENTS[2].0, "studentName": STUDENTS[2].1,
            "sessionDate": "2024-02-20", "counsellor": "Samuel Tetteh",
            "notes": "Exam anxiety, agreed on a revision plan", "followUpRequired": true,
        }))
        .await?;

        let items = [
            ("Exercise books", "Stationery", 200, 12),
            ("Footballs", "Sports", 10, 3),
            ("Atlases", "Books", 30, 0),
        ];
        for (item, category, added, lost) in items {
            put(gateway, &admin, &mut report, INVENTORY.name, json!({
                "schoolId": school_id, "itemName": item, "category": category,
                "quantityAdded": added, "quantityLost": lost,
            }))
            .await?;
        }

        report.school_ids.push(school_id);
    }

    tracing::info!(schools = report.school_ids.len(), "seeded demo data");
    Ok(report)
}
