//! Record kinds served by the admin app.
//!
//! A kind names its collection, the prefix of store-assigned ids, the field
//! that ties a record to its school, and the columns used for exports.

/// One exported column: record field and CSV/print header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub header: &'static str,
}

const fn col(field: &'static str, header: &'static str) -> Column {
    Column { field, header }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKind {
    /// Collection name, also the service name and REST path.
    pub name: &'static str,
    pub title: &'static str,
    pub id_prefix: &'static str,
    pub tenant_field: &'static str,
    pub columns: &'static [Column],
}

impl RecordKind {
    /// Platform-level kinds are keyed by their own id, not a `schoolId`.
    pub fn is_platform(&self) -> bool {
        self.tenant_field == "id"
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.header).collect()
    }
}

pub const DISCIPLINARY: RecordKind = RecordKind {
    name: "disciplinary",
    title: "Disciplinary records",
    id_prefix: "disc",
    tenant_field: "schoolId",
    columns: &[
        col("studentId", "Student ID"),
        col("studentName", "Student Name"),
        col("className", "Class"),
        col("incident", "Incident"),
        col("actionTaken", "Action Taken"),
        col("incidentDate", "Date"),
        col("reportedBy", "Reported By"),
    ],
};

pub const COUNSELLING: RecordKind = RecordKind {
    name: "counselling",
    title: "Counselling notes",
    id_prefix: "couns",
    tenant_field: "schoolId",
    columns: &[
        col("studentId", "Student ID"),
        col("studentName", "Student Name"),
        col("sessionDate", "Session Date"),
        col("counsellor", "Counsellor"),
        col("notes", "Notes"),
        col("followUpRequired", "Follow-up Required"),
    ],
};

pub const EXAM_RESULTS: RecordKind = RecordKind {
    name: "exam-results",
    title: "Exam results",
    id_prefix: "exam",
    tenant_field: "schoolId",
    columns: &[
        col("studentId", "Student ID"),
        col("studentName", "Student Name"),
        col("subject", "Subject"),
        col("term", "Term"),
        col("year", "Year"),
        col("score", "Score"),
    ],
};

pub const INVENTORY: RecordKind = RecordKind {
    name: "inventory",
    title: "Inventory",
    id_prefix: "inv",
    tenant_field: "schoolId",
    columns: &[
        col("itemName", "Item"),
        col("category", "Category"),
        col("quantityAdded", "Added"),
        col("quantityLost", "Lost"),
        col("unitCost", "Unit Cost"),
    ],
};

pub const STAFF: RecordKind = RecordKind {
    name: "staff",
    title: "Staff",
    id_prefix: "staff",
    tenant_field: "schoolId",
    columns: &[col("name", "Name"), col("role", "Role"), col("email", "Email")],
};

pub const SCHOOLS: RecordKind = RecordKind {
    name: "schools",
    title: "Schools",
    id_prefix: "school",
    tenant_field: "id",
    columns: &[col("name", "Name"), col("address", "Address"), col("type", "Type")],
};

pub const ALL_KINDS: [&RecordKind; 6] = [
    &DISCIPLINARY,
    &COUNSELLING,
    &EXAM_RESULTS,
    &INVENTORY,
    &STAFF,
    &SCHOOLS,
];

pub fn by_name(name: &str) -> Option<&'static RecordKind> {
    ALL_KINDS.iter().copied().find(|k| k.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_found_by_collection_name() {
        assert_eq!(by_name("exam-results"), Some(&EXAM_RESULTS));
        assert_eq!(by_name("exam_results"), None);
        assert!(SCHOOLS.is_platform());
        assert!(!STAFF.is_platform());
    }
}
