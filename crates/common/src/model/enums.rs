//! Enum tables for constrained article fields
//!
//! A read-only mapping from field name to the ordered set of allowed
//! values. Partial updates consult these tables; a value outside its
//! table is dropped from the update without failing the rest of it.

/// Review pipeline stages, in progression order
pub const STATUSES: &[&str] = &[
    "In Review",
    "Failed Data Check",
    "Passed Data Check",
    "Technical Review",
    "Revisions Requested",
    "Ready to Publish",
    "Published",
];

/// Article types
pub const TYPES: &[&str] = &[
    "Review Article",
    "Blog",
    "Original Research",
    "Magazine Article",
];

/// Article subjects
pub const SUBJECTS: &[&str] = &[
    "Biology",
    "Chemistry",
    "Computer Science",
    "Engineering",
    "Environmental & Earth Science",
    "Materials Science",
    "Mathematics",
    "Medicine",
    "Physics",
    "Policy & Ethics",
];

/// Look up the allowed values for an enum-constrained field.
///
/// Returns `None` for unconstrained fields.
pub fn allowed_values(field: &str) -> Option<&'static [&'static str]> {
    match field {
        "status" => Some(STATUSES),
        "type" => Some(TYPES),
        "subject" => Some(SUBJECTS),
        _ => None,
    }
}

/// Check whether a value may be assigned to a field.
///
/// Unconstrained fields accept anything.
pub fn is_allowed(field: &str, value: &str) -> bool {
    match allowed_values(field) {
        Some(values) => values.contains(&value),
        None => true,
    }
}
