use mongodb::bson::Bson;
use serde::{Deserialize, Serialize, Serializer, de::IgnoredAny};

/// Employee as it is returned to clients. `id` is the hex form of the stored `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub age: i64,
    #[serde(serialize_with = "serialize_salary")]
    pub salary: f64,
}

// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole salaries as JSON integers (`5000`, not `5000.0`).
fn serialize_salary<S: Serializer>(salary: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if salary.fract() == 0.0 && salary.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*salary as i64)
    } else {
        serializer.serialize_f64(*salary)
    }
}

/// Inbound body for create and edit. Any `id` the client sends is accepted and dropped.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmployeeInput {
    #[serde(default, rename = "id")]
    _id: Option<IgnoredAny>,
    pub name: String,
    pub age: i64,
    pub salary: f64,
}

impl EmployeeInput {
    pub fn new(name: impl Into<String>, age: i64, salary: f64) -> Self {
        Self {
            _id: None,
            name: name.into(),
            age,
            salary,
        }
    }

    /// Builds the response record, echoing `id` exactly as the client addressed it.
    pub fn into_employee(self, id: String) -> Employee {
        Employee {
            id,
            name: self.name,
            age: self.age,
            salary: self.salary,
        }
    }
}

/// Shape stored in the `employees` collection.
///
/// Reads are lenient: missing fields decode as zero values and `_id` may be
/// any BSON value, so one odd record does not fail a whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Bson>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub salary: f64,
}

impl From<&EmployeeInput> for EmployeeDocument {
    fn from(input: &EmployeeInput) -> Self {
        Self {
            id: None,
            name: input.name.clone(),
            age: input.age,
            salary: input.salary,
        }
    }
}

impl From<EmployeeDocument> for Employee {
    fn from(doc: EmployeeDocument) -> Self {
        Self {
            id: match doc.id {
                Some(Bson::ObjectId(oid)) => oid.to_hex(),
                Some(Bson::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            },
            name: doc.name,
            age: doc.age,
            salary: doc.salary,
        }
    }
}
