//! Domain records returned by the backend
//!
//! Field names follow the backend's JSON (snake_case). Every record uses
//! `#[serde(default)]` so that optional or newly added backend fields never
//! turn a well-formed collection into a decode failure.

use std::fmt;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// The collections the client knows how to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Hospitals,
    Departments,
    Doctors,
    Orders,
    Appointments,
    Prescriptions,
    Products,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Hospitals => "hospitals",
            ResourceKind::Departments => "departments",
            ResourceKind::Doctors => "doctors",
            ResourceKind::Orders => "orders",
            ResourceKind::Appointments => "appointments",
            ResourceKind::Prescriptions => "prescriptions",
            ResourceKind::Products => "products",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record type that can be fetched as a collection.
///
/// `KIND` ties the Rust type to the resource kind used for endpoint shapes and
/// fallback registration.
pub trait Resource:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: ResourceKind;

    /// Stable backend identifier, used to scope drill-down requests.
    fn id(&self) -> i64;
}

/// Records carrying a workflow status string (待发货, 已确认, issued, ...)
pub trait HasStatus {
    fn status(&self) -> &str;
}

/// Deserialize an explicit `null` as the field's default.
///
/// `#[serde(default)]` only covers absent keys; the backend also sends
/// `null` for unset columns.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ─────────────────────────────────────────────────────────────────
// Hospitals / Departments / Doctors
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hospital {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Grade, e.g. 三甲
    pub level: Option<String>,
    pub description: Option<String>,
}

impl Resource for Hospital {
    const KIND: ResourceKind = ResourceKind::Hospitals;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Department {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub description: Option<String>,
}

impl Resource for Department {
    const KIND: ResourceKind = ResourceKind::Departments;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doctor {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Professional title, e.g. 主任医师
    pub title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub department_id: i64,
    pub department_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hospital_id: i64,
    pub hospital_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub specialties: Vec<String>,
    pub experience_years: Option<u32>,
    pub education: Option<String>,
    pub introduction: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub available_times: Vec<String>,
}

impl Resource for Doctor {
    const KIND: ResourceKind = ResourceKind::Doctors;

    fn id(&self) -> i64 {
        self.id
    }
}

// ─────────────────────────────────────────────────────────────────
// Orders / Appointments / Prescriptions
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: i64,
    /// Human-facing order number, e.g. ORD001
    #[serde(deserialize_with = "null_as_default")]
    pub order_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub product_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    /// Display price as sent by the backend, e.g. ¥299.00
    #[serde(deserialize_with = "null_as_default")]
    pub price: String,
    pub create_time: Option<String>,
    pub pay_time: Option<String>,
    pub shipping_time: Option<String>,
    pub shipping_address: Option<String>,
}

impl Resource for Order {
    const KIND: ResourceKind = ResourceKind::Orders;

    fn id(&self) -> i64 {
        self.id
    }
}

impl HasStatus for Order {
    fn status(&self) -> &str {
        &self.status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appointment {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub patient_name: String,
    pub patient_phone: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub doctor_id: i64,
    pub doctor_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub hospital_id: i64,
    pub hospital_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub department_id: i64,
    pub department_name: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub symptoms: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub created_at: Option<String>,
}

impl Resource for Appointment {
    const KIND: ResourceKind = ResourceKind::Appointments;

    fn id(&self) -> i64 {
        self.id
    }
}

impl HasStatus for Appointment {
    fn status(&self) -> &str {
        &self.status
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prescription {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub symptoms: String,
    pub diagnosis: Option<String>,
    pub prescription_content: Option<String>,
    pub doctor_name: Option<String>,
    /// draft, issued or dispensed
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub image_url: Option<String>,
    pub created_time: Option<NaiveDateTime>,
    pub updated_time: Option<NaiveDateTime>,
}

impl Resource for Prescription {
    const KIND: ResourceKind = ResourceKind::Prescriptions;

    fn id(&self) -> i64 {
        self.id
    }
}

impl HasStatus for Prescription {
    fn status(&self) -> &str {
        &self.status
    }
}

// ─────────────────────────────────────────────────────────────────
// Products
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    pub original_price: Option<f64>,
    pub description: Option<String>,
    pub category_name: Option<String>,
    pub pharmacy_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub stock_quantity: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub is_prescription_required: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
}

impl Resource for Product {
    const KIND: ResourceKind = ResourceKind::Products;

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_deserializes_backend_fields() {
        let order: Order = serde_json::from_value(json!({
            "id": 12,
            "order_id": "ORDER_20240101_ab12cd34",
            "user_id": 3,
            "product_name": "中药材套装",
            "status": "待发货",
            "price": "¥299.00",
            "create_time": "2023-12-10 14:30:00",
            "created_at": "2023-12-10T14:30:00",
            "updated_at": "2023-12-10T14:30:00"
        }))
        .unwrap();

        assert_eq!(order.id, 12);
        assert_eq!(order.status(), "待发货");
        assert_eq!(order.pay_time, None);
    }

    #[test]
    fn test_doctor_missing_fields_default() {
        let doctor: Doctor = serde_json::from_value(json!({"id": 5, "name": "李医生"})).unwrap();
        assert_eq!(doctor.id(), 5);
        assert!(doctor.specialties.is_empty());
        assert_eq!(doctor.experience_years, None);
    }

    #[test]
    fn test_null_columns_fall_back_to_defaults() {
        let order: Order = serde_json::from_value(json!({
            "id": 7,
            "order_id": "ORD007",
            "user_id": null,
            "product_name": null,
            "status": null,
            "price": null
        }))
        .unwrap();
        assert_eq!(order.user_id, 0);
        assert_eq!(order.product_name, "");
        assert_eq!(order.status(), "");

        let doctor: Doctor = serde_json::from_value(json!({
            "id": 5,
            "name": "李医生",
            "specialties": null,
            "experience_years": null,
            "available_times": null
        }))
        .unwrap();
        assert!(doctor.specialties.is_empty());
        assert_eq!(doctor.experience_years, None);
    }

    #[test]
    fn test_prescription_parses_fractional_timestamps() {
        let prescription: Prescription = serde_json::from_value(json!({
            "id": 1,
            "user_id": 9,
            "symptoms": "头痛",
            "status": "issued",
            "created_time": "2024-03-01T08:15:30.123456",
            "updated_time": "2024-03-01T08:15:30"
        }))
        .unwrap();

        assert!(prescription.created_time.is_some());
        assert_eq!(prescription.status(), "issued");
    }

    #[test]
    fn test_resource_kind_display_matches_serde() {
        assert_eq!(ResourceKind::Departments.to_string(), "departments");
        assert_eq!(
            serde_json::to_value(ResourceKind::Prescriptions).unwrap(),
            json!("prescriptions")
        );
    }

    #[test]
    fn test_resource_kind_constants() {
        assert_eq!(Order::KIND, ResourceKind::Orders);
        assert_eq!(Doctor::KIND, ResourceKind::Doctors);
        assert_eq!(Appointment::KIND, ResourceKind::Appointments);
    }
}
