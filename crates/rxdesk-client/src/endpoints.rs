//! Backend endpoint catalogue
//!
//! Paths are relative to the configured base URL. Each resource kind also has
//! a fixed [`CollectionShape`] describing where its items sit in the response.

use rxdesk_core::ResourceKind;

use crate::envelope::CollectionShape;
use crate::transport::Endpoint;

const API_PREFIX: &str = "api/v1";

pub fn hospitals() -> Endpoint {
    Endpoint::new(format!("{API_PREFIX}/appointments/hospitals"))
}

pub fn hospital_departments(hospital_id: i64) -> Endpoint {
    Endpoint::new(format!(
        "{API_PREFIX}/appointments/hospitals/{hospital_id}/departments"
    ))
}

/// Doctors of one department, scoped to the hospital it was reached from
pub fn doctors(hospital_id: i64, department_id: i64) -> Endpoint {
    Endpoint::new(format!("{API_PREFIX}/appointments/doctors"))
        .with_query("department_id", department_id)
        .with_query("hospital_id", hospital_id)
}

pub fn user_orders(user_id: i64, limit: u32, status: Option<&str>) -> Endpoint {
    Endpoint::new(format!("{API_PREFIX}/orders/user/{user_id}"))
        .with_query("skip", 0)
        .with_query("limit", limit)
        .with_optional_query("status", status.filter(|s| !s.is_empty()))
}

pub fn user_appointments(user_id: i64, limit: u32) -> Endpoint {
    Endpoint::new(format!("{API_PREFIX}/appointments/user/{user_id}"))
        .with_query("skip", 0)
        .with_query("limit", limit)
}

pub fn user_prescriptions(user_id: i64) -> Endpoint {
    Endpoint::new(format!("{API_PREFIX}/prescriptions/user/{user_id}"))
}

/// Product catalogue; the trailing slash matches the backend's route
pub fn products(limit: u32, search: Option<&str>, category: Option<&str>) -> Endpoint {
    Endpoint::new(format!("{API_PREFIX}/products/"))
        .with_query("skip", 0)
        .with_query("limit", limit)
        .with_optional_query("search", search.filter(|s| !s.is_empty()))
        .with_optional_query("category", category.filter(|s| !s.is_empty()))
}

/// Where the collection for `kind` lives in a response body
pub fn collection_shape(kind: ResourceKind) -> CollectionShape {
    match kind {
        ResourceKind::Hospitals => CollectionShape::DataField("hospitals"),
        ResourceKind::Departments => CollectionShape::DataField("departments"),
        ResourceKind::Doctors => CollectionShape::DataField("doctors"),
        ResourceKind::Orders => CollectionShape::Data,
        ResourceKind::Appointments => CollectionShape::DataField("items"),
        ResourceKind::Prescriptions => CollectionShape::Bare,
        ResourceKind::Products => CollectionShape::DataField("items"),
    }
}
