//! Resource requests
//!
//! A [`ResourceRequest`] names what a loader fetches: a human-readable key for
//! logs, the resource kind, the endpoint, and for drill-down requests the
//! master selection it is scoped to.

use std::fmt;

use rxdesk_client::{endpoints, Endpoint};
use rxdesk_core::ResourceKind;

/// The master item a detail request was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentSelection {
    pub kind: ResourceKind,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub key: String,
    pub kind: ResourceKind,
    pub endpoint: Endpoint,
    pub parent: Option<ParentSelection>,
}

impl ResourceRequest {
    pub fn new(key: impl Into<String>, kind: ResourceKind, endpoint: Endpoint) -> Self {
        Self {
            key: key.into(),
            kind,
            endpoint,
            parent: None,
        }
    }

    /// Scope this request to a master selection
    pub fn with_parent(mut self, kind: ResourceKind, id: i64) -> Self {
        self.parent = Some(ParentSelection { kind, id });
        self
    }

    pub fn hospitals() -> Self {
        Self::new("hospitals", ResourceKind::Hospitals, endpoints::hospitals())
    }

    pub fn departments(hospital_id: i64) -> Self {
        Self::new(
            format!("departments of hospital {hospital_id}"),
            ResourceKind::Departments,
            endpoints::hospital_departments(hospital_id),
        )
        .with_parent(ResourceKind::Hospitals, hospital_id)
    }

    /// Doctors of `department_id`, within the hospital the department list
    /// was loaded for
    pub fn doctors(hospital_id: i64, department_id: i64) -> Self {
        Self::new(
            format!("doctors of department {department_id} in hospital {hospital_id}"),
            ResourceKind::Doctors,
            endpoints::doctors(hospital_id, department_id),
        )
        .with_parent(ResourceKind::Departments, department_id)
    }

    /// Orders of `user_id`. A server-side status filter is optional; local
    /// filtering goes through a projector instead.
    pub fn orders(user_id: i64, limit: u32, status: Option<&str>) -> Self {
        let key = match status.filter(|s| !s.is_empty()) {
            Some(status) => format!("orders of user {user_id} ({status})"),
            None => format!("orders of user {user_id}"),
        };
        Self::new(
            key,
            ResourceKind::Orders,
            endpoints::user_orders(user_id, limit, status),
        )
    }

    pub fn appointments(user_id: i64, limit: u32) -> Self {
        Self::new(
            format!("appointments of user {user_id}"),
            ResourceKind::Appointments,
            endpoints::user_appointments(user_id, limit),
        )
    }

    pub fn prescriptions(user_id: i64) -> Self {
        Self::new(
            format!("prescriptions of user {user_id}"),
            ResourceKind::Prescriptions,
            endpoints::user_prescriptions(user_id),
        )
    }

    pub fn products(limit: u32, search: Option<&str>) -> Self {
        let key = match search.filter(|s| !s.is_empty()) {
            Some(search) => format!("products matching {search:?}"),
            None => "products".to_string(),
        };
        Self::new(
            key,
            ResourceKind::Products,
            endpoints::products(limit, search, None),
        )
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_departments_request_is_scoped_to_hospital() {
        let request = ResourceRequest::departments(7);
        assert_eq!(request.kind, ResourceKind::Departments);
        assert_eq!(request.key, "departments of hospital 7");
        assert_eq!(
            request.parent,
            Some(ParentSelection {
                kind: ResourceKind::Hospitals,
                id: 7
            })
        );
    }

    #[test]
    fn test_doctors_request_carries_both_ids() {
        let request = ResourceRequest::doctors(7, 3);
        assert_eq!(request.endpoint.query_value("hospital_id"), Some("7"));
        assert_eq!(request.endpoint.query_value("department_id"), Some("3"));
        assert_eq!(request.parent.map(|p| p.id), Some(3));
    }

    #[test]
    fn test_orders_key_mentions_status() {
        assert_eq!(
            ResourceRequest::orders(4, 100, Some("待收货")).to_string(),
            "orders of user 4 (待收货)"
        );
        assert_eq!(
            ResourceRequest::orders(4, 100, None).to_string(),
            "orders of user 4"
        );
    }

    #[test]
    fn test_top_level_requests_have_no_parent() {
        assert!(ResourceRequest::hospitals().parent.is_none());
        assert!(ResourceRequest::prescriptions(1).parent.is_none());
    }
}
