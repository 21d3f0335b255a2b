//! Fallback data for unreachable backends
//!
//! When a transport call fails outright, a loader asks the
//! [`FallbackRegistry`] for substitute items. Suppliers are registered per
//! resource kind; a kind with no supplier has no fallback and the load ends
//! in a network error.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rxdesk_core::prelude::*;
use rxdesk_core::{Appointment, Order, Resource, ResourceKind};

use crate::config::FallbackSettings;
use crate::request::ResourceRequest;

/// Produces substitute items for a request. Must be pure and deterministic.
pub trait FallbackSupplier<T>: Send + Sync {
    fn supply(&self, request: &ResourceRequest) -> Vec<T>;
}

impl<T, F> FallbackSupplier<T> for F
where
    F: Fn(&ResourceRequest) -> Vec<T> + Send + Sync,
{
    fn supply(&self, request: &ResourceRequest) -> Vec<T> {
        self(request)
    }
}

/// Per-kind fallback suppliers
///
/// Each entry holds an `Arc<dyn FallbackSupplier<T>>` for the `T` whose
/// `Resource::KIND` is the key.
#[derive(Default)]
pub struct FallbackRegistry {
    suppliers: HashMap<ResourceKind, Box<dyn Any + Send + Sync>>,
}

impl FallbackRegistry {
    /// A registry with no fallbacks
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in demo orders and appointments
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register::<Order>(|_: &ResourceRequest| demo_orders());
        registry.register::<Appointment>(|_: &ResourceRequest| demo_appointments());
        registry
    }

    /// Built-in fallbacks when enabled in settings, otherwise none
    pub fn from_settings(settings: &FallbackSettings) -> Self {
        if settings.enabled {
            Self::builtin()
        } else {
            debug!("Fallback data disabled by configuration");
            Self::empty()
        }
    }

    /// Register `supplier` for `T::KIND`, replacing any previous supplier
    pub fn register<T: Resource>(&mut self, supplier: impl FallbackSupplier<T> + 'static) {
        let supplier: Arc<dyn FallbackSupplier<T>> = Arc::new(supplier);
        self.suppliers.insert(T::KIND, Box::new(supplier));
    }

    pub fn unregister(&mut self, kind: ResourceKind) {
        self.suppliers.remove(&kind);
    }

    pub fn has(&self, kind: ResourceKind) -> bool {
        self.suppliers.contains_key(&kind)
    }

    /// Substitute items for `request`, or `None` when its kind has no
    /// supplier for `T`
    pub fn supply<T: Resource>(&self, request: &ResourceRequest) -> Option<Vec<T>> {
        let entry = self.suppliers.get(&request.kind)?;
        match entry.downcast_ref::<Arc<dyn FallbackSupplier<T>>>() {
            Some(supplier) => Some(supplier.supply(request)),
            None => {
                warn!(
                    "Fallback for {} is registered for a different record type",
                    request.kind
                );
                None
            }
        }
    }
}

impl fmt::Debug for FallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.suppliers.keys().map(ResourceKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("FallbackRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────
// Built-in Demo Data
// ─────────────────────────────────────────────────────────────────

fn demo_order(id: i64, order_id: &str, product: &str, status: &str, price: &str, created: &str) -> Order {
    Order {
        id,
        order_id: order_id.to_string(),
        product_name: product.to_string(),
        status: status.to_string(),
        price: price.to_string(),
        create_time: Some(created.to_string()),
        ..Order::default()
    }
}

/// The five demo orders, newest first
pub fn demo_orders() -> Vec<Order> {
    vec![
        demo_order(1, "ORD001", "中药材套装", "待发货", "¥299.00", "2023-12-10 14:30:00"),
        demo_order(2, "ORD002", "养生茶叶", "待收货", "¥158.00", "2023-12-08 09:15:00"),
        demo_order(3, "ORD003", "保健品", "已完成", "¥89.00", "2023-12-05 16:45:00"),
        demo_order(4, "ORD004", "滋补汤料", "待发货", "¥128.00", "2023-12-03 11:20:00"),
        demo_order(5, "ORD005", "养生枸杞", "待收货", "¥68.00", "2023-12-01 10:05:00"),
    ]
}

/// The three demo appointments
pub fn demo_appointments() -> Vec<Appointment> {
    let appointment = |id: i64,
                       patient: &str,
                       phone: &str,
                       doctor: &str,
                       hospital: &str,
                       department: &str,
                       date: &str,
                       time: &str,
                       status: &str,
                       symptoms: &str,
                       created: &str| Appointment {
        id,
        patient_name: patient.to_string(),
        patient_phone: Some(phone.to_string()),
        doctor_name: Some(doctor.to_string()),
        hospital_name: Some(hospital.to_string()),
        department_name: Some(department.to_string()),
        appointment_date: Some(date.to_string()),
        appointment_time: Some(time.to_string()),
        symptoms: Some(symptoms.to_string()),
        status: status.to_string(),
        created_at: Some(created.to_string()),
        ..Appointment::default()
    };

    vec![
        appointment(
            1, "张三", "138****1234", "李医生", "市人民医院", "内科", "2024-01-20",
            "09:00-09:30", "已确认", "头痛、发热", "2024-01-15 10:30:00",
        ),
        appointment(
            2, "李四", "139****5678", "王医生", "中医院", "骨科", "2024-01-22",
            "14:30-15:00", "待确认", "腰痛", "2024-01-16 15:20:00",
        ),
        appointment(
            3, "王五", "137****9012", "赵医生", "儿童医院", "儿科", "2024-01-18",
            "10:00-10:30", "已完成", "咳嗽、流鼻涕", "2024-01-12 09:15:00",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxdesk_core::{Hospital, Product};

    #[test]
    fn test_builtin_orders() {
        let registry = FallbackRegistry::builtin();
        let orders: Vec<Order> = registry
            .supply(&ResourceRequest::orders(1, 100, None))
            .unwrap();

        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, ["ORD001", "ORD002", "ORD003", "ORD004", "ORD005"]);
        let statuses: Vec<_> = orders.iter().map(|o| o.status.as_str()).collect();
        assert_eq!(statuses, ["待发货", "待收货", "已完成", "待发货", "待收货"]);
    }

    #[test]
    fn test_builtin_appointments() {
        let registry = FallbackRegistry::builtin();
        let appointments: Vec<Appointment> = registry
            .supply(&ResourceRequest::appointments(1, 100))
            .unwrap();
        let statuses: Vec<_> = appointments.iter().map(|a| a.status.as_str()).collect();
        assert_eq!(statuses, ["已确认", "待确认", "已完成"]);
    }

    #[test]
    fn test_supply_is_deterministic() {
        let registry = FallbackRegistry::builtin();
        let request = ResourceRequest::orders(1, 100, None);
        let first: Vec<Order> = registry.supply(&request).unwrap();
        let second: Vec<Order> = registry.supply(&request).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unregistered_kind_has_no_fallback() {
        let registry = FallbackRegistry::builtin();
        assert!(!registry.has(ResourceKind::Hospitals));
        assert!(registry
            .supply::<Hospital>(&ResourceRequest::hospitals())
            .is_none());
    }

    #[test]
    fn test_custom_supplier() {
        let mut registry = FallbackRegistry::empty();
        registry.register::<Product>(|request: &ResourceRequest| {
            vec![Product {
                id: 1,
                name: request.key.clone(),
                ..Product::default()
            }]
        });

        let products: Vec<Product> = registry
            .supply(&ResourceRequest::products(10, None))
            .unwrap();
        assert_eq!(products[0].name, "products");
    }

    #[test]
    fn test_disabled_settings_register_nothing() {
        let registry = FallbackRegistry::from_settings(&FallbackSettings { enabled: false });
        assert!(!registry.has(ResourceKind::Orders));
        assert!(!registry.has(ResourceKind::Appointments));
    }

    #[test]
    fn test_unregister() {
        let mut registry = FallbackRegistry::builtin();
        registry.unregister(ResourceKind::Orders);
        assert!(registry
            .supply::<Order>(&ResourceRequest::orders(1, 100, None))
            .is_none());
    }
}
