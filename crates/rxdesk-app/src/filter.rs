//! Local filtering of loaded content
//!
//! Filtering never re-fetches. A [`Filter`] is a keyed predicate; the empty
//! key is the identity filter. [`project`] derives the visible subset from
//! content, and [`FilterProjector`] keeps the active filter for a loader so
//! the view can be re-derived from its last content at any time.

use std::fmt;
use std::sync::Arc;

use rxdesk_client::Transport;
use rxdesk_core::{HasStatus, Resource};

use crate::loader::ResourceLoader;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A keyed, pure predicate over `T`
pub struct Filter<T> {
    key: String,
    predicate: Option<Predicate<T>>,
}

impl<T> Filter<T> {
    /// The identity filter, key `""`
    pub fn all() -> Self {
        Self {
            key: String::new(),
            predicate: None,
        }
    }

    pub fn new(
        key: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            predicate: Some(Arc::new(predicate)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_identity(&self) -> bool {
        self.predicate.is_none()
    }

    pub fn matches(&self, item: &T) -> bool {
        self.predicate.as_ref().map_or(true, |p| p(item))
    }
}

impl<T: HasStatus> Filter<T> {
    /// Match items whose status equals `status`; `""` matches everything
    pub fn status(status: impl Into<String>) -> Self {
        let status = status.into();
        if status.is_empty() {
            return Self::all();
        }
        let wanted = status.clone();
        Self::new(status, move |item: &T| item.status() == wanted)
    }
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T> Clone for Filter<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").field("key", &self.key).finish()
    }
}

/// The items of `content` matching `filter`, in their original order
pub fn project<T: Clone>(content: &[T], filter: &Filter<T>) -> Vec<T> {
    if filter.is_identity() {
        return content.to_vec();
    }
    content
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

/// Active filter for one loader-backed list
#[derive(Debug, Clone)]
pub struct FilterProjector<T> {
    filter: Filter<T>,
}

impl<T: Clone> Default for FilterProjector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FilterProjector<T> {
    pub fn new() -> Self {
        Self {
            filter: Filter::all(),
        }
    }

    /// Swap the active filter. Never touches the loader or the transport.
    pub fn apply_filter(&mut self, filter: Filter<T>) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &Filter<T> {
        &self.filter
    }

    /// Project arbitrary content through the active filter
    pub fn project(&self, content: &[T]) -> Vec<T> {
        project(content, &self.filter)
    }

    /// The filtered view of the loader's most recent content, or `None`
    /// when nothing has been loaded
    pub fn view<X>(&self, loader: &ResourceLoader<T, X>) -> Option<Vec<T>>
    where
        T: Resource,
        X: Transport + Send + Sync + 'static,
    {
        loader.last_content().map(|items| self.project(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::demo_orders;
    use rxdesk_core::Order;

    fn ids(orders: &[Order]) -> Vec<&str> {
        orders.iter().map(|o| o.order_id.as_str()).collect()
    }

    #[test]
    fn test_identity_filter_returns_everything() {
        let orders = demo_orders();
        assert_eq!(project(&orders, &Filter::all()), orders);
        assert_eq!(project(&orders, &Filter::status("")), orders);
    }

    #[test]
    fn test_status_filter_preserves_order() {
        let orders = demo_orders();
        let pending = project(&orders, &Filter::status("待发货"));
        assert_eq!(ids(&pending), ["ORD001", "ORD004"]);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let orders = demo_orders();
        let filter = Filter::status("待收货");
        let once = project(&orders, &filter);
        let twice = project(&once, &filter);
        assert_eq!(once, twice);
        assert_eq!(ids(&once), ["ORD002", "ORD005"]);
    }

    #[test]
    fn test_projection_does_not_mutate_content() {
        let orders = demo_orders();
        let _ = project(&orders, &Filter::status("已完成"));
        assert_eq!(orders.len(), 5);
    }

    #[test]
    fn test_unknown_status_matches_nothing() {
        let orders = demo_orders();
        assert!(project(&orders, &Filter::status("已取消")).is_empty());
    }

    #[test]
    fn test_custom_predicate() {
        let orders = demo_orders();
        let cheap = Filter::new("under-100", |o: &Order| {
            o.price
                .trim_start_matches('¥')
                .parse::<f64>()
                .map_or(false, |p| p < 100.0)
        });
        assert_eq!(ids(&project(&orders, &cheap)), ["ORD003", "ORD005"]);
        assert_eq!(cheap.key(), "under-100");
    }

    #[test]
    fn test_projector_swaps_filter() {
        let orders = demo_orders();
        let mut projector = FilterProjector::new();
        assert_eq!(projector.project(&orders).len(), 5);

        projector.apply_filter(Filter::status("待发货"));
        projector.apply_filter(Filter::status("待发货"));
        assert_eq!(projector.filter().key(), "待发货");
        assert_eq!(projector.project(&orders).len(), 2);

        projector.apply_filter(Filter::all());
        assert_eq!(projector.project(&orders).len(), 5);
    }
}
