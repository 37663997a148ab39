use serde::Serialize;
use usage_core::{AccountSelection, CategoryFilter, DateRange, Dimension, Granularity, Measure};
use usage_engine::AggregationFilter;

/// Viewer choices feeding one view refresh. `None` means not chosen yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub accounts: Option<AccountSelection>,
    pub view: Option<Dimension>,
    pub measure: Option<Measure>,
    pub category: CategoryFilter,
    pub range: DateRange,
    pub granularity: Granularity,
}

impl Selection {
    pub fn filter(&self) -> Option<AggregationFilter> {
        self.accounts.clone().map(|accounts| {
            AggregationFilter::new(accounts)
                .with_category(self.category)
                .with_range(self.range)
        })
    }
}

/// Result slot of a view: idle until the selection is complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Idle,
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Idle => None,
            Self::Ready(value) => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_state_serializes_with_status_tag() {
        let idle: ViewState<Vec<u32>> = ViewState::Idle;
        assert_eq!(
            serde_json::to_value(&idle).expect("json"),
            serde_json::json!({"status": "idle"})
        );
        let ready = ViewState::Ready(vec![1]);
        assert_eq!(
            serde_json::to_value(&ready).expect("json"),
            serde_json::json!({"status": "ready", "data": [1]})
        );
    }

    #[test]
    fn filter_requires_accounts() {
        assert!(Selection::default().filter().is_none());
        let selection = Selection {
            accounts: Some(AccountSelection::One("bio".to_string())),
            ..Selection::default()
        };
        assert!(selection.filter().is_some());
    }
}
