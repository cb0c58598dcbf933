//! Component registry: marker name to widget kind
//!
//! The registry is assembled once and is read-only afterwards. Instantiating
//! a kind is an exhaustive match, so adding a widget without a renderer
//! fails to compile.

use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::BTreeMap;

use super::components::ExampleChart;
use crate::error::HydrateError;

/// Every widget the hydrator knows how to mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    ExampleChart,
}

impl ComponentKind {
    pub const ALL: &'static [ComponentKind] = &[ComponentKind::ExampleChart];

    /// The name used in `data-component` markers
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::ExampleChart => "ExampleChart",
        }
    }

    /// Build a widget from marker props
    ///
    /// Props that do not fit the widget fall back to its defaults; the
    /// returned error says why.
    pub fn instantiate(self, props: &Value) -> (Widget, Option<HydrateError>) {
        match self {
            ComponentKind::ExampleChart => match serde_json::from_value(props.clone()) {
                Ok(chart) => (Widget::ExampleChart(chart), None),
                Err(source) => (
                    Widget::ExampleChart(ExampleChart::default()),
                    Some(HydrateError::InvalidProps {
                        component: self.name().to_string(),
                        source,
                    }),
                ),
            },
        }
    }
}

/// A widget ready to render
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    ExampleChart(ExampleChart),
}

impl Widget {
    pub fn render(&self) -> String {
        match self {
            Widget::ExampleChart(chart) => chart.render(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: BTreeMap<String, ComponentKind>,
}

lazy_static! {
    static ref BUILTIN: ComponentRegistry = ComponentRegistry::builtin();
}

impl ComponentRegistry {
    /// A registry with every built-in widget under its canonical name
    pub fn builtin() -> Self {
        ComponentKind::ALL
            .iter()
            .fold(Self::default(), |registry, kind| {
                registry.register(kind.name(), *kind)
            })
    }

    /// Shared built-in registry
    pub fn global() -> &'static ComponentRegistry {
        &BUILTIN
    }

    pub fn register(mut self, name: &str, kind: ComponentKind) -> Self {
        self.components.insert(name.to_string(), kind);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<ComponentKind, HydrateError> {
        self.components
            .get(name)
            .copied()
            .ok_or_else(|| HydrateError::UnknownComponent(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_registry() {
        let registry = ComponentRegistry::global();
        assert_eq!(
            registry.resolve("ExampleChart").unwrap(),
            ComponentKind::ExampleChart
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["ExampleChart"]);
    }

    #[test]
    fn test_unknown_component() {
        let err = ComponentRegistry::global().resolve("Nope").unwrap_err();
        assert!(matches!(err, HydrateError::UnknownComponent(ref n) if n == "Nope"));
    }

    #[test]
    fn test_alias_registration() {
        let registry = ComponentRegistry::builtin().register("Chart", ComponentKind::ExampleChart);
        assert_eq!(registry.resolve("Chart").unwrap(), ComponentKind::ExampleChart);
    }

    #[test]
    fn test_instantiate_with_props() {
        let (widget, err) = ComponentKind::ExampleChart.instantiate(&json!({
            "title": "Sales",
            "data": [{"label": "Q1", "value": 10}]
        }));
        assert!(err.is_none());
        let html = widget.render();
        assert!(html.contains("Sales"));
        assert!(html.contains("Q1"));
    }

    #[test]
    fn test_instantiate_bad_props_falls_back() {
        let (widget, err) = ComponentKind::ExampleChart.instantiate(&json!({"data": "oops"}));
        assert!(matches!(err, Some(HydrateError::InvalidProps { .. })));
        assert_eq!(widget, Widget::ExampleChart(ExampleChart::default()));
    }
}
