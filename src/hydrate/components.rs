//! Server-rendered interactive widgets

use serde::Deserialize;

use crate::helpers::escape_html;

/// One bar of an [`ExampleChart`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPoint {
    pub label: String,
    pub value: f64,
}

/// Horizontal bar chart
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExampleChart {
    pub title: String,
    pub data: Vec<DataPoint>,
}

impl Default for ExampleChart {
    fn default() -> Self {
        let data = [("A", 30.0), ("B", 60.0), ("C", 45.0), ("D", 80.0), ("E", 55.0)]
            .into_iter()
            .map(|(label, value)| DataPoint {
                label: label.to_string(),
                value,
            })
            .collect();
        Self {
            title: "Data Visualization".to_string(),
            data,
        }
    }
}

impl ExampleChart {
    pub fn render(&self) -> String {
        let max = self
            .data
            .iter()
            .map(|d| d.value)
            .fold(0.0_f64, f64::max);

        let mut html = String::from(r#"<div class="example-chart">"#);
        html.push_str(&format!(
            r#"<h3 class="example-chart-title">{}</h3><div class="example-chart-rows">"#,
            escape_html(&self.title)
        ));

        for point in &self.data {
            let width = if max > 0.0 {
                (point.value / max * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };
            html.push_str(&format!(
                r#"<div class="example-chart-row"><span class="example-chart-label">{}</span><div class="example-chart-track"><div class="example-chart-bar" style="width: {:.1}%"></div></div><span class="example-chart-value">{}</span></div>"#,
                escape_html(&point.label),
                width,
                point.value
            ));
        }

        html.push_str("</div></div>");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chart() {
        let html = ExampleChart::default().render();
        assert!(html.contains("Data Visualization"));
        assert!(html.contains("width: 100.0%"));
        assert!(html.contains("width: 37.5%"));
        assert_eq!(html.matches("example-chart-row\"").count(), 5);
    }

    #[test]
    fn test_chart_escapes_title() {
        let chart = ExampleChart {
            title: "<b>Sales</b>".to_string(),
            data: Vec::new(),
        };
        let html = chart.render();
        assert!(html.contains("&lt;b&gt;Sales&lt;/b&gt;"));
    }

    #[test]
    fn test_partial_props_keep_defaults() {
        let chart: ExampleChart = serde_json::from_str(r#"{"title":"X"}"#).unwrap();
        assert_eq!(chart.title, "X");
        assert_eq!(chart.data.len(), 5);
    }
}
