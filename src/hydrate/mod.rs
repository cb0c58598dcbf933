//! Content hydration
//!
//! Upgrades a rendered post fragment: component markers are swapped for
//! mount points holding the rendered widget, and headings are wrapped in an
//! annotation span. The caller owns a [`HydrationSession`] that caches mounts
//! per container and tears them down when the container's content changes.

mod components;
mod dom;
mod heading;
mod lifecycle;
mod registry;

pub use components::{DataPoint, ExampleChart};
pub use heading::{palette_color, HeadingAnnotation};
pub use lifecycle::{CaptureTicket, MountState, ResizeGate};
pub use registry::{ComponentKind, ComponentRegistry, Widget};

use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::HydrationConfig;
use crate::error::HydrateError;
use crate::helpers::{escape_html, hash_content};

/// A mount point created for one marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    /// `<container>:<n>`, unique within a session
    pub id: String,
    pub component: ComponentKind,
    pub state: MountState,
}

/// Result of one hydration pass
#[derive(Debug)]
pub struct HydratedFragment {
    pub html: String,
    pub mounts: Vec<Mount>,
    pub headings: Vec<HeadingAnnotation>,
    /// Post-animation captures to run, one per heading
    pub captures: Vec<CaptureTicket>,
    /// Markers that were skipped or mounted with fallback props
    pub warnings: Vec<HydrateError>,
    /// True when the container already held this content
    pub reused: bool,
}

#[derive(Debug)]
struct ContainerState {
    content_hash: u64,
    generation: u64,
    animation_ms: u32,
    html: String,
    mounts: Vec<Mount>,
    headings: Vec<HeadingAnnotation>,
    captured: BTreeSet<usize>,
    resize: ResizeGate,
}

/// Mount cache for a set of containers
#[derive(Debug, Default)]
pub struct HydrationSession {
    containers: BTreeMap<String, ContainerState>,
    next_generation: u64,
}

impl HydrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Live mounts of a container
    pub fn mounts(&self, container: &str) -> &[Mount] {
        self.containers
            .get(container)
            .map(|c| c.mounts.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_hydrated(&self, container: &str) -> bool {
        self.containers.contains_key(container)
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Discard a container's mounts and cancel its pending captures
    ///
    /// Returns the number of mounts torn down.
    pub fn teardown(&mut self, container: &str) -> usize {
        let Some(mut state) = self.containers.remove(container) else {
            return 0;
        };
        let mut count = 0;
        for mount in state.mounts.iter_mut().filter(|m| m.state.is_mounted()) {
            mount.state.tear_down();
            tracing::debug!("Tore down mount {}", mount.id);
            count += 1;
        }
        self.bump_generation();
        count
    }

    pub fn teardown_all(&mut self) -> usize {
        let containers: Vec<String> = self.containers.keys().cloned().collect();
        containers.iter().map(|c| self.teardown(c)).sum()
    }

    /// Report a size change of a container
    ///
    /// The first report is the initial layout and is ignored. Later reports
    /// re-annotate the headings: pending captures are invalidated and fresh
    /// tickets are returned.
    pub fn observe_resize(&mut self, container: &str) -> Vec<CaptureTicket> {
        let generation = self.next_generation + 1;
        let Some(state) = self.containers.get_mut(container) else {
            return Vec::new();
        };
        if !state.resize.observe() {
            return Vec::new();
        }

        state.generation = generation;
        state.captured.clear();
        let tickets = state
            .headings
            .iter()
            .map(|h| CaptureTicket::new(container, h.index, generation, state.animation_ms))
            .collect();
        self.next_generation = generation;
        tickets
    }

    /// Run a capture if its ticket is still current
    ///
    /// Returns false for tickets issued before a teardown, a content change
    /// or a re-annotation.
    pub fn complete_capture(&mut self, ticket: &CaptureTicket) -> bool {
        match self.containers.get_mut(&ticket.container) {
            Some(state)
                if state.generation == ticket.generation
                    && ticket.heading < state.headings.len() =>
            {
                state.captured.insert(ticket.heading);
                true
            }
            _ => {
                tracing::debug!(
                    "Dropped stale capture for heading {} of {}",
                    ticket.heading,
                    ticket.container
                );
                false
            }
        }
    }

    pub fn is_captured(&self, container: &str, heading: usize) -> bool {
        self.containers
            .get(container)
            .map_or(false, |c| c.captured.contains(&heading))
    }
}

/// Marker found in a fragment, before resolution
struct Marker {
    id: ego_tree::NodeId,
    name: String,
    props: Option<String>,
}

/// Heading found in a fragment
struct HeadingNode {
    id: ego_tree::NodeId,
    inner: String,
    text: String,
}

pub struct Hydrator<'r> {
    config: HydrationConfig,
    registry: &'r ComponentRegistry,
    marker: Selector,
    heading: Selector,
}

impl Hydrator<'static> {
    /// Hydrator backed by the built-in component registry
    pub fn new(config: &HydrationConfig) -> Result<Self> {
        Self::with_registry(config, ComponentRegistry::global())
    }
}

impl<'r> Hydrator<'r> {
    pub fn with_registry(config: &HydrationConfig, registry: &'r ComponentRegistry) -> Result<Self> {
        let marker = parse_selector(&format!("[{}]", config.marker_attr))?;
        let heading = parse_selector(&config.heading)?;
        Ok(Self {
            config: config.clone(),
            registry,
            marker,
            heading,
        })
    }

    /// Hydrate `html` into `container`
    ///
    /// The same container and content yield the cached result. New content
    /// tears the container's previous mounts down before mounting again.
    pub fn hydrate(
        &self,
        session: &mut HydrationSession,
        container: &str,
        html: &str,
    ) -> Result<HydratedFragment> {
        let content_hash = hash_content(html);

        if let Some(state) = session.containers.get(container) {
            if state.content_hash == content_hash {
                tracing::debug!("Container {} unchanged, reusing mounts", container);
                return Ok(HydratedFragment {
                    html: state.html.clone(),
                    mounts: state.mounts.clone(),
                    headings: state.headings.clone(),
                    captures: Vec::new(),
                    warnings: Vec::new(),
                    reused: true,
                });
            }
            let torn_down = session.teardown(container);
            tracing::debug!(
                "Content of {} changed, tore down {} mount(s)",
                container,
                torn_down
            );
        }

        let mut doc = Html::parse_fragment(html);
        let mut warnings = Vec::new();
        let mut mounts = Vec::new();
        let mut mount_splices = Vec::new();

        for marker in self.find_markers(&doc) {
            let kind = match self.registry.resolve(&marker.name) {
                Ok(kind) => kind,
                Err(err) => {
                    tracing::warn!("{}, leaving marker in place", err);
                    warnings.push(err);
                    continue;
                }
            };

            let props = match parse_props(kind, marker.props.as_deref()) {
                Ok(props) => props,
                Err(err) => {
                    tracing::warn!("{}, mounting with empty props", err);
                    warnings.push(err);
                    Value::Object(Default::default())
                }
            };

            let (widget, fallback) = kind.instantiate(&props);
            if let Some(err) = fallback {
                tracing::warn!("{}, mounting with default props", err);
                warnings.push(err);
            }

            let mount_id = format!("{}:{}", container, mounts.len());
            let placeholder = format!("folio-mount:{:016x}:{}", content_hash, mounts.len());
            dom::replace_with_comment(&mut doc, marker.id, &placeholder);

            let markup = format!(
                r#"<div data-mount="{}" data-mounted-component="{}">{}</div>"#,
                escape_html(&mount_id),
                kind.name(),
                widget.render()
            );
            mount_splices.push((placeholder, markup));
            mounts.push(Mount {
                id: mount_id,
                component: kind,
                state: MountState::Unmounted,
            });
        }

        let mut headings = Vec::new();
        let mut heading_splices = Vec::new();
        for (index, node) in self.find_headings(&doc)?.into_iter().enumerate() {
            let annotation = HeadingAnnotation::new(index, &node.text, &self.config);
            let placeholder = format!("folio-heading:{:016x}:{}", content_hash, index);
            dom::replace_children_with_comment(&mut doc, node.id, &placeholder);
            heading_splices.push((placeholder, annotation.wrap(&node.inner, &self.config)));
            headings.push(annotation);
        }

        let mut output = dom::fragment_html(&doc)?;

        // Heading wrappers may carry mount placeholders, so they go in first.
        for (placeholder, markup) in &heading_splices {
            output = splice(&output, placeholder, markup).unwrap_or(output);
        }
        for ((placeholder, markup), mount) in mount_splices.iter().zip(mounts.iter_mut()) {
            match splice(&output, placeholder, markup) {
                Some(spliced) => {
                    output = spliced;
                    mount.state.mount();
                    tracing::debug!("Mounted {} at {}", mount.component.name(), mount.id);
                }
                None => tracing::warn!("Mount point {} vanished from output", mount.id),
            }
        }

        let generation = session.bump_generation();
        let captures = headings
            .iter()
            .map(|h| {
                CaptureTicket::new(container, h.index, generation, self.config.animation_duration)
            })
            .collect();

        session.containers.insert(
            container.to_string(),
            ContainerState {
                content_hash,
                generation,
                animation_ms: self.config.animation_duration,
                html: output.clone(),
                mounts: mounts.clone(),
                headings: headings.clone(),
                captured: BTreeSet::new(),
                resize: ResizeGate::default(),
            },
        );

        Ok(HydratedFragment {
            html: output,
            mounts,
            headings,
            captures,
            warnings,
            reused: false,
        })
    }

    /// Markers in document order; a marker nested in another marker belongs
    /// to the outer one and is not hydrated on its own
    fn find_markers(&self, doc: &Html) -> Vec<Marker> {
        doc.root_element()
            .select(&self.marker)
            .filter(|element| !self.inside_marker(*element))
            .map(|element| {
                let attrs = element.value();
                Marker {
                    id: element.id(),
                    name: attrs
                        .attr(&self.config.marker_attr)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                    props: attrs.attr(&self.config.props_attr).map(str::to_string),
                }
            })
            .collect()
    }

    fn find_headings(&self, doc: &Html) -> Result<Vec<HeadingNode>> {
        doc.root_element()
            .select(&self.heading)
            .filter(|element| !self.inside_marker(*element))
            .map(|element| {
                Ok(HeadingNode {
                    id: element.id(),
                    inner: dom::inner_html(element)?,
                    text: element.text().collect::<String>().trim().to_string(),
                })
            })
            .collect()
    }

    fn inside_marker(&self, element: ElementRef<'_>) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().attr(&self.config.marker_attr).is_some())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector {:?}: {:?}", selector, e))
}

/// Absent or blank props mean an empty object
fn parse_props(kind: ComponentKind, raw: Option<&str>) -> Result<Value, HydrateError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Value::Object(Default::default())),
        Some(raw) => serde_json::from_str(raw).map_err(|source| HydrateError::InvalidProps {
            component: kind.name().to_string(),
            source,
        }),
    }
}

fn splice(html: &str, placeholder: &str, markup: &str) -> Option<String> {
    let comment = format!("<!--{}-->", placeholder);
    html.contains(&comment)
        .then(|| html.replacen(&comment, markup, 1))
}
