//! Scale application.
//!
//! Raster images get a pixel width derived from their baseline width and an
//! `auto` height; with container resizing the immediate parent is scaled the
//! same way. Vector content is sized as a percentage on both axes. Elements
//! that cannot be measured are left untouched.

use crate::classify::{Classification, classify};
use crate::ledger::DimensionLedger;
use dom::{Document, NodeKey, format_px, parse_px};
use log::{debug, trace};
use origin_settings::OriginSettings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tags of elements the engine scales.
pub const VISUAL_TAGS: [&str; 2] = ["img", "svg"];

/// Parameters of one scale application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleParams {
    /// Target size in integer percent of the baseline.
    pub scale: u32,
    /// Also scale the immediate parent of raster images.
    #[serde(default, rename = "forceResize")]
    pub force_resize_containers: bool,
    /// Skip vector content entirely.
    #[serde(default, rename = "ignoreSvg")]
    pub ignore_vector: bool,
}

impl From<OriginSettings> for ScaleParams {
    fn from(settings: OriginSettings) -> Self {
        Self {
            scale: settings.scale,
            force_resize_containers: settings.force_resize_containers,
            ignore_vector: settings.ignore_vector,
        }
    }
}

/// Which elements an application visits.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'roots> {
    /// Every visual element of the document.
    Document,
    /// Visual elements within these subtrees (roots included).
    Subtrees(&'roots [NodeKey]),
}

/// Counts of what one application changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Visual elements whose size was written.
    pub elements: usize,
    /// Parent containers whose size was written.
    pub containers: usize,
    /// Visual elements left untouched.
    pub skipped: usize,
}

impl ApplyReport {
    fn absorb(&mut self, other: Self) {
        self.elements += other.elements;
        self.containers += other.containers;
        self.skipped += other.skipped;
    }
}

/// Connected `img`/`svg` elements within `scope`, in document order.
pub fn visual_elements(doc: &Document, scope: Scope<'_>) -> Vec<NodeKey> {
    let all = doc.elements_by_tag(&VISUAL_TAGS);
    match scope {
        Scope::Document => all,
        Scope::Subtrees(roots) => {
            let within: HashSet<NodeKey> = roots
                .iter()
                .flat_map(|root| doc.descendants(*root))
                .collect();
            all.into_iter().filter(|node| within.contains(node)).collect()
        }
    }
}

/// Scale every visual element in `scope`. Never fails; unmeasurable
/// elements are counted as skipped.
pub fn apply_scale(
    doc: &mut Document,
    ledger: &mut DimensionLedger,
    params: ScaleParams,
    scope: Scope<'_>,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for node in visual_elements(doc, scope) {
        report.absorb(scale_element(doc, ledger, node, params));
    }
    debug!(
        "Scaled {} elements and {} containers to {}% ({} skipped)",
        report.elements, report.containers, params.scale, report.skipped
    );
    report
}

fn scale_element(
    doc: &mut Document,
    ledger: &mut DimensionLedger,
    node: NodeKey,
    params: ScaleParams,
) -> ApplyReport {
    let skipped = ApplyReport {
        skipped: 1,
        ..ApplyReport::default()
    };
    let Some(kind) = classify(doc, node) else {
        return skipped;
    };
    if params.ignore_vector && kind.is_vector() {
        trace!("Ignoring vector element {node:?} ({kind:?})");
        return skipped;
    }
    let scaled = match kind {
        Classification::RasterImage => scale_by_width(doc, ledger, node, params.scale),
        Classification::InlineVectorImage
        | Classification::ExternalVectorImage
        | Classification::VectorMarkup => scale_by_percent(doc, ledger, node, params.scale),
    };
    if !scaled {
        return skipped;
    }
    let mut report = ApplyReport {
        elements: 1,
        ..ApplyReport::default()
    };
    if kind == Classification::RasterImage && params.force_resize_containers {
        if let Some(container) = doc.parent_element(node) {
            if scale_by_width(doc, ledger, container, params.scale) {
                report.containers = 1;
            }
        }
    }
    report
}

/// Width from the baseline pixel width, height `auto`.
fn scale_by_width(
    doc: &mut Document,
    ledger: &mut DimensionLedger,
    node: NodeKey,
    scale: u32,
) -> bool {
    let measurable = ledger.contains(node)
        || doc
            .computed_size(node)
            .is_some_and(|size| parse_px(&size.width).is_some());
    if !measurable {
        trace!("No pixel width for {node:?}; leaving it unchanged");
        return false;
    }
    let Some(baseline) = ledger.capture_if_absent(doc, node) else {
        return false;
    };
    let Some(original) = parse_px(&baseline.original_width) else {
        debug!(
            "Baseline width {:?} of {node:?} is not a pixel length; leaving it unchanged",
            baseline.original_width
        );
        return false;
    };
    let width = format_px(original * f64::from(scale) / 100.0);
    write_size(doc, node, &width, "auto")
}

/// Both axes as a percentage.
fn scale_by_percent(
    doc: &mut Document,
    ledger: &mut DimensionLedger,
    node: NodeKey,
    scale: u32,
) -> bool {
    if ledger.capture_if_absent(doc, node).is_none() {
        trace!("No computed size for {node:?}; leaving it unchanged");
        return false;
    }
    let percent = format!("{scale}%");
    write_size(doc, node, &percent, &percent)
}

pub(crate) fn write_size(doc: &mut Document, node: NodeKey, width: &str, height: &str) -> bool {
    let written = doc
        .set_style_property(node, "width", width)
        .and_then(|()| doc.set_style_property(node, "height", height));
    match written {
        Ok(()) => true,
        Err(err) => {
            debug!("Could not write size of {node:?}: {err:#}");
            false
        }
    }
}
