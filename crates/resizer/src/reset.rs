//! Restoring scaled elements to their baseline.

use crate::classify::{Classification, classify};
use crate::ledger::DimensionLedger;
use crate::scaling::{ApplyReport, Scope, visual_elements};
use dom::Document;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

/// Parameters of one reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetParams {
    /// Also restore the immediate parent of each visual element, when that
    /// parent has a baseline of its own.
    #[serde(default, rename = "forceResize")]
    pub force_resize_containers: bool,
    /// Accepted for symmetry with scaling; reversal ignores it so that
    /// elements scaled before vectors were ignored can still be restored.
    #[serde(default, rename = "ignoreSvg")]
    pub ignore_vector: bool,
}

/// Restore every visual element in `scope` that has a baseline entry, and
/// clear the entry. Elements without an entry are untouched.
pub fn apply_reset(
    doc: &mut Document,
    ledger: &mut DimensionLedger,
    params: ResetParams,
    scope: Scope<'_>,
) -> ApplyReport {
    let mut report = ApplyReport::default();
    for node in visual_elements(doc, scope) {
        let Some(kind) = classify(doc, node) else {
            continue;
        };
        if ledger.restore(doc, node) {
            report.elements += 1;
            if kind == Classification::VectorMarkup && doc.remove_attr(node, "viewBox") {
                trace!("Dropped viewBox of {node:?}");
            }
        } else {
            report.skipped += 1;
        }
        // Containers are restored from their own entry, whatever the child is now.
        if params.force_resize_containers {
            if let Some(container) = doc.parent_element(node) {
                if ledger.restore(doc, container) {
                    report.containers += 1;
                }
            }
        }
    }
    debug!(
        "Reset {} elements and {} containers ({} had no baseline)",
        report.elements, report.containers, report.skipped
    );
    report
}
