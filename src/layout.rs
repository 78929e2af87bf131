//! Printable-document layout planning.
//!
//! Decides whether the summary block of a bill/prescription lands on page
//! one or spills to page two of an A4 sheet. The decision is measurement-
//! driven: measure, decide, reflow to the compressed variant, re-measure.
//! Measurement sits behind `SectionMeasurer` so the planner is testable
//! without a rendering surface; the production implementation estimates
//! heights from structured data.

use serde::Serialize;

/// Printable body height of an A4 page in millimetres (margins excluded).
pub const PAGE_CAPACITY_MM: f64 = 257.0;

/// Item count at which the summary always moves to page two.
const FORCE_PAGE_TWO_AT: usize = 8;
/// Item count at which the compressed variant is attempted before falling back.
const COMPRESS_AT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryVariant {
    Regular,
    Compressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPlacement {
    PageOne,
    PageTwo,
}

/// Outcome of layout planning for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutPlan {
    pub placement: SummaryPlacement,
    pub variant: SummaryVariant,
    pub page_count: u8,
}

/// Measures the rendered height of a page-one body holding `item_count`
/// rows plus the summary block in the given variant.
pub trait SectionMeasurer {
    fn page_one_height(&self, item_count: usize, variant: SummaryVariant) -> f64;
}

/// Plan the placement of the summary block.
///
/// - 8 items or more: summary always on page two, no measurement.
/// - 7 items: reflow to the compressed variant, re-measure, fall back to
///   page two if it still overflows.
/// - 6 items or fewer: summary stays on page one unless the measured
///   height overflows the page capacity.
pub fn plan_layout(item_count: usize, measurer: &dyn SectionMeasurer) -> LayoutPlan {
    if item_count >= FORCE_PAGE_TWO_AT {
        return page_two_plan(SummaryVariant::Regular);
    }

    if item_count == COMPRESS_AT {
        let height = measurer.page_one_height(item_count, SummaryVariant::Compressed);
        if height <= PAGE_CAPACITY_MM {
            return LayoutPlan {
                placement: SummaryPlacement::PageOne,
                variant: SummaryVariant::Compressed,
                page_count: 1,
            };
        }
        return page_two_plan(SummaryVariant::Regular);
    }

    let height = measurer.page_one_height(item_count, SummaryVariant::Regular);
    if height <= PAGE_CAPACITY_MM {
        LayoutPlan {
            placement: SummaryPlacement::PageOne,
            variant: SummaryVariant::Regular,
            page_count: 1,
        }
    } else {
        page_two_plan(SummaryVariant::Regular)
    }
}

fn page_two_plan(variant: SummaryVariant) -> LayoutPlan {
    LayoutPlan {
        placement: SummaryPlacement::PageTwo,
        variant,
        page_count: 2,
    }
}

// ═══════════════════════════════════════════════════════════
// Structured-data estimator
// ═══════════════════════════════════════════════════════════

/// Height estimator from structured data — no rendering surface needed.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasurer {
    pub header_mm: f64,
    pub patient_block_mm: f64,
    pub row_mm: f64,
    pub summary_mm: f64,
    pub summary_compressed_mm: f64,
}

impl Default for EstimatedMeasurer {
    fn default() -> Self {
        Self {
            header_mm: 42.0,
            patient_block_mm: 26.0,
            row_mm: 11.0,
            summary_mm: 62.0,
            summary_compressed_mm: 44.0,
        }
    }
}

impl SectionMeasurer for EstimatedMeasurer {
    fn page_one_height(&self, item_count: usize, variant: SummaryVariant) -> f64 {
        let summary = match variant {
            SummaryVariant::Regular => self.summary_mm,
            SummaryVariant::Compressed => self.summary_compressed_mm,
        };
        self.header_mm + self.patient_block_mm + item_count as f64 * self.row_mm + summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Records every measurement request; answers from a fixed height.
    struct RecordingMeasurer {
        height: f64,
        calls: RefCell<Vec<SummaryVariant>>,
    }

    impl RecordingMeasurer {
        fn new(height: f64) -> Self {
            Self { height, calls: RefCell::new(Vec::new()) }
        }
    }

    impl SectionMeasurer for RecordingMeasurer {
        fn page_one_height(&self, _item_count: usize, variant: SummaryVariant) -> f64 {
            self.calls.borrow_mut().push(variant);
            self.height
        }
    }

    #[test]
    fn five_items_fit_on_page_one() {
        let plan = plan_layout(5, &EstimatedMeasurer::default());
        assert_eq!(plan.placement, SummaryPlacement::PageOne);
        assert_eq!(plan.variant, SummaryVariant::Regular);
        assert_eq!(plan.page_count, 1);
    }

    #[test]
    fn nine_items_always_page_two_without_measuring() {
        let measurer = RecordingMeasurer::new(0.0);
        let plan = plan_layout(9, &measurer);
        assert_eq!(plan.placement, SummaryPlacement::PageTwo);
        assert_eq!(plan.page_count, 2);
        assert!(measurer.calls.borrow().is_empty(), "no measurement for >=8 items");
    }

    #[test]
    fn seven_items_attempt_compression_first() {
        let measurer = RecordingMeasurer::new(PAGE_CAPACITY_MM - 1.0);
        let plan = plan_layout(7, &measurer);
        assert_eq!(plan.placement, SummaryPlacement::PageOne);
        assert_eq!(plan.variant, SummaryVariant::Compressed);
        assert_eq!(measurer.calls.borrow().as_slice(), &[SummaryVariant::Compressed]);
    }

    #[test]
    fn seven_items_fall_back_to_page_two_when_still_overflowing() {
        let measurer = RecordingMeasurer::new(PAGE_CAPACITY_MM + 1.0);
        let plan = plan_layout(7, &measurer);
        assert_eq!(plan.placement, SummaryPlacement::PageTwo);
        assert_eq!(plan.page_count, 2);
        // The compressed variant was measured before falling back
        assert_eq!(measurer.calls.borrow().as_slice(), &[SummaryVariant::Compressed]);
    }

    #[test]
    fn few_items_spill_when_measurement_overflows() {
        // Count alone says page one, but the measured height disagrees
        let measurer = RecordingMeasurer::new(PAGE_CAPACITY_MM + 10.0);
        let plan = plan_layout(3, &measurer);
        assert_eq!(plan.placement, SummaryPlacement::PageTwo);
    }

    #[test]
    fn estimator_grows_with_item_count() {
        let est = EstimatedMeasurer::default();
        let h5 = est.page_one_height(5, SummaryVariant::Regular);
        let h6 = est.page_one_height(6, SummaryVariant::Regular);
        assert!(h6 > h5);
        assert!(
            est.page_one_height(6, SummaryVariant::Compressed) < h6,
            "compressed variant must be shorter"
        );
    }

    #[test]
    fn default_estimates_match_page_thresholds() {
        // 5 items fit, 9 items forced over; 7 fits compressed
        let est = EstimatedMeasurer::default();
        assert!(est.page_one_height(5, SummaryVariant::Regular) <= PAGE_CAPACITY_MM);
        assert!(est.page_one_height(7, SummaryVariant::Compressed) <= PAGE_CAPACITY_MM);
        assert_eq!(plan_layout(9, &est).placement, SummaryPlacement::PageTwo);
    }
}
