//! Page composition: turns a layout page into drawing plans.
//!
//! # Coordinate System
//!
//! Plans keep the layout's **top-left origin** (y grows downward). Text
//! positions are baselines. The PDF writer flips them into PDF space.
//!
//! # Export variants
//!
//! All variants go through one compositor, parameterized by a
//! [`PlacementPolicy`]:
//! - `flowing`: every block's lines stacked from the top margin, bbox ignored
//! - `positioned`: each block fitted into its own bbox
//! - `background`: as `positioned`, drawn over the original page with an
//!   opaque mask behind each block

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AppConfig;
use crate::fit::{layout_block_text, FitConfig, FitOutcome, FlowConfig, FontMetrics, Helvetica};
use crate::layout::{BoundingBox, LayoutBlock, LayoutDocument, LayoutPage};

/// Output rendering variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    /// Plain line dump, no geometry
    Flowing,
    /// Text placed in block boxes on blank pages
    Positioned,
    /// Text placed in block boxes over the original page
    #[default]
    Background,
}

impl ExportMode {
    pub const fn policy(self) -> PlacementPolicy {
        match self {
            Self::Flowing => PlacementPolicy {
                use_bbox: false,
                draw_background: false,
                mask_original: false,
            },
            Self::Positioned => PlacementPolicy {
                use_bbox: true,
                draw_background: false,
                mask_original: false,
            },
            Self::Background => PlacementPolicy {
                use_bbox: true,
                draw_background: true,
                mask_original: true,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flowing => "flowing",
            Self::Positioned => "positioned",
            Self::Background => "background",
        }
    }

    /// Whether export needs the source PDF.
    pub const fn needs_original(self) -> bool {
        self.policy().draw_background
    }
}

impl std::fmt::Display for ExportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flowing" => Ok(Self::Flowing),
            "positioned" => Ok(Self::Positioned),
            "background" => Ok(Self::Background),
            other => Err(format!("unknown export mode '{other}' (expected flowing, positioned or background)")),
        }
    }
}

/// What a variant does with block geometry and the source page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    /// Fit text into each block's bbox instead of flowing it
    pub use_bbox: bool,
    /// Draw the original page underneath
    pub draw_background: bool,
    /// Paint an opaque rectangle over each drawn block
    pub mask_original: bool,
}

/// One drawing primitive, in top-left page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Opaque white fill over a rectangle
    Mask(BoundingBox),
    /// One line of text, left-aligned at `x`
    Text {
        x: f32,
        baseline: f32,
        font_size: f32,
        text: String,
    },
}

/// Everything needed to produce one output page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub width: f32,
    pub height: f32,
    /// 0-based index of the source page to draw underneath
    pub background: Option<usize>,
    pub ops: Vec<DrawOp>,
}

impl PagePlan {
    const fn blank(width: f32, height: f32, background: Option<usize>) -> Self {
        Self {
            width,
            height,
            background,
            ops: Vec::new(),
        }
    }

    /// Number of text lines drawn on the page.
    pub fn text_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Text { .. })).count()
    }
}

/// Predicate `(page_index, block_index, block)`; `true` hides the block.
pub type SkipFn<'a> = &'a (dyn Fn(usize, usize, &LayoutBlock) -> bool + Send + Sync);

/// Compositor settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeOptions {
    pub mode: ExportMode,
    pub fit: FitConfig,
    pub flow: FlowConfig,
    /// Inset applied to each bbox before fitting
    pub inner_margin: f32,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            mode: ExportMode::default(),
            fit: FitConfig::default(),
            flow: FlowConfig::default(),
            inner_margin: 1.0,
        }
    }
}

impl ComposeOptions {
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            mode: config.export.mode,
            fit: config.layout.fit(),
            flow: config.layout.flow(),
            inner_margin: config.layout.inner_margin,
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Builds page plans from layout pages.
pub struct Compositor<'a> {
    options: ComposeOptions,
    metrics: &'a dyn FontMetrics,
    skip: Option<SkipFn<'a>>,
}

impl<'a> Compositor<'a> {
    /// Compositor measuring with Helvetica, the face the writer draws with.
    pub fn new(options: ComposeOptions) -> Self {
        Self {
            options,
            metrics: &Helvetica,
            skip: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: &'a dyn FontMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn with_skip(mut self, skip: SkipFn<'a>) -> Self {
        self.skip = Some(skip);
        self
    }

    pub const fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// Plans for every page of the document, in order.
    pub fn compose_document(&self, layout: &LayoutDocument) -> Vec<PagePlan> {
        layout
            .pages
            .iter()
            .flat_map(|page| self.render_page(page))
            .collect()
    }

    /// Plans for one layout page. Positioned variants yield exactly one
    /// plan; the flowing variant may spill onto continuation pages.
    pub fn render_page(&self, page: &LayoutPage) -> Vec<PagePlan> {
        let policy = self.options.mode.policy();
        if policy.use_bbox {
            vec![self.render_positioned(page, policy)]
        } else {
            self.render_flowing(page)
        }
    }

    fn is_skipped(&self, page: &LayoutPage, block_idx: usize, block: &LayoutBlock) -> bool {
        self.skip.is_some_and(|skip| skip(page.page_index, block_idx, block))
    }

    fn render_positioned(&self, page: &LayoutPage, policy: PlacementPolicy) -> PagePlan {
        let background = policy.draw_background.then_some(page.page_index);
        let mut plan = PagePlan::blank(page.width, page.height, background);
        let fit_config = &self.options.fit;

        for (block_idx, block) in page.blocks.iter().enumerate() {
            if self.is_skipped(page, block_idx, block) {
                debug!("Skipping block {} by request", block.block_id);
                continue;
            }

            let text = block.display_text();
            if text.is_empty() {
                continue;
            }

            let inner = block.bbox.inset(self.options.inner_margin);
            if inner.is_degenerate() {
                debug!("Block {} has a degenerate box, skipped", block.block_id);
                continue;
            }

            let fit = layout_block_text(&text, inner.width(), inner.height(), self.metrics, fit_config);
            match fit.outcome {
                FitOutcome::Dropped => {
                    debug!("Block {} does not fit even one line, dropped", block.block_id);
                    continue;
                }
                FitOutcome::Truncated => {
                    debug!("Block {} truncated to {} lines", block.block_id, fit.lines.len());
                }
                FitOutcome::Fitted => {}
            }

            if policy.mask_original && background.is_some() {
                plan.ops.push(DrawOp::Mask(block.bbox));
            }

            let line_height = fit.line_height(fit_config);
            let mut baseline = inner.y0 + line_height;
            for line in fit.lines {
                if baseline > inner.y1 {
                    break;
                }
                if !line.trim().is_empty() {
                    plan.ops.push(DrawOp::Text {
                        x: inner.x0,
                        baseline,
                        font_size: fit.font_size,
                        text: line,
                    });
                }
                baseline += line_height;
            }
        }

        plan
    }

    fn render_flowing(&self, page: &LayoutPage) -> Vec<PagePlan> {
        let flow = &self.options.flow;
        let line_height = flow.line_height();
        let bottom = page.height - flow.margin;

        let mut plans = Vec::new();
        let mut current = PagePlan::blank(page.width, page.height, None);
        let mut y = flow.margin;

        for (block_idx, block) in page.blocks.iter().enumerate() {
            if self.is_skipped(page, block_idx, block) {
                continue;
            }

            let text = block.display_text();
            if text.is_empty() {
                continue;
            }

            for line in text.split('\n').map(str::trim) {
                if line.is_empty() {
                    y += line_height;
                    continue;
                }

                if y > bottom {
                    plans.push(std::mem::replace(
                        &mut current,
                        PagePlan::blank(page.width, page.height, None),
                    ));
                    y = flow.margin;
                }

                current.ops.push(DrawOp::Text {
                    x: flow.margin,
                    baseline: y,
                    font_size: flow.font_size,
                    text: line.to_string(),
                });
                y += line_height;
            }

            y += line_height * 0.5;
        }

        plans.push(current);
        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 6 units wide at size 9.
    struct Monospace;

    impl FontMetrics for Monospace {
        fn text_width(&self, text: &str, font_size: f32) -> f32 {
            #[allow(clippy::cast_precision_loss)]
            let chars = text.chars().count() as f32;
            chars * font_size * 6.0 / 9.0
        }
    }

    fn page(blocks: Vec<LayoutBlock>) -> LayoutPage {
        LayoutPage {
            page_index: 2,
            width: 300.0,
            height: 400.0,
            blocks,
        }
    }

    fn block(bbox: [f32; 4], text: &str) -> LayoutBlock {
        LayoutBlock::new("b", BoundingBox::from(bbox), text)
    }

    fn compositor(mode: ExportMode) -> Compositor<'static> {
        Compositor::new(ComposeOptions::default().with_mode(mode)).with_metrics(&Monospace)
    }

    fn texts(plan: &PagePlan) -> Vec<(f32, f32, &str)> {
        plan.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, baseline, text, .. } => Some((*x, *baseline, text.as_str())),
                DrawOp::Mask(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_policies() {
        assert!(!ExportMode::Flowing.policy().use_bbox);
        assert_eq!(
            ExportMode::Positioned.policy(),
            PlacementPolicy {
                use_bbox: true,
                draw_background: false,
                mask_original: false
            }
        );
        assert!(ExportMode::Background.policy().mask_original);
        assert_eq!("Positioned".parse::<ExportMode>(), Ok(ExportMode::Positioned));
        assert!("sideways".parse::<ExportMode>().is_err());
    }

    #[test]
    fn test_degenerate_bbox_emits_nothing() {
        let p = page(vec![block([10.0, 10.0, 10.0, 50.0], "Hola")]);
        for mode in [ExportMode::Positioned, ExportMode::Background] {
            let plans = compositor(mode).render_page(&p);
            assert_eq!(plans.len(), 1);
            assert!(plans[0].ops.is_empty(), "{mode}: {:?}", plans[0].ops);
        }
    }

    #[test]
    fn test_background_masks_then_draws() {
        let mut b = block([10.0, 20.0, 210.0, 60.0], "Hola");
        b.translated_text = Some("Hello world this is a long sentence".to_string());
        let plans = compositor(ExportMode::Background).render_page(&page(vec![b]));

        let plan = &plans[0];
        assert_eq!(plan.background, Some(2));
        assert_eq!(plan.ops[0], DrawOp::Mask(BoundingBox::new(10.0, 20.0, 210.0, 60.0)));

        // Inner box 198 x 38 at size 9: line height 10.8, first baseline 21 + 10.8
        let lines = texts(plan);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].0 - 11.0).abs() < 1e-4);
        assert!((lines[0].1 - 31.8).abs() < 1e-4);
        assert!((lines[1].1 - 42.6).abs() < 1e-4);
        assert_eq!(lines[0].2, "Hello world this is a long");
        assert_eq!(lines[1].2, "sentence");
    }

    #[test]
    fn test_positioned_has_no_background_or_mask() {
        let plans = compositor(ExportMode::Positioned).render_page(&page(vec![block([10.0, 20.0, 210.0, 60.0], "Hola")]));
        assert_eq!(plans[0].background, None);
        assert!(plans[0].ops.iter().all(|op| matches!(op, DrawOp::Text { .. })));
        assert_eq!(plans[0].text_count(), 1);
    }

    #[test]
    fn test_dropped_block_gets_no_mask() {
        // Inner height 3 is below one line at the minimum size
        let p = page(vec![block([10.0, 10.0, 200.0, 15.0], "Hola")]);
        let plans = compositor(ExportMode::Background).render_page(&p);
        assert!(plans[0].ops.is_empty());
    }

    #[test]
    fn test_truncated_block_stays_inside_its_box() {
        let bbox = BoundingBox::new(10.0, 20.0, 70.0, 50.0);
        let text = vec!["palabra"; 40].join(" ");
        let inner = bbox.inset(1.0);
        let fit = layout_block_text(&text, inner.width(), inner.height(), &Monospace, &FitConfig::default());
        assert_eq!(fit.outcome, FitOutcome::Truncated);

        let mut b = LayoutBlock::new("b", bbox, "Hola");
        b.translated_text = Some(text);
        let plans = compositor(ExportMode::Background).render_page(&page(vec![b]));

        let lines = texts(&plans[0]);
        assert_eq!(lines.len(), fit.lines.len());
        for (_, baseline, _) in &lines {
            assert!(*baseline <= inner.y1, "baseline {baseline} below {}", inner.y1);
        }
    }

    #[test]
    fn test_blank_lines_advance_without_drawing() {
        let p = page(vec![block([0.0, 0.0, 200.0, 100.0], "uno\n\ndos")]);
        let plans = compositor(ExportMode::Positioned).render_page(&p);
        let lines = texts(&plans[0]);
        assert_eq!(lines.len(), 2);
        assert!((lines[1].1 - lines[0].1 - 2.0 * 10.8).abs() < 1e-3);
    }

    #[test]
    fn test_skip_predicate_hides_block() {
        let p = page(vec![
            block([0.0, 0.0, 200.0, 50.0], "uno"),
            block([0.0, 60.0, 200.0, 110.0], "dos"),
        ]);
        let skip = |page_idx: usize, block_idx: usize, _: &LayoutBlock| page_idx == 2 && block_idx == 0;
        let c = Compositor::new(ComposeOptions::default().with_mode(ExportMode::Positioned))
            .with_metrics(&Monospace)
            .with_skip(&skip);

        let plans = c.render_page(&p);
        let lines = texts(&plans[0]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].2, "dos");
    }

    #[test]
    fn test_flowing_stacks_blocks_from_margin() {
        let p = page(vec![block([0.0, 0.0, 1.0, 1.0], "uno\n\ndos"), block([0.0, 0.0, 0.0, 0.0], "tres")]);
        let plans = compositor(ExportMode::Flowing).render_page(&p);
        assert_eq!(plans.len(), 1);

        let lines = texts(&plans[0]);
        let ys: Vec<f32> = lines.iter().map(|l| l.1).collect();
        // 40, blank, 68, then half a line of spacing
        assert!((ys[0] - 40.0).abs() < 1e-3);
        assert!((ys[1] - 68.0).abs() < 1e-3);
        assert!((ys[2] - 89.0).abs() < 1e-3);
        assert!(lines.iter().all(|l| (l.0 - 40.0).abs() < 1e-4));
        assert_eq!(plans[0].background, None);
    }

    #[test]
    fn test_flowing_spills_onto_new_page() {
        let text = (0..40).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let plans = compositor(ExportMode::Flowing).render_page(&page(vec![block([0.0, 0.0, 1.0, 1.0], &text)]));

        // Baselines 40, 54, ..., 348 fit above the bottom margin at 360
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].text_count(), 23);
        assert_eq!(plans[1].text_count(), 17);
        assert!((plans[1].width - 300.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_compose_document_keeps_page_order() {
        let mut first = page(vec![block([0.0, 0.0, 100.0, 40.0], "a")]);
        first.page_index = 0;
        let mut second = page(vec![]);
        second.page_index = 1;
        let doc = LayoutDocument {
            document_id: "d".to_string(),
            pages: vec![first, second],
        };

        let plans = compositor(ExportMode::Background).compose_document(&doc);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].background, Some(0));
        assert_eq!(plans[1].background, Some(1));
        assert!(plans[1].ops.is_empty());
    }
}
