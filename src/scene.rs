use crate::animation::{BeanFrame, Controller};
use crate::distribution::sample_gaussian;
use crate::lattice::Lattice;
use crate::path::DrawSource;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const RED: Rgb = Rgb::new(255, 0, 0);
pub const BLUE: Rgb = Rgb::new(0, 0, 255);
pub const YELLOW: Rgb = Rgb::new(255, 255, 0);

const FUNNEL_TOP_HALF: f32 = 50.0;
const FUNNEL_MOUTH_HALF: f32 = 30.0;
const BAR_GAP: f32 = 40.0;
const SEPARATOR_OVERHANG: f32 = 30.0;
const LABEL_DROP: f32 = 20.0;

/// Machine pixels: origin top-left, y grows down.
pub trait Backend {
    fn circle(&mut self, x: f32, y: f32, radius: f32, fill: Rgb, stroke: Rgb);
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: Rgb);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb);
    fn polyline(&mut self, points: &[(f32, f32)], color: Rgb);
    fn polygon(&mut self, points: &[(f32, f32)], fill: Rgb, stroke: Rgb);
    fn text(&mut self, x: f32, y: f32, s: &str, color: Rgb);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub count: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistogramView {
    pub top: f32,
    pub height: f32,
    pub width: f32,
    pub bars: Vec<Bar>,
    pub separators: Vec<((f32, f32), (f32, f32))>,
    pub curve: Vec<(f32, f32)>,
    pub curve_center_x: f32,
    pub standard_deviation: f64,
}

impl HistogramView {
    pub fn build<D: DrawSource>(machine: &Controller<D>) -> Self {
        let lattice = machine.lattice();
        let distribution = machine.distribution();
        let height = machine.config().bar_graph_height;
        let spacing = lattice.spacing();
        let row_offset = spacing / 2.0;

        // the histogram starts one margin below the last pin row
        let anchor_row = lattice.height().saturating_sub(2);
        let (anchor_y, radius) = lattice
            .pin_at(anchor_row, 0)
            .map(|p| (p.y, p.radius))
            .unwrap_or((0.0, lattice.radius()));
        let top = anchor_y + radius + spacing;
        let width = spacing * (lattice.width() + 1) as f32 + row_offset;
        let bar_w = (spacing - BAR_GAP).max(1.0);

        let stats = machine.statistics();
        let centre_col =
            distribution.curve_center_column(&stats, machine.settings().is_unbiased());

        let mut bars = Vec::with_capacity(distribution.len());
        let mut separators = Vec::new();
        let mut curve_center_x = 0.0;
        for (k, (&count, norm)) in distribution
            .counts()
            .iter()
            .zip(distribution.normalized())
            .enumerate()
        {
            let Some(pin) = lattice.pin_at(0, k) else {
                continue;
            };
            let x = pin.x - row_offset + pin.radius * 2.0;
            let h = height * norm as f32;
            bars.push(Bar {
                x,
                y: top + height - h,
                w: bar_w,
                h,
                count,
            });
            if k == centre_col {
                curve_center_x = x + bar_w / 2.0;
            }
            if k != 0 {
                let sx = pin.x - row_offset;
                separators.push(((sx, top - SEPARATOR_OVERHANG), (sx, top + height)));
            }
        }

        let curve = sample_gaussian(
            0,
            (width - BAR_GAP) as i32,
            height as f64,
            stats.standard_deviation,
            curve_center_x as f64,
        )
        .into_iter()
        .map(|(x, y)| (x as f32, top + height - y as f32))
        .collect();

        Self {
            top,
            height,
            width,
            bars,
            separators,
            curve,
            curve_center_x,
            standard_deviation: stats.standard_deviation,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height + LABEL_DROP
    }
}

/// Total pixel extent of a frame: `(width, height)`.
pub fn extent<D: DrawSource>(machine: &Controller<D>) -> (f32, f32) {
    let view = HistogramView::build(machine);
    (view.width, view.bottom() + LABEL_DROP)
}

pub fn draw_background(backend: &mut impl Backend, lattice: &Lattice) {
    if let Some(top) = lattice.top_pin() {
        let x = top.x;
        backend.polygon(
            &[
                (x - FUNNEL_TOP_HALF, 0.0),
                (x + FUNNEL_TOP_HALF, 0.0),
                (x + FUNNEL_MOUTH_HALF, FUNNEL_MOUTH_HALF),
                (x - FUNNEL_MOUTH_HALF, FUNNEL_MOUTH_HALF),
            ],
            YELLOW,
            BLACK,
        );
    }

    for pin in lattice.visible_pins() {
        backend.circle(pin.x, pin.y, pin.radius, pin.color, BLACK);
    }
}

pub fn draw_histogram(backend: &mut impl Backend, view: &HistogramView) {
    for bar in &view.bars {
        if bar.h > 0.0 {
            backend.rect(bar.x, bar.y, bar.w, bar.h, RED);
        }
    }
    backend.polyline(&view.curve, BLUE);
    for &(a, b) in &view.separators {
        backend.line(a, b, BLACK);
    }
    for bar in &view.bars {
        backend.text(bar.x, view.top + view.height + LABEL_DROP, &bar.count.to_string(), BLACK);
    }
}

pub fn draw_bean(backend: &mut impl Backend, frame: BeanFrame) {
    backend.circle(frame.x, frame.y, frame.radius, RED, BLACK);
}

pub fn draw_frame<D: DrawSource>(backend: &mut impl Backend, machine: &Controller<D>) {
    draw_background(backend, machine.lattice());
    draw_histogram(backend, &HistogramView::build(machine));
    if let Some(frame) = machine.last_frame() {
        draw_bean(backend, frame);
    }
}
