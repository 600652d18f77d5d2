//   grid                      triangle
//   0   1   2   3   4                 2
//     0   1   2   3   4             1   2
//   0   1   2   3   4             1   2   3
//     0   1   2   3   4         0   1   2   3
//   0   1   2   3   4           (bins)

use crate::config::MachineConfig;
use crate::scene::Rgb;

pub const TOP_OFFSET: f32 = 15.0;

pub const PIN_COLOR: Rgb = Rgb::new(153, 255, 102);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pin {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
    pub visible: bool,
}

#[derive(Clone, Debug)]
pub struct Lattice {
    width: usize,
    height: usize,
    spacing: f32,
    radius: f32,
    pins: Vec<Pin>,
}

impl Lattice {
    pub fn new(cfg: &MachineConfig) -> Self {
        Self::with_dimensions(cfg.pins, cfg.pins, cfg.margin_space, cfg.pin_radius)
    }

    pub fn with_dimensions(width: usize, height: usize, spacing: f32, radius: f32) -> Self {
        let mut lattice = Self {
            width,
            height,
            spacing,
            radius,
            pins: Vec::with_capacity(width * height),
        };

        for row in 0..height {
            // odd rows are inset by half a pin to interleave the grid
            let row_offset = if row % 2 == 0 { 0.0 } else { spacing / 2.0 };
            let shown = lattice.visible_columns(row);
            let bin_row = row + 1 == height;

            for column in 0..width {
                lattice.pins.push(Pin {
                    x: spacing * column as f32 + spacing + row_offset,
                    y: TOP_OFFSET + spacing * row as f32 + spacing,
                    radius,
                    color: PIN_COLOR,
                    visible: !bin_row && shown.contains(&column),
                });
            }
        }

        lattice
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn pin(&self, index: usize) -> Option<&Pin> {
        self.pins.get(index)
    }

    pub fn pin_at(&self, row: usize, column: usize) -> Option<&Pin> {
        if column >= self.width {
            return None;
        }
        self.pins.get(self.index(row, column))
    }

    pub fn index(&self, row: usize, column: usize) -> usize {
        row * self.width + column
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index / self.width, index % self.width)
    }

    pub fn middle_column(&self) -> usize {
        self.width / 2
    }

    pub fn bin_row(&self) -> usize {
        self.height.saturating_sub(1)
    }

    pub fn top_pin(&self) -> Option<&Pin> {
        self.pin_at(0, self.middle_column())
    }

    /// Columns on the triangle for `row`, in the order they are added:
    /// the middle first, then alternately one to the left and one to the right.
    pub fn visible_columns(&self, row: usize) -> Vec<usize> {
        let middle = self.middle_column() as i64;
        (0..=row as i64)
            .map(|k| {
                let offset = (k + 1) / 2;
                if k == 0 {
                    middle
                } else if k % 2 == 0 {
                    middle + offset
                } else {
                    middle - offset
                }
            })
            .filter(|&c| c >= 0 && (c as usize) < self.width)
            .map(|c| c as usize)
            .collect()
    }

    pub fn is_visible(&self, row: usize, column: usize) -> bool {
        self.pin_at(row, column).is_some_and(|p| p.visible)
    }

    pub fn visible_in_row(&self, row: usize) -> usize {
        (0..self.width).filter(|&c| self.is_visible(row, c)).count()
    }

    pub fn visible_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.iter().filter(|p| p.visible)
    }
}
