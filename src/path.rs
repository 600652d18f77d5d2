use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DRAW_MIN: u8 = 1;
pub const DRAW_MAX: u8 = 10;

pub const BIN_ROW: i32 = 1;

/// Source of the uniform `1..=10` draw taken at every pin.
pub trait DrawSource {
    fn draw(&mut self) -> u8;
}

#[derive(Clone, Debug)]
pub struct RngDraws<R>(pub R);

impl RngDraws<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> DrawSource for RngDraws<R> {
    fn draw(&mut self) -> u8 {
        self.0.gen_range(DRAW_MIN..=DRAW_MAX)
    }
}

#[derive(Clone, Debug)]
pub struct ScriptedDraws {
    draws: Vec<u8>,
    consumed: usize,
}

impl ScriptedDraws {
    pub fn new(draws: impl Into<Vec<u8>>) -> Self {
        let mut draws = draws.into();
        if draws.is_empty() {
            draws.push(DRAW_MAX);
        }
        Self { draws, consumed: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&mut self) -> u8 {
        let d = self.draws[self.consumed % self.draws.len()];
        self.consumed += 1;
        d.clamp(DRAW_MIN, DRAW_MAX)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bean {
    pub column: i32,
    pub row: i32,
}

impl Bean {
    pub fn launch(width: usize, height: usize) -> Self {
        Self {
            column: width.div_ceil(2) as i32,
            row: height as i32,
        }
    }

    /// Flat lattice index: the row is flipped to a top-origin line first.
    pub fn index(&self, width: usize, height: usize) -> usize {
        let line = height as i64 - self.row as i64;
        let idx = width as i64 * line + (self.column as i64 - 1);
        debug_assert!(idx >= 0, "{self:?} is outside a {width}x{height} lattice");
        idx.max(0) as usize
    }

    pub fn bin(&self) -> usize {
        debug_assert!(self.column >= 1, "{self:?} is left of the first bin");
        (self.column - 1).max(0) as usize
    }

    pub fn has_landed(&self) -> bool {
        self.row == BIN_ROW
    }
}

/// Moves `bean` one pin row down, consuming exactly one draw.
pub fn step(bean: Bean, width: usize, bias: u8, draws: &mut impl DrawSource) -> Bean {
    let draw = draws.draw();
    let centre = width.div_ceil(2) as i32;
    let Bean { mut column, mut row } = bean;

    if column == centre - row - 1 {
        column += 1;
    } else if column == centre + row {
        column -= 1;
    } else if draw > bias {
        if (row - 1) % 2 != 0 {
            column += 1;
        }
    } else if (row - 1) % 2 == 0 {
        column -= 1;
    }

    if row >= 1 {
        row -= 1;
    }

    Bean { column, row }
}

#[derive(Clone, Debug)]
pub struct BeanPath {
    width: usize,
    height: usize,
    history: Vec<Bean>,
}

impl BeanPath {
    pub fn new(width: usize, height: usize) -> Self {
        let mut history = Vec::with_capacity(height);
        history.push(Bean::launch(width, height));
        Self {
            width,
            height,
            history,
        }
    }

    /// Snapshot for `row`. Cached rows are returned without drawing; a row
    /// past the end of the history extends it one draw per missing row.
    pub fn row(&mut self, row: usize, bias: u8, draws: &mut impl DrawSource) -> Bean {
        while self.history.len() <= row {
            let last = self.history[self.history.len() - 1];
            self.history.push(step(last, self.width, bias, draws));
        }
        self.history[row]
    }

    pub fn get(&self, row: usize) -> Option<Bean> {
        self.history.get(row).copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn history(&self) -> &[Bean] {
        &self.history
    }

    pub fn finish(&mut self, bias: u8, draws: &mut impl DrawSource) -> Bean {
        self.row(self.height.saturating_sub(1), bias, draws)
    }
}
