use crate::config::{MachineConfig, Settings};
use crate::distribution::{Distribution, Statistics};
use crate::error::Result;
use crate::lattice::Lattice;
use crate::path::{Bean, BeanPath, DrawSource};
use tracing::{debug, info, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    PreLaunch { sub_frame: u32 },
    // moving from path row `row - 1` to `row`
    InTransit { row: usize, sub_frame: u32 },
    Arrived { column: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeanFrame {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub frame: BeanFrame,
    /// Set only on the tick the bean is tallied.
    pub landed: Option<usize>,
}

pub struct Controller<D> {
    config: MachineConfig,
    settings: Settings,
    lattice: Lattice,
    distribution: Distribution,
    path: BeanPath,
    phase: Phase,
    draws: D,
    last_frame: Option<BeanFrame>,
    drops: u64,
}

impl<D: DrawSource> Controller<D> {
    pub fn new(config: MachineConfig, settings: Settings, draws: D) -> Result<Self> {
        config.validate()?;
        settings.validate()?;

        let lattice = Lattice::new(&config);
        let distribution = Distribution::new(lattice.width());
        let path = BeanPath::new(lattice.width(), lattice.height());
        info!(
            pins = config.pins,
            key_frames = config.key_frame_steps,
            bias = settings.bias,
            speed = settings.speed,
            "bean machine ready"
        );

        Ok(Self {
            config,
            settings,
            lattice,
            distribution,
            path,
            phase: Phase::PreLaunch { sub_frame: 0 },
            draws,
            last_frame: None,
            drops: 0,
        })
    }

    pub fn tick(&mut self) -> Tick {
        let (frame, landed) = match self.phase {
            Phase::Arrived { .. } => {
                self.launch();
                self.pre_launch_step(0)
            }
            Phase::PreLaunch { sub_frame } => self.pre_launch_step(sub_frame),
            Phase::InTransit { row, sub_frame } => self.transit_step(row, sub_frame),
        };

        self.last_frame = Some(frame);
        Tick { frame, landed }
    }

    fn pre_launch_step(&mut self, sub_frame: u32) -> (BeanFrame, Option<usize>) {
        let steps = self.config.key_frame_steps;
        let (x, y) = self.top_pin_xy();
        let exit = self.config.funnel_exit_y;
        let dy = (y - exit) / steps as f32;
        let frame = BeanFrame {
            x,
            y: exit + self.config.pin_radius + dy * sub_frame as f32,
            radius: self.config.pin_radius,
        };

        let mut landed = None;
        let next = sub_frame + 1;
        self.phase = if next < steps {
            Phase::PreLaunch { sub_frame: next }
        } else if let Some(bean) = self.path.get(0).filter(Bean::has_landed) {
            // a single-row machine launches straight into the bins
            landed = Some(self.land(bean));
            Phase::Arrived { column: bean.bin() }
        } else {
            Phase::InTransit {
                row: 1,
                sub_frame: 0,
            }
        };
        (frame, landed)
    }

    fn transit_step(&mut self, row: usize, sub_frame: u32) -> (BeanFrame, Option<usize>) {
        let steps = self.config.key_frame_steps;
        let bias = self.settings.bias;
        let last = self.path.row(row - 1, bias, &mut self.draws);
        let current = self.path.row(row, bias, &mut self.draws);

        let (x0, y0) = self.pin_xy(last);
        let (x1, y1) = self.pin_xy(current);
        let t = sub_frame as f32 / steps as f32;
        let frame = BeanFrame {
            x: x0 + (x1 - x0) * t,
            y: y0 + (y1 - y0) * t,
            radius: self.lattice.radius(),
        };

        let mut landed = None;
        let next = sub_frame + 1;
        self.phase = if next < steps {
            Phase::InTransit {
                row,
                sub_frame: next,
            }
        } else if current.has_landed() || row + 1 >= self.lattice.height() {
            if current.has_landed() {
                landed = Some(self.land(current));
            }
            Phase::Arrived {
                column: current.bin(),
            }
        } else {
            Phase::InTransit {
                row: row + 1,
                sub_frame: 0,
            }
        };
        (frame, landed)
    }

    pub fn reset(&mut self) {
        self.distribution.reset();
        self.drops = 0;
        self.launch();
        self.last_frame = None;
        info!("experiment reset");
    }

    pub fn drop_instantly(&mut self) -> usize {
        let mut path = BeanPath::new(self.lattice.width(), self.lattice.height());
        let bean = path.finish(self.settings.bias, &mut self.draws);
        self.land(bean)
    }

    pub fn statistics(&self) -> Statistics {
        self.distribution
            .compute_statistics(self.config.bar_graph_height as f64)
    }

    /// Path row being animated towards; 0 once the bean has landed and
    /// a new one is due, `None` while it is still leaving the funnel.
    pub fn animation_index(&self) -> Option<usize> {
        match self.phase {
            Phase::PreLaunch { .. } => None,
            Phase::InTransit { row, .. } => Some(row),
            Phase::Arrived { .. } => Some(0),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    pub fn path(&self) -> &BeanPath {
        &self.path
    }

    pub fn draws(&self) -> &D {
        &self.draws
    }

    pub fn last_frame(&self) -> Option<BeanFrame> {
        self.last_frame
    }

    pub fn drops(&self) -> u64 {
        self.drops
    }

    fn launch(&mut self) {
        self.path = BeanPath::new(self.lattice.width(), self.lattice.height());
        self.phase = Phase::PreLaunch { sub_frame: 0 };
        trace!("bean launched");
    }

    fn land(&mut self, bean: Bean) -> usize {
        let column = bean.bin();
        self.distribution.record_outcome(column);
        self.drops += 1;
        debug!(column, drops = self.drops, "bean landed");
        column
    }

    fn pin_xy(&self, bean: Bean) -> (f32, f32) {
        let idx = bean.index(self.lattice.width(), self.lattice.height());
        debug_assert!(idx < self.lattice.pins().len(), "{bean:?} maps to missing pin {idx}");
        match self.lattice.pin(idx) {
            Some(p) => (p.x, p.y),
            None => {
                warn!(?bean, idx, "bean is off the lattice");
                (0.0, 0.0)
            }
        }
    }

    fn top_pin_xy(&self) -> (f32, f32) {
        self.lattice
            .top_pin()
            .map(|p| (p.x, p.y))
            .unwrap_or_default()
    }
}
