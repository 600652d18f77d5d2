use crate::input::{collect_input_nonblocking, map_event_to_action, Action};
use crate::render::{canvas_to_cells, draw_labels, draw_text, BrailleBackend, Cell, Terminal};
use crate::Args;
use anyhow::Context;
use crossterm::style::Color;
use galton::config::{load_config, ConfigFile};
use galton::path::RngDraws;
use galton::{scene, Controller};
use rand::rngs::StdRng;
use std::cmp::min;
use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FPS_CAP: u32 = 60;
/// Catch-up limit so a stalled frame never turns into a burst of ticks.
const MAX_TICKS_PER_FRAME: u32 = 16;
const HUD_ROWS: u32 = 2;

type Machine = Controller<RngDraws<StdRng>>;

pub(crate) fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.drops.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else if let Some(path) = &args.log_file {
        // the animation owns the terminal, so logs only ever go to a file
        let file = File::create(path)
            .with_context(|| format!("could not create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

pub(crate) fn resolve_config(args: &Args) -> anyhow::Result<ConfigFile> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("could not load config {}", path.display()))?,
        None => ConfigFile::default(),
    };

    if let Some(pins) = args.pins {
        cfg.machine.pins = pins;
    }
    if let Some(bias) = args.bias {
        cfg.settings.bias = bias;
    }
    if let Some(speed) = args.speed {
        cfg.settings.speed = speed;
    }
    if let Some(seed) = args.seed {
        cfg.settings.seed = seed;
    }
    if args.paused {
        cfg.settings.is_running = false;
    }
    Ok(cfg)
}

fn build_machine(cfg: ConfigFile) -> anyhow::Result<Machine> {
    let draws = RngDraws::seeded(cfg.settings.seed);
    Controller::new(cfg.machine, cfg.settings, draws).context("invalid machine configuration")
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    init_logging(&args)?;
    let cfg = resolve_config(&args)?;
    let machine = build_machine(cfg)?;

    if let Some(drops) = args.drops {
        return run_headless(machine, drops);
    }

    let mut app = App {
        machine,
        term: Terminal::begin()?,
        show_help: false,
        should_quit: false,
    };
    let res = app.run();
    app.term.end()?;
    res
}

/* -----------------------------
   Headless: drop beans, print the tally
------------------------------ */

fn run_headless(mut machine: Machine, drops: u64) -> anyhow::Result<()> {
    let started = Instant::now();
    for _ in 0..drops {
        machine.drop_instantly();
    }
    let stats = machine.statistics();
    info!(
        drops,
        mode = stats.mode_column,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "headless run finished"
    );

    let mut out = io::stdout().lock();
    let counts = machine.distribution().counts();
    let total = machine.distribution().total().max(1);
    writeln!(
        out,
        "bias {} | {} pins | {} drops",
        machine.settings().bias,
        machine.config().pins,
        drops
    )?;
    for (i, (&n, norm)) in counts
        .iter()
        .zip(machine.distribution().normalized())
        .enumerate()
    {
        writeln!(
            out,
            "bin {i:>2} {} {n:>8} ({:>5.1}%)",
            bar(norm, 40),
            100.0 * n as f64 / total as f64
        )?;
    }
    writeln!(
        out,
        "mode bin {} | peak {} | spread {:.3}",
        stats.mode_column, stats.peak, stats.standard_deviation
    )?;
    Ok(())
}

fn bar(value01: f64, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f64 + 0.5) as usize;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

/* -----------------------------
   Interactive
------------------------------ */

struct App {
    machine: Machine,
    term: Terminal,
    show_help: bool,
    should_quit: bool,
}

impl App {
    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / FPS_CAP as f32);

        let mut last_frame = Instant::now();
        let mut sim_accum = Duration::ZERO;

        while !self.should_quit {
            self.term.resize_if_needed()?;

            for ev in collect_input_nonblocking(frame_dt)? {
                if let Some(action) = map_event_to_action(&ev) {
                    self.apply(action);
                }
            }

            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;

            // pausing only stops tick delivery; the bean resumes mid-flight
            if self.machine.settings().is_running {
                sim_accum = sim_accum.saturating_add(real_dt);
                let sim_step = self.machine.settings().frame_delay();
                let mut ticks = 0;
                while sim_accum >= sim_step && ticks < MAX_TICKS_PER_FRAME {
                    self.machine.tick();
                    sim_accum = sim_accum.saturating_sub(sim_step);
                    ticks += 1;
                }
                if ticks == MAX_TICKS_PER_FRAME {
                    sim_accum = Duration::ZERO;
                }
            } else {
                sim_accum = Duration::ZERO;
            }

            self.render_frame()?;
            spin_sleep(frame_dt, now);
        }

        info!(drops = self.machine.drops(), "quitting");
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        let settings = self.machine.settings_mut();
        match action {
            Action::Quit => self.should_quit = true,
            Action::TogglePause => {
                settings.toggle_running();
                info!(running = settings.is_running, "pause toggled");
            }
            Action::SpeedUp | Action::SpeedDown => {
                let delta = if action == Action::SpeedUp { 1 } else { -1 };
                settings.set_speed(settings.speed as i32 + delta);
                info!(
                    speed = settings.speed,
                    frame_delay_ms = settings.frame_delay().as_millis() as u64,
                    "speed changed"
                );
            }
            Action::LeanLeft | Action::LeanRight => {
                let delta = if action == Action::LeanLeft { 1 } else { -1 };
                settings.set_bias(settings.bias as i32 + delta);
                info!(bias = settings.bias, "bias changed");
            }
            Action::Reset => self.machine.reset(),
            Action::HelpToggle => self.show_help = !self.show_help,
        }
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let bg = Color::Black;
        self.term.cur.clear(bg);
        self.term.canvas.clear();

        let extent = scene::extent(&self.machine);
        let mut backend = BrailleBackend::fit(&mut self.term.canvas, extent, HUD_ROWS);
        scene::draw_frame(&mut backend, &self.machine);
        let labels = backend.finish();

        canvas_to_cells(&self.term.canvas, &mut self.term.cur, bg);
        draw_labels(&mut self.term.cur, &labels, bg);
        self.hud(bg);

        if self.show_help {
            self.draw_center_box(
                "Galton box",
                "Beans fall through the pins, bouncing left or\n\
                 right, and pile up into a binomial histogram.\n\n\
                 space / p   pause or resume\n\
                 + - / up dn  speed\n\
                 [ ] / <- ->  lean left / right\n\
                 r           reset the histogram\n\
                 q / esc     quit\n\n\
                 h closes this help.",
            );
        }

        self.term.present()?;
        Ok(())
    }

    fn hud(&mut self, bg: Color) {
        let settings = self.machine.settings();
        let stats = self.machine.statistics();
        let lean = match settings.bias {
            b if b > galton::config::UNBIASED => "leans left",
            b if b < galton::config::UNBIASED => "leans right",
            _ => "fair",
        };
        let title = format!(
            "Galton box | bias {} ({lean}) | speed {} ({} ms/tick) | drops {} | spread {:.1} | {}",
            settings.bias,
            settings.speed,
            settings.frame_delay().as_millis(),
            self.machine.drops(),
            stats.standard_deviation,
            if settings.is_running { "running" } else { "PAUSED" },
        );
        draw_text(&mut self.term.cur, 1, 0, &title, Color::White, bg);

        let help = "q quit | space pause | +/- speed | [/] lean | r reset | h help";
        let y = self.term.rows.saturating_sub(1);
        draw_text(&mut self.term.cur, 1, y, help, Color::DarkGrey, bg);
    }

    fn draw_center_box(&mut self, title: &str, body: &str) {
        let w = self.term.cols;
        let h = self.term.rows;
        let fg = Color::White;
        let bg = Color::Black;

        let bw = min(56, w.saturating_sub(4));
        let bh = min(16, h.saturating_sub(4));
        if bw < 2 || bh < 2 {
            return;
        }
        let x0 = (w - bw) / 2;
        let y0 = (h - bh) / 2;
        let x1 = x0 + bw - 1;
        let y1 = y0 + bh - 1;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let ch = match (x == x0, x == x1, y == y0, y == y1) {
                    (true, _, true, _) => '┌',
                    (_, true, true, _) => '┐',
                    (true, _, _, true) => '└',
                    (_, true, _, true) => '┘',
                    (_, _, true, _) | (_, _, _, true) => '─',
                    (true, _, _, _) | (_, true, _, _) => '│',
                    _ => ' ',
                };
                self.term.cur.set(x, y, Cell { ch, fg, bg });
            }
        }

        draw_text(&mut self.term.cur, x0 + 2, y0 + 1, title, fg, bg);
        let mut yy = y0 + 3;
        for line in body.lines() {
            if yy >= y1 {
                break;
            }
            draw_text(&mut self.term.cur, x0 + 2, yy, line, fg, bg);
            yy += 1;
        }
    }
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
