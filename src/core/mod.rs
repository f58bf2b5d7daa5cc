mod body;

pub use body::Body;

use log::{debug, trace, warn};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    config::Settings,
    surface::{Container, Surface},
    types::{ElementId, Rect, Vec2},
};

/// Totals gathered while running one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub frame: u64,
    pub pushes: usize,
    pub clamped: usize,
    pub unmeasured: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimStats {
    pub frame: u64,
    pub bodies: usize,
    pub overlapping_pairs: usize,
    pub unmeasured: usize,
}

/// Owns every body for the session; the order of `bodies` never changes.
pub struct Simulation {
    bodies: Vec<Body>,
    settings: Settings,
    frame: u64,
    active: bool,
    last_report: StepReport,
    reported_unmeasured: Vec<bool>,
}

impl Simulation {
    pub fn new(bodies: Vec<Body>, settings: Settings) -> Self {
        let reported_unmeasured = vec![false; bodies.len()];
        Self {
            bodies,
            settings,
            frame: 0,
            active: true,
            last_report: StepReport::default(),
            reported_unmeasured,
        }
    }

    /// Shuffles the discovered elements and scatters them around the
    /// container's center, measuring each one as it is placed.
    pub fn spawn<S: Surface + ?Sized>(
        mut elements: Vec<ElementId>,
        container: Rect,
        surface: &S,
        settings: Settings,
    ) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        elements.shuffle(&mut rng);

        let center = container.center();
        let radius = settings.scatter_radius;
        let bodies = elements
            .into_iter()
            .map(|element| {
                let offset = if radius > 0.0 {
                    Vec2::new(
                        rng.gen_range(-radius..radius),
                        rng.gen_range(-radius..radius),
                    )
                } else {
                    Vec2::ZERO
                };
                let mut body = Body::new(element, center + offset);
                if let Err(err) = body.refresh_size(surface) {
                    debug!("spawned before layout: {err}");
                }
                body
            })
            .collect::<Vec<_>>();
        debug!(
            "spawned {} bodies around ({:.1}, {:.1})",
            bodies.len(),
            center.x,
            center.y
        );
        Self::new(bodies, settings)
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ends the session; later ticks do nothing.
    pub fn stop(&mut self) {
        if self.active {
            debug!("simulation stopped at frame {}", self.frame);
        }
        self.active = false;
    }

    pub fn last_report(&self) -> StepReport {
        self.last_report
    }

    /// One animation frame. Returns `None` once the simulation is stopped,
    /// which is the host's signal not to schedule another tick.
    pub fn tick<S, C>(&mut self, surface: &S, container: &C) -> Option<StepReport>
    where
        S: Surface + ?Sized,
        C: Container + ?Sized,
    {
        if !self.active {
            return None;
        }
        Some(self.step(surface, container.bounds()))
    }

    /// Measure, resolve, clamp. Pure data update; nothing is drawn.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &S, bounds: Rect) -> StepReport {
        self.frame += 1;
        let mut report = StepReport {
            frame: self.frame,
            ..StepReport::default()
        };
        report.unmeasured = self.refresh_sizes(surface);
        report.pushes = self.resolve_pairs();
        report.clamped = self.clamp_all(bounds);
        trace!(
            "frame {}: {} pushes, {} clamped, {} unmeasured",
            report.frame, report.pushes, report.clamped, report.unmeasured
        );
        self.last_report = report;
        report
    }

    /// Presentation phase: hands every body's placement to the surface.
    pub fn sync<S: Surface + ?Sized>(&self, surface: &mut S) {
        for body in &self.bodies {
            surface.place(body.element(), body.placement(&self.settings));
        }
    }

    pub fn overlapping_pairs(&self) -> usize {
        let mut count = 0;
        for i in 0..self.bodies.len() {
            for k in (i + 1)..self.bodies.len() {
                let (a, b) = (&self.bodies[i], &self.bodies[k]);
                if a.overlaps(b) || b.overlaps(a) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            frame: self.frame,
            bodies: self.bodies.len(),
            overlapping_pairs: self.overlapping_pairs(),
            unmeasured: self.bodies.iter().filter(|b| !b.size.is_known()).count(),
        }
    }

    fn refresh_sizes<S: Surface + ?Sized>(&mut self, surface: &S) -> usize {
        let mut unmeasured = 0;
        for (body, reported) in self.bodies.iter_mut().zip(self.reported_unmeasured.iter_mut()) {
            match body.refresh_size(surface) {
                Ok(()) => *reported = false,
                Err(err) => {
                    unmeasured += 1;
                    if *reported {
                        trace!("{err}");
                    } else {
                        warn!("{err}");
                        *reported = true;
                    }
                }
            }
        }
        unmeasured
    }

    /// Every ordered pair, in index order. A push lands immediately, so later
    /// pairs in the same pass see the moved body.
    fn resolve_pairs(&mut self) -> usize {
        let mut pushes = 0;
        let len = self.bodies.len();
        for i in 0..len {
            for k in 0..len {
                if i == k {
                    continue;
                }
                let (from, to) = pair_mut(&mut self.bodies, i, k);
                if from.overlaps(to) {
                    to.apply_push(from, &self.settings);
                    pushes += 1;
                }
            }
        }
        pushes
    }

    fn clamp_all(&mut self, bounds: Rect) -> usize {
        let mut clamped = 0;
        for body in &mut self.bodies {
            if body.clamp_boundary(bounds, &self.settings) {
                clamped += 1;
            }
        }
        clamped
    }
}

fn pair_mut(bodies: &mut [Body], from: usize, to: usize) -> (&Body, &mut Body) {
    debug_assert_ne!(from, to, "a body cannot push itself");
    if from < to {
        let (left, right) = bodies.split_at_mut(to);
        (&left[from], &mut right[0])
    } else {
        let (left, right) = bodies.split_at_mut(from);
        (&right[0], &mut left[to])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{surface::StaticSurface, types::Size};

    fn square_sim(centers: &[(f32, f32)], side: u32) -> (Simulation, StaticSurface) {
        let surface = StaticSurface::new(vec![Size::new(side, side); centers.len()]);
        let bodies = centers
            .iter()
            .enumerate()
            .map(|(idx, &(x, y))| Body::new(ElementId(idx), Vec2::new(x, y)))
            .collect();
        (Simulation::new(bodies, Settings::default()), surface)
    }

    mod step {
        use super::*;

        #[test]
        fn separated_bodies_stay_put() {
            let (mut sim, surface) = square_sim(&[(50.0, 50.0), (150.0, 50.0)], 20);
            let report = sim.step(&surface, Rect::from_size(400.0, 400.0));
            assert_eq!(report.pushes, 0);
            assert_eq!(sim.bodies()[0].position, Vec2::new(50.0, 50.0));
            assert_eq!(sim.bodies()[1].position, Vec2::new(150.0, 50.0));
        }

        #[test]
        fn overlapping_pair_moves_apart() {
            let (mut sim, surface) = square_sim(&[(100.0, 100.0), (110.0, 105.0)], 40);
            let report = sim.step(&surface, Rect::from_size(400.0, 400.0));
            assert_eq!(report.pushes, 2);
            let [a, b] = sim.bodies() else {
                panic!("expected two bodies");
            };
            assert!(a.position.x < 100.0);
            assert!(b.position.x > 110.0);
        }

        #[test]
        fn sizes_come_from_surface_each_frame() {
            let (mut sim, mut surface) = square_sim(&[(100.0, 100.0)], 20);
            sim.step(&surface, Rect::from_size(400.0, 400.0));
            surface.set_size(ElementId(0), Size::new(70, 30));
            sim.step(&surface, Rect::from_size(400.0, 400.0));
            assert_eq!(sim.bodies()[0].size, Size::new(70, 30));
        }

        #[test]
        fn unmeasured_bodies_are_counted_and_left_alone() {
            let (mut sim, mut surface) = square_sim(&[(100.0, 100.0), (101.0, 101.0)], 40);
            surface.set_size(ElementId(1), Size::UNKNOWN);
            let report = sim.step(&surface, Rect::from_size(400.0, 400.0));
            assert_eq!(report.unmeasured, 1);
            assert_eq!(report.pushes, 0);
            assert_eq!(sim.bodies()[1].position, Vec2::new(101.0, 101.0));
        }

        #[test]
        fn clamp_runs_after_resolution() {
            let (mut sim, surface) = square_sim(&[(5.0, 100.0)], 20);
            let report = sim.step(&surface, Rect::from_size(400.0, 400.0));
            assert_eq!(report.clamped, 1);
            assert_eq!(sim.bodies()[0].position.x, 15.0);
        }

        #[test]
        fn later_pairs_see_earlier_pushes() {
            // 0 pushes 1 clear before the (1, 0) check runs, so 0 never moves
            let (mut sim, surface) = square_sim(&[(100.0, 100.0), (119.0, 101.0)], 20);
            let report = sim.step(&surface, Rect::from_size(400.0, 400.0));
            assert_eq!(report.pushes, 1);
            assert_eq!(sim.bodies()[0].position, Vec2::new(100.0, 100.0));
            assert!(sim.bodies()[1].position.x > 119.0);
        }

        #[test]
        fn identical_runs_are_bit_identical() {
            let centers = [
                (100.0, 100.0),
                (112.5, 96.25),
                (95.0, 121.0),
                (130.0, 108.0),
                (104.0, 88.0),
            ];
            let (mut first, surface) = square_sim(&centers, 60);
            let (mut second, _) = square_sim(&centers, 60);
            first.step(&surface, Rect::from_size(300.0, 300.0));
            second.step(&surface, Rect::from_size(300.0, 300.0));
            for (a, b) in first.bodies().iter().zip(second.bodies()) {
                assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
                assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
            }
        }
    }

    mod convergence {
        use super::*;

        #[test]
        fn overlap_count_drops_over_many_frames() {
            let centers = [
                (100.0, 100.0),
                (123.0, 91.0),
                (88.0, 117.0),
                (131.0, 126.0),
                (109.0, 74.0),
            ];
            let (mut sim, surface) = square_sim(&centers, 60);
            let room = Rect::from_size(400.0, 400.0);

            sim.step(&surface, room);
            let after_first = sim.overlapping_pairs();
            assert!(after_first > 0);

            for _ in 1..200 {
                sim.step(&surface, room);
            }
            assert!(sim.overlapping_pairs() < after_first);
        }

        #[test]
        fn boxes_end_up_inside_the_room() {
            let centers = [(100.0, 100.0), (102.0, 99.0), (98.0, 103.0)];
            let (mut sim, surface) = square_sim(&centers, 60);
            let room = Rect::from_size(400.0, 400.0);
            for _ in 0..300 {
                sim.step(&surface, room);
            }
            for body in sim.bodies() {
                assert!(body.position.x - 30.0 >= room.left() - 10.0);
                assert!(body.position.x + 30.0 <= room.right() + 10.0);
                assert!(body.position.y - 30.0 >= room.top() - 10.0);
                assert!(body.position.y + 30.0 <= room.bottom() + 5.0);
            }
        }
    }

    mod tick {
        use super::*;

        #[test]
        fn stopped_simulation_does_not_step() {
            let (mut sim, surface) = square_sim(&[(100.0, 100.0), (110.0, 110.0)], 40);
            let room = Rect::from_size(400.0, 400.0);
            assert!(sim.tick(&surface, &room).is_some());
            sim.stop();
            let before: Vec<Body> = sim.bodies().to_vec();
            assert!(sim.tick(&surface, &room).is_none());
            assert!(!sim.is_active());
            assert_eq!(sim.frame(), 1);
            assert_eq!(sim.bodies(), before.as_slice());
        }
    }

    mod spawn {
        use super::*;

        fn elements(n: usize) -> Vec<ElementId> {
            (0..n).map(ElementId).collect()
        }

        #[test]
        fn scatters_within_radius_of_center() {
            let surface = StaticSurface::new(vec![Size::new(30, 30); 20]);
            let settings = Settings {
                seed: Some(3),
                ..Settings::default()
            };
            let room = Rect::from_size(800.0, 600.0);
            let sim = Simulation::spawn(elements(20), room, &surface, settings);
            for body in sim.bodies() {
                let d = body.position - room.center();
                assert!(d.x.abs() <= settings.scatter_radius);
                assert!(d.y.abs() <= settings.scatter_radius);
                assert_eq!(body.visual_position, body.position);
                assert_eq!(body.size, Size::new(30, 30));
            }
        }

        #[test]
        fn keeps_every_element_exactly_once() {
            let surface = StaticSurface::new(vec![Size::new(30, 30); 12]);
            let settings = Settings {
                seed: Some(11),
                ..Settings::default()
            };
            let sim = Simulation::spawn(elements(12), Rect::from_size(500.0, 500.0), &surface, settings);
            let mut seen: Vec<usize> = sim.bodies().iter().map(|b| b.element().0).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..12).collect::<Vec<_>>());
        }

        #[test]
        fn same_seed_same_layout() {
            let surface = StaticSurface::new(vec![Size::new(30, 30); 8]);
            let settings = Settings {
                seed: Some(42),
                ..Settings::default()
            };
            let room = Rect::from_size(500.0, 500.0);
            let a = Simulation::spawn(elements(8), room, &surface, settings);
            let b = Simulation::spawn(elements(8), room, &surface, settings);
            assert_eq!(a.bodies(), b.bodies());
        }

        #[test]
        fn zero_radius_stacks_on_center() {
            let surface = StaticSurface::new(vec![Size::new(30, 30); 3]);
            let settings = Settings {
                scatter_radius: 0.0,
                seed: Some(1),
                ..Settings::default()
            };
            let room = Rect::from_size(200.0, 100.0);
            let sim = Simulation::spawn(elements(3), room, &surface, settings);
            assert!(sim.bodies().iter().all(|b| b.position == room.center()));
        }
    }

    mod sync {
        use super::*;

        #[test]
        fn places_every_body_on_the_surface() {
            let (sim, mut surface) = square_sim(&[(10.0, 20.0), (30.0, 40.0)], 20);
            sim.sync(&mut surface);
            let placed = surface.placement(ElementId(1)).expect("placed");
            assert_eq!(placed.offset, Vec2::new(30.0, 40.0));
        }
    }

    mod stats {
        use super::*;

        #[test]
        fn counts_unordered_overlapping_pairs() {
            let (mut sim, surface) =
                square_sim(&[(0.0, 0.0), (10.0, 10.0), (500.0, 500.0)], 40);
            sim.refresh_sizes(&surface);
            let stats = sim.stats();
            assert_eq!(stats.overlapping_pairs, 1);
            assert_eq!(stats.bodies, 3);
            assert_eq!(stats.unmeasured, 0);
        }
    }
}
