use std::time::Duration;

use log::{debug, info};

use crate::{
    config::{self, Settings},
    core::{SimStats, Simulation},
    reveal::RevealSchedule,
    surface::{StaticSurface, label_size},
    types::{Rect, Size},
};

const PROGRESS_EVERY: u32 = 100;

/// Runs the resolution loop without a terminal. Bubble-in is replayed on a
/// virtual clock of one frame per `1 / FRAME_HZ` seconds.
pub fn simulate<S: AsRef<str>>(
    labels: &[S],
    container: Rect,
    frames: u32,
    settings: Settings,
) -> (Simulation, StaticSurface) {
    let mut surface = StaticSurface::from_labels(labels);
    let elements: Vec<_> = surface.elements().collect();
    let mut sim = Simulation::spawn(elements, container, &surface, settings);

    let mut reveal = RevealSchedule::from_settings(sim.bodies().len(), &settings);
    let order: Vec<_> = sim.bodies().iter().map(|b| b.element()).collect();
    for (idx, &element) in order.iter().enumerate() {
        if !reveal.is_visible(idx) {
            surface.set_size(element, Size::UNKNOWN);
        }
    }

    let frame_time = Duration::from_secs_f32(1.0 / config::FRAME_HZ);
    for frame in 1..=frames {
        for idx in reveal.advance(frame_time * frame) {
            let label = labels[order[idx].0].as_ref();
            surface.set_size(order[idx], label_size(label));
        }
        if sim.tick(&surface, &container).is_none() {
            break;
        }
        if frame % PROGRESS_EVERY == 0 {
            let stats = sim.stats();
            debug!(
                "frame {}: {} overlapping pairs, {} revealed",
                stats.frame,
                stats.overlapping_pairs,
                reveal.revealed()
            );
        }
    }
    sim.sync(&mut surface);
    info!(
        "headless run finished after {} frames with {} overlapping pairs",
        sim.frame(),
        sim.overlapping_pairs()
    );
    (sim, surface)
}

/// Plain-text report: totals, then one line per body with its top-left
/// corner as placed on the surface.
pub fn summary<S: AsRef<str>>(labels: &[S], sim: &Simulation, surface: &StaticSurface) -> String {
    let SimStats {
        frame,
        bodies,
        overlapping_pairs,
        unmeasured,
    } = sim.stats();
    let mut out = format!(
        "frames: {frame}\nbodies: {bodies}\noverlapping pairs: {overlapping_pairs}\nunmeasured: {unmeasured}\n"
    );
    for body in sim.bodies() {
        let label = labels
            .get(body.element().0)
            .map(|l| l.as_ref())
            .unwrap_or("?");
        let corner = surface
            .placement(body.element())
            .map(|p| p.top_left())
            .unwrap_or(body.position);
        out.push_str(&format!(
            "{:>7.1} {:>7.1}  {}x{}  {}\n",
            corner.x, corner.y, body.size.width, body.size.height, label
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 6] = ["alpha", "b", "gamma ray", "delta", "e", "zeta function"];

    fn settings() -> Settings {
        Settings {
            seed: Some(5),
            ..Settings::default()
        }
    }

    #[test]
    fn runs_requested_frame_count() {
        let (sim, _) = simulate(&LABELS, Rect::from_size(800.0, 600.0), 30, settings());
        assert_eq!(sim.frame(), 30);
        assert_eq!(sim.bodies().len(), LABELS.len());
    }

    #[test]
    fn every_box_is_revealed_by_the_end() {
        let (sim, _) = simulate(&LABELS, Rect::from_size(800.0, 600.0), 60, settings());
        assert_eq!(sim.stats().unmeasured, 0);
    }

    #[test]
    fn hidden_boxes_start_unmeasured() {
        let (sim, _) = simulate(&LABELS, Rect::from_size(800.0, 600.0), 1, settings());
        // frame 1 lands at ~16ms, before the first 60ms reveal
        assert_eq!(sim.stats().unmeasured, LABELS.len() - 4);
    }

    #[test]
    fn seeded_runs_agree() {
        let (a, _) = simulate(&LABELS, Rect::from_size(800.0, 600.0), 120, settings());
        let (b, _) = simulate(&LABELS, Rect::from_size(800.0, 600.0), 120, settings());
        assert_eq!(a.bodies(), b.bodies());
    }

    #[test]
    fn summary_lists_every_body() {
        let (sim, surface) = simulate(&LABELS, Rect::from_size(800.0, 600.0), 10, settings());
        let text = summary(&LABELS, &sim, &surface);
        assert!(text.starts_with("frames: 10\n"));
        for label in LABELS {
            assert!(text.contains(label));
        }
    }
}
