use glam::Vec3;
use isobonk::*;
use std::time::Instant;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn main() {
    let mut world = CollisionWorld::new(WorldConfig {
        enable_debug_hooks: false,
        ..WorldConfig::default()
    });
    let mut ledger = FrameLedger::new();

    let n = 5_000usize; // number of actors
    let frames = 60;
    let mut seed = 1u32;
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let p = Vec3::new(unit(&mut seed) * 200.0 - 100.0, unit(&mut seed) * 200.0 - 100.0, 0.0);
        let collider = Collider::new(Vec3::new(0.8, 0.8, 1.5), Vec3::ZERO, i % 4 != 0)
            .expect("valid collider");
        let actor = Actor::new(p, Some(collider)).expect("finite position");
        ids.push(world.insert_actor(actor));
    }
    let stats = world.debug_stats();
    println!(
        "N={} cells={} footprint_entries={}",
        stats.actors, stats.cells, stats.footprint_entries
    );

    let t0 = Instant::now();
    let mut blocked = 0usize;
    let mut truncated = 0usize;
    for _ in 0..frames {
        ledger.begin_frame();
        for id in &ids {
            let delta = Vec3::new(unit(&mut seed) * 2.0 - 1.0, unit(&mut seed) * 2.0 - 1.0, 0.0);
            if let Ok(out) = world.move_actor(*id, delta, &mut ledger) {
                blocked += out.was_blocked() as usize;
                truncated += out.truncated as usize;
            }
        }
    }
    let secs = t0.elapsed().as_secs_f64();
    let moves = n * frames;
    println!(
        "moves={} secs={:.3} throughput={:.0} moves/s blocked={} truncated={}",
        moves,
        secs,
        moves as f64 / secs,
        blocked,
        truncated
    );
}
