use glam::{IVec3, Vec3};
use isobonk::*;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut world = CollisionWorld::new(WorldConfig::default());
    let mut ledger = FrameLedger::new();

    // A floor, a wall along x = 3 and a coin in the way.
    for x in -2..6 {
        for y in -2..6 {
            world.insert_tile(Tile::new(IVec3::new(x, y, 0), true));
        }
    }
    let wall = Collider::solid(Vec3::new(1.0, 8.0, 2.0)).expect("valid wall size");
    world.insert_actor(Actor::new(Vec3::new(3.5, 2.0, 0.0), Some(wall)).expect("finite position"));
    let coin = Collider::trigger(Vec3::new(0.5, 0.5, 0.5)).expect("valid coin size");
    let coin = world.insert_actor(Actor::new(Vec3::new(1.5, 1.0, 0.0), Some(coin)).expect("finite position"));

    let body = Collider::solid(Vec3::new(0.8, 0.8, 1.6)).expect("valid body size");
    let hero = world.insert_actor(Actor::new(Vec3::new(0.0, 1.0, 0.0), Some(body)).expect("finite position"));
    println!("Inserted hero={} coin={}", hero.short(), coin.short());

    let recorder = DebugRecorder::new();
    world.set_debug_sink(Box::new(recorder.clone()));

    for frame in 0..4 {
        ledger.begin_frame();
        let out = world
            .move_actor(hero, Vec3::new(1.25, 0.5, 0.0), &mut ledger)
            .expect("hero is registered");
        let pos = world.actor(hero).map(Actor::position).unwrap_or_default();
        println!(
            "frame {frame}: pos=({:.2},{:.2},{:.2}) legs={} blocked={} truncated={}",
            pos.x,
            pos.y,
            pos.z,
            out.iterations,
            out.blocked_by.len(),
            out.truncated
        );
        for other in ledger.entered(hero) {
            println!("  entered {:?}", other);
        }
        for other in ledger.exited(hero) {
            println!("  exited {:?}", other);
        }
        let dbg = recorder.drain();
        println!(
            "  debug: sweeps={} narrow_hits={}",
            dbg.sweep_volumes.len(),
            dbg.narrow_hits.len()
        );
    }
}
