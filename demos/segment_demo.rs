use glam::{IVec3, Vec3};
use isobonk::*;

fn main() {
    let mut world = CollisionWorld::new(WorldConfig::default());

    let crate_box = Collider::solid(Vec3::ONE).expect("valid size");
    world.insert_actor(Actor::new(Vec3::new(2.5, 0.5, 0.0), Some(crate_box)).expect("finite position"));
    let smoke = Collider::trigger(Vec3::new(1.0, 1.0, 2.0)).expect("valid size");
    world.insert_actor(Actor::new(Vec3::new(5.5, 0.5, 0.0), Some(smoke)).expect("finite position"));
    world.insert_tile(Tile::new(IVec3::new(4, 0, 0), true));

    let eye = Segment::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(8.0, 0.5, 0.5));
    let hits = world.check_segment_collisions(&eye);
    if hits.is_empty() {
        println!("Clear line of sight");
    }
    for hit in hits {
        println!(
            "Segment hit {:?} solid={} crossings={} from_start={:.3} from_end={:.3}",
            hit.other,
            hit.solid,
            hit.intersections.len(),
            hit.distance_start,
            hit.distance_end
        );
    }
}
