//! Named regions of the playfield that game rules react to.
//!
//! Zones replace hard-coded coordinate checks: the win pocket, the fall
//! plane and the goals are all configured regions tested against object
//! positions each frame. [`ZoneTrigger`] adds the edge detection so a
//! rule fires once per entry instead of every frame the object sits
//! inside.

use cgmath::Vector3;
use serde::Deserialize;

/// An axis-aligned region of the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Zone {
    /// Axis-aligned box between two corners, half-open: the min corner
    /// is inside, the max corner is not.
    Box { min: [f32; 3], max: [f32; 3] },
    /// Everything under a horizontal plane, for out-of-bounds detection.
    Below { y: f32 },
}

impl Zone {
    pub fn contains(&self, position: Vector3<f32>) -> bool {
        match self {
            Zone::Box { min, max } => {
                (min[0]..max[0]).contains(&position.x)
                    && (min[1]..max[1]).contains(&position.y)
                    && (min[2]..max[2]).contains(&position.z)
            }
            Zone::Below { y } => position.y < *y,
        }
    }
}

/// Edge-triggered zone membership.
///
/// [`ZoneTrigger::observe`] returns true only on the frame the position
/// crosses from outside to inside. The object has to leave the zone
/// before the trigger can fire again.
#[derive(Clone, Copy, Debug)]
pub struct ZoneTrigger {
    zone: Zone,
    inside: bool,
}

impl ZoneTrigger {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            inside: false,
        }
    }

    pub fn observe(&mut self, position: Vector3<f32>) -> bool {
        let now_inside = self.zone.contains(position);
        let entered = now_inside && !self.inside;
        self.inside = now_inside;
        entered
    }

    /// Forget the membership state, for example after a respawn placed
    /// the object outside the zone without it moving through space.
    pub fn reset(&mut self) {
        self.inside = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_zone_is_half_open() {
        let zone = Zone::Box {
            min: [-1.0, -1.0, -1.0],
            max: [1.0, 1.0, 1.0],
        };
        assert!(zone.contains(Vector3::new(0.0, 0.0, 0.0)));
        assert!(zone.contains(Vector3::new(-1.0, -1.0, -1.0)));
        assert!(!zone.contains(Vector3::new(1.0, 1.0, 1.0)));
        assert!(!zone.contains(Vector3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn a_point_on_the_max_face_is_outside() {
        // The win pocket ends exactly at the wall plane; sitting on it
        // must not count as inside.
        let zone = Zone::Box {
            min: [-100.0, -5.0, -6.7],
            max: [-9.0, 5.0, -6.3],
        };
        assert!(zone.contains(Vector3::new(-9.5, 0.0, -6.5)));
        assert!(!zone.contains(Vector3::new(-9.0, 0.0, -6.5)));
    }

    #[test]
    fn below_zone_is_an_open_half_space() {
        let zone = Zone::Below { y: -15.0 };
        assert!(zone.contains(Vector3::new(100.0, -16.0, -42.0)));
        assert!(!zone.contains(Vector3::new(0.0, -15.0, 0.0)));
    }

    #[test]
    fn trigger_fires_once_per_crossing() {
        let mut trigger = ZoneTrigger::new(Zone::Below { y: 0.0 });
        let above = Vector3::new(0.0, 1.0, 0.0);
        let below = Vector3::new(0.0, -1.0, 0.0);

        assert!(!trigger.observe(above));
        assert!(trigger.observe(below));
        // still inside: no re-fire
        assert!(!trigger.observe(below));
        assert!(!trigger.observe(above));
        // second crossing fires again
        assert!(trigger.observe(below));
    }

    #[test]
    fn reset_rearms_a_latched_trigger() {
        let mut trigger = ZoneTrigger::new(Zone::Below { y: 0.0 });
        let below = Vector3::new(0.0, -1.0, 0.0);
        assert!(trigger.observe(below));
        trigger.reset();
        assert!(trigger.observe(below));
    }
}
