use std::cell::Cell;
use std::rc::Rc;

pub const NORMAL_TIME_SCALE: f32 = 1.0;
pub const PAUSED_TIME_SCALE: f32 = 0.0;

/// The process-wide simulation time scale.
pub trait TimeControl {
    fn time_scale(&self) -> f32;
    fn set_time_scale(&mut self, scale: f32);
}

/// A cloneable handle to one time scale value.
///
/// Every clone observes the same value, so the game loop can keep one handle while the menu
/// owns another.
#[derive(Debug, Clone)]
pub struct SharedTimeScale {
    scale: Rc<Cell<f32>>,
}

impl Default for SharedTimeScale {
    fn default() -> Self {
        Self {
            scale: Rc::new(Cell::new(NORMAL_TIME_SCALE)),
        }
    }
}

impl SharedTimeScale {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeControl for SharedTimeScale {
    fn time_scale(&self) -> f32 {
        self.scale.get()
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.scale.set(scale.max(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_time_scale_defaults_to_normal() {
        let time = SharedTimeScale::new();
        assert_eq!(time.time_scale(), NORMAL_TIME_SCALE);
    }

    #[test]
    fn clones_observe_the_same_scale() {
        let observer = SharedTimeScale::new();
        let mut writer = observer.clone();
        writer.set_time_scale(PAUSED_TIME_SCALE);
        assert_eq!(observer.time_scale(), PAUSED_TIME_SCALE);
    }

    #[test]
    fn negative_scales_are_clamped_to_paused() {
        let mut time = SharedTimeScale::new();
        time.set_time_scale(-3.0);
        assert_eq!(time.time_scale(), 0.0);
    }
}
