//! Drag-to-shoot gesture tracking.
//!
//! A drag owns the pointer from the moment it grabs the cue ball until one of
//! its exit paths runs: pointer up (shoot), pointer cancel, lost capture, or
//! the owning connection going away. Every exit path clears the capture.

use pooltrivia_shared::config::TableConfig;
use pooltrivia_shared::vec2::{self, Vec2};

/// Identifies a captured pointer: which connection, which pointer on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerOwner {
    pub connection_id: u32,
    pub pointer_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub owner: PointerOwner,
    /// Cue ball position when the drag began
    pub start: Vec2,
    /// Latest pointer position
    pub now: Vec2,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    drag: Option<Drag>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&Drag> {
        self.drag.as_ref()
    }

    /// Capture the pointer if it lands within `grab_radius` of the cue ball.
    /// Refused while another pointer holds the capture.
    pub fn try_capture(
        &mut self,
        owner: PointerOwner,
        pointer: Vec2,
        cue_pos: Vec2,
        grab_radius: f64,
    ) -> bool {
        if self.drag.is_some() {
            return false;
        }
        if vec2::distance(pointer, cue_pos) > grab_radius {
            return false;
        }
        self.drag = Some(Drag {
            owner,
            start: cue_pos,
            now: pointer,
        });
        true
    }

    /// Track pointer movement. Events from other pointers are ignored.
    pub fn update(&mut self, owner: PointerOwner, pointer: Vec2) -> bool {
        match &mut self.drag {
            Some(drag) if drag.owner == owner => {
                drag.now = pointer;
                true
            }
            _ => false,
        }
    }

    /// Pointer up: release the capture and hand back the finished drag.
    pub fn release(&mut self, owner: PointerOwner) -> Option<Drag> {
        if self.drag.is_some_and(|d| d.owner == owner) {
            return self.drag.take();
        }
        None
    }

    /// Pointer cancel or lost capture: drop the drag without shooting.
    pub fn cancel(&mut self, owner: PointerOwner) -> bool {
        self.release(owner).is_some()
    }

    /// The connection went away; release anything it captured.
    pub fn release_connection(&mut self, connection_id: u32) -> bool {
        if self
            .drag
            .is_some_and(|d| d.owner.connection_id == connection_id)
        {
            self.drag = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.drag = None;
    }
}

/// Convert a drag into a cue velocity: pull back to shoot forward.
/// Short drags return None.
pub fn drag_velocity(drag: &Drag, config: &TableConfig) -> Option<Vec2> {
    let pull = vec2::sub(drag.start, drag.now);
    let magnitude = vec2::length(pull);
    if magnitude < config.min_drag {
        return None;
    }
    let power = (magnitude / config.power_divisor).min(config.max_shot_power);
    Some(vec2::scale(pull, power / magnitude))
}
