//! Eased slide animation for the icon and label regions.
//!
//! Each track holds a signed scroll factor in `[-1, 1]` that decays toward 0
//! by a fixed step every frame. The eased factor, scaled to the viewport
//! width, is the pixel offset the region is drawn at.

use crate::selection::Direction;

/// Width of the sliding viewport in pixels.
pub const VIEWPORT: i32 = 240;

/// Scroll factor lost per frame.
pub const DECAY_STEP: f32 = 0.11;

pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        let t = -2.0 * x + 2.0;
        1.0 - t * t * t / 2.0
    }
}

pub fn ease_in_out_quart(x: f32) -> f32 {
    if x < 0.5 {
        8.0 * x * x * x * x
    } else {
        let t = -2.0 * x + 2.0;
        1.0 - t * t * t * t / 2.0
    }
}

fn magnitude(x: f32) -> f32 {
    if x < 0.0 { -x } else { x }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    /// Label: quartic curve, redrawn while within half a viewport.
    Text,
    /// Icon: cubic curve, redrawn in the outer band or when settled.
    Icon,
}

impl TrackKind {
    fn ease(self, x: f32) -> f32 {
        match self {
            TrackKind::Text => ease_in_out_quart(x),
            TrackKind::Icon => ease_in_out_cubic(x),
        }
    }

    /// Whether content has to be drawn at `position` this frame.
    pub fn needs_redraw(self, position: i32) -> bool {
        let distance = position.abs();
        match self {
            TrackKind::Text => distance < VIEWPORT / 2,
            TrackKind::Icon => position == 0 || (distance > VIEWPORT / 8 && distance < 130),
        }
    }
}

/// One track's output for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackFrame {
    pub position: i32,
    /// Offset change since the previous frame; the region scrolls by this.
    pub delta: i32,
    pub redraw: bool,
}

#[derive(Clone, Debug)]
pub struct AnimationTrack {
    kind: TrackKind,
    position: i32,
    previous_position: i32,
    scroll_factor: f32,
    active: bool,
}

impl AnimationTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            position: 0,
            previous_position: 0,
            scroll_factor: 0.0,
            active: false,
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn previous_position(&self) -> i32 {
        self.previous_position
    }

    pub fn scroll_factor(&self) -> f32 {
        self.scroll_factor
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Jumps fully off-screen on the side `direction` comes from.
    pub fn start(&mut self, direction: Direction) {
        let sign = direction.sign();
        self.scroll_factor = sign as f32;
        self.position = sign * VIEWPORT;
        self.previous_position = self.position;
        self.active = true;
    }

    fn decay(&mut self) {
        let step = DECAY_STEP.min(magnitude(self.scroll_factor));
        if self.scroll_factor > 0.0 {
            self.scroll_factor -= step;
        } else {
            self.scroll_factor += step;
        }
    }

    /// Advances one frame. Returns `None` when the track is idle and no
    /// redraw is forced.
    pub fn step(&mut self, force: bool) -> Option<TrackFrame> {
        if self.scroll_factor != 0.0 || force {
            self.decay();
        }
        if !self.active && !force {
            return None;
        }

        let eased = self.kind.ease(magnitude(self.scroll_factor));
        let eased = if self.scroll_factor < 0.0 { -eased } else { eased };
        self.position = (eased * VIEWPORT as f32) as i32;
        if self.position == 0 {
            self.active = false;
        }
        Some(TrackFrame {
            position: self.position,
            delta: self.position - self.previous_position,
            redraw: self.kind.needs_redraw(self.position),
        })
    }

    pub fn end_frame(&mut self) {
        self.previous_position = self.position;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineFrame {
    pub text: Option<TrackFrame>,
    pub icon: Option<TrackFrame>,
}

#[derive(Clone, Debug)]
pub struct AnimationEngine {
    pub text: AnimationTrack,
    pub icon: AnimationTrack,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self {
            text: AnimationTrack::new(TrackKind::Text),
            icon: AnimationTrack::new(TrackKind::Icon),
        }
    }

    pub fn start(&mut self, direction: Direction) {
        self.text.start(direction);
        self.icon.start(direction);
    }

    pub fn step(&mut self, force: bool) -> EngineFrame {
        EngineFrame {
            text: self.text.step(force),
            icon: self.icon.step(force),
        }
    }

    pub fn end_frame(&mut self) {
        self.text.end_frame();
        self.icon.end_frame();
    }

    pub fn is_idle(&self) -> bool {
        !self.text.is_active() && !self.icon.is_active()
    }
}
