//! Animated tiles
//!
//! An animated tile cycles through a list of tile graphics. Destructible
//! tiles reuse the same frame lists, but step through them only when hit.

/// One frame of an animated tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimatedTileFrame {
    /// Tile graphic shown during this frame
    pub tile_id: u32,
}

/// Frame list plus playback state
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedTile {
    /// Frames in playback order
    pub frames: Vec<AnimatedTileFrame>,
    /// Ticks per frame; zero or less stops the animation
    pub frame_duration: f32,
    /// Extra frames to wait before restarting
    pub delay: u32,
    /// Play back and forth instead of wrapping around
    pub ping_pong: bool,
    /// Extra frames to wait before turning around
    pub ping_pong_delay: u32,
    current_frame: usize,
    forwards: bool,
    frames_left: f32,
}

impl AnimatedTile {
    /// Create a looping animation starting at the first frame
    pub fn new(tile_ids: &[u32], frame_duration: f32) -> Self {
        Self {
            frames: tile_ids.iter().map(|&tile_id| AnimatedTileFrame { tile_id }).collect(),
            frame_duration,
            delay: 0,
            ping_pong: false,
            ping_pong_delay: 0,
            current_frame: 0,
            forwards: true,
            frames_left: frame_duration,
        }
    }

    /// Create a frame list that never plays on its own (destructible tiles)
    pub fn still(tile_ids: &[u32]) -> Self {
        Self::new(tile_ids, 0.0)
    }

    /// Set the restart delay
    pub fn with_delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    /// Enable ping-pong playback with the given turn-around delay
    pub fn with_ping_pong(mut self, ping_pong_delay: u32) -> Self {
        self.ping_pong = true;
        self.ping_pong_delay = ping_pong_delay;
        self
    }

    /// Index of the frame currently shown
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Tile graphic currently shown, `0` for an empty frame list
    pub fn current_tile_id(&self) -> u32 {
        self.frames.get(self.current_frame).map_or(0, |frame| frame.tile_id)
    }

    /// Advance playback by `time_mult` ticks
    pub fn update(&mut self, time_mult: f32) {
        if self.frame_duration <= 0.0 || self.frames.len() < 2 {
            return;
        }

        let last = self.frames.len() - 1;
        self.frames_left -= time_mult;
        while self.frames_left <= 0.0 {
            if self.forwards {
                if self.current_frame == last {
                    if self.ping_pong {
                        self.forwards = false;
                        self.frames_left += self.frame_duration * (1 + self.ping_pong_delay) as f32;
                    } else {
                        self.current_frame = 0;
                        self.frames_left += self.frame_duration * (1 + self.delay) as f32;
                    }
                } else {
                    self.current_frame += 1;
                    self.frames_left += self.frame_duration;
                }
            } else if self.current_frame == 0 {
                // Reversing only happens in ping-pong mode
                self.forwards = true;
                self.frames_left += self.frame_duration * (1 + self.delay) as f32;
            } else {
                self.current_frame -= 1;
                self.frames_left += self.frame_duration;
            }
        }
    }
}
