//! Frame-skip sampling

/// Selects every Nth frame of a stream for analysis.
///
/// Frame indices are 1-based: with a skip of 2 the 2nd, 4th, 6th... frames
/// are analysed. A skip of 1 analyses every frame.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    skip: u32,
    frame_idx: u64,
}

impl FrameSampler {
    /// Create a sampler (a skip of 0 is treated as 1)
    pub fn new(skip: u32) -> Self {
        Self {
            skip: skip.max(1),
            frame_idx: 0,
        }
    }

    /// Whether the frame with this 1-based index should be analysed
    pub fn should_process(&self, frame_idx: u64) -> bool {
        frame_idx % self.skip as u64 == 0
    }

    /// Advance by one frame. Returns the frame index if it should be analysed.
    pub fn tick(&mut self) -> Option<u64> {
        self.frame_idx += 1;
        self.should_process(self.frame_idx).then_some(self.frame_idx)
    }

    /// Frames seen so far
    pub fn frames_seen(&self) -> u64 {
        self.frame_idx
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    pub fn reset(&mut self) {
        self.frame_idx = 0;
    }
}
