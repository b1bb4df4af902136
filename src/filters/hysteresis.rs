/// Debounces a boolean signal by requiring consecutive agreeing frames
///
/// The latched state turns on after `rise_frames` consecutive `true` inputs
/// and turns off after `fall_frames` consecutive `false` inputs. With both
/// counts at 1 the latch passes its input straight through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HysteresisLatch {
    rise_frames: u32,
    fall_frames: u32,
    state: bool,
    run: u32,
}

impl HysteresisLatch {
    /// Create a latch in the off state; zero counts are treated as 1
    #[must_use]
    pub fn new(rise_frames: u32, fall_frames: u32) -> Self {
        Self {
            rise_frames: rise_frames.max(1),
            fall_frames: fall_frames.max(1),
            state: false,
            run: 0,
        }
    }

    /// Feed one raw sample and return the latched state
    pub fn update(&mut self, raw: bool) -> bool {
        if raw == self.state {
            self.run = 0;
            return self.state;
        }

        self.run += 1;
        let needed = if raw { self.rise_frames } else { self.fall_frames };
        if self.run >= needed {
            self.state = raw;
            self.run = 0;
        }
        self.state
    }

    /// Current latched state
    #[must_use]
    pub fn state(&self) -> bool {
        self.state
    }

    /// Force the latch off
    pub fn reset(&mut self) {
        self.state = false;
        self.run = 0;
    }
}

impl Default for HysteresisLatch {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
