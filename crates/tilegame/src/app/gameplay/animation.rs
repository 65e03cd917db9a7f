#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) enum AnimationType {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Damaged,
    Death,
}

impl AnimationType {
    fn priority(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Walk | Self::Run => 1,
            Self::Attack => 2,
            Self::Damaged => 3,
            Self::Death => 4,
        }
    }

    pub(crate) fn is_one_shot(self) -> bool {
        matches!(self, Self::Attack | Self::Damaged | Self::Death)
    }

    /// Suffix of the sprite key for this clip, e.g. `slime/walk`.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walk => "walk",
            Self::Run => "run",
            Self::Attack => "attack",
            Self::Damaged => "damaged",
            Self::Death => "death",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clip {
    pub(crate) frames: u32,
    pub(crate) ticks_per_frame: u32,
}

impl Clip {
    pub(crate) const fn new(frames: u32, ticks_per_frame: u32) -> Self {
        Self {
            frames,
            ticks_per_frame,
        }
    }
}

/// Per-entity-kind clip lengths.
#[derive(Debug)]
pub(crate) struct ClipTable {
    pub(crate) idle: Clip,
    pub(crate) walk: Clip,
    pub(crate) run: Clip,
    pub(crate) attack: Clip,
    pub(crate) damaged: Clip,
    pub(crate) death: Clip,
    /// Frame of the attack clip on which the hit lands.
    pub(crate) strike_frame: u32,
}

impl ClipTable {
    pub(crate) fn clip(&self, kind: AnimationType) -> Clip {
        match kind {
            AnimationType::Idle => self.idle,
            AnimationType::Walk => self.walk,
            AnimationType::Run => self.run,
            AnimationType::Attack => self.attack,
            AnimationType::Damaged => self.damaged,
            AnimationType::Death => self.death,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnimationEvent {
    None,
    /// An Attack or Damaged clip ran out and the animator fell back to Idle.
    Finished(AnimationType),
    /// The Death clip reached its last frame. Reported once.
    DeathCompleted,
}

/// Clip playback plus the request arbitration that makes up the combat
/// state machine. Requests made during a tick are applied together by
/// [`Animator::initiate`]; the highest priority wins.
#[derive(Debug)]
pub(crate) struct Animator {
    table: &'static ClipTable,
    current: AnimationType,
    frame: u32,
    tick: u32,
    pending: Option<AnimationType>,
    striking: bool,
    death_reported: bool,
}

impl Animator {
    pub(crate) fn new(table: &'static ClipTable) -> Self {
        Self {
            table,
            current: AnimationType::Idle,
            frame: 0,
            tick: 0,
            pending: None,
            striking: false,
            death_reported: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.table);
    }

    pub(crate) fn current(&self) -> AnimationType {
        self.current
    }

    pub(crate) fn frame(&self) -> u32 {
        self.frame
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.current == AnimationType::Death
    }

    /// True only during the tick on which the attack clip reached its
    /// strike frame.
    pub(crate) fn is_striking(&self) -> bool {
        self.striking
    }

    pub(crate) fn request(&mut self, kind: AnimationType) {
        if self.is_dead() {
            return;
        }
        self.pending = match self.pending {
            Some(pending) if pending.priority() > kind.priority() => Some(pending),
            _ => Some(kind),
        };
    }

    /// Death and hits bypass arbitration so that a killing blow lands on
    /// the same tick it is resolved.
    pub(crate) fn force(&mut self, kind: AnimationType) {
        if self.is_dead() {
            return;
        }
        self.pending = None;
        self.switch_to(kind);
    }

    pub(crate) fn initiate(&mut self) {
        let Some(next) = self.pending.take() else {
            return;
        };
        if self.is_dead() {
            return;
        }
        if self.current.is_one_shot() && next.priority() < self.current.priority() {
            return;
        }
        if self.current == AnimationType::Attack && next == AnimationType::Attack {
            return;
        }
        if next != self.current || next == AnimationType::Damaged {
            self.switch_to(next);
        }
    }

    pub(crate) fn advance(&mut self) -> AnimationEvent {
        self.striking = false;
        let clip = self.table.clip(self.current);
        if self.is_dead() && self.frame + 1 >= clip.frames {
            return self.report_death();
        }

        self.tick += 1;
        if self.tick < clip.ticks_per_frame.max(1) {
            return AnimationEvent::None;
        }
        self.tick = 0;
        self.frame += 1;

        if self.current == AnimationType::Attack && self.frame == self.table.strike_frame {
            self.striking = true;
        }
        if self.frame < clip.frames.max(1) {
            return AnimationEvent::None;
        }

        match self.current {
            AnimationType::Death => {
                self.frame = clip.frames.saturating_sub(1);
                self.report_death()
            }
            finished @ (AnimationType::Attack | AnimationType::Damaged) => {
                self.switch_to(AnimationType::Idle);
                AnimationEvent::Finished(finished)
            }
            _ => {
                self.frame = 0;
                AnimationEvent::None
            }
        }
    }

    fn report_death(&mut self) -> AnimationEvent {
        if self.death_reported {
            return AnimationEvent::None;
        }
        self.death_reported = true;
        AnimationEvent::DeathCompleted
    }

    fn switch_to(&mut self, kind: AnimationType) {
        self.current = kind;
        self.frame = 0;
        self.tick = 0;
    }
}
