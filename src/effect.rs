#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Encounter,
    Attack,
    Victory,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    PlaySound(SoundCue),
}
