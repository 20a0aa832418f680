//! Closed bone set, the fixed action/direction grammar, and the bone constraint table.
//!
//! The table is a versioned data asset: changing any limit changes compiler semantics,
//! so bump [`CONSTRAINT_TABLE_VERSION`] together with the crate version.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the limit data in [`max_magnitude`].
pub const CONSTRAINT_TABLE_VERSION: u32 = 1;

/// Every bone an MPL statement may address.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoneId {
    Base,
    Center,
    UpperBody,
    LowerBody,
    Waist,
    Neck,
    Head,
    ShoulderL,
    ShoulderR,
    ArmL,
    ArmR,
    ElbowL,
    ElbowR,
    WristL,
    WristR,
    LegL,
    LegR,
    KneeL,
    KneeR,
    AnkleL,
    AnkleR,
    ThumbL,
    ThumbR,
    IndexL,
    IndexR,
    MiddleL,
    MiddleR,
    RingL,
    RingR,
    PinkyL,
    PinkyR,
}

impl BoneId {
    pub const COUNT: usize = 31;

    /// All bones in declaration order. Encoded records follow this order.
    pub const ALL: [BoneId; BoneId::COUNT] = [
        BoneId::Base,
        BoneId::Center,
        BoneId::UpperBody,
        BoneId::LowerBody,
        BoneId::Waist,
        BoneId::Neck,
        BoneId::Head,
        BoneId::ShoulderL,
        BoneId::ShoulderR,
        BoneId::ArmL,
        BoneId::ArmR,
        BoneId::ElbowL,
        BoneId::ElbowR,
        BoneId::WristL,
        BoneId::WristR,
        BoneId::LegL,
        BoneId::LegR,
        BoneId::KneeL,
        BoneId::KneeR,
        BoneId::AnkleL,
        BoneId::AnkleR,
        BoneId::ThumbL,
        BoneId::ThumbR,
        BoneId::IndexL,
        BoneId::IndexR,
        BoneId::MiddleL,
        BoneId::MiddleR,
        BoneId::RingL,
        BoneId::RingR,
        BoneId::PinkyL,
        BoneId::PinkyR,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in MPL source.
    pub fn name(self) -> &'static str {
        match self {
            BoneId::Base => "base",
            BoneId::Center => "center",
            BoneId::UpperBody => "upper_body",
            BoneId::LowerBody => "lower_body",
            BoneId::Waist => "waist",
            BoneId::Neck => "neck",
            BoneId::Head => "head",
            BoneId::ShoulderL => "shoulder_l",
            BoneId::ShoulderR => "shoulder_r",
            BoneId::ArmL => "arm_l",
            BoneId::ArmR => "arm_r",
            BoneId::ElbowL => "elbow_l",
            BoneId::ElbowR => "elbow_r",
            BoneId::WristL => "wrist_l",
            BoneId::WristR => "wrist_r",
            BoneId::LegL => "leg_l",
            BoneId::LegR => "leg_r",
            BoneId::KneeL => "knee_l",
            BoneId::KneeR => "knee_r",
            BoneId::AnkleL => "ankle_l",
            BoneId::AnkleR => "ankle_r",
            BoneId::ThumbL => "thumb_l",
            BoneId::ThumbR => "thumb_r",
            BoneId::IndexL => "index_l",
            BoneId::IndexR => "index_r",
            BoneId::MiddleL => "middle_l",
            BoneId::MiddleR => "middle_r",
            BoneId::RingL => "ring_l",
            BoneId::RingR => "ring_r",
            BoneId::PinkyL => "pinky_l",
            BoneId::PinkyR => "pinky_r",
        }
    }

    /// Bone name as the playback engine's skeleton spells it (standard MMD naming).
    pub fn player_name(self) -> &'static str {
        match self {
            BoneId::Base => "全ての親",
            BoneId::Center => "センター",
            BoneId::UpperBody => "上半身",
            BoneId::LowerBody => "下半身",
            BoneId::Waist => "腰",
            BoneId::Neck => "首",
            BoneId::Head => "頭",
            BoneId::ShoulderL => "左肩",
            BoneId::ShoulderR => "右肩",
            BoneId::ArmL => "左腕",
            BoneId::ArmR => "右腕",
            BoneId::ElbowL => "左ひじ",
            BoneId::ElbowR => "右ひじ",
            BoneId::WristL => "左手首",
            BoneId::WristR => "右手首",
            BoneId::LegL => "左足",
            BoneId::LegR => "右足",
            BoneId::KneeL => "左ひざ",
            BoneId::KneeR => "右ひざ",
            BoneId::AnkleL => "左足首",
            BoneId::AnkleR => "右足首",
            BoneId::ThumbL => "左親指１",
            BoneId::ThumbR => "右親指１",
            BoneId::IndexL => "左人指１",
            BoneId::IndexR => "右人指１",
            BoneId::MiddleL => "左中指１",
            BoneId::MiddleR => "右中指１",
            BoneId::RingL => "左薬指１",
            BoneId::RingR => "右薬指１",
            BoneId::PinkyL => "左小指１",
            BoneId::PinkyR => "右小指１",
        }
    }

    pub fn from_name(name: &str) -> Option<BoneId> {
        BoneId::ALL.iter().copied().find(|b| b.name() == name)
    }

    pub fn from_player_name(name: &str) -> Option<BoneId> {
        BoneId::ALL.iter().copied().find(|b| b.player_name() == name)
    }

    /// Whether the bone accepts `move` clauses (and so may carry a translation).
    pub fn supports_move(self) -> bool {
        limits(self).translate.is_some()
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Bend,
    Turn,
    Sway,
    Move,
}

impl Action {
    pub fn word(self) -> &'static str {
        match self {
            Action::Bend => "bend",
            Action::Turn => "turn",
            Action::Sway => "sway",
            Action::Move => "move",
        }
    }

    /// ASCII case-insensitive keyword lookup.
    pub fn from_word(word: &str) -> Option<Action> {
        [Action::Bend, Action::Turn, Action::Sway, Action::Move]
            .into_iter()
            .find(|a| a.word().eq_ignore_ascii_case(word))
    }

    /// Human-readable list of the directions the grammar allows after this action.
    pub fn expected_directions(self) -> &'static str {
        match self {
            Action::Bend => "'forward' or 'backward'",
            Action::Turn | Action::Sway => "'left' or 'right'",
            Action::Move => "'forward', 'backward', 'left', 'right', 'up' or 'down'",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn word(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn from_word(word: &str) -> Option<Direction> {
        [
            Direction::Forward,
            Direction::Backward,
            Direction::Left,
            Direction::Right,
            Direction::Up,
            Direction::Down,
        ]
        .into_iter()
        .find(|d| d.word().eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.word())
    }
}

/// One transform channel of a bone. Rotations are in degrees, translations in model units.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Pitch,
    Yaw,
    Roll,
    TranslateX,
    TranslateY,
    TranslateZ,
}

impl AxisKind {
    pub const COUNT: usize = 6;

    pub const ALL: [AxisKind; AxisKind::COUNT] = [
        AxisKind::Pitch,
        AxisKind::Yaw,
        AxisKind::Roll,
        AxisKind::TranslateX,
        AxisKind::TranslateY,
        AxisKind::TranslateZ,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, AxisKind::Pitch | AxisKind::Yaw | AxisKind::Roll)
    }

    pub fn name(self) -> &'static str {
        match self {
            AxisKind::Pitch => "pitch",
            AxisKind::Yaw => "yaw",
            AxisKind::Roll => "roll",
            AxisKind::TranslateX => "translate_x",
            AxisKind::TranslateY => "translate_y",
            AxisKind::TranslateZ => "translate_z",
        }
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sign applied to a clause magnitude when it is written to its axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[inline]
    pub fn apply(self, magnitude: f64) -> f64 {
        match self {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        }
    }
}

/// Fixed grammar mapping from an (action, direction) pair to the axis it drives.
///
/// Pitch is about X (bend forward = head down = +), yaw about Y (turn left = +),
/// roll about Z (sway right = +). The model faces -Z, so `move backward` is +Z.
pub fn axis_for(action: Action, direction: Direction) -> Option<(AxisKind, Sign)> {
    use Action::*;
    use Direction::*;
    let mapped = match (action, direction) {
        (Bend, Forward) => (AxisKind::Pitch, Sign::Positive),
        (Bend, Backward) => (AxisKind::Pitch, Sign::Negative),
        (Turn, Left) => (AxisKind::Yaw, Sign::Positive),
        (Turn, Right) => (AxisKind::Yaw, Sign::Negative),
        (Sway, Right) => (AxisKind::Roll, Sign::Positive),
        (Sway, Left) => (AxisKind::Roll, Sign::Negative),
        (Move, Left) => (AxisKind::TranslateX, Sign::Positive),
        (Move, Right) => (AxisKind::TranslateX, Sign::Negative),
        (Move, Up) => (AxisKind::TranslateY, Sign::Positive),
        (Move, Down) => (AxisKind::TranslateY, Sign::Negative),
        (Move, Backward) => (AxisKind::TranslateZ, Sign::Positive),
        (Move, Forward) => (AxisKind::TranslateZ, Sign::Negative),
        _ => return None,
    };
    Some(mapped)
}

/// One row of the constraint table. `None` means the motion is not permitted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoneLimits {
    pub bend_forward: Option<f64>,
    pub bend_backward: Option<f64>,
    pub turn: Option<f64>,
    pub sway_left: Option<f64>,
    pub sway_right: Option<f64>,
    /// Applies to all six `move` directions.
    pub translate: Option<f64>,
}

const fn rotations(fwd: f64, bwd: f64, turn: f64, sway: f64) -> BoneLimits {
    BoneLimits {
        bend_forward: Some(fwd),
        bend_backward: Some(bwd),
        turn: Some(turn),
        sway_left: Some(sway),
        sway_right: Some(sway),
        translate: None,
    }
}

const fn finger(bwd: f64, sway: f64) -> BoneLimits {
    BoneLimits {
        bend_forward: Some(90.0),
        bend_backward: Some(bwd),
        turn: None,
        sway_left: Some(sway),
        sway_right: Some(sway),
        translate: None,
    }
}

const NONE: BoneLimits = BoneLimits {
    bend_forward: None,
    bend_backward: None,
    turn: None,
    sway_left: None,
    sway_right: None,
    translate: None,
};

/// The table row for `bone`. The match is exhaustive, so a bone without a row does not compile.
pub const fn limits(bone: BoneId) -> BoneLimits {
    use BoneId::*;
    match bone {
        Base => BoneLimits {
            translate: Some(100.0),
            ..rotations(90.0, 90.0, 180.0, 180.0)
        },
        Center => BoneLimits {
            translate: Some(100.0),
            ..rotations(180.0, 180.0, 180.0, 180.0)
        },
        UpperBody | LowerBody | Waist => rotations(90.0, 90.0, 90.0, 90.0),
        Neck | Head => rotations(60.0, 90.0, 90.0, 60.0),
        ShoulderL | ShoulderR | ArmL | ArmR => rotations(90.0, 90.0, 90.0, 90.0),
        ElbowL | ElbowR => BoneLimits {
            bend_forward: Some(180.0),
            ..NONE
        },
        WristL | WristR => rotations(60.0, 90.0, 90.0, 90.0),
        LegL => BoneLimits {
            sway_left: Some(180.0),
            sway_right: Some(30.0),
            ..rotations(180.0, 90.0, 90.0, 0.0)
        },
        LegR => BoneLimits {
            sway_left: Some(30.0),
            sway_right: Some(180.0),
            ..rotations(180.0, 90.0, 90.0, 0.0)
        },
        KneeL | KneeR => BoneLimits {
            bend_backward: Some(180.0),
            ..NONE
        },
        AnkleL | AnkleR => rotations(60.0, 60.0, 90.0, 30.0),
        ThumbL | ThumbR => finger(30.0, 45.0),
        IndexL | IndexR | MiddleL | MiddleR | RingL | RingR | PinkyL | PinkyR => finger(30.0, 30.0),
    }
}

/// Maximum magnitude for `bone action direction`, or `None` when the combination is not permitted.
pub fn max_magnitude(bone: BoneId, action: Action, direction: Direction) -> Option<f64> {
    let row = limits(bone);
    match (action, direction) {
        (Action::Bend, Direction::Forward) => row.bend_forward,
        (Action::Bend, Direction::Backward) => row.bend_backward,
        (Action::Turn, Direction::Left | Direction::Right) => row.turn,
        (Action::Sway, Direction::Left) => row.sway_left,
        (Action::Sway, Direction::Right) => row.sway_right,
        (Action::Move, _) => row.translate,
        _ => None,
    }
}
