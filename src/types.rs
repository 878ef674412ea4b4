use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Unit step along this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn velocity(self, speed: i32) -> (i32, i32) {
        let (dx, dy) = self.delta();
        (dx * speed, dy * speed)
    }

    /// Cosmetic heading in degrees, matching how clones are drawn.
    pub fn angle(self) -> f32 {
        match self {
            Self::Right => 0.0,
            Self::Down => 90.0,
            Self::Left => 180.0,
            Self::Up => 270.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostVariant {
    Red,
    Pink,
    Orange,
    Blue,
}

impl GhostVariant {
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'r' => Some(Self::Red),
            'p' => Some(Self::Pink),
            'o' => Some(Self::Orange),
            'b' => Some(Self::Blue),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Pink => 'p',
            Self::Orange => 'o',
            Self::Blue => 'b',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Open,
    PortalOpen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Scared,
    Frozen,
    Entangled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    Entangle,
    Freeze,
}

impl TrapKind {
    pub fn effect(self) -> EffectKind {
        match self {
            Self::Entangle => EffectKind::Entangled,
            Self::Freeze => EffectKind::Frozen,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Food,
    PowerPlus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Start,
    Running,
    GameOver,
    Win,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Win)
    }
}

/// What happens once every collectible on the board has been eaten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelClearPolicy {
    #[default]
    Reload,
    Win,
}

impl LevelClearPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "reload" => Some(Self::Reload),
            "win" => Some(Self::Win),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    ActivateSkill,
    BreakIce,
    StartGame,
    RestartGame,
}

impl Command {
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(dir) = Direction::parse(value) {
            return Some(Self::Turn(dir));
        }
        match value {
            "skill" => Some(Self::ActivateSkill),
            "break_ice" => Some(Self::BreakIce),
            "start" => Some(Self::StartGame),
            "restart" => Some(Self::RestartGame),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned box in board pixels. Size is fixed once created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Body {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Body {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn square(x: i32, y: i32, size: i32) -> Self {
        Self::new(x, y, size, size)
    }

    pub fn moved(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneEnd {
    Wall,
    OutOfBounds,
    Ghost,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorldInit {
    pub columns: i32,
    pub rows: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: i32,
    pub tiles: Vec<String>,
    #[serde(rename = "portalBand")]
    pub portal_band: (i32, i32),
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub dir: Direction,
    pub lives: i32,
    pub score: i32,
    #[serde(rename = "skillCharges")]
    pub skill_charges: i32,
    #[serde(rename = "frozenMs")]
    pub frozen_ms: u64,
    #[serde(rename = "entangledMs")]
    pub entangled_ms: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GhostStatus {
    Normal,
    Scared {
        #[serde(rename = "remainingMs")]
        remaining_ms: u64,
    },
    Dead {
        #[serde(rename = "respawnInMs")]
        respawn_in_ms: u64,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub variant: GhostVariant,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub dir: Direction,
    pub status: GhostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shield: Option<i32>,
    #[serde(rename = "frozenMs")]
    pub frozen_ms: u64,
    #[serde(rename = "entangledMs")]
    pub entangled_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrapView {
    pub id: u64,
    pub kind: TrapKind,
    pub x: i32,
    pub y: i32,
    pub size: i32,
    #[serde(rename = "remainingMs")]
    pub remaining_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CloneView {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub rotation: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct CollectibleView {
    pub kind: CollectibleKind,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    FoodEaten {
        x: i32,
        y: i32,
    },
    PowerPlusEaten {
        x: i32,
        y: i32,
        charges: i32,
    },
    CloneFired {
        #[serde(rename = "cloneId")]
        clone_id: u64,
        dir: Direction,
    },
    CloneDestroyed {
        #[serde(rename = "cloneId")]
        clone_id: u64,
        reason: CloneEnd,
    },
    ShieldHit {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        remaining: i32,
    },
    GhostScared {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
    GhostEaten {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        variant: GhostVariant,
        points: i32,
    },
    GhostRespawned {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
    },
    GhostTeleported {
        #[serde(rename = "ghostId")]
        ghost_id: usize,
        x: i32,
        y: i32,
    },
    TrapPlaced {
        #[serde(rename = "trapId")]
        trap_id: u64,
        kind: TrapKind,
        x: i32,
        y: i32,
    },
    TrapTriggered {
        #[serde(rename = "trapId")]
        trap_id: u64,
        kind: TrapKind,
    },
    PlayerHit {
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    IceBroken,
    LevelCleared {
        level: u32,
    },
    GameOver {
        score: i32,
    },
    Victory {
        score: i32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub state: GameState,
    pub level: u32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub traps: Vec<TrapView>,
    pub clones: Vec<CloneView>,
    pub collectibles: Vec<CollectibleView>,
    #[serde(rename = "foodLeft")]
    pub food_left: usize,
    #[serde(rename = "powerPlusLeft")]
    pub power_plus_left: usize,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub state: GameState,
    pub level: u32,
    pub score: i32,
    pub lives: i32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub ticks: u64,
}
