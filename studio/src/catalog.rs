use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub genre: String,
    pub rating: f64,
    pub downloads: u64,
    pub size: String,
    pub last_updated: NaiveDate,
}

impl GameMetadata {
    pub fn label(&self) -> String {
        format!("{} v{}", self.title, self.version)
    }
}

/// Read-only source of selectable games.
pub trait Catalog {
    fn list_games(&self) -> Vec<GameMetadata>;

    fn find(&self, id: &str) -> Option<GameMetadata> {
        self.list_games().into_iter().find(|game| game.id == id)
    }
}

/// Button caption for the catalog picker.
pub fn selection_label(current: Option<&GameMetadata>) -> String {
    current.map_or_else(|| "Select Game".to_string(), GameMetadata::label)
}

#[derive(Debug, Clone)]
pub struct StaticCatalog {
    games: Vec<GameMetadata>,
}

impl StaticCatalog {
    pub fn new(games: Vec<GameMetadata>) -> Self {
        Self { games }
    }

    /// The four built-in sample games.
    pub fn sample() -> Self {
        Self::new(
            SAMPLE_GAMES
                .iter()
                .map(SampleGame::to_metadata)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::sample()
    }
}

impl Catalog for StaticCatalog {
    fn list_games(&self) -> Vec<GameMetadata> {
        self.games.clone()
    }

    fn find(&self, id: &str) -> Option<GameMetadata> {
        self.games.iter().find(|game| game.id == id).cloned()
    }
}

struct SampleGame {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    author: &'static str,
    version: &'static str,
    genre: &'static str,
    rating: f64,
    downloads: u64,
    size: &'static str,
    last_updated: (i32, u32, u32),
}

impl SampleGame {
    fn to_metadata(&self) -> GameMetadata {
        let (y, m, d) = self.last_updated;
        GameMetadata {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            author: self.author.to_string(),
            version: self.version.to_string(),
            genre: self.genre.to_string(),
            rating: self.rating,
            downloads: self.downloads,
            size: self.size.to_string(),
            last_updated: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        }
    }
}

const SAMPLE_GAMES: &[SampleGame] = &[
    SampleGame {
        id: "forest-adventure",
        title: "Forest Adventure",
        description: "An immersive RPG experience in a mystical forest world with magical creatures and ancient secrets.",
        author: "GameDev Studio",
        version: "1.2.0",
        genre: "RPG",
        rating: 4.8,
        downloads: 15420,
        size: "45.2 MB",
        last_updated: (2025, 1, 15),
    },
    SampleGame {
        id: "space-explorer",
        title: "Space Explorer",
        description: "Navigate through the cosmos, discover new planets, and build your intergalactic empire.",
        author: "Cosmic Games",
        version: "2.1.5",
        genre: "Strategy",
        rating: 4.6,
        downloads: 8930,
        size: "67.8 MB",
        last_updated: (2025, 1, 12),
    },
    SampleGame {
        id: "pixel-platformer",
        title: "Pixel Platformer",
        description: "Classic 2D platformer with pixel art graphics, challenging levels, and retro soundtrack.",
        author: "Retro Studios",
        version: "1.0.3",
        genre: "Platformer",
        rating: 4.7,
        downloads: 12650,
        size: "28.5 MB",
        last_updated: (2025, 1, 10),
    },
    SampleGame {
        id: "puzzle-master",
        title: "Puzzle Master",
        description: "Mind-bending puzzles that will challenge your logic and problem-solving skills.",
        author: "Brain Games Inc",
        version: "1.5.2",
        genre: "Puzzle",
        rating: 4.9,
        downloads: 23180,
        size: "15.7 MB",
        last_updated: (2025, 1, 8),
    },
];
