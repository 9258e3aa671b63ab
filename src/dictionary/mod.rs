use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

use crate::game::GRID_SIZE;

/// Words used when no word list file is available. Enough for a board or
/// two; a real deployment ships a larger list.
const BUILTIN_WORDS: &[&str] = &[
    "AFRICA", "AGENT", "AIR", "ALIEN", "AMAZON", "ANGEL", "ANTARCTICA", "APPLE", "ARM", "BACK",
    "BAND", "BANK", "BARK", "BEACH", "BELT", "BERLIN", "BERRY", "BOARD", "BOND", "BOOM", "BOW",
    "BOX", "BUG", "CANADA", "CAPITAL", "CELL", "CENTER", "CHINA", "CHOCOLATE", "CIRCLE", "CLUB",
    "COMPOUND", "COPPER", "CRASH", "CRICKET", "CROSS", "DEATH", "DICE", "DINOSAUR", "DOCTOR",
    "DOG", "DRESS", "DWARF", "EAGLE", "ENGINE", "FAIR", "FALL", "FIELD", "FIRE", "FISH", "FLUTE",
    "FORCE", "FOREST", "GAME", "GENIUS", "GHOST", "GIANT", "GLASS", "GOLD", "GRASS", "HAND",
    "HEART", "HELICOPTER", "HOLE", "HOOK", "HORSE", "ICE", "IRON", "JACK", "JET", "KEY", "KING",
    "KNIGHT", "LAB", "LEMON", "LIGHT", "LION", "LOCK", "MAPLE", "MARCH", "MATCH", "MERCURY",
    "MOON", "MOUNT", "NEEDLE", "NET", "NIGHT", "NOTE", "OCEAN", "OLIVE", "OPERA", "ORANGE",
    "PAN", "PAPER", "PARACHUTE", "PASTE", "PIANO", "PILOT", "PIPE", "PIRATE", "PLANE", "PLATE",
    "POINT", "POLE", "PORT", "PRESS", "PYRAMID", "QUEEN", "RING", "ROBOT", "ROCK", "ROUND",
    "SATURN", "SCHOOL", "SCREEN", "SHADOW", "SHIP", "SHOE", "SLIP", "SNOW", "SPACE", "SPIDER",
    "SPRING", "SQUARE", "STAR", "STRING", "SUB", "TABLE", "TAG", "THIEF", "TIME", "TOOTH",
    "TORCH", "TOWER", "TRAIN", "TRIANGLE", "UNICORN", "VAN", "WAKE", "WATCH", "WAVE", "WHALE",
    "WIND", "WITCH", "WORM", "YARD",
];

/// Candidate board words for the default word pack
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Load a word list from a file, one word per line. Blank lines and
    /// `#` comments are skipped; duplicates are dropped case-insensitively.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading word list {}", path.display()))?;
        let list = Self::parse(&content);

        anyhow::ensure!(
            list.len() >= GRID_SIZE,
            "word list {} has {} usable words, at least {} are needed",
            path.display(),
            list.len(),
            GRID_SIZE
        );

        tracing::info!("Loaded {} words from {}", list.len(), path.display());
        Ok(list)
    }

    pub fn parse(content: &str) -> Self {
        let mut seen = HashSet::new();
        let words = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_uppercase())
            .filter(|word| seen.insert(word.clone()))
            .collect();

        Self { words }
    }

    pub fn builtin() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn into_words(self) -> Vec<String> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
