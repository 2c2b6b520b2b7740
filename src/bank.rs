use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde_json::from_str;

static BANK_DIR: Dir = include_dir!("src/bank");

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    pub difficulty: Difficulty,
}

/// A themed, ordered set of questions. Option order inside a question is
/// significant: `correct_index` points into it.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct QuizDefinition {
    pub title: String,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    /// Reorder the questions themselves. Options are never shuffled since
    /// their positions are the answer key.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.questions.shuffle(rng);
    }
}

/// Look up a quiz by theme id ("continents", "capitals", ...). Returns None
/// for an unknown theme so the caller can show a not-found screen.
pub fn get_quiz(theme: &str) -> Option<QuizDefinition> {
    let file = BANK_DIR.get_file(format!("{theme}.json"))?;
    let contents = file.contents_utf8()?;
    from_str(contents).ok()
}

/// Sorted theme ids present in the embedded bank, for the home screen.
pub fn available_themes() -> Vec<String> {
    let mut themes: Vec<String> = BANK_DIR
        .files()
        .filter_map(|f| {
            let name = f.path().file_name()?.to_str()?;
            name.strip_suffix(".json").map(str::to_string)
        })
        .collect();
    themes.sort();
    themes
}
