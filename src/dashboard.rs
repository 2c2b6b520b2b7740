use chrono::{Days, Local, NaiveDate};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use time_humanize::{Accuracy, HumanTime, Tense};

/// Embedded mock data for the dashboard and teacher portal screens. There is
/// no backend; these tables stand in for one.
pub(crate) static DATA_DIR: Dir = include_dir!("src/data");

const POINTS_PER_LEVEL: u32 = 300;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct UserStats {
    pub name: String,
    pub level: u32,
    pub total_points: u32,
    pub badges_earned: u32,
    pub quizzes_completed: u32,
    pub streak_days: u32,
    pub average_score: u32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Badge {
    pub name: String,
    pub icon: String,
    pub earned: bool,
    pub description: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ActivityEntry {
    pub quiz: String,
    pub score: u32,
    pub days_ago: u64,
    pub points: u32,
}

impl ActivityEntry {
    /// Calendar date of the activity, counted back from today.
    pub fn date(&self) -> NaiveDate {
        Local::now()
            .date_naive()
            .checked_sub_days(Days::new(self.days_ago))
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Relative label in the style of the web app ("Today", "Yesterday",
    /// "2 days ago").
    pub fn relative_label(&self) -> String {
        match self.days_ago {
            0 => "Today".to_string(),
            1 => "Yesterday".to_string(),
            n => HumanTime::from(std::time::Duration::from_secs(n * 86_400))
                .to_text_en(Accuracy::Rough, Tense::Past),
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub user_stats: UserStats,
    pub badges: Vec<Badge>,
    pub recent_activity: Vec<ActivityEntry>,
}

impl Dashboard {
    pub fn load() -> Self {
        let file = DATA_DIR
            .get_file("dashboard.json")
            .expect("dashboard data not embedded");
        let contents = file
            .contents_utf8()
            .expect("dashboard data is not valid utf-8");
        from_str(contents).expect("dashboard data failed to deserialize")
    }

    /// Progress toward the next level as a percentage of the 300-point band.
    pub fn level_progress_percent(&self) -> f64 {
        (self.user_stats.total_points % POINTS_PER_LEVEL) as f64 / POINTS_PER_LEVEL as f64 * 100.0
    }

    /// Points still needed to reach the next level.
    pub fn points_to_next_level(&self) -> u32 {
        POINTS_PER_LEVEL - self.user_stats.total_points % POINTS_PER_LEVEL
    }

    pub fn earned_badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.iter().filter(|b| b.earned)
    }
}
