use crate::dashboard::DATA_DIR;
use crate::util::mean;
use chrono::NaiveDate;
use itertools::Itertools;
use serde::Deserialize;
use serde_json::from_str;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    pub students: u32,
    pub avg_score: u32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct StudentRecord {
    pub name: String,
    pub quizzes: u32,
    pub avg_score: u32,
    pub last_active_days_ago: u64,
    pub streak: u32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Assignment {
    pub title: String,
    pub assigned: NaiveDate,
    pub due: NaiveDate,
    pub completed: u32,
    pub total: u32,
}

impl Assignment {
    pub fn completion_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (100.0 * self.completed as f64 / self.total as f64).round() as u32
    }

    pub fn is_fully_completed(&self) -> bool {
        self.completed >= self.total
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TeacherPortal {
    pub teacher_name: String,
    pub classes: Vec<ClassSummary>,
    pub students: Vec<StudentRecord>,
    pub assignments: Vec<Assignment>,
}

impl TeacherPortal {
    pub fn load() -> Self {
        let file = DATA_DIR
            .get_file("teacher.json")
            .expect("teacher data not embedded");
        let contents = file
            .contents_utf8()
            .expect("teacher data is not valid utf-8");
        from_str(contents).expect("teacher data failed to deserialize")
    }

    pub fn total_students(&self) -> u32 {
        self.classes.iter().map(|c| c.students).sum()
    }

    /// Mean of the per-class averages, rounded for display.
    pub fn overall_avg_score(&self) -> u32 {
        let scores: Vec<f64> = self.classes.iter().map(|c| c.avg_score as f64).collect();
        mean(&scores).map(|m| m.round() as u32).unwrap_or(0)
    }

    /// Students ranked best-first by average score, ties broken by quiz count.
    pub fn ranked_students(&self) -> Vec<&StudentRecord> {
        self.students
            .iter()
            .sorted_by_key(|s| (std::cmp::Reverse(s.avg_score), std::cmp::Reverse(s.quizzes)))
            .collect()
    }
}
