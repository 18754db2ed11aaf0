//! Lesson and problem catalog lookups.
//!
//! Only the host reads this: it uses a record's `current_difficulty` to pick
//! which problems to offer next.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{MasteryError, MasteryResult};
use crate::types::{Difficulty, ProgressRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_id: String,
    #[serde(default)]
    pub title: String,
    /// Eligible problem ids per difficulty tier
    #[serde(default)]
    pub problems: BTreeMap<Difficulty, Vec<String>>,
    #[serde(default)]
    pub next_lesson_id: Option<String>,
}

impl Lesson {
    pub fn problem_pool(&self, difficulty: Difficulty) -> &[String] {
        self.problems
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: String,
    pub lesson_id: String,
    /// Answer options in the order they must be chosen
    pub correct_options: Vec<String>,
    #[serde(default)]
    pub distractors: Vec<Distractor>,
}

impl Problem {
    pub fn distractor(&self, option_id: &str) -> Option<&Distractor> {
        self.distractors.iter().find(|d| d.option_id == option_id)
    }
}

/// A deliberately wrong answer option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distractor {
    pub option_id: String,
    #[serde(default)]
    pub content: String,
    /// Why the option is wrong, used as the misconception type
    #[serde(default)]
    pub reason: Option<String>,
}

pub trait ContentStore: Send + Sync {
    fn lesson(&self, lesson_id: &str) -> Option<Lesson>;

    fn problem(&self, problem_id: &str) -> Option<Problem>;
}

/// Catalog file layout: `{"lessons": [...], "problems": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Catalog {
    #[serde(default)]
    lessons: Vec<Lesson>,
    #[serde(default)]
    problems: Vec<Problem>,
}

#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    lessons: HashMap<String, Lesson>,
    problems: HashMap<String, Problem>,
}

impl InMemoryContentStore {
    pub fn new(lessons: Vec<Lesson>, problems: Vec<Problem>) -> Self {
        Self {
            lessons: lessons
                .into_iter()
                .map(|l| (l.lesson_id.clone(), l))
                .collect(),
            problems: problems
                .into_iter()
                .map(|p| (p.problem_id.clone(), p))
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> MasteryResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(Self::new(catalog.lessons, catalog.problems))
    }
}

impl ContentStore for InMemoryContentStore {
    fn lesson(&self, lesson_id: &str) -> Option<Lesson> {
        self.lessons.get(lesson_id).cloned()
    }

    fn problem(&self, problem_id: &str) -> Option<Problem> {
        self.problems.get(problem_id).cloned()
    }
}

/// Problem ids the learner should be offered next for `lesson_id`.
pub fn problem_pool(
    content: &dyn ContentStore,
    record: &ProgressRecord,
    lesson_id: &str,
) -> MasteryResult<Vec<String>> {
    let lesson = content
        .lesson(lesson_id)
        .ok_or_else(|| MasteryError::NotFound(format!("lesson {lesson_id}")))?;
    Ok(lesson.problem_pool(record.current_difficulty).to_vec())
}
