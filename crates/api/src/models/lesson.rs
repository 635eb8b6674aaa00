//! Course content views for the learn screen.
//!
//! The catalog (units and their lessons) is static content; progress is
//! per-user and merged in at request time.

use serde::Serialize;

use chirp_core::{LessonId, UnitId};

/// A lesson row as stored in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Lesson {
    pub id: LessonId,
    pub unit_id: UnitId,
    pub title: String,
    pub position: i32,
    /// XP awarded on completion.
    pub xp_reward: i32,
}

/// A unit row as stored in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Unit {
    pub id: UnitId,
    pub title: String,
    pub description: String,
    pub position: i32,
}

/// Per-user progress on one lesson.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub completed: bool,
    pub score: Option<i32>,
}

/// A lesson with the caller's progress merged in.
#[derive(Debug, Clone, Serialize)]
pub struct LessonView {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub completed: bool,
    pub score: Option<i32>,
}

/// A unit with its lessons and the caller's completion percentage.
#[derive(Debug, Clone, Serialize)]
pub struct UnitView {
    #[serde(flatten)]
    pub unit: Unit,
    pub lessons: Vec<LessonView>,
    /// Share of lessons completed, 0-100. Zero for anonymous callers.
    pub completion_percent: u8,
}

impl UnitView {
    /// Build a view from catalog lessons and the caller's progress rows.
    #[must_use]
    pub fn assemble(unit: Unit, lessons: Vec<Lesson>, progress: &[LessonProgress]) -> Self {
        let lessons: Vec<LessonView> = lessons
            .into_iter()
            .map(|lesson| {
                let row = progress.iter().find(|p| p.lesson_id == lesson.id);
                LessonView {
                    completed: row.is_some_and(|p| p.completed),
                    score: row.and_then(|p| p.score),
                    lesson,
                }
            })
            .collect();

        let completed = lessons.iter().filter(|l| l.completed).count();
        let completion_percent = if lessons.is_empty() {
            0
        } else {
            u8::try_from(completed * 100 / lessons.len()).unwrap_or(100)
        };

        Self {
            unit,
            lessons,
            completion_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Unit {
        Unit {
            id: UnitId::new(1),
            title: "Basics".to_owned(),
            description: "Greetings and introductions".to_owned(),
            position: 1,
        }
    }

    fn lesson(id: i32) -> Lesson {
        Lesson {
            id: LessonId::new(id),
            unit_id: UnitId::new(1),
            title: format!("Lesson {id}"),
            position: id,
            xp_reward: 10,
        }
    }

    #[test]
    fn test_assemble_merges_progress() {
        let progress = [LessonProgress {
            lesson_id: LessonId::new(1),
            completed: true,
            score: Some(95),
        }];
        let view = UnitView::assemble(unit(), vec![lesson(1), lesson(2)], &progress);

        assert_eq!(view.completion_percent, 50);
        assert!(view.lessons.first().is_some_and(|l| l.completed));
        assert_eq!(view.lessons.first().and_then(|l| l.score), Some(95));
        assert!(view.lessons.get(1).is_some_and(|l| !l.completed));
    }

    #[test]
    fn test_assemble_without_progress() {
        let view = UnitView::assemble(unit(), vec![lesson(1), lesson(2)], &[]);
        assert_eq!(view.completion_percent, 0);
        assert!(view.lessons.iter().all(|l| !l.completed));
    }

    #[test]
    fn test_assemble_empty_unit() {
        let view = UnitView::assemble(unit(), vec![], &[]);
        assert_eq!(view.completion_percent, 0);
    }
}
