use tracing::debug;

use super::FlowError;
use crate::backend::{Backend, Category, Exercise, Level, Table};
use crate::i18n::Translator;

/// Level and category chips on the library screen. `None` is the "All" chip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub level: Option<Level>,
    pub category: Option<Category>,
}

impl ExerciseFilter {
    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.level.is_none_or(|level| exercise.level == level)
            && self.category.is_none_or(|category| exercise.category == category)
    }

    pub fn level_label(level: Option<Level>, translator: &Translator) -> String {
        translator.text(level.map_or("exercises.levels.all", |level| level.label_key()))
    }

    pub fn category_label(category: Option<Category>, translator: &Translator) -> String {
        translator.text(category.map_or("exercises.categories.all", |category| {
            category.label_key()
        }))
    }

    /// Chip choices in display order, "All" first.
    pub fn level_choices() -> impl Iterator<Item = Option<Level>> {
        std::iter::once(None).chain(Level::ALL.into_iter().map(Some))
    }

    pub fn category_choices() -> impl Iterator<Item = Option<Category>> {
        std::iter::once(None).chain(Category::ALL.into_iter().map(Some))
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExerciseLibrary {
    exercises: Vec<Exercise>,
}

impl ExerciseLibrary {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    pub async fn load(backend: &Backend) -> Result<Self, FlowError> {
        let exercises: Vec<Exercise> = backend.fetch_all(Table::Exercises).await?;
        debug!(count = exercises.len(), "Exercises loaded");
        Ok(Self::new(exercises))
    }

    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn filtered(&self, filter: &ExerciseFilter) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|exercise| filter.matches(exercise))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::to_row;
    use crate::fakers::{InMemoryBackendBuilder, Operation};
    use crate::i18n::{Catalog, Locale, LocaleStore};
    use chrono::Utc;
    use serde_json::json;
    use smol::block_on;
    use std::rc::Rc;

    fn exercise(id: &str, level: Level, category: Category) -> Exercise {
        Exercise {
            id: id.to_string(),
            title: format!("Exercise {id}"),
            description: String::new(),
            level,
            category,
            image_url: format!("https://img.test/{id}.jpg"),
            video_url: None,
            created_at: Utc::now(),
        }
    }

    fn library() -> ExerciseLibrary {
        ExerciseLibrary::new(vec![
            exercise("hundred", Level::Beginner, Category::Core),
            exercise("teaser", Level::Advanced, Category::Core),
            exercise("swan", Level::Intermediate, Category::Back),
            exercise("plank", Level::Beginner, Category::FullBody),
        ])
    }

    fn ids(exercises: Vec<&Exercise>) -> Vec<&str> {
        exercises.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn default_filter_shows_everything() {
        assert_eq!(library().filtered(&ExerciseFilter::default()).len(), 4);
    }

    #[test]
    fn level_and_category_combine() {
        let library = library();
        let filter = ExerciseFilter {
            level: Some(Level::Beginner),
            category: None,
        };
        assert_eq!(ids(library.filtered(&filter)), ["hundred", "plank"]);

        let filter = ExerciseFilter {
            level: Some(Level::Beginner),
            category: Some(Category::Core),
        };
        assert_eq!(ids(library.filtered(&filter)), ["hundred"]);

        let filter = ExerciseFilter {
            level: Some(Level::Advanced),
            category: Some(Category::Back),
        };
        assert!(library.filtered(&filter).is_empty());
    }

    #[test]
    fn chip_labels_are_translated() {
        let t = Translator::new(Rc::new(Catalog::builtin().unwrap()), LocaleStore::new(Locale::En));
        let labels: Vec<String> = ExerciseFilter::category_choices()
            .map(|category| ExerciseFilter::category_label(category, &t))
            .collect();
        assert_eq!(labels, ["All", "Core", "Arms", "Legs", "Back", "Full Body"]);
        assert_eq!(ExerciseFilter::level_choices().count(), 4);
        assert_eq!(ExerciseFilter::level_label(Some(Level::Advanced), &t), "Advanced");
    }

    #[test]
    fn load_reads_the_exercises_table() {
        let row = to_row(
            Table::Exercises,
            &exercise("swan", Level::Intermediate, Category::Back),
        )
        .unwrap();
        let fake = InMemoryBackendBuilder::new()
            .row(Table::Exercises, row)
            .build();
        let library = block_on(ExerciseLibrary::load(&fake.backend())).unwrap();
        assert_eq!(library.all().len(), 1);
        assert_eq!(library.all()[0].category, Category::Back);
    }

    #[test]
    fn category_column_uses_display_names() {
        let mut row = to_row(
            Table::Exercises,
            &exercise("plank", Level::Beginner, Category::Core),
        )
        .unwrap();
        row.insert("category".into(), json!("Full Body"));
        let fake = InMemoryBackendBuilder::new()
            .row(Table::Exercises, row)
            .build();
        let library = block_on(ExerciseLibrary::load(&fake.backend())).unwrap();
        assert_eq!(library.all()[0].category, Category::FullBody);
    }

    #[test]
    fn load_failure_is_reported() {
        let fake = InMemoryBackendBuilder::new().fail(Operation::SelectAll).build();
        assert!(block_on(ExerciseLibrary::load(&fake.backend())).is_err());
    }
}
