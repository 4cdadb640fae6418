/* main.rs
 *
 * Copyright 2024 Lorenzo Miglietta
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 *
 * SPDX-License-Identifier: GPL-3.0-or-later
 */

use std::rc::Rc;

use anyhow::Context;
use chrono::Utc;
use fitpro::backend::{Category, Exercise, Level, Table, to_row};
use fitpro::config::AppConfig;
use fitpro::fakers::{InMemoryBackend, InMemoryBackendBuilder};
use fitpro::flows::{
    AuthFlow, CompleteProfileForm, ExerciseFilter, ExerciseLibrary, ProfileFlow, home,
};
use fitpro::i18n::{Catalog, Locale, LocaleStore, SystemLocales, Translator};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Unable to load the configuration")?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("Invalid log filter")?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Starting Fit Pro");

    let catalog = Rc::new(Catalog::builtin().context("Unable to load the translations")?);
    for locale in Locale::ALL {
        let missing = catalog.missing_keys(locale);
        if !missing.is_empty() {
            debug!(%locale, count = missing.len(), ?missing, "Keys served from the fallback locale");
        }
    }
    let locale_store = LocaleStore::from_host(&SystemLocales, config.default_locale);
    let translator = Translator::new(catalog, locale_store);
    info!(locale = %translator.locale(), "Locale resolved");

    // No remote transport is wired in yet; run against the in-memory backend.
    let backend = demo_backend(&config)?;
    futures::executor::block_on(run(&config, &translator, &backend))
}

async fn run(
    config: &AppConfig,
    translator: &Translator,
    backend: &InMemoryBackend,
) -> anyhow::Result<()> {
    let backend = backend.backend();

    println!("{}", translator.text("welcome.title"));
    println!("{}", home::greeting_now(translator, None));

    let route = AuthFlow::new(backend.clone()).resolve_start_route().await;
    info!(?route, "Start route");

    let library = ExerciseLibrary::load(&backend).await?;
    println!("{}", translator.text("exercises.title"));
    for category in ExerciseFilter::category_choices() {
        let filter = ExerciseFilter {
            level: None,
            category,
        };
        println!(
            "  {}: {}",
            ExerciseFilter::category_label(category, translator),
            library.filtered(&filter).len()
        );
    }

    if let Some(raw) = std::env::args().nth(1) {
        let profile = ProfileFlow::from_config(backend.clone(), translator.clone(), config);
        let validator = profile.validator();
        println!("{}", CompleteProfileForm::birth_date_placeholder(translator));
        match validator.validate(&raw, translator.locale()) {
            Ok(date) => println!("{date}"),
            Err(e) => {
                warn!(input = %raw, error = %e, "Birth date rejected");
                let years = validator.max_age_years().to_string();
                println!("{}", translator.text_with(e.message_key(), &[("years", &years)]));
            }
        }
    }
    Ok(())
}

fn demo_backend(config: &AppConfig) -> anyhow::Result<InMemoryBackend> {
    let exercises = [
        ("the-hundred", "The Hundred", Level::Beginner, Category::Core),
        ("roll-up", "Roll Up", Level::Intermediate, Category::Core),
        ("teaser", "Teaser", Level::Advanced, Category::Core),
        ("swan-dive", "Swan Dive", Level::Intermediate, Category::Back),
        ("side-leg-series", "Side Leg Series", Level::Beginner, Category::Legs),
        ("arm-circles", "Arm Circles", Level::Beginner, Category::Arms),
        ("plank-series", "Plank Series", Level::Intermediate, Category::FullBody),
    ];

    let mut builder = InMemoryBackendBuilder::new();
    builder.base_url(&config.storage_url());
    for (id, title, level, category) in exercises {
        let exercise = Exercise {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            level,
            category,
            image_url: format!("{}/exercises/{id}.jpg", config.storage_url()),
            video_url: None,
            created_at: Utc::now(),
        };
        builder.row(Table::Exercises, to_row(Table::Exercises, &exercise)?);
    }
    Ok(builder.build())
}
