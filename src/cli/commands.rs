use crate::cache::RecipeCache;
use crate::config::Settings;
use crate::matching::{RecipeMatcher, ScoreBreakdown};
use crate::recipe::{render, RenderedRecipe, Segmenter};
use crate::store::{source_from_config, SupabaseSource, TableReport};
use crate::utils::sanitize::truncate;
use crate::Result;

/// Tables of the blog's Supabase project
pub const DEFAULT_TABLES: &[&str] = &[
    "recipes_raw_view",
    "recipes_enriched_with_tags_new",
    "substitutions_clean",
    "nutrition_lookup_v2",
    "vegan_lookup_full",
    "units_densities_lookup_v2",
    "shopping_list_meal_prep_with_recipes",
    "master_list_items",
    "pricebook_master",
];

/// Load the configured store and look a query up locally
pub async fn match_query(settings: &Settings, query: &str, explain: bool) -> Result<()> {
    let source = source_from_config(&settings.store)?;
    let cache = RecipeCache::new();
    let loaded = cache.refresh(source.as_ref()).await?;
    println!("Loaded {loaded} recipes from {}", source.name());

    let matcher = RecipeMatcher::new(
        settings.matcher.threshold,
        &settings.matcher.featured_keywords,
    );
    let snapshot = cache.snapshot();

    match matcher.find_best_match(query, &snapshot.recipes) {
        Some(found) => {
            println!(
                "✓ Match: {} (score {:.3}, record #{})",
                found.recipe.title, found.score, found.index
            );
            if explain {
                print_breakdown(&matcher.explain(query, &found.recipe.title));
            }

            let segmented = Segmenter::new().segment(&found.recipe.raw_text);
            print_recipe(&render(&segmented));
        }
        None => {
            println!(
                "✗ No recipe at or above threshold {:.2}",
                matcher.threshold()
            );
            if explain {
                let candidate = snapshot
                    .recipes
                    .iter()
                    .map(|recipe| (recipe, matcher.explain(query, &recipe.title)))
                    .reduce(|best, next| if next.1.total > best.1.total { next } else { best });
                if let Some((recipe, breakdown)) = candidate {
                    println!("  Best candidate: {}", recipe.title);
                    print_breakdown(&breakdown);
                }
            }
        }
    }

    Ok(())
}

/// Probe tables and print a one-line report per table
pub async fn tables(settings: &Settings, names: &[String]) -> Result<()> {
    let source = SupabaseSource::from_config(&settings.store)?;

    let names: Vec<String> = if names.is_empty() {
        DEFAULT_TABLES.iter().map(|name| name.to_string()).collect()
    } else {
        names.to_vec()
    };

    for name in &names {
        let report = source.probe_table(name).await;
        println!("{}", format_report(&report));
    }

    Ok(())
}

fn format_report(report: &TableReport) -> String {
    if let Some(error) = &report.error {
        return format!("✗ {}: {}", report.table, truncate(error, 160));
    }

    let rows = report
        .rows
        .map(|rows| rows.to_string())
        .unwrap_or_else(|| "?".to_string());
    let mut line = if report.columns.is_empty() {
        format!("✓ {}: {} rows", report.table, rows)
    } else {
        format!(
            "✓ {}: {} rows [{}]",
            report.table,
            rows,
            report.columns.join(", ")
        )
    };

    if let Some(sample) = &report.sample {
        line.push_str(&format!("\n  sample: {}", truncate(&sample.to_string(), 200)));
    }

    line
}

fn print_breakdown(breakdown: &ScoreBreakdown) {
    println!("  Base (Jaccard): {:.3}", breakdown.base);
    for bonus in &breakdown.bonuses {
        println!("  + {:<18} {:.2}", bonus.rule, bonus.bonus);
    }
    println!("  = {:.3}", breakdown.total);
}

fn print_recipe(recipe: &RenderedRecipe) {
    println!();
    if !recipe.title.is_empty() {
        println!("{}", recipe.title);
        println!();
    }

    println!("Ingredients:");
    for item in &recipe.ingredients {
        println!("  - {item}");
    }

    println!("Steps:");
    for (i, step) in recipe.steps.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }

    if !recipe.notes.is_empty() {
        println!("Notes:");
        for note in &recipe.notes {
            println!("  * {note}");
        }
    }
}
