// Interactive console over the recipe ranking engine.
// Run with: cargo run --bin recipe_console -- [config.json]
use crossterm::style::Stylize;
use recipe_core::core::types::{RankedRecipe, Review, TrendingMetric};
use recipe_core::{EngineConfig, RankingCoordinator};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "recipe_engine.json";

fn main() -> io::Result<()> {
    let level = match std::env::var("RECIPE_LOG").as_deref() {
        Ok("debug") => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let engine = match EngineConfig::load(&config_path).and_then(RankingCoordinator::from_config) {
        Ok(engine) => engine,
        Err(e) => {
            error!(config = %config_path.display(), "failed to start engine: {}", e);
            std::process::exit(1);
        }
    };
    info!("recipe engine ready");

    println!("{}", "Recipe Catalogue Console. Type 'help' for commands, 'exit' to quit.".bold());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt(&mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let (command, rest) = match line.trim().split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.trim(), ""),
        };

        let max = engine.config().max_suggestions;
        match command {
            "" => {}
            "exit" | "quit" => break,
            "help" => print_help(),
            "names" => print_list(&engine.autocomplete_names(rest, max)),
            "ingredients" => print_list(&engine.autocomplete_ingredients(rest, max)),
            "import" => {
                let parts: Vec<&str> = rest.splitn(3, '|').map(str::trim).collect();
                match parts.as_slice() {
                    [name, ingredients, rest @ ..] => {
                        // One line per comma-separated ingredient.
                        let ingredients: Vec<&str> =
                            ingredients.split(',').map(str::trim).collect();
                        let ingredients = ingredients.join("\n");
                        let instructions = rest.first().copied().unwrap_or("");
                        match engine.index_recipe(name, &ingredients, instructions) {
                            Ok(()) => println!("{} {}", "Imported".green(), name),
                            Err(e) => print_error(&e),
                        }
                    }
                    _ => println!("{}", "usage: import <name>|<a, b, ...>|<steps>".yellow()),
                }
            }
            "review" => {
                let parts: Vec<&str> = rest.splitn(4, '|').map(str::trim).collect();
                let rating = parts.get(2).and_then(|r| r.parse::<f64>().ok());
                match (parts.first(), parts.get(1), rating) {
                    (Some(recipe), Some(user), Some(rating)) => {
                        let comment = parts.get(3).copied().unwrap_or("");
                        match engine.record_review(recipe, user, rating, comment) {
                            Ok(review) => {
                                println!("{} {}", "Saved:".green(), format_review(&review))
                            }
                            Err(e) => print_error(&e),
                        }
                    }
                    _ => {
                        println!("{}", "usage: review <recipe>|<user>|<rating>|<comment>".yellow())
                    }
                }
            }
            "reviews" => match engine.all_reviews(rest) {
                Ok(reviews) => {
                    for review in &reviews {
                        println!("  {}", format_review(review));
                    }
                    match engine.average_rating(rest) {
                        Ok(avg) => {
                            println!("  average: {:.2} over {} review(s)", avg, reviews.len())
                        }
                        Err(e) => print_error(&e),
                    }
                }
                Err(e) => print_error(&e),
            },
            "top-reviews" => {
                let (recipe, limit) = split_trailing_limit(rest, engine.config().default_limit);
                for review in engine.top_reviews(recipe, limit) {
                    println!("  {}", format_review(&review));
                }
            }
            "view" => match engine.record_view(rest) {
                Ok(count) => println!("{} {} ({} views)", "Viewed".green(), rest, count),
                Err(e) => print_error(&e),
            },
            "top-rated" => {
                let limit = rest.parse().unwrap_or(engine.config().default_limit);
                match engine.top_rated(limit) {
                    Ok(ranked) => print_ranked(&ranked),
                    Err(e) => print_error(&e),
                }
            }
            "trending" => {
                let mut args = rest.split_whitespace();
                let limit = args
                    .next()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(engine.config().default_limit);
                let metric = args
                    .next()
                    .and_then(|m| m.parse::<TrendingMetric>().ok())
                    .unwrap_or(engine.config().trending_metric);
                match engine.trending_by(metric, limit) {
                    Ok(ranked) => print_ranked(&ranked),
                    Err(e) => print_error(&e),
                }
            }
            "find" => {
                let (name_q, ingredient_q) = rest.split_once('|').unwrap_or((rest, ""));
                match engine.find_recipes(name_q, ingredient_q) {
                    Ok(found) if found.is_empty() => {
                        println!("{}", "No recipes found.".dark_grey())
                    }
                    Ok(found) => {
                        for recipe in found {
                            println!(
                                "  {} ({} ingredients, rating {:.2})",
                                recipe.name.as_str().bold(),
                                recipe.ingredients.len(),
                                recipe.average_rating
                            );
                        }
                    }
                    Err(e) => print_error(&e),
                }
            }
            other => println!("{} '{}'. Type 'help'.", "Unknown command".yellow(), other),
        }
        prompt(&mut stdout)?;
    }

    info!("recipe console shutting down");
    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> io::Result<()> {
    print!("\n> ");
    stdout.flush()
}

/// Splits `"Wild Rice Soup 3"` into the recipe name and a trailing number.
fn split_trailing_limit(rest: &str, default: usize) -> (&str, usize) {
    match rest.rsplit_once(' ') {
        Some((name, n)) => match n.parse() {
            Ok(limit) => (name.trim(), limit),
            Err(_) => (rest, default),
        },
        None => (rest, default),
    }
}

fn format_review(review: &Review) -> String {
    format!("{} rated {:.1}: {}", review.username, review.rating, review.comment)
}

fn print_list(items: &[String]) {
    if items.is_empty() {
        println!("{}", "No suggestions found.".dark_grey());
        return;
    }
    for (i, item) in items.iter().enumerate() {
        println!("  :{}: {}", i + 1, item);
    }
}

fn print_ranked(ranked: &[RankedRecipe]) {
    if ranked.is_empty() {
        println!("{}", "Nothing ranked yet.".dark_grey());
        return;
    }
    for (i, entry) in ranked.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, entry.name.as_str().bold(), entry.metric);
    }
}

fn print_error(e: &recipe_core::EngineError) {
    println!("{} {}", "Error:".red(), e);
}

fn print_help() {
    println!("  names <prefix>                          autocomplete recipe names");
    println!("  ingredients <prefix>                    autocomplete ingredients");
    println!("  import <name>|<ingredients>|<steps>     add a recipe to the catalogue");
    println!("  review <recipe>|<user>|<rating>|<text>  add a review (rating 1-5)");
    println!("  reviews <recipe>                        list reviews and the average");
    println!("  top-reviews <recipe> [n]                best reviews of a recipe");
    println!("  view <recipe>                           record a view");
    println!("  top-rated [n]                           best average ratings");
    println!("  trending [n] [views|rating]             most popular recipes");
    println!("  find <name>|<ingredient>                filter the catalogue");
    println!("  exit                                    quit");
}
