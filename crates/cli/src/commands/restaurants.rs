//! Restaurant listing command.

use std::io::Write;

use foody_client::state::FiltersAction;
use foody_client::{ClientError, FoodyClient};
use foody_core::{Category, Restaurant, SortOption};

use super::CliError;

/// List restaurants for a category, optionally searched and sorted.
pub async fn list(
    client: &FoodyClient,
    out: &mut impl Write,
    category: Category,
    search: Option<String>,
    sort: Option<SortOption>,
) -> Result<(), CliError> {
    let store = client.store();
    store
        .dispatch_filters(FiltersAction::SetCategory(category))
        .await;
    store
        .dispatch_filters(FiltersAction::SetSearch(search.unwrap_or_default()))
        .await;
    store.dispatch_filters(FiltersAction::SetSort(sort)).await;

    let filters = store.filters().await;
    let restaurants = client
        .catalog()
        .browse(&filters)
        .await
        .map_err(ClientError::from)?;

    writeln!(out, "{}", category.label())?;
    if restaurants.is_empty() {
        if filters.search.trim().is_empty() {
            writeln!(out, "No restaurants found.")?;
        } else {
            writeln!(out, "No restaurants match \"{}\".", filters.search.trim())?;
        }
        return Ok(());
    }

    for restaurant in &restaurants {
        writeln!(out, "{}", format_row(restaurant))?;
    }
    Ok(())
}

/// One listing line: id, name, rating, location, distance.
fn format_row(restaurant: &Restaurant) -> String {
    let id = restaurant
        .id
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string);
    let rating = restaurant
        .rating
        .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"));

    let mut row = format!(
        "{id:>6}  {name:<30}  * {rating:<4}",
        name = restaurant.name_or_empty()
    );
    if let Some(city) = &restaurant.city {
        row.push_str("  ");
        row.push_str(city);
    }
    if let Some(distance) = restaurant.distance_km {
        row.push_str(&format!(" ({distance:.1} km)"));
    }
    row
}
