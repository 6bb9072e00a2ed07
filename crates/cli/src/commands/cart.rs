//! Cart commands.

use std::io::Write;

use foody_client::{ClientError, FoodyClient};
use foody_core::RestaurantId;
use futures::future::join_all;

use super::CliError;

/// Add restaurants to the cart concurrently.
///
/// Repeated ids are suppressed by the membership set. Every add is
/// reported; the first failure becomes the command's error.
pub async fn add(
    client: &FoodyClient,
    out: &mut impl Write,
    ids: Vec<RestaurantId>,
) -> Result<(), CliError> {
    let cart = client.cart();
    let results = join_all(ids.iter().cloned().map(|id| cart.add(id))).await;

    let mut first_error = None;
    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(outcome) if outcome.is_suppressed() => writeln!(out, "{id}: already in cart")?,
            Ok(_) => writeln!(out, "{id}: added")?,
            Err(e) => {
                writeln!(out, "{id}: failed ({})", e.user_message())?;
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(ClientError::from(e).into()),
        None => Ok(()),
    }
}
