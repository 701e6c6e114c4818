//! Dashboard statistics on the command line.

use grips_gears_storefront::charts::{self, Period};

use super::{CommandError, api_client};

/// Print revenue and order counts bucketed by `period`.
///
/// # Errors
///
/// Fails when no token can be issued for `email` or the stats request fails.
pub async fn print(period: Period, email: &str) -> Result<(), CommandError> {
    let api = api_client()?;
    let token = api.issue_token(email).await?;

    if !api.is_admin(email, &token).await? {
        tracing::warn!(%email, "Not an admin; the stats request will likely be refused");
    }

    let stats = api.admin_stats(&token).await?;
    let points = charts::bucket(&stats.monthly_stats, period);

    print_table(period, &points);
    print_totals(&stats);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_table(period: Period, points: &[charts::SeriesPoint]) {
    println!("{:<12} {:>14} {:>8}", period.label(), "Revenue", "Orders");
    for point in points {
        println!(
            "{:<12} {:>14} {:>8}",
            point.label,
            point.revenue.display(),
            point.orders
        );
    }
}

#[allow(clippy::print_stdout)]
fn print_totals(stats: &grips_gears_storefront::api::AdminStats) {
    println!();
    println!("Total revenue:   {}", stats.total_revenue.display());
    println!("Total orders:    {}", stats.total_orders);
    println!("Total customers: {}", stats.total_customers);
    println!("Total products:  {}", stats.total_products);
}
