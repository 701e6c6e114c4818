//! Dashboard home route handlers.
//!
//! Admins get store-wide statistics with switchable chart periods; users get
//! their profile and order counts.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tracing::instrument;

use grips_gears_core::Price;

use crate::api::{AdminStats, ApiError, UserHomeStats};
use crate::charts::svg::{self, Datum};
use crate::charts::{self, Period, SeriesPoint};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, RequireUser};
use crate::state::AppState;

const REVENUE_STROKE: &str = "#8884d8";
const ORDERS_FILL: &str = "#82ca9d";
const TOP_PRODUCTS_FILL: &str = "#ff7f50";
const USER_ORDERS_STROKE: &str = "#00C49F";

// =============================================================================
// Query Types
// =============================================================================

/// Chart period selection. Unknown values fall back to monthly.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub revenue: Option<String>,
    pub orders: Option<String>,
}

impl ChartQuery {
    fn revenue_period(&self) -> Period {
        parse_period(self.revenue.as_deref())
    }

    fn orders_period(&self) -> Period {
        parse_period(self.orders.as_deref())
    }
}

fn parse_period(value: Option<&str>) -> Period {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

// =============================================================================
// Templates
// =============================================================================

/// A period switch link for one chart.
pub struct PeriodLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Admin home template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/admin_home.html")]
pub struct AdminHomeTemplate {
    pub page: PageContext,
    pub stats: AdminStats,
    pub revenue_links: Vec<PeriodLink>,
    pub orders_links: Vec<PeriodLink>,
    pub revenue_chart: String,
    pub orders_chart: String,
    pub category_chart: String,
    pub top_products_chart: String,
    pub error: Option<String>,
}

/// User home template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/user_home.html")]
pub struct UserHomeTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub role: String,
    pub total_orders: u64,
    pub completed_orders: u64,
    pub pending_orders: u64,
    pub orders_chart: String,
    pub error: Option<String>,
}

// =============================================================================
// Routes
// =============================================================================

/// Send the user to the home page for their role.
pub async fn index(RequireUser(user): RequireUser) -> Redirect {
    if user.is_admin() {
        Redirect::to("/dashboard/admin")
    } else {
        Redirect::to("/dashboard/user")
    }
}

/// Display the admin home.
#[instrument(skip(state, page, admin), fields(email = %admin.email))]
pub async fn admin_home(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ChartQuery>,
    page: PageContext,
) -> Result<Response, AppError> {
    let (stats, error) = match state.api().admin_stats(admin.bearer()).await {
        Ok(stats) => (stats, None),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load admin stats");
            (
                AdminStats::default(),
                Some("Failed to load statistics. Please try again.".to_string()),
            )
        }
    };

    let revenue_period = query.revenue_period();
    let orders_period = query.orders_period();
    let revenue = charts::bucket(&stats.monthly_stats, revenue_period);
    let orders = charts::bucket(&stats.monthly_stats, orders_period);

    Ok(AdminHomeTemplate {
        revenue_links: period_links(revenue_period, |p| chart_href(p, orders_period)),
        orders_links: period_links(orders_period, |p| chart_href(revenue_period, p)),
        revenue_chart: svg::line_chart(
            &format!("{} Revenue", revenue_period.label()),
            &revenue_series(&revenue),
            REVENUE_STROKE,
        ),
        orders_chart: svg::bar_chart(
            &format!("{} Orders", orders_period.label()),
            &orders_series(&orders),
            ORDERS_FILL,
        ),
        category_chart: svg::pie_chart("Product Categories", &category_series(&stats)),
        top_products_chart: svg::horizontal_bar_chart(
            "Top Selling Products",
            &top_products_series(&stats),
            TOP_PRODUCTS_FILL,
        ),
        page,
        stats,
        error,
    }
    .into_response())
}

/// Display the user home.
#[instrument(skip(state, page, user), fields(email = %user.email))]
pub async fn user_home(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    page: PageContext,
) -> Result<Response, AppError> {
    let (stats, error) = match state.api().user_home_stats(user.bearer()).await {
        Ok(stats) => (stats, None),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load user stats");
            (
                UserHomeStats::default(),
                Some("Failed to load your statistics. Please try again.".to_string()),
            )
        }
    };

    let monthly: Vec<Datum> = charts::user_monthly_orders(&stats.monthly_orders)
        .into_iter()
        .map(|(label, count)| Datum::new(label, count_value(count)))
        .collect();

    Ok(UserHomeTemplate {
        name: stats
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.display_name().to_string()),
        email: stats.email.unwrap_or_else(|| user.email.clone()),
        role: stats
            .role
            .unwrap_or_else(|| user.role.as_str().to_string()),
        total_orders: stats.total_orders.unwrap_or(0),
        completed_orders: stats.completed_orders.unwrap_or(0),
        pending_orders: stats.pending_orders.unwrap_or(0),
        orders_chart: svg::line_chart("Monthly Orders", &monthly, USER_ORDERS_STROKE),
        page,
        error,
    }
    .into_response())
}

// =============================================================================
// Chart Series
// =============================================================================

fn period_links(active: Period, href: impl Fn(Period) -> String) -> Vec<PeriodLink> {
    Period::all()
        .into_iter()
        .map(|period| PeriodLink {
            label: period.label(),
            href: href(period),
            active: period == active,
        })
        .collect()
}

fn chart_href(revenue: Period, orders: Period) -> String {
    format!(
        "/dashboard/admin?revenue={}&orders={}",
        revenue.as_str(),
        orders.as_str()
    )
}

fn price_value(price: Price) -> f64 {
    price.amount().to_f64().unwrap_or(0.0)
}

#[allow(clippy::cast_precision_loss)]
const fn count_value(count: u64) -> f64 {
    count as f64
}

fn revenue_series(points: &[SeriesPoint]) -> Vec<Datum> {
    points
        .iter()
        .map(|p| Datum::new(p.label.clone(), price_value(p.revenue)))
        .collect()
}

fn orders_series(points: &[SeriesPoint]) -> Vec<Datum> {
    points
        .iter()
        .map(|p| Datum::new(p.label.clone(), count_value(p.orders)))
        .collect()
}

fn category_series(stats: &AdminStats) -> Vec<Datum> {
    stats
        .product_categories
        .iter()
        .map(|c| {
            Datum::new(
                c.category.clone().unwrap_or_else(|| "Uncategorized".to_string()),
                count_value(c.count),
            )
        })
        .collect()
}

fn top_products_series(stats: &AdminStats) -> Vec<Datum> {
    stats
        .top_selling_products
        .iter()
        .map(|p| Datum::new(p.name.clone(), count_value(p.total_sold)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_falls_back_to_monthly() {
        assert_eq!(parse_period(Some("quarterly")), Period::Quarterly);
        assert_eq!(parse_period(Some("weekly")), Period::Monthly);
        assert_eq!(parse_period(None), Period::Monthly);
    }

    #[test]
    fn test_period_links_keep_other_chart() {
        let links = period_links(Period::Yearly, |p| chart_href(p, Period::Quarterly));
        assert_eq!(links.len(), 3);
        assert!(links.iter().any(|l| l.active && l.label == "Yearly"));
        assert_eq!(
            links.first().map(|l| l.href.as_str()),
            Some("/dashboard/admin?revenue=monthly&orders=quarterly")
        );
    }

    #[test]
    fn test_price_value() {
        assert!((price_value(Price::from_taka(2500)) - 2500.0).abs() < f64::EPSILON);
    }
}
