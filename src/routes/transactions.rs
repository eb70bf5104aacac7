use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

use crate::config::Environment;
use crate::guards::AdminGuard;
use crate::routes::{ok, today, ApiResult};
use crate::services::transactions::{TransactionFilters, TransactionsView};
use crate::services::{Dashboard, Desks};
use crate::utils::{ApiError, CsvFile};

/// Current transactions screen. The first visit loads page 1.
#[openapi(tag = "Transactions")]
#[get("/transactions")]
pub async fn get_transactions(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<TransactionsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.transactions.lock().await;
    screen.ensure_loaded(dashboard).await?;
    ok(screen.view())
}

#[openapi(tag = "Transactions")]
#[post("/transactions/search", data = "<filters>")]
pub async fn search_transactions(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    filters: Json<TransactionFilters>,
) -> ApiResult<TransactionsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.transactions.lock().await;
    screen.search(dashboard, filters.into_inner()).await?;
    ok(screen.view())
}

#[openapi(tag = "Transactions")]
#[post("/transactions/refresh")]
pub async fn refresh_transactions(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<TransactionsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.transactions.lock().await;
    screen.refresh(dashboard).await?;
    ok(screen.view())
}

#[openapi(tag = "Transactions")]
#[post("/transactions/page/<page>")]
pub async fn change_transactions_page(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    page: u64,
) -> ApiResult<TransactionsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.transactions.lock().await;
    screen.change_page(dashboard, page).await?;
    ok(screen.view())
}

#[openapi(tag = "Transactions")]
#[post("/transactions/clear")]
pub async fn clear_transaction_filters(
    desks: &State<Desks>,
    admin: AdminGuard,
) -> ApiResult<TransactionsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.transactions.lock().await;
    screen.clear_filters();
    ok(screen.view())
}

#[openapi(tag = "Transactions")]
#[post("/transactions/environment?<environment>")]
pub async fn switch_transactions_environment(
    dashboard: &State<Dashboard>,
    desks: &State<Desks>,
    admin: AdminGuard,
    environment: Environment,
) -> ApiResult<TransactionsView> {
    let desk = desks.open(&admin.admin_id);
    let mut screen = desk.transactions.lock().await;
    screen.switch_environment(dashboard, environment).await?;
    ok(screen.view())
}

/// CSV of the transactions currently on screen.
#[openapi(tag = "Transactions")]
#[get("/transactions/export")]
pub async fn export_transactions(desks: &State<Desks>, admin: AdminGuard) -> Result<CsvFile, ApiError> {
    let desk = desks.open(&admin.admin_id);
    let screen = desk.transactions.lock().await;
    Ok(screen.export(today())?)
}
