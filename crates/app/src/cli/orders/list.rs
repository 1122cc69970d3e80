use clap::Args;
use serde_json::json;
use storefront_app::{
    context::AppContext,
    domain::{
        customers::records::CustomerUuid,
        orders::{
            data::{DEFAULT_PAGE_LIMIT, OrderFilter},
            status::OrderStatus,
        },
    },
};

#[derive(Debug, Args)]
pub(crate) struct ListOrdersArgs {
    /// Only orders in this status
    #[arg(long)]
    status: Option<OrderStatus>,

    /// Only orders placed by this customer
    #[arg(long)]
    customer: Option<CustomerUuid>,

    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Orders per page
    #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    limit: u32,
}

pub(crate) async fn run(app: &AppContext, args: ListOrdersArgs) -> Result<(), String> {
    let page = app
        .orders
        .list_orders(OrderFilter {
            status: args.status,
            customer: args.customer,
            page: args.page,
            limit: args.limit,
        })
        .await
        .map_err(|error| format!("failed to list orders: {error}"))?;

    crate::cli::print_json(&json!({
        "orders": page.orders,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
        "total_pages": page.total_pages(),
    }))
}
