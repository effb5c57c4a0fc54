pub mod auth;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod openapi;
pub mod orders;
pub mod products;
pub mod reviews;

use std::sync::Arc;

use crate::application::cart_service::CartService;
use crate::application::catalog_service::CatalogService;
use crate::application::customer_service::CustomerService;
use crate::application::order_service::OrderService;
use crate::domain::ports::EventPublisher;
use crate::infrastructure::store::DieselStore;

/// Services shared by every worker, registered as `web::Data<AppState>`.
pub struct AppState {
    pub carts: CartService<DieselStore>,
    pub orders: OrderService<DieselStore, Arc<dyn EventPublisher>>,
    pub catalog: CatalogService<DieselStore>,
    pub customers: CustomerService<DieselStore>,
}

impl AppState {
    pub fn new(store: DieselStore, publisher: Arc<dyn EventPublisher>) -> Self {
        AppState {
            carts: CartService::new(store.clone()),
            orders: OrderService::new(store.clone(), publisher),
            catalog: CatalogService::new(store.clone()),
            customers: CustomerService::new(store),
        }
    }
}
