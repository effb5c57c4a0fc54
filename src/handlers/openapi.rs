use utoipa::OpenApi;

use crate::handlers::{carts, collections, customers, orders, products, reviews};

#[derive(OpenApi)]
#[openapi(
    paths(
        carts::create_cart,
        carts::get_cart,
        carts::delete_cart,
        carts::list_cart_items,
        carts::add_cart_item,
        carts::update_cart_item,
        carts::remove_cart_item,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        orders::update_payment_status,
        orders::delete_order,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        reviews::list_reviews,
        reviews::get_review,
        reviews::create_review,
        reviews::update_review,
        reviews::delete_review,
        collections::list_collections,
        collections::get_collection,
        collections::create_collection,
        collections::update_collection,
        collections::delete_collection,
        customers::me,
        customers::update_me,
    ),
    components(schemas(
        carts::AddCartItemRequest,
        carts::UpdateCartItemRequest,
        carts::CartItemResponse,
        carts::CartResponse,
        orders::PlaceOrderRequest,
        orders::UpdatePaymentStatusRequest,
        orders::CustomerSummary,
        orders::OrderItemResponse,
        orders::OrderResponse,
        products::ProductSummary,
        products::ProductRequest,
        products::ProductResponse,
        reviews::ReviewRequest,
        reviews::ReviewResponse,
        collections::CollectionRequest,
        collections::CollectionResponse,
        customers::UpdateProfileRequest,
        customers::CustomerProfileResponse,
    )),
    tags(
        (name = "carts", description = "Shopping carts and their items"),
        (name = "orders", description = "Order placement and history"),
        (name = "products", description = "Catalog products"),
        (name = "collections", description = "Product collections"),
        (name = "reviews", description = "Product reviews"),
        (name = "customers", description = "Customer profile"),
    )
)]
pub struct ApiDoc;
