// Router assembly for the three handler tiers
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{self, MediaBackend};
use crate::handlers::{elevated, protected, public};
use crate::middleware::auth::{jwt_auth_middleware, require_admin_middleware};

/// Build the application router: public routes, JWT-guarded routes, and the
/// admin tier, with CORS and request tracing over everything.
pub fn app() -> Router {
    let config = config::config();

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .nest("/api/admin", admin_routes())
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Locally stored images are served straight off disk
    if config.media.backend == MediaBackend::Local {
        router = router.nest_service(
            "/media",
            ServeDir::new(&config.media.local_root),
        );
    }

    router
}

fn public_routes() -> Router {
    use public::{auth, categories, products, status};

    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        // Token acquisition
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        // Storefront catalog reads
        .route("/api/products", get(products::list))
        .route("/api/products/:id", get(products::show))
        .route("/api/products/:id/images", get(products::images))
        .route("/api/products/:id/reviews", get(products::reviews))
        .route("/api/categories", get(categories::list))
        .route("/api/categories/:id", get(categories::show))
}

fn protected_routes() -> Router {
    use protected::{account, addresses, cart, checkout, orders, reviews};

    Router::new()
        // Account
        .route("/api/auth/whoami", get(account::whoami))
        .route("/api/auth/password", put(account::change_password))
        // Cart, addressed by product id
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        // Checkout and order history
        .route("/api/checkout", post(checkout::checkout))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/:id", get(orders::show))
        .route("/api/orders/:id/cancel", post(orders::cancel))
        // Address book
        .route("/api/addresses", get(addresses::list).post(addresses::create))
        .route(
            "/api/addresses/:id",
            put(addresses::update).delete(addresses::delete),
        )
        // Reviews live under the public product paths but need a user
        .route("/api/products/:id/reviews", post(reviews::create))
        .route(
            "/api/products/:id/reviews/:review_id",
            delete(reviews::delete),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router {
    use elevated::admin::{categories, images, inventory, orders, products, users};

    let media = &config::config().media;

    Router::new()
        // Products
        .route(
            "/products",
            get(products::product_list).post(products::product_create),
        )
        .route(
            "/products/:id",
            get(products::product_show)
                .put(products::product_update)
                .delete(products::product_delete),
        )
        .route("/products/:id/restore", post(products::product_restore))
        // Images. The upload route carries its own body limit so the media
        // pipeline's size check answers before the transport cuts off.
        .route(
            "/products/:id/images",
            post(images::upload).layer(DefaultBodyLimit::max(media.max_upload_bytes * 2)),
        )
        .route("/products/:id/images/reorder", put(images::reorder))
        .route("/products/:id/images/:image_id", delete(images::delete))
        .route(
            "/products/:id/images/:image_id/primary",
            put(images::set_primary),
        )
        // Categories
        .route("/categories", post(categories::create))
        .route(
            "/categories/:id",
            put(categories::update).delete(categories::delete),
        )
        .route("/categories/:id/restore", post(categories::restore))
        // Inventory
        .route("/inventory/low-stock", get(inventory::low_stock))
        .route("/inventory/:product_id", put(inventory::adjust))
        // Orders
        .route("/orders", get(orders::list))
        .route("/orders/:id", get(orders::show))
        .route("/orders/:id/status", put(orders::set_status))
        // Users
        .route("/users", get(users::list))
        .route("/users/:id/role", put(users::set_role))
        // Layers run bottom-up: the JWT check comes first, then the role gate
        .route_layer(middleware::from_fn(require_admin_middleware))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}
