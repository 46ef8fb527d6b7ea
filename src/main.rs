use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use log::info;

mod auth;
mod cart;
mod catalog;
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod state;
mod store;
mod upload;
mod users;

use auth::TokenService;
use config::Config;
use middleware::AuthMiddleware;
use models::{Counter, Product};
use state::AppState;
use store::MongoUserStore;

async fn index() -> impl Responder {
    HttpResponse::Ok().body("E-commerce backend is running")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok(); // Load environment variables from .env file
    env_logger::init();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.upload_dir)?;

    let database = db::connect(&config).await;
    db::ensure_indexes(&database).await;

    let products: mongodb::Collection<Product> = database.collection("products");
    let counters: mongodb::Collection<Counter> = database.collection("counters");

    let tokens = TokenService::new(config.jwt_secret.clone(), config.token_ttl_hours);
    let state = AppState::new(
        Arc::new(MongoUserStore::new(database.collection("users"))),
        tokens.clone(),
    );

    info!("server running on port {}", config.port);
    let bind_addr = ("0.0.0.0", config.port);
    let app_config = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(products.clone()))
            .app_data(web::Data::new(counters.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .route("/", web::get().to(index))
            .route("/signup", web::post().to(users::signup))
            .route("/login", web::post().to(users::login))
            .route("/addproduct", web::post().to(catalog::add_product))
            .route("/removeproduct", web::post().to(catalog::remove_product))
            .route("/allproducts", web::get().to(catalog::all_products))
            .route("/newcollections", web::get().to(catalog::new_collections))
            .route("/popularinwomen", web::get().to(catalog::popular_in_women))
            .route("/upload", web::post().to(upload::upload_image))
            .service(Files::new("/images", app_config.upload_dir.clone()))
            .service(
                web::scope("")
                    .wrap(AuthMiddleware::new(tokens.clone()))
                    .route("/addtocart", web::post().to(cart::add_to_cart))
                    .route("/removefromcart", web::post().to(cart::remove_from_cart))
                    .route("/getcart", web::post().to(cart::get_cart)),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
