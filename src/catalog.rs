use actix_web::{web, HttpResponse};
use chrono::Utc;
use futures::stream::StreamExt;
use log::info;
use mongodb::bson::doc;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Collection;
use serde_json::json;

use crate::error::ApiError;
use crate::models::{AddProductInput, Counter, Product, RemoveProductInput};

/// Allocates the next product id from an upserting atomic counter, so two
/// concurrent adds can never be handed the same id.
async fn next_id(counters: &Collection<Counter>, seq_name: &str) -> Result<i64, ApiError> {
    let options = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();

    let counter = counters
        .find_one_and_update(doc! { "_id": seq_name }, doc! { "$inc": { "seq": 1 } }, options)
        .await?
        .ok_or_else(|| {
            ApiError::Database(mongodb::error::Error::custom(
                "failed to generate sequence value",
            ))
        })?;

    Ok(counter.seq)
}

pub async fn add_product(
    products: web::Data<Collection<Product>>,
    counters: web::Data<Collection<Counter>>,
    input: web::Json<AddProductInput>,
) -> Result<HttpResponse, ApiError> {
    let product = Product {
        id: next_id(&counters, "product").await?,
        name: input.name.clone(),
        image: input.image.clone(),
        category: input.category.clone(),
        new_price: input.new_price,
        old_price: input.old_price,
        date: Utc::now(),
        available: true,
    };

    products.insert_one(&product, None).await?;
    info!("added product {} ({})", product.id, product.name);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "name": product.name })))
}

pub async fn remove_product(
    products: web::Data<Collection<Product>>,
    input: web::Json<RemoveProductInput>,
) -> Result<HttpResponse, ApiError> {
    products.delete_one(doc! { "id": input.id }, None).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

async fn collect(
    products: &Collection<Product>,
    filter: mongodb::bson::Document,
) -> Result<Vec<Product>, ApiError> {
    let mut cursor = products.find(filter, None).await?;
    let mut all = vec![];
    while let Some(result) = cursor.next().await {
        all.push(result?);
    }
    Ok(all)
}

pub async fn all_products(
    products: web::Data<Collection<Product>>,
) -> Result<HttpResponse, ApiError> {
    let all = collect(&products, doc! {}).await?;
    Ok(HttpResponse::Ok().json(all))
}

/// The eight most recently added products.
pub async fn new_collections(
    products: web::Data<Collection<Product>>,
) -> Result<HttpResponse, ApiError> {
    let all = collect(&products, doc! {}).await?;
    let start = all.len().saturating_sub(8);
    Ok(HttpResponse::Ok().json(&all[start..]))
}

/// The first four products in the "women" category.
pub async fn popular_in_women(
    products: web::Data<Collection<Product>>,
) -> Result<HttpResponse, ApiError> {
    let mut popular = collect(&products, doc! { "category": "women" }).await?;
    popular.truncate(4);
    Ok(HttpResponse::Ok().json(popular))
}
