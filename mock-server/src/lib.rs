use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub date: String,
    pub title: String,
    pub read_time: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub date: String,
    pub title: String,
    pub read_time: String,
}

impl PostInput {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("date", &self.date),
            ("title", &self.title),
            ("readTime", &self.read_time),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Posts in insertion order; ids are sequential decimal strings from "1".
#[derive(Debug, Default)]
pub struct Posts {
    items: Vec<Post>,
    last_id: u64,
}

impl Posts {
    pub fn items(&self) -> &[Post] {
        &self.items
    }

    /// Append a post with the next id. Does not check for blank fields.
    pub fn insert(&mut self, input: PostInput) -> Post {
        self.last_id += 1;
        let stamp = now();
        let post = Post {
            id: self.last_id.to_string(),
            date: input.date,
            title: input.title,
            read_time: input.read_time,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        self.items.push(post.clone());
        post
    }
}

pub type Db = Arc<RwLock<Posts>>;

pub enum ApiError {
    NotFound,
    MissingFields(Vec<&'static str>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "post not found" }))).into_response()
            }
            ApiError::MissingFields(fields) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("required fields are empty: {}", fields.join(", ")) })),
            )
                .into_response(),
        }
    }
}

pub fn app() -> Router {
    router(Db::default())
}

/// Router over an existing store, so tests can seed or inspect it.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", put(update_post).delete(delete_post))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    Json(db.read().await.items.clone())
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<PostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let missing = input.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }
    let post = db.write().await.insert(input);
    info!(id = %post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<PostInput>,
) -> Result<Json<Post>, ApiError> {
    let missing = input.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }
    let mut posts = db.write().await;
    let post = posts
        .items
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(ApiError::NotFound)?;
    post.date = input.date;
    post.title = input.title;
    post.read_time = input.read_time;
    post.updated_at = now();
    info!(%id, "post updated");
    Ok(Json(post.clone()))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut posts = db.write().await;
    let index = posts
        .items
        .iter()
        .position(|p| p.id == id)
        .ok_or(ApiError::NotFound)?;
    posts.items.remove(index);
    info!(%id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
