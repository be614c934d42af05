//! JSON-over-HTTP surface.
//!
//! There is no session handling here: the acting user is named explicitly in
//! the request body or path. Validation failures are `200 {"ok": false}`,
//! store failures are `500 {"error": ...}`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::services::{
    FriendGraphService, FriendSuggestionService, GraphError, NotificationService, PostService,
    Suggestion, TimelineAssembler, TimelineError, UserSearchService,
};
use crate::store::{RowStore, StoreError};
use crate::types::{
    Comment, CommentId, LikeToggle, Notification, NotificationId, PostId, PostRecord, SearchUser,
    UserId,
};

const DEFAULT_NOTIFICATION_LIMIT: usize = 50;

/// Shared handler state. One instance per process.
pub struct AppState<S> {
    pub graph: Arc<FriendGraphService<S>>,
    pub timeline: Arc<TimelineAssembler<S>>,
    pub search: Arc<UserSearchService<S>>,
    pub suggestions: Arc<FriendSuggestionService<S>>,
    pub posts: Arc<PostService<S>>,
    pub notifications: NotificationService<S>,
    pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            timeline: Arc::clone(&self.timeline),
            search: Arc::clone(&self.search),
            suggestions: Arc::clone(&self.suggestions),
            posts: Arc::clone(&self.posts),
            notifications: self.notifications.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: RowStore> AppState<S> {
    /// Wire every service to `store`. Builds the user search index.
    pub fn new(store: Arc<S>, config: ServerConfig) -> Result<Self, GraphError> {
        let graph = Arc::new(FriendGraphService::new(Arc::clone(&store)));
        Ok(Self {
            timeline: Arc::new(TimelineAssembler::new(Arc::clone(&graph), config.timeline)),
            search: Arc::new(UserSearchService::new(Arc::clone(&store))?),
            suggestions: Arc::new(FriendSuggestionService::new(Arc::clone(&store))),
            posts: Arc::new(PostService::new(Arc::clone(&store))),
            notifications: NotificationService::new(store),
            graph,
            config: Arc::new(config),
        })
    }
}

/// Error returned by handlers when a collaborator fails.
#[derive(Debug)]
pub enum ApiError {
    Graph(GraphError),
    Timeline(TimelineError),
    Store(StoreError),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Graph(e) => write!(f, "{e}"),
            Self::Timeline(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl From<GraphError> for ApiError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

impl From<TimelineError> for ApiError {
    fn from(e: TimelineError) -> Self {
        Self::Timeline(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {self}");
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Body of every friend-edge mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeRequest {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OkResponse {
    pub ok: bool,
}

/// Result of a create call: `ok` is `false` and `id` absent when refused.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedResponse<I> {
    pub ok: bool,
    pub id: Option<I>,
}

impl<I> From<Option<I>> for CreatedResponse<I> {
    fn from(id: Option<I>) -> Self {
        Self {
            ok: id.is_some(),
            id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeResponse {
    pub ok: bool,
    pub liked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Body of post and comment creation.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentRequest {
    pub author: String,
    pub content: String,
}

/// Names the acting user for like calls.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub prefix: String,
    pub viewer: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<usize>,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the router over `state`.
pub fn router<S: RowStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/friends/request", post(send_request::<S>))
        .route("/friends/accept", post(accept_request::<S>))
        .route("/friends/reject", post(reject_request::<S>))
        .route("/friends/cancel", post(cancel_request::<S>))
        .route("/friends/remove", post(remove_friend::<S>))
        .route("/friends/{username}", get(list_friends::<S>))
        .route("/friends/{username}/requests", get(pending_requests::<S>))
        .route("/friends/{username}/suggestions", get(suggestions::<S>))
        .route("/friends/{username}/mutual/{other}", get(mutual_friends::<S>))
        .route("/timeline/{username}", get(timeline::<S>))
        .route("/search", get(search::<S>))
        .route("/search/refresh", post(refresh_search::<S>))
        .route("/users", post(register::<S>))
        .route("/posts", post(create_post::<S>))
        .route("/posts/{id}", get(get_post::<S>))
        .route("/posts/{id}/like", post(toggle_like::<S>).get(like_status::<S>))
        .route(
            "/posts/{id}/comments",
            post(add_comment::<S>).get(list_comments::<S>),
        )
        .route("/users/{username}/notifications", get(notifications::<S>))
        .route(
            "/users/{username}/notifications/unread",
            get(unread_count::<S>),
        )
        .route(
            "/users/{username}/notifications/read",
            post(mark_all_notifications_read::<S>),
        )
        .route("/notifications/{id}", delete(delete_notification::<S>))
        .route("/notifications/{id}/read", post(mark_notification_read::<S>))
        .with_state(state)
}

pub async fn send_request<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(edge): Json<EdgeRequest>,
) -> ApiResult<OkResponse> {
    let ok = state.graph.send_request(&edge.from, &edge.to)?;
    Ok(Json(OkResponse { ok }))
}

pub async fn accept_request<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(edge): Json<EdgeRequest>,
) -> ApiResult<OkResponse> {
    let ok = state.graph.accept_request(&edge.from, &edge.to)?;
    Ok(Json(OkResponse { ok }))
}

pub async fn reject_request<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(edge): Json<EdgeRequest>,
) -> ApiResult<OkResponse> {
    let ok = state.graph.reject_request(&edge.from, &edge.to)?;
    Ok(Json(OkResponse { ok }))
}

pub async fn cancel_request<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(edge): Json<EdgeRequest>,
) -> ApiResult<OkResponse> {
    let ok = state.graph.cancel_request(&edge.from, &edge.to)?;
    Ok(Json(OkResponse { ok }))
}

pub async fn remove_friend<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(edge): Json<EdgeRequest>,
) -> ApiResult<OkResponse> {
    let ok = state.graph.remove_friend(&edge.from, &edge.to)?;
    Ok(Json(OkResponse { ok }))
}

pub async fn list_friends<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.graph.get_friends(&username)?))
}

pub async fn pending_requests<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.graph.pending_requests(&username)?))
}

pub async fn suggestions<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<Suggestion>> {
    let limit = query.limit.unwrap_or(state.config.suggestion_default_limit);
    Ok(Json(state.suggestions.suggest(&username, limit)?))
}

pub async fn mutual_friends<S: RowStore>(
    State(state): State<AppState<S>>,
    Path((username, other)): Path<(String, String)>,
) -> ApiResult<Vec<String>> {
    Ok(Json(state.suggestions.mutual_friends(&username, &other)?))
}

pub async fn timeline<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<PostRecord>> {
    let limit = query.limit.unwrap_or(state.config.timeline_default_limit);
    Ok(Json(state.timeline.generate(&username, limit)?))
}

pub async fn search<S: RowStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<SearchUser>> {
    let limit = query.limit.unwrap_or(state.config.search_default_limit);
    Ok(Json(state.search.search(&query.prefix, &query.viewer, limit)?))
}

pub async fn refresh_search<S: RowStore>(
    State(state): State<AppState<S>>,
) -> ApiResult<CountResponse> {
    let count = state.search.refresh()?;
    Ok(Json(CountResponse { count }))
}

pub async fn register<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<CreatedResponse<UserId>> {
    let id = state.search.register(&request.username, &request.email)?;
    Ok(Json(id.into()))
}

pub async fn create_post<S: RowStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<ContentRequest>,
) -> ApiResult<CreatedResponse<PostId>> {
    let id = state.posts.create_post(&request.author, &request.content)?;
    Ok(Json(id.into()))
}

pub async fn get_post<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> ApiResult<Option<PostRecord>> {
    Ok(Json(state.posts.post(PostId(id))?))
}

pub async fn toggle_like<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(user): Json<UserRef>,
) -> ApiResult<LikeResponse> {
    let toggle = state.posts.toggle_like(PostId(id), &user.username)?;
    Ok(Json(LikeResponse {
        ok: toggle.is_some(),
        liked: toggle.is_some_and(LikeToggle::is_liked),
    }))
}

pub async fn like_status<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Query(user): Query<UserRef>,
) -> ApiResult<LikeResponse> {
    let liked = state.posts.is_liked(PostId(id), &user.username)?;
    Ok(Json(LikeResponse { ok: true, liked }))
}

pub async fn add_comment<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(request): Json<ContentRequest>,
) -> ApiResult<CreatedResponse<CommentId>> {
    let comment = state
        .posts
        .add_comment(PostId(id), &request.author, &request.content)?;
    Ok(Json(comment.into()))
}

pub async fn list_comments<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<Comment>> {
    Ok(Json(state.posts.comments(PostId(id))?))
}

pub async fn notifications<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    let limit = query.limit.unwrap_or(DEFAULT_NOTIFICATION_LIMIT);
    Ok(Json(state.notifications.list(&username, query.unread_only, limit)?))
}

pub async fn mark_notification_read<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> ApiResult<OkResponse> {
    let ok = state.notifications.mark_read(NotificationId(id))?;
    Ok(Json(OkResponse { ok }))
}

pub async fn mark_all_notifications_read<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
) -> ApiResult<CountResponse> {
    let count = state.notifications.mark_all_read(&username)?;
    Ok(Json(CountResponse { count }))
}

pub async fn unread_count<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(username): Path<String>,
) -> ApiResult<CountResponse> {
    let count = state.notifications.unread_count(&username)?;
    Ok(Json(CountResponse { count }))
}

pub async fn delete_notification<S: RowStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> ApiResult<OkResponse> {
    let ok = state.notifications.delete(NotificationId(id))?;
    Ok(Json(OkResponse { ok }))
}
