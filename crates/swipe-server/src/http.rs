//! HTTP endpoint handlers

use std::sync::{Arc, MutexGuard, PoisonError};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use swipe_feed::{
    parse_works_page, rank_by_relevance, FeedError, FeedPage, RankCandidate, DEFAULT_FEED_SIZE,
};
use swipe_library::{
    LibraryError, LikedPaper, NewLikedPaper, NewPaper, Paper, ProfileDetails, Repository,
    ResearchInterest,
};
use swipe_topics::{AssignOutcome, TopicColor, TopicColorEntry, TopicColorStore};

use crate::AppState;

type ApiError = (StatusCode, String);

fn library_error(err: LibraryError) -> ApiError {
    let status = match err {
        LibraryError::Validation(_) => StatusCode::BAD_REQUEST,
        LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
        LibraryError::Database(_) | LibraryError::Serialization(_) => {
            tracing::error!("Library error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

fn library(state: &AppState) -> MutexGuard<'_, Repository> {
    state.library.lock().unwrap_or_else(PoisonError::into_inner)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ==================== Topic colors ====================

/// All stored topic colors
pub async fn list_topic_colors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TopicColorEntry>>, ApiError> {
    state
        .assigner
        .store()
        .entries()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopicColorResponse {
    pub topic: String,
    pub color: TopicColor,
    pub outcome: AssignOutcome,
}

/// Color for one topic, allocating it on first sight
pub async fn get_topic_color(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> Json<TopicColorResponse> {
    let assignment = state.assigner.assign(Some(&topic)).await;
    Json(TopicColorResponse {
        topic,
        color: assignment.color,
        outcome: assignment.outcome,
    })
}

// ==================== Feed ====================

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

/// Decorate a raw OpenAlex works response as a feed page
pub async fn build_feed_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
    body: String,
) -> Result<Json<FeedPage>, ApiError> {
    let works = parse_works_page(&body).map_err(|e| match e {
        FeedError::Parse(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        _ => (StatusCode::BAD_GATEWAY, e.to_string()),
    })?;

    let mut rng = StdRng::from_entropy();
    let page = state
        .feed
        .build_page(query.page.unwrap_or(1), works, &mut rng)
        .await;
    Ok(Json(page))
}

// ==================== Library ====================

pub async fn list_likes(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Json<Vec<LikedPaper>>, ApiError> {
    library(&state)
        .liked_papers(&user)
        .map(Json)
        .map_err(library_error)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub paper_title: String,
    pub liked: bool,
}

/// Flip the like state of a card
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(paper): Json<NewLikedPaper>,
) -> Result<Json<LikeResponse>, ApiError> {
    let paper_title = paper.paper_title.trim().to_string();
    let liked = library(&state)
        .toggle_like(&user, paper)
        .map_err(library_error)?;
    Ok(Json(LikeResponse { paper_title, liked }))
}

pub async fn delete_like(
    State(state): State<Arc<AppState>>,
    Path((user, title)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let removed = library(&state)
        .unlike(&user, &title)
        .map_err(library_error)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("'{}' is not liked", title)))
    }
}

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<Json<ProfileDetails>, ApiError> {
    library(&state)
        .profile(&user)
        .map_err(library_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("No profile for {}", user)))
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub research_fields: Vec<ResearchInterest>,
    #[serde(default)]
    pub skills: Vec<String>,
}

pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ProfileDetails>, ApiError> {
    library(&state)
        .save_profile(&user, request.research_fields, request.skills)
        .map(Json)
        .map_err(library_error)
}

#[derive(Debug, Deserialize)]
pub struct InterestRequest {
    pub user_id: String,
    pub research_interests: Vec<String>,
}

/// Replace the interests the ranked feed is built from
pub async fn update_interests(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InterestRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = library(&state)
        .replace_interests(&request.user_id, request.research_interests)
        .map_err(library_error)?;

    Ok(Json(serde_json::json!({
        "success": true,
        "user_id": request.user_id,
        "count": count
    })))
}

// ==================== Ranked papers ====================

/// Add or replace a ranked feed candidate
pub async fn add_paper(
    State(state): State<Arc<AppState>>,
    Json(paper): Json<NewPaper>,
) -> Result<Json<Paper>, ApiError> {
    library(&state)
        .add_paper(paper)
        .map(Json)
        .map_err(library_error)
}

#[derive(Debug, Deserialize)]
pub struct PaperSearchRequest {
    pub user_id: String,
    /// Embedding of the user's interests
    pub query: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RankedPaper {
    #[serde(flatten)]
    pub paper: Paper,
    pub relevance_score: f32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaperSearchResponse {
    pub user_id: String,
    pub interests: Vec<String>,
    pub papers: Vec<RankedPaper>,
}

/// Top candidates by weighted similarity to the query embedding
pub async fn search_papers(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaperSearchRequest>,
) -> Result<Json<PaperSearchResponse>, ApiError> {
    let (interests, candidates) = {
        let repo = library(&state);
        let interests = repo.interests(&request.user_id).map_err(library_error)?;
        let candidates = repo.paper_candidates().map_err(library_error)?;
        (interests, candidates)
    };

    if interests.is_empty() {
        tracing::info!(user_id = %request.user_id, "No stored interests, ranking by query only");
    } else {
        tracing::info!(user_id = %request.user_id, ?interests, "Ranking papers for interests");
    }

    let candidates = candidates
        .into_iter()
        .map(|c| RankCandidate {
            item: c.paper,
            abstract_vector: c.abstract_vector,
            title_vector: c.title_vector,
            keywords_vector: c.keywords_vector,
        })
        .collect();
    let ranked = rank_by_relevance(candidates, &request.query, DEFAULT_FEED_SIZE)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(PaperSearchResponse {
        user_id: request.user_id,
        interests,
        papers: ranked
            .into_iter()
            .map(|r| RankedPaper {
                paper: r.item,
                relevance_score: r.score,
            })
            .collect(),
    }))
}
