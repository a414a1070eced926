use crate::api::AppState;
use crate::api::middleware::CurrentSession;
use crate::api::schemas::library::{
    Genres, RecentTracks, RecentTracksQuery, Recommendations, RecommendationsQuery, TopArtists, TopItemsQuery,
    TopTracks, User,
};
use crate::domain::library::{Limit, SeedSet, TimeRange};
use crate::error::{AppError, Result};
use axum::{
    Json,
    extract::{Query, State},
};

const DEFAULT_RECOMMENDATIONS: u8 = 20;

/// Resolves the caller's access token, refreshing it if needed, and persists any change to the session.
async fn access_token(state: &AppState, current: &mut CurrentSession) -> Result<String> {
    let token = state.token_service.get_valid_token(&mut current.session).await;
    current.commit(&state.sessions);

    token?.map(|record| record.access_token).ok_or(AppError::Unauthenticated)
}

/// Rejects callers without a token before any parameter is looked at. Pure read, never refreshes.
fn require_session(current: &CurrentSession) -> Result<()> {
    if current.session.is_authenticated() { Ok(()) } else { Err(AppError::Unauthenticated) }
}

fn time_range(raw: Option<&str>) -> Result<TimeRange> {
    raw.map_or(Ok(TimeRange::default()), |value| value.parse().map_err(AppError::Validation))
}

fn limit(raw: Option<&str>, default: u8, max: u8) -> Result<Limit> {
    Limit::parse(raw, default, max).map_err(AppError::Validation)
}

pub async fn user(State(state): State<AppState>, mut current: CurrentSession) -> Result<Json<User>> {
    let token = access_token(&state, &mut current).await?;
    let profile = state.library_service.profile(&token).await?;
    Ok(Json(profile.into()))
}

pub async fn top_tracks(
    State(state): State<AppState>,
    mut current: CurrentSession,
    Query(query): Query<TopItemsQuery>,
) -> Result<Json<TopTracks>> {
    require_session(&current)?;
    let range = time_range(query.time_range.as_deref())?;
    let limit = limit(query.limit.as_deref(), Limit::MAX_PAGE, Limit::MAX_PAGE)?;

    let token = access_token(&state, &mut current).await?;
    let tracks = state.library_service.top_tracks(&token, range, limit).await?;

    Ok(Json(TopTracks { tracks: tracks.into_iter().map(Into::into).collect(), time_range: range.to_string() }))
}

pub async fn top_artists(
    State(state): State<AppState>,
    mut current: CurrentSession,
    Query(query): Query<TopItemsQuery>,
) -> Result<Json<TopArtists>> {
    require_session(&current)?;
    let range = time_range(query.time_range.as_deref())?;
    let limit = limit(query.limit.as_deref(), Limit::MAX_PAGE, Limit::MAX_PAGE)?;

    let token = access_token(&state, &mut current).await?;
    let artists = state.library_service.top_artists(&token, range, limit).await?;

    Ok(Json(TopArtists { artists: artists.into_iter().map(Into::into).collect(), time_range: range.to_string() }))
}

pub async fn recent_tracks(
    State(state): State<AppState>,
    mut current: CurrentSession,
    Query(query): Query<RecentTracksQuery>,
) -> Result<Json<RecentTracks>> {
    require_session(&current)?;
    let limit = limit(query.limit.as_deref(), Limit::MAX_PAGE, Limit::MAX_PAGE)?;

    let token = access_token(&state, &mut current).await?;
    let tracks = state.library_service.recent_tracks(&token, limit).await?;

    Ok(Json(RecentTracks { tracks: tracks.into_iter().map(Into::into).collect() }))
}

pub async fn recommendations(
    State(state): State<AppState>,
    mut current: CurrentSession,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Json<Recommendations>> {
    require_session(&current)?;
    let limit = limit(query.limit.as_deref(), DEFAULT_RECOMMENDATIONS, Limit::MAX_RECOMMENDATIONS)?;
    let seeds = SeedSet::from_params(
        query.seed_tracks.as_deref(),
        query.seed_artists.as_deref(),
        query.seed_genres.as_deref(),
    );

    let token = access_token(&state, &mut current).await?;
    let tracks = state.library_service.recommendations(&token, seeds, limit).await?;

    Ok(Json(Recommendations { recommendations: tracks.into_iter().map(Into::into).collect() }))
}

pub async fn genre_seeds(State(state): State<AppState>, mut current: CurrentSession) -> Result<Json<Genres>> {
    let token = access_token(&state, &mut current).await?;
    let genres = state.library_service.genre_seeds(&token).await?;
    Ok(Json(Genres { genres }))
}
