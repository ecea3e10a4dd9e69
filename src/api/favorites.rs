use crate::api::{required, ApiResponse, AppState};
use crate::error::ApiError;
use crate::models::{Favorite, DEFAULT_USER_ID};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteFilter {
    pub user_id: Option<String>,
}

// GET /api/favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    filter: Result<Query<FavoriteFilter>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Favorite>>>, ApiError> {
    let Query(filter) = filter?;
    let mut favorites = state.store.favorites().await;
    if let Some(user_id) = required(&filter.user_id) {
        favorites.retain(|f| f.user_id == user_id);
    }
    Ok(Json(ApiResponse::data(favorites)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFavorite {
    pub from_stop: Option<String>,
    pub to_stop: Option<String>,
    pub user_id: Option<String>,
}

// POST /api/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    payload: Result<Json<CreateFavorite>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Favorite>>), ApiError> {
    let Json(body) = payload?;
    let (Some(from_stop), Some(to_stop)) = (required(&body.from_stop), required(&body.to_stop))
    else {
        return Err(ApiError::BadRequest(
            "From and to stops are required".to_string(),
        ));
    };

    let favorite = Favorite {
        id: String::new(),
        user_id: required(&body.user_id).unwrap_or(DEFAULT_USER_ID).to_string(),
        from_stop: from_stop.to_string(),
        to_stop: to_stop.to_string(),
        created_at: Utc::now(),
    };

    let saved = state
        .store
        .insert_favorite(favorite)
        .await
        .map_err(|e| ApiError::internal("Failed to add favorite", e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(saved, "Favorite added successfully")),
    ))
}

// DELETE /api/favorites/{id}
pub async fn delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state
        .store
        .delete_favorite(&id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete favorite", e))?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Favorite '{}' not found", id)));
    }

    Ok(Json(ApiResponse::message("Favorite removed successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state;

    fn favorite(from: &str, to: &str, user: Option<&str>) -> CreateFavorite {
        CreateFavorite {
            from_stop: Some(from.into()),
            to_stop: Some(to.into()),
            user_id: user.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn adds_lists_and_filters_by_user() {
        let state = test_state();
        let (status, _) =
            add_favorite(State(state.clone()), Ok(Json(favorite("Pala", "Kottayam", None))))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        let (_, Json(other)) =
            add_favorite(State(state.clone()), Ok(Json(favorite("Kochi", "Thrissur", Some("user_2")))))
                .await
                .unwrap();
        assert_eq!(other.data.unwrap().user_id, "user_2");

        let Json(all) = list_favorites(State(state.clone()), Ok(Query(FavoriteFilter::default())))
            .await
            .unwrap();
        assert_eq!(all.data.unwrap().len(), 2);

        let filter = FavoriteFilter {
            user_id: Some(DEFAULT_USER_ID.into()),
        };
        let Json(mine) = list_favorites(State(state), Ok(Query(filter))).await.unwrap();
        let mine = mine.data.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].from_stop, "Pala");
    }

    #[tokio::test]
    async fn requires_both_stops() {
        let state = test_state();
        let err = add_favorite(State(state), Ok(Json(favorite("Pala", "", None))))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn deletes_once() {
        let state = test_state();
        let (_, Json(created)) =
            add_favorite(State(state.clone()), Ok(Json(favorite("Pala", "Kottayam", None))))
                .await
                .unwrap();
        let id = created.data.unwrap().id;

        let Json(removed) = delete_favorite(State(state.clone()), Path(id.clone())).await.unwrap();
        assert!(removed.success);
        let again = delete_favorite(State(state), Path(id)).await.unwrap_err();
        assert!(matches!(again, ApiError::NotFound(_)));
    }
}
