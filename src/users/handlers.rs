use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{header, HeaderName, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use time::{macros::format_description, Date};
use tracing::{info, instrument};

use crate::{
    error::{ApiError, Details, ServiceError},
    state::AppState,
    users::dto::{
        BirthDateRangeQuery, CreateUserRequest, Data, UserContactsRequest, UserResponse,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(find_by_birth_date_range).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(replace_user).delete(delete_user),
        )
        .route("/users/:id/contacts", patch(patch_contacts))
}

type ApiResult<T> = Result<T, ApiError>;

fn payload<T>(body: Result<Json<Data<T>>, JsonRejection>) -> Result<T, ServiceError> {
    let Json(data) = body.map_err(|e| ServiceError::bad_param("data", e.body_text()))?;
    data.require()
}

fn user_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ServiceError> {
    id.map(|Path(id)| id)
        .map_err(|e| ServiceError::bad_param("userId", e.body_text()))
}

/// Empty values count as absent; malformed ones are recorded in `details`.
fn date_param(name: &str, raw: Option<&str>, details: &mut Details) -> Option<Date> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    let format = format_description!("[year]-[month]-[day]");
    match Date::parse(raw, &format) {
        Ok(date) => Some(date),
        Err(_) => {
            details.insert(
                name.to_string(),
                format!("Invalid date '{raw}', expected YYYY-MM-DD"),
            );
            None
        }
    }
}

#[instrument(skip(state, query))]
pub async fn find_by_birth_date_range(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<BirthDateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<Data<Vec<UserResponse>>>> {
    let path = uri.path();
    let Query(query) = query.map_err(|e| {
        ApiError::new(ServiceError::bad_param("query", e.body_text()), path)
    })?;

    let mut details = Details::new();
    let from = date_param("from", query.from.as_deref(), &mut details);
    let to = date_param("to", query.to.as_deref(), &mut details);
    if !details.is_empty() {
        // Malformed bounds keep their own message; absent ones are still reported.
        if let Err(ServiceError::BadRequest { details: missing }) =
            state.users.find_by_birth_date_range(from, to)
        {
            for (name, message) in missing {
                details.entry(name).or_insert(message);
            }
        }
        return Err(ApiError::new(ServiceError::bad_request(details), path));
    }

    let users = state
        .users
        .find_by_birth_date_range(from, to)
        .map_err(|e| ApiError::new(e, path))?;
    info!(count = users.len(), "birth date range query");
    Ok(Json(Data::of(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: Result<Json<Data<CreateUserRequest>>, JsonRejection>,
) -> ApiResult<(StatusCode, [(HeaderName, String); 1], Json<Data<UserResponse>>)> {
    let path = uri.path();
    let fields = payload(body)
        .and_then(CreateUserRequest::validate)
        .map_err(|e| ApiError::new(e, path))?;
    let user = state
        .users
        .save(fields.into_user())
        .map_err(|e| ApiError::new(e, path))?;

    let id = user.id.unwrap_or_default();
    info!(user_id = id, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{id}"))],
        Json(Data::of(user.into())),
    ))
}

#[instrument(skip(state, id))]
pub async fn get_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Data<UserResponse>>> {
    let path = uri.path();
    let user = user_id(id)
        .and_then(|id| state.users.find(id))
        .map_err(|e| ApiError::new(e, path))?;
    Ok(Json(Data::of(user.into())))
}

#[instrument(skip(state, id, body))]
pub async fn replace_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Data<CreateUserRequest>>, JsonRejection>,
) -> ApiResult<Json<Data<UserResponse>>> {
    let path = uri.path();
    let id = user_id(id).map_err(|e| ApiError::new(e, path))?;
    let fields = payload(body)
        .and_then(CreateUserRequest::validate)
        .map_err(|e| ApiError::new(e, path))?;

    let mut user = state.users.find(id).map_err(|e| ApiError::new(e, path))?;
    fields.apply_to(&mut user);
    let user = state.users.save(user).map_err(|e| ApiError::new(e, path))?;

    info!(user_id = id, "user replaced");
    Ok(Json(Data::of(user.into())))
}

#[instrument(skip(state, id, body))]
pub async fn patch_contacts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Data<UserContactsRequest>>, JsonRejection>,
) -> ApiResult<Json<Data<UserResponse>>> {
    let path = uri.path();
    let id = user_id(id).map_err(|e| ApiError::new(e, path))?;
    let contacts = payload(body)
        .and_then(UserContactsRequest::validate)
        .map_err(|e| ApiError::new(e, path))?;

    let mut user = state.users.find(id).map_err(|e| ApiError::new(e, path))?;
    contacts.apply_to(&mut user);
    let user = state.users.save(user).map_err(|e| ApiError::new(e, path))?;

    info!(user_id = id, "user contacts patched");
    Ok(Json(Data::of(user.into())))
}

#[instrument(skip(state, id))]
pub async fn delete_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let path = uri.path();
    let id = user_id(id).map_err(|e| ApiError::new(e, path))?;
    state.users.delete(id).map_err(|e| ApiError::new(e, path))?;
    info!(user_id = id, "user deleted");
    Ok(StatusCode::OK)
}
