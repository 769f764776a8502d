use std::convert::Infallible;

use log::{debug, error, warn};
use rust_embed::RustEmbed;
use warp::http::{StatusCode, Uri};
use warp::reply::{self, Response};
use warp::{Filter, Rejection, Reply};

use crate::error_handling::types::{AuthError, RegistrationError};
use crate::session_management::Session;
use crate::visitor_ledger::VisitorRecordInput;
use crate::web_interface::types::{
    ApiError, AppState, DepartmentEntry, Internal, LoginRequest, ReportQuery, Unauthenticated,
};

const MAX_BODY_BYTES: u64 = 16 * 1024;
const LOGIN_PAGE: &str = "login.html";

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/static/"]
struct Assets;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// Runs store access off the async workers.
async fn blocking<T, F>(task: F) -> Result<T, Rejection>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| warp::reject::custom(Internal(e.to_string())))
}

fn json_error(status: StatusCode, error: ApiError) -> Response {
    reply::with_status(reply::json(&error), status).into_response()
}

fn registration_error(err: RegistrationError) -> Response {
    match err {
        RegistrationError::MissingFields(fields) => {
            let message = format!("Missing required fields: {}", fields.join(", "));
            json_error(
                StatusCode::BAD_REQUEST,
                ApiError {
                    message,
                    fields: fields.into_iter().map(String::from).collect(),
                },
            )
        }
        RegistrationError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, ApiError::new(err.to_string()))
        }
        RegistrationError::AlreadyCheckedOut(_) => {
            json_error(StatusCode::CONFLICT, ApiError::new(err.to_string()))
        }
        RegistrationError::StorageError(_) | RegistrationError::CodesExhausted => {
            error!("Visitor ledger failure: {}", err);
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("Failed to update the visitor ledger"),
            )
        }
        _ => json_error(StatusCode::BAD_REQUEST, ApiError::new(err.to_string())),
    }
}

fn asset(path: &str) -> Result<Response, Rejection> {
    let file = Assets::get(path).ok_or_else(warp::reject::not_found)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(reply::with_header(file.data.into_owned(), "Content-Type", mime.to_string()).into_response())
}

/// Passes the current session on, or rejects with [`Unauthenticated`].
pub fn authenticated(state: AppState) -> impl Filter<Extract = (Session,), Error = Rejection> + Clone {
    with_state(state).and_then(|state: AppState| async move {
        let sessions = state.sessions.clone();
        match blocking(move || sessions.current_session()).await? {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(warp::reject::custom(Unauthenticated)),
            Err(e) => Err(warp::reject::custom(Internal(e.to_string()))),
        }
    })
}

/// GET / and GET /login
pub fn login_page_route() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path::end()
        .or(warp::path!("login"))
        .unify()
        .and(warp::get())
        .and_then(|| async move { asset(LOGIN_PAGE) })
}

/// GET /static/<file>
pub fn static_route() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path("static")
        .and(warp::path::tail())
        .and(warp::get())
        .and_then(|tail: warp::path::Tail| async move { asset(tail.as_str()) })
}

/// POST /api/login
pub fn login_route(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "login")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(|request: LoginRequest, state: AppState| async move {
            tokio::time::sleep(state.login_latency).await;
            let sessions = state.sessions.clone();
            let result =
                blocking(move || sessions.login(&request.username, &request.password)).await?;
            let res = match result {
                Ok(session) => reply::with_status(reply::json(&session), StatusCode::OK).into_response(),
                Err(AuthError::MissingCredentials) => json_error(
                    StatusCode::BAD_REQUEST,
                    ApiError::new(AuthError::MissingCredentials.to_string()),
                ),
                Err(AuthError::InvalidCredentials) => json_error(
                    StatusCode::UNAUTHORIZED,
                    ApiError::new(AuthError::InvalidCredentials.to_string()),
                ),
                Err(e) => {
                    error!("Login failed: {}", e);
                    json_error(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("Failed to store the session"),
                    )
                }
            };
            Ok::<_, Rejection>(res)
        })
}

/// POST /api/logout
pub fn logout_route(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "logout")
        .and(warp::post())
        .and(with_state(state))
        .and_then(|state: AppState| async move {
            let sessions = state.sessions.clone();
            blocking(move || sessions.logout())
                .await?
                .map_err(|e| warp::reject::custom(Internal(e.to_string())))?;
            Ok::<_, Rejection>(reply::with_status(reply::reply(), StatusCode::NO_CONTENT).into_response())
        })
}

/// GET /api/session
pub fn session_route(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "session")
        .and(warp::get())
        .and(authenticated(state))
        .map(|session: Session| reply::json(&session).into_response())
}

/// GET /api/dashboard
pub fn dashboard_route(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "dashboard")
        .and(warp::get())
        .and(authenticated(state.clone()))
        .and(with_state(state))
        .map(|_session: Session, state: AppState| {
            reply::json(&state.reports.dashboard_overview()).into_response()
        })
}

/// GET /api/departments
pub fn departments_route(
    state: AppState,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "departments")
        .and(warp::get())
        .and(authenticated(state.clone()))
        .and(with_state(state))
        .map(|_session: Session, state: AppState| {
            let departments: Vec<DepartmentEntry> = state
                .ledger
                .directory()
                .departments()
                .iter()
                .map(|d| DepartmentEntry {
                    name: d.name.clone(),
                    floor: d.floor,
                })
                .collect();
            reply::json(&departments).into_response()
        })
}

/// POST /api/visitors
pub fn register_visitor_route(
    state: AppState,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "visitors")
        .and(warp::post())
        .and(authenticated(state.clone()))
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_state(state))
        .and_then(
            |session: Session, input: VisitorRecordInput, state: AppState| async move {
                tokio::time::sleep(state.registration_latency).await;
                debug!("Registration submitted by '{}'", session.user.username);
                let ledger = state.ledger.clone();
                let res = match blocking(move || ledger.register(input)).await? {
                    Ok(record) => {
                        reply::with_status(reply::json(&record), StatusCode::CREATED).into_response()
                    }
                    Err(e) => registration_error(e),
                };
                Ok::<_, Rejection>(res)
            },
        )
}

/// POST /api/visitors/<code>/checkout
pub fn checkout_route(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "visitors" / String / "checkout")
        .and(warp::post())
        .and(authenticated(state.clone()))
        .and(with_state(state))
        .and_then(|code: String, _session: Session, state: AppState| async move {
            let ledger = state.ledger.clone();
            let res = match blocking(move || ledger.check_out(&code)).await? {
                Ok(record) => reply::json(&record).into_response(),
                Err(e) => registration_error(e),
            };
            Ok::<_, Rejection>(res)
        })
}

/// GET /api/reports?period=
pub fn reports_route(state: AppState) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "reports")
        .and(warp::get())
        .and(authenticated(state.clone()))
        .and(warp::query::<ReportQuery>())
        .and(with_state(state))
        .map(|_session: Session, query: ReportQuery, state: AppState| {
            let period = query.period.unwrap_or_default();
            reply::json(&state.reports.report(period)).into_response()
        })
}

/// GET /api/reports/export?period=
pub fn export_report_route(
    state: AppState,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path!("api" / "reports" / "export")
        .and(warp::get())
        .and(authenticated(state.clone()))
        .and(warp::query::<ReportQuery>())
        .and(with_state(state))
        .map(|_session: Session, query: ReportQuery, state: AppState| {
            let period = query.period.unwrap_or_default();
            let document = state.reports.export(period);
            let disposition = format!(
                "attachment; filename=\"visitor-report-{}-{}.json\"",
                period,
                document.generated.format("%Y%m%d%H%M%S")
            );
            reply::with_header(reply::json(&document), "Content-Disposition", disposition)
                .into_response()
        })
}

/// Turns rejections into responses.
///
/// A missing session on a protected route becomes a redirect to the login
/// page; everything else is a JSON error.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if err.find::<Unauthenticated>().is_some() {
        debug!("Unauthenticated request, redirecting to /login");
        return Ok(warp::redirect::see_other(Uri::from_static("/login")).into_response());
    }

    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, String::from("Not found"))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, String::from("Invalid query string"))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, String::from("Request body too large"))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, String::from("Method not allowed"))
    } else if let Some(Internal(e)) = err.find::<Internal>() {
        error!("Request failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, String::from("Internal server error"))
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, String::from("Internal server error"))
    };

    Ok(json_error(status, ApiError::new(message)))
}
