use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use metrics::counter;
use serde_json::Value;

use crate::errors::AppError;
use crate::swap::RelayRequest;
use crate::AppState;

/// POST /api/swapping-agent: forward a swap instruction to the planning agent
/// and return its JSON body unchanged.
///
/// An unreadable body is a 500 like any other relay failure; a readable body
/// without both fields is a 400.
pub async fn relay(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, AppError> {
    counter!("relay_requests_total").increment(1);

    let request = parse_relay_body(&body).inspect_err(|e| {
        if matches!(e, AppError::MalformedBody(_)) {
            counter!("relay_failures_total").increment(1);
        }
    })?;

    tracing::info!(
        user_address = %request.user_address,
        instruction = %request.instruction,
        "Relaying swap instruction"
    );

    let upstream = forward(&state, &request).await.inspect_err(|_| {
        counter!("relay_failures_total").increment(1);
    })?;

    Ok(Json(upstream))
}

fn parse_relay_body(body: &[u8]) -> Result<RelayRequest, AppError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))?;
    if value.is_null() {
        return Err(AppError::MalformedBody("body is null".into()));
    }

    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match (field("instruction"), field("userAddress")) {
        (Some(instruction), Some(user_address)) => Ok(RelayRequest {
            instruction,
            user_address,
        }),
        _ => Err(AppError::BadRequest("Missing instruction or userAddress".into())),
    }
}

async fn forward(state: &AppState, request: &RelayRequest) -> Result<Value, AppError> {
    let resp = state
        .http
        .post(&state.config.swap_agent_url)
        .json(request)
        .send()
        .await?
        .error_for_status()?;

    Ok(resp.json::<Value>().await?)
}
