//! Public story catalog

use axum::{
    extract::{Query, State},
    Json,
};
use humn_story::story::{hum_story, StoryAudience, StoryOptions};
use serde::Deserialize;
use serde_json::{json, Value};

use super::non_blank;
use crate::{AppState, Result};

#[derive(Debug, Default, Deserialize)]
pub struct StoryQuery {
    /// Visitor name from an invite link
    visitor: Option<String>,
    /// Signed-in member name; hides calls-to-action
    member: Option<String>,
}

/// GET /api/story?visitor=<name>&member=<name>
///
/// Returns `{"sections": [...]}` personalized for the audience.
pub async fn get_story(
    State(state): State<AppState>,
    Query(query): Query<StoryQuery>,
) -> Result<Json<Value>> {
    let audience = StoryAudience {
        visitor_name: non_blank(query.visitor),
        member_name: non_blank(query.member),
    };
    let options = StoryOptions::from_config(&state.config.story, audience);
    let catalog = hum_story(&options)?;

    Ok(Json(json!({ "sections": catalog })))
}
