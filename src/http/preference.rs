use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    commands::preference_items::{
        AddPreferenceRequest, DeletePreferenceRequest, ListPreferences,
    },
    domain::{ItemId, PreferenceId, PreferenceSummary},
};

use super::{
    auth::AuthMember,
    validation::{PathParam, Valid},
    ApiError, AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddPreferenceBody {
    pub item_id: ItemId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPreferenceReply {
    pub preference_id: PreferenceId,
}

pub async fn add(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
    Valid(body): Valid<AddPreferenceBody>,
) -> Result<(StatusCode, Json<AddPreferenceReply>), ApiError> {
    let preference_id = state
        .logic
        .run(AddPreferenceRequest {
            member_id,
            item_id: body.item_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AddPreferenceReply { preference_id }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
) -> Result<Json<Vec<PreferenceSummary>>, ApiError> {
    Ok(Json(state.logic.run(ListPreferences(member_id)).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
    PathParam(preference_id): PathParam<PreferenceId>,
) -> Result<StatusCode, ApiError> {
    state
        .logic
        .run(DeletePreferenceRequest {
            member_id,
            preference_id,
        })
        .await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use crate::http::tests::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use speculoos::prelude::*;

    #[tokio::test]
    async fn test_preference_flow() {
        // GIVEN a logged in member
        let app = app();
        let token = login(&app, "a@b.com", "01011112222").await;

        // WHEN adding the seeded item
        let (status, added) = send(
            &app,
            Method::POST,
            "/preference",
            Some(&token),
            Some(json!({ "itemId": ITEM_ID })),
        )
        .await;
        assert_that!(status).is_equal_to(StatusCode::CREATED);
        let preference_id = added["preferenceId"].as_i64().unwrap();

        // THEN it is listed with the item details
        let (status, listed) = send(&app, Method::GET, "/preference", Some(&token), None).await;
        assert_that!(status).is_equal_to(StatusCode::OK);
        let listed = listed.as_array().cloned().unwrap_or_default();
        assert_that!(listed).has_length(1);
        assert_that!(listed[0]["preferenceId"].as_i64()).is_equal_to(Some(preference_id));
        assert_that!(listed[0]["thumbnail"].as_str()).is_equal_to(Some("thumb-7.png"));
        assert_that!(listed[0]["sale"].as_bool()).is_equal_to(Some(false));

        // AND deleting it twice only works once
        let uri = format!("/preference/{preference_id}");
        let (first, _) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        let (second, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_that!(first).is_equal_to(StatusCode::OK);
        assert_that!(second).is_equal_to(StatusCode::NOT_FOUND);
        assert_that!(body["code"].as_str()).is_equal_to(Some("NO_FIND_PREFERENCE"));
    }

    #[tokio::test]
    async fn test_add_missing_item() {
        let app = app();
        let token = login(&app, "a@b.com", "01011112222").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/preference",
            Some(&token),
            Some(json!({ "itemId": 999 })),
        )
        .await;

        assert_that!(status).is_equal_to(StatusCode::NOT_FOUND);
        assert_that!(body["code"].as_str()).is_equal_to(Some("NO_FIND_ITEM_BY_ID"));
    }

    #[tokio::test]
    async fn test_delete_by_other_member() {
        // GIVEN a preference owned by one member
        let app = app();
        let owner = login(&app, "a@b.com", "01011112222").await;
        let other = login(&app, "c@d.com", "01033334444").await;
        let (_, added) = send(
            &app,
            Method::POST,
            "/preference",
            Some(&owner),
            Some(json!({ "itemId": ITEM_ID })),
        )
        .await;
        let uri = format!("/preference/{}", added["preferenceId"]);

        // WHEN another member deletes it
        let (status, body) = send(&app, Method::DELETE, &uri, Some(&other), None).await;

        // THEN it is forbidden and the owner still sees it
        assert_that!(status).is_equal_to(StatusCode::FORBIDDEN);
        assert_that!(body["code"].as_str()).is_equal_to(Some("NOT_AUTHORITY_PREFERENCE_EDIT"));
        let (_, listed) = send(&app, Method::GET, "/preference", Some(&owner), None).await;
        assert_that!(listed.as_array().map(Vec::len)).is_equal_to(Some(1));
    }

    #[tokio::test]
    async fn test_malformed_requests() {
        let app = app();
        let token = login(&app, "a@b.com", "01011112222").await;

        let (bad_id, bad_id_body) =
            send(&app, Method::DELETE, "/preference/abc", Some(&token), None).await;
        let (no_item, no_item_body) = send(
            &app,
            Method::POST,
            "/preference",
            Some(&token),
            Some(json!({ "item": ITEM_ID })),
        )
        .await;

        assert_that!(bad_id).is_equal_to(StatusCode::BAD_REQUEST);
        assert_that!(bad_id_body["code"].as_str()).is_equal_to(Some("INVALID_REQUEST"));
        assert_that!(no_item).is_equal_to(StatusCode::BAD_REQUEST);
        assert_that!(no_item_body["code"].as_str()).is_equal_to(Some("INVALID_REQUEST"));
    }
}
