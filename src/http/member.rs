use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    commands::{
        change_password::ChangePasswordRequest,
        duplicate::{ExistsMember, IsDuplicateEmail, IsDuplicatePhone},
        login::LoginRequest,
        profile::{ChangeAddressRequest, FindInfo, FindPoint},
        recovery::{FindEmailRequest, FindPasswordRequest},
        signup::SignupRequest,
    },
    domain::{MemberId, MemberInfo, MemberRole},
};

use super::{
    auth::{AuthMember, MaybeAuthMember},
    validation::{digits_only, Valid},
    ApiError, AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 10, max = 11), custom(function = "digits_only"))]
    pub phone: String,
    #[validate(length(equal = 8), custom(function = "digits_only"))]
    pub birth: String,
    #[serde(default)]
    #[validate(custom(function = "not_admin"))]
    pub role: MemberRole,
}

/// Admins are never created through the public signup
fn not_admin(role: &MemberRole) -> Result<(), ValidationError> {
    match role {
        MemberRole::Admin => Err(ValidationError::new("not_admin")),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupReply {
    pub role: MemberRole,
    pub member_id: MemberId,
}

pub async fn signup(
    State(state): State<AppState>,
    Valid(body): Valid<SignupBody>,
) -> Result<(StatusCode, Json<SignupReply>), ApiError> {
    let res = state
        .logic
        .run(SignupRequest {
            email: body.email,
            password: body.password,
            name: body.name,
            phone: body.phone,
            birth: body.birth,
            role: body.role,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupReply {
            role: res.role,
            member_id: res.member_id,
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailBody {
    #[validate(length(min = 1))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PhoneBody {
    #[validate(length(min = 1))]
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateReply {
    pub is_duplicate: bool,
}

pub async fn duplicate_email(
    State(state): State<AppState>,
    Valid(body): Valid<EmailBody>,
) -> Result<Json<DuplicateReply>, ApiError> {
    let is_duplicate = state.logic.run(IsDuplicateEmail(body.email)).await?;
    Ok(Json(DuplicateReply { is_duplicate }))
}

pub async fn duplicate_phone(
    State(state): State<AppState>,
    Valid(body): Valid<PhoneBody>,
) -> Result<Json<DuplicateReply>, ApiError> {
    let is_duplicate = state.logic.run(IsDuplicatePhone(body.phone)).await?;
    Ok(Json(DuplicateReply { is_duplicate }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReply {
    pub token: String,
    pub member_info: MemberInfo,
}

pub async fn login(
    State(state): State<AppState>,
    Valid(body): Valid<LoginBody>,
) -> Result<Json<LoginReply>, ApiError> {
    let res = state
        .logic
        .run(LoginRequest {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginReply {
        token: res.token,
        member_info: res.member_info,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct FindEmailBody {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
}

pub async fn find_email(
    State(state): State<AppState>,
    Valid(body): Valid<FindEmailBody>,
) -> Result<Json<EmailReply>, ApiError> {
    let email = state
        .logic
        .run(FindEmailRequest {
            name: body.name,
            phone: body.phone,
        })
        .await?;
    Ok(Json(EmailReply { email }))
}

#[derive(Debug, Serialize)]
pub struct EmailReply {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FindPasswordBody {
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TempPasswordReply {
    pub temp_password: String,
}

pub async fn find_password(
    State(state): State<AppState>,
    Valid(body): Valid<FindPasswordBody>,
) -> Result<Json<TempPasswordReply>, ApiError> {
    let temporary = state
        .logic
        .run(FindPasswordRequest {
            email: body.email,
            name: body.name,
            phone: body.phone,
        })
        .await?;
    Ok(Json(TempPasswordReply {
        temp_password: temporary.into_inner(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
    #[validate(length(min = 8, max = 64))]
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
    Valid(body): Valid<ChangePasswordBody>,
) -> Result<StatusCode, ApiError> {
    state
        .logic
        .run(ChangePasswordRequest {
            member_id,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangeAddressBody {
    #[validate(length(min = 1, max = 255))]
    pub address: String,
}

pub async fn change_address(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
    Valid(body): Valid<ChangeAddressBody>,
) -> Result<StatusCode, ApiError> {
    state
        .logic
        .run(ChangeAddressRequest {
            member_id,
            address: body.address,
        })
        .await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Serialize)]
pub struct PointReply {
    pub point: i32,
}

pub async fn point(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
) -> Result<Json<PointReply>, ApiError> {
    let point = state.logic.run(FindPoint(member_id)).await?;
    Ok(Json(PointReply { point }))
}

pub async fn info(
    State(state): State<AppState>,
    AuthMember(member_id): AuthMember,
) -> Result<Json<MemberInfo>, ApiError> {
    Ok(Json(state.logic.run(FindInfo(member_id)).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsLoginReply {
    pub is_login: bool,
}

pub async fn is_login(
    State(state): State<AppState>,
    MaybeAuthMember(member_id): MaybeAuthMember,
) -> Result<Json<IsLoginReply>, ApiError> {
    let is_login = match member_id {
        Some(member_id) => state.logic.run(ExistsMember(member_id)).await?,
        None => false,
    };
    Ok(Json(IsLoginReply { is_login }))
}
