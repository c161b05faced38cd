use std::{
    borrow::Cow,
    task::{Context, Poll},
};

use tower::Service;
use tracing::info;

use crate::{
    domain::MemberId,
    ports::{
        member::{self, MemberPort},
        password::PasswordPort,
        preference::PreferencePort,
        token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

pub struct ChangePointsRequest {
    pub member_id: MemberId,
    pub event: PointEvent,
}

pub enum PointEvent {
    /// Points earned, e.g. on a completed order or a review
    Earned { points: u32 },
    /// Points spent as a discount on an order
    Spent { points: u32 },
    /// Manual adjustment, e.g. for support
    Manual {
        delta_points: i32,
        reason: Option<String>,
    },
}

impl PointEvent {
    /// Signed change to apply to the balance
    pub fn delta_points(&self) -> i32 {
        match self {
            PointEvent::Earned { points } => i32::try_from(*points).unwrap_or(i32::MAX),
            PointEvent::Spent { points } => i32::try_from(*points).map_or(i32::MIN, |p| -p),
            PointEvent::Manual { delta_points, .. } => *delta_points,
        }
    }

    pub fn reason(&self) -> Cow<'static, str> {
        match self {
            PointEvent::Earned { .. } => "Points earned".into(),
            PointEvent::Spent { .. } => "Points spent".into(),
            PointEvent::Manual { reason, .. } => reason
                .as_ref()
                .cloned()
                .map(Into::into)
                .unwrap_or("Manual adjustment".into()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ChangePointsResponse {
    pub member_id: MemberId,
    /// Previous point balance
    pub old_points: i32,
    /// New point balance
    pub new_points: i32,
}

impl<M, P, H, T> Service<ChangePointsRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = ChangePointsResponse;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ChangePointsRequest) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move {
            let delta_points = req.event.delta_points();
            let new_points = member
                .change_point(req.member_id, delta_points)
                .await
                .map_err(|err| match err {
                    member::Error::MemberDoesNotExist(member_id) => {
                        Error::MemberNotFound(member_id)
                    }
                    err => err.into(),
                })?;

            info!(
                member_id = req.member_id,
                delta_points,
                new_points,
                reason = %req.event.reason(),
                "points changed"
            );
            Ok(ChangePointsResponse {
                member_id: req.member_id,
                old_points: new_points - delta_points,
                new_points,
            })
        })
    }
}
