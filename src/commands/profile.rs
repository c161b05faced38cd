//! Read and edit what a member sees about themselves, plus the admin lookup

use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::{
    domain::{AdminMember, MemberId, MemberInfo},
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

/// Current point balance of a member
pub struct FindPoint(pub MemberId);

/// Public profile of a member
pub struct FindInfo(pub MemberId);

/// Admin record of a member
pub struct FindAdmin(pub MemberId);

pub struct ChangeAddressRequest {
    pub member_id: MemberId,
    pub address: String,
}

impl<M, P, H, T> Service<FindPoint> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = i32;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindPoint) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move {
            let found = member
                .find_by_id(req.0)
                .await?
                .ok_or(Error::MemberNotFound(req.0))?;
            Ok(found.point)
        })
    }
}

impl<M, P, H, T> Service<FindInfo> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = MemberInfo;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindInfo) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move {
            let found = member
                .find_by_id(req.0)
                .await?
                .ok_or(Error::MemberNotFound(req.0))?;
            Ok(found.info())
        })
    }
}

impl<M, P, H, T> Service<FindAdmin> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = AdminMember;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindAdmin) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move {
            if !member.exists_by_id(req.0).await? {
                return Err(Error::MemberNotFound(req.0));
            }
            member
                .find_admin_by_member_id(req.0)
                .await?
                .ok_or(Error::AdminNotFound(req.0))
        })
    }
}

impl<M, P, H, T> Service<ChangeAddressRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = ();
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ChangeAddressRequest) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move {
            if !member.exists_by_id(req.member_id).await? {
                return Err(Error::MemberNotFound(req.member_id));
            }
            member.update_address(req.member_id, &req.address).await?;

            info!(member_id = req.member_id, "address changed");
            Ok(())
        })
    }
}
