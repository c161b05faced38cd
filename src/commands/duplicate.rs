//! Existence checks used before signup and for login status

use std::task::{Context, Poll};

use tower::Service;

use crate::{
    domain::MemberId,
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

/// Whether a member already uses this email
pub struct IsDuplicateEmail(pub String);

/// Whether a member already uses this phone number
pub struct IsDuplicatePhone(pub String);

/// Whether a member with this id exists
pub struct ExistsMember(pub MemberId);

impl<M, P, H, T> Service<IsDuplicateEmail> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = bool;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: IsDuplicateEmail) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move { Ok(member.exists_by_email(&req.0).await?) })
    }
}

impl<M, P, H, T> Service<IsDuplicatePhone> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = bool;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: IsDuplicatePhone) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move { Ok(member.exists_by_phone(&req.0).await?) })
    }
}

impl<M, P, H, T> Service<ExistsMember> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = bool;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ExistsMember) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move { Ok(member.exists_by_id(req.0).await?) })
    }
}
