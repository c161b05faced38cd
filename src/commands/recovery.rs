//! Account recovery: forgotten email and forgotten password

use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::{
    domain::TemporaryPassword,
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

pub struct FindEmailRequest {
    pub name: String,
    pub phone: String,
}

pub struct FindPasswordRequest {
    pub email: String,
    pub name: String,
    pub phone: String,
}

impl<M, P, H, T> Service<FindEmailRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = String;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindEmailRequest) -> Self::Future {
        let member = self.member.clone();
        Box::pin(async move {
            let found = member
                .find_by_name_and_phone(&req.name, &req.phone)
                .await?
                .ok_or(Error::NoMatchingMember)?;
            Ok(found.email)
        })
    }
}

/// Replaces the stored password with a freshly generated temporary one
///
/// The plaintext temporary password is returned so the caller can hand it to the member, who
/// is expected to change it afterwards.
impl<M, P, H, T> Service<FindPasswordRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = TemporaryPassword;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: FindPasswordRequest) -> Self::Future {
        let member = self.member.clone();
        let password = self.password.clone();
        Box::pin(async move {
            let found = member
                .find_by_email_and_name_and_phone(&req.email, &req.name, &req.phone)
                .await?
                .ok_or(Error::NoMatchingMember)?;

            let temporary = TemporaryPassword::generate();
            let password_hash = password.hash(temporary.as_str())?;
            member.update_password(found.id, &password_hash).await?;

            info!(member_id = found.id, "temporary password issued");
            Ok(temporary)
        })
    }
}
