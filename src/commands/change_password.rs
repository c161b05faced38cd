use std::task::{Context, Poll};

use tower::Service;
use tracing::{info, warn};

use crate::{
    domain::MemberId,
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

/// Replace the password of an authenticated member
///
/// The current password is not asked for: the caller is already authenticated, and this is also
/// how a member replaces a temporary password issued by recovery.
pub struct ChangePasswordRequest {
    pub member_id: MemberId,
    pub new_password: String,
}

impl<M, P, H, T> Service<ChangePasswordRequest> for DomainLogic<M, P, H, T>
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

    fn call(&mut self, req: ChangePasswordRequest) -> Self::Future {
        let member = self.member.clone();
        let password = self.password.clone();
        Box::pin(async move {
            let found = member
                .find_by_id(req.member_id)
                .await?
                .ok_or(Error::MemberNotFound(req.member_id))?;

            if password.verify(&req.new_password, &found.password)? {
                warn!(member_id = found.id, "password change rejected: unchanged");
                return Err(Error::SamePassword);
            }

            let password_hash = password.hash(&req.new_password)?;
            member.update_password(found.id, &password_hash).await?;

            info!(member_id = found.id, "password changed");
            Ok(())
        })
    }
}
