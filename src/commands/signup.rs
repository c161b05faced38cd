use std::task::{Context, Poll};

use tower::Service;
use tracing::{info, warn};

use crate::{
    domain::{MemberId, MemberRole, NewMember},
    ports::{
        member::MemberPort, password::PasswordPort, preference::PreferencePort, token::TokenPort,
    },
};

use super::{BoxFuture, DomainLogic, Error};

pub struct SignupRequest {
    pub email: String,
    /// Plaintext password, hashed before it is stored
    pub password: String,
    pub name: String,
    pub phone: String,
    pub birth: String,
    pub role: MemberRole,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SignupResponse {
    pub member_id: MemberId,
    pub role: MemberRole,
}

impl<M, P, H, T> Service<SignupRequest> for DomainLogic<M, P, H, T>
where
    M: MemberPort + ?Sized + 'static,
    P: PreferencePort + ?Sized + 'static,
    H: PasswordPort + ?Sized + 'static,
    T: TokenPort + ?Sized + 'static,
{
    type Response = SignupResponse;
    type Error = Error;
    type Future = BoxFuture<Self::Response>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: SignupRequest) -> Self::Future {
        let member = self.member.clone();
        let password = self.password.clone();
        Box::pin(async move {
            if member.exists_by_email(&req.email).await? {
                warn!(email = %req.email, "signup rejected: duplicate email");
                return Err(Error::DuplicateEmail(req.email));
            }
            if member.exists_by_phone(&req.phone).await? {
                warn!(phone = %req.phone, "signup rejected: duplicate phone");
                return Err(Error::DuplicatePhone(req.phone));
            }

            let password_hash = password.hash(&req.password)?;
            let saved = member
                .insert(NewMember {
                    role: req.role,
                    email: req.email,
                    password: password_hash,
                    name: req.name,
                    phone: req.phone,
                    birth: req.birth,
                })
                .await?;

            info!(member_id = saved.id, role = %saved.role, "member signed up");
            Ok(SignupResponse {
                member_id: saved.id,
                role: saved.role,
            })
        })
    }
}
